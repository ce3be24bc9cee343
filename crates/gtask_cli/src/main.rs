//! Command-line task viewer.
//!
//! # Responsibility
//! - Drive a `TaskSession` from the shell: show, edit and summarize the
//!   task file under a data directory.
//! - Persist only when a command changed the tree.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gtask_core::{
    init_logging, outline, render_outline, render_outline_with_ids, ElementId, Node, NodeId,
    OutlineRow, StoreConfig, Task, TaskSession, TaskStore,
};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gtask", version, about = "Hierarchical to-do tree stored as XML")]
struct Cli {
    /// Directory holding the task file and its backups.
    #[arg(long, global = true, env = "GTASK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enables rolling file logs under `<data-dir>/logs` at this level.
    #[arg(long, global = true, env = "GTASK_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints the visible outline.
    Show {
        /// Print rows as JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Prefix rows with their element ids.
        #[arg(long)]
        ids: bool,
    },
    /// Adds a task under a node (root by default).
    AddTask {
        #[arg(long)]
        parent: Option<NodeId>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Adds a node under a node (root by default).
    AddNode {
        #[arg(long)]
        parent: Option<NodeId>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Flips done for a task or expanded for a node.
    Toggle { id: ElementId },
    /// Renames a task or node.
    Rename { id: ElementId, name: String },
    /// Removes a task, or a node with its whole subtree.
    Remove { id: ElementId },
    /// Prints done/total counts for the whole tree.
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.data_dir {
        Some(dir) => StoreConfig::new(dir),
        None => StoreConfig::from_env(),
    };

    if let Some(level) = &cli.log_level {
        start_logging(level, &config)?;
    }

    let store = TaskStore::open(config).context("failed to open task store")?;
    let mut session = TaskSession::open(store).context("failed to load task file")?;

    run(&cli.command, &mut session)?;

    if session.is_dirty() {
        let outcome = session.close().context("failed to save task file")?;
        info!(
            "event=cli_save module=cli status=ok bytes={} backup={}",
            outcome.bytes_written,
            outcome.backup.is_some()
        );
    }
    Ok(())
}

fn run(command: &Command, session: &mut TaskSession) -> Result<()> {
    match command {
        Command::Show { json, ids } => {
            if *json {
                let rows = outline(session.tree())
                    .iter()
                    .map(row_json)
                    .collect::<Vec<_>>();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if *ids {
                print!("{}", render_outline_with_ids(session.tree()));
            } else {
                print!("{}", render_outline(session.tree()));
            }
        }
        Command::AddTask { parent, name } => {
            let task = name.as_deref().map(Task::named).unwrap_or_default();
            let id = session.add_task_with(*parent, task)?;
            println!("{id}");
        }
        Command::AddNode { parent, name } => {
            let node = name.as_deref().map(Node::named).unwrap_or_default();
            let id = session.add_node_with(*parent, node)?;
            println!("{id}");
        }
        Command::Toggle { id } => {
            let state = match *id {
                ElementId::Node(node) => session.toggle_expanded(node)?,
                ElementId::Task(task) => session.toggle_done(task)?,
            };
            println!("{id} {state}");
        }
        Command::Rename { id, name } => {
            session.rename(*id, name.as_str())?;
        }
        Command::Remove { id } => {
            if !session.delete(*id)? {
                bail!("element not found: {id}");
            }
        }
        Command::Stats => {
            let completion = session.completion();
            println!(
                "{}/{} ({completion}%)",
                completion.done, completion.total
            );
        }
    }
    Ok(())
}

fn row_json(row: &OutlineRow) -> serde_json::Value {
    match row {
        OutlineRow::Node {
            id,
            depth,
            name,
            expanded,
            completion,
        } => serde_json::json!({
            "id": id.to_string(),
            "kind": "node",
            "depth": depth,
            "name": name,
            "expanded": expanded,
            "done": completion.done,
            "total": completion.total,
        }),
        OutlineRow::Task {
            id,
            depth,
            name,
            done,
        } => serde_json::json!({
            "id": id.to_string(),
            "kind": "task",
            "depth": depth,
            "name": name,
            "done": done,
        }),
    }
}

fn start_logging(level: &str, config: &StoreConfig) -> Result<()> {
    let data_dir = std::path::absolute(config.data_dir()).context("failed to resolve data dir")?;
    let log_dir = data_dir.join("logs");
    let log_dir = log_dir
        .to_str()
        .context("log directory is not valid UTF-8")?;
    init_logging(level, log_dir).map_err(anyhow::Error::msg)
}
