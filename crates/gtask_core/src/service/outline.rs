//! Flattened display rows for a task tree.
//!
//! Rows follow the task viewer drawing order: at each level the child nodes
//! come first (each followed by its own rows when expanded), then the tasks.
//! The root itself is never a row.

use crate::model::id::{NodeId, TaskId};
use crate::model::tree::{Completion, NodeEntry, TaskTree};

const INDENT: &str = "  ";

/// One visible line of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineRow {
    Node {
        id: NodeId,
        depth: usize,
        name: String,
        expanded: bool,
        completion: Completion,
    },
    Task {
        id: TaskId,
        depth: usize,
        name: String,
        done: bool,
    },
}

impl OutlineRow {
    pub fn depth(&self) -> usize {
        match self {
            Self::Node { depth, .. } | Self::Task { depth, .. } => *depth,
        }
    }
}

/// Returns the visible rows of `tree`.
pub fn outline(tree: &TaskTree) -> Vec<OutlineRow> {
    let mut rows = Vec::new();
    collect_rows(tree, tree.root(), 0, &mut rows);
    rows
}

/// Renders the outline as indented plain text, one row per line.
///
/// Nodes show `V` when expanded and `>` when collapsed, followed by their
/// completion percentage and a `*` once complete. Tasks show `[x]`/`[ ]`.
pub fn render_outline(tree: &TaskTree) -> String {
    render_rows(&outline(tree), false)
}

/// Same as `render_outline`, with each row prefixed by its element id.
pub fn render_outline_with_ids(tree: &TaskTree) -> String {
    render_rows(&outline(tree), true)
}

fn render_rows(rows: &[OutlineRow], with_ids: bool) -> String {
    let mut output = String::new();
    for row in rows {
        output.push_str(&INDENT.repeat(row.depth()));
        let line = match row {
            OutlineRow::Node {
                id,
                name,
                expanded,
                completion,
                ..
            } => {
                let marker = if *expanded { "V" } else { ">" };
                let complete = if completion.is_complete() { " *" } else { "" };
                let prefix = if with_ids { format!("{id} ") } else { String::new() };
                format!("{prefix}{marker} {name} ({completion}%){complete}")
            }
            OutlineRow::Task { id, name, done, .. } => {
                let check = if *done { "[x]" } else { "[ ]" };
                let prefix = if with_ids { format!("{id} ") } else { String::new() };
                format!("{prefix}{check} {name}")
            }
        };
        output.push_str(&line);
        output.push('\n');
    }
    output
}

fn collect_rows(tree: &TaskTree, node: &NodeEntry, depth: usize, rows: &mut Vec<OutlineRow>) {
    for &child_id in node.child_nodes() {
        let Some(child) = tree.node(child_id) else {
            continue;
        };
        rows.push(OutlineRow::Node {
            id: child_id,
            depth,
            name: child.name().to_string(),
            expanded: child.expanded(),
            completion: tree.completion(child_id).unwrap_or_default(),
        });
        if child.expanded() {
            collect_rows(tree, child, depth + 1, rows);
        }
    }

    for &task_id in node.tasks() {
        let Some(task) = tree.task(task_id) else {
            continue;
        };
        rows.push(OutlineRow::Task {
            id: task_id,
            depth,
            name: task.name().to_string(),
            done: task.done(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{outline, render_outline, OutlineRow};
    use crate::model::id::NodeId;
    use crate::model::tree::{Node, Task, TaskTree};

    fn sample() -> TaskTree {
        let mut tree = TaskTree::new();
        tree.add_task(NodeId::ROOT, Task::named("top")).unwrap();
        let open = tree.add_node(NodeId::ROOT, Node::named("open")).unwrap();
        tree.set_expanded(open, true).unwrap();
        let done = tree.add_task(open, Task::named("finished")).unwrap();
        tree.set_done(done, true).unwrap();
        let closed = tree.add_node(open, Node::named("closed")).unwrap();
        tree.add_task(closed, Task::named("hidden")).unwrap();
        tree
    }

    #[test]
    fn rows_follow_drawing_order_and_skip_collapsed_children() {
        let rows = outline(&sample());
        let summary = rows
            .iter()
            .map(|row| match row {
                OutlineRow::Node { name, depth, .. } => format!("{depth}:node:{name}"),
                OutlineRow::Task { name, depth, .. } => format!("{depth}:task:{name}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                "0:node:open",
                "1:node:closed",
                "1:task:finished",
                "0:task:top",
            ]
        );
    }

    #[test]
    fn render_shows_fold_markers_and_percentages() {
        let text = render_outline(&sample());
        assert_eq!(
            text,
            "V open (50.00%)\n  > closed (0.00%)\n  [x] finished\n[ ] top\n"
        );
    }

    #[test]
    fn complete_nodes_are_marked() {
        let mut tree = TaskTree::new();
        let node = tree.add_node(NodeId::ROOT, Node::named("all")).unwrap();
        let task = tree.add_task(node, Task::new()).unwrap();
        tree.set_done(task, true).unwrap();
        assert_eq!(render_outline(&tree), "> all (100.00%) *\n");
    }
}
