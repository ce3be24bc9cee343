//! FFI use-case API for embedding task viewers.
//!
//! # Responsibility
//! - Expose the task session as sync, use-case-level functions via FRB.
//! - Hold the single per-process session between calls.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Element ids cross the boundary in their `node:<n>` / `task:<n>` text
//!   form.
//! - Session calls before `session_open` fail with a message, never panic.

use gtask_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, outline,
    ping as ping_inner, ElementId, NodeId, OutlineRow, SessionError, StoreConfig, TaskSession,
    TaskStore,
};
use log::warn;
use std::fmt::Display;
use std::sync::Mutex;

static SESSION: Mutex<Option<TaskSession>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Element created or touched by the call, in text form.
    pub element_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, element_id: Option<String>) -> Self {
        Self {
            ok: true,
            element_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            element_id: None,
            message: message.into(),
        }
    }
}

/// One visible outline row.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineItem {
    pub element_id: String,
    /// `node` or `task`.
    pub kind: String,
    pub depth: u32,
    pub name: String,
    /// Expanded flag for nodes, done flag for tasks.
    pub checked: bool,
    /// Subtree completion for nodes; `0.0` for tasks.
    pub percent: f64,
}

/// Root completion summary.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsResponse {
    pub done: u32,
    pub total: u32,
    pub percent: f64,
    pub message: String,
}

/// Opens the task file under `data_dir`, replacing any open session.
///
/// An open session is saved before it is replaced; when that save fails the
/// open fails and the previous session stays in place. Empty `data_dir`
/// falls back to `GTASK_DATA_DIR` or `./G Task`.
///
/// # FFI contract
/// - Sync call; performs file I/O.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn session_open(data_dir: String) -> ActionResponse {
    let trimmed = data_dir.trim();
    let config = if trimmed.is_empty() {
        StoreConfig::from_env()
    } else {
        StoreConfig::new(trimmed)
    };

    let opened = TaskStore::open(config).map_err(SessionError::from).and_then(TaskSession::open);
    let session = match opened {
        Ok(session) => session,
        Err(err) => return ActionResponse::failure(format!("session_open failed: {err}")),
    };

    let Ok(mut slot) = SESSION.lock() else {
        return ActionResponse::failure("session_open failed: session lock poisoned");
    };
    if let Some(previous) = slot.take() {
        if let Err(err) = previous.close() {
            warn!("event=ffi_session_replace module=ffi status=error");
            let message = format!("session_open failed: open session not saved: {err}");
            *slot = Some(err.into_session());
            return ActionResponse::failure(message);
        }
    }
    let root = session.tree().root_id().to_string();
    *slot = Some(session);
    ActionResponse::success("Session opened.", Some(root))
}

/// Returns the visible outline rows; empty when no session is open.
#[flutter_rust_bridge::frb(sync)]
pub fn session_outline() -> Vec<OutlineItem> {
    with_session(|session| Ok(outline(session.tree())))
        .map(|rows| rows.into_iter().map(to_outline_item).collect())
        .unwrap_or_default()
}

/// Adds a default task under `parent` (a node id), or under the root.
#[flutter_rust_bridge::frb(sync)]
pub fn session_add_task(parent: Option<String>) -> ActionResponse {
    respond("session_add_task", "Task added.", |session| {
        let parent = parse_parent(parent)?;
        let id = session.add_task(parent).map_err(to_message)?;
        Ok(Some(id.to_string()))
    })
}

/// Adds a default node under `parent` (a node id), or under the root.
#[flutter_rust_bridge::frb(sync)]
pub fn session_add_node(parent: Option<String>) -> ActionResponse {
    respond("session_add_node", "Node added.", |session| {
        let parent = parse_parent(parent)?;
        let id = session.add_node(parent).map_err(to_message)?;
        Ok(Some(id.to_string()))
    })
}

/// Toggles done for a task or expanded for a node.
#[flutter_rust_bridge::frb(sync)]
pub fn session_toggle(element_id: String) -> ActionResponse {
    respond("session_toggle", "Toggled.", |session| {
        let id = parse_element(&element_id)?;
        let toggled = match id {
            ElementId::Node(node) => session.toggle_expanded(node),
            ElementId::Task(task) => session.toggle_done(task),
        };
        toggled.map_err(to_message)?;
        Ok(Some(id.to_string()))
    })
}

/// Renames a node or task.
#[flutter_rust_bridge::frb(sync)]
pub fn session_rename(element_id: String, name: String) -> ActionResponse {
    respond("session_rename", "Renamed.", |session| {
        let id = parse_element(&element_id)?;
        session.rename(id, name).map_err(to_message)?;
        Ok(Some(id.to_string()))
    })
}

/// Removes a node (with its subtree) or a task.
#[flutter_rust_bridge::frb(sync)]
pub fn session_remove(element_id: String) -> ActionResponse {
    respond("session_remove", "Removed.", |session| {
        let id = parse_element(&element_id)?;
        if session.delete(id).map_err(to_message)? {
            Ok(Some(id.to_string()))
        } else {
            Err(format!("element not found: {id}"))
        }
    })
}

/// Returns root completion counts.
#[flutter_rust_bridge::frb(sync)]
pub fn session_stats() -> StatsResponse {
    match with_session(|session| Ok(session.completion())) {
        Ok(completion) => StatsResponse {
            done: saturating_u32(completion.done),
            total: saturating_u32(completion.total),
            percent: completion.percent(),
            message: format!("{}/{} ({completion}%)", completion.done, completion.total),
        },
        Err(err) => StatsResponse {
            done: 0,
            total: 0,
            percent: 0.0,
            message: format!("session_stats failed: {err}"),
        },
    }
}

/// Saves the open session (with backup) and closes it.
///
/// A failed save keeps the session open so the host can retry.
#[flutter_rust_bridge::frb(sync)]
pub fn session_close() -> ActionResponse {
    let Ok(mut slot) = SESSION.lock() else {
        return ActionResponse::failure("session_close failed: session lock poisoned");
    };
    let Some(session) = slot.take() else {
        return ActionResponse::failure("session_close failed: no open session");
    };
    match session.close() {
        Ok(outcome) => ActionResponse::success(
            format!("Saved {} bytes.", outcome.bytes_written),
            None,
        ),
        Err(err) => {
            let message = format!("session_close failed: {err}");
            *slot = Some(err.into_session());
            ActionResponse::failure(message)
        }
    }
}

fn respond(
    operation: &str,
    message: &str,
    f: impl FnOnce(&mut TaskSession) -> Result<Option<String>, String>,
) -> ActionResponse {
    match with_session(f) {
        Ok(element_id) => ActionResponse::success(message, element_id),
        Err(err) => ActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn with_session<T>(
    f: impl FnOnce(&mut TaskSession) -> Result<T, String>,
) -> Result<T, String> {
    let mut slot = SESSION
        .lock()
        .map_err(|_| "session lock poisoned".to_string())?;
    let session = slot.as_mut().ok_or_else(|| "no open session".to_string())?;
    f(session)
}

fn parse_element(raw: &str) -> Result<ElementId, String> {
    raw.parse::<ElementId>().map_err(to_message)
}

fn parse_parent(raw: Option<String>) -> Result<Option<NodeId>, String> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<NodeId>()
            .map(Some)
            .map_err(to_message),
    }
}

fn to_message(err: impl Display) -> String {
    err.to_string()
}

fn to_outline_item(row: OutlineRow) -> OutlineItem {
    match row {
        OutlineRow::Node {
            id,
            depth,
            name,
            expanded,
            completion,
        } => OutlineItem {
            element_id: id.to_string(),
            kind: "node".to_string(),
            depth: saturating_u32(depth),
            name,
            checked: expanded,
            percent: completion.percent(),
        },
        OutlineRow::Task {
            id,
            depth,
            name,
            done,
        } => OutlineItem {
            element_id: id.to_string(),
            kind: "task".to_string(),
            depth: saturating_u32(depth),
            name,
            checked: done,
            percent: 0.0,
        },
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
