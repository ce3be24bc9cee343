//! Core domain logic for G-Task, a hierarchical to-do tree.
//! This crate owns the tree model, its XML file format and the editing
//! session hosts drive.

pub mod codec;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use codec::{decode, encode, CodecError, Decoded, CURRENT_VERSION, EMPTY_DOCUMENT};
pub use logging::{init_logging, logging_status};
pub use model::id::{ElementId, ElementIdParseError, NodeId, TaskId};
pub use model::tree::{
    Completion, Node, NodeEntry, NodeKind, NodeSnapshot, Task, TaskEntry, TaskTree, TreeError,
    TreeResult,
};
pub use service::outline::{outline, render_outline, render_outline_with_ids, OutlineRow};
pub use service::session::{CloseError, SessionError, SessionResult, TaskSession};
pub use store::{SaveOutcome, StoreConfig, StoreError, StoreResult, TaskStore};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
