//! Task tree domain model.
//!
//! # Responsibility
//! - Define the node/task hierarchy shared by codec, store and hosts.
//! - Keep identity (arena ids) separate from values (`Node`, `Task`).
//!
//! # Invariants
//! - Every entry is addressed by an id minted by its owning `TaskTree`.
//! - A tree is strictly hierarchical: one parent per entry, no cycles.

pub mod id;
pub mod tree;
