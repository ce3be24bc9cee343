//! Stable handles for tree entries.
//!
//! # Responsibility
//! - Give nodes and tasks distinct, copyable identifiers.
//! - Provide the `node:<n>` / `task:<n>` text form used by hosts.
//!
//! # Invariants
//! - Identifiers are arena indices minted by `TaskTree` and never reused
//!   within one tree.
//! - `NodeId::ROOT` always addresses the tree root.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const NODE_PREFIX: &str = "node";
const TASK_PREFIX: &str = "task";

/// Identifier of one node inside a `TaskTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }

    /// Returns whether this id addresses the tree root.
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

/// Identifier of one task inside a `TaskTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to either kind of tree entry.
///
/// Hosts use this for selection and deletion, where the caller does not know
/// (or care) which collection the target lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Node(NodeId),
    Task(TaskId),
}

impl ElementId {
    /// Returns the node id when this handle addresses a node.
    pub fn as_node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Task(_) => None,
        }
    }
}

impl From<NodeId> for ElementId {
    fn from(value: NodeId) -> Self {
        Self::Node(value)
    }
}

impl From<TaskId> for ElementId {
    fn from(value: TaskId) -> Self {
        Self::Task(value)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{NODE_PREFIX}:{}", self.0)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{TASK_PREFIX}:{}", self.0)
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node(id) => id.fmt(f),
            Self::Task(id) => id.fmt(f),
        }
    }
}

/// Error returned when an element id string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIdParseError(String);

impl Display for ElementIdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid element id `{}`; expected `node:<n>` or `task:<n>`",
            self.0
        )
    }
}

impl Error for ElementIdParseError {}

impl FromStr for ElementId {
    type Err = ElementIdParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || ElementIdParseError(trimmed.to_string());
        let (prefix, index) = trimmed.split_once(':').ok_or_else(invalid)?;
        let index = index.parse::<usize>().map_err(|_| invalid())?;
        match prefix {
            NODE_PREFIX => Ok(Self::Node(NodeId(index))),
            TASK_PREFIX => Ok(Self::Task(TaskId(index))),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for NodeId {
    type Err = ElementIdParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .parse::<ElementId>()?
            .as_node()
            .ok_or_else(|| ElementIdParseError(value.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementId, NodeId, TaskId};

    #[test]
    fn display_and_parse_agree() {
        let node = ElementId::Node(NodeId(3));
        let task = ElementId::Task(TaskId(12));
        assert_eq!(node.to_string(), "node:3");
        assert_eq!(task.to_string(), "task:12");
        assert_eq!("node:3".parse::<ElementId>().unwrap(), node);
        assert_eq!(" task:12 ".parse::<ElementId>().unwrap(), task);
    }

    #[test]
    fn parse_rejects_unknown_prefix_and_garbage() {
        assert!("folder:1".parse::<ElementId>().is_err());
        assert!("node:".parse::<ElementId>().is_err());
        assert!("node:-1".parse::<ElementId>().is_err());
        assert!("node".parse::<ElementId>().is_err());
    }

    #[test]
    fn node_id_parse_rejects_task_handles() {
        assert_eq!("node:0".parse::<NodeId>().unwrap(), NodeId::ROOT);
        let err = "task:0".parse::<NodeId>().unwrap_err();
        assert!(err.to_string().contains("task:0"));
    }
}
