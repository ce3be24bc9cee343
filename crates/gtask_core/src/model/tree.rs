//! Task tree domain model.
//!
//! # Responsibility
//! - Own every node and task of one hierarchy in an index arena.
//! - Answer recursive completion queries over any subtree.
//! - Remove entries by identity without the caller knowing the parent.
//!
//! # Invariants
//! - Exactly one root exists; it is never removed.
//! - Every non-root entry records its parent, and that parent lists the entry
//!   exactly once in the matching sequence.
//! - Child order is insertion order.
//! - Arena indices are minted in sequence and never reused within one tree.

use super::id::{ElementId, NodeId, TaskId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Label given to nodes created without a name.
pub const DEFAULT_NODE_NAME: &str = "New Node";
/// Label given to tasks created without a name.
pub const DEFAULT_TASK_NAME: &str = "New Task";

/// Result type used by tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors from tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Node id is not part of this tree.
    NodeNotFound(NodeId),
    /// Task id is not part of this tree.
    TaskNotFound(TaskId),
    /// The root has no parent to be removed from.
    CannotRemoveRoot,
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::CannotRemoveRoot => write!(f, "the root node cannot be removed"),
        }
    }
}

impl Error for TreeError {}

/// Detached node value.
///
/// `expanded` is persisted as the `folded` attribute with the same polarity:
/// `folded="true"` on disk means the children are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub expanded: bool,
}

impl Node {
    /// Creates a collapsed node named `New Node`.
    pub fn new() -> Self {
        Self::named(DEFAULT_NODE_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expanded: false,
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// Detached task value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub done: bool,
}

impl Task {
    /// Creates an open task named `New Task`.
    pub fn new() -> Self {
        Self::named(DEFAULT_TASK_NAME)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural role of a node, fixed when the node is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The single top-level node of the tree.
    Root,
    /// Any node nested below the root.
    Child,
}

/// Node stored in a tree.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    value: Node,
    kind: NodeKind,
    parent: Option<NodeId>,
    tasks: Vec<TaskId>,
    child_nodes: Vec<NodeId>,
}

impl NodeEntry {
    fn new(value: Node, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            value,
            kind,
            parent,
            tasks: Vec::new(),
            child_nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.value.name
    }

    pub fn expanded(&self) -> bool {
        self.value.expanded
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Parent node; `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct tasks in insertion order.
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    /// Direct child nodes in insertion order.
    pub fn child_nodes(&self) -> &[NodeId] {
        &self.child_nodes
    }
}

/// Task stored in a tree.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    value: Task,
    parent: NodeId,
}

impl TaskEntry {
    pub fn name(&self) -> &str {
        &self.value.name
    }

    pub fn done(&self) -> bool {
        self.value.done
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }
}

/// Completed/total task counts for one subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Completion {
    pub done: usize,
    pub total: usize,
}

impl Completion {
    /// Percentage of done tasks; `0.0` for a subtree without tasks.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.done as f64 / self.total as f64 * 100.0
    }

    /// Returns whether the subtree has tasks and all of them are done.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}

impl Display for Completion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.percent())
    }
}

/// Nested value copy of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub expanded: bool,
    pub nodes: Vec<NodeSnapshot>,
    pub tasks: Vec<Task>,
}

/// Arena-backed hierarchy of nodes and tasks.
#[derive(Debug, Clone)]
pub struct TaskTree {
    root: NodeEntry,
    // Slot 0 stays empty; it is the root's index.
    nodes: Vec<Option<NodeEntry>>,
    tasks: Vec<Option<TaskEntry>>,
}

impl TaskTree {
    /// Creates a tree whose root is a default node.
    pub fn new() -> Self {
        Self::with_root(Node::new())
    }

    /// Creates a tree whose root carries the given value.
    pub fn with_root(root: Node) -> Self {
        Self {
            root: NodeEntry::new(root, NodeKind::Root, None),
            nodes: vec![None],
            tasks: Vec::new(),
        }
    }

    /// Builds a tree from nested values.
    ///
    /// Nodes are attached depth-first before the tasks of their parent, so
    /// the same snapshot always yields the same ids.
    pub fn from_snapshot(snapshot: NodeSnapshot) -> Self {
        let NodeSnapshot {
            name,
            expanded,
            nodes,
            tasks,
        } = snapshot;
        let mut tree = Self::with_root(Node { name, expanded });
        tree.attach(NodeId::ROOT, nodes, tasks);
        tree
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn root(&self) -> &NodeEntry {
        &self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeEntry> {
        if id.is_root() {
            return Some(&self.root);
        }
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskEntry> {
        self.tasks.get(id.0).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        match id {
            ElementId::Node(id) => self.node(id).is_some(),
            ElementId::Task(id) => self.task(id).is_some(),
        }
    }

    /// Returns the parent of an entry; `None` for the root and unknown ids.
    pub fn parent_of(&self, id: ElementId) -> Option<NodeId> {
        match id {
            ElementId::Node(id) => self.node(id).and_then(NodeEntry::parent),
            ElementId::Task(id) => self.task(id).map(TaskEntry::parent),
        }
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        1 + self.nodes.iter().flatten().count()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.iter().flatten().count()
    }

    /// Appends a task to the end of `parent`'s task sequence.
    pub fn add_task(&mut self, parent: NodeId, task: Task) -> TreeResult<TaskId> {
        let id = TaskId(self.tasks.len());
        self.node_entry_mut(parent)
            .ok_or(TreeError::NodeNotFound(parent))?
            .tasks
            .push(id);
        self.tasks.push(Some(TaskEntry {
            value: task,
            parent,
        }));
        Ok(id)
    }

    /// Appends a node to the end of `parent`'s child sequence.
    pub fn add_node(&mut self, parent: NodeId, node: Node) -> TreeResult<NodeId> {
        let id = NodeId(self.nodes.len());
        self.node_entry_mut(parent)
            .ok_or(TreeError::NodeNotFound(parent))?
            .child_nodes
            .push(id);
        self.nodes
            .push(Some(NodeEntry::new(node, NodeKind::Child, Some(parent))));
        Ok(id)
    }

    /// Counts every task in the subtree rooted at `id`.
    pub fn total_children(&self, id: NodeId) -> TreeResult<usize> {
        let entry = self.node(id).ok_or(TreeError::NodeNotFound(id))?;
        Ok(self.count_tasks(entry, &|_: &Task| true))
    }

    /// Counts done tasks in the subtree rooted at `id`.
    pub fn total_done_children(&self, id: NodeId) -> TreeResult<usize> {
        let entry = self.node(id).ok_or(TreeError::NodeNotFound(id))?;
        Ok(self.count_tasks(entry, &|task: &Task| task.done))
    }

    pub fn completion(&self, id: NodeId) -> TreeResult<Completion> {
        Ok(Completion {
            done: self.total_done_children(id)?,
            total: self.total_children(id)?,
        })
    }

    /// Removes a node (with its subtree) or a task wherever it lives.
    ///
    /// Returns `Ok(false)` when the id is not part of the tree, so repeated
    /// removal of the same id is a no-op.
    ///
    /// # Errors
    /// - `CannotRemoveRoot` when `target` is the root; the tree is unchanged.
    pub fn remove(&mut self, target: ElementId) -> TreeResult<bool> {
        match target {
            ElementId::Node(id) if id.is_root() => Err(TreeError::CannotRemoveRoot),
            ElementId::Node(id) => {
                let Some(parent) = self.node(id).and_then(NodeEntry::parent) else {
                    return Ok(false);
                };
                if let Some(parent) = self.node_entry_mut(parent) {
                    parent.child_nodes.retain(|child| *child != id);
                }
                self.drop_subtree(id);
                Ok(true)
            }
            ElementId::Task(id) => {
                let Some(parent) = self.task(id).map(TaskEntry::parent) else {
                    return Ok(false);
                };
                if let Some(parent) = self.node_entry_mut(parent) {
                    parent.tasks.retain(|task| *task != id);
                }
                self.tasks[id.0] = None;
                Ok(true)
            }
        }
    }

    /// Replaces the label of a node or task.
    pub fn rename(&mut self, target: ElementId, name: impl Into<String>) -> TreeResult<()> {
        match target {
            ElementId::Node(id) => {
                self.node_entry_mut(id)
                    .ok_or(TreeError::NodeNotFound(id))?
                    .value
                    .name = name.into();
            }
            ElementId::Task(id) => {
                self.task_entry_mut(id)
                    .ok_or(TreeError::TaskNotFound(id))?
                    .value
                    .name = name.into();
            }
        }
        Ok(())
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> TreeResult<()> {
        self.node_entry_mut(id)
            .ok_or(TreeError::NodeNotFound(id))?
            .value
            .expanded = expanded;
        Ok(())
    }

    /// Flips the expanded flag and returns the new value.
    pub fn toggle_expanded(&mut self, id: NodeId) -> TreeResult<bool> {
        let value = &mut self.node_entry_mut(id).ok_or(TreeError::NodeNotFound(id))?.value;
        value.expanded = !value.expanded;
        Ok(value.expanded)
    }

    pub fn set_done(&mut self, id: TaskId, done: bool) -> TreeResult<()> {
        self.task_entry_mut(id)
            .ok_or(TreeError::TaskNotFound(id))?
            .value
            .done = done;
        Ok(())
    }

    /// Flips the done flag and returns the new value.
    pub fn toggle_done(&mut self, id: TaskId) -> TreeResult<bool> {
        let value = &mut self.task_entry_mut(id).ok_or(TreeError::TaskNotFound(id))?.value;
        value.done = !value.done;
        Ok(value.done)
    }

    /// Returns whether `id` is `ancestor` or lies somewhere below it.
    pub fn is_within(&self, id: ElementId, ancestor: NodeId) -> bool {
        let mut cursor = match id {
            ElementId::Node(node) => Some(node),
            ElementId::Task(task) => self.task(task).map(TaskEntry::parent),
        };
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).and_then(NodeEntry::parent);
        }
        false
    }

    /// Copies the whole tree into nested values.
    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_entry(&self.root)
    }

    fn snapshot_entry(&self, entry: &NodeEntry) -> NodeSnapshot {
        NodeSnapshot {
            name: entry.value.name.clone(),
            expanded: entry.value.expanded,
            nodes: entry
                .child_nodes
                .iter()
                .filter_map(|id| self.node(*id))
                .map(|child| self.snapshot_entry(child))
                .collect(),
            tasks: entry
                .tasks
                .iter()
                .filter_map(|id| self.task(*id))
                .map(|task| task.value.clone())
                .collect(),
        }
    }

    fn attach(&mut self, parent: NodeId, nodes: Vec<NodeSnapshot>, tasks: Vec<Task>) {
        for child in nodes {
            let NodeSnapshot {
                name,
                expanded,
                nodes,
                tasks,
            } = child;
            let id = NodeId(self.nodes.len());
            self.nodes.push(Some(NodeEntry::new(
                Node { name, expanded },
                NodeKind::Child,
                Some(parent),
            )));
            if let Some(entry) = self.node_entry_mut(parent) {
                entry.child_nodes.push(id);
            }
            self.attach(id, nodes, tasks);
        }
        for task in tasks {
            let id = TaskId(self.tasks.len());
            self.tasks.push(Some(TaskEntry {
                value: task,
                parent,
            }));
            if let Some(entry) = self.node_entry_mut(parent) {
                entry.tasks.push(id);
            }
        }
    }

    fn count_tasks(&self, entry: &NodeEntry, predicate: &dyn Fn(&Task) -> bool) -> usize {
        let own = entry
            .tasks
            .iter()
            .filter_map(|id| self.task(*id))
            .filter(|task| predicate(&task.value))
            .count();
        let nested = entry
            .child_nodes
            .iter()
            .filter_map(|id| self.node(*id))
            .map(|child| self.count_tasks(child, predicate))
            .sum::<usize>();
        own + nested
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let Some(entry) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        for task in entry.tasks {
            self.tasks[task.0] = None;
        }
        for child in entry.child_nodes {
            self.drop_subtree(child);
        }
    }

    fn node_entry_mut(&mut self, id: NodeId) -> Option<&mut NodeEntry> {
        if id.is_root() {
            return Some(&mut self.root);
        }
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn task_entry_mut(&mut self, id: TaskId) -> Option<&mut TaskEntry> {
        self.tasks.get_mut(id.0).and_then(Option::as_mut)
    }
}

impl Default for TaskTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Completion, ElementId, Node, NodeId, Task, TaskTree, TreeError};

    #[test]
    fn defaults_match_new_item_labels() {
        assert_eq!(Node::new().name, "New Node");
        assert!(!Node::new().expanded);
        assert_eq!(Task::new().name, "New Task");
        assert!(!Task::new().done);
    }

    #[test]
    fn completion_formats_two_decimals_and_never_divides_by_zero() {
        assert_eq!(Completion { done: 0, total: 0 }.to_string(), "0.00");
        assert_eq!(Completion { done: 1, total: 3 }.to_string(), "33.33");
        assert_eq!(Completion { done: 2, total: 2 }.to_string(), "100.00");
        assert!(!Completion { done: 0, total: 0 }.is_complete());
        assert!(Completion { done: 2, total: 2 }.is_complete());
    }

    #[test]
    fn ids_are_minted_in_sequence() {
        let mut tree = TaskTree::new();
        let a = tree.add_node(NodeId::ROOT, Node::named("A")).unwrap();
        let b = tree.add_node(a, Node::named("B")).unwrap();
        assert_eq!(a.index(), 1);
        assert_eq!(b.index(), 2);
        assert_eq!(tree.node(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn removed_indices_are_not_reused() {
        let mut tree = TaskTree::new();
        let first = tree.add_task(NodeId::ROOT, Task::new()).unwrap();
        assert!(tree.remove(ElementId::Task(first)).unwrap());
        let second = tree.add_task(NodeId::ROOT, Task::new()).unwrap();
        assert_ne!(first, second);
        assert!(tree.task(first).is_none());
    }

    #[test]
    fn add_to_unknown_parent_fails() {
        let mut tree = TaskTree::new();
        let node = tree.add_node(NodeId::ROOT, Node::new()).unwrap();
        tree.remove(ElementId::Node(node)).unwrap();
        let err = tree.add_task(node, Task::new()).unwrap_err();
        assert_eq!(err, TreeError::NodeNotFound(node));
    }

    #[test]
    fn is_within_follows_parent_chain() {
        let mut tree = TaskTree::new();
        let outer = tree.add_node(NodeId::ROOT, Node::named("outer")).unwrap();
        let inner = tree.add_node(outer, Node::named("inner")).unwrap();
        let task = tree.add_task(inner, Task::named("leaf")).unwrap();
        let sibling = tree.add_node(NodeId::ROOT, Node::named("sibling")).unwrap();

        assert!(tree.is_within(ElementId::Task(task), outer));
        assert!(tree.is_within(ElementId::Node(inner), inner));
        assert!(!tree.is_within(ElementId::Task(task), sibling));
    }
}
