//! Editing session over one task file.
//!
//! # Responsibility
//! - Load the tree on open and save it (with backup) on close.
//! - Track the host's current selection across deletions.
//! - Expose the editing commands of a task viewer.
//!
//! # Invariants
//! - The selection always addresses an entry that is still in the tree.
//! - `is_dirty()` is true exactly when the tree changed since the last
//!   load or save.
//! - A failed save or close never drops the tree; `close` hands the session
//!   back inside `CloseError`.

use crate::model::id::{ElementId, NodeId, TaskId};
use crate::model::tree::{Completion, Node, Task, TaskTree, TreeError};
use crate::store::{SaveOutcome, StoreError, TaskStore};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Load or save failure.
    Store(StoreError),
    /// Tree operation failure.
    Tree(TreeError),
    /// Command needs a selected node, but none is selected.
    NodeNotSelected,
    /// Target id is not part of the tree.
    UnknownElement(ElementId),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::NodeNotSelected => write!(f, "no node is selected"),
            Self::UnknownElement(id) => write!(f, "element not found: {id}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::NodeNotSelected => None,
            Self::UnknownElement(_) => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<TreeError> for SessionError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}

/// Result type used by session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Failed `TaskSession::close`, carrying the still-open session.
pub struct CloseError {
    session: Box<TaskSession>,
    error: SessionError,
}

impl CloseError {
    pub fn error(&self) -> &SessionError {
        &self.error
    }

    /// Returns the session with its tree and dirty flag as before the close.
    pub fn into_session(self) -> TaskSession {
        *self.session
    }
}

impl std::fmt::Debug for CloseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloseError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Display for CloseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for CloseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// One open task file plus the host's selection.
pub struct TaskSession {
    store: TaskStore,
    tree: TaskTree,
    selected: Option<ElementId>,
    dirty: bool,
}

impl TaskSession {
    /// Loads the store's task file into a new session.
    pub fn open(store: TaskStore) -> SessionResult<Self> {
        let decoded = store.load()?;
        info!(
            "event=session_open module=session status=ok version={}",
            decoded.version
        );
        Ok(Self {
            store,
            tree: decoded.tree,
            selected: None,
            dirty: false,
        })
    }

    pub fn tree(&self) -> &TaskTree {
        &self.tree
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn select(&mut self, id: ElementId) -> SessionResult<()> {
        self.ensure_exists(id)?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Completion of the whole tree.
    pub fn completion(&self) -> Completion {
        self.tree.completion(NodeId::ROOT).unwrap_or_default()
    }

    /// Adds a default task under `parent`, or under the root for `None`.
    pub fn add_task(&mut self, parent: Option<NodeId>) -> SessionResult<TaskId> {
        self.add_task_with(parent, Task::new())
    }

    /// Adds the given task under `parent`, or under the root for `None`.
    pub fn add_task_with(&mut self, parent: Option<NodeId>, task: Task) -> SessionResult<TaskId> {
        let id = self
            .tree
            .add_task(parent.unwrap_or(NodeId::ROOT), task)?;
        self.dirty = true;
        Ok(id)
    }

    /// Adds a default node under `parent`, or under the root for `None`.
    pub fn add_node(&mut self, parent: Option<NodeId>) -> SessionResult<NodeId> {
        self.add_node_with(parent, Node::new())
    }

    /// Adds the given node under `parent`, or under the root for `None`.
    pub fn add_node_with(&mut self, parent: Option<NodeId>, node: Node) -> SessionResult<NodeId> {
        let id = self
            .tree
            .add_node(parent.unwrap_or(NodeId::ROOT), node)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn add_task_to_selection(&mut self) -> SessionResult<TaskId> {
        let parent = self.selected_node()?;
        self.add_task(Some(parent))
    }

    pub fn add_node_to_selection(&mut self) -> SessionResult<NodeId> {
        let parent = self.selected_node()?;
        self.add_node(Some(parent))
    }

    pub fn rename(&mut self, id: ElementId, name: impl Into<String>) -> SessionResult<()> {
        self.tree.rename(id, name)?;
        self.dirty = true;
        Ok(())
    }

    /// Flips a task's done flag and returns the new value.
    pub fn toggle_done(&mut self, id: TaskId) -> SessionResult<bool> {
        let done = self.tree.toggle_done(id)?;
        self.dirty = true;
        Ok(done)
    }

    /// Flips a node's expanded flag and returns the new value.
    pub fn toggle_expanded(&mut self, id: NodeId) -> SessionResult<bool> {
        let expanded = self.tree.toggle_expanded(id)?;
        self.dirty = true;
        Ok(expanded)
    }

    /// Removes an entry; clears the selection when it was removed with it.
    ///
    /// Returns `Ok(false)` when `id` is not part of the tree.
    pub fn delete(&mut self, id: ElementId) -> SessionResult<bool> {
        let selection_removed = match (self.selected, id) {
            (Some(selected), ElementId::Node(node)) => self.tree.is_within(selected, node),
            (Some(selected), ElementId::Task(_)) => selected == id,
            (None, _) => false,
        };

        let removed = self.tree.remove(id)?;
        if removed {
            self.dirty = true;
            if selection_removed {
                self.selected = None;
            }
        }
        Ok(removed)
    }

    /// Deletes the selected entry, if any.
    pub fn delete_selection(&mut self) -> SessionResult<bool> {
        match self.selected {
            Some(id) => self.delete(id),
            None => Ok(false),
        }
    }

    /// Saves the tree through the store and clears the dirty flag.
    ///
    /// On failure the tree and the dirty flag are left untouched.
    pub fn save(&mut self) -> SessionResult<SaveOutcome> {
        let outcome = self.store.save(&self.tree)?;
        self.dirty = false;
        Ok(outcome)
    }

    /// Saves and ends the session.
    ///
    /// # Errors
    /// Returns the unsaved session inside `CloseError` so the caller can
    /// retry or keep editing.
    pub fn close(mut self) -> Result<SaveOutcome, CloseError> {
        let dirty = self.dirty;
        match self.save() {
            Ok(outcome) => {
                info!("event=session_close module=session status=ok dirty={dirty}");
                Ok(outcome)
            }
            Err(error) => {
                warn!("event=session_close module=session status=error dirty={dirty}");
                Err(CloseError {
                    session: Box::new(self),
                    error,
                })
            }
        }
    }

    fn selected_node(&self) -> SessionResult<NodeId> {
        self.selected
            .and_then(ElementId::as_node)
            .ok_or(SessionError::NodeNotSelected)
    }

    fn ensure_exists(&self, id: ElementId) -> SessionResult<()> {
        if self.tree.contains(id) {
            Ok(())
        } else {
            Err(SessionError::UnknownElement(id))
        }
    }
}
