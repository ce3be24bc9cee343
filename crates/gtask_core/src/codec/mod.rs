//! XML persistence format for task trees.
//!
//! # Responsibility
//! - Decode the attribute-based `GTask` document into a `TaskTree`.
//! - Encode a `TaskTree` back into the same document shape.
//!
//! # Invariants
//! - Missing attributes are never an error; defaults are reported, not
//!   written back into the input.
//! - A failed decode never yields a partial tree.
//! - `decode(encode(tree))` preserves every name, fold and done value, and
//!   the order of nodes among nodes and tasks among tasks.

mod attr;
mod decode;
mod encode;
mod repair;

pub use decode::{decode, Decoded};
pub use encode::encode;
pub use repair::repair_ampersands;

use quick_xml::events::attributes::AttrError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema version written by `encode`.
pub const CURRENT_VERSION: i64 = 1;
/// Minimal valid document used to seed a missing task file.
pub const EMPTY_DOCUMENT: &str = "<GTask><Tasks></Tasks></GTask>";
/// Comment emitted after the wrapper tag.
pub const GENERATED_COMMENT: &str = "This is auto generated xml code, please do not modify";

pub(crate) const WRAPPER_TAG: &str = "GTask";
pub(crate) const ROOT_TAG: &str = "Tasks";
pub(crate) const NODE_TAG: &str = "Node";
pub(crate) const TASK_TAG: &str = "Task";

pub(crate) const VERSION_ATTR: &str = "version";
pub(crate) const NAME_ATTR: &str = "name";
pub(crate) const FOLDED_ATTR: &str = "folded";
pub(crate) const DONE_ATTR: &str = "done";

/// Result type used by codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from decoding a task document.
#[derive(Debug)]
pub enum CodecError {
    /// Input bytes are not valid UTF-8.
    Encoding(std::str::Utf8Error),
    /// Document is not well-formed XML.
    Xml(quick_xml::Error),
    /// Document ended before the task root was closed.
    UnexpectedEof,
    /// Document has no `Tasks` element to use as the root.
    MissingRootElement,
    /// A child element is neither `Node` nor `Task`.
    UnknownElement { name: String },
    /// An attribute literal does not match its expected type.
    Parse {
        element: String,
        attribute: String,
        value: String,
        expected: &'static str,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding(err) => write!(f, "task document is not valid UTF-8: {err}"),
            Self::Xml(err) => write!(f, "malformed task document: {err}"),
            Self::UnexpectedEof => write!(f, "task document ended before the root was closed"),
            Self::MissingRootElement => {
                write!(f, "task document has no `{ROOT_TAG}` element")
            }
            Self::UnknownElement { name } => write!(f, "unknown element `{name}`"),
            Self::Parse {
                element,
                attribute,
                value,
                expected,
            } => write!(
                f,
                "attribute `{attribute}` of `{element}` must be {expected}, got `{value}`"
            ),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encoding(err) => Some(err),
            Self::Xml(err) => Some(err),
            Self::UnexpectedEof => None,
            Self::MissingRootElement => None,
            Self::UnknownElement { .. } => None,
            Self::Parse { .. } => None,
        }
    }
}

impl From<quick_xml::Error> for CodecError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value)
    }
}

impl From<AttrError> for CodecError {
    fn from(value: AttrError) -> Self {
        Self::Xml(value.into())
    }
}
