//! Task document reader.

use super::attr::{element_name, read_bool, read_int, read_string, AttrValue};
use super::repair::repair_ampersands;
use super::{
    CodecError, CodecResult, DONE_ATTR, FOLDED_ATTR, NAME_ATTR, NODE_TAG, ROOT_TAG, TASK_TAG,
    VERSION_ATTR,
};
use crate::model::tree::{NodeSnapshot, Task, TaskTree, DEFAULT_NODE_NAME, DEFAULT_TASK_NAME};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Version reported when the wrapper carries none.
const MISSING_VERSION: i64 = 0;

/// Decoded document.
#[derive(Debug)]
pub struct Decoded {
    pub tree: TaskTree,
    /// Wrapper `version` attribute, `0` when absent.
    pub version: i64,
    /// Number of attributes that were missing and took their default.
    pub defaulted_attributes: usize,
}

/// Decodes a task document.
///
/// The top-level element is either a wrapper holding a `Tasks` element or a
/// bare `Tasks` element. Item ids are minted in document order, so the same
/// bytes always yield the same ids.
///
/// # Errors
/// - `Encoding` for non UTF-8 input.
/// - `Xml`/`UnexpectedEof` for malformed documents.
/// - `MissingRootElement` when no `Tasks` element exists.
/// - `UnknownElement` for a child tag other than `Node` or `Task`.
/// - `Parse` for a malformed boolean or integer literal.
pub fn decode(bytes: &[u8]) -> CodecResult<Decoded> {
    let text = std::str::from_utf8(bytes).map_err(CodecError::Encoding)?;
    let repaired = repair_ampersands(text);

    let mut decoder = Decoder::new(&repaired);
    let (root, version) = decoder.document()?;
    let tree = TaskTree::from_snapshot(root);

    debug!(
        "event=xml_decode module=codec status=ok version={} nodes={} tasks={} defaulted_attributes={}",
        version,
        tree.node_count(),
        tree.task_count(),
        decoder.defaulted_attributes
    );

    Ok(Decoded {
        tree,
        version,
        defaulted_attributes: decoder.defaulted_attributes,
    })
}

struct Decoder<'a> {
    reader: Reader<&'a [u8]>,
    defaulted_attributes: usize,
}

impl<'a> Decoder<'a> {
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.trim_text(true);
        Self {
            reader,
            defaulted_attributes: 0,
        }
    }

    fn document(&mut self) -> CodecResult<(NodeSnapshot, i64)> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => return self.top_level(&start, true),
                Event::Empty(start) => return self.top_level(&start, false),
                Event::Eof => return Err(CodecError::MissingRootElement),
                _ => {}
            }
        }
    }

    fn top_level(
        &mut self,
        start: &BytesStart<'a>,
        has_children: bool,
    ) -> CodecResult<(NodeSnapshot, i64)> {
        if start.name().as_ref() == ROOT_TAG.as_bytes() {
            return Ok((self.node(start, has_children)?, MISSING_VERSION));
        }

        // Any other top-level element is treated as the wrapper; its name is
        // not checked.
        let version = self.take(read_int(start, VERSION_ATTR, MISSING_VERSION)?);
        if !has_children {
            return Err(CodecError::MissingRootElement);
        }

        let mut root = None;
        while let Some((child, nested)) = self.next_child()? {
            if root.is_none() && child.name().as_ref() == ROOT_TAG.as_bytes() {
                root = Some(self.node(&child, nested)?);
            } else if nested {
                self.skip(&child)?;
            }
        }
        root.map(|root| (root, version))
            .ok_or(CodecError::MissingRootElement)
    }

    fn node(&mut self, start: &BytesStart<'a>, has_children: bool) -> CodecResult<NodeSnapshot> {
        let mut snapshot = NodeSnapshot {
            name: self.take(read_string(start, NAME_ATTR, DEFAULT_NODE_NAME)?),
            expanded: self.take(read_bool(start, FOLDED_ATTR, false)?),
            nodes: Vec::new(),
            tasks: Vec::new(),
        };
        if !has_children {
            return Ok(snapshot);
        }

        while let Some((child, nested)) = self.next_child()? {
            let tag = child.name();
            if tag.as_ref() == NODE_TAG.as_bytes() {
                snapshot.nodes.push(self.node(&child, nested)?);
            } else if tag.as_ref() == TASK_TAG.as_bytes() {
                snapshot.tasks.push(self.task(&child)?);
                if nested {
                    self.skip(&child)?;
                }
            } else {
                return Err(CodecError::UnknownElement {
                    name: element_name(&child),
                });
            }
        }
        Ok(snapshot)
    }

    fn task(&mut self, start: &BytesStart<'a>) -> CodecResult<Task> {
        Ok(Task {
            name: self.take(read_string(start, NAME_ATTR, DEFAULT_TASK_NAME)?),
            done: self.take(read_bool(start, DONE_ATTR, false)?),
        })
    }

    /// Returns the next child element of the element being read, or `None`
    /// once its end tag is reached.
    fn next_child(&mut self) -> CodecResult<Option<(BytesStart<'a>, bool)>> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => return Ok(Some((start, true))),
                Event::Empty(start) => return Ok(Some((start, false))),
                Event::End(_) => return Ok(None),
                Event::Eof => return Err(CodecError::UnexpectedEof),
                _ => {}
            }
        }
    }

    fn skip(&mut self, start: &BytesStart<'a>) -> CodecResult<()> {
        self.reader.read_to_end(start.name())?;
        Ok(())
    }

    fn take<T>(&mut self, attr: AttrValue<T>) -> T {
        if attr.defaulted {
            self.defaulted_attributes += 1;
        }
        attr.value
    }
}
