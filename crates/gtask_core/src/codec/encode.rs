//! Task document writer.

use super::{
    CURRENT_VERSION, DONE_ATTR, FOLDED_ATTR, GENERATED_COMMENT, NAME_ATTR, NODE_TAG, ROOT_TAG,
    TASK_TAG, VERSION_ATTR, WRAPPER_TAG,
};
use crate::model::tree::{NodeEntry, NodeKind, TaskEntry, TaskTree};
use quick_xml::escape::escape;

/// Encodes a tree as a `GTask` document.
///
/// Each node writes its child nodes before its tasks. One tab indents each
/// depth level and every attribute is written, defaults included.
pub fn encode(tree: &TaskTree) -> String {
    let mut output = String::new();
    push_line(
        &mut output,
        0,
        &format!("<{WRAPPER_TAG} {VERSION_ATTR}=\"{CURRENT_VERSION}\"> <!-- {GENERATED_COMMENT} -->"),
    );
    encode_node(tree, tree.root(), 1, &mut output);
    push_line(&mut output, 0, &format!("</{WRAPPER_TAG}>"));
    output
}

fn encode_node(tree: &TaskTree, node: &NodeEntry, depth: usize, output: &mut String) {
    let tag = match node.kind() {
        NodeKind::Root => ROOT_TAG,
        NodeKind::Child => NODE_TAG,
    };
    push_line(
        output,
        depth,
        &format!(
            "<{tag} {NAME_ATTR}=\"{}\" {FOLDED_ATTR}=\"{}\">",
            escape(node.name()),
            node.expanded()
        ),
    );
    for child in node.child_nodes().iter().filter_map(|id| tree.node(*id)) {
        encode_node(tree, child, depth + 1, output);
    }
    for task in node.tasks().iter().filter_map(|id| tree.task(*id)) {
        encode_task(task, depth + 1, output);
    }
    push_line(output, depth, &format!("</{tag}>"));
}

fn encode_task(task: &TaskEntry, depth: usize, output: &mut String) {
    push_line(
        output,
        depth,
        &format!(
            "<{TASK_TAG} {NAME_ATTR}=\"{}\" {DONE_ATTR}=\"{}\"/>",
            escape(task.name()),
            task.done()
        ),
    );
}

fn push_line(output: &mut String, depth: usize, content: &str) {
    output.extend(std::iter::repeat('\t').take(depth));
    output.push_str(content);
    output.push('\n');
}
