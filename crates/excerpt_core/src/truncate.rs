use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef, Tree};
use scraper::Node;

use crate::TruncateOptions;

/// Cut the text below `container` down to `options.length` characters or words.
///
/// The tree is cut rather than the serialized string, so every open element
/// stays closed. Everything after the cut point is removed and the ellipsis is
/// appended to the last kept text node. Returns `false` if nothing was cut.
pub(crate) fn truncate_fragment(
    tree: &mut Tree<Node>,
    container: NodeId,
    options: &TruncateOptions,
) -> bool {
    let Some((cut_id, kept)) = find_cut(tree, container, options) else {
        return false;
    };

    let replacement = format!("{}{}", kept.trim_end(), options.ellipsis);
    if let Some(mut node) = tree.get_mut(cut_id) {
        if let Node::Text(text) = node.value() {
            text.text = replacement.as_str().into();
        }
    }
    remove_following(tree, container, cut_id);
    true
}

fn find_cut(
    tree: &Tree<Node>,
    container: NodeId,
    options: &TruncateOptions,
) -> Option<(NodeId, String)> {
    let root = tree.get(container)?;
    if options.by_words {
        find_word_cut(root, options.length)
    } else {
        find_char_cut(root, options.length)
    }
}

fn find_char_cut(root: NodeRef<'_, Node>, budget: usize) -> Option<(NodeId, String)> {
    let mut remaining = budget;
    let mut previous: Option<(NodeId, String)> = None;

    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let text: &str = text;
        if text.trim().is_empty() {
            continue;
        }
        if remaining == 0 {
            // The budget ran out exactly at the end of the previous text node.
            return Some(previous.unwrap_or_else(|| (node.id(), String::new())));
        }
        match text.char_indices().nth(remaining) {
            Some((index, _)) => return Some((node.id(), text[..index].to_string())),
            None => {
                remaining -= text.chars().count();
                previous = Some((node.id(), text.to_string()));
            }
        }
    }
    None
}

/// Word state carries across text nodes, so `t<b>wo</b>` is a single word.
/// Boundaries of anything but inline formatting elements end the current word.
fn find_word_cut(root: NodeRef<'_, Node>, budget: usize) -> Option<(NodeId, String)> {
    let mut words = 0;
    let mut in_word = false;
    let mut previous: Option<(NodeId, String)> = None;

    for edge in root.traverse() {
        let node = match edge {
            Edge::Open(node) => node,
            Edge::Close(node) => {
                if breaks_words(node.value()) {
                    in_word = false;
                }
                continue;
            }
        };
        let text: &str = match node.value() {
            Node::Text(text) => text,
            other => {
                if breaks_words(other) {
                    in_word = false;
                }
                continue;
            }
        };

        for (index, ch) in text.char_indices() {
            if ch.is_whitespace() {
                in_word = false;
            } else if !in_word {
                in_word = true;
                if words == budget {
                    let kept = &text[..index];
                    if kept.trim().is_empty() {
                        return Some(previous.unwrap_or_else(|| (node.id(), String::new())));
                    }
                    return Some((node.id(), kept.to_string()));
                }
                words += 1;
            }
        }
        if !text.trim().is_empty() {
            previous = Some((node.id(), text.to_string()));
        }
    }
    None
}

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

fn breaks_words(node: &Node) -> bool {
    match node {
        Node::Element(element) => !INLINE_ELEMENTS.contains(&element.name()),
        _ => false,
    }
}

fn remove_following(tree: &mut Tree<Node>, container: NodeId, cut_id: NodeId) {
    let mut current = cut_id;
    loop {
        let (following, parent): (Vec<NodeId>, Option<NodeId>) = match tree.get(current) {
            Some(node) => (
                node.next_siblings().map(|sibling| sibling.id()).collect(),
                node.parent().map(|parent| parent.id()),
            ),
            None => return,
        };
        for id in following {
            if let Some(mut node) = tree.get_mut(id) {
                node.detach();
            }
        }
        match parent {
            Some(parent) if parent != container => current = parent,
            _ => return,
        }
    }
}
