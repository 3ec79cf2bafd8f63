//! DOM manipulation and traversal utilities.
//!
//! Thin adapter over the `kuchikikiki` tree: tag/attribute access, text
//! collection, link density, and the handful of mutations the extraction
//! pipeline performs (rename, wrap, move).

use html5ever::{LocalName, Namespace, QualName};
use kuchikikiki::{Attribute, ExpandedName, NodeRef};

use crate::utils;

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Create a detached HTML element with the given attributes.
pub fn new_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, Namespace::from(HTML_NS), LocalName::from(tag)),
        attributes.iter().map(|(name, value)| {
            (
                ExpandedName::new("", *name),
                Attribute {
                    prefix: None,
                    value: (*value).to_string(),
                },
            )
        }),
    )
}

/// Lowercase element name, or `None` for non-element nodes.
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element()
        .map(|element| element.name.local.as_ref().to_lowercase())
}

/// Whether `node` is an element with the given lowercase tag name.
pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    node.as_element()
        .map_or(false, |element| element.name.local.as_ref() == tag)
}

/// Attribute value as an owned string.
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element().and_then(|element| {
        element
            .attributes
            .borrow()
            .get(name)
            .map(|value| value.to_string())
    })
}

/// The `class` and `id` values concatenated, the string the unlikely-candidate
/// patterns are matched against.
pub fn class_id_string(node: &NodeRef) -> String {
    format!(
        "{}{}",
        attr(node, "class").unwrap_or_default(),
        attr(node, "id").unwrap_or_default()
    )
}

/// The `<body>` element of a parsed document.
pub fn body(document: &NodeRef) -> Option<NodeRef> {
    document
        .select_first("body")
        .ok()
        .map(|body| body.as_node().clone())
}

/// Snapshot of the descendant elements carrying the given tag.
///
/// Collected eagerly so callers are free to detach nodes while walking the
/// result. Excludes `node` itself.
pub fn descendants_by_tag(node: &NodeRef, tag: &str) -> Vec<NodeRef> {
    node.descendants()
        .filter(|descendant| is_tag(descendant, tag))
        .collect()
}

/// Snapshot of descendant elements matching any of the given tags, in
/// document order.
pub fn descendants_by_tags(node: &NodeRef, tags: &[&str]) -> Vec<NodeRef> {
    node.descendants()
        .filter(|descendant| {
            descendant
                .as_element()
                .map_or(false, |element| tags.contains(&element.name.local.as_ref()))
        })
        .collect()
}

/// Snapshot of all descendant elements.
pub fn descendant_elements(node: &NodeRef) -> Vec<NodeRef> {
    node.descendants()
        .filter(|descendant| descendant.as_element().is_some())
        .collect()
}

/// Snapshot of the direct element children.
pub fn element_children(node: &NodeRef) -> Vec<NodeRef> {
    node.children()
        .filter(|child| child.as_element().is_some())
        .collect()
}

/// Get inner text of a node.
///
/// Descendant text is concatenated with single-space separators, trimmed per
/// line, and (when `normalize_spaces` is set) whitespace runs are collapsed.
/// Comments contribute nothing.
pub fn get_inner_text(node: &NodeRef, normalize_spaces: bool) -> String {
    let content = if let Some(text) = node.as_text() {
        text.borrow().clone()
    } else {
        let parts: Vec<String> = node
            .children()
            .map(|child| get_inner_text(&child, normalize_spaces))
            .collect();
        if parts.is_empty() {
            return String::new();
        }
        parts.join(" ")
    };

    let trimmed = utils::trim_lines(&content);
    if normalize_spaces {
        utils::normalize_whitespace(&trimmed)
    } else {
        trimmed
    }
}

/// Number of separator-delimited pieces in the node's inner text.
///
/// Note this counts pieces, not separators: text with `n` commas yields
/// `n + 1`. The scoring and cleanup rules depend on that off-by-one.
pub fn char_count(node: &NodeRef, separator: char) -> usize {
    get_inner_text(node, true).split(separator).count()
}

/// The share of a node's text living inside descendant `<a>` elements.
///
/// Returns a value in `[0, 1]`, and exactly `1.0` for nodes with no text at
/// all (an empty node is treated as pure chrome).
pub fn get_link_density(node: &NodeRef) -> f64 {
    let text_length = utils::char_len(&get_inner_text(node, true));
    if text_length == 0 {
        return 1.0;
    }

    let link_length: usize = descendants_by_tag(node, "a")
        .iter()
        .map(|link| utils::char_len(&get_inner_text(link, true)))
        .sum();

    link_length as f64 / text_length as f64
}

/// Replace an element with a new tag, keeping attributes and children.
///
/// The original node is detached; the replacement (returned) takes its place
/// among its siblings.
pub fn rename_element(node: &NodeRef, tag: &str) -> NodeRef {
    let replacement = new_element(tag, &[]);

    if let (Some(source), Some(target)) = (node.as_element(), replacement.as_element()) {
        target.attributes.borrow_mut().map = source.attributes.borrow().map.clone();
    }

    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        replacement.append(child);
    }

    node.insert_before(replacement.clone());
    node.detach();
    replacement
}

/// Move every child of `source` to the end of `target`, preserving order.
pub fn reparent_children(source: &NodeRef, target: &NodeRef) {
    let children: Vec<NodeRef> = source.children().collect();
    for child in children {
        target.append(child);
    }
}

/// Serialize a node (itself plus descendants) to an HTML string.
pub fn outer_html(node: &NodeRef) -> String {
    let mut buffer = Vec::new();
    if node.serialize(&mut buffer).is_err() {
        return node.text_contents();
    }
    String::from_utf8(buffer).unwrap_or_else(|_| node.text_contents())
}
