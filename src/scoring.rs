//! Content scoring primitives: class weights, per-tag base scores, and the
//! sparse per-node score annotations driving candidate selection.

use std::collections::HashMap;
use std::rc::Rc;

use kuchikikiki::NodeRef;

use crate::constants::{ParseFlags, REGEXPS};
use crate::dom_utils;

/// Sparse `content_score` annotations, keyed by node identity.
///
/// Only candidates ever receive an entry, and the retry logic relies on the
/// difference between "unscored" and "scored zero", so annotations live in a
/// side table rather than on the tree. Keys are the reference-counted node
/// pointers; callers keep the candidate list alive for the duration of a
/// pass, so keys cannot be reused while the map is in scope.
#[derive(Debug, Default)]
pub struct ScoreMap {
    scores: HashMap<usize, f64>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(node: &NodeRef) -> usize {
        Rc::as_ptr(&node.0) as usize
    }

    /// Whether the node has been annotated at all.
    pub fn is_scored(&self, node: &NodeRef) -> bool {
        self.scores.contains_key(&Self::key(node))
    }

    /// Current score; unscored nodes read as zero.
    pub fn get(&self, node: &NodeRef) -> f64 {
        self.scores.get(&Self::key(node)).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, node: &NodeRef, value: f64) {
        self.scores.insert(Self::key(node), value);
    }

    pub fn add(&mut self, node: &NodeRef, amount: f64) {
        *self.scores.entry(Self::key(node)).or_insert(0.0) += amount;
    }

    /// Multiply the node's score by `factor`.
    pub fn scale(&mut self, node: &NodeRef, factor: f64) {
        if let Some(score) = self.scores.get_mut(&Self::key(node)) {
            *score *= factor;
        }
    }
}

/// Get an element's class/ID weight.
///
/// Positive and negative patterns are checked independently on both `class`
/// and `id`, so the result stacks anywhere from -50 to +50. Returns 0 when
/// class weighing is disabled.
pub fn get_class_weight(node: &NodeRef, flags: ParseFlags) -> i32 {
    if !flags.contains(ParseFlags::WEIGHT_CLASSES) {
        return 0;
    }

    let mut weight = 0;

    if let Some(class) = dom_utils::attr(node, "class") {
        if !class.is_empty() {
            if REGEXPS.negative.is_match(&class) {
                weight -= 25;
            }
            if REGEXPS.positive.is_match(&class) {
                weight += 25;
            }
        }
    }

    if let Some(id) = dom_utils::attr(node, "id") {
        if !id.is_empty() {
            if REGEXPS.negative.is_match(&id) {
                weight -= 25;
            }
            if REGEXPS.positive.is_match(&id) {
                weight += 25;
            }
        }
    }

    weight
}

/// Base score contributed by the element tag itself.
fn tag_score(tag: &str) -> i32 {
    match tag {
        "div" => 5,
        "pre" | "td" | "blockquote" => 3,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5,
        _ => 0,
    }
}

/// Attach a fresh score annotation to a node: per-tag base plus class weight.
pub fn initialize_node(node: &NodeRef, flags: ParseFlags, scores: &mut ScoreMap) {
    let base = dom_utils::tag_name(node)
        .map(|tag| tag_score(&tag))
        .unwrap_or(0);
    scores.set(node, (base + get_class_weight(node, flags)) as f64);
}

/// Raw content score of a scoreable paragraph-like element.
///
/// One point base, one per comma-delimited piece, and one per 100 characters
/// capped at three. Integer arithmetic throughout; fractions only appear
/// later when link density scales the accumulated totals.
pub fn paragraph_score(inner_text: &str) -> i64 {
    let length = crate::utils::char_len(inner_text) as i64;
    let pieces = inner_text.split(',').count() as i64;
    1 + pieces + (length / 100).min(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchikikiki::traits::*;

    fn node_for(html: &str, selector: &str) -> NodeRef {
        let document = kuchikikiki::parse_html().one(html);
        document
            .select_first(selector)
            .expect("selector should match")
            .as_node()
            .clone()
    }

    #[test]
    fn test_get_class_weight() {
        let flags = ParseFlags::WEIGHT_CLASSES;

        let positive = node_for(r#"<div class="article">x</div>"#, "div");
        assert_eq!(get_class_weight(&positive, flags), 25);

        let negative = node_for(r#"<div class="sidebar">x</div>"#, "div");
        assert_eq!(get_class_weight(&negative, flags), -25);

        let stacked = node_for(r#"<div class="article" id="main">x</div>"#, "div");
        assert_eq!(get_class_weight(&stacked, flags), 50);

        let doubly_negative = node_for(r#"<div class="footer" id="sidebar">x</div>"#, "div");
        assert_eq!(get_class_weight(&doubly_negative, flags), -50);

        // Both sets can fire on the same attribute and cancel out
        let mixed = node_for(r#"<div class="article sidebar">x</div>"#, "div");
        assert_eq!(get_class_weight(&mixed, flags), 0);
    }

    #[test]
    fn test_get_class_weight_disabled() {
        let node = node_for(r#"<div class="article" id="main">x</div>"#, "div");
        assert_eq!(get_class_weight(&node, ParseFlags::empty()), 0);
    }

    #[test]
    fn test_initialize_node_bases() {
        let mut scores = ScoreMap::new();
        let flags = ParseFlags::WEIGHT_CLASSES;

        let div = node_for("<div>x</div>", "div");
        initialize_node(&div, flags, &mut scores);
        assert_eq!(scores.get(&div), 5.0);

        let pre = node_for("<pre>x</pre>", "pre");
        initialize_node(&pre, flags, &mut scores);
        assert_eq!(scores.get(&pre), 3.0);

        let ul = node_for("<ul><li>x</li></ul>", "ul");
        initialize_node(&ul, flags, &mut scores);
        assert_eq!(scores.get(&ul), -3.0);

        let h2 = node_for("<h2>x</h2>", "h2");
        initialize_node(&h2, flags, &mut scores);
        assert_eq!(scores.get(&h2), -5.0);
    }

    #[test]
    fn test_score_map_distinguishes_unscored() {
        let mut scores = ScoreMap::new();
        let div = node_for("<div>x</div>", "div");

        assert!(!scores.is_scored(&div));
        assert_eq!(scores.get(&div), 0.0);

        scores.set(&div, 0.0);
        assert!(scores.is_scored(&div));

        scores.add(&div, 7.0);
        scores.scale(&div, 0.5);
        assert_eq!(scores.get(&div), 3.5);
    }

    #[test]
    fn test_paragraph_score_formula() {
        // 214 chars, 2 commas: 1 + 3 pieces + 2 length points
        let text = format!("{}, {}, {}", "a".repeat(70), "b".repeat(70), "c".repeat(70));
        assert_eq!(paragraph_score(&text), 6);

        // Length bonus caps at 3
        let long = "x".repeat(1000);
        assert_eq!(paragraph_score(&long), 1 + 1 + 3);

        // 99 chars: no length point yet
        let short = "y".repeat(99);
        assert_eq!(paragraph_score(&short), 1 + 1);
    }
}
