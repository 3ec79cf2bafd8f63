//! Core content extraction: candidate scoring, top-candidate selection,
//! sibling promotion, and the flag-relaxing retry loop.

use kuchikikiki::traits::*;
use kuchikikiki::NodeRef;
use log::{debug, trace};

use crate::cleaner;
use crate::constants::{
    ParseFlags, DIV_TO_P_ELEMS, REGEXPS, RETRY_LENGTH_THRESHOLD, TAGS_TO_SCORE,
};
use crate::dom_utils;
use crate::options::ExtractOptions;
use crate::scoring::{self, ScoreMap};
use crate::utils;

/// Run the extraction pipeline, relaxing strategies until enough content
/// comes out.
///
/// The first pass consumes the already-prepared `document`. When a pass
/// captures fewer than 250 characters, one strategy flag is dropped (strip
/// unlikely candidates, then class weighing, then conditional cleanup) and
/// the pipeline restarts from a fresh parse of `source`. After the third
/// relaxation the last result is returned as-is.
pub fn grab_article(document: &NodeRef, source: &str, options: &ExtractOptions) -> NodeRef {
    let mut flags = options.initial_flags();
    let mut tree = document.clone();

    loop {
        let container = extract_content(&tree, flags);

        let text_length = utils::char_len(&dom_utils::get_inner_text(&container, true));
        if text_length >= RETRY_LENGTH_THRESHOLD {
            return container;
        }

        if !flags.relax() {
            return container;
        }
        debug!(
            "captured only {} chars, retrying with flags {:?}",
            text_length, flags
        );

        tree = kuchikikiki::parse_html().one(source);
        cleaner::prepare_document(&tree);
    }
}

/// One extraction pass over a prepared tree.
fn extract_content(document: &NodeRef, flags: ParseFlags) -> NodeRef {
    let container = dom_utils::new_element("div", &[("id", "readability-content")]);

    let body = match dom_utils::body(document) {
        Some(body) => body,
        None => return container,
    };

    if flags.contains(ParseFlags::STRIP_UNLIKELYS) {
        strip_unlikely_candidates(&body);
    }

    normalize_divs(&body);

    let (candidates, mut scores) = score_paragraphs(&body, flags);

    let top = select_top_candidate(&candidates, &mut scores)
        .filter(|candidate| !dom_utils::is_tag(candidate, "body"));
    let top = match top {
        Some(top) => top,
        None => body_fallback(&body, flags, &mut scores),
    };
    trace!(
        "top candidate <{}> ({}) with score {:.2}",
        dom_utils::tag_name(&top).unwrap_or_default(),
        dom_utils::class_id_string(&top),
        scores.get(&top)
    );

    promote_siblings(&top, &scores, &container);

    cleaner::prep_article(&container, flags);

    container
}

/// Detach elements whose class/id read like page chrome.
///
/// The match string is `class` and `id` concatenated; anything hitting the
/// unlikely-candidate patterns survives only if it also hits one of the
/// maybe-a-candidate words. The body itself is never touched.
fn strip_unlikely_candidates(body: &NodeRef) {
    for node in dom_utils::descendant_elements(body) {
        let match_string = dom_utils::class_id_string(&node);
        if match_string.is_empty() {
            continue;
        }

        if REGEXPS.unlikely_candidates.is_match(&match_string)
            && !REGEXPS.ok_maybe_its_a_candidate.is_match(&match_string)
        {
            debug!("removing unlikely candidate ({})", match_string);
            node.detach();
        }
    }
}

/// Turn paragraph-shaped divs into real paragraphs.
///
/// Divs with no block-level descendants become `<p>`; container divs get
/// their loose text children wrapped in inline-styled paragraphs so that
/// text still counts toward scoring.
fn normalize_divs(body: &NodeRef) {
    for div in dom_utils::descendants_by_tag(body, "div") {
        if dom_utils::descendants_by_tags(&div, DIV_TO_P_ELEMS).is_empty() {
            debug!("altering div ({}) to p", dom_utils::class_id_string(&div));
            dom_utils::rename_element(&div, "p");
        } else {
            wrap_text_children(&div);
        }
    }
}

fn wrap_text_children(div: &NodeRef) {
    let children: Vec<NodeRef> = div.children().collect();
    for child in children {
        let is_content_text = child.as_text().map_or(false, |text| {
            !text
                .borrow()
                .trim_matches(|c| matches!(c, ' ' | '\n' | '\t' | '\r'))
                .is_empty()
        });
        if !is_content_text {
            continue;
        }

        let paragraph = dom_utils::new_element(
            "p",
            &[("class", "readability-styled"), ("style", "display:inline")],
        );
        child.insert_before(paragraph.clone());
        paragraph.append(child);
    }
}

/// Score every paragraph-like element and accumulate onto its ancestors.
///
/// Parents and grandparents are initialized lazily on first contribution and
/// recorded as candidates in traversal order; that order is also the
/// tie-break when the top candidate is picked.
fn score_paragraphs(body: &NodeRef, flags: ParseFlags) -> (Vec<NodeRef>, ScoreMap) {
    let mut candidates = Vec::new();
    let mut scores = ScoreMap::new();

    for paragraph in dom_utils::descendants_by_tags(body, TAGS_TO_SCORE) {
        let parent = match paragraph.parent() {
            Some(parent) if parent.as_element().is_some() => parent,
            _ => continue,
        };
        let grandparent = parent
            .parent()
            .filter(|grandparent| grandparent.as_element().is_some());

        let inner_text = dom_utils::get_inner_text(&paragraph, true);
        if utils::char_len(&inner_text) < 25 {
            continue;
        }

        if !scores.is_scored(&parent) {
            scoring::initialize_node(&parent, flags, &mut scores);
            candidates.push(parent.clone());
        }
        if let Some(grandparent) = &grandparent {
            if !scores.is_scored(grandparent) {
                scoring::initialize_node(grandparent, flags, &mut scores);
                candidates.push(grandparent.clone());
            }
        }

        let content_score = scoring::paragraph_score(&inner_text);
        scores.add(&parent, content_score as f64);
        if let Some(grandparent) = &grandparent {
            // The grandparent gets half, rounded down.
            scores.add(grandparent, (content_score / 2) as f64);
        }
    }

    (candidates, scores)
}

/// Scale candidate scores by link density and pick the winner.
///
/// Comparison is strictly-greater, so the first candidate encountered wins
/// ties.
fn select_top_candidate(candidates: &[NodeRef], scores: &mut ScoreMap) -> Option<NodeRef> {
    let mut top: Option<NodeRef> = None;

    for candidate in candidates {
        let density = dom_utils::get_link_density(candidate);
        scores.scale(candidate, 1.0 - density);
        trace!(
            "candidate <{}> ({}) scored {:.2} at link density {:.2}",
            dom_utils::tag_name(candidate).unwrap_or_default(),
            dom_utils::class_id_string(candidate),
            scores.get(candidate),
            density
        );

        let better = top
            .as_ref()
            .map_or(true, |current| scores.get(candidate) > scores.get(current));
        if better {
            top = Some(candidate.clone());
        }
    }

    top
}

/// Last resort: wrap everything in the body in a fresh div and use that.
fn body_fallback(body: &NodeRef, flags: ParseFlags, scores: &mut ScoreMap) -> NodeRef {
    debug!("no usable top candidate, wrapping body content");

    let wrapper = dom_utils::new_element("div", &[]);
    dom_utils::reparent_children(body, &wrapper);
    body.append(wrapper.clone());
    scoring::initialize_node(&wrapper, flags, scores);
    wrapper
}

/// Minimum scaled score a sibling needs to ride along with the top candidate.
fn sibling_score_threshold(top_score: f64) -> f64 {
    (top_score * 0.2).max(10.0)
}

/// Move the top candidate and any related siblings into the output container.
///
/// Siblings qualify by score (with a bonus for sharing the top candidate's
/// exact class), or, for paragraphs, by looking like prose: long with few
/// links, or short, link-free, and ending like a sentence. Both length
/// comparisons are strict, so an exactly-80-character paragraph qualifies by
/// neither.
fn promote_siblings(top: &NodeRef, scores: &ScoreMap, container: &NodeRef) {
    let top_score = scores.get(top);
    let threshold = sibling_score_threshold(top_score);
    let top_class = dom_utils::attr(top, "class").unwrap_or_default();

    let parent = match top.parent() {
        Some(parent) => parent,
        None => {
            container.append(top.clone());
            return;
        }
    };

    let mut promoted = Vec::new();
    for sibling in dom_utils::element_children(&parent) {
        let mut append = sibling == *top;

        let bonus = if !top_class.is_empty()
            && dom_utils::attr(&sibling, "class").unwrap_or_default() == top_class
        {
            top_score * 0.2
        } else {
            0.0
        };

        if scores.get(&sibling) + bonus >= threshold {
            append = true;
        }

        if dom_utils::is_tag(&sibling, "p") {
            let link_density = dom_utils::get_link_density(&sibling);
            let text = dom_utils::get_inner_text(&sibling, true);
            let length = utils::char_len(&text);

            if length > 80 && link_density < 0.25 {
                append = true;
            } else if length < 80
                && link_density == 0.0
                && REGEXPS.unknown_sentence.is_match(&text)
            {
                append = true;
            }
        }

        if append {
            trace!(
                "appending sibling <{}> ({})",
                dom_utils::tag_name(&sibling).unwrap_or_default(),
                dom_utils::class_id_string(&sibling)
            );
            promoted.push(sibling);
        }
    }

    for node in promoted {
        container.append(node);
    }
}
