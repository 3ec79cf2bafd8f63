//! Title resolution and final output rendering.
//!
//! The title heuristics rank every `<h1>`/`<h2>` against the document title
//! by word overlap, self-linking behavior, and title-ish class/id names; a
//! clearly winning heading that is a fragment of the page title replaces it.
//! Rendering serializes the article container and applies the classic
//! break-collapsing substitutions to the output string.

use std::collections::HashSet;

use kuchikikiki::NodeRef;
use log::trace;
use url::Url;

use crate::constants::REGEXPS;
use crate::dom_utils;
use crate::utils;

/// Paragraph emitted when every extraction pass came back empty.
pub const PARSE_FAILURE_MESSAGE: &str = "Sorry, readability was unable to parse this page for content. If you feel like it should have been able to, please <a href='http://code.google.com/p/arc90labs-readability/issues/entry'>let us know by submitting an issue.</a>";

pub fn fallback_paragraph() -> String {
    format!("<p>{}</p>", PARSE_FAILURE_MESSAGE)
}

/// Serialize the article container to HTML.
///
/// Comments are dropped, then two textual fixups run on the serialized
/// string: runs of `<br>` tags (with whitespace or `&nbsp;` filler) collapse
/// to a single `<br />`, and a break directly preceding a paragraph
/// disappears into it.
pub fn render_content(container: &NodeRef) -> String {
    strip_comments(container);
    collapse_breaks(&dom_utils::outer_html(container))
}

fn strip_comments(container: &NodeRef) {
    let comments: Vec<NodeRef> = container
        .descendants()
        .filter(|node| node.as_comment().is_some())
        .collect();
    for comment in comments {
        comment.detach();
    }
}

fn collapse_breaks(html: &str) -> String {
    let collapsed = REGEXPS.kill_breaks.replace_all(html, "<br />");
    REGEXPS
        .kill_more_breaks
        .replace_all(&collapsed, "<p")
        .to_string()
}

/// Entity-decode text and flatten every word separator to a single space.
fn split_words(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    REGEXPS.word_split.replace_all(&decoded, " ").to_string()
}

/// The initial title guess: `<title>` text, else a lone `<h1>`.
fn candidate_title(document: &NodeRef) -> Option<String> {
    if let Ok(title) = document.select_first("title") {
        let text = dom_utils::get_inner_text(title.as_node(), true);
        return if text.is_empty() { None } else { Some(text) };
    }

    let h1s = dom_utils::descendants_by_tag(document, "h1");
    if h1s.len() == 1 {
        let text = dom_utils::get_inner_text(&h1s[0], true);
        if !text.is_empty() {
            return Some(text);
        }
    }

    None
}

/// Pick the article title from the prepared input tree.
///
/// Must run before extraction mutates the tree. `url`, when present, is only
/// string-compared against heading links.
pub fn article_title(document: &NodeRef, url: Option<&Url>) -> String {
    let candidate = match candidate_title(document) {
        Some(candidate) => candidate,
        None => return String::new(),
    };

    let normalized_candidate = split_words(&candidate);
    let title_words: HashSet<String> = normalized_candidate
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .map(|word| utils::strip_punctuation(word).to_lowercase())
        .collect();

    if title_words.is_empty() {
        return candidate.trim().to_string();
    }

    // Heading text -> score; keyed by text, later duplicates overwrite.
    let mut possible_titles: Vec<(String, f64)> = Vec::new();

    for heading in dom_utils::descendants_by_tags(document, &["h1", "h2"]) {
        let inner_text = dom_utils::get_inner_text(&heading, true);
        let mut score = 0.0;

        let common = split_words(&inner_text)
            .split_whitespace()
            .map(|word| utils::strip_punctuation(word).to_lowercase())
            .filter(|word| title_words.contains(word))
            .count();
        score += -5.0 + (10.0 * common as f64 / title_words.len() as f64);

        let links = dom_utils::descendants_by_tag(&heading, "a");
        if links.len() > 1 {
            continue;
        }
        if links.len() == 1 {
            let link = &links[0];
            if inner_text != dom_utils::get_inner_text(link, true) {
                continue;
            }

            if let (Some(href), Some(url)) = (dom_utils::attr(link, "href"), url) {
                let url = url.as_str();
                if !href.is_empty() {
                    if href == "/" {
                        score -= 25.0;
                    } else if url.starts_with(&href) && href.len() < url.len() {
                        score -= 25.0;
                    } else if url.contains(&href) {
                        score += 25.0;
                    }
                }
            }
        }

        if let Some(id) = dom_utils::attr(&heading, "id") {
            if id.contains("title") {
                score += (50 / id.len() as i64) as f64;
            }
        }
        if let Some(class) = dom_utils::attr(&heading, "class") {
            if class.contains("title") {
                for token in class.split(' ').filter(|token| token.contains("title")) {
                    score += (25 / token.len() as i64) as f64;
                }
            }
        }

        trace!("possible title {:?} scored {:.2}", inner_text, score);

        if let Some(entry) = possible_titles
            .iter_mut()
            .find(|(text, _)| *text == inner_text)
        {
            entry.1 = score;
        } else {
            possible_titles.push((inner_text, score));
        }
    }

    let mut best: Option<&str> = None;
    let mut max_score = 0.0;
    for (text, score) in &possible_titles {
        if *score > max_score {
            max_score = *score;
            best = Some(text.as_str());
        }
    }

    let mut title = candidate;
    if let Some(best) = best {
        if normalized_candidate.contains(&split_words(best)) {
            title = best.to_string();
        }
    }

    title.trim().to_string()
}
