//! Document preparation and article cleanup passes.
//!
//! Preparation runs once per parse and normalizes the raw tree (script and
//! stylesheet removal, font replacement, textarea escaping) before anything
//! is scored. Cleanup runs on the assembled article container and strips the
//! chrome the scoring pass dragged along.

use kuchikikiki::NodeRef;
use log::debug;

use crate::constants::{
    ParseFlags, REGEXPS, TAGS_TO_CLEAN, TAGS_TO_CLEAN_CONDITIONALLY,
};
use crate::dom_utils;
use crate::scoring;
use crate::utils;

/// Collapse runs of two or more `<br>` tags in the raw source into paragraph
/// breaks.
///
/// This is the one transformation applied to the source text before parsing;
/// it turns `<br>`-separated prose into real paragraphs the scorer can see.
pub fn replace_brs(source: &str) -> String {
    REGEXPS.replace_brs.replace_all(source, "</p><p>").to_string()
}

/// Normalize a freshly parsed document in place.
///
/// The HTML5 parser already guarantees the `html`/`head`/`body` frame;
/// merging duplicate bodies covers the pathological leftovers.
pub fn prepare_document(document: &NodeRef) {
    merge_extra_bodies(document);

    for node in dom_utils::descendants_by_tags(document, &["script", "style"]) {
        node.detach();
    }

    for link in dom_utils::descendants_by_tag(document, "link") {
        let is_stylesheet = dom_utils::attr(&link, "rel")
            .map_or(false, |rel| rel.eq_ignore_ascii_case("stylesheet"));
        if is_stylesheet {
            link.detach();
        }
    }

    for font in dom_utils::descendants_by_tag(document, "font") {
        dom_utils::rename_element(&font, "span");
    }

    escape_textareas(document);
}

/// Concatenate the children of every extra `<body>` into the first one.
fn merge_extra_bodies(document: &NodeRef) {
    let bodies = dom_utils::descendants_by_tag(document, "body");
    if let Some((first, rest)) = bodies.split_first() {
        for extra in rest {
            dom_utils::reparent_children(extra, first);
            extra.detach();
        }
    }
}

/// Escape angle brackets inside textarea text so stray markup stays inert.
fn escape_textareas(document: &NodeRef) {
    for textarea in dom_utils::descendants_by_tag(document, "textarea") {
        for child in textarea.children() {
            if let Some(text) = child.as_text() {
                let mut text = text.borrow_mut();
                if text.contains('<') || text.contains('>') {
                    *text = text.replace('<', "&lt;").replace('>', "&gt;");
                }
            }
        }
    }
}

/// Clean the extracted article container for presentation.
pub fn prep_article(container: &NodeRef, flags: ParseFlags) {
    clean_styles(container);

    for &tag in TAGS_TO_CLEAN {
        clean_tag(container, tag);
    }

    // A single subtitle heading is page chrome; several are structure.
    let subtitles = dom_utils::descendants_by_tag(container, "h2");
    if subtitles.len() == 1 {
        subtitles[0].detach();
    }

    remove_empty_paragraphs(container);

    if flags.contains(ParseFlags::CLEAN_CONDITIONALLY) {
        for &tag in TAGS_TO_CLEAN_CONDITIONALLY {
            clean_conditionally(container, tag, flags);
        }
    }
}

/// Drop `style` attributes everywhere except on the paragraphs the div
/// normalization styled itself.
fn clean_styles(container: &NodeRef) {
    for node in dom_utils::descendant_elements(container) {
        if dom_utils::attr(&node, "class").as_deref() == Some("readability-styled") {
            continue;
        }
        if let Some(element) = node.as_element() {
            element.attributes.borrow_mut().remove("style");
        }
    }
}

/// Detach every descendant with the given tag, sparing video embeds.
fn clean_tag(container: &NodeRef, tag: &str) {
    let is_embed = tag == "object" || tag == "embed";

    for node in dom_utils::descendants_by_tag(container, tag) {
        if is_embed && REGEXPS.videos.is_match(&dom_utils::outer_html(&node)) {
            continue;
        }
        node.detach();
    }
}

/// Remove paragraphs with no text, no images, and no embedded media.
fn remove_empty_paragraphs(container: &NodeRef) {
    for paragraph in dom_utils::descendants_by_tag(container, "p") {
        let img_count = dom_utils::descendants_by_tag(&paragraph, "img").len();
        let embed_count =
            dom_utils::descendants_by_tags(&paragraph, &["embed", "object"]).len();

        if img_count == 0
            && embed_count == 0
            && dom_utils::get_inner_text(&paragraph, true).is_empty()
        {
            paragraph.detach();
        }
    }
}

/// Weighted conditional removal of tables, lists, and divs.
///
/// Nodes with a negative class weight go immediately; otherwise a node with
/// few commas is judged by the ratio rules below. The `li` count is biased by
/// -100 so genuine lists never trip the list-heavy rule.
fn clean_conditionally(container: &NodeRef, tag: &str, flags: ParseFlags) {
    for node in dom_utils::descendants_by_tag(container, tag) {
        let weight = scoring::get_class_weight(&node, flags);

        if weight < 0 {
            debug!(
                "conditionally removed <{}> ({}): negative class weight",
                tag,
                dom_utils::class_id_string(&node)
            );
            node.detach();
            continue;
        }

        if dom_utils::char_count(&node, ',') >= 10 {
            continue;
        }

        let p = dom_utils::descendants_by_tag(&node, "p").len() as i64;
        let img = dom_utils::descendants_by_tag(&node, "img").len() as i64;
        let li = dom_utils::descendants_by_tag(&node, "li").len() as i64 - 100;
        let input = dom_utils::descendants_by_tag(&node, "input").len() as i64;

        let embed_count = dom_utils::descendants_by_tags(&node, &["embed", "object"])
            .iter()
            .filter(|embed| !REGEXPS.videos.is_match(&dom_utils::outer_html(embed)))
            .count() as i64;

        let link_density = dom_utils::get_link_density(&node);
        let content_length = utils::char_len(&dom_utils::get_inner_text(&node, true));

        let to_remove = if img > p {
            true
        } else if li > p && tag != "ul" && tag != "ol" {
            true
        } else if input > p / 3 {
            true
        } else if content_length < 25 && (img == 0 || img > 2) {
            true
        } else if weight < 25 && link_density > 0.2 {
            true
        } else if weight >= 25 && link_density > 0.5 {
            true
        } else {
            (embed_count == 1 && content_length < 75) || embed_count > 1
        };

        if to_remove {
            debug!(
                "conditionally removed <{}> ({}): p={} img={} li={} input={} embeds={} density={:.2} len={}",
                tag,
                dom_utils::class_id_string(&node),
                p,
                img,
                li,
                input,
                embed_count,
                link_density,
                content_length
            );
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchikikiki::traits::*;

    fn parse(html: &str) -> NodeRef {
        kuchikikiki::parse_html().one(html)
    }

    fn first(document: &NodeRef, selector: &str) -> NodeRef {
        document
            .select_first(selector)
            .expect("selector should match")
            .as_node()
            .clone()
    }

    #[test]
    fn test_replace_brs() {
        assert_eq!(replace_brs("a<br><br>b"), "a</p><p>b");
        assert_eq!(replace_brs("a<br> \n<br/>b"), "a</p><p>b");
        assert_eq!(replace_brs("a<br>b"), "a<br>b");
        assert_eq!(replace_brs("x<br><br><br>y"), "x</p><p>y");
    }

    #[test]
    fn test_prepare_removes_scripts_and_stylesheets() {
        let document = parse(
            r#"<html><head>
                <script>var x = 1;</script>
                <style>p { color: red }</style>
                <link rel="stylesheet" href="a.css">
                <link rel="canonical" href="https://example.com/a">
            </head><body><p>text</p></body></html>"#,
        );

        prepare_document(&document);

        assert!(document.select_first("script").is_err());
        assert!(document.select_first("style").is_err());
        let links = dom_utils::descendants_by_tag(&document, "link");
        assert_eq!(links.len(), 1);
        assert_eq!(dom_utils::attr(&links[0], "rel").as_deref(), Some("canonical"));
    }

    #[test]
    fn test_prepare_replaces_fonts() {
        let document = parse(
            r#"<html><body><font face="arial">old <b>style</b></font></body></html>"#,
        );

        prepare_document(&document);

        assert!(document.select_first("font").is_err());
        let span = first(&document, "span");
        assert_eq!(dom_utils::attr(&span, "face").as_deref(), Some("arial"));
        assert_eq!(dom_utils::get_inner_text(&span, true), "old style");
    }

    #[test]
    fn test_prepare_escapes_textareas() {
        let document = parse(
            "<html><body><textarea>a <b> is not bold </b></textarea></body></html>",
        );

        prepare_document(&document);

        let textarea = first(&document, "textarea");
        let text = textarea.text_contents();
        assert!(text.contains("&lt;b&gt;"));
        assert!(!text.contains("<b>"));
    }

    #[test]
    fn test_prep_article_strips_styles() {
        let document = parse(
            r#"<html><body><div id="c">
                <p style="color: blue">styled away</p>
                <p class="readability-styled" style="display:inline">kept</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        prep_article(&container, ParseFlags::all());

        let paragraphs = dom_utils::descendants_by_tag(&container, "p");
        assert_eq!(dom_utils::attr(&paragraphs[0], "style"), None);
        assert_eq!(
            dom_utils::attr(&paragraphs[1], "style").as_deref(),
            Some("display:inline")
        );
    }

    #[test]
    fn test_prep_article_unconditional_removals() {
        let document = parse(
            r#"<html><body><div id="c">
                <h1>stray heading</h1>
                <form action="/s"><input name="q"></form>
                <iframe src="https://ads.example.com/frame"></iframe>
                <hr>
                <p>the article text itself stays where it was, unharmed.</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        prep_article(&container, ParseFlags::all());

        assert!(container.select_first("h1").is_err());
        assert!(container.select_first("form").is_err());
        assert!(container.select_first("iframe").is_err());
        assert!(container.select_first("hr").is_err());
        assert!(container.select_first("p").is_ok());
    }

    #[test]
    fn test_prep_article_keeps_video_objects() {
        let document = parse(
            r#"<html><body><div id="c">
                <object data="http://www.youtube.com/v/abcdef"></object>
                <object data="http://example.com/flash.swf"></object>
                <p>long enough text to keep the container itself from looking empty, clearly.</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        prep_article(&container, ParseFlags::all());

        let objects = dom_utils::descendants_by_tag(&container, "object");
        assert_eq!(objects.len(), 1);
        assert!(dom_utils::outer_html(&objects[0]).contains("youtube.com"));
    }

    #[test]
    fn test_prep_article_single_subtitle_removed() {
        let document = parse(
            r#"<html><body><div id="c"><h2>Subtitle</h2><p>body text.</p></div></body></html>"#,
        );
        let container = first(&document, "#c");
        prep_article(&container, ParseFlags::all());
        assert!(container.select_first("h2").is_err());

        let document = parse(
            r#"<html><body><div id="c"><h2>One</h2><p>a.</p><h2>Two</h2><p>b.</p></div></body></html>"#,
        );
        let container = first(&document, "#c");
        prep_article(&container, ParseFlags::all());
        assert_eq!(dom_utils::descendants_by_tag(&container, "h2").len(), 2);
    }

    #[test]
    fn test_prep_article_prunes_empty_paragraphs() {
        let document = parse(
            r#"<html><body><div id="c">
                <p>   </p>
                <p><img src="x.png"></p>
                <p>real words.</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        prep_article(&container, ParseFlags::all());

        let paragraphs = dom_utils::descendants_by_tag(&container, "p");
        assert_eq!(paragraphs.len(), 2);
        assert!(container.select_first("img").is_ok());
    }

    #[test]
    fn test_clean_conditionally_negative_weight() {
        let document = parse(
            r#"<html><body><div id="c">
                <div class="sidebar">some boxed promo text</div>
                <p>article body.</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        prep_article(&container, ParseFlags::all());

        assert!(container.select_first(".sidebar").is_err());
        assert!(container.select_first("p").is_ok());
    }

    #[test]
    fn test_clean_conditionally_link_list() {
        let document = parse(
            r#"<html><body><div id="c">
                <ul id="morelinks">
                    <li><a href="/a">one</a></li>
                    <li><a href="/b">two</a></li>
                    <li><a href="/c">three</a></li>
                </ul>
                <p>article body.</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        prep_article(&container, ParseFlags::all());

        assert!(container.select_first("ul").is_err());
    }

    #[test]
    fn test_clean_conditionally_spares_real_lists() {
        // A list with plain prose items: li count is biased far below the
        // paragraph count, link density is zero, and the text is long enough.
        let document = parse(
            r#"<html><body><div id="c">
                <ul id="steps">
                    <li>first step of the recipe explained here</li>
                    <li>second step of the recipe explained here</li>
                </ul>
                <p>article body.</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        prep_article(&container, ParseFlags::all());

        assert!(container.select_first("ul").is_ok());
    }

    #[test]
    fn test_clean_conditionally_skipped_when_disabled() {
        let document = parse(
            r#"<html><body><div id="c">
                <ul id="morelinks">
                    <li><a href="/a">one</a></li>
                    <li><a href="/b">two</a></li>
                </ul>
                <p>article body.</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        let mut flags = ParseFlags::all();
        flags.remove(ParseFlags::CLEAN_CONDITIONALLY);
        prep_article(&container, flags);

        assert!(container.select_first("ul").is_ok());
    }

    #[test]
    fn test_clean_conditionally_keeps_comma_rich_tables() {
        let document = parse(
            r#"<html><body><div id="c">
                <table><tr><td>one, two, three, four, five, six, seven, eight, nine, ten, eleven</td></tr></table>
                <p>article body.</p>
            </div></body></html>"#,
        );
        let container = first(&document, "#c");

        prep_article(&container, ParseFlags::all());

        assert!(container.select_first("table").is_ok());
    }
}
