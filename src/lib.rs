//! A Rust port of the Arc90 readability experiment.
//!
//! Feeds an arbitrary (possibly malformed) HTML document through the classic
//! readability pipeline (preparation, candidate scoring, sibling promotion,
//! cleanup, and a flag-relaxing retry loop) and returns the readable core
//! of the page as a cleaned HTML fragment plus its title.
//!
//! # Example
//!
//! ```
//! let html = r#"<html><head><title>A Quiet Place</title></head><body>
//!     <div id="main">
//!         <p>The first paragraph of the article, long enough to be scored,
//!         with commas, clauses, and other signs of prose worth keeping in
//!         the final reading view for everyone.</p>
//!         <p>The second paragraph carries on in the same fashion, giving
//!         the scorer more than enough material to anchor this container as
//!         the top candidate of the page.</p>
//!     </div>
//!     <div id="sidebar"><p>Follow us on twitter</p></div>
//! </body></html>"#;
//!
//! let article = readably::extract(html);
//! assert!(article.ok);
//! assert_eq!(article.title, "A Quiet Place");
//! assert!(article.content_html.contains("first paragraph"));
//! assert!(!article.content_html.contains("twitter"));
//! ```
//!
//! Extraction never fails on string input: when every pass comes back empty
//! the result carries `ok == false` and a fixed apology paragraph. Only byte
//! decoding ([`Readability::extract_bytes`]) and URL validation
//! ([`Readability::extract_with_url`]) can error.

mod cleaner;
mod constants;
mod content_extractor;
mod dom_utils;
mod encoding;
mod error;
mod options;
mod post_processor;
mod scoring;
mod utils;

pub use error::{ReadabilityError, Result};
pub use options::{ExtractOptions, ExtractOptionsBuilder};
pub use post_processor::PARSE_FAILURE_MESSAGE;

use kuchikikiki::traits::*;
use serde::{Deserialize, Serialize};
use url::Url;

/// The outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Resolved article title; empty when the page offered none.
    pub title: String,

    /// The cleaned article as an HTML fragment rooted at
    /// `<div id="readability-content">`, or the fallback paragraph when
    /// nothing was extracted.
    pub content_html: String,

    /// False iff the fallback paragraph was emitted.
    pub ok: bool,

    /// Whitespace-separated word count of the extracted text.
    pub word_count: usize,
}

/// Configured extraction entry point.
///
/// ```
/// use readably::{ExtractOptions, Readability};
///
/// let reader = Readability::with_options(
///     ExtractOptions::builder().weight_classes(false).build(),
/// );
/// let article = reader.extract("<html><body><p>Tiny page.</p></body></html>");
/// assert!(article.ok);
/// ```
pub struct Readability {
    options: ExtractOptions,
}

impl Readability {
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::default(),
        }
    }

    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Extract the readable content from an HTML string.
    pub fn extract(&self, html: &str) -> Extraction {
        self.run(html, self.options.url.as_ref())
    }

    /// Extract with a document URL used by the title heuristics.
    ///
    /// # Errors
    ///
    /// [`ReadabilityError::InvalidUrl`] when `url` does not parse.
    pub fn extract_with_url(&self, html: &str, url: &str) -> Result<Extraction> {
        let url =
            Url::parse(url).map_err(|error| ReadabilityError::InvalidUrl(error.to_string()))?;
        Ok(self.run(html, Some(&url)))
    }

    /// Decode raw bytes (UTF-8, declared charset, or windows-1252 fallback)
    /// and extract.
    ///
    /// # Errors
    ///
    /// [`ReadabilityError::UnknownEncoding`] or
    /// [`ReadabilityError::InvalidEncoding`] when the bytes cannot be turned
    /// into a string.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Extraction> {
        let html = encoding::decode_document(bytes)?;
        Ok(self.run(&html, self.options.url.as_ref()))
    }

    fn run(&self, html: &str, url: Option<&Url>) -> Extraction {
        // The break-collapsed source outlives the whole call: every retry
        // re-parses it.
        let source = cleaner::replace_brs(html);

        let document = kuchikikiki::parse_html().one(source.as_str());
        cleaner::prepare_document(&document);

        // Resolved against the pristine prepared tree, before extraction
        // starts tearing it apart.
        let title = post_processor::article_title(&document, url);

        let content = content_extractor::grab_article(&document, &source, &self.options);

        let text = dom_utils::get_inner_text(&content, true);
        let ok = !text.is_empty();

        let (content_html, word_count) = if ok {
            (
                post_processor::render_content(&content),
                text.split_whitespace().count(),
            )
        } else {
            (post_processor::fallback_paragraph(), 0)
        };

        Extraction {
            title,
            content_html,
            ok,
            word_count,
        }
    }
}

impl Default for Readability {
    fn default() -> Self {
        Self::new()
    }
}

/// One-liner extraction with default options.
pub fn extract(html: &str) -> Extraction {
    Readability::new().extract(html)
}
