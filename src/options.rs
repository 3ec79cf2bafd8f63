//! Extraction options and their builder.

use url::Url;

use crate::constants::ParseFlags;

/// Tuning knobs for a [`crate::Readability`] instance.
///
/// The three boolean strategies mirror the classic readability settings and
/// all default to `true`; the retry loop relaxes them one by one when a pass
/// captures too little text.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Remove elements whose class/id look like chrome (comments, sidebars,
    /// footers) before scoring.
    pub strip_unlike: bool,

    /// Let class and id names weigh into candidate scores.
    pub weight_classes: bool,

    /// Apply the weighted conditional cleanup of tables, lists and divs.
    pub clean_conditionally: bool,

    /// Address the document was fetched from. Only used to rank title
    /// headings that link back to the page; never dereferenced.
    pub url: Option<Url>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strip_unlike: true,
            weight_classes: true,
            clean_conditionally: true,
            url: None,
        }
    }
}

impl ExtractOptions {
    pub fn builder() -> ExtractOptionsBuilder {
        ExtractOptionsBuilder::new()
    }

    /// Initial flag set for the extraction pass.
    pub(crate) fn initial_flags(&self) -> ParseFlags {
        let mut flags = ParseFlags::empty();
        if self.strip_unlike {
            flags |= ParseFlags::STRIP_UNLIKELYS;
        }
        if self.weight_classes {
            flags |= ParseFlags::WEIGHT_CLASSES;
        }
        if self.clean_conditionally {
            flags |= ParseFlags::CLEAN_CONDITIONALLY;
        }
        flags
    }
}

/// Fluent builder for [`ExtractOptions`].
pub struct ExtractOptionsBuilder {
    options: ExtractOptions,
}

impl ExtractOptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::default(),
        }
    }

    pub fn strip_unlike(mut self, value: bool) -> Self {
        self.options.strip_unlike = value;
        self
    }

    pub fn weight_classes(mut self, value: bool) -> Self {
        self.options.weight_classes = value;
        self
    }

    pub fn clean_conditionally(mut self, value: bool) -> Self {
        self.options.clean_conditionally = value;
        self
    }

    pub fn url(mut self, url: Url) -> Self {
        self.options.url = Some(url);
        self
    }

    pub fn build(self) -> ExtractOptions {
        self.options
    }
}

impl Default for ExtractOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
