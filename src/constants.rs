//! Constants, regular expressions, and static data used throughout the library.

use once_cell::sync::Lazy;
use regex::Regex;

// Bitflags for parsing strategies
bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParseFlags: u32 {
        const STRIP_UNLIKELYS = 0x1;
        const WEIGHT_CLASSES = 0x2;
        const CLEAN_CONDITIONALLY = 0x4;
    }
}

impl ParseFlags {
    /// Drop the next flag in the relaxation order. Returns false when nothing
    /// was left to drop.
    pub fn relax(&mut self) -> bool {
        for flag in [
            ParseFlags::STRIP_UNLIKELYS,
            ParseFlags::WEIGHT_CLASSES,
            ParseFlags::CLEAN_CONDITIONALLY,
        ] {
            if self.contains(flag) {
                self.remove(flag);
                return true;
            }
        }
        false
    }
}

// Element tags whose text feeds the candidate scores
pub const TAGS_TO_SCORE: &[&str] = &["p", "td", "pre"];

// A div containing none of these is really a paragraph in disguise
pub const DIV_TO_P_ELEMS: &[&str] = &[
    "a",
    "blockquote",
    "dl",
    "div",
    "img",
    "ol",
    "p",
    "pre",
    "table",
    "ul",
];

// Tags removed from the article unconditionally (video objects excepted)
pub const TAGS_TO_CLEAN: &[&str] = &["form", "object", "h1", "iframe", "hr"];

// Tags subjected to the weighted conditional-removal rules, in pass order
pub const TAGS_TO_CLEAN_CONDITIONALLY: &[&str] = &["table", "ul", "div"];

// Minimum inner-text length before a pass is accepted without retrying
pub const RETRY_LENGTH_THRESHOLD: usize = 250;

// Regular expressions (compiled once)
pub static REGEXPS: Lazy<RegexPatterns> = Lazy::new(RegexPatterns::new);

pub struct RegexPatterns {
    pub unlikely_candidates: Regex,
    pub ok_maybe_its_a_candidate: Regex,
    pub positive: Regex,
    pub negative: Regex,
    pub videos: Regex,
    pub unknown_sentence: Regex,
    pub replace_brs: Regex,
    pub kill_breaks: Regex,
    pub kill_more_breaks: Regex,
    pub trim: Regex,
    pub normalize: Regex,
    pub word_split: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            unlikely_candidates: Regex::new(
                r"(?i)combx|comment|community|disqus|extra|foot|header|menu|remark|meta|nav|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|tweet|twitter"
            ).unwrap(),
            ok_maybe_its_a_candidate: Regex::new(
                r"(?i)and|article|body|column|main|shadow"
            ).unwrap(),
            positive: Regex::new(
                r"(?i)article|body|content|entry|hentry|main|page|pagination|post|text|blog|story"
            ).unwrap(),
            negative: Regex::new(
                r"(?i)combx|comment|com-|contact|foot|footer|footnote|link|masthead|media|meta|outbrain|promo|related|scroll|shoutbox|sidebar|sponsor|shopping|tags|tool|widget"
            ).unwrap(),
            videos: Regex::new(
                r"(?i)(youtube|vimeo|blip|slideshare)\.(com|tv|net)"
            ).unwrap(),
            unknown_sentence: Regex::new(
                r"\.( |$)"
            ).unwrap(),
            replace_brs: Regex::new(
                r"(?i)(<br[^>]*>[ \n\r\t]*){2,}"
            ).unwrap(),
            kill_breaks: Regex::new(
                r"(<br\s*/?>(\s|&nbsp;?)*){1,}"
            ).unwrap(),
            kill_more_breaks: Regex::new(
                r"<br[^>]*>\s*<p"
            ).unwrap(),
            trim: Regex::new(
                r"(?m)^\s+|\s+$"
            ).unwrap(),
            normalize: Regex::new(
                r"\s+"
            ).unwrap(),
            word_split: Regex::new(
                r"(\s|&nbsp;|&#160;|&#xA0)+"
            ).unwrap(),
        }
    }
}
