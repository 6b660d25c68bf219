//! Line-oriented structural classification of markdown source.
//!
//! This is deliberately not a CommonMark parser. Each source line is
//! classified on its own by a handful of patterns, with a single piece of
//! state: whether the scan is currently inside a fenced code block.
//!
//! # Examples
//!
//! ```
//! use prosediff::markdown::{parse_semantic_lines, BlockType};
//!
//! let lines = parse_semantic_lines("# Title\n\n- [docs](https://example.com)");
//! assert_eq!(lines[0].block_type, BlockType::Heading);
//! assert_eq!(lines[0].heading_level, Some(1));
//! assert_eq!(lines[1].block_type, BlockType::Blank);
//! assert_eq!(lines[2].plain_text, "docs");
//! assert_eq!(lines[2].links[0].url, "https://example.com");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{0,3}```\s*([A-Za-z0-9_-]+)?\s*$").expect("valid fence regex"));
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{0,3}(#{1,6})\s+(.+)$").expect("valid heading regex"));
static LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([-*+]|\d+\.)\s+(.+)$").expect("valid list regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));

static HEADING_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+").expect("valid regex"));
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([-*+]|\d+\.)\s+").expect("valid regex"));
static BOLD_STAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static BOLD_UNDERSCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__(.*?)__").expect("valid regex"));
static ITALIC_STAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^*])\*([^*\n]+)\*").expect("valid regex"));
static ITALIC_UNDERSCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^_])_([^_\n]+)_").expect("valid regex"));
static STRIKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~\n]+)~~").expect("valid regex"));
static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static BOLD_STAR_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*[^*\n]+\*\*").expect("valid regex"));
static BOLD_UNDERSCORE_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__[^_\n]+__").expect("valid regex"));
static ITALIC_STAR_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*[^*\n]+\*").expect("valid regex"));
static ITALIC_UNDERSCORE_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_[^_\n]+_").expect("valid regex"));

/// Structural kind of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Blank,
    Paragraph,
    Heading,
    ListItem,
    /// Any fence delimiter line, opening or closing
    CodeFenceOpen,
    CodeLine,
    TableRow,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Blank => "blank",
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::ListItem => "list_item",
            BlockType::CodeFenceOpen => "code_fence_open",
            BlockType::CodeLine => "code_line",
            BlockType::TableRow => "table_row",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Ordered => "ordered",
            ListKind::Unordered => "unordered",
        }
    }
}

/// A `[text](url)` link. Images are never recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// Counts of inline formatting spans on a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FormattingSummary {
    pub bold: usize,
    pub italic: usize,
    #[serde(rename = "inlineCode")]
    pub inline_code: usize,
    pub strikethrough: usize,
}

/// One source line and its structural classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticLine {
    /// 1-indexed line number
    pub line_number: usize,
    pub raw: String,
    pub block_type: BlockType,
    pub heading_level: Option<u8>,
    pub list_kind: Option<ListKind>,
    pub list_indent: Option<usize>,
    /// Language tag, only on a fence line that opens a block
    pub code_fence_lang: Option<String>,
    pub table_column_count: Option<usize>,
    /// Line text with markdown syntax stripped
    pub plain_text: String,
    pub links: Vec<Link>,
    pub formatting: FormattingSummary,
}

impl SemanticLine {
    fn bare(line_number: usize, raw: &str, block_type: BlockType) -> Self {
        Self {
            line_number,
            raw: raw.to_string(),
            block_type,
            heading_level: None,
            list_kind: None,
            list_indent: None,
            code_fence_lang: None,
            table_column_count: None,
            plain_text: String::new(),
            links: Vec::new(),
            formatting: FormattingSummary::default(),
        }
    }
}

/// Classifies every line of `markdown`.
///
/// Lines are split on `\n` with an optional preceding `\r`. A fence line
/// toggles the code-block state and is always [`BlockType::CodeFenceOpen`];
/// lines inside a block are [`BlockType::CodeLine`] and are not analysed
/// further.
pub fn parse_semantic_lines(markdown: &str) -> Vec<SemanticLine> {
    let mut parsed = Vec::new();
    let mut in_code_block = false;

    for (index, raw) in markdown.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let line_number = index + 1;

        if let Some(caps) = FENCE_RE.captures(raw) {
            let mut line = SemanticLine::bare(line_number, raw, BlockType::CodeFenceOpen);
            if !in_code_block {
                line.code_fence_lang = caps.get(1).map(|m| m.as_str().trim().to_lowercase());
            }
            in_code_block = !in_code_block;
            parsed.push(line);
            continue;
        }

        if in_code_block {
            parsed.push(SemanticLine::bare(line_number, raw, BlockType::CodeLine));
            continue;
        }

        parsed.push(classify_line(line_number, raw));
    }

    parsed
}

fn classify_line(line_number: usize, raw: &str) -> SemanticLine {
    let trimmed = raw.trim();
    let mut line = SemanticLine::bare(line_number, raw, BlockType::Paragraph);

    if trimmed.is_empty() {
        line.block_type = BlockType::Blank;
    } else if let Some(caps) = HEADING_RE.captures(raw) {
        line.block_type = BlockType::Heading;
        line.heading_level = caps.get(1).map(|m| m.as_str().len() as u8);
    } else if let Some(caps) = LIST_RE.captures(raw) {
        let marker = caps.get(2).map_or("", |m| m.as_str());
        line.block_type = BlockType::ListItem;
        line.list_indent = Some(caps.get(1).map_or(0, |m| m.as_str().chars().count()));
        line.list_kind = Some(if marker.ends_with('.') {
            ListKind::Ordered
        } else {
            ListKind::Unordered
        });
    } else if trimmed.contains('|') {
        line.block_type = BlockType::TableRow;
        line.table_column_count = Some(
            raw.split('|')
                .filter(|cell| !cell.trim().is_empty())
                .count(),
        );
    }

    line.plain_text = to_plain_text(raw);
    line.links = extract_links(raw);
    line.formatting = extract_formatting(raw);
    line
}

/// Strips markdown syntax from a line: heading and list markers, link syntax
/// (kept as link text), emphasis, strikethrough and code delimiters, and
/// table pipes. Whitespace is collapsed.
///
/// ```
/// use prosediff::markdown::to_plain_text;
///
/// assert_eq!(to_plain_text("## A **bold** [link](x) | `code`"), "A bold link code");
/// ```
pub fn to_plain_text(line: &str) -> String {
    let text = HEADING_MARKER_RE.replace(line, "");
    let text = LIST_MARKER_RE.replace(&text, "");
    let text = LINK_RE.replace_all(&text, "${1}");
    let text = BOLD_STAR_RE.replace_all(&text, "${1}");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "${1}");
    let text = ITALIC_STAR_RE.replace_all(&text, "${1}${2}");
    let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "${1}${2}");
    let text = STRIKE_RE.replace_all(&text, "${1}");
    let text = CODE_RE.replace_all(&text, "${1}");
    let text = text.replace('|', " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Extracts `[text](url)` links in order, skipping `![alt](src)` images.
pub fn extract_links(line: &str) -> Vec<Link> {
    LINK_RE
        .captures_iter(line)
        .filter(|caps| {
            let start = caps.get(0).map_or(0, |m| m.start());
            !line[..start].ends_with('!')
        })
        .map(|caps| Link {
            text: caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            url: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
        })
        .collect()
}

/// Counts bold, italic, inline code and strikethrough spans.
///
/// Italic spans are counted only after bold and strikethrough spans have been
/// removed, so `**x**` is not also counted as italic.
pub fn extract_formatting(line: &str) -> FormattingSummary {
    let bold = BOLD_STAR_SPAN_RE.find_iter(line).count()
        + BOLD_UNDERSCORE_SPAN_RE.find_iter(line).count();
    let strikethrough = STRIKE_RE.find_iter(line).count();
    let inline_code = CODE_RE.find_iter(line).count();

    let italic_source = BOLD_STAR_SPAN_RE.replace_all(line, "");
    let italic_source = BOLD_UNDERSCORE_SPAN_RE.replace_all(&italic_source, "");
    let italic_source = STRIKE_RE.replace_all(&italic_source, "");
    let italic = ITALIC_STAR_SPAN_RE.find_iter(&italic_source).count()
        + ITALIC_UNDERSCORE_SPAN_RE.find_iter(&italic_source).count();

    FormattingSummary {
        bold,
        italic,
        inline_code,
        strikethrough,
    }
}
