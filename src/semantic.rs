//! Structural markdown differ.
//!
//! Lines of the two snapshots are paired by their normalized plain text, so a
//! line that kept its words but changed its markup (a heading demoted, a list
//! item indented, a link retargeted) is reported as a [`SemanticChange`] even
//! when the character diff only shows a few moved symbols.

use crate::markdown::{parse_semantic_lines, BlockType, FormattingSummary, ListKind, SemanticLine};
use crate::similarity::normalize_text;
use crate::text_diff::short_hash;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Kind of structural delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticChangeType {
    BlockType,
    HeadingLevel,
    ListNesting,
    ListKind,
    LinkTarget,
    Formatting,
    CodeFenceLanguage,
    TableStructure,
}

impl SemanticChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticChangeType::BlockType => "block_type",
            SemanticChangeType::HeadingLevel => "heading_level",
            SemanticChangeType::ListNesting => "list_nesting",
            SemanticChangeType::ListKind => "list_kind",
            SemanticChangeType::LinkTarget => "link_target",
            SemanticChangeType::Formatting => "formatting",
            SemanticChangeType::CodeFenceLanguage => "code_fence_language",
            SemanticChangeType::TableStructure => "table_structure",
        }
    }
}

impl fmt::Display for SemanticChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a [`SemanticChange`].
///
/// Serializes as a small flat record, e.g. `{"level":2}` or
/// `{"link_text":"docs","url":"https://..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SemanticState {
    BlockType { block_type: BlockType },
    HeadingLevel { level: u8 },
    ListNesting { indent: usize },
    ListKind { list_kind: ListKind },
    Link { link_text: String, url: String },
    Formatting(FormattingSummary),
    CodeFence { language: Option<String> },
    Table { columns: usize },
}

impl SemanticState {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for SemanticState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticState::BlockType { block_type } => f.write_str(block_type.as_str()),
            SemanticState::HeadingLevel { level } => write!(f, "h{}", level),
            SemanticState::ListNesting { indent } => write!(f, "indent {}", indent),
            SemanticState::ListKind { list_kind } => f.write_str(list_kind.as_str()),
            SemanticState::Link { url, .. } => f.write_str(url),
            SemanticState::Formatting(s) => write!(
                f,
                "bold {}, italic {}, code {}, strike {}",
                s.bold, s.italic, s.inline_code, s.strikethrough
            ),
            SemanticState::CodeFence { language } => {
                f.write_str(language.as_deref().unwrap_or("none"))
            }
            SemanticState::Table { columns } => write!(f, "{} columns", columns),
        }
    }
}

/// A structural delta between a pair of lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticChange {
    /// Content hash of the other five fields
    pub id: String,
    #[serde(rename = "type")]
    pub change_type: SemanticChangeType,
    /// Line number in the edited document
    pub line: usize,
    pub context: String,
    pub before: SemanticState,
    pub after: SemanticState,
}

impl SemanticChange {
    fn new(
        change_type: SemanticChangeType,
        line: usize,
        context: &str,
        before: SemanticState,
        after: SemanticState,
    ) -> Self {
        let input = format!(
            "{}|{}|{}|{}|{}",
            change_type.as_str(),
            line,
            context,
            before.to_json(),
            after.to_json()
        );
        Self {
            id: format!("s_{}", short_hash(&input)),
            change_type,
            line,
            context: context.to_string(),
            before,
            after,
        }
    }
}

/// Computes the structural deltas between two markdown snapshots.
///
/// The result is sorted by edited line number, then by type name, and
/// contains no two changes with the same id.
///
/// # Examples
///
/// ```
/// use prosediff::semantic::{compute_semantic_changes, SemanticChangeType};
///
/// let changes = compute_semantic_changes("# Roadmap\n", "## Roadmap\n");
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes[0].change_type, SemanticChangeType::HeadingLevel);
/// assert_eq!(changes[0].context, "Roadmap");
/// ```
pub fn compute_semantic_changes(original: &str, edited: &str) -> Vec<SemanticChange> {
    let original_lines = parse_semantic_lines(original);
    let edited_lines = parse_semantic_lines(edited);
    let pairs = pair_by_plain_text(&original_lines, &edited_lines);
    debug!(
        original_lines = original_lines.len(),
        edited_lines = edited_lines.len(),
        pairs = pairs.len(),
        "paired markdown lines"
    );

    let mut collector = Collector::default();
    for (before, after) in pairs {
        compare_pair(before, after, &mut collector);
    }
    compare_fences(&original_lines, &edited_lines, &mut collector);

    let mut changes = collector.changes;
    changes.sort_by(|a, b| {
        a.line
            .cmp(&b.line)
            .then_with(|| a.change_type.as_str().cmp(b.change_type.as_str()))
    });
    changes
}

#[derive(Default)]
struct Collector {
    seen: HashSet<String>,
    changes: Vec<SemanticChange>,
}

impl Collector {
    fn push(
        &mut self,
        change_type: SemanticChangeType,
        line: usize,
        context: &str,
        before: SemanticState,
        after: SemanticState,
    ) {
        let change = SemanticChange::new(change_type, line, context, before, after);
        if self.seen.insert(change.id.clone()) {
            self.changes.push(change);
        }
    }
}

/// Pairs each original line with the nearest unused edited line sharing its
/// normalized plain text. Lines with no plain text are never paired.
fn pair_by_plain_text<'a>(
    original: &'a [SemanticLine],
    edited: &'a [SemanticLine],
) -> Vec<(&'a SemanticLine, &'a SemanticLine)> {
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, line) in edited.iter().enumerate() {
        let key = normalize_text(&line.plain_text);
        if !key.is_empty() {
            buckets.entry(key).or_default().push(index);
        }
    }

    let mut used = vec![false; edited.len()];
    let mut pairs = Vec::new();

    for line in original {
        let key = normalize_text(&line.plain_text);
        if key.is_empty() {
            continue;
        }
        let Some(candidates) = buckets.get(&key) else {
            continue;
        };

        let mut best: Option<(usize, usize)> = None;
        for &index in candidates {
            if used[index] {
                continue;
            }
            let distance = edited[index].line_number.abs_diff(line.line_number);
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }

        if let Some((index, _)) = best {
            used[index] = true;
            pairs.push((line, &edited[index]));
        }
    }

    pairs
}

fn compare_pair(before: &SemanticLine, after: &SemanticLine, out: &mut Collector) {
    let context = [
        after.plain_text.as_str(),
        before.plain_text.as_str(),
        after.raw.trim(),
        before.raw.trim(),
    ]
    .into_iter()
    .find(|text| !text.is_empty())
    .unwrap_or("");
    let line = after.line_number;

    if before.block_type != after.block_type {
        out.push(
            SemanticChangeType::BlockType,
            line,
            context,
            SemanticState::BlockType {
                block_type: before.block_type,
            },
            SemanticState::BlockType {
                block_type: after.block_type,
            },
        );
    }

    if let (Some(from), Some(to)) = (before.heading_level, after.heading_level) {
        if from != to {
            out.push(
                SemanticChangeType::HeadingLevel,
                line,
                context,
                SemanticState::HeadingLevel { level: from },
                SemanticState::HeadingLevel { level: to },
            );
        }
    }

    if let (Some(from), Some(to)) = (before.list_indent, after.list_indent) {
        if from != to {
            out.push(
                SemanticChangeType::ListNesting,
                line,
                context,
                SemanticState::ListNesting { indent: from },
                SemanticState::ListNesting { indent: to },
            );
        }
    }

    if let (Some(from), Some(to)) = (before.list_kind, after.list_kind) {
        if from != to {
            out.push(
                SemanticChangeType::ListKind,
                line,
                context,
                SemanticState::ListKind { list_kind: from },
                SemanticState::ListKind { list_kind: to },
            );
        }
    }

    if let (Some(from), Some(to)) = (before.table_column_count, after.table_column_count) {
        if from != to {
            out.push(
                SemanticChangeType::TableStructure,
                line,
                context,
                SemanticState::Table { columns: from },
                SemanticState::Table { columns: to },
            );
        }
    }

    let after_links = link_map(after);
    for (text, before_url) in link_map(before) {
        let Some((_, after_url)) = after_links.iter().find(|(t, _)| *t == text) else {
            continue;
        };
        if *after_url != before_url {
            out.push(
                SemanticChangeType::LinkTarget,
                line,
                context,
                SemanticState::Link {
                    link_text: text.clone(),
                    url: before_url,
                },
                SemanticState::Link {
                    link_text: text,
                    url: after_url.clone(),
                },
            );
        }
    }

    if before.formatting != after.formatting {
        out.push(
            SemanticChangeType::Formatting,
            line,
            context,
            SemanticState::Formatting(before.formatting),
            SemanticState::Formatting(after.formatting),
        );
    }
}

/// Links keyed by lowercased link text, in first-seen order. A repeated text
/// keeps its first position but takes the last url.
fn link_map(line: &SemanticLine) -> Vec<(String, String)> {
    let mut map: Vec<(String, String)> = Vec::new();
    for link in &line.links {
        if link.text.is_empty() {
            continue;
        }
        let key = link.text.to_lowercase();
        match map.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = link.url.clone(),
            None => map.push((key, link.url.clone())),
        }
    }
    map
}

/// Compares fence languages by ordinal. Every fence delimiter counts, so the
/// closing fence of a block shifts the ordinal of the next opening one.
fn compare_fences(original: &[SemanticLine], edited: &[SemanticLine], out: &mut Collector) {
    fn fences(lines: &[SemanticLine]) -> Vec<&SemanticLine> {
        lines
            .iter()
            .filter(|l| l.block_type == BlockType::CodeFenceOpen)
            .collect()
    }
    let before_fences = fences(original);
    let after_fences = fences(edited);

    for (ordinal, (before, after)) in before_fences.iter().zip(&after_fences).enumerate() {
        if before.code_fence_lang != after.code_fence_lang {
            out.push(
                SemanticChangeType::CodeFenceLanguage,
                after.line_number,
                &format!("code fence #{}", ordinal + 1),
                SemanticState::CodeFence {
                    language: before.code_fence_lang.clone(),
                },
                SemanticState::CodeFence {
                    language: after.code_fence_lang.clone(),
                },
            );
        }
    }
}
