//! Character-level text diff anchored to the edited document.
//!
//! This module turns two snapshots of a document into a list of [`Change`]
//! records. Every change is anchored to a char offset in the *edited* text,
//! which is where an editor would draw it: insertions sit on their own text,
//! deletions sit at the point where the removed text used to be.
//!
//! When the previous diff of the same document is supplied, change ids are
//! carried forward by the reconciler (see [`crate::reconcile`]) so that
//! anything keyed by a change id survives unrelated edits elsewhere.
//!
//! # Examples
//!
//! ```
//! use prosediff::{compute_diff, ChangeType, DiffConfig};
//!
//! let diff = compute_diff("A\nB\nC", "A\nB changed\nC", None, &DiffConfig::default());
//!
//! assert_eq!(diff.insertions, 1);
//! assert_eq!(diff.changes[0].change_type, ChangeType::Insertion);
//! assert_eq!(diff.changes[0].text, " changed");
//! assert_eq!(diff.changes[0].location.line, 2);
//! ```

use crate::cleanup::{cleanup_merge, cleanup_semantic, Op, Span};
use crate::reconcile::{dedupe_ids, has_duplicate_ids, reconcile_with_config, ReconcileConfig};
use serde::Serialize;
use sha2::{Digest, Sha256};
use similar::{Algorithm, DiffOp};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::debug;

/// The kind of textual edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Text present in the original but not in the edited document
    Deletion,
    /// Text present in the edited document but not in the original
    Insertion,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Deletion => "deletion",
            ChangeType::Insertion => "insertion",
        }
    }
}

/// A line/column position in the edited document.
///
/// Lines are 1-indexed, columns 0-indexed and counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    fn start() -> Self {
        Self { line: 1, col: 0 }
    }

    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
    }
}

/// One discrete deletion or insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Stable identity of the change
    pub id: String,
    /// Deletion or insertion
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// The literal deleted or inserted text
    pub text: String,
    /// Char offset into the edited document where the change is anchored
    #[serde(skip)]
    pub edited_offset: usize,
    /// Position of `edited_offset` in the edited document
    pub location: Location,
}

impl Change {
    /// Length of the changed text in chars.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// The result of diffing two snapshots.
///
/// The snapshots are kept so that a consumer can check the result still
/// matches the live document before trusting its offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub changes: Vec<Change>,
    pub deletions: usize,
    pub insertions: usize,
    pub original_text: String,
    pub edited_text: String,
}

impl DiffResult {
    fn unchanged(original: &str, edited: &str) -> Self {
        Self {
            changes: Vec::new(),
            deletions: 0,
            insertions: 0,
            original_text: original.to_string(),
            edited_text: edited.to_string(),
        }
    }

    /// Returns true if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns true if this result was computed from exactly these snapshots.
    pub fn is_current_for(&self, original: &str, edited: &str) -> bool {
        self.original_text == original && self.edited_text == edited
    }

    /// Borrows this result as the previous state of the next computation.
    pub fn as_previous(&self) -> PreviousDiff<'_> {
        PreviousDiff::from(self)
    }

    /// Human-readable count of deletions and insertions.
    ///
    /// ```
    /// use prosediff::{compute_diff, DiffConfig};
    ///
    /// let diff = compute_diff("alpha beta", "alpha gamma", None, &DiffConfig::default());
    /// assert_eq!(diff.summary(), "1 deletion, 1 insertion");
    /// ```
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.deletions > 0 {
            parts.push(plural(self.deletions, "deletion"));
        }
        if self.insertions > 0 {
            parts.push(plural(self.insertions, "insertion"));
        }
        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Changes and edited-text snapshot from an earlier diff of the same document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviousDiff<'a> {
    pub changes: &'a [Change],
    /// Edited text the previous changes were anchored to. Without it, context
    /// anchors cannot be compared and only text and distance are scored.
    pub edited_text: Option<&'a str>,
}

impl<'a> From<&'a DiffResult> for PreviousDiff<'a> {
    fn from(result: &'a DiffResult) -> Self {
        Self {
            changes: &result.changes,
            edited_text: Some(&result.edited_text),
        }
    }
}

/// Configuration for the text diff.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Merge small fragments into word-sized edits after the raw diff
    pub semantic_cleanup: bool,
    /// Identity reconciliation settings
    pub reconcile: ReconcileConfig,
    /// Time budget for the raw diff. Once it runs out, the remaining
    /// region is reported as one deletion plus one insertion. `None` never
    /// gives up.
    pub timeout: Option<Duration>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            semantic_cleanup: true,
            reconcile: ReconcileConfig::default(),
            timeout: Some(Duration::from_secs(1)),
        }
    }
}

/// Computes the diff between `original` and `edited`.
///
/// Each deletion and insertion becomes a [`Change`] with a content-derived id.
/// If `previous` is given, ids of changes that represent the same edit as a
/// previous change are replaced with the previous id.
///
/// # Examples
///
/// ```
/// use prosediff::{compute_diff, DiffConfig};
///
/// let config = DiffConfig::default();
/// let first = compute_diff("A\nB\nC", "A\nB changed\nC", None, &config);
/// let second = compute_diff(
///     "A\nB\nC",
///     "Intro\nA\nB changed\nC",
///     Some(first.as_previous()),
///     &config,
/// );
///
/// let id_of = |d: &prosediff::DiffResult| {
///     d.changes.iter().find(|c| c.text.contains("changed")).map(|c| c.id.clone())
/// };
/// assert_eq!(id_of(&first), id_of(&second));
/// ```
pub fn compute_diff(
    original: &str,
    edited: &str,
    previous: Option<PreviousDiff<'_>>,
    config: &DiffConfig,
) -> DiffResult {
    if original == edited {
        return DiffResult::unchanged(original, edited);
    }

    let spans = diff_spans(original, edited, config);

    let mut changes = Vec::new();
    let mut deletions = 0;
    let mut insertions = 0;
    let mut edited_offset = 0;
    let mut location = Location::start();

    for span in &spans {
        let text = span.text();
        match span.op {
            Op::Equal => {
                edited_offset += span.text.len();
                location.advance(&text);
            }
            Op::Delete => {
                // Deleted text never existed in the edited document, so the
                // cursor stays put.
                changes.push(Change {
                    id: change_id(ChangeType::Deletion, &text, edited_offset),
                    change_type: ChangeType::Deletion,
                    text,
                    edited_offset,
                    location,
                });
                deletions += 1;
            }
            Op::Insert => {
                let start = location;
                location.advance(&text);
                changes.push(Change {
                    id: change_id(ChangeType::Insertion, &text, edited_offset),
                    change_type: ChangeType::Insertion,
                    text,
                    edited_offset,
                    location: start,
                });
                insertions += 1;
                edited_offset += span.text.len();
            }
        }
    }

    debug!(
        spans = spans.len(),
        deletions, insertions, "computed text diff"
    );

    let changes = match previous {
        Some(prev) => reconcile_with_config(
            changes,
            prev.changes,
            edited,
            prev.edited_text,
            &config.reconcile,
        ),
        None => {
            dedupe_ids(&mut changes);
            changes
        }
    };
    debug_assert!(!has_duplicate_ids(&changes));

    DiffResult {
        changes,
        deletions,
        insertions,
        original_text: original.to_string(),
        edited_text: edited.to_string(),
    }
}

/// Runs the raw Myers diff over chars and optionally cleans it up.
fn diff_spans(original: &str, edited: &str, config: &DiffConfig) -> Vec<Span> {
    let old: Vec<char> = original.chars().collect();
    let new: Vec<char> = edited.chars().collect();
    let deadline = config
        .timeout
        .and_then(|budget| Instant::now().checked_add(budget));
    let ops = similar::capture_diff_slices_deadline(Algorithm::Myers, &old, &new, deadline);

    let mut spans = Vec::with_capacity(ops.len());
    for op in ops {
        match op {
            DiffOp::Equal { old_index, len, .. } => {
                spans.push(Span::new(Op::Equal, &old[old_index..old_index + len]));
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                spans.push(Span::new(Op::Delete, &old[old_index..old_index + old_len]));
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                spans.push(Span::new(Op::Insert, &new[new_index..new_index + new_len]));
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                spans.push(Span::new(Op::Delete, &old[old_index..old_index + old_len]));
                spans.push(Span::new(Op::Insert, &new[new_index..new_index + new_len]));
            }
        }
    }

    if config.semantic_cleanup {
        cleanup_semantic(&mut spans);
    } else {
        cleanup_merge(&mut spans);
    }
    spans
}

/// Content-derived provisional id for a change.
pub(crate) fn change_id(change_type: ChangeType, text: &str, offset: usize) -> String {
    let input = format!(
        "{}|{}|{}|{}",
        change_type.as_str(),
        offset,
        text.chars().count(),
        text
    );
    format!("c_{}", short_hash(&input))
}

/// First 12 hex digits of the SHA-256 of `input`.
pub(crate) fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..6])
}

/// Converts a char offset into a line/column position in `text`.
///
/// Offsets past the end of `text` are clamped to its length.
///
/// # Examples
///
/// ```
/// use prosediff::offset_to_location;
///
/// let loc = offset_to_location("ab\ncd", 4);
/// assert_eq!((loc.line, loc.col), (2, 1));
/// ```
pub fn offset_to_location(text: &str, offset: usize) -> Location {
    let mut location = Location::start();
    for c in text.chars().take(offset) {
        if c == '\n' {
            location.line += 1;
            location.col = 0;
        } else {
            location.col += 1;
        }
    }
    location
}

/// Groups a deletion directly followed by an insertion at the same location
/// into one replacement. Every other change forms a group of its own.
pub fn group_changes(changes: &[Change]) -> Vec<Vec<&Change>> {
    let mut groups: Vec<Vec<&Change>> = Vec::new();
    for change in changes {
        let pairs_with_last = groups.last().and_then(|g| g.last()).is_some_and(|last| {
            last.change_type == ChangeType::Deletion
                && change.change_type == ChangeType::Insertion
                && last.location == change.location
        });
        match groups.last_mut() {
            Some(group) if pairs_with_last && group.len() == 1 => group.push(change),
            _ => groups.push(vec![change]),
        }
    }
    groups
}

/// Every edited line touched by a change, including lines spanned by
/// multi-line text.
pub fn lines_with_changes(changes: &[Change]) -> BTreeSet<usize> {
    let mut lines = BTreeSet::new();
    for change in changes {
        let extra = change.text.matches('\n').count();
        for line in change.location.line..=change.location.line + extra {
            lines.insert(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DiffConfig {
        DiffConfig::default()
    }

    #[test]
    fn test_identical_short_circuits() {
        let diff = compute_diff("same", "same", None, &config());
        assert!(diff.is_empty());
        assert_eq!(diff.deletions, 0);
        assert_eq!(diff.insertions, 0);
        assert!(diff.is_current_for("same", "same"));
    }

    #[test]
    fn test_pure_insertion() {
        let diff = compute_diff("A\nB\nC", "A\nB changed\nC", None, &config());
        assert_eq!(diff.changes.len(), 1);
        let change = &diff.changes[0];
        assert_eq!(change.change_type, ChangeType::Insertion);
        assert_eq!(change.text, " changed");
        assert_eq!(change.edited_offset, 3);
        assert_eq!(change.location, Location { line: 2, col: 1 });
    }

    #[test]
    fn test_word_replacement() {
        let diff = compute_diff("alpha\nbeta\ngamma", "alpha\nBETA\ngamma", None, &config());
        assert_eq!(diff.deletions, 1);
        assert_eq!(diff.insertions, 1);
        assert_eq!(diff.changes[0].change_type, ChangeType::Deletion);
        assert_eq!(diff.changes[0].text, "beta");
        assert_eq!(diff.changes[1].change_type, ChangeType::Insertion);
        assert_eq!(diff.changes[1].text, "BETA");
        // Both sides of a replacement anchor at the same edited offset.
        assert_eq!(diff.changes[0].edited_offset, 6);
        assert_eq!(diff.changes[1].edited_offset, 6);
    }

    #[test]
    fn test_deletion_does_not_advance_cursor() {
        let diff = compute_diff("one two three", "one three", None, &config());
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type, ChangeType::Deletion);
        assert_eq!(diff.changes[0].text, "two ");
        assert_eq!(diff.changes[0].edited_offset, 4);
    }

    #[test]
    fn test_offsets_count_chars() {
        let diff = compute_diff("héllo wörld", "héllo schöne wörld", None, &config());
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].text, "schöne ");
        assert_eq!(diff.changes[0].edited_offset, 6);
        assert_eq!(diff.changes[0].location.col, 6);
    }

    #[test]
    fn test_ids_are_deterministic_and_unique() {
        let a = compute_diff("alpha one\nalpha two", "alpha one ++\nalpha two ++", None, &config());
        let b = compute_diff("alpha one\nalpha two", "alpha one ++\nalpha two ++", None, &config());
        let ids_a: Vec<_> = a.changes.iter().map(|c| c.id.clone()).collect();
        let ids_b: Vec<_> = b.changes.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(ids_a.len(), 2);
        assert_ne!(ids_a[0], ids_a[1]);
    }

    #[test]
    fn test_change_id_format() {
        let id = change_id(ChangeType::Insertion, "x", 3);
        assert!(id.starts_with("c_"));
        assert_eq!(id.len(), 14);
        assert_ne!(id, change_id(ChangeType::Deletion, "x", 3));
        assert_ne!(id, change_id(ChangeType::Insertion, "x", 4));
    }

    #[test]
    fn test_offset_to_location_clamps() {
        assert_eq!(offset_to_location("ab\ncd", 0), Location { line: 1, col: 0 });
        assert_eq!(offset_to_location("ab\ncd", 3), Location { line: 2, col: 0 });
        assert_eq!(offset_to_location("ab\ncd", 999), Location { line: 2, col: 2 });
    }

    #[test]
    fn test_summary() {
        let diff = compute_diff("a b", "a b", None, &config());
        assert_eq!(diff.summary(), "No changes");

        let diff = compute_diff("one", "one two three", None, &config());
        assert_eq!(diff.summary(), "1 insertion");
    }

    #[test]
    fn test_group_changes_pairs_replacements() {
        let diff = compute_diff("alpha\nbeta\ngamma", "alpha\nBETA\ngamma\nmore", None, &config());
        let groups = group_changes(&diff.changes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].text, "beta");
        assert_eq!(groups[0][1].text, "BETA");
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_lines_with_changes_spans_newlines() {
        let diff = compute_diff("top\nbottom", "top\nnew one\nnew two\nbottom", None, &config());
        let lines = lines_with_changes(&diff.changes);
        assert!(lines.contains(&2));
        assert!(lines.contains(&3));
        assert!(!lines.contains(&1));
    }

    #[test]
    fn test_without_cleanup_still_reconstructs() {
        let config = DiffConfig {
            semantic_cleanup: false,
            ..Default::default()
        };
        let diff = compute_diff("kitten", "sitting", None, &config);
        assert!(diff.deletions > 0);
        assert!(diff.insertions > 0);
    }

    #[test]
    fn test_change_serializes_wire_fields() {
        let diff = compute_diff("a", "ab", None, &config());
        let json = serde_json::to_value(&diff.changes[0]).unwrap();
        assert_eq!(json["type"], "insertion");
        assert_eq!(json["text"], "b");
        assert_eq!(json["location"]["line"], 1);
        assert_eq!(json["location"]["col"], 1);
        assert!(json.get("edited_offset").is_none());
    }
}
