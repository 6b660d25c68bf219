//! Replayable patches derived from a diff.
//!
//! A [`Patch`] is the change list of a [`DiffResult`] rewritten as a sequence
//! of retain/delete/insert operations over the original text. Applying it to
//! the original reproduces the edited text exactly, and every deletion is
//! checked against the source first.
//!
//! # Examples
//!
//! ```
//! use prosediff::patch::Patch;
//! use prosediff::text_diff::{compute_diff, DiffConfig};
//!
//! let diff = compute_diff("one two three", "one three", None, &DiffConfig::default());
//! let patch = Patch::from_diff(&diff);
//! assert_eq!(patch.apply("one two three").unwrap(), "one three");
//! ```

use crate::error::PatchError;
use crate::text_diff::{ChangeType, DiffResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Copy this many chars from the source
    Retain(usize),
    Delete(String),
    Insert(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub ops: Vec<PatchOp>,
}

impl Patch {
    /// Builds a patch from the changes of `diff`, which must be in diff order.
    pub fn from_diff(diff: &DiffResult) -> Self {
        let mut ops = Vec::with_capacity(diff.changes.len() * 2 + 1);
        let mut original_pos = 0;
        let mut edited_pos = 0;

        for change in &diff.changes {
            let gap = change.edited_offset.saturating_sub(edited_pos);
            if gap > 0 {
                ops.push(PatchOp::Retain(gap));
                original_pos += gap;
                edited_pos += gap;
            }
            match change.change_type {
                ChangeType::Deletion => {
                    original_pos += change.char_len();
                    ops.push(PatchOp::Delete(change.text.clone()));
                }
                ChangeType::Insertion => {
                    edited_pos += change.char_len();
                    ops.push(PatchOp::Insert(change.text.clone()));
                }
            }
        }

        let tail = diff.original_text.chars().count().saturating_sub(original_pos);
        if tail > 0 {
            ops.push(PatchOp::Retain(tail));
        }

        Self { ops }
    }

    /// Returns true if applying the patch leaves any source unchanged.
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, PatchOp::Retain(_)))
    }

    /// Applies the patch to `source`.
    ///
    /// Source text past the last operation is copied through unchanged.
    ///
    /// # Errors
    ///
    /// - `PatchError::OutOfBounds` if an operation reaches past the source
    /// - `PatchError::DeletionMismatch` if deleted text differs from the source
    pub fn apply(&self, source: &str) -> Result<String, PatchError> {
        let chars: Vec<char> = source.chars().collect();
        let mut out = String::with_capacity(source.len());
        let mut pos = 0;

        for op in &self.ops {
            match op {
                PatchOp::Retain(n) => {
                    let end = checked_end(pos, *n, chars.len())?;
                    out.extend(&chars[pos..end]);
                    pos = end;
                }
                PatchOp::Delete(text) => {
                    let end = checked_end(pos, text.chars().count(), chars.len())?;
                    let found: String = chars[pos..end].iter().collect();
                    if found != *text {
                        return Err(PatchError::deletion_mismatch(pos, text.as_str(), found));
                    }
                    pos = end;
                }
                PatchOp::Insert(text) => out.push_str(text),
            }
        }

        out.extend(&chars[pos..]);
        Ok(out)
    }
}

fn checked_end(pos: usize, len: usize, total: usize) -> Result<usize, PatchError> {
    let end = pos + len;
    if end > total {
        return Err(PatchError::OutOfBounds { offset: end, len: total });
    }
    Ok(end)
}
