//! prosediff - Stable change tracking for edited prose.
//!
//! This library compares two snapshots of a document and reports what
//! changed, both as character-level insertions and deletions and as
//! structural markdown deltas. Change ids survive recomputation: passing
//! the previous result back in keeps an edit's id even after unrelated
//! edits elsewhere have shifted its offset.
//!
//! # Example
//!
//! ```
//! use prosediff::{compute_diff, compute_semantic_changes, DiffConfig};
//!
//! let config = DiffConfig::default();
//! let first = compute_diff("A\nB\nC", "A\nB changed\nC", None, &config);
//!
//! // Another edit above shifts the first one down a line.
//! let second = compute_diff(
//!     "A\nB\nC",
//!     "Intro\nA\nB changed\nC",
//!     Some(first.as_previous()),
//!     &config,
//! );
//! let kept = second.changes.iter().find(|c| c.text == " changed").unwrap();
//! assert_eq!(kept.id, first.changes[0].id);
//!
//! let semantic = compute_semantic_changes("# Title", "## Title");
//! assert_eq!(semantic.len(), 1);
//! ```

pub mod cleanup;
pub mod error;
pub mod input;
pub mod logging;
pub mod markdown;
pub mod output;
pub mod patch;
pub mod reconcile;
pub mod semantic;
pub mod similarity;
pub mod text_diff;

// Re-export commonly used types for convenience
pub use error::{InputError, OutputError, PatchError, ProsediffError};
pub use input::read_document;
pub use markdown::{parse_semantic_lines, BlockType, SemanticLine};
pub use output::{format_report, OutputFormat, OutputOptions, Report};
pub use patch::{Patch, PatchOp};
pub use reconcile::{reconcile, reconcile_with_config, ReconcileConfig};
pub use semantic::{compute_semantic_changes, SemanticChange, SemanticChangeType, SemanticState};
pub use similarity::text_similarity;
pub use text_diff::{
    compute_diff, group_changes, lines_with_changes, offset_to_location, Change, ChangeType,
    DiffConfig, DiffResult, Location, PreviousDiff,
};
