//! Change identity reconciliation.
//!
//! A fresh diff hands out content-derived ids that include the change offset,
//! so an edit near the top of the document would otherwise rename every
//! change below it. Reconciliation matches each new change against the
//! changes of the previous diff and, when it finds the same edit, keeps the
//! old id.
//!
//! Matching is greedy in input order. For each new change, every unclaimed
//! previous change of the same type is scored as
//!
//! ```text
//! text_similarity * text_weight
//!     + anchor_similarity * anchor_weight
//!     - |offset delta| * distance_weight
//! ```
//!
//! and candidates whose text similarity is below `min_similarity` are never
//! eligible, whatever their composite score.

use crate::similarity::{text_similarity, ContextAnchor};
use crate::text_diff::{short_hash, Change};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Weights and thresholds for reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// Text similarity floor below which a candidate is rejected
    pub min_similarity: f64,
    /// Weight of the changed-text similarity
    pub text_weight: f64,
    /// Weight of the surrounding-context similarity
    pub anchor_weight: f64,
    /// Penalty per char of offset drift
    pub distance_weight: f64,
    /// Chars of context taken on each side of a change
    pub anchor_radius: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.34,
            text_weight: 0.74,
            anchor_weight: 0.26,
            distance_weight: 0.00015,
            anchor_radius: 32,
        }
    }
}

/// Reconciles `next` against `previous` with the default configuration.
///
/// See [`reconcile_with_config`].
pub fn reconcile(
    next: Vec<Change>,
    previous: &[Change],
    edited_text: &str,
    previous_edited_text: Option<&str>,
) -> Vec<Change> {
    reconcile_with_config(
        next,
        previous,
        edited_text,
        previous_edited_text,
        &ReconcileConfig::default(),
    )
}

/// Re-labels `next` so that changes matching a previous change keep its id.
///
/// `edited_text` is the document the `next` offsets point into and
/// `previous_edited_text` the one the `previous` offsets point into. When the
/// latter is missing or empty, context anchors score zero for every pair.
/// An empty `previous` leaves every id fresh. In every case the returned
/// changes carry pairwise distinct ids, even when `previous` itself holds
/// duplicates.
pub fn reconcile_with_config(
    next: Vec<Change>,
    previous: &[Change],
    edited_text: &str,
    previous_edited_text: Option<&str>,
    config: &ReconcileConfig,
) -> Vec<Change> {
    if previous.is_empty() {
        let mut next = next;
        dedupe_ids(&mut next);
        return next;
    }

    let previous_context = previous_edited_text.filter(|text| !text.is_empty());
    let edited_chars: Vec<char> = edited_text.chars().collect();
    let previous_anchors: Vec<ContextAnchor> = match previous_context {
        Some(text) => {
            let chars: Vec<char> = text.chars().collect();
            previous
                .iter()
                .map(|p| ContextAnchor::around(&chars, p.edited_offset, config.anchor_radius))
                .collect()
        }
        None => vec![ContextAnchor::default(); previous.len()],
    };

    let mut claimed = vec![false; previous.len()];
    let mut matched_ids: HashSet<String> = HashSet::new();
    let mut relabeled = Vec::with_capacity(next.len());
    let mut kept_fresh = Vec::new();

    for (position, mut change) in next.into_iter().enumerate() {
        let anchor = ContextAnchor::around(&edited_chars, change.edited_offset, config.anchor_radius);
        let mut best: Option<(usize, f64)> = None;

        for (index, candidate) in previous.iter().enumerate() {
            if claimed[index]
                || candidate.change_type != change.change_type
                || matched_ids.contains(&candidate.id)
            {
                continue;
            }
            let text_score = text_similarity(&change.text, &candidate.text);
            if text_score <= 0.0 || text_score < config.min_similarity {
                continue;
            }
            let context_score = if previous_context.is_some() {
                anchor.similarity(&previous_anchors[index])
            } else {
                0.0
            };
            let distance = change.edited_offset.abs_diff(candidate.edited_offset) as f64;
            let score = text_score * config.text_weight + context_score * config.anchor_weight
                - distance * config.distance_weight;
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) => {
                claimed[index] = true;
                trace!(
                    from = %change.id,
                    to = %previous[index].id,
                    score,
                    "reconciled change id"
                );
                change.id = previous[index].id.clone();
                matched_ids.insert(change.id.clone());
            }
            None => kept_fresh.push(position),
        }
        relabeled.push(change);
    }

    debug!(
        matched = matched_ids.len(),
        fresh = kept_fresh.len(),
        "reconciled change ids"
    );

    ensure_unique_ids(&mut relabeled, &kept_fresh, matched_ids);
    relabeled
}

/// A fresh id can coincide with an id inherited by another change, e.g. when
/// an earlier change claimed the previous change this one was derived from.
/// Such ids are re-hashed with an ordinal salt until they are unique.
fn ensure_unique_ids(changes: &mut [Change], fresh: &[usize], mut taken: HashSet<String>) {
    for &position in fresh {
        let change = &mut changes[position];
        let mut salt = 0usize;
        while taken.contains(&change.id) {
            salt += 1;
            change.id = format!("c_{}", short_hash(&format!("{}#{}", change.id, salt)));
        }
        taken.insert(change.id.clone());
    }
}

/// Makes every id in `changes` unique, treating all of them as fresh.
pub(crate) fn dedupe_ids(changes: &mut [Change]) {
    let positions: Vec<usize> = (0..changes.len()).collect();
    ensure_unique_ids(changes, &positions, HashSet::new());
}

/// Returns true if any two changes share an id.
pub fn has_duplicate_ids(changes: &[Change]) -> bool {
    let mut seen = HashSet::new();
    changes.iter().any(|c| !seen.insert(c.id.as_str()))
}
