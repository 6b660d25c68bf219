//! Text-similarity primitives used to re-identify changes across recomputation.
//!
//! Everything here is a pure function over `&str`. Lengths are counted in
//! `char`s so that multi-byte prose scores the same as ASCII.

use std::collections::HashMap;

/// Normalizes text for fuzzy comparison: collapses whitespace runs into a
/// single space, trims, and lowercases.
///
/// # Examples
///
/// ```
/// use prosediff::similarity::normalize_text;
///
/// assert_eq!(normalize_text("  Hello \n  World "), "hello world");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Builds the multiset of character bigrams of `text`.
///
/// A single-character string yields itself as its only gram so that one-letter
/// edits can still be compared.
pub fn bigrams(text: &str) -> HashMap<String, usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut grams = HashMap::new();
    match chars.len() {
        0 => {}
        1 => {
            grams.insert(text.to_string(), 1);
        }
        _ => {
            for pair in chars.windows(2) {
                let gram: String = pair.iter().collect();
                *grams.entry(gram).or_insert(0) += 1;
            }
        }
    }
    grams
}

/// Scores how similar two changed spans are, from 0.0 to 1.0.
///
/// Identical normalized text scores 1.0. If one side contains the other, the
/// score is the ratio of the shorter to the longer length. Otherwise it is the
/// Sørensen–Dice coefficient over character bigram multisets. Empty input on
/// either side scores 0.0.
///
/// # Examples
///
/// ```
/// use prosediff::similarity::text_similarity;
///
/// assert_eq!(text_similarity("Changed", "changed"), 1.0);
/// assert_eq!(text_similarity("ab", "abcd"), 0.5);
/// assert_eq!(text_similarity("", "abc"), 0.0);
/// ```
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let left = normalize_text(a);
    let right = normalize_text(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    if left == right {
        return 1.0;
    }
    if left.contains(&right) || right.contains(&left) {
        let l = left.chars().count() as f64;
        let r = right.chars().count() as f64;
        return l.min(r) / l.max(r);
    }

    let left_grams = bigrams(&left);
    let right_grams = bigrams(&right);
    let left_total: usize = left_grams.values().sum();
    let right_total: usize = right_grams.values().sum();
    if left_total == 0 || right_total == 0 {
        return 0.0;
    }

    let intersection: usize = left_grams
        .iter()
        .map(|(gram, count)| (*count).min(right_grams.get(gram).copied().unwrap_or(0)))
        .sum();

    (2 * intersection) as f64 / (left_total + right_total) as f64
}

/// Normalized text on either side of a change offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextAnchor {
    pub before: String,
    pub after: String,
}

impl ContextAnchor {
    /// Extracts up to `radius` chars before and after `offset` in `chars`.
    ///
    /// Offsets past the end are clamped, so the `after` side is simply empty.
    pub fn around(chars: &[char], offset: usize, radius: usize) -> Self {
        let offset = offset.min(chars.len());
        let start = offset.saturating_sub(radius);
        let end = (offset + radius).min(chars.len());
        let before: String = chars[start..offset].iter().collect();
        let after: String = chars[offset..end].iter().collect();
        Self {
            before: normalize_text(&before),
            after: normalize_text(&after),
        }
    }

    /// Averages the similarity of the edges that carry text on both sides.
    ///
    /// Returns 0.0 when neither edge can be compared.
    pub fn similarity(&self, other: &ContextAnchor) -> f64 {
        let mut total = 0.0;
        let mut signals = 0;
        if !self.before.is_empty() && !other.before.is_empty() {
            total += text_similarity(&self.before, &other.before);
            signals += 1;
        }
        if !self.after.is_empty() && !other.after.is_empty() {
            total += text_similarity(&self.after, &other.after);
            signals += 1;
        }
        if signals == 0 {
            0.0
        } else {
            total / signals as f64
        }
    }
}
