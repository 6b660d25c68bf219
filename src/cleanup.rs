//! Semantic cleanup of raw character-level diff operations.
//!
//! A minimal edit script is rarely what a reviewer wants to see: `"beta"` →
//! `"BETA"` may come out of Myers as a handful of single-letter edits glued
//! together by coincidental equalities. The passes here fold those fragments
//! back into whole-word edits and slide edits onto word and line boundaries,
//! without ever changing what the script reconstructs.
//!
//! All work happens on `Vec<char>` so that indices are char offsets.

/// Operation carried by a diff span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equal,
    Delete,
    Insert,
}

/// A run of characters sharing one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub op: Op,
    pub text: Vec<char>,
}

impl Span {
    pub fn new(op: Op, text: impl Into<Vec<char>>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }

    pub fn of(op: Op, text: &str) -> Self {
        Self::new(op, text.chars().collect::<Vec<_>>())
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }
}

/// Runs the full cleanup: merge, equality elimination, boundary alignment,
/// and overlap extraction.
///
/// Alignment can swallow an equality whole and leave two edits of the same
/// kind side by side, so the spans are merged again after each reshaping
/// pass. The result never holds two adjacent spans with the same op.
pub fn cleanup_semantic(spans: &mut Vec<Span>) {
    cleanup_merge(spans);
    if eliminate_small_equalities(spans) {
        cleanup_merge(spans);
    }
    align_to_boundaries(spans);
    cleanup_merge(spans);
    extract_overlaps(spans);
    spans.retain(|span| !span.text.is_empty());
    join_adjacent(spans);
}

/// Coalesces edits between equalities into one delete plus one insert,
/// factors their common prefix and suffix out into the surrounding
/// equalities, and slides lone edits sideways until nothing changes.
pub fn cleanup_merge(spans: &mut Vec<Span>) {
    loop {
        coalesce(spans);
        if !slide_edits(spans) {
            break;
        }
    }
}

fn coalesce(spans: &mut Vec<Span>) {
    let mut out: Vec<Span> = Vec::with_capacity(spans.len());
    let mut deleted: Vec<char> = Vec::new();
    let mut inserted: Vec<char> = Vec::new();

    let sentinel = Span::new(Op::Equal, Vec::new());
    for span in spans.drain(..).chain(std::iter::once(sentinel)) {
        match span.op {
            Op::Delete => deleted.extend(span.text),
            Op::Insert => inserted.extend(span.text),
            Op::Equal => {
                let mut trailing = span.text;
                if !deleted.is_empty() && !inserted.is_empty() {
                    let prefix = common_prefix(&inserted, &deleted);
                    if prefix > 0 {
                        push_equal(&mut out, &inserted[..prefix]);
                        inserted.drain(..prefix);
                        deleted.drain(..prefix);
                    }
                    let suffix = common_suffix(&inserted, &deleted);
                    if suffix > 0 {
                        let mut joined = inserted.split_off(inserted.len() - suffix);
                        joined.extend(trailing);
                        trailing = joined;
                        deleted.truncate(deleted.len() - suffix);
                    }
                }
                if !deleted.is_empty() {
                    out.push(Span::new(Op::Delete, std::mem::take(&mut deleted)));
                }
                if !inserted.is_empty() {
                    out.push(Span::new(Op::Insert, std::mem::take(&mut inserted)));
                }
                push_equal(&mut out, &trailing);
            }
        }
    }

    *spans = out;
}

/// Joins neighbouring spans that share an op, without any reshaping.
fn join_adjacent(spans: &mut Vec<Span>) {
    let mut out: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        match out.last_mut() {
            Some(last) if last.op == span.op => last.text.extend(span.text),
            _ => out.push(span),
        }
    }
    *spans = out;
}

fn push_equal(out: &mut Vec<Span>, text: &[char]) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.op == Op::Equal => last.text.extend_from_slice(text),
        _ => out.push(Span::new(Op::Equal, text.to_vec())),
    }
}

/// Shifts a single edit wedged between two equalities when it can swallow
/// one of them entirely, e.g. `A<BA>C` becomes `<AB>AC`.
fn slide_edits(spans: &mut Vec<Span>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < spans.len() {
        if spans[i - 1].op == Op::Equal && spans[i + 1].op == Op::Equal {
            let prev_len = spans[i - 1].text.len();
            let next_len = spans[i + 1].text.len();
            if spans[i].text.ends_with(&spans[i - 1].text) {
                let prev = std::mem::take(&mut spans[i - 1].text);
                let edit_len = spans[i].text.len();
                let mut edit = prev.clone();
                edit.extend_from_slice(&spans[i].text[..edit_len - prev_len]);
                spans[i].text = edit;
                let mut next = prev;
                next.append(&mut spans[i + 1].text);
                spans[i + 1].text = next;
                spans.remove(i - 1);
                changed = true;
            } else if spans[i].text.starts_with(&spans[i + 1].text) {
                let next = spans.remove(i + 1).text;
                spans[i - 1].text.extend_from_slice(&next);
                let mut edit = spans[i].text.split_off(next_len);
                edit.extend(next);
                spans[i].text = edit;
                changed = true;
            }
        }
        i += 1;
    }
    changed
}

/// Folds an equality into its neighbours when it is no longer than the
/// edits on both of its sides. Returns true if anything changed.
fn eliminate_small_equalities(spans: &mut Vec<Span>) -> bool {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<usize> = None;
    let (mut ins_before, mut del_before) = (0usize, 0usize);
    let (mut ins_after, mut del_after) = (0usize, 0usize);

    let mut i = 0;
    while i < spans.len() {
        match spans[i].op {
            Op::Equal => {
                equalities.push(i);
                ins_before = ins_after;
                del_before = del_after;
                ins_after = 0;
                del_after = 0;
                last_equality = Some(spans[i].text.len());
            }
            op => {
                if op == Op::Insert {
                    ins_after += spans[i].text.len();
                } else {
                    del_after += spans[i].text.len();
                }
                let foldable = last_equality.is_some_and(|len| {
                    len <= ins_before.max(del_before) && len <= ins_after.max(del_after)
                });
                let fold_at = if foldable {
                    equalities.last().copied()
                } else {
                    None
                };
                if let Some(at) = fold_at {
                    let text = spans[at].text.clone();
                    spans.insert(at, Span::new(Op::Delete, text));
                    spans[at + 1].op = Op::Insert;
                    // The folded equality and the one before it are both stale.
                    equalities.pop();
                    equalities.pop();
                    ins_before = 0;
                    del_before = 0;
                    ins_after = 0;
                    del_after = 0;
                    last_equality = None;
                    changed = true;
                    i = equalities.last().map_or(0, |&e| e + 1);
                    continue;
                }
            }
        }
        i += 1;
    }
    changed
}

/// Slides each edit that sits between two equalities to the position with
/// the best boundary score, preferring blank lines, then line breaks, then
/// sentence ends, then word breaks.
fn align_to_boundaries(spans: &mut Vec<Span>) {
    let mut i = 1;
    while i + 1 < spans.len() {
        if spans[i - 1].op == Op::Equal && spans[i + 1].op == Op::Equal {
            let mut left = spans[i - 1].text.clone();
            let mut edit = spans[i].text.clone();
            let mut right = spans[i + 1].text.clone();

            // Shift as far left as possible first.
            let common = common_suffix(&left, &edit);
            if common > 0 {
                let tail = edit.split_off(edit.len() - common);
                left.truncate(left.len() - common);
                let mut shifted = tail.clone();
                shifted.extend(edit);
                edit = shifted;
                let mut grown = tail;
                grown.extend(right);
                right = grown;
            }

            let mut best = (left.clone(), edit.clone(), right.clone());
            let mut best_score = boundary_score(&left, &edit) + boundary_score(&edit, &right);
            while !edit.is_empty() && !right.is_empty() && edit[0] == right[0] {
                let first = edit.remove(0);
                left.push(first);
                edit.push(right.remove(0));
                let score = boundary_score(&left, &edit) + boundary_score(&edit, &right);
                // >= so that ties favour the rightmost position.
                if score >= best_score {
                    best_score = score;
                    best = (left.clone(), edit.clone(), right.clone());
                }
            }

            if spans[i - 1].text != best.0 {
                let (best_left, best_edit, best_right) = best;
                if best_left.is_empty() {
                    spans.remove(i - 1);
                    i -= 1;
                } else {
                    spans[i - 1].text = best_left;
                }
                spans[i].text = best_edit;
                if best_right.is_empty() {
                    spans.remove(i + 1);
                    i = i.saturating_sub(1);
                } else {
                    spans[i + 1].text = best_right;
                }
            }
        }
        i += 1;
    }
}

/// Scores the seam between `one` and `two`, from 0 (mid-word) to 6 (edge of
/// the text).
fn boundary_score(one: &[char], two: &[char]) -> u32 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let space1 = non_alnum1 && c1.is_whitespace();
    let space2 = non_alnum2 && c2.is_whitespace();
    let break1 = space1 && (c1 == '\n' || c1 == '\r');
    let break2 = space2 && (c2 == '\n' || c2 == '\r');
    let blank1 = break1 && ends_with_blank_line(one);
    let blank2 = break2 && starts_with_blank_line(two);

    if blank1 || blank2 {
        5
    } else if break1 || break2 {
        4
    } else if non_alnum1 && !space1 && space2 {
        3
    } else if space1 || space2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn ends_with_blank_line(text: &[char]) -> bool {
    text.ends_with(&['\n', '\n']) || text.ends_with(&['\n', '\r', '\n'])
}

fn starts_with_blank_line(text: &[char]) -> bool {
    let rest = match text {
        ['\r', '\n', rest @ ..] | ['\n', rest @ ..] => rest,
        _ => return false,
    };
    matches!(rest, ['\n', ..] | ['\r', '\n', ..])
}

/// Exposes the overlap of an adjacent delete/insert pair as an equality when
/// it covers at least half of either side: `<abcxxx><xxxdef>` becomes
/// `<abc>xxx<def>`.
fn extract_overlaps(spans: &mut Vec<Span>) {
    let mut i = 1;
    while i < spans.len() {
        if spans[i - 1].op == Op::Delete && spans[i].op == Op::Insert {
            let deletion = spans[i - 1].text.clone();
            let insertion = spans[i].text.clone();
            let forward = common_overlap(&deletion, &insertion);
            let backward = common_overlap(&insertion, &deletion);
            if forward >= backward {
                if forward * 2 >= deletion.len() || forward * 2 >= insertion.len() {
                    spans.insert(i, Span::new(Op::Equal, insertion[..forward].to_vec()));
                    spans[i - 1].text = deletion[..deletion.len() - forward].to_vec();
                    spans[i + 1].text = insertion[forward..].to_vec();
                    i += 1;
                }
            } else if backward * 2 >= deletion.len() || backward * 2 >= insertion.len() {
                spans.insert(i, Span::new(Op::Equal, deletion[..backward].to_vec()));
                spans[i - 1] = Span::new(
                    Op::Insert,
                    insertion[..insertion.len() - backward].to_vec(),
                );
                spans[i + 1] = Span::new(Op::Delete, deletion[backward..].to_vec());
                i += 1;
            }
            i += 1;
        }
        i += 1;
    }
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Length of the longest suffix of `a` that is also a prefix of `b`.
fn common_overlap(a: &[char], b: &[char]) -> usize {
    let max = a.len().min(b.len());
    (1..=max)
        .rev()
        .find(|&k| a[a.len() - k..] == b[..k])
        .unwrap_or(0)
}
