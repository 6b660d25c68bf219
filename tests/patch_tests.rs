use prosediff::{compute_diff, DiffConfig, Patch, PatchError, PatchOp};
use std::time::Duration;

fn round_trip(original: &str, edited: &str, semantic_cleanup: bool) {
    let config = DiffConfig {
        semantic_cleanup,
        ..Default::default()
    };
    let diff = compute_diff(original, edited, None, &config);
    let patch = Patch::from_diff(&diff);
    assert_eq!(
        patch.apply(original).unwrap(),
        edited,
        "patch from {:?} to {:?}",
        original,
        edited
    );
}

#[test]
fn test_round_trip_prose_edits() {
    let cases = [
        ("", "fresh text"),
        ("all gone", ""),
        ("The cat sat.", "The big cat sat down."),
        ("alpha\nbeta\ngamma", "alpha\nBETA\ngamma\nnew appendix"),
        ("one two three four", "four three two one"),
        ("# Title\n\n- a\n- b\n", "## Title\n\n  - a\n1. b\n"),
        ("naïve café", "naive cafe"),
        ("line\r\nbreaks\r\n", "line\nbreaks\n"),
        ("emoji 🎉 here", "emoji 🎊🎉 there"),
    ];
    for (original, edited) in cases {
        round_trip(original, edited, true);
        round_trip(original, edited, false);
    }
}

#[test]
fn test_round_trip_after_reconciliation() {
    let original = "A\nB\nC";
    let first = compute_diff(original, "A\nB changed\nC", None, &DiffConfig::default());
    let edited = "Intro\nA\nB changed\nC";
    let second = compute_diff(
        original,
        edited,
        Some(first.as_previous()),
        &DiffConfig::default(),
    );
    assert_eq!(Patch::from_diff(&second).apply(original).unwrap(), edited);
}

#[test]
fn test_patch_rejects_wrong_source() {
    let diff = compute_diff("one two three", "one three", None, &DiffConfig::default());
    let patch = Patch::from_diff(&diff);
    let err = patch.apply("one six three").unwrap_err();
    assert!(matches!(err, PatchError::DeletionMismatch { offset: 4, .. }));
}

#[test]
fn test_patch_rejects_short_source() {
    let patch = Patch {
        ops: vec![PatchOp::Retain(2), PatchOp::Delete("long".to_string())],
    };
    assert_eq!(
        patch.apply("abc").unwrap_err(),
        PatchError::OutOfBounds { offset: 6, len: 3 }
    );
}

#[test]
fn test_patch_copies_trailing_source() {
    let patch = Patch {
        ops: vec![PatchOp::Insert(">> ".to_string())],
    };
    assert_eq!(patch.apply("quote").unwrap(), ">> quote");
}

fn noise(seed: u64, len: usize) -> String {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let letters = b"abcdefghij klmnop\n";
            letters[((state >> 33) % letters.len() as u64) as usize] as char
        })
        .collect()
}

#[test]
fn test_large_unrelated_texts_round_trip() {
    let original = noise(1, 20_000);
    let edited = noise(2, 20_000);
    let config = DiffConfig {
        timeout: Some(Duration::from_millis(50)),
        ..Default::default()
    };
    let diff = compute_diff(&original, &edited, None, &config);
    assert_eq!(Patch::from_diff(&diff).apply(&original).unwrap(), edited);
}

#[test]
fn test_expired_budget_still_round_trips() {
    let original = noise(3, 500);
    let edited = noise(4, 500);
    let config = DiffConfig {
        timeout: Some(Duration::ZERO),
        ..Default::default()
    };
    let diff = compute_diff(&original, &edited, None, &config);
    assert_eq!(Patch::from_diff(&diff).apply(&original).unwrap(), edited);
}
