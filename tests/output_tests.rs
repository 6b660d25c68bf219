use prosediff::{
    compute_diff, compute_semantic_changes, format_report, DiffConfig, OutputFormat,
    OutputOptions, Report,
};

fn plain(original: &str, edited: &str, options: &OutputOptions) -> String {
    let diff = compute_diff(original, edited, None, &DiffConfig::default());
    let semantic = compute_semantic_changes(original, edited);
    format_report(&Report::new(&diff, &semantic), &OutputFormat::Plain, options).unwrap()
}

#[test]
fn test_format_plain_no_changes() {
    let output = plain("same text", "same text", &OutputOptions::default());
    assert_eq!(output, "No changes detected.");
}

#[test]
fn test_format_plain_insertion() {
    let output = plain("A\nB\nC", "A\nB changed\nC", &OutputOptions::default());
    assert!(output.contains("+ 2:1 \" changed\""));
    assert!(output.contains("Summary: 1 insertion, 0 structural changes"));
}

#[test]
fn test_format_plain_deletion() {
    let output = plain("one two three", "one three", &OutputOptions::default());
    assert!(output.contains("- 1:4 \"two \""));
}

#[test]
fn test_format_plain_escapes_newlines() {
    let output = plain("top", "top\nnext", &OutputOptions::default());
    assert!(output.contains("\"\\nnext\""));
}

#[test]
fn test_format_terminal_has_same_content() {
    colored::control::set_override(false);
    let diff = compute_diff("A\nB\nC", "A\nB changed\nC", None, &DiffConfig::default());
    let report = Report::new(&diff, &[]);
    let output =
        format_report(&report, &OutputFormat::Terminal, &OutputOptions::default()).unwrap();
    assert!(output.contains("\" changed\""));
    assert!(output.contains("Summary"));
}

#[test]
fn test_format_json() {
    let original = "- item\n";
    let edited = "  - item\n";
    let diff = compute_diff(original, edited, None, &DiffConfig::default());
    let semantic = compute_semantic_changes(original, edited);
    let output = format_report(
        &Report::new(&diff, &semantic),
        &OutputFormat::Json,
        &OutputOptions::default(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["insertions"], 1);
    assert_eq!(value["semantic_changes"][0]["type"], "list_nesting");
    assert_eq!(value["semantic_changes"][0]["after"]["indent"], 2);
}

#[test]
fn test_format_json_without_semantic() {
    let diff = compute_diff("a", "b", None, &DiffConfig::default());
    let options = OutputOptions {
        show_semantic: false,
        ..Default::default()
    };
    let output = format_report(&Report::new(&diff, &[]), &OutputFormat::Json, &options).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert!(value.get("semantic_changes").is_none());
    assert_eq!(value["deletions"], 1);
}
