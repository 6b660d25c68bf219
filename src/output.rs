//! Output formatting for diff reports.
//!
//! A [`Report`] bundles the character-level diff with the structural changes
//! found by the markdown differ. It can be rendered for a colour terminal,
//! as plain text, or as JSON for other tools.
//!
//! # Examples
//!
//! ```
//! use prosediff::{compute_diff, format_report, DiffConfig, OutputFormat, OutputOptions, Report};
//!
//! let diff = compute_diff("alpha\nbeta\n", "alpha\nBETA\n", None, &DiffConfig::default());
//! let report = Report::new(&diff, &[]);
//!
//! let output = format_report(&report, &OutputFormat::Plain, &OutputOptions::default()).unwrap();
//! assert!(output.contains("\"beta\""));
//! assert!(output.contains("\"BETA\""));
//! ```

use crate::error::OutputError;
use crate::semantic::SemanticChange;
use crate::text_diff::{group_changes, plural, Change, ChangeType, DiffResult};
use colored::*;
use std::str::FromStr;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored terminal output with ANSI escape codes
    Terminal,
    /// JSON document with every change and its id
    Json,
    /// Plain text, no colors (suitable for piping)
    Plain,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            "plain" => Ok(OutputFormat::Plain),
            _ => Err(OutputError::UnknownFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Options for controlling output formatting.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Maximum length for displayed text previews (truncate if longer)
    pub max_value_length: usize,
    /// Include the structural markdown changes
    pub show_semantic: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            max_value_length: 60,
            show_semantic: true,
        }
    }
}

/// Everything known about one pair of snapshots.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub diff: &'a DiffResult,
    pub semantic: &'a [SemanticChange],
}

impl<'a> Report<'a> {
    pub fn new(diff: &'a DiffResult, semantic: &'a [SemanticChange]) -> Self {
        Self { diff, semantic }
    }

    /// Returns true if neither the text nor the structure changed.
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty() && self.semantic.is_empty()
    }
}

/// Formats a report according to the specified format and options.
///
/// # Arguments
///
/// * `report` - The report to format
/// * `format` - The output format (Terminal, JSON, or Plain)
/// * `options` - Formatting options
///
/// # Returns
///
/// Returns the formatted string on success, or an OutputError on failure.
pub fn format_report(
    report: &Report<'_>,
    format: &OutputFormat,
    options: &OutputOptions,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Terminal => Ok(format_text(report, options, true)),
        OutputFormat::Json => format_json(report, options),
        OutputFormat::Plain => Ok(format_text(report, options, false)),
    }
}

/// Renders the human-readable report. Replacements (a deletion directly
/// followed by an insertion at the same spot) share one line.
///
/// Color scheme:
/// - Insertions: green
/// - Deletions: red
/// - Replacements: yellow
/// - Structural changes: cyan
fn format_text(report: &Report<'_>, options: &OutputOptions, color: bool) -> String {
    let semantic: &[SemanticChange] = if options.show_semantic {
        report.semantic
    } else {
        &[]
    };

    if report.diff.is_empty() && semantic.is_empty() {
        let message = "No changes detected.";
        return if color {
            message.dimmed().to_string()
        } else {
            message.to_string()
        };
    }

    let mut output = String::new();

    for group in group_changes(&report.diff.changes) {
        output.push_str(&format_group(&group, options.max_value_length, color));
        output.push('\n');
    }

    if !semantic.is_empty() {
        if !report.diff.is_empty() {
            output.push('\n');
        }
        let heading = "Structural changes:";
        if color {
            output.push_str(&heading.bold().to_string());
        } else {
            output.push_str(heading);
        }
        output.push('\n');
        for change in semantic {
            output.push_str(&format_semantic(change, options.max_value_length, color));
            output.push('\n');
        }
    }

    output.push('\n');
    output.push_str(&format_summary(report.diff, semantic.len(), options.show_semantic));
    output
}

fn format_group(group: &[&Change], max_length: usize, color: bool) -> String {
    let first = group[0];
    let location = format!("{}:{}", first.location.line, first.location.col);

    match group {
        [deleted, inserted] => {
            let old = preview(&deleted.text, max_length);
            let new = preview(&inserted.text, max_length);
            if color {
                format!(
                    "{} {} {} {} {}",
                    "~".bright_yellow(),
                    location.yellow(),
                    old.red(),
                    "→".bright_yellow(),
                    new.green()
                )
            } else {
                format!("~ {} {} → {}", location, old, new)
            }
        }
        _ => {
            let text = preview(&first.text, max_length);
            match (first.change_type, color) {
                (ChangeType::Insertion, true) => {
                    format!("{} {} {}", "+".bright_green(), location.green(), text.green())
                }
                (ChangeType::Deletion, true) => {
                    format!("{} {} {}", "-".bright_red(), location.red(), text.red())
                }
                (ChangeType::Insertion, false) => format!("+ {} {}", location, text),
                (ChangeType::Deletion, false) => format!("- {} {}", location, text),
            }
        }
    }
}

fn format_semantic(change: &SemanticChange, max_length: usize, color: bool) -> String {
    let context = preview(&change.context, max_length);
    if color {
        format!(
            "{} line {} {}: {} {} {} {}",
            "*".bright_cyan(),
            change.line,
            change.change_type.as_str().cyan(),
            context,
            change.before.to_string().dimmed(),
            "→".bright_cyan(),
            change.after.to_string().cyan()
        )
    } else {
        format!(
            "* line {} {}: {} {} → {}",
            change.line, change.change_type, context, change.before, change.after
        )
    }
}

/// Quotes and escapes `text`, truncating to `max_length` chars.
fn preview(text: &str, max_length: usize) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    let shown = if escaped.chars().count() > max_length {
        let kept: String = escaped.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        escaped
    };
    format!("\"{}\"", shown)
}

fn format_summary(diff: &DiffResult, semantic: usize, show_semantic: bool) -> String {
    if !show_semantic {
        return format!("Summary: {}", diff.summary());
    }
    if diff.is_empty() {
        return format!("Summary: {}", plural(semantic, "structural change"));
    }
    format!(
        "Summary: {}, {}",
        diff.summary(),
        plural(semantic, "structural change")
    )
}

/// Formats a report as JSON.
///
/// Changes carry their ids so that consumers can attach annotations to them.
/// `semantic_changes` is omitted when structural changes are not shown.
fn format_json(report: &Report<'_>, options: &OutputOptions) -> Result<String, OutputError> {
    use serde_json::json;

    let mut output = json!({
        "changes": report.diff.changes,
        "deletions": report.diff.deletions,
        "insertions": report.diff.insertions,
    });

    if options.show_semantic {
        output["semantic_changes"] = serde_json::to_value(report.semantic)
            .map_err(|e| OutputError::JsonSerializationError { source: e })?;
    }

    serde_json::to_string_pretty(&output)
        .map_err(|e| OutputError::JsonSerializationError { source: e })
}
