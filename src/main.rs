//! prosediff command-line interface.
//!
//! Compares two snapshots of a prose document and prints the character-level
//! changes together with structural markdown changes. With `--previous`, ids
//! are reconciled against an earlier edited snapshot so that they stay stable
//! across runs.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use prosediff::input::check_stdin_once;
use prosediff::logging::{self, Verbosity};
use prosediff::{
    compute_diff, compute_semantic_changes, format_report, read_document, DiffConfig,
    OutputFormat, OutputOptions, Report,
};
use std::path::PathBuf;
use std::process;
use tracing::debug;

/// prosediff - Stable change tracking for edited prose
///
/// Shows insertions and deletions between two versions of a document, plus
/// markdown structure changes such as heading levels, list nesting, link
/// targets and formatting.
#[derive(Parser)]
#[command(name = "prosediff")]
#[command(version)]
#[command(about = "Stable change tracking for edited prose", long_about = None)]
struct Cli {
    /// Original document (`-` for stdin)
    #[arg(value_name = "ORIGINAL")]
    original: PathBuf,

    /// Edited document (`-` for stdin)
    #[arg(value_name = "EDITED")]
    edited: PathBuf,

    /// Earlier edited snapshot whose change ids should be kept
    #[arg(short, long, value_name = "PREVIOUS_EDITED")]
    previous: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "terminal")]
    format: OutputFormatArg,

    /// Maximum length for displayed text previews
    #[arg(long, default_value = "60")]
    max_value_length: usize,

    /// Skip structural markdown comparison
    #[arg(long)]
    no_semantic: bool,

    /// Report the raw character diff without merging small fragments
    #[arg(long)]
    no_cleanup: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (only show changes, suppress summary)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// Colored terminal output
    Terminal,
    /// JSON representation
    Json,
    /// Plain text (no colors)
    Plain,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Plain => OutputFormat::Plain,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    logging::init(if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let paths = [Some(&cli.original), Some(&cli.edited), cli.previous.as_ref()];
    check_stdin_once(paths.into_iter().flatten().map(PathBuf::as_path))?;

    let original = read_document(&cli.original)
        .with_context(|| format!("Failed to read original: {}", cli.original.display()))?;
    let edited = read_document(&cli.edited)
        .with_context(|| format!("Failed to read edited: {}", cli.edited.display()))?;

    let config = DiffConfig {
        semantic_cleanup: !cli.no_cleanup,
        ..Default::default()
    };

    let diff = match &cli.previous {
        Some(path) => {
            let previous_edited = read_document(path)
                .with_context(|| format!("Failed to read previous: {}", path.display()))?;
            let previous = compute_diff(&original, &previous_edited, None, &config);
            debug!(
                previous_changes = previous.changes.len(),
                "reconciling against previous snapshot"
            );
            compute_diff(&original, &edited, Some(previous.as_previous()), &config)
        }
        None => compute_diff(&original, &edited, None, &config),
    };

    let semantic = if cli.no_semantic {
        Vec::new()
    } else {
        compute_semantic_changes(&original, &edited)
    };

    let options = OutputOptions {
        max_value_length: cli.max_value_length,
        show_semantic: !cli.no_semantic,
    };

    let report = Report::new(&diff, &semantic);
    let output_format: OutputFormat = cli.format.into();
    let output = format_report(&report, &output_format, &options)
        .context("Failed to format diff output")?;

    if !cli.quiet || output_format == OutputFormat::Json {
        println!("{}", output);
    } else {
        for line in output.lines() {
            if !line.starts_with("Summary:") && !line.trim().is_empty() {
                println!("{}", line);
            }
        }
    }

    if report.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}
