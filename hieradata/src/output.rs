//! Shared output formatting for validation reports.
//!
//! Provides JSON and plain-text formatters for `ValidationReport`.
//! Color/terminal formatting is left to the CLI layer.

use std::io::Write;

use crate::report::{RuleOutcome, ValidationReport};

/// Format a `ValidationReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `ValidationReport` as human-readable plain text to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  HIERADATA VALIDATOR")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  Sources loaded: {}", report.sources_loaded)?;
    writeln!(writer, "  Load errors:    {}", report.load_errors.len())?;
    writeln!(writer, "  Rules passed:   {}", report.passed_rules())?;
    writeln!(writer, "  Rules failed:   {}", report.failed_rules())?;
    writeln!(writer)?;

    if !report.load_errors.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  LOAD ERRORS (validation refused until these are fixed)")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for error in &report.load_errors {
            writeln!(writer, "{error}")?;
        }
        writeln!(writer)?;
    }

    let failures: Vec<_> = report
        .rule_results
        .iter()
        .filter_map(|r| match &r.outcome {
            RuleOutcome::Failed(message) => Some((r.key.as_str(), message.as_str())),
            RuleOutcome::Passed | RuleOutcome::Skipped => None,
        })
        .collect();
    if !failures.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  RULE FAILURES")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for (key, message) in &failures {
            writeln!(writer, "[{key}] {message}")?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    if report.ok {
        writeln!(
            writer,
            "\u{2713} {} sources loaded, {} rule(s) passed",
            report.sources_loaded,
            report.passed_rules()
        )?;
    } else {
        if !report.load_errors.is_empty() {
            writeln!(
                writer,
                "\u{2717} {} file(s) could not be loaded",
                report.load_errors.len()
            )?;
        }
        if !failures.is_empty() {
            writeln!(writer, "\u{2717} {} rule(s) failed", failures.len())?;
        }
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}
