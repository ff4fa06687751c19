//! Plain-text rendering of validation reports.

use std::fmt::Write;

use casegate_core::{ValidationIssue, ValidationReport};

/// Render a report for terminal output.
pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Score: {}/100", report.score);
    let _ = writeln!(out, "Valid: {}", if report.is_valid { "yes" } else { "no" });
    let _ = writeln!(
        out,
        "Completeness: {}  Quality: {}  Accuracy: {}",
        report.completeness, report.quality, report.accuracy
    );

    write_section(&mut out, "Errors", &report.issues);
    write_section(&mut out, "Warnings", &report.warnings);
    write_section(&mut out, "Suggestions", &report.suggestions);

    let _ = writeln!(out, "\nValidated at {}", report.timestamp.to_rfc3339());
    out
}

fn write_section(out: &mut String, title: &str, findings: &[ValidationIssue]) {
    if findings.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{} ({}):", title, findings.len());
    for finding in findings {
        let _ = writeln!(out, "  - [{}] {}", finding.field, finding.message);
        if let Some(suggestion) = &finding.suggestion {
            let _ = writeln!(out, "    -> {}", suggestion);
        }
    }
}
