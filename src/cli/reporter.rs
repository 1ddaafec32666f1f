// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::runner::{BatchReport, CaseOutcome};
use crate::geometry::Geometry;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a single operation result
    pub fn report_result(label: &str, geom: &Geometry, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Operation:".bold(), label.cyan());
        println!("{}", "━".repeat(80).bright_black());
        println!("  {} {}", "Type:".bright_black(), geom.type_name().cyan());
        println!(
            "  {} {}",
            "Points:".bright_black(),
            geom.num_points().to_string().cyan()
        );
        if geom.area() > 0.0 {
            println!("  {} {}", "Area:".bright_black(), format!("{}", geom.area()).cyan());
        }
        if geom.length() > 0.0 {
            println!(
                "  {} {}",
                "Length:".bright_black(),
                format!("{}", geom.length()).cyan()
            );
        }
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report one batch case
    pub fn report_outcome(outcome: &CaseOutcome) {
        let source = outcome
            .source
            .as_ref()
            .map(|p| format!(" ({})", p.display()))
            .unwrap_or_default();
        if outcome.passed {
            println!("  {} {}{}", "✓".green(), outcome.name, source.bright_black());
        } else {
            println!("  {} {}{}", "✗".red(), outcome.name.bold(), source.bright_black());
            if let Some(ref error) = outcome.error {
                println!("     {}", error.red());
            }
            if let Some(ref result) = outcome.result {
                println!("     {} {}", "got:".bright_black(), result);
            }
        }
    }

    /// Report batch summary
    pub fn report_summary(report: &BatchReport) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Batch run:".bold(), report.timestamp.cyan());
        println!("{}", "━".repeat(80).bright_black());
        for outcome in &report.outcomes {
            Self::report_outcome(outcome);
        }
        let total_ms: f64 = report.outcomes.iter().map(|o| o.duration_ms).sum();
        println!(
            "\n  {} {}  {} {}  {} {}",
            "Passed:".bright_black(),
            report.passed.to_string().green(),
            "Failed:".bright_black(),
            if report.failed > 0 {
                report.failed.to_string().red()
            } else {
                report.failed.to_string().green()
            },
            "Time:".bright_black(),
            Self::format_duration(Duration::from_secs_f64(total_ms / 1_000.0)).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
