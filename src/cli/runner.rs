// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch runner for overlay case files
//!
//! A case file is TOML with one or more `[[case]]` tables:
//!
//! ```toml
//! [[case]]
//! name = "triangle in box"
//! operation = "intersection"
//! a = "POLYGON((0 6,4 6,4 2,0 2,0 6))"
//! b = "POLYGON((1 0,2 5,3 0,1 0))"
//! scale = 1.0
//! expected = "POLYGON((3 2,1 2,2 5,3 2))"
//! ```

use crate::config::OverlayConfig;
use crate::geometry::{Geometry, PrecisionModel};
use crate::io::{parse_wkt, to_wkt};
use crate::overlay::{overlay_with, reduce_precision, OverlayOp};
use crate::union::{coverage_union, unary_union};
use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Operation performed by a batch case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOperation {
    Intersection,
    Union,
    Difference,
    #[serde(alias = "symdifference")]
    SymDifference,
    UnaryUnion,
    CoverageUnion,
    Reduce,
}

impl CaseOperation {
    fn overlay_op(self) -> Option<OverlayOp> {
        match self {
            CaseOperation::Intersection => Some(OverlayOp::Intersection),
            CaseOperation::Union => Some(OverlayOp::Union),
            CaseOperation::Difference => Some(OverlayOp::Difference),
            CaseOperation::SymDifference => Some(OverlayOp::SymDifference),
            _ => None,
        }
    }
}

/// One overlay case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCase {
    pub name: String,
    pub operation: CaseOperation,
    pub a: String,
    #[serde(default)]
    pub b: Option<String>,
    /// Fixed grid scale; overrides the configured precision
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub strict: Option<bool>,
    /// Expected result as WKT, compared after normalization
    #[serde(default)]
    pub expected: Option<String>,
    /// The case passes only if the operation fails
    #[serde(default)]
    pub expect_error: bool,
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    #[serde(default, rename = "case")]
    cases: Vec<BatchCase>,
}

/// Result of running one case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub name: String,
    pub source: Option<PathBuf>,
    pub passed: bool,
    pub result: Option<String>,
    pub error: Option<String>,
    pub duration_ms: f64,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub timestamp: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<CaseOutcome>,
}

impl BatchReport {
    pub fn new(outcomes: Vec<CaseOutcome>) -> Self {
        let passed = outcomes.iter().filter(|o| o.passed).count();
        Self {
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            total: outcomes.len(),
            passed,
            failed: outcomes.len() - passed,
            outcomes,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Write the report as JSON into `dir`, returning the file path
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;
        let file = dir.join(format!(
            "batch-{}.json",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(&file, json)
            .with_context(|| format!("Failed to write report: {}", file.display()))?;
        Ok(file)
    }
}

/// Runs overlay cases in parallel under one configuration
pub struct BatchRunner {
    config: OverlayConfig,
    show_progress: bool,
}

impl BatchRunner {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Collect `.toml` case files from files and directories
    pub fn discover(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for input in inputs {
            if !input.exists() {
                bail!("Input not found: {}", input.display());
            }
            if input.is_file() {
                files.push(input.clone());
                continue;
            }
            for entry in WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().map(|s| s == "toml").unwrap_or(false))
            {
                files.push(entry.path().to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load all cases from the given case files
    pub fn load_cases(files: &[PathBuf]) -> Result<Vec<BatchCase>> {
        let mut cases = Vec::new();
        for file in files {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read case file: {}", file.display()))?;
            let parsed: CaseFile = toml::from_str(&content)
                .with_context(|| format!("Failed to parse case file: {}", file.display()))?;
            if parsed.cases.is_empty() {
                warn!(file = %file.display(), "case file has no cases");
            }
            cases.extend(parsed.cases.into_iter().map(|mut case| {
                case.source = Some(file.clone());
                case
            }));
        }
        Ok(cases)
    }

    /// Run every case, in parallel when the configuration allows it
    pub fn run(&self, cases: &[BatchCase]) -> Result<BatchReport> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = self.config.parallelism {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().context("Failed to build worker pool")?;

        let pb = if self.show_progress {
            let p = ProgressBar::new(cases.len() as u64);
            p.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .context("Invalid progress template")?
                    .progress_chars("#>-"),
            );
            Some(p)
        } else {
            None
        };

        let outcomes: Vec<CaseOutcome> = pool.install(|| {
            cases
                .par_iter()
                .map(|case| {
                    let outcome = self.run_case(case);
                    if let Some(ref p) = pb {
                        p.inc(1);
                    }
                    outcome
                })
                .collect()
        });

        if let Some(p) = pb {
            p.finish_and_clear();
        }
        Ok(BatchReport::new(outcomes))
    }

    /// Run a single case and judge it against its expectation
    pub fn run_case(&self, case: &BatchCase) -> CaseOutcome {
        let start = Instant::now();
        let result = self.execute(case);
        let duration_ms = start.elapsed().as_secs_f64() * 1_000.0;
        debug!(case = %case.name, duration_ms, ok = result.is_ok(), "case finished");

        let (passed, result, error) = match result {
            Ok(geom) => {
                let verdict = match &case.expected {
                    _ if case.expect_error => Err("expected an error".to_string()),
                    Some(expected) => match parse_wkt(expected) {
                        Ok(exp) if exp.equals_normalized(&geom) => Ok(()),
                        Ok(_) => Err(format!("expected {expected}")),
                        Err(e) => Err(format!("{e:#}")),
                    },
                    None => Ok(()),
                };
                (verdict.is_ok(), Some(to_wkt(&geom)), verdict.err())
            }
            Err(e) => (case.expect_error, None, Some(format!("{e:#}"))),
        };

        CaseOutcome {
            name: case.name.clone(),
            source: case.source.clone(),
            passed,
            result,
            error,
            duration_ms,
        }
    }

    fn execute(&self, case: &BatchCase) -> Result<Geometry> {
        let mut options = self.config.to_options()?;
        if let Some(scale) = case.scale {
            options.precision = Some(PrecisionModel::fixed(scale)?);
        }
        if let Some(strict) = case.strict {
            options.strict = strict;
        }

        let a = parse_wkt(&case.a).context("Invalid operand A")?;
        let geom = match (case.operation.overlay_op(), case.operation) {
            (Some(op), _) => {
                let b_text = case
                    .b
                    .as_deref()
                    .ok_or_else(|| anyhow!("Operation {op} needs operand B"))?;
                let b = parse_wkt(b_text).context("Invalid operand B")?;
                overlay_with(&a, &b, op, options)?
            }
            (None, CaseOperation::UnaryUnion) => unary_union(&a, options.precision)?,
            (None, CaseOperation::CoverageUnion) => coverage_union(&a)?,
            (None, _) => {
                let pm = options
                    .precision
                    .ok_or_else(|| anyhow!("Reduce needs a fixed scale"))?;
                reduce_precision(&a, pm)?
            }
        };
        Ok(geom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CASES: &str = r#"
[[case]]
name = "triangle in box"
operation = "intersection"
a = "POLYGON((0 6,4 6,4 2,0 2,0 6))"
b = "POLYGON((1 0,2 5,3 0,1 0))"
scale = 1.0
expected = "POLYGON((3 2,1 2,2 5,3 2))"

[[case]]
name = "wrong expectation"
operation = "union"
a = "POLYGON((0 0,0 1,1 1,1 0,0 0))"
b = "POLYGON((5 5,5 6,6 6,6 5,5 5))"
expected = "POINT (0 0)"

[[case]]
name = "bad scale"
operation = "reduce"
a = "POINT (1 1)"
scale = -1.0
expect_error = true
"#;

    fn write_cases(dir: &TempDir) -> PathBuf {
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        let file = nested.join("cases.toml");
        std::fs::write(&file, CASES).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        file
    }

    #[test]
    fn test_discover_and_load() {
        let dir = TempDir::new().unwrap();
        let file = write_cases(&dir);
        let files = BatchRunner::discover(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files, vec![file.clone()]);
        let cases = BatchRunner::load_cases(&files).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].operation, CaseOperation::Intersection);
        assert_eq!(cases[0].source.as_deref(), Some(file.as_path()));
    }

    #[test]
    fn test_run_reports_pass_and_fail() {
        let dir = TempDir::new().unwrap();
        let file = write_cases(&dir);
        let cases = BatchRunner::load_cases(&[file]).unwrap();
        let config = OverlayConfig {
            parallelism: Some(2),
            ..OverlayConfig::default()
        };
        let report = BatchRunner::new(config).run(&cases).unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 2);
        assert!(!report.all_passed());
        let failed: Vec<_> = report.outcomes.iter().filter(|o| !o.passed).collect();
        assert_eq!(failed[0].name, "wrong expectation");

        let path = report.write_json(&dir.path().join("reports")).unwrap();
        let json = std::fs::read_to_string(path).unwrap();
        let back: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.failed, 1);
    }

    #[test]
    fn test_missing_operand_fails_case() {
        let case = BatchCase {
            name: "no b".into(),
            operation: CaseOperation::Difference,
            a: "POINT (1 1)".into(),
            b: None,
            scale: None,
            strict: None,
            expected: None,
            expect_error: false,
            source: None,
        };
        let outcome = BatchRunner::new(OverlayConfig::default()).run_case(&case);
        assert!(!outcome.passed);
        assert!(outcome.error.unwrap().contains("operand B"));
    }
}
