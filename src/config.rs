// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Overlay configuration system

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geometry::PrecisionModel;
use crate::overlay::OverlayOptions;

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "overlay.toml";

/// How the precision model of an overlay is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionPolicy {
    /// Robust fixed scale derived from the operands
    #[default]
    Auto,
    /// Full floating-point precision
    Floating,
    /// Fixed grid with the configured scale
    Fixed,
}

/// Overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Precision policy
    pub precision: PrecisionPolicy,
    /// Grid scale for the fixed policy
    pub scale: Option<f64>,
    /// Homogeneous result dimension
    pub strict_mode: bool,
    /// Clip operands to the region that can affect the result
    pub optimize_clipping: bool,
    /// Join result lines through degree-2 nodes
    pub merge_result_lines: bool,
    /// Populate Z on result vertices
    pub elevation: bool,
    /// Maximum parallel workers for batch runs
    pub parallelism: Option<usize>,
    /// Output directory for batch reports
    pub output_dir: PathBuf,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            precision: PrecisionPolicy::Auto,
            scale: None,
            strict_mode: false,
            optimize_clipping: true,
            merge_result_lines: false,
            elevation: true,
            parallelism: None, // Auto-detect
            output_dir: PathBuf::from("target/overlay-reports"),
        }
    }
}

impl OverlayConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: OverlayConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `OVERLAY_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(scale) = lookup("OVERLAY_SCALE") {
            let scale: f64 = scale
                .trim()
                .parse()
                .with_context(|| format!("Invalid OVERLAY_SCALE: {scale}"))?;
            self.precision = PrecisionPolicy::Fixed;
            self.scale = Some(scale);
        }

        if let Some(floating) = lookup("OVERLAY_FLOATING") {
            if parse_flag(&floating) {
                self.precision = PrecisionPolicy::Floating;
            }
        }

        if let Some(strict) = lookup("OVERLAY_STRICT") {
            self.strict_mode = parse_flag(&strict);
        }

        if let Some(clip) = lookup("OVERLAY_CLIP") {
            self.optimize_clipping = parse_flag(&clip);
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Explicit precision model, or `None` for the automatic policy
    pub fn precision_model(&self) -> Result<Option<PrecisionModel>> {
        match self.precision {
            PrecisionPolicy::Auto => Ok(None),
            PrecisionPolicy::Floating => Ok(Some(PrecisionModel::Floating)),
            PrecisionPolicy::Fixed => {
                let Some(scale) = self.scale else {
                    bail!("Fixed precision requires a scale");
                };
                Ok(Some(PrecisionModel::fixed(scale)?))
            }
        }
    }

    /// Per-call overlay options for this configuration
    pub fn to_options(&self) -> Result<OverlayOptions> {
        Ok(OverlayOptions {
            precision: self.precision_model()?,
            strict: self.strict_mode,
            optimize_clipping: self.optimize_clipping,
            merge_result_lines: self.merge_result_lines,
            populate_z: self.elevation,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_options() {
        let options = OverlayConfig::default().to_options().unwrap();
        assert_eq!(options, OverlayOptions::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = OverlayConfig::default();
        config
            .apply_overrides(lookup(&[
                ("OVERLAY_SCALE", "100"),
                ("OVERLAY_STRICT", "true"),
                ("OVERLAY_CLIP", "0"),
            ]))
            .unwrap();
        assert_eq!(config.precision, PrecisionPolicy::Fixed);
        assert!(config.strict_mode);
        assert!(!config.optimize_clipping);
        let options = config.to_options().unwrap();
        assert_eq!(options.precision, Some(PrecisionModel::Fixed { scale: 100.0 }));
    }

    #[test]
    fn test_floating_override_wins_over_scale() {
        let mut config = OverlayConfig::default();
        config
            .apply_overrides(lookup(&[("OVERLAY_SCALE", "10"), ("OVERLAY_FLOATING", "yes")]))
            .unwrap();
        assert_eq!(config.precision_model().unwrap(), Some(PrecisionModel::Floating));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let mut config = OverlayConfig::default();
        assert!(config.apply_overrides(lookup(&[("OVERLAY_SCALE", "abc")])).is_err());
        config.precision = PrecisionPolicy::Fixed;
        config.scale = Some(-1.0);
        assert!(config.to_options().is_err());
        config.scale = None;
        assert!(config.to_options().is_err());
    }
}
