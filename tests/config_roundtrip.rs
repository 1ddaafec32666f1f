// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Configuration file round trip

use anyhow::Result;
use polyframe_overlay::config::{OverlayConfig, PrecisionPolicy};
use polyframe_overlay::geometry::PrecisionModel;
use tempfile::TempDir;

#[test]
fn test_save_and_load_config() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("overlay.toml");

    let config = OverlayConfig {
        precision: PrecisionPolicy::Fixed,
        scale: Some(1000.0),
        strict_mode: true,
        parallelism: Some(4),
        ..OverlayConfig::default()
    };
    config.save(&path)?;

    let loaded = OverlayConfig::from_file(&path)?;
    assert_eq!(loaded, config);
    let options = loaded.to_options()?;
    assert_eq!(options.precision, Some(PrecisionModel::Fixed { scale: 1000.0 }));
    assert!(options.strict);
    Ok(())
}

#[test]
fn test_partial_config_uses_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("overlay.toml");
    std::fs::write(&path, "precision = \"floating\"\nelevation = false\n")?;

    let loaded = OverlayConfig::from_file(&path)?;
    assert_eq!(loaded.precision, PrecisionPolicy::Floating);
    assert!(!loaded.elevation);
    assert!(loaded.optimize_clipping);
    assert_eq!(loaded.precision_model()?, Some(PrecisionModel::Floating));
    Ok(())
}

#[test]
fn test_malformed_config_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "precision = [").unwrap();
    let err = OverlayConfig::from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}
