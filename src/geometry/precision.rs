// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Precision model: floating (no rounding) or a fixed grid defined by a scale

use super::{Coordinate, Geometry};
use crate::error::{OverlayError, Result};
use serde::{Deserialize, Serialize};

/// Numeric precision used by an overlay. A fixed model rounds ordinates to
/// the grid `1 / scale`; scales below 1 give grid cells larger than one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrecisionModel {
    Floating,
    Fixed { scale: f64 },
}

impl PrecisionModel {
    /// Fixed model with a validated scale.
    pub fn fixed(scale: f64) -> Result<Self> {
        let pm = PrecisionModel::Fixed { scale };
        pm.validate()?;
        Ok(pm)
    }

    /// Fixed model with a validated grid cell size.
    pub fn from_grid_size(grid_size: f64) -> Result<Self> {
        if !grid_size.is_finite() || grid_size <= 0.0 {
            return Err(OverlayError::InvalidPrecision { scale: 1.0 / grid_size });
        }
        Self::fixed(1.0 / grid_size)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            PrecisionModel::Floating => Ok(()),
            PrecisionModel::Fixed { scale } => {
                if scale.is_finite() && scale > 0.0 {
                    Ok(())
                } else {
                    Err(OverlayError::InvalidPrecision { scale })
                }
            }
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, PrecisionModel::Floating)
    }

    /// Scale factor; 0 for floating.
    pub fn scale(&self) -> f64 {
        match *self {
            PrecisionModel::Floating => 0.0,
            PrecisionModel::Fixed { scale } => scale,
        }
    }

    /// Size of one grid cell; 0 for floating.
    pub fn grid_size(&self) -> f64 {
        match *self {
            PrecisionModel::Floating => 0.0,
            PrecisionModel::Fixed { scale } => 1.0 / scale,
        }
    }

    /// Rounds a single ordinate to the grid. Ties round towards positive
    /// infinity. Non-finite values pass through.
    pub fn make_precise_value(&self, val: f64) -> f64 {
        match *self {
            PrecisionModel::Floating => val,
            PrecisionModel::Fixed { scale } => {
                if !val.is_finite() {
                    return val;
                }
                let grid = 1.0 / scale;
                // Dividing by a whole grid size is exact for coarse grids
                if grid > 1.0 {
                    round_half_up(val / grid) * grid
                } else {
                    round_half_up(val * scale) / scale
                }
            }
        }
    }

    /// Rounds x and y; Z is carried unchanged.
    pub fn make_precise(&self, c: &Coordinate) -> Coordinate {
        Coordinate::new_z(
            self.make_precise_value(c.x),
            self.make_precise_value(c.y),
            c.z,
        )
    }

    /// Copy of a geometry with every coordinate rounded. Structure is kept,
    /// so the result may contain repeated points or collapsed rings.
    pub fn round_geometry(&self, geom: &Geometry) -> Geometry {
        geom.map_coordinates(&|c| self.make_precise(c))
    }
}

impl Default for PrecisionModel {
    fn default() -> Self {
        PrecisionModel::Floating
    }
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_rounding() {
        let pm = PrecisionModel::fixed(1.0).unwrap();
        assert_eq!(pm.make_precise_value(2.4), 2.0);
        assert_eq!(pm.make_precise_value(2.5), 3.0);
        assert_eq!(pm.make_precise_value(-2.5), -2.0);

        let pm = PrecisionModel::fixed(100.0).unwrap();
        assert_eq!(pm.make_precise_value(1.23456), 1.23);
    }

    #[test]
    fn test_coarse_grid() {
        let pm = PrecisionModel::from_grid_size(10.0).unwrap();
        assert_eq!(pm.make_precise_value(14.0), 10.0);
        assert_eq!(pm.make_precise_value(15.0), 20.0);
        assert_eq!(pm.grid_size(), 10.0);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        assert!(PrecisionModel::fixed(0.0).is_err());
        assert!(PrecisionModel::fixed(-3.0).is_err());
        assert!(PrecisionModel::fixed(f64::NAN).is_err());
        assert!(PrecisionModel::fixed(f64::INFINITY).is_err());
    }

    #[test]
    fn test_floating_is_identity() {
        let pm = PrecisionModel::Floating;
        let c = Coordinate::new_z(0.123456789, 9.87654321, 4.0);
        let r = pm.make_precise(&c);
        assert_eq!(r, c);
        assert_eq!(r.z, 4.0);
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let pm = PrecisionModel::fixed(1000.0).unwrap();
        for v in [0.0004999, 1.0005, -7.12345, 123456.789] {
            let once = pm.make_precise_value(v);
            assert_eq!(pm.make_precise_value(once), once);
        }
    }
}
