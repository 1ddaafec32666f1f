// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Noding - makes a set of segment strings planar

mod extract;
mod floating;
mod index;
mod segment_string;
mod snap_round;
mod validator;

pub use extract::SegmentExtractingNoder;
pub use floating::FloatingNoder;
pub use index::{SegmentIndex, SegmentRef};
pub use segment_string::{noded_substrings, EdgeSource, SegmentString};
pub use snap_round::{HotPixel, SnapRoundingNoder};
pub use validator::{check_noded, ValidatingNoder};

use crate::error::Result;
use crate::geometry::PrecisionModel;

/// Computes a fully noded set of segment strings: any two output segments
/// are either disjoint, touch at shared endpoints, or are identical.
pub trait Noder: Send + Sync {
    fn node(&self, strings: Vec<SegmentString>) -> Result<Vec<SegmentString>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Default noder for a precision model: a validated floating noder for
/// floating precision, snap rounding for a fixed grid.
pub fn default_noder(pm: &PrecisionModel) -> Result<Box<dyn Noder>> {
    if pm.is_floating() {
        Ok(Box::new(ValidatingNoder::new(FloatingNoder::new())))
    } else {
        Ok(Box::new(SnapRoundingNoder::new(*pm)?))
    }
}
