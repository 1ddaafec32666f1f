// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Validation that a noded arrangement has no interior intersections

use super::index::SegmentIndex;
use super::{Noder, SegmentString};
use crate::error::{OverlayError, Result};
use crate::geometry::LineIntersector;
use tracing::{instrument, warn};

/// Fails with a topology error if any two segments intersect at a point that
/// is not a shared endpoint.
pub fn check_noded(strings: &[SegmentString]) -> Result<()> {
    let index = SegmentIndex::build(strings, 0.0);
    let mut li = LineIntersector::new();
    for ((s0, i0), (s1, i1)) in index.candidate_pairs(strings) {
        let (p0, p1) = strings[s0].segment(i0);
        let (q0, q1) = strings[s1].segment(i1);
        li.compute_intersection(p0, p1, q0, q1);
        if li.has_intersection() && li.is_interior_intersection() {
            let pt = li.intersection(0);
            warn!(x = pt.x, y = pt.y, "non-noded intersection");
            return Err(OverlayError::topology_at(
                format!(
                    "found non-noded intersection between LINESTRING ({} {}, {} {}) and LINESTRING ({} {}, {} {})",
                    p0.x, p0.y, p1.x, p1.y, q0.x, q0.y, q1.x, q1.y
                ),
                pt,
            ));
        }
    }
    Ok(())
}

/// Wraps a noder and validates its output.
#[derive(Debug, Clone)]
pub struct ValidatingNoder<N: Noder> {
    inner: N,
}

impl<N: Noder> ValidatingNoder<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

impl<N: Noder> Noder for ValidatingNoder<N> {
    #[instrument(skip(self, strings), fields(noder = self.inner.name()))]
    fn node(&self, strings: Vec<SegmentString>) -> Result<Vec<SegmentString>> {
        let noded = self.inner.node(strings)?;
        check_noded(&noded)?;
        Ok(noded)
    }

    fn name(&self) -> &'static str {
        "validating"
    }
}
