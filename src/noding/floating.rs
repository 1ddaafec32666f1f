// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Floating-point noder: full intersection search with an R-tree

use super::index::SegmentIndex;
use super::{noded_substrings, Noder, SegmentString};
use crate::error::Result;
use crate::geometry::{Coordinate, LineIntersector, PrecisionModel};
use tracing::{debug, instrument};

/// Nodes segment strings by inserting every non-trivial intersection.
/// With a fixed precision model the computed intersection points are rounded,
/// which does not by itself guarantee a fully noded result.
#[derive(Debug, Clone, Default)]
pub struct FloatingNoder {
    precision: Option<PrecisionModel>,
}

impl FloatingNoder {
    pub fn new() -> Self {
        Self { precision: None }
    }

    pub fn with_precision(pm: PrecisionModel) -> Self {
        Self {
            precision: Some(pm),
        }
    }

    fn intersector(&self) -> LineIntersector {
        match self.precision {
            Some(pm) => LineIntersector::with_precision(pm),
            None => LineIntersector::new(),
        }
    }
}

impl Noder for FloatingNoder {
    #[instrument(skip(self, strings), fields(strings = strings.len()))]
    fn node(&self, mut strings: Vec<SegmentString>) -> Result<Vec<SegmentString>> {
        let found = find_intersections(&strings, &mut self.intersector());
        debug!(intersections = found.len(), "floating noding pass");
        for (si, seg, pt) in found {
            strings[si].add_intersection(pt, seg);
        }
        Ok(noded_substrings(&strings))
    }

    fn name(&self) -> &'static str {
        "floating"
    }
}

/// Intersections to insert, as (string, segment, point).
pub(crate) fn find_intersections(
    strings: &[SegmentString],
    li: &mut LineIntersector,
) -> Vec<(usize, usize, Coordinate)> {
    let index = SegmentIndex::build(strings, 0.0);
    let mut found = Vec::new();
    for ((s0, i0), (s1, i1)) in index.candidate_pairs(strings) {
        let (p0, p1) = strings[s0].segment(i0);
        let (q0, q1) = strings[s1].segment(i1);
        li.compute_intersection(p0, p1, q0, q1);
        if !li.has_intersection() {
            continue;
        }
        if is_trivial_intersection(strings, li, (s0, i0), (s1, i1)) {
            continue;
        }
        for k in 0..li.intersection_num() {
            let pt = li.intersection(k);
            found.push((s0, i0, pt));
            found.push((s1, i1, pt));
        }
    }
    found
}

/// An intersection between adjacent segments of one string at their shared
/// vertex, or between the first and last segments of a closed ring.
fn is_trivial_intersection(
    strings: &[SegmentString],
    li: &LineIntersector,
    (s0, i0): (usize, usize),
    (s1, i1): (usize, usize),
) -> bool {
    if s0 != s1 || li.intersection_num() != 1 {
        return false;
    }
    if i0.abs_diff(i1) == 1 {
        return true;
    }
    let ss = &strings[s0];
    if ss.is_closed() {
        let last = ss.num_segments() - 1;
        if (i0 == 0 && i1 == last) || (i1 == 0 && i0 == last) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noding::EdgeSource;

    fn line(coords: &[(f64, f64)], index: usize) -> SegmentString {
        SegmentString::new(
            coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect(),
            EdgeSource::line(index),
        )
    }

    #[test]
    fn test_crossing_lines_are_split() {
        let strings = vec![
            line(&[(0.0, 0.0), (10.0, 10.0)], 0),
            line(&[(0.0, 10.0), (10.0, 0.0)], 1),
        ];
        let noded = FloatingNoder::new().node(strings).unwrap();
        assert_eq!(noded.len(), 4);
        assert!(noded
            .iter()
            .all(|s| s.coordinates().iter().any(|c| *c == Coordinate::new(5.0, 5.0))));
    }

    #[test]
    fn test_closed_ring_without_crossings_is_unchanged() {
        let ring = line(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)], 0);
        let noded = FloatingNoder::new().node(vec![ring]).unwrap();
        assert_eq!(noded.len(), 1);
        assert_eq!(noded[0].size(), 5);
    }

    #[test]
    fn test_self_crossing_line_is_noded() {
        let bowtie = line(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)], 0);
        let noded = FloatingNoder::new().node(vec![bowtie]).unwrap();
        assert_eq!(noded.len(), 3);
    }
}
