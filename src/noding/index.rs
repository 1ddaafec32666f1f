// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! R-tree over the segments of a set of segment strings

use super::SegmentString;
use crate::geometry::Envelope;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// (string index, segment index)
pub type SegmentRef = (usize, usize);

type IndexedSegment = GeomWithData<Rectangle<[f64; 2]>, SegmentRef>;

pub struct SegmentIndex {
    tree: RTree<IndexedSegment>,
}

impl SegmentIndex {
    /// Bulk-loads every segment, with envelopes grown by `tolerance`.
    pub fn build(strings: &[SegmentString], tolerance: f64) -> Self {
        let mut items = Vec::new();
        for (si, ss) in strings.iter().enumerate() {
            for i in 0..ss.num_segments() {
                let (a, b) = ss.segment(i);
                let rect = Rectangle::from_corners(
                    [a.x.min(b.x) - tolerance, a.y.min(b.y) - tolerance],
                    [a.x.max(b.x) + tolerance, a.y.max(b.y) + tolerance],
                );
                items.push(GeomWithData::new(rect, (si, i)));
            }
        }
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Segments whose envelope intersects `env`.
    pub fn query(&self, env: &Envelope) -> Vec<SegmentRef> {
        if env.is_empty() {
            return Vec::new();
        }
        let aabb = AABB::from_corners([env.min_x, env.min_y], [env.max_x, env.max_y]);
        self.tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|item| item.data)
            .collect()
    }

    /// Every pair of segments with intersecting envelopes, each reported once
    /// with the lower reference first. A segment is never paired with itself.
    pub fn candidate_pairs(&self, strings: &[SegmentString]) -> Vec<(SegmentRef, SegmentRef)> {
        let mut pairs = Vec::new();
        for (si, ss) in strings.iter().enumerate() {
            for i in 0..ss.num_segments() {
                let (a, b) = ss.segment(i);
                let env = Envelope::from_points(a, b);
                for other in self.query(&env) {
                    if (si, i) < other {
                        pairs.push(((si, i), other));
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinate;
    use crate::noding::EdgeSource;

    #[test]
    fn test_candidate_pairs_reported_once() {
        let strings = vec![
            SegmentString::new(
                vec![Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 10.0)],
                EdgeSource::line(0),
            ),
            SegmentString::new(
                vec![Coordinate::new(0.0, 10.0), Coordinate::new(10.0, 0.0)],
                EdgeSource::line(1),
            ),
            SegmentString::new(
                vec![Coordinate::new(50.0, 50.0), Coordinate::new(60.0, 60.0)],
                EdgeSource::line(1),
            ),
        ];
        let index = SegmentIndex::build(&strings, 0.0);
        assert_eq!(index.size(), 3);
        let pairs = index.candidate_pairs(&strings);
        assert_eq!(pairs, vec![((0, 0), (1, 0))]);
    }
}
