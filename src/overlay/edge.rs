// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Noded edges and the merging of coincident edges.
//!
//! After noding, each input ring or line contributes a set of edges which
//! touch other edges only at endpoints. Edges with identical geometry are
//! merged into a single edge carrying the combined topology of all its
//! sources: the area depth delta is summed (taking relative direction into
//! account) and the dimension is the maximum.

use super::label::OverlayLabel;
use crate::error::{OverlayError, Result};
use crate::geometry::{CoordKey, Coordinate, Dimension, Location};
use crate::noding::{EdgeSource, SegmentString};
use ahash::AHashMap;
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OperandInfo {
    dim: Dimension,
    depth_delta: i32,
    is_hole: bool,
}

impl Default for OperandInfo {
    fn default() -> Self {
        Self {
            dim: Dimension::False,
            depth_delta: 0,
            is_hole: false,
        }
    }
}

/// A noded edge with the topology of the operands it came from.
#[derive(Debug, Clone)]
pub struct Edge {
    pts: Vec<Coordinate>,
    info: [OperandInfo; 2],
}

impl Edge {
    pub fn new(pts: Vec<Coordinate>, source: &EdgeSource) -> Self {
        let mut info = [OperandInfo::default(); 2];
        info[source.index] = OperandInfo {
            dim: source.dim,
            depth_delta: source.depth_delta,
            is_hole: source.is_hole,
        };
        Self { pts, info }
    }

    pub fn from_segment_string(ss: &SegmentString) -> Self {
        Self::new(ss.coordinates().to_vec(), ss.source())
    }

    /// Edges which collapsed to a point, or to a line retracing itself.
    pub fn is_collapsed(pts: &[Coordinate]) -> bool {
        let n = pts.len();
        if n < 2 {
            return true;
        }
        if pts[0].equals_2d(&pts[1]) {
            return true;
        }
        n > 2 && pts[n - 1].equals_2d(&pts[n - 2])
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.pts
    }

    pub fn into_coordinates(self) -> Vec<Coordinate> {
        self.pts
    }

    pub fn size(&self) -> usize {
        self.pts.len()
    }

    pub fn depth_delta(&self, index: usize) -> i32 {
        self.info[index].depth_delta
    }

    /// Canonical direction of the edge; see [`canonical_direction`].
    pub fn direction(&self) -> Result<bool> {
        canonical_direction(&self.pts)
    }

    /// Whether `other` runs in the same direction as this edge.
    pub fn relative_direction(&self, other: &Edge) -> bool {
        self.pts[0].equals_2d(&other.pts[0]) && self.pts[1].equals_2d(&other.pts[1])
    }

    fn is_shell(&self, index: usize) -> bool {
        self.info[index].dim == Dimension::Area && !self.info[index].is_hole
    }

    /// Folds the topology of a coincident edge into this one.
    pub fn merge(&mut self, other: &Edge) {
        let flip = if self.relative_direction(other) { 1 } else { -1 };
        for i in 0..2 {
            let is_hole = !(self.is_shell(i) || other.is_shell(i));
            let info = &mut self.info[i];
            info.is_hole = is_hole;
            info.dim = info.dim.max(other.info[i].dim);
            info.depth_delta += flip * other.info[i].depth_delta;
        }
    }

    /// Initial label derived from the merged topology.
    pub fn create_label(&self) -> OverlayLabel {
        let mut lbl = OverlayLabel::new();
        for i in 0..2 {
            let info = &self.info[i];
            match info.dim {
                Dimension::False | Dimension::Point => lbl.init_not_part(i),
                Dimension::Line => lbl.init_line(i),
                Dimension::Area if info.depth_delta == 0 => lbl.init_collapse(i, info.is_hole),
                Dimension::Area => {
                    lbl.init_boundary(
                        i,
                        location_left(info.depth_delta),
                        location_right(info.depth_delta),
                        info.is_hole,
                    );
                }
            }
        }
        lbl
    }
}

/// A positive depth delta means the interior lies to the right.
fn location_right(depth_delta: i32) -> Location {
    if depth_delta > 0 {
        Location::Interior
    } else {
        Location::Exterior
    }
}

fn location_left(depth_delta: i32) -> Location {
    if depth_delta > 0 {
        Location::Exterior
    } else {
        Location::Interior
    }
}

/// Canonical direction of a noded edge: forward if the start is lower than
/// the end, comparing the second and second-to-last points on a tie. Fails
/// for an edge which is its own reverse.
pub fn canonical_direction(pts: &[Coordinate]) -> Result<bool> {
    let n = pts.len();
    if n < 2 {
        return Err(OverlayError::topology("Edge must have at least 2 points"));
    }
    match pts[0].compare_2d(&pts[n - 1]) {
        Ordering::Less => return Ok(true),
        Ordering::Greater => return Ok(false),
        Ordering::Equal => {}
    }
    match pts[1].compare_2d(&pts[n - 2]) {
        Ordering::Less => Ok(true),
        Ordering::Greater => Ok(false),
        Ordering::Equal => Err(OverlayError::topology_at(
            "Edge direction cannot be determined because endpoints are equal",
            pts[0],
        )),
    }
}

/// Key identifying an edge up to direction: its first segment in canonical
/// direction.
pub fn edge_key(pts: &[Coordinate]) -> Result<(CoordKey, CoordKey)> {
    let n = pts.len();
    Ok(if canonical_direction(pts)? {
        (pts[0].key(), pts[1].key())
    } else {
        (pts[n - 1].key(), pts[n - 2].key())
    })
}

/// Merges edges with identical coordinates, in either direction. The first
/// occurrence of each edge determines its stored orientation.
pub fn merge_edges(edges: Vec<Edge>) -> Result<Vec<Edge>> {
    let input = edges.len();
    let mut merged: Vec<Edge> = Vec::with_capacity(edges.len());
    let mut lookup: AHashMap<(CoordKey, CoordKey), usize> = AHashMap::with_capacity(edges.len());
    for edge in edges {
        let key = edge_key(&edge.pts)?;
        match lookup.get(&key) {
            Some(&idx) => {
                let base = &mut merged[idx];
                if base.size() != edge.size() {
                    return Err(OverlayError::topology_at(
                        "Edges with same first segment but different coordinate count",
                        edge.pts[0],
                    ));
                }
                base.merge(&edge);
            }
            None => {
                lookup.insert(key, merged.len());
                merged.push(edge);
            }
        }
    }
    debug!(input, merged = merged.len(), "merged coincident edges");
    Ok(merged)
}
