// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Segment strings with node lists, and splitting into noded substrings

use crate::geometry::{push_distinct, Coordinate, Dimension, LineIntersector};
use std::cmp::Ordering;

/// Where a segment string came from: the operand it belongs to, the
/// dimension of the source component, and for rings whether it is a hole and
/// which side is interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSource {
    /// Operand (0 = A, 1 = B) or input polygon id for batch union
    pub index: usize,
    pub dim: Dimension,
    pub is_hole: bool,
    /// +1 if the interior is on the right of the string's direction, -1 if
    /// on the left, 0 for lines
    pub depth_delta: i32,
}

impl EdgeSource {
    pub fn area(index: usize, depth_delta: i32, is_hole: bool) -> Self {
        Self {
            index,
            dim: Dimension::Area,
            is_hole,
            depth_delta,
        }
    }

    pub fn line(index: usize) -> Self {
        Self {
            index,
            dim: Dimension::Line,
            is_hole: false,
            depth_delta: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SegmentNode {
    coord: Coordinate,
    segment_index: usize,
    /// Squared distance from the segment start vertex
    dist: f64,
}

/// A coordinate sequence which accumulates node points during noding.
#[derive(Debug, Clone)]
pub struct SegmentString {
    pts: Vec<Coordinate>,
    source: EdgeSource,
    nodes: Vec<SegmentNode>,
}

impl SegmentString {
    pub fn new(pts: Vec<Coordinate>, source: EdgeSource) -> Self {
        Self {
            pts,
            source,
            nodes: Vec::new(),
        }
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.pts
    }

    pub fn source(&self) -> &EdgeSource {
        &self.source
    }

    pub fn size(&self) -> usize {
        self.pts.len()
    }

    pub fn num_segments(&self) -> usize {
        self.pts.len().saturating_sub(1)
    }

    pub fn segment(&self, i: usize) -> (&Coordinate, &Coordinate) {
        (&self.pts[i], &self.pts[i + 1])
    }

    pub fn is_closed(&self) -> bool {
        self.pts.len() > 1 && self.pts[0].equals_2d(&self.pts[self.pts.len() - 1])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Adds a node on segment `segment_index`. A node equal to the segment's
    /// end vertex is recorded against the following segment.
    pub fn add_intersection(&mut self, pt: Coordinate, segment_index: usize) {
        let mut index = segment_index;
        if index + 1 < self.pts.len() && pt.equals_2d(&self.pts[index + 1]) {
            index += 1;
        }
        self.push_node(pt, index);
    }

    /// Adds every intersection point currently held by the intersector.
    pub fn add_intersections(&mut self, li: &LineIntersector, segment_index: usize) {
        for i in 0..li.intersection_num() {
            self.add_intersection(li.intersection(i), segment_index);
        }
    }

    fn push_node(&mut self, coord: Coordinate, segment_index: usize) {
        let base = self.pts[segment_index.min(self.pts.len() - 1)];
        let dx = coord.x - base.x;
        let dy = coord.y - base.y;
        self.nodes.push(SegmentNode {
            coord,
            segment_index,
            dist: dx * dx + dy * dy,
        });
    }

    /// Nodes in order along the string, including both endpoints and the
    /// apex of every collapse, without duplicates.
    ///
    /// A collapse is an A-B-A run: either among the original vertices, or
    /// formed by two equal nodes with exactly one vertex between them (a
    /// segment snapped back through the pixel of an earlier vertex).
    fn sorted_nodes(&self) -> Vec<SegmentNode> {
        let mut nodes = self.nodes.clone();
        let last = self.pts.len() - 1;
        nodes.push(self.vertex_node(0));
        nodes.push(self.vertex_node(last));
        for i in 0..self.pts.len().saturating_sub(2) {
            if self.pts[i].equals_2d(&self.pts[i + 2]) {
                nodes.push(self.vertex_node(i + 1));
            }
        }
        sort_nodes(&mut nodes);

        let collapses = self.inserted_node_collapses(&nodes);
        if !collapses.is_empty() {
            nodes.extend(collapses);
            sort_nodes(&mut nodes);
        }
        nodes
    }

    fn vertex_node(&self, i: usize) -> SegmentNode {
        SegmentNode {
            coord: self.pts[i],
            segment_index: i,
            dist: 0.0,
        }
    }

    /// True if the node lies inside its segment rather than on its start vertex.
    fn is_interior(&self, node: &SegmentNode) -> bool {
        !node.coord.equals_2d(&self.pts[node.segment_index])
    }

    fn inserted_node_collapses(&self, nodes: &[SegmentNode]) -> Vec<SegmentNode> {
        nodes
            .windows(2)
            .filter_map(|pair| {
                let (n0, n1) = (&pair[0], &pair[1]);
                if !n0.coord.equals_2d(&n1.coord) || n1.segment_index <= n0.segment_index {
                    return None;
                }
                let mut between = n1.segment_index - n0.segment_index;
                if !self.is_interior(n1) {
                    between -= 1;
                }
                (between == 1).then(|| self.vertex_node(n0.segment_index + 1))
            })
            .collect()
    }

    /// All vertices with node points merged in, without repeated points.
    pub fn noded_coordinates(&self) -> Vec<Coordinate> {
        if self.pts.is_empty() {
            return Vec::new();
        }
        let nodes = self.sorted_nodes();
        let mut out = Vec::with_capacity(self.pts.len() + nodes.len());
        for pair in nodes.windows(2) {
            self.append_split(&pair[0], &pair[1], &mut out);
        }
        if out.is_empty() {
            out.push(self.pts[0]);
        }
        out
    }

    fn append_split(&self, n0: &SegmentNode, n1: &SegmentNode, out: &mut Vec<Coordinate>) {
        push_distinct(out, n0.coord);
        for i in (n0.segment_index + 1)..=n1.segment_index {
            push_distinct(out, self.pts[i]);
        }
        push_distinct(out, n1.coord);
    }

    /// Splits the string at its nodes. Substrings keep the source info.
    pub fn noded_substrings(&self) -> Vec<SegmentString> {
        if self.pts.is_empty() {
            return Vec::new();
        }
        let nodes = self.sorted_nodes();
        let mut result = Vec::with_capacity(nodes.len());
        for pair in nodes.windows(2) {
            let mut pts = Vec::new();
            self.append_split(&pair[0], &pair[1], &mut pts);
            if pts.len() >= 2 {
                result.push(SegmentString::new(pts, self.source));
            }
        }
        result
    }
}

fn sort_nodes(nodes: &mut Vec<SegmentNode>) {
    nodes.sort_by(|a, b| {
        a.segment_index
            .cmp(&b.segment_index)
            .then_with(|| a.dist.partial_cmp(&b.dist).unwrap_or(Ordering::Equal))
            .then_with(|| a.coord.compare_2d(&b.coord))
    });
    nodes.dedup_by(|b, a| a.segment_index == b.segment_index && a.coord.equals_2d(&b.coord));
}

/// Splits every string at its nodes.
pub fn noded_substrings(strings: &[SegmentString]) -> Vec<SegmentString> {
    strings.iter().flat_map(|s| s.noded_substrings()).collect()
}
