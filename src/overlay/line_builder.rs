// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Line extraction from the labelled graph.
//!
//! Edges not already part of the result area become result lines when the
//! operation selects them. Lines are output edge by edge, or merged through
//! nodes where exactly two result lines meet.

use super::graph::{EdgeId, OverlayGraph};
use super::label::OverlayLabel;
use super::OverlayOp;
use crate::geometry::{Coordinate, Location};
use tracing::debug;

pub struct LineBuilder<'g> {
    graph: &'g mut OverlayGraph,
    op: OverlayOp,
    has_result_area: bool,
    input_area_index: Option<usize>,
    strict: bool,
    merge_lines: bool,
}

impl<'g> LineBuilder<'g> {
    pub fn new(
        graph: &'g mut OverlayGraph,
        op: OverlayOp,
        has_result_area: bool,
        input_area_index: Option<usize>,
    ) -> Self {
        Self {
            graph,
            op,
            has_result_area,
            input_area_index,
            strict: false,
            merge_lines: false,
        }
    }

    /// Strict mode drops lines formed from collapsed area boundaries.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn merge_lines(mut self, merge: bool) -> Self {
        self.merge_lines = merge;
        self
    }

    pub fn build(mut self) -> Vec<Vec<Coordinate>> {
        self.mark_result_lines();
        let lines = if self.merge_lines {
            self.add_result_lines_merged()
        } else {
            self.add_result_lines()
        };
        debug!(lines = lines.len(), merged = self.merge_lines, "built result lines");
        lines
    }

    fn mark_result_lines(&mut self) {
        for e in self.graph.half_edge_ids() {
            if self.graph.is_in_result_either(e) {
                continue;
            }
            if self.is_result_line(self.graph.label(e)) {
                self.graph.mark_in_result_line(e);
            }
        }
    }

    fn is_result_line(&self, lbl: &OverlayLabel) -> bool {
        if lbl.is_boundary_singleton() {
            return false;
        }
        if self.strict && lbl.is_boundary_collapse() {
            return false;
        }
        if lbl.is_interior_collapse() {
            return false;
        }
        if self.op != OverlayOp::Intersection {
            if lbl.is_collapse_and_not_part_interior() {
                return false;
            }
            // lines covered by the result area are not output separately
            if self.has_result_area {
                if let Some(area) = self.input_area_index {
                    if lbl.is_line_in_area(area) {
                        return false;
                    }
                }
            }
        }
        if !self.strict && self.op == OverlayOp::Intersection && lbl.is_boundary_touch() {
            return true;
        }
        self.op
            .is_result_of(effective_location(lbl, 0), effective_location(lbl, 1))
    }

    /// One line per result edge, in the stored edge direction.
    fn add_result_lines(&mut self) -> Vec<Vec<Coordinate>> {
        let mut lines = Vec::new();
        for e in self.graph.half_edge_ids() {
            if !self.graph.is_in_result_line(e) || self.graph.is_visited(e) {
                continue;
            }
            let forward = e & !1;
            lines.push(self.graph.coordinates(forward));
            self.graph.mark_visited_both(e);
        }
        lines
    }

    /// Lines merged through degree-2 nodes: first those starting at a node,
    /// then the remaining closed rings.
    fn add_result_lines_merged(&mut self) -> Vec<Vec<Coordinate>> {
        let mut lines = Vec::new();
        for e in self.graph.half_edge_ids() {
            if !self.graph.is_in_result_line(e) || self.graph.is_visited(e) {
                continue;
            }
            if self.degree_of_lines(e) != 2 {
                lines.push(self.build_line(e));
            }
        }
        for e in self.graph.half_edge_ids() {
            if !self.graph.is_in_result_line(e) || self.graph.is_visited(e) {
                continue;
            }
            lines.push(self.build_line(e));
        }
        lines
    }

    fn build_line(&mut self, node: EdgeId) -> Vec<Coordinate> {
        let mut pts = vec![self.graph.orig(node)];
        let is_forward = OverlayGraph::is_forward(node);
        let mut e = node;
        loop {
            self.graph.mark_visited_both(e);
            self.graph.add_coordinates(e, &mut pts);
            let sym = OverlayGraph::sym(e);
            if self.degree_of_lines(sym) != 2 {
                break;
            }
            match self.next_line_edge_unvisited(sym) {
                Some(next) => e = next,
                None => break,
            }
        }
        if !is_forward {
            pts.reverse();
        }
        pts
    }

    fn next_line_edge_unvisited(&self, node: EdgeId) -> Option<EdgeId> {
        self.graph
            .node_star(node)
            .into_iter()
            .skip(1)
            .find(|&e| !self.graph.is_visited(e) && self.graph.is_in_result_line(e))
    }

    fn degree_of_lines(&self, node: EdgeId) -> usize {
        self.graph
            .node_star(node)
            .into_iter()
            .filter(|&e| self.graph.is_in_result_line(e))
            .count()
    }
}

/// Collapses and lines count as interior to their own operand.
fn effective_location(lbl: &OverlayLabel, index: usize) -> Option<Location> {
    if lbl.is_collapse(index) || lbl.is_line(index) {
        Some(Location::Interior)
    } else {
        lbl.line_location(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_label(index: usize, other_loc: Location) -> OverlayLabel {
        let mut lbl = OverlayLabel::new();
        lbl.init_line(index);
        lbl.set_location_line(index, Location::Interior);
        lbl.set_location_all(1 - index, other_loc);
        lbl
    }

    fn pts(coords: &[(f64, f64)]) -> Vec<Coordinate> {
        coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    #[test]
    fn test_difference_keeps_exterior_lines() {
        let mut graph = OverlayGraph::new();
        graph.add_edge(pts(&[(0.0, 0.0), (1.0, 0.0)]), line_label(0, Location::Exterior));
        graph.add_edge(pts(&[(1.0, 0.0), (2.0, 0.0)]), line_label(0, Location::Interior));
        let lines = LineBuilder::new(&mut graph, OverlayOp::Difference, false, Some(1)).build();
        assert_eq!(lines, vec![pts(&[(0.0, 0.0), (1.0, 0.0)])]);
    }

    #[test]
    fn test_merged_lines_join_at_degree_two_nodes() {
        let mut graph = OverlayGraph::new();
        graph.add_edge(pts(&[(0.0, 0.0), (1.0, 0.0)]), line_label(0, Location::Exterior));
        graph.add_edge(pts(&[(1.0, 0.0), (2.0, 1.0)]), line_label(0, Location::Exterior));
        graph.add_edge(pts(&[(2.0, 1.0), (3.0, 1.0)]), line_label(0, Location::Exterior));
        let lines = LineBuilder::new(&mut graph, OverlayOp::Union, false, None)
            .merge_lines(true)
            .build();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 4);
    }

    #[test]
    fn test_unmerged_lines_stay_separate() {
        let mut graph = OverlayGraph::new();
        graph.add_edge(pts(&[(0.0, 0.0), (1.0, 0.0)]), line_label(0, Location::Exterior));
        graph.add_edge(pts(&[(1.0, 0.0), (2.0, 1.0)]), line_label(0, Location::Exterior));
        let lines = LineBuilder::new(&mut graph, OverlayOp::Union, false, None).build();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_intersection_of_touching_areas_is_line() {
        let mut lbl = OverlayLabel::new();
        lbl.init_boundary(0, Location::Exterior, Location::Interior, false);
        lbl.init_boundary(1, Location::Interior, Location::Exterior, false);
        let mut graph = OverlayGraph::new();
        graph.add_edge(pts(&[(0.0, 0.0), (1.0, 0.0)]), lbl);
        let lines = LineBuilder::new(&mut graph, OverlayOp::Intersection, false, Some(0)).build();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_strict_mode_drops_boundary_collapse() {
        let mut lbl = OverlayLabel::new();
        lbl.init_boundary(0, Location::Exterior, Location::Interior, false);
        lbl.init_collapse(1, false);
        lbl.set_location_collapse(1);

        let mut graph = OverlayGraph::new();
        graph.add_edge(pts(&[(0.0, 0.0), (1.0, 0.0)]), lbl);
        let lines = LineBuilder::new(&mut graph, OverlayOp::Intersection, false, Some(0)).build();
        assert_eq!(lines.len(), 1);

        let mut graph = OverlayGraph::new();
        graph.add_edge(pts(&[(0.0, 0.0), (1.0, 0.0)]), lbl);
        let lines = LineBuilder::new(&mut graph, OverlayOp::Intersection, false, Some(0))
            .strict(true)
            .build();
        assert!(lines.is_empty());
    }
}
