// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Labelling of the overlay graph.
//!
//! After construction, edge labels only describe the operands the edge came
//! from. Labelling computes the location of every edge relative to both
//! operands, in order:
//!
//! 1. area locations propagated around nodes from boundary edges
//! 2. locations of connected linear edges propagated through the graph
//! 3. collapsed edges located from their ring role
//! 4. a second linear propagation seeded by the collapses
//! 5. remaining disconnected edges located by point-in-area tests

use super::graph::{EdgeId, OverlayGraph};
use super::input::InputGeometry;
use super::label::Position;
use super::OverlayOp;
use crate::error::{OverlayError, Result};
use crate::geometry::Location;
use std::collections::VecDeque;
use tracing::{instrument, trace};

pub struct OverlayLabeller<'g, 'a> {
    graph: &'g mut OverlayGraph,
    input: InputGeometry<'a>,
    has_edges: [bool; 2],
}

impl<'g, 'a> OverlayLabeller<'g, 'a> {
    pub fn new(graph: &'g mut OverlayGraph, input: InputGeometry<'a>, has_edges: [bool; 2]) -> Self {
        Self {
            graph,
            input,
            has_edges,
        }
    }

    #[instrument(skip(self), fields(edges = self.graph.edge_count()))]
    pub fn compute_labelling(&mut self) -> Result<()> {
        self.label_area_node_edges()?;
        self.label_connected_linear_edges();
        self.label_collapsed_edges();
        self.label_connected_linear_edges();
        self.label_disconnected_edges();
        Ok(())
    }

    fn label_area_node_edges(&mut self) -> Result<()> {
        let nodes = self.graph.node_edges().to_vec();
        for node in nodes {
            self.propagate_area_locations(node, 0)?;
            if self.has_edges[1] {
                self.propagate_area_locations(node, 1)?;
            }
        }
        Ok(())
    }

    /// Walks CCW around a node, carrying the area location across boundary
    /// edges and assigning it to the non-boundary edges in between.
    fn propagate_area_locations(&mut self, node: EdgeId, index: usize) -> Result<()> {
        if !self.input.is_area(index) || self.graph.degree(node) == 1 {
            return Ok(());
        }
        let Some(start) = self.find_propagation_start_edge(node, index) else {
            return Ok(());
        };
        let mut curr_loc = self.side_location(start, index, Position::Left);
        let mut e = self.graph.o_next(start);
        while e != start {
            if !self.graph.label(e).is_boundary(index) {
                if let Some(loc) = curr_loc {
                    self.graph.label_mut(e).set_location_line(index, loc);
                }
            } else {
                let loc_right = self.side_location(e, index, Position::Right);
                if loc_right != curr_loc {
                    return Err(OverlayError::topology_at(
                        format!("side location conflict: arg {index}"),
                        self.graph.orig(e),
                    ));
                }
                curr_loc = self.side_location(e, index, Position::Left);
                if curr_loc.is_none() {
                    return Err(OverlayError::topology_at(
                        "found single null side",
                        self.graph.orig(e),
                    ));
                }
            }
            e = self.graph.o_next(e);
        }
        Ok(())
    }

    fn find_propagation_start_edge(&self, node: EdgeId, index: usize) -> Option<EdgeId> {
        self.graph
            .node_star(node)
            .into_iter()
            .find(|&e| self.graph.label(e).is_boundary(index))
    }

    fn side_location(&self, e: EdgeId, index: usize, pos: Position) -> Option<Location> {
        self.graph
            .label(e)
            .location(index, pos, OverlayGraph::is_forward(e))
    }

    fn label_collapsed_edges(&mut self) {
        for e in self.graph.half_edge_ids() {
            for index in 0..2 {
                let label = self.graph.label_mut(e);
                if label.is_line_location_unknown(index) && label.is_collapse(index) {
                    label.set_location_collapse(index);
                }
            }
        }
    }

    fn label_connected_linear_edges(&mut self) {
        self.propagate_linear_locations(0);
        if self.has_edges[1] {
            self.propagate_linear_locations(1);
        }
    }

    /// Spreads known line locations to connected edges of unknown location.
    /// Locations relative to a line operand only spread if exterior, since
    /// being on a line does not extend past its end.
    fn propagate_linear_locations(&mut self, index: usize) {
        let mut stack: VecDeque<EdgeId> = self
            .graph
            .half_edge_ids()
            .filter(|&e| {
                let lbl = self.graph.label(e);
                lbl.is_linear(index) && !lbl.is_line_location_unknown(index)
            })
            .collect();
        if stack.is_empty() {
            return;
        }
        let is_input_line = self.input.is_line(index);
        while let Some(line_edge) = stack.pop_front() {
            let Some(line_loc) = self.graph.label(line_edge).line_location(index) else {
                continue;
            };
            if is_input_line && line_loc != Location::Exterior {
                continue;
            }
            let mut e = self.graph.o_next(line_edge);
            while e != line_edge {
                let label = self.graph.label_mut(e);
                if label.is_line_location_unknown(index) {
                    label.set_location_line(index, line_loc);
                    stack.push_front(OverlayGraph::sym(e));
                }
                e = self.graph.o_next(e);
            }
        }
    }

    fn label_disconnected_edges(&mut self) {
        for e in self.graph.half_edge_ids() {
            for index in 0..2 {
                if self.graph.label(e).is_line_location_unknown(index) {
                    self.label_disconnected_edge(e, index);
                }
            }
        }
    }

    /// An edge not connected to any located edge lies wholly inside or
    /// outside the operand. It is interior only if both its ends are.
    fn label_disconnected_edge(&mut self, e: EdgeId, index: usize) {
        let loc = if !self.input.is_area(index) {
            Location::Exterior
        } else {
            let loc_orig = self.input.locate_point_in_area(index, &self.graph.orig(e));
            let loc_dest = self.input.locate_point_in_area(index, &self.graph.dest(e));
            if loc_orig != Location::Exterior && loc_dest != Location::Exterior {
                Location::Interior
            } else {
                Location::Exterior
            }
        };
        trace!(edge = e, index, ?loc, "located disconnected edge");
        self.graph.label_mut(e).set_location_all(index, loc);
    }

    /// Marks half-edges whose right side is in the result area.
    pub fn mark_result_area_edges(&mut self, op: OverlayOp) {
        for e in self.graph.half_edge_ids() {
            let label = self.graph.label(e);
            if !label.is_boundary_either() {
                continue;
            }
            let fwd = OverlayGraph::is_forward(e);
            let loc0 = label.location_boundary_or_line(0, Position::Right, fwd);
            let loc1 = label.location_boundary_or_line(1, Position::Right, fwd);
            if op.is_result_of(loc0, loc1) {
                self.graph.mark_in_result_area(e);
            }
        }
    }

    /// Edges with the result area on both sides are interior to the result.
    pub fn unmark_duplicate_edges_from_result_area(&mut self) {
        for e in self.graph.half_edge_ids() {
            let sym = OverlayGraph::sym(e);
            if self.graph.is_in_result_area(e) && self.graph.is_in_result_area(sym) {
                self.graph.unmark_from_result_area(e);
                self.graph.unmark_from_result_area(sym);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::label::OverlayLabel;
    use crate::geometry::Coordinate;
    use crate::io::parse_wkt;
    use crate::Geometry;

    const SQUARE: &str = "POLYGON((0 0,0 10,10 10,10 0,0 0))";

    fn pts(coords: &[(f64, f64)]) -> Vec<Coordinate> {
        coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    fn wkt(text: &str) -> Geometry {
        parse_wkt(text).unwrap()
    }

    fn line_of_b() -> OverlayLabel {
        let mut label = OverlayLabel::new();
        label.init_not_part(0);
        label.init_line(1);
        label
    }

    /// Square shell of operand A as one closed edge, interior on the right.
    fn add_square_shell(graph: &mut OverlayGraph) -> EdgeId {
        let mut label = OverlayLabel::new();
        label.init_boundary(0, Location::Exterior, Location::Interior, false);
        label.init_not_part(1);
        graph.add_edge(
            pts(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]),
            label,
        )
    }

    #[test]
    fn test_disconnected_edge_interior_only_if_no_end_exterior() {
        let a = wkt(SQUARE);
        let b = wkt("MULTILINESTRING((2 2,8 2),(5 5,10 5),(10 7,15 7),(12 2,15 2))");
        let mut graph = OverlayGraph::new();
        let shell = add_square_shell(&mut graph);
        let inside = graph.add_edge(pts(&[(2.0, 2.0), (8.0, 2.0)]), line_of_b());
        let to_boundary = graph.add_edge(pts(&[(5.0, 5.0), (10.0, 5.0)]), line_of_b());
        let from_boundary_out = graph.add_edge(pts(&[(10.0, 7.0), (15.0, 7.0)]), line_of_b());
        let outside = graph.add_edge(pts(&[(12.0, 2.0), (15.0, 2.0)]), line_of_b());

        let input = InputGeometry::new(&a, Some(&b));
        OverlayLabeller::new(&mut graph, input, [true, true])
            .compute_labelling()
            .unwrap();

        let loc_a = |e: EdgeId| graph.label(e).line_location(0);
        assert_eq!(loc_a(inside), Some(Location::Interior));
        assert_eq!(loc_a(to_boundary), Some(Location::Interior));
        assert_eq!(loc_a(from_boundary_out), Some(Location::Exterior));
        assert_eq!(loc_a(outside), Some(Location::Exterior));
        // disconnected edges are located on every side
        let label = graph.label(inside);
        assert_eq!(label.location(0, Position::Left, true), Some(Location::Interior));
        assert_eq!(label.location(0, Position::Right, false), Some(Location::Interior));

        // the shell keeps its sides and lies outside the line operand
        let label = graph.label(shell);
        assert_eq!(label.location(0, Position::Right, true), Some(Location::Interior));
        assert_eq!(label.location(0, Position::Left, true), Some(Location::Exterior));
        assert_eq!(label.line_location(1), Some(Location::Exterior));
    }

    #[test]
    fn test_edges_at_boundary_node_take_side_location() {
        let a = wkt(SQUARE);
        let b = wkt("MULTILINESTRING((0 0,5 5),(0 0,-5 0))");
        let mut graph = OverlayGraph::new();
        add_square_shell(&mut graph);
        let into_area = graph.add_edge(pts(&[(0.0, 0.0), (5.0, 5.0)]), line_of_b());
        let away = graph.add_edge(pts(&[(0.0, 0.0), (-5.0, 0.0)]), line_of_b());

        let input = InputGeometry::new(&a, Some(&b));
        OverlayLabeller::new(&mut graph, input, [true, true])
            .compute_labelling()
            .unwrap();

        assert_eq!(graph.label(into_area).line_location(0), Some(Location::Interior));
        assert_eq!(graph.label(away).line_location(0), Some(Location::Exterior));
    }

    #[test]
    fn test_collapsed_hole_is_interior_and_propagates() {
        let a = wkt("POLYGON((0 0,0 10,10 10,10 0,0 0),(2 2,4 4,2.1 2,2 2))");
        let b = wkt("LINESTRING(4 4,6 4)");
        let mut graph = OverlayGraph::new();
        add_square_shell(&mut graph);
        let mut collapse = OverlayLabel::new();
        collapse.init_collapse(0, true);
        collapse.init_not_part(1);
        let hole = graph.add_edge(pts(&[(2.0, 2.0), (4.0, 4.0)]), collapse);
        let attached = graph.add_edge(pts(&[(4.0, 4.0), (6.0, 4.0)]), line_of_b());

        let input = InputGeometry::new(&a, Some(&b));
        OverlayLabeller::new(&mut graph, input, [true, true])
            .compute_labelling()
            .unwrap();

        let label = graph.label(hole);
        assert!(label.is_collapse(0));
        assert_eq!(label.line_location(0), Some(Location::Interior));
        assert!(label.is_interior_collapse());
        assert_eq!(label.line_location(1), Some(Location::Exterior));
        assert_eq!(graph.label(attached).line_location(0), Some(Location::Interior));
    }

    #[test]
    fn test_collapsed_shell_is_exterior() {
        let a = wkt("MULTIPOLYGON(((0 0,0 10,10 10,10 0,0 0)),((20 0,22 2,20.1 0,20 0)))");
        let b = wkt("LINESTRING(30 0,31 0)");
        let mut graph = OverlayGraph::new();
        add_square_shell(&mut graph);
        let mut collapse = OverlayLabel::new();
        collapse.init_collapse(0, false);
        collapse.init_not_part(1);
        let shell = graph.add_edge(pts(&[(20.0, 0.0), (22.0, 2.0)]), collapse);
        graph.add_edge(pts(&[(30.0, 0.0), (31.0, 0.0)]), line_of_b());

        let input = InputGeometry::new(&a, Some(&b));
        OverlayLabeller::new(&mut graph, input, [true, true])
            .compute_labelling()
            .unwrap();

        let label = graph.label(shell);
        assert_eq!(label.line_location(0), Some(Location::Exterior));
        assert!(!label.is_interior_collapse());
    }

    #[test]
    fn test_collapse_inside_other_area_marks_result() {
        // B collapsed to an edge lying inside A
        let a = wkt(SQUARE);
        let b = wkt("POLYGON((2 2,4 4,2.1 2,2 2))");
        let mut graph = OverlayGraph::new();
        let shell = add_square_shell(&mut graph);
        let mut collapse = OverlayLabel::new();
        collapse.init_not_part(0);
        collapse.init_collapse(1, false);
        let collapsed = graph.add_edge(pts(&[(2.0, 2.0), (4.0, 4.0)]), collapse);

        let input = InputGeometry::new(&a, Some(&b));
        let mut labeller = OverlayLabeller::new(&mut graph, input, [true, true]);
        labeller.compute_labelling().unwrap();
        labeller.mark_result_area_edges(OverlayOp::Union);
        labeller.unmark_duplicate_edges_from_result_area();

        let label = graph.label(collapsed);
        assert_eq!(label.line_location(0), Some(Location::Interior));
        assert_eq!(label.line_location(1), Some(Location::Exterior));
        assert!(label.is_collapse_and_not_part_interior());
        // only the shell bounds the union
        assert!(graph.is_in_result_area(shell));
        assert!(!graph.is_in_result_area(OverlayGraph::sym(shell)));
        assert!(!graph.is_in_result_area(collapsed));
    }

    #[test]
    fn test_side_location_conflict_is_topology_error() {
        let a = wkt(SQUARE);
        let mut graph = OverlayGraph::new();
        add_square_shell(&mut graph);
        // a second boundary at the same node claiming the wrong sides
        let mut label = OverlayLabel::new();
        label.init_boundary(0, Location::Exterior, Location::Exterior, false);
        graph.add_edge(pts(&[(0.0, 0.0), (5.0, 5.0)]), label);

        let input = InputGeometry::new(&a, None);
        let err = OverlayLabeller::new(&mut graph, input, [true, false])
            .compute_labelling()
            .unwrap_err();
        assert!(matches!(err, OverlayError::Topology { .. }));
    }
}
