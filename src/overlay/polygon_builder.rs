// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon extraction from result area edges.
//!
//! Result half-edges (interior on their right) are first linked into
//! maximal rings, which may touch themselves at nodes. Each maximal ring is
//! then split into minimal rings by linking, at every node, each incoming
//! edge to the nearest clockwise outgoing edge of the same maximal ring.
//! Clockwise minimal rings are shells; counter-clockwise ones are holes.
//! Holes not formed together with a shell are assigned to the smallest
//! shell containing them.

use super::graph::{EdgeId, OverlayGraph};
use crate::error::{OverlayError, Result};
use crate::geometry::{
    close_ring, is_ccw, locate_in_ring, point_not_in_list, Coordinate, Envelope, Location, Polygon,
};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    FindIncoming,
    LinkOutgoing,
}

#[derive(Debug, Clone)]
struct EdgeRing {
    pts: Vec<Coordinate>,
    env: Envelope,
    is_hole: bool,
    shell: Option<usize>,
}

impl EdgeRing {
    fn contains_point(&self, pt: &Coordinate) -> bool {
        locate_in_ring(pt, &self.pts) != Location::Exterior
    }
}

pub struct PolygonBuilder<'g> {
    graph: &'g mut OverlayGraph,
    rings: Vec<EdgeRing>,
    shells: Vec<usize>,
    free_holes: Vec<usize>,
}

impl<'g> PolygonBuilder<'g> {
    pub fn new(graph: &'g mut OverlayGraph) -> Self {
        Self {
            graph,
            rings: Vec::new(),
            shells: Vec::new(),
            free_holes: Vec::new(),
        }
    }

    /// Builds polygons from the half-edges marked in the result area.
    #[instrument(skip(self))]
    pub fn build(mut self) -> Result<Vec<Polygon>> {
        let result_edges = self.graph.result_area_edges();
        for &e in &result_edges {
            self.link_result_area_max_ring_at_node(e)?;
        }
        let max_rings = self.build_maximal_rings(&result_edges)?;
        for (id, start) in max_rings.into_iter().enumerate() {
            let min_rings = self.build_minimal_rings(id, start)?;
            self.assign_shells_and_holes(min_rings)?;
        }
        self.place_free_holes()?;
        debug!(shells = self.shells.len(), rings = self.rings.len(), "built result polygons");
        Ok(self.polygons())
    }

    /// Links each incoming result edge at the origin of `node_edge` to the
    /// next outgoing result edge CCW.
    fn link_result_area_max_ring_at_node(&mut self, node_edge: EdgeId) -> Result<()> {
        let end_out = self.graph.o_next(node_edge);
        let mut curr_out = end_out;
        let mut state = LinkState::FindIncoming;
        let mut curr_result_in: Option<EdgeId> = None;
        loop {
            // already linked at this node
            if let Some(e_in) = curr_result_in {
                if self.graph.next_result_max(e_in).is_some() {
                    return Ok(());
                }
            }
            match state {
                LinkState::FindIncoming => {
                    let curr_in = OverlayGraph::sym(curr_out);
                    if self.graph.is_in_result_area(curr_in) {
                        curr_result_in = Some(curr_in);
                        state = LinkState::LinkOutgoing;
                    }
                }
                LinkState::LinkOutgoing => {
                    if self.graph.is_in_result_area(curr_out) {
                        if let Some(e_in) = curr_result_in {
                            self.graph.set_next_result_max(e_in, curr_out);
                        }
                        state = LinkState::FindIncoming;
                    }
                }
            }
            curr_out = self.graph.o_next(curr_out);
            if curr_out == end_out {
                break;
            }
        }
        if state == LinkState::LinkOutgoing {
            return Err(OverlayError::topology_at(
                "no outgoing edge found",
                self.graph.orig(node_edge),
            ));
        }
        Ok(())
    }

    /// Start edges of the maximal rings; ring ids are positions in the result.
    fn build_maximal_rings(&mut self, result_edges: &[EdgeId]) -> Result<Vec<EdgeId>> {
        let mut starts = Vec::new();
        for &e in result_edges {
            if !self.graph.label(e).is_boundary_either() || self.graph.max_edge_ring(e).is_some() {
                continue;
            }
            let id = starts.len();
            self.attach_max_ring_edges(e, id)?;
            starts.push(e);
        }
        Ok(starts)
    }

    fn attach_max_ring_edges(&mut self, start: EdgeId, id: usize) -> Result<()> {
        let mut edge = start;
        loop {
            if self.graph.max_edge_ring(edge) == Some(id) {
                return Err(OverlayError::topology_at(
                    "Ring edge visited twice",
                    self.graph.orig(edge),
                ));
            }
            let Some(next) = self.graph.next_result_max(edge) else {
                return Err(OverlayError::topology_at(
                    "Ring edge missing",
                    self.graph.dest(edge),
                ));
            };
            self.graph.set_max_edge_ring(edge, id);
            edge = next;
            if edge == start {
                return Ok(());
            }
        }
    }

    fn build_minimal_rings(&mut self, max_id: usize, start: EdgeId) -> Result<Vec<usize>> {
        let mut e = start;
        loop {
            self.link_min_ring_edges_at_node(e, max_id)?;
            e = self.next_max(e)?;
            if e == start {
                break;
            }
        }
        let mut min_rings = Vec::new();
        let mut e = start;
        loop {
            if self.graph.edge_ring(e).is_none() {
                min_rings.push(self.build_edge_ring(e)?);
            }
            e = self.next_max(e)?;
            if e == start {
                return Ok(min_rings);
            }
        }
    }

    fn next_max(&self, e: EdgeId) -> Result<EdgeId> {
        self.graph
            .next_result_max(e)
            .ok_or_else(|| OverlayError::topology_at("Ring edge missing", self.graph.dest(e)))
    }

    /// Pairs incoming and outgoing edges of one maximal ring around a node,
    /// starting from the outgoing `node_edge`.
    fn link_min_ring_edges_at_node(&mut self, node_edge: EdgeId, max_id: usize) -> Result<()> {
        let end_out = node_edge;
        let mut curr_max_ring_out = Some(end_out);
        let mut curr_out = self.graph.o_next(end_out);
        loop {
            let curr_in = OverlayGraph::sym(curr_out);
            if self.graph.max_edge_ring(curr_in) == Some(max_id) && self.graph.next_result(curr_in).is_some() {
                return Ok(());
            }
            curr_max_ring_out = match curr_max_ring_out {
                None => (self.graph.max_edge_ring(curr_out) == Some(max_id)).then_some(curr_out),
                Some(out) => {
                    if self.graph.max_edge_ring(curr_in) == Some(max_id) {
                        self.graph.set_next_result(curr_in, out);
                        None
                    } else {
                        Some(out)
                    }
                }
            };
            curr_out = self.graph.o_next(curr_out);
            if curr_out == end_out {
                break;
            }
        }
        if curr_max_ring_out.is_some() {
            return Err(OverlayError::topology_at(
                "Unmatched edge found during min-ring linking",
                self.graph.orig(node_edge),
            ));
        }
        Ok(())
    }

    fn build_edge_ring(&mut self, start: EdgeId) -> Result<usize> {
        let id = self.rings.len();
        let mut pts = Vec::new();
        let mut edge = start;
        loop {
            if self.graph.edge_ring(edge) == Some(id) {
                return Err(OverlayError::topology_at(
                    "Edge visited twice during ring-building",
                    self.graph.orig(edge),
                ));
            }
            self.graph.add_coordinates(edge, &mut pts);
            self.graph.set_edge_ring(edge, id);
            let Some(next) = self.graph.next_result(edge) else {
                return Err(OverlayError::topology_at(
                    "Found null edge in ring",
                    self.graph.dest(edge),
                ));
            };
            edge = next;
            if edge == start {
                break;
            }
        }
        close_ring(&mut pts);
        self.rings.push(EdgeRing {
            env: Envelope::from_coordinates(&pts),
            is_hole: is_ccw(&pts),
            pts,
            shell: None,
        });
        Ok(id)
    }

    fn assign_shells_and_holes(&mut self, min_rings: Vec<usize>) -> Result<()> {
        let shells: Vec<usize> = min_rings
            .iter()
            .copied()
            .filter(|&r| !self.rings[r].is_hole)
            .collect();
        match shells.as_slice() {
            [] => self.free_holes.extend(min_rings),
            [shell] => {
                for &r in &min_rings {
                    if self.rings[r].is_hole {
                        self.rings[r].shell = Some(*shell);
                    }
                }
                self.shells.push(*shell);
            }
            _ => {
                return Err(OverlayError::topology_at(
                    "found two shells in edge ring list",
                    self.rings[shells[0]].pts[0],
                ))
            }
        }
        Ok(())
    }

    fn place_free_holes(&mut self) -> Result<()> {
        for hole in std::mem::take(&mut self.free_holes) {
            if self.rings[hole].shell.is_some() {
                continue;
            }
            let Some(shell) = self.find_containing_shell(hole) else {
                return Err(OverlayError::topology_at(
                    "unable to assign free hole to a shell",
                    self.rings[hole].pts[0],
                ));
            };
            self.rings[hole].shell = Some(shell);
        }
        Ok(())
    }

    /// Smallest shell whose envelope and interior contain the hole.
    fn find_containing_shell(&self, hole: usize) -> Option<usize> {
        let test = &self.rings[hole];
        let mut min_shell: Option<usize> = None;
        for &s in &self.shells {
            let shell = &self.rings[s];
            if shell.env == test.env || !shell.env.covers(&test.env) {
                continue;
            }
            let Some(test_pt) = point_not_in_list(&test.pts, &shell.pts) else {
                continue;
            };
            if !shell.contains_point(&test_pt) {
                continue;
            }
            let smaller = match min_shell {
                None => true,
                Some(m) => self.rings[m].env.covers(&shell.env),
            };
            if smaller {
                min_shell = Some(s);
            }
        }
        min_shell
    }

    fn polygons(&self) -> Vec<Polygon> {
        self.shells
            .iter()
            .map(|&s| {
                let holes = self
                    .rings
                    .iter()
                    .filter(|r| r.is_hole && r.shell == Some(s))
                    .map(|r| r.pts.clone())
                    .collect();
                Polygon::new(self.rings[s].pts.clone(), holes)
            })
            .collect()
    }
}
