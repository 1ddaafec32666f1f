// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar graph of labelled half-edges.
//!
//! Half-edges live in an arena and refer to each other by index. Every edge
//! is stored as a pair of half-edges at indices `2k` (forward, in the
//! direction of the stored coordinates) and `2k + 1` (reverse), so the
//! opposite of half-edge `e` is always `e ^ 1`. Around each node the
//! outgoing half-edges form a circular list sorted counter-clockwise by
//! angle, linked through `o_next`.

use super::edge::Edge;
use super::label::OverlayLabel;
use crate::error::{OverlayError, Result};
use crate::geometry::{orientation_index, push_distinct, CoordKey, Coordinate};
use ahash::AHashMap;
use std::cmp::Ordering;

pub type EdgeId = usize;

#[derive(Debug, Clone)]
struct EdgeData {
    pts: Vec<Coordinate>,
    label: OverlayLabel,
}

/// Mutable per-half-edge state used while labelling and extracting results.
#[derive(Debug, Clone)]
struct HalfEdge {
    o_next: EdgeId,
    in_result_area: bool,
    in_result_line: bool,
    visited: bool,
    next_result: Option<EdgeId>,
    next_result_max: Option<EdgeId>,
    edge_ring: Option<usize>,
    max_edge_ring: Option<usize>,
}

impl HalfEdge {
    fn new(id: EdgeId) -> Self {
        Self {
            o_next: id,
            in_result_area: false,
            in_result_line: false,
            visited: false,
            next_result: None,
            next_result_max: None,
            edge_ring: None,
            max_edge_ring: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayGraph {
    edges: Vec<EdgeData>,
    half_edges: Vec<HalfEdge>,
    node_map: AHashMap<CoordKey, EdgeId>,
    /// One outgoing half-edge per node, in creation order
    nodes: Vec<EdgeId>,
}

impl OverlayGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from merged edges, labelling each with its initial
    /// topology.
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            let label = edge.create_label();
            graph.add_edge(edge.into_coordinates(), label);
        }
        graph
    }

    /// Adds an edge pair and links both half-edges into their nodes.
    /// Returns the forward half-edge.
    pub fn add_edge(&mut self, pts: Vec<Coordinate>, label: OverlayLabel) -> EdgeId {
        let e0 = self.half_edges.len();
        let e1 = e0 + 1;
        self.edges.push(EdgeData { pts, label });
        self.half_edges.push(HalfEdge::new(e0));
        self.half_edges.push(HalfEdge::new(e1));
        self.insert(e0);
        self.insert(e1);
        e0
    }

    fn insert(&mut self, e: EdgeId) {
        let key = self.orig(e).key();
        match self.node_map.get(&key) {
            Some(&node) => self.insert_at_node(node, e),
            None => {
                self.node_map.insert(key, e);
                self.nodes.push(e);
            }
        }
    }

    fn insert_at_node(&mut self, node: EdgeId, e_add: EdgeId) {
        if self.o_next(node) == node {
            self.insert_after(node, e_add);
            return;
        }
        let prev = self.insertion_edge(node, e_add);
        self.insert_after(prev, e_add);
    }

    /// Finds the edge after which `e_add` belongs in CCW order around the node.
    fn insertion_edge(&self, node: EdgeId, e_add: EdgeId) -> EdgeId {
        let mut e_prev = node;
        loop {
            let e_next = self.o_next(e_prev);
            let next_gt_prev = self.compare_angular(e_next, e_prev) == Ordering::Greater;
            let add_ge_prev = self.compare_angular(e_add, e_prev) != Ordering::Less;
            let add_le_next = self.compare_angular(e_add, e_next) != Ordering::Greater;
            // general case: e_add lies between two ascending edges
            if next_gt_prev && add_ge_prev && add_le_next {
                return e_prev;
            }
            // e_prev..e_next crosses the origin of the angular order
            if !next_gt_prev && (add_le_next || add_ge_prev) {
                return e_prev;
            }
            e_prev = e_next;
            if e_prev == node {
                return node;
            }
        }
    }

    fn insert_after(&mut self, e: EdgeId, e_add: EdgeId) {
        let save = self.o_next(e);
        self.half_edges[e].o_next = e_add;
        self.half_edges[e_add].o_next = save;
    }

    pub fn sym(e: EdgeId) -> EdgeId {
        e ^ 1
    }

    pub fn is_forward(e: EdgeId) -> bool {
        e & 1 == 0
    }

    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn half_edge_ids(&self) -> std::ops::Range<EdgeId> {
        0..self.half_edges.len()
    }

    /// One outgoing half-edge per node.
    pub fn node_edges(&self) -> &[EdgeId] {
        &self.nodes
    }

    pub fn node_edge(&self, pt: &Coordinate) -> Option<EdgeId> {
        self.node_map.get(&pt.key()).copied()
    }

    fn data(&self, e: EdgeId) -> &EdgeData {
        &self.edges[e >> 1]
    }

    pub fn label(&self, e: EdgeId) -> &OverlayLabel {
        &self.data(e).label
    }

    pub fn label_mut(&mut self, e: EdgeId) -> &mut OverlayLabel {
        &mut self.edges[e >> 1].label
    }

    pub fn orig(&self, e: EdgeId) -> Coordinate {
        let pts = &self.data(e).pts;
        if Self::is_forward(e) {
            pts[0]
        } else {
            pts[pts.len() - 1]
        }
    }

    pub fn dest(&self, e: EdgeId) -> Coordinate {
        self.orig(Self::sym(e))
    }

    /// Second vertex in the half-edge direction; determines its angle.
    pub fn direction_pt(&self, e: EdgeId) -> Coordinate {
        let pts = &self.data(e).pts;
        if Self::is_forward(e) {
            pts[1]
        } else {
            pts[pts.len() - 2]
        }
    }

    /// Coordinates in the half-edge direction.
    pub fn coordinates(&self, e: EdgeId) -> Vec<Coordinate> {
        let pts = &self.data(e).pts;
        if Self::is_forward(e) {
            pts.clone()
        } else {
            pts.iter().rev().copied().collect()
        }
    }

    /// Appends the coordinates in the half-edge direction, skipping repeats.
    pub fn add_coordinates(&self, e: EdgeId, out: &mut Vec<Coordinate>) {
        let pts = &self.data(e).pts;
        if Self::is_forward(e) {
            pts.iter().for_each(|p| push_distinct(out, *p));
        } else {
            pts.iter().rev().for_each(|p| push_distinct(out, *p));
        }
    }

    /// Next half-edge CCW around the origin.
    pub fn o_next(&self, e: EdgeId) -> EdgeId {
        self.half_edges[e].o_next
    }

    /// Next half-edge CCW around the destination, leaving it.
    pub fn next(&self, e: EdgeId) -> EdgeId {
        self.o_next(Self::sym(e))
    }

    /// Half-edge arriving at the origin which precedes `e` around its face.
    pub fn prev(&self, e: EdgeId) -> EdgeId {
        let mut curr = e;
        loop {
            let next = self.o_next(curr);
            if next == e {
                return Self::sym(curr);
            }
            curr = next;
        }
    }

    /// Number of half-edges leaving the origin.
    pub fn degree(&self, e: EdgeId) -> usize {
        let mut degree = 0;
        let mut curr = e;
        loop {
            degree += 1;
            curr = self.o_next(curr);
            if curr == e {
                return degree;
            }
        }
    }

    /// Outgoing half-edges at the origin of `e`, starting with `e`.
    pub fn node_star(&self, e: EdgeId) -> Vec<EdgeId> {
        let mut star = Vec::new();
        let mut curr = e;
        loop {
            star.push(curr);
            curr = self.o_next(curr);
            if curr == e {
                return star;
            }
        }
    }

    /// Angular order of two half-edges with a common origin, counter-clockwise
    /// from the positive x-axis. Ties between collinear half-edges are broken
    /// by length of the first segment and then by id, so the order is total.
    pub fn compare_angular(&self, a: EdgeId, b: EdgeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let orig = self.orig(a);
        let da = self.direction_pt(a);
        let db = self.direction_pt(b);
        let (dxa, dya) = (da.x - orig.x, da.y - orig.y);
        let (dxb, dyb) = (db.x - orig.x, db.y - orig.y);
        let base = if dxa == dxb && dya == dyb {
            Ordering::Equal
        } else {
            quadrant(dxa, dya)
                .cmp(&quadrant(dxb, dyb))
                .then_with(|| orientation_index(&orig, &db, &da).cmp(&0))
        };
        base.then_with(|| {
            let la = dxa * dxa + dya * dya;
            let lb = dxb * dxb + dyb * dyb;
            la.total_cmp(&lb)
        })
        .then_with(|| a.cmp(&b))
    }

    /// Whether the half-edges around the origin of `node` are in CCW order.
    pub fn is_edges_sorted(&self, node: EdgeId) -> bool {
        let star = self.node_star(node);
        let lowest = star
            .iter()
            .copied()
            .min_by(|&a, &b| self.compare_angular(a, b))
            .unwrap_or(node);
        let mut e = lowest;
        loop {
            let e_next = self.o_next(e);
            if e_next == lowest {
                return true;
            }
            if self.compare_angular(e_next, e) != Ordering::Greater {
                return false;
            }
            e = e_next;
        }
    }

    pub fn is_in_result_area(&self, e: EdgeId) -> bool {
        self.half_edges[e].in_result_area
    }

    pub fn mark_in_result_area(&mut self, e: EdgeId) {
        self.half_edges[e].in_result_area = true;
    }

    pub fn unmark_from_result_area(&mut self, e: EdgeId) {
        self.half_edges[e].in_result_area = false;
    }

    pub fn is_in_result_line(&self, e: EdgeId) -> bool {
        self.half_edges[e].in_result_line
    }

    /// Result lines are undirected, so both half-edges are marked.
    pub fn mark_in_result_line(&mut self, e: EdgeId) {
        self.half_edges[e].in_result_line = true;
        self.half_edges[Self::sym(e)].in_result_line = true;
    }

    pub fn is_in_result(&self, e: EdgeId) -> bool {
        self.is_in_result_area(e) || self.is_in_result_line(e)
    }

    pub fn is_in_result_either(&self, e: EdgeId) -> bool {
        self.is_in_result(e) || self.is_in_result(Self::sym(e))
    }

    pub fn is_visited(&self, e: EdgeId) -> bool {
        self.half_edges[e].visited
    }

    pub fn mark_visited_both(&mut self, e: EdgeId) {
        self.half_edges[e].visited = true;
        self.half_edges[Self::sym(e)].visited = true;
    }

    pub fn next_result(&self, e: EdgeId) -> Option<EdgeId> {
        self.half_edges[e].next_result
    }

    pub fn set_next_result(&mut self, e: EdgeId, next: EdgeId) {
        self.half_edges[e].next_result = Some(next);
    }

    pub fn next_result_max(&self, e: EdgeId) -> Option<EdgeId> {
        self.half_edges[e].next_result_max
    }

    pub fn set_next_result_max(&mut self, e: EdgeId, next: EdgeId) {
        self.half_edges[e].next_result_max = Some(next);
    }

    pub fn edge_ring(&self, e: EdgeId) -> Option<usize> {
        self.half_edges[e].edge_ring
    }

    pub fn set_edge_ring(&mut self, e: EdgeId, ring: usize) {
        self.half_edges[e].edge_ring = Some(ring);
    }

    pub fn max_edge_ring(&self, e: EdgeId) -> Option<usize> {
        self.half_edges[e].max_edge_ring
    }

    pub fn set_max_edge_ring(&mut self, e: EdgeId, ring: usize) {
        self.half_edges[e].max_edge_ring = Some(ring);
    }

    pub fn result_area_edges(&self) -> Vec<EdgeId> {
        self.half_edge_ids().filter(|&e| self.is_in_result_area(e)).collect()
    }

    /// Checks every node star is sorted; used after construction in debug runs.
    pub fn validate_node_order(&self) -> Result<()> {
        for &node in &self.nodes {
            if !self.is_edges_sorted(node) {
                return Err(OverlayError::topology_at(
                    "Node edges are not in angular order",
                    self.orig(node),
                ));
            }
        }
        Ok(())
    }
}

/// Quadrant of a direction vector, numbered counter-clockwise from NE.
fn quadrant(dx: f64, dy: f64) -> u8 {
    if dx >= 0.0 {
        if dy >= 0.0 {
            0
        } else {
            3
        }
    } else if dy >= 0.0 {
        1
    } else {
        2
    }
}
