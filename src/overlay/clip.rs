// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Input reduction against a clipping envelope.
//!
//! When an operation can only produce results inside a known envelope
//! (intersection, difference), input rings are clipped to that envelope and
//! long lines are limited to the sections near it. Clipping is a performance
//! optimization only; it must not change the result.

use crate::geometry::{push_distinct, Coordinate, Envelope, Geometry, PrecisionModel};

use super::OverlayOp;

/// Expansion factor for a fixed grid, in grid cells
const SAFE_ENV_GRID_FACTOR: f64 = 3.0;

/// Expansion factor for floating precision, as a fraction of envelope size
const SAFE_ENV_BUFFER_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoxEdge {
    Bottom,
    Right,
    Top,
    Left,
}

const BOX_EDGES: [BoxEdge; 4] = [BoxEdge::Bottom, BoxEdge::Right, BoxEdge::Top, BoxEdge::Left];

/// Clips rings to a rectangle, Sutherland-Hodgman style. The result may
/// contain spikes and collapsed sections along the rectangle boundary; these
/// are removed later by the overlay itself.
#[derive(Debug, Clone, Copy)]
pub struct RingClipper {
    env: Envelope,
}

impl RingClipper {
    pub fn new(env: Envelope) -> Self {
        Self { env }
    }

    pub fn clip(&self, pts: &[Coordinate]) -> Vec<Coordinate> {
        let mut out = pts.to_vec();
        for (i, edge) in BOX_EDGES.iter().enumerate() {
            let close_ring = i == BOX_EDGES.len() - 1;
            out = self.clip_to_box_edge(&out, *edge, close_ring);
            if out.is_empty() {
                break;
            }
        }
        out
    }

    fn clip_to_box_edge(&self, pts: &[Coordinate], edge: BoxEdge, close_ring: bool) -> Vec<Coordinate> {
        let mut clipped = Vec::with_capacity(pts.len());
        let Some(mut p0) = pts.last().copied() else {
            return clipped;
        };
        for p1 in pts {
            if self.is_inside(p1, edge) {
                if !self.is_inside(&p0, edge) {
                    push_distinct(&mut clipped, self.intersection(&p0, p1, edge));
                }
                push_distinct(&mut clipped, *p1);
            } else if self.is_inside(&p0, edge) {
                push_distinct(&mut clipped, self.intersection(&p0, p1, edge));
            }
            p0 = *p1;
        }
        if close_ring {
            if let (Some(first), Some(last)) = (clipped.first().copied(), clipped.last()) {
                if !first.equals_2d(last) {
                    clipped.push(first);
                }
            }
        }
        clipped
    }

    fn intersection(&self, a: &Coordinate, b: &Coordinate, edge: BoxEdge) -> Coordinate {
        let env = &self.env;
        match edge {
            BoxEdge::Bottom => Coordinate::new(line_x_at(a, b, env.min_y), env.min_y),
            BoxEdge::Right => Coordinate::new(env.max_x, line_y_at(a, b, env.max_x)),
            BoxEdge::Top => Coordinate::new(line_x_at(a, b, env.max_y), env.max_y),
            BoxEdge::Left => Coordinate::new(env.min_x, line_y_at(a, b, env.min_x)),
        }
    }

    fn is_inside(&self, p: &Coordinate, edge: BoxEdge) -> bool {
        match edge {
            BoxEdge::Bottom => p.y > self.env.min_y,
            BoxEdge::Right => p.x < self.env.max_x,
            BoxEdge::Top => p.y < self.env.max_y,
            BoxEdge::Left => p.x > self.env.min_x,
        }
    }
}

fn line_x_at(a: &Coordinate, b: &Coordinate, y: f64) -> f64 {
    let m = (b.x - a.x) / (b.y - a.y);
    a.x + (y - a.y) * m
}

fn line_y_at(a: &Coordinate, b: &Coordinate, x: f64) -> f64 {
    let m = (b.y - a.y) / (b.x - a.x);
    a.y + (x - a.x) * m
}

/// Splits a line into the sections whose segments touch an envelope. Each
/// section keeps the first vertex outside the envelope at either end, so
/// the noded result inside the envelope is unchanged.
#[derive(Debug)]
pub struct LineLimiter {
    env: Envelope,
    section: Option<Vec<Coordinate>>,
    last_outside: Option<Coordinate>,
    sections: Vec<Vec<Coordinate>>,
}

impl LineLimiter {
    pub fn new(env: Envelope) -> Self {
        Self {
            env,
            section: None,
            last_outside: None,
            sections: Vec::new(),
        }
    }

    pub fn limit(mut self, pts: &[Coordinate]) -> Vec<Vec<Coordinate>> {
        for p in pts {
            if self.env.intersects_point(p) {
                self.add_point(*p);
            } else {
                self.add_outside(*p);
            }
        }
        self.finish_section();
        self.sections
    }

    fn add_point(&mut self, p: Coordinate) {
        self.start_section();
        if let Some(section) = self.section.as_mut() {
            push_distinct(section, p);
        }
    }

    fn add_outside(&mut self, p: Coordinate) {
        if self.is_last_segment_intersecting(&p) {
            if let Some(prev) = self.last_outside {
                self.add_point(prev);
            }
            self.add_point(p);
        } else {
            self.finish_section();
        }
        self.last_outside = Some(p);
    }

    fn is_last_segment_intersecting(&self, p: &Coordinate) -> bool {
        match &self.last_outside {
            // previous point was inside
            None => self.section.is_some(),
            Some(prev) => self.env.intersects_segment(prev, p),
        }
    }

    fn start_section(&mut self) {
        let section = self.section.get_or_insert_with(Vec::new);
        if let Some(prev) = self.last_outside.take() {
            push_distinct(section, prev);
        }
    }

    fn finish_section(&mut self) {
        let Some(mut section) = self.section.take() else {
            return;
        };
        if let Some(prev) = self.last_outside.take() {
            push_distinct(&mut section, prev);
        }
        self.sections.push(section);
    }
}

/// Distance by which an envelope is grown so that clipping cannot disturb
/// results near its boundary.
pub fn safe_expand_distance(env: &Envelope, pm: &PrecisionModel) -> f64 {
    if pm.is_floating() {
        let mut min_size = env.width().min(env.height());
        if min_size <= 0.0 {
            min_size = env.width().max(env.height());
        }
        SAFE_ENV_BUFFER_FACTOR * min_size
    } else {
        SAFE_ENV_GRID_FACTOR * pm.grid_size()
    }
}

fn safe_envelope(env: &Envelope, pm: &PrecisionModel) -> Envelope {
    let mut safe = *env;
    safe.expand_by(safe_expand_distance(env, pm));
    safe
}

/// Envelope containing every possible result of `op`, or `None` if the
/// result is not bounded by the inputs' overlap.
fn result_envelope(op: OverlayOp, a: &Geometry, b: &Geometry, pm: &PrecisionModel) -> Option<Envelope> {
    match op {
        OverlayOp::Intersection => {
            let env_a = safe_envelope(&a.envelope(), pm);
            let env_b = safe_envelope(&b.envelope(), pm);
            Some(env_a.intersection(&env_b))
        }
        OverlayOp::Difference => Some(safe_envelope(&a.envelope(), pm)),
        OverlayOp::Union | OverlayOp::SymDifference => None,
    }
}

/// Clipping envelope for an operation. The result envelope is widened to
/// cover every ring segment which touches it, so clipped rings never create
/// new intersections with unclipped segments.
pub fn clipping_envelope(op: OverlayOp, a: &Geometry, b: &Geometry, pm: &PrecisionModel) -> Option<Envelope> {
    let target = result_envelope(op, a, b, pm)?;
    let mut clip = target;
    for geom in [a, b] {
        for poly in geom.polygons() {
            for ring in poly.rings() {
                for seg in ring.windows(2) {
                    if target.intersects_segment(&seg[0], &seg[1]) {
                        clip.expand_to_include(&seg[0]);
                        clip.expand_to_include(&seg[1]);
                    }
                }
            }
        }
    }
    Some(safe_envelope(&clip, pm))
}
