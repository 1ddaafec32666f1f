// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Robust segment-segment intersection

use super::envelope::{segment_envelope_contains, segments_envelopes_intersect};
use super::robust_predicates::orientation_index;
use super::{Coordinate, PrecisionModel};

/// Kind of intersection found between two segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionKind {
    None,
    /// Single point
    Point,
    /// Collinear overlap; two distinct points
    Collinear,
}

/// Computes the intersection of two segments using exact orientation tests
/// for classification and a conditioned computation for proper crossings.
#[derive(Debug, Clone)]
pub struct LineIntersector {
    precision: Option<PrecisionModel>,
    kind: IntersectionKind,
    points: [Coordinate; 2],
    proper: bool,
    input: [[Coordinate; 2]; 2],
}

impl LineIntersector {
    pub fn new() -> Self {
        Self {
            precision: None,
            kind: IntersectionKind::None,
            points: [Coordinate::default(); 2],
            proper: false,
            input: [[Coordinate::default(); 2]; 2],
        }
    }

    /// Intersector that rounds computed points to `pm`.
    pub fn with_precision(pm: PrecisionModel) -> Self {
        let mut li = Self::new();
        if !pm.is_floating() {
            li.precision = Some(pm);
        }
        li
    }

    pub fn compute_intersection(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> IntersectionKind {
        self.input = [[*p1, *p2], [*q1, *q2]];
        self.proper = false;
        self.kind = self.compute(p1, p2, q1, q2);
        self.kind
    }

    fn compute(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> IntersectionKind {
        if !segments_envelopes_intersect(p1, p2, q1, q2) {
            return IntersectionKind::None;
        }

        let pq1 = orientation_index(p1, p2, q1);
        let pq2 = orientation_index(p1, p2, q2);
        if (pq1 > 0 && pq2 > 0) || (pq1 < 0 && pq2 < 0) {
            return IntersectionKind::None;
        }
        let qp1 = orientation_index(q1, q2, p1);
        let qp2 = orientation_index(q1, q2, p2);
        if (qp1 > 0 && qp2 > 0) || (qp1 < 0 && qp2 < 0) {
            return IntersectionKind::None;
        }

        if pq1 == 0 && pq2 == 0 && qp1 == 0 && qp2 == 0 {
            return self.compute_collinear(p1, p2, q1, q2);
        }

        if pq1 == 0 || pq2 == 0 || qp1 == 0 || qp2 == 0 {
            // endpoint touch; the point is an input vertex
            self.points[0] = if p1.equals_2d(q1) || p1.equals_2d(q2) {
                with_z_from(p1, q1, q2)
            } else if p2.equals_2d(q1) || p2.equals_2d(q2) {
                with_z_from(p2, q1, q2)
            } else if pq1 == 0 {
                with_z_from(q1, p1, p2)
            } else if pq2 == 0 {
                with_z_from(q2, p1, p2)
            } else if qp1 == 0 {
                with_z_from(p1, q1, q2)
            } else {
                with_z_from(p2, q1, q2)
            };
        } else {
            self.proper = true;
            self.points[0] = self.proper_intersection(p1, p2, q1, q2);
        }
        IntersectionKind::Point
    }

    fn compute_collinear(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> IntersectionKind {
        let q1_in_p = segment_envelope_contains(p1, p2, q1);
        let q2_in_p = segment_envelope_contains(p1, p2, q2);
        let p1_in_q = segment_envelope_contains(q1, q2, p1);
        let p2_in_q = segment_envelope_contains(q1, q2, p2);

        if q1_in_p && q2_in_p {
            self.points = [with_z_from(q1, p1, p2), with_z_from(q2, p1, p2)];
            return IntersectionKind::Collinear;
        }
        if p1_in_q && p2_in_q {
            self.points = [with_z_from(p1, q1, q2), with_z_from(p2, q1, q2)];
            return IntersectionKind::Collinear;
        }
        let candidates = [
            (q1_in_p && p1_in_q, q1, p1, q2_in_p || p2_in_q),
            (q1_in_p && p2_in_q, q1, p2, q2_in_p || p1_in_q),
            (q2_in_p && p1_in_q, q2, p1, q1_in_p || p2_in_q),
            (q2_in_p && p2_in_q, q2, p2, q1_in_p || p1_in_q),
        ];
        for (hit, a, b, other_inside) in candidates {
            if hit {
                self.points = [with_z_from(a, p1, p2), with_z_from(b, q1, q2)];
                return if a.equals_2d(b) && !other_inside {
                    IntersectionKind::Point
                } else {
                    IntersectionKind::Collinear
                };
            }
        }
        IntersectionKind::None
    }

    fn proper_intersection(
        &self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> Coordinate {
        let mut pt = conditioned_intersection(p1, p2, q1, q2)
            .unwrap_or_else(|| nearest_endpoint(p1, p2, q1, q2));
        if !(segment_envelope_contains(p1, p2, &pt) && segment_envelope_contains(q1, q2, &pt)) {
            pt = nearest_endpoint(p1, p2, q1, q2);
        }
        if let Some(pm) = &self.precision {
            pt = pm.make_precise(&pt);
        }
        pt.z = interpolate_z_both(&pt, p1, p2, q1, q2);
        pt
    }

    pub fn kind(&self) -> IntersectionKind {
        self.kind
    }

    pub fn has_intersection(&self) -> bool {
        self.kind != IntersectionKind::None
    }

    pub fn intersection_num(&self) -> usize {
        match self.kind {
            IntersectionKind::None => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Collinear => 2,
        }
    }

    pub fn intersection(&self, i: usize) -> Coordinate {
        self.points[i]
    }

    /// True if the intersection is a single point interior to both segments.
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.proper
    }

    /// True if some intersection point is not an endpoint of either input.
    pub fn is_interior_intersection(&self) -> bool {
        self.is_interior_intersection_of(0) || self.is_interior_intersection_of(1)
    }

    /// True if some intersection point is not an endpoint of input `index`.
    pub fn is_interior_intersection_of(&self, index: usize) -> bool {
        (0..self.intersection_num()).any(|i| {
            let pt = &self.points[i];
            !(pt.equals_2d(&self.input[index][0]) || pt.equals_2d(&self.input[index][1]))
        })
    }
}

impl Default for LineIntersector {
    fn default() -> Self {
        Self::new()
    }
}

/// Homogeneous-coordinate intersection of the two lines, computed relative to
/// the midpoint of the segment envelopes' overlap to retain precision.
fn conditioned_intersection(
    p1: &Coordinate,
    p2: &Coordinate,
    q1: &Coordinate,
    q2: &Coordinate,
) -> Option<Coordinate> {
    let int_min_x = p1.x.min(p2.x).max(q1.x.min(q2.x));
    let int_max_x = p1.x.max(p2.x).min(q1.x.max(q2.x));
    let int_min_y = p1.y.min(p2.y).max(q1.y.min(q2.y));
    let int_max_y = p1.y.max(p2.y).min(q1.y.max(q2.y));
    let mid_x = (int_min_x + int_max_x) / 2.0;
    let mid_y = (int_min_y + int_max_y) / 2.0;

    let (p1x, p1y) = (p1.x - mid_x, p1.y - mid_y);
    let (p2x, p2y) = (p2.x - mid_x, p2.y - mid_y);
    let (q1x, q1y) = (q1.x - mid_x, q1.y - mid_y);
    let (q2x, q2y) = (q2.x - mid_x, q2.y - mid_y);

    let px = p1y - p2y;
    let py = p2x - p1x;
    let pw = p1x * p2y - p2x * p1y;
    let qx = q1y - q2y;
    let qy = q2x - q1x;
    let qw = q1x * q2y - q2x * q1y;

    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;

    let x_int = x / w;
    let y_int = y / w;
    if !x_int.is_finite() || !y_int.is_finite() {
        return None;
    }
    Some(Coordinate::new(x_int + mid_x, y_int + mid_y))
}

/// Endpoint closest to the other segment.
fn nearest_endpoint(p1: &Coordinate, p2: &Coordinate, q1: &Coordinate, q2: &Coordinate) -> Coordinate {
    let candidates = [
        (distance_point_segment(p1, q1, q2), p1),
        (distance_point_segment(p2, q1, q2), p2),
        (distance_point_segment(q1, p1, p2), q1),
        (distance_point_segment(q2, p1, p2), q2),
    ];
    let mut best = candidates[0];
    for c in &candidates[1..] {
        if c.0 < best.0 {
            best = *c;
        }
    }
    *best.1
}

/// Euclidean distance from `p` to segment `a`-`b`.
pub fn distance_point_segment(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    if a.equals_2d(b) {
        return p.distance(a);
    }
    let len2 = (b.x - a.x) * (b.x - a.x) + (b.y - a.y) * (b.y - a.y);
    let r = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len2;
    if r <= 0.0 {
        return p.distance(a);
    }
    if r >= 1.0 {
        return p.distance(b);
    }
    let s = ((a.y - p.y) * (b.x - a.x) - (a.x - p.x) * (b.y - a.y)) / len2;
    s.abs() * len2.sqrt()
}

/// Z of `p` interpolated along segment `a`-`b`; NaN if neither end has Z.
pub fn interpolate_z(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    if !a.has_z() {
        return b.z;
    }
    if !b.has_z() || a.equals_2d(b) {
        return a.z;
    }
    if p.equals_2d(a) {
        return a.z;
    }
    if p.equals_2d(b) {
        return b.z;
    }
    let dz = b.z - a.z;
    if dz == 0.0 {
        return a.z;
    }
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let seg_len = dx * dx + dy * dy;
    let x_off = p.x - a.x;
    let y_off = p.y - a.y;
    let frac = ((x_off * x_off + y_off * y_off) / seg_len).sqrt();
    a.z + dz * frac
}

fn interpolate_z_both(
    p: &Coordinate,
    p1: &Coordinate,
    p2: &Coordinate,
    q1: &Coordinate,
    q2: &Coordinate,
) -> f64 {
    let zp = interpolate_z(p, p1, p2);
    let zq = interpolate_z(p, q1, q2);
    match (zp.is_nan(), zq.is_nan()) {
        (true, _) => zq,
        (_, true) => zp,
        _ => (zp + zq) / 2.0,
    }
}

/// Copy of a vertex, taking Z from the other segment when the vertex has none.
fn with_z_from(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> Coordinate {
    let mut out = *p;
    if !out.has_z() {
        out.z = interpolate_z(p, a, b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_proper_crossing() {
        let mut li = LineIntersector::new();
        let kind = li.compute_intersection(&c(0.0, 0.0), &c(10.0, 10.0), &c(0.0, 10.0), &c(10.0, 0.0));
        assert_eq!(kind, IntersectionKind::Point);
        assert!(li.is_proper());
        assert_eq!(li.intersection(0), c(5.0, 5.0));
        assert!(li.is_interior_intersection());
    }

    #[test]
    fn test_endpoint_touch_is_not_proper() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 0.0), &c(10.0, 0.0), &c(10.0, 5.0));
        assert_eq!(li.kind(), IntersectionKind::Point);
        assert!(!li.is_proper());
        assert!(!li.is_interior_intersection());
    }

    #[test]
    fn test_t_junction_is_interior_for_one_input() {
        let mut li = LineIntersector::new();
        li.compute_intersection(&c(0.0, 0.0), &c(10.0, 0.0), &c(5.0, 0.0), &c(5.0, 5.0));
        assert_eq!(li.intersection(0), c(5.0, 0.0));
        assert!(li.is_interior_intersection_of(0));
        assert!(!li.is_interior_intersection_of(1));
    }

    #[test]
    fn test_collinear_overlap() {
        let mut li = LineIntersector::new();
        let kind = li.compute_intersection(&c(0.0, 0.0), &c(10.0, 0.0), &c(5.0, 0.0), &c(15.0, 0.0));
        assert_eq!(kind, IntersectionKind::Collinear);
        assert_eq!(li.intersection_num(), 2);
    }

    #[test]
    fn test_disjoint() {
        let mut li = LineIntersector::new();
        let kind = li.compute_intersection(&c(0.0, 0.0), &c(1.0, 0.0), &c(0.0, 1.0), &c(1.0, 1.0));
        assert_eq!(kind, IntersectionKind::None);
    }

    #[test]
    fn test_rounded_intersection() {
        let mut li = LineIntersector::with_precision(PrecisionModel::fixed(1.0).unwrap());
        li.compute_intersection(&c(0.0, 0.0), &c(3.0, 1.0), &c(0.0, 1.0), &c(3.0, 0.0));
        assert_eq!(li.intersection(0), c(2.0, 1.0));
    }

    #[test]
    fn test_z_interpolated_at_crossing() {
        let mut li = LineIntersector::new();
        li.compute_intersection(
            &Coordinate::new_z(0.0, 0.0, 0.0),
            &Coordinate::new_z(10.0, 0.0, 10.0),
            &c(5.0, -5.0),
            &c(5.0, 5.0),
        );
        assert_eq!(li.intersection(0).z, 5.0);
    }
}
