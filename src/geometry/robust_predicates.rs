// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Robust geometric predicates for overlay operations
//! Implements a filtered orientation test with an exact expansion fallback

use super::Coordinate;

/// Orientation of a point relative to a directed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    Collinear,
    CounterClockwise,
}

impl Orientation {
    pub fn index(&self) -> i32 {
        match self {
            Orientation::Clockwise => -1,
            Orientation::Collinear => 0,
            Orientation::CounterClockwise => 1,
        }
    }
}

/// Relative error bound for the fast determinant (Shewchuk's ccwerrboundA).
const CCW_ERR_BOUND: f64 = (3.0 + 16.0 * f64::EPSILON / 2.0) * (f64::EPSILON / 2.0);

/// Orientation index of `q` relative to segment `p1`-`p2`.
/// Returns 1 if `q` is to the left (counter-clockwise), -1 if to the right,
/// 0 if collinear. The sign is exact.
pub fn orientation_index(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> i32 {
    let det_left = (p1.x - q.x) * (p2.y - q.y);
    let det_right = (p1.y - q.y) * (p2.x - q.x);
    let det = det_left - det_right;

    let det_sum = if det_left > 0.0 {
        if det_right <= 0.0 {
            return signum(det);
        }
        det_left + det_right
    } else if det_left < 0.0 {
        if det_right >= 0.0 {
            return signum(det);
        }
        -det_left - det_right
    } else {
        return signum(det);
    };

    let err_bound = CCW_ERR_BOUND * det_sum;
    if det >= err_bound || -det >= err_bound {
        return signum(det);
    }

    exact_orientation(p1, p2, q)
}

pub fn orientation(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> Orientation {
    match orientation_index(p1, p2, q) {
        1 => Orientation::CounterClockwise,
        -1 => Orientation::Clockwise,
        _ => Orientation::Collinear,
    }
}

fn signum(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Exact sign of the orientation determinant using expansion arithmetic.
fn exact_orientation(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> i32 {
    let ax = two_diff(p1.x, q.x);
    let ay = two_diff(p1.y, q.y);
    let bx = two_diff(p2.x, q.x);
    let by = two_diff(p2.y, q.y);

    let mut expansion: Vec<f64> = Vec::with_capacity(32);
    for &(a, b, sign) in &[(ax, by, 1.0), (ay, bx, -1.0)] {
        for &u in &[a.0, a.1] {
            for &v in &[b.0, b.1] {
                let (hi, lo) = two_product(u, v);
                grow_expansion(&mut expansion, sign * hi);
                grow_expansion(&mut expansion, sign * lo);
            }
        }
    }

    expansion
        .iter()
        .rev()
        .find(|c| **c != 0.0)
        .map(|c| signum(*c))
        .unwrap_or(0)
}

/// Error-free transformation: a - b = hi + lo exactly
fn two_diff(a: f64, b: f64) -> (f64, f64) {
    let x = a - b;
    let b_virtual = a - x;
    let a_virtual = x + b_virtual;
    let b_round = b_virtual - b;
    let a_round = a - a_virtual;
    (x, a_round + b_round)
}

/// Error-free transformation: a + b = hi + lo exactly
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let x = a + b;
    let b_virtual = x - a;
    let a_virtual = x - b_virtual;
    let b_round = b - b_virtual;
    let a_round = a - a_virtual;
    (x, a_round + b_round)
}

/// Error-free transformation: a * b = hi + lo exactly (via fused multiply-add)
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let err = a.mul_add(b, -p);
    (p, err)
}

/// Adds `b` to a nonoverlapping expansion, keeping components in increasing
/// magnitude so the last nonzero component carries the sign of the sum.
fn grow_expansion(e: &mut Vec<f64>, b: f64) {
    let mut q = b;
    for component in e.iter_mut() {
        let (sum, err) = two_sum(q, *component);
        *component = err;
        q = sum;
    }
    e.push(q);
}

/// Signed area of a ring; positive for counter-clockwise rings.
pub fn signed_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    // shift to the first vertex to reduce cancellation
    let x0 = ring[0].x;
    let mut sum = 0.0;
    for i in 1..ring.len() - 1 {
        let x = ring[i].x - x0;
        let y1 = ring[i + 1].y;
        let y2 = ring[i - 1].y;
        sum += x * (y2 - y1);
    }
    -sum / 2.0
}

/// Robust counter-clockwise test for a closed ring, based on the orientation
/// at the highest vertex. Degenerate (flat or collapsed) rings return false.
pub fn is_ccw(ring: &[Coordinate]) -> bool {
    if ring.len() < 4 {
        return false;
    }
    let n = ring.len() - 1;

    let mut up_hi = ring[0];
    let mut up_low: Option<Coordinate> = None;
    let mut i_up_hi = 0;
    let mut prev_y = up_hi.y;
    for (i, p) in ring.iter().enumerate().take(n + 1).skip(1) {
        if p.y > prev_y && p.y >= up_hi.y {
            up_hi = *p;
            i_up_hi = i;
            up_low = Some(ring[i - 1]);
        }
        prev_y = p.y;
    }
    let up_low = match up_low {
        Some(p) if i_up_hi != 0 => p,
        _ => return false,
    };

    let mut i_down_low = i_up_hi;
    loop {
        i_down_low = (i_down_low + 1) % n;
        if i_down_low == i_up_hi || ring[i_down_low].y != up_hi.y {
            break;
        }
    }
    let down_low = ring[i_down_low];
    let i_down_hi = if i_down_low > 0 { i_down_low - 1 } else { n - 1 };
    let down_hi = ring[i_down_hi];

    if up_hi.equals_2d(&down_hi) {
        if up_low.equals_2d(&up_hi) || down_low.equals_2d(&up_hi) || up_low.equals_2d(&down_low)
        {
            return false;
        }
        orientation_index(&up_low, &up_hi, &down_low) == 1
    } else {
        down_hi.x - up_hi.x < 0.0
    }
}
