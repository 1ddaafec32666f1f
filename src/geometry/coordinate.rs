// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar coordinate with an optional elevation attribute

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

fn nan() -> f64 {
    f64::NAN
}

fn is_nan(z: &f64) -> bool {
    z.is_nan()
}

/// A planar coordinate. `z` is an attribute only; `NaN` means "no Z".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    #[serde(default = "nan", skip_serializing_if = "is_nan")]
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: f64::NAN }
    }

    pub fn new_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn has_z(&self) -> bool {
        !self.z.is_nan()
    }

    /// Equality on x and y only.
    pub fn equals_2d(&self, other: &Coordinate) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub fn distance(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Lexicographic order on (x, y).
    pub fn compare_2d(&self, other: &Coordinate) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }

    pub fn key(&self) -> CoordKey {
        CoordKey::from(self)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Coordinates compare equal on their 2-D position; Z is ignored.
impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.equals_2d(other)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Hashable 2-D key for a coordinate. `-0.0` and `0.0` map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CoordKey(u64, u64);

impl CoordKey {
    fn bits(v: f64) -> u64 {
        if v == 0.0 {
            0
        } else {
            v.to_bits()
        }
    }
}

impl From<&Coordinate> for CoordKey {
    fn from(c: &Coordinate) -> Self {
        CoordKey(Self::bits(c.x), Self::bits(c.y))
    }
}

impl Hash for CoordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
        self.1.hash(state);
    }
}

/// Appends a coordinate unless it repeats the last one.
pub fn push_distinct(pts: &mut Vec<Coordinate>, c: Coordinate) {
    if let Some(last) = pts.last() {
        if last.equals_2d(&c) {
            return;
        }
    }
    pts.push(c);
}

/// Copy of `pts` with consecutive duplicates removed.
pub fn remove_repeated(pts: &[Coordinate]) -> Vec<Coordinate> {
    let mut out = Vec::with_capacity(pts.len());
    for p in pts {
        push_distinct(&mut out, *p);
    }
    out
}

pub fn is_closed(pts: &[Coordinate]) -> bool {
    match (pts.first(), pts.last()) {
        (Some(a), Some(b)) => pts.len() > 1 && a.equals_2d(b),
        _ => false,
    }
}

/// Appends the start point if the sequence is not already closed.
pub fn close_ring(pts: &mut Vec<Coordinate>) {
    if let Some(first) = pts.first().copied() {
        if !is_closed(pts) {
            pts.push(first);
        }
    }
}

/// First point of `test` that does not occur in `pts`.
pub fn point_not_in_list(test: &[Coordinate], pts: &[Coordinate]) -> Option<Coordinate> {
    test.iter()
        .find(|t| !pts.iter().any(|p| p.equals_2d(t)))
        .copied()
}
