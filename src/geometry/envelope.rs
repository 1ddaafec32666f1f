// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Axis-aligned envelope utilities

use super::Coordinate;
use serde::{Deserialize, Serialize};

/// Axis-aligned 2-D envelope. An envelope with `min_x > max_x` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            max_x: x1.max(x2),
            min_y: y1.min(y2),
            max_y: y1.max(y2),
        }
    }

    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn from_points(a: &Coordinate, b: &Coordinate) -> Self {
        Self::new(a.x, b.x, a.y, b.y)
    }

    pub fn from_coordinates(pts: &[Coordinate]) -> Self {
        let mut env = Self::empty();
        for p in pts {
            env.expand_to_include(p);
        }
        env
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    pub fn expand_to_include(&mut self, p: &Coordinate) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn expand_to_include_env(&mut self, other: &Envelope) {
        if other.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn expand_by(&mut self, distance: f64) {
        if self.is_empty() {
            return;
        }
        self.min_x -= distance;
        self.min_y -= distance;
        self.max_x += distance;
        self.max_y += distance;
    }

    pub fn intersection(&self, other: &Envelope) -> Envelope {
        if self.is_empty() || other.is_empty() || !self.intersects(other) {
            return Envelope::empty();
        }
        Envelope {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        !(other.min_x > self.max_x
            || other.max_x < self.min_x
            || other.min_y > self.max_y
            || other.max_y < self.min_y)
    }

    pub fn disjoint(&self, other: &Envelope) -> bool {
        !self.intersects(other)
    }

    pub fn intersects_point(&self, p: &Coordinate) -> bool {
        !self.is_empty()
            && p.x >= self.min_x
            && p.x <= self.max_x
            && p.y >= self.min_y
            && p.y <= self.max_y
    }

    /// True if the envelope of segment `a`-`b` intersects this envelope.
    pub fn intersects_segment(&self, a: &Coordinate, b: &Coordinate) -> bool {
        self.intersects(&Envelope::from_points(a, b))
    }

    pub fn covers(&self, other: &Envelope) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Largest absolute ordinate value of the envelope bounds.
    pub fn max_abs_bound(&self) -> f64 {
        self.min_x
            .abs()
            .max(self.max_x.abs())
            .max(self.min_y.abs())
            .max(self.max_y.abs())
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::empty()
    }
}

/// True if envelopes of segments `p1`-`p2` and `q1`-`q2` intersect.
pub fn segments_envelopes_intersect(
    p1: &Coordinate,
    p2: &Coordinate,
    q1: &Coordinate,
    q2: &Coordinate,
) -> bool {
    let min_q = q1.x.min(q2.x);
    let max_q = q1.x.max(q2.x);
    let min_p = p1.x.min(p2.x);
    let max_p = p1.x.max(p2.x);
    if min_p > max_q || max_p < min_q {
        return false;
    }
    let min_q = q1.y.min(q2.y);
    let max_q = q1.y.max(q2.y);
    let min_p = p1.y.min(p2.y);
    let max_p = p1.y.max(p2.y);
    !(min_p > max_q || max_p < min_q)
}

/// True if `q` lies in the envelope of segment `p1`-`p2`.
pub fn segment_envelope_contains(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> bool {
    q.x >= p1.x.min(p2.x) && q.x <= p1.x.max(p2.x) && q.y >= p1.y.min(p2.y) && q.y <= p1.y.max(p2.y)
}
