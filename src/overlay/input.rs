// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! The two operands of an overlay, with point location against their areas

use crate::geometry::{locate_in_area, Coordinate, Dimension, Geometry, Location};

/// Operands of an overlay. The second operand is absent for unary
/// operations such as precision reduction.
#[derive(Debug, Clone, Copy)]
pub struct InputGeometry<'a> {
    geoms: [Option<&'a Geometry>; 2],
}

impl<'a> InputGeometry<'a> {
    pub fn new(a: &'a Geometry, b: Option<&'a Geometry>) -> Self {
        Self { geoms: [Some(a), b] }
    }

    pub fn geometry(&self, index: usize) -> Option<&'a Geometry> {
        self.geoms[index]
    }

    pub fn is_single(&self) -> bool {
        self.geoms[1].is_none()
    }

    pub fn dimension(&self, index: usize) -> Dimension {
        match self.geoms[index] {
            Some(g) if !g.is_empty() => g.dimension(),
            _ => Dimension::False,
        }
    }

    pub fn is_area(&self, index: usize) -> bool {
        self.dimension(index) == Dimension::Area
    }

    pub fn is_line(&self, index: usize) -> bool {
        self.dimension(index) == Dimension::Line
    }

    pub fn is_empty(&self, index: usize) -> bool {
        self.geoms[index].map_or(true, |g| g.is_empty())
    }

    pub fn is_all_points(&self) -> bool {
        self.dimension(0) == Dimension::Point && self.dimension(1) == Dimension::Point
    }

    pub fn has_points(&self) -> bool {
        self.dimension(0) == Dimension::Point || self.dimension(1) == Dimension::Point
    }

    /// Index of an area operand, preferring the first.
    pub fn area_index(&self) -> Option<usize> {
        (0..2).find(|&i| self.is_area(i))
    }

    /// Location of a point relative to an areal operand; points are always
    /// exterior to non-areal operands.
    pub fn locate_point_in_area(&self, index: usize, pt: &Coordinate) -> Location {
        match self.geoms[index] {
            Some(g) if self.is_area(index) => locate_in_area(pt, g),
            _ => Location::Exterior,
        }
    }
}
