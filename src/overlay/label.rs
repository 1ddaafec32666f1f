// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topological labels for overlay edges.
//!
//! A label records, for each operand, how the edge relates to that operand:
//! not part of it, part of a line, part of an area boundary, or part of a
//! collapsed area boundary. Boundary labels carry left and right locations in
//! the direction of the underlying edge; all labels carry a line location
//! which is filled in during labelling.

use crate::geometry::Location;
use std::fmt;

/// Role of an edge with respect to one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelDim {
    NotPart,
    Line,
    Boundary,
    /// Area boundary whose edges cancelled out, leaving zero area
    Collapse,
}

impl LabelDim {
    fn symbol(&self) -> char {
        match self {
            LabelDim::NotPart => '#',
            LabelDim::Line => 'L',
            LabelDim::Boundary => 'B',
            LabelDim::Collapse => 'C',
        }
    }
}

/// Side of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Left,
    Right,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OperandLabel {
    dim: LabelDim,
    is_hole: bool,
    loc_left: Option<Location>,
    loc_right: Option<Location>,
    loc_line: Option<Location>,
}

impl OperandLabel {
    const NOT_PART: OperandLabel = OperandLabel {
        dim: LabelDim::NotPart,
        is_hole: false,
        loc_left: None,
        loc_right: None,
        loc_line: None,
    };
}

/// Per-operand topology of an overlay edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLabel {
    parts: [OperandLabel; 2],
}

impl Default for OverlayLabel {
    fn default() -> Self {
        Self {
            parts: [OperandLabel::NOT_PART; 2],
        }
    }
}

impl OverlayLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(&self, index: usize) -> LabelDim {
        self.parts[index].dim
    }

    pub fn init_boundary(&mut self, index: usize, loc_left: Location, loc_right: Location, is_hole: bool) {
        self.parts[index] = OperandLabel {
            dim: LabelDim::Boundary,
            is_hole,
            loc_left: Some(loc_left),
            loc_right: Some(loc_right),
            loc_line: Some(Location::Interior),
        };
    }

    pub fn init_collapse(&mut self, index: usize, is_hole: bool) {
        let part = &mut self.parts[index];
        part.dim = LabelDim::Collapse;
        part.is_hole = is_hole;
    }

    pub fn init_line(&mut self, index: usize) {
        let part = &mut self.parts[index];
        part.dim = LabelDim::Line;
        part.loc_line = None;
    }

    pub fn init_not_part(&mut self, index: usize) {
        self.parts[index].dim = LabelDim::NotPart;
    }

    pub fn set_location_line(&mut self, index: usize, loc: Location) {
        self.parts[index].loc_line = Some(loc);
    }

    pub fn set_location_all(&mut self, index: usize, loc: Location) {
        let part = &mut self.parts[index];
        part.loc_line = Some(loc);
        part.loc_left = Some(loc);
        part.loc_right = Some(loc);
    }

    /// A collapsed hole lies in the interior of its polygon, a collapsed
    /// shell in the exterior.
    pub fn set_location_collapse(&mut self, index: usize) {
        let loc = if self.is_hole(index) {
            Location::Interior
        } else {
            Location::Exterior
        };
        self.parts[index].loc_line = Some(loc);
    }

    pub fn is_line_any(&self) -> bool {
        self.is_line(0) || self.is_line(1)
    }

    pub fn is_line(&self, index: usize) -> bool {
        self.parts[index].dim == LabelDim::Line
    }

    pub fn is_linear(&self, index: usize) -> bool {
        matches!(self.parts[index].dim, LabelDim::Line | LabelDim::Collapse)
    }

    pub fn is_known(&self, index: usize) -> bool {
        self.parts[index].dim != LabelDim::NotPart
    }

    pub fn is_not_part(&self, index: usize) -> bool {
        self.parts[index].dim == LabelDim::NotPart
    }

    pub fn is_boundary(&self, index: usize) -> bool {
        self.parts[index].dim == LabelDim::Boundary
    }

    pub fn is_boundary_either(&self) -> bool {
        self.is_boundary(0) || self.is_boundary(1)
    }

    pub fn is_boundary_both(&self) -> bool {
        self.is_boundary(0) && self.is_boundary(1)
    }

    /// A boundary of one operand which is a collapse of the other.
    pub fn is_boundary_collapse(&self) -> bool {
        if self.is_line_any() {
            return false;
        }
        !self.is_boundary_both()
    }

    /// Boundaries of both operands, with different interiors on the right:
    /// the areas only touch along this edge.
    pub fn is_boundary_touch(&self) -> bool {
        self.is_boundary_both()
            && self.location(0, Position::Right, true) != self.location(1, Position::Right, true)
    }

    /// Boundary of exactly one operand and not part of the other.
    pub fn is_boundary_singleton(&self) -> bool {
        (self.is_boundary(0) && self.is_not_part(1)) || (self.is_boundary(1) && self.is_not_part(0))
    }

    pub fn is_line_location_unknown(&self, index: usize) -> bool {
        self.parts[index].loc_line.is_none()
    }

    pub fn is_line_in_area(&self, index: usize) -> bool {
        self.parts[index].loc_line == Some(Location::Interior)
    }

    pub fn is_hole(&self, index: usize) -> bool {
        self.parts[index].is_hole
    }

    pub fn is_collapse(&self, index: usize) -> bool {
        self.parts[index].dim == LabelDim::Collapse
    }

    pub fn is_interior_collapse(&self) -> bool {
        (0..2).any(|i| self.is_collapse(i) && self.parts[i].loc_line == Some(Location::Interior))
    }

    /// A collapse of one operand lying in the interior of the other, which
    /// has no edge here.
    pub fn is_collapse_and_not_part_interior(&self) -> bool {
        (self.is_collapse(0) && self.is_not_part(1) && self.is_line_in_area(1))
            || (self.is_collapse(1) && self.is_not_part(0) && self.is_line_in_area(0))
    }

    pub fn line_location(&self, index: usize) -> Option<Location> {
        self.parts[index].loc_line
    }

    /// Location on a side, relative to a half-edge direction.
    pub fn location(&self, index: usize, position: Position, is_forward: bool) -> Option<Location> {
        let part = &self.parts[index];
        match (position, is_forward) {
            (Position::Left, true) | (Position::Right, false) => part.loc_left,
            (Position::Right, true) | (Position::Left, false) => part.loc_right,
            (Position::On, _) => part.loc_line,
        }
    }

    /// Side location for boundaries, line location otherwise.
    pub fn location_boundary_or_line(&self, index: usize, position: Position, is_forward: bool) -> Option<Location> {
        if self.is_boundary(index) {
            self.location(index, position, is_forward)
        } else {
            self.line_location(index)
        }
    }

    pub fn has_sides(&self, index: usize) -> bool {
        let part = &self.parts[index];
        part.loc_left.is_some() || part.loc_right.is_some()
    }

    /// Compact description, e.g. `A:ieB/B:e#`.
    pub fn describe(&self, is_forward: bool) -> String {
        format!(
            "A:{}/B:{}",
            self.describe_part(0, is_forward),
            self.describe_part(1, is_forward)
        )
    }

    fn describe_part(&self, index: usize, is_forward: bool) -> String {
        let sym = |loc: Option<Location>| loc.map(|l| l.symbol()).unwrap_or('-');
        let mut s = String::new();
        if self.is_boundary(index) {
            s.push(sym(self.location(index, Position::Left, is_forward)));
            s.push(sym(self.location(index, Position::Right, is_forward)));
        } else {
            s.push(sym(self.line_location(index)));
        }
        s.push(self.parts[index].dim.symbol());
        if self.is_collapse(index) {
            s.push(if self.is_hole(index) { 'h' } else { 's' });
        }
        s
    }
}

impl fmt::Display for OverlayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe(true))
    }
}
