// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Point location against rings, polygons and lines

use super::robust_predicates::orientation_index;
use super::{Coordinate, Geometry, Polygon};
use serde::{Deserialize, Serialize};

/// Topological location of a point relative to a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Interior,
    Boundary,
    Exterior,
}

impl Location {
    pub fn symbol(&self) -> char {
        match self {
            Location::Interior => 'i',
            Location::Boundary => 'b',
            Location::Exterior => 'e',
        }
    }
}

/// Counts crossings of a horizontal ray from `p` towards +x.
/// Segments can be fed in any order as long as every ring is closed.
#[derive(Debug, Clone)]
pub struct RayCrossingCounter {
    p: Coordinate,
    crossings: usize,
    on_segment: bool,
}

impl RayCrossingCounter {
    pub fn new(p: Coordinate) -> Self {
        Self {
            p,
            crossings: 0,
            on_segment: false,
        }
    }

    pub fn count_segment(&mut self, p1: &Coordinate, p2: &Coordinate) {
        let p = &self.p;
        // segment strictly left of the test point
        if p1.x < p.x && p2.x < p.x {
            return;
        }
        if p.equals_2d(p2) {
            self.on_segment = true;
            return;
        }
        if p1.y == p.y && p2.y == p.y {
            let min_x = p1.x.min(p2.x);
            let max_x = p1.x.max(p2.x);
            if p.x >= min_x && p.x <= max_x {
                self.on_segment = true;
            }
            return;
        }
        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut orient = orientation_index(p1, p2, p);
            if orient == 0 {
                self.on_segment = true;
                return;
            }
            if p2.y < p1.y {
                orient = -orient;
            }
            if orient > 0 {
                self.crossings += 1;
            }
        }
    }

    pub fn count_ring(&mut self, ring: &[Coordinate]) {
        for w in ring.windows(2) {
            self.count_segment(&w[0], &w[1]);
            if self.on_segment {
                return;
            }
        }
    }

    pub fn is_on_segment(&self) -> bool {
        self.on_segment
    }

    pub fn location(&self) -> Location {
        if self.on_segment {
            Location::Boundary
        } else if self.crossings % 2 == 1 {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}

/// Location of `p` relative to a closed ring.
pub fn locate_in_ring(p: &Coordinate, ring: &[Coordinate]) -> Location {
    let mut counter = RayCrossingCounter::new(*p);
    counter.count_ring(ring);
    counter.location()
}

/// Location of `p` relative to a polygon with holes.
pub fn locate_in_polygon(p: &Coordinate, poly: &Polygon) -> Location {
    if poly.is_empty() {
        return Location::Exterior;
    }
    match locate_in_ring(p, &poly.shell) {
        Location::Exterior => return Location::Exterior,
        Location::Boundary => return Location::Boundary,
        Location::Interior => {}
    }
    for hole in &poly.holes {
        match locate_in_ring(p, hole) {
            Location::Interior => return Location::Exterior,
            Location::Boundary => return Location::Boundary,
            Location::Exterior => {}
        }
    }
    Location::Interior
}

/// Location of `p` relative to the polygonal components of a geometry.
pub fn locate_in_area(p: &Coordinate, geom: &Geometry) -> Location {
    let mut result = Location::Exterior;
    for poly in geom.polygons() {
        match locate_in_polygon(p, poly) {
            Location::Interior => return Location::Interior,
            Location::Boundary => result = Location::Boundary,
            Location::Exterior => {}
        }
    }
    result
}

/// True if `p` lies on some segment of the line.
pub fn is_on_line(p: &Coordinate, line: &[Coordinate]) -> bool {
    if line.len() == 1 {
        return p.equals_2d(&line[0]);
    }
    line.windows(2).any(|w| {
        let (a, b) = (&w[0], &w[1]);
        p.x >= a.x.min(b.x)
            && p.x <= a.x.max(b.x)
            && p.y >= a.y.min(b.y)
            && p.y <= a.y.max(b.y)
            && orientation_index(a, b, p) == 0
    })
}

/// Location of `p` relative to the linear components of a geometry, using
/// the mod-2 boundary rule for line endpoints.
pub fn locate_on_lines(p: &Coordinate, geom: &Geometry) -> Location {
    let lines = geom.line_strings();
    let mut endpoint_count = 0;
    let mut on_line = false;
    for line in &lines {
        if !is_on_line(p, line) {
            continue;
        }
        on_line = true;
        let closed = line.len() > 1 && line[0].equals_2d(&line[line.len() - 1]);
        if !closed {
            if p.equals_2d(&line[0]) {
                endpoint_count += 1;
            }
            if p.equals_2d(&line[line.len() - 1]) {
                endpoint_count += 1;
            }
        }
    }
    if !on_line {
        Location::Exterior
    } else if endpoint_count % 2 == 1 {
        Location::Boundary
    } else {
        Location::Interior
    }
}
