// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry value model: a closed set of planar geometry kinds

use super::robust_predicates::{is_ccw, signed_area};
use super::{Coordinate, Envelope};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Topological dimension of a geometry or of an overlay result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Empty / undefined
    False,
    Point,
    Line,
    Area,
}

impl Dimension {
    pub fn as_i32(&self) -> i32 {
        match self {
            Dimension::False => -1,
            Dimension::Point => 0,
            Dimension::Line => 1,
            Dimension::Area => 2,
        }
    }
}

/// A polygon with one shell and zero or more holes.
/// Rings are closed coordinate sequences. An empty shell means an empty polygon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub shell: Vec<Coordinate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Coordinate>>,
}

impl Polygon {
    pub fn new(shell: Vec<Coordinate>, holes: Vec<Vec<Coordinate>>) -> Self {
        Self { shell, holes }
    }

    pub fn is_empty(&self) -> bool {
        self.shell.is_empty()
    }

    pub fn rings(&self) -> impl Iterator<Item = &Vec<Coordinate>> {
        std::iter::once(&self.shell).chain(self.holes.iter())
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let holes: f64 = self.holes.iter().map(|h| signed_area(h).abs()).sum();
        signed_area(&self.shell).abs() - holes
    }

    pub fn perimeter(&self) -> f64 {
        self.rings().map(|r| line_length(r)).sum()
    }

    /// Shell clockwise, holes counter-clockwise, each ring starting at its
    /// lowest coordinate, holes sorted.
    fn normalized(&self) -> Polygon {
        if self.is_empty() {
            return Polygon::default();
        }
        let shell = normalize_ring(&self.shell, false);
        let mut holes: Vec<Vec<Coordinate>> =
            self.holes.iter().map(|h| normalize_ring(h, true)).collect();
        holes.sort_by(|a, b| compare_coords(a, b));
        Polygon { shell, holes }
    }
}

/// Planar geometry value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Option<Coordinate>),
    LineString(Vec<Coordinate>),
    Polygon(Polygon),
    MultiPoint(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Polygon>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Some(Coordinate::new(x, y)))
    }

    /// Typed empty geometry for a dimension; `False` yields an empty collection.
    pub fn empty(dim: Dimension) -> Self {
        match dim {
            Dimension::Point => Geometry::Point(None),
            Dimension::Line => Geometry::LineString(Vec::new()),
            Dimension::Area => Geometry::Polygon(Polygon::default()),
            Dimension::False => Geometry::GeometryCollection(Vec::new()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(p) => p.is_none(),
            Geometry::LineString(pts) => pts.is_empty(),
            Geometry::Polygon(poly) => poly.is_empty(),
            Geometry::MultiPoint(pts) => pts.is_empty(),
            Geometry::MultiLineString(lines) => lines.iter().all(|l| l.is_empty()),
            Geometry::MultiPolygon(polys) => polys.iter().all(|p| p.is_empty()),
            Geometry::GeometryCollection(geoms) => geoms.iter().all(|g| g.is_empty()),
        }
    }

    /// Inherent dimension of the geometry kind. Collections report the
    /// largest dimension among their non-empty members.
    pub fn dimension(&self) -> Dimension {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Dimension::Point,
            Geometry::LineString(_) | Geometry::MultiLineString(_) => Dimension::Line,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Dimension::Area,
            Geometry::GeometryCollection(geoms) => geoms
                .iter()
                .filter(|g| !g.is_empty())
                .map(|g| g.dimension())
                .max()
                .unwrap_or(Dimension::False),
        }
    }

    /// True if all non-empty components share one dimension.
    pub fn is_homogeneous(&self) -> bool {
        let mut dims = Vec::new();
        self.visit_components(&mut |g| {
            if !g.is_empty() {
                dims.push(g.dimension());
            }
        });
        dims.windows(2).all(|w| w[0] == w[1])
    }

    pub fn has_z(&self) -> bool {
        self.coordinates().iter().any(|c| c.has_z())
    }

    /// All coordinates in storage order.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut out = Vec::new();
        self.for_each_coordinate(&mut |c| out.push(*c));
        out
    }

    pub fn num_points(&self) -> usize {
        let mut n = 0;
        self.for_each_coordinate(&mut |_| n += 1);
        n
    }

    pub fn for_each_coordinate<F: FnMut(&Coordinate)>(&self, f: &mut F) {
        match self {
            Geometry::Point(p) => {
                if let Some(c) = p {
                    f(c)
                }
            }
            Geometry::LineString(pts) | Geometry::MultiPoint(pts) => pts.iter().for_each(|c| f(c)),
            Geometry::Polygon(poly) => poly.rings().flatten().for_each(|c| f(c)),
            Geometry::MultiLineString(lines) => lines.iter().flatten().for_each(|c| f(c)),
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|p| p.rings())
                .flatten()
                .for_each(|c| f(c)),
            Geometry::GeometryCollection(geoms) => {
                geoms.iter().for_each(|g| g.for_each_coordinate(f))
            }
        }
    }

    /// Copy with every coordinate transformed by `f`. Structure is unchanged.
    pub fn map_coordinates<F: Fn(&Coordinate) -> Coordinate>(&self, f: &F) -> Geometry {
        let seq = |pts: &Vec<Coordinate>| pts.iter().map(f).collect::<Vec<_>>();
        let poly = |p: &Polygon| Polygon {
            shell: seq(&p.shell),
            holes: p.holes.iter().map(seq).collect(),
        };
        match self {
            Geometry::Point(p) => Geometry::Point(p.as_ref().map(f)),
            Geometry::LineString(pts) => Geometry::LineString(seq(pts)),
            Geometry::Polygon(p) => Geometry::Polygon(poly(p)),
            Geometry::MultiPoint(pts) => Geometry::MultiPoint(seq(pts)),
            Geometry::MultiLineString(lines) => {
                Geometry::MultiLineString(lines.iter().map(seq).collect())
            }
            Geometry::MultiPolygon(polys) => Geometry::MultiPolygon(polys.iter().map(poly).collect()),
            Geometry::GeometryCollection(geoms) => {
                Geometry::GeometryCollection(geoms.iter().map(|g| g.map_coordinates(f)).collect())
            }
        }
    }

    pub fn envelope(&self) -> Envelope {
        let mut env = Envelope::empty();
        self.for_each_coordinate(&mut |c| env.expand_to_include(c));
        env
    }

    pub fn area(&self) -> f64 {
        self.polygons().iter().map(|p| p.area()).sum()
    }

    /// Length of linear components plus perimeter of polygonal components.
    pub fn length(&self) -> f64 {
        let lines: f64 = self.line_strings().iter().map(|l| line_length(l)).sum();
        let rings: f64 = self.polygons().iter().map(|p| p.perimeter()).sum();
        lines + rings
    }

    fn visit_components<F: FnMut(&Geometry)>(&self, f: &mut F) {
        match self {
            Geometry::GeometryCollection(geoms) => {
                geoms.iter().for_each(|g| g.visit_components(f))
            }
            g => f(g),
        }
    }

    /// Non-empty polygons, flattened through multi-geometries and collections.
    pub fn polygons(&self) -> Vec<&Polygon> {
        let mut out = Vec::new();
        collect_polygons(self, &mut out);
        out
    }

    /// Non-empty line strings, flattened.
    pub fn line_strings(&self) -> Vec<&Vec<Coordinate>> {
        let mut out = Vec::new();
        collect_lines(self, &mut out);
        out
    }

    /// Point coordinates, flattened.
    pub fn points(&self) -> Vec<Coordinate> {
        let mut out = Vec::new();
        collect_points(self, &mut out);
        out
    }

    /// Canonical form for comparison: rings oriented and rotated to start at
    /// their lowest coordinate, lines directed from their lower end,
    /// components sorted.
    pub fn normalized(&self) -> Geometry {
        match self {
            Geometry::Point(p) => Geometry::Point(*p),
            Geometry::LineString(pts) => Geometry::LineString(normalize_line(pts)),
            Geometry::Polygon(p) => Geometry::Polygon(p.normalized()),
            Geometry::MultiPoint(pts) => {
                let mut pts = pts.clone();
                pts.sort_by(|a, b| a.compare_2d(b));
                Geometry::MultiPoint(pts)
            }
            Geometry::MultiLineString(lines) => {
                let mut lines: Vec<_> = lines.iter().map(|l| normalize_line(l)).collect();
                lines.sort_by(|a, b| compare_coords(a, b));
                Geometry::MultiLineString(lines)
            }
            Geometry::MultiPolygon(polys) => {
                let mut polys: Vec<_> = polys.iter().map(|p| p.normalized()).collect();
                polys.sort_by(|a, b| compare_coords(&a.shell, &b.shell));
                Geometry::MultiPolygon(polys)
            }
            Geometry::GeometryCollection(geoms) => {
                let mut geoms: Vec<_> = geoms.iter().map(|g| g.normalized()).collect();
                geoms.sort_by(|a, b| {
                    a.dimension()
                        .cmp(&b.dimension())
                        .then_with(|| compare_coords(&a.coordinates(), &b.coordinates()))
                });
                Geometry::GeometryCollection(geoms)
            }
        }
    }

    /// Structural equality of the normalized forms (2-D, Z ignored).
    pub fn equals_normalized(&self, other: &Geometry) -> bool {
        if self.is_empty() && other.is_empty() {
            return self.dimension() == other.dimension();
        }
        self.normalized() == other.normalized()
    }
}

fn collect_polygons<'a>(g: &'a Geometry, out: &mut Vec<&'a Polygon>) {
    match g {
        Geometry::Polygon(p) if !p.is_empty() => out.push(p),
        Geometry::MultiPolygon(ps) => out.extend(ps.iter().filter(|p| !p.is_empty())),
        Geometry::GeometryCollection(gs) => gs.iter().for_each(|g| collect_polygons(g, out)),
        _ => {}
    }
}

fn collect_lines<'a>(g: &'a Geometry, out: &mut Vec<&'a Vec<Coordinate>>) {
    match g {
        Geometry::LineString(l) if !l.is_empty() => out.push(l),
        Geometry::MultiLineString(ls) => out.extend(ls.iter().filter(|l| !l.is_empty())),
        Geometry::GeometryCollection(gs) => gs.iter().for_each(|g| collect_lines(g, out)),
        _ => {}
    }
}

fn collect_points(g: &Geometry, out: &mut Vec<Coordinate>) {
    match g {
        Geometry::Point(Some(c)) => out.push(*c),
        Geometry::MultiPoint(pts) => out.extend(pts.iter().copied()),
        Geometry::GeometryCollection(gs) => gs.iter().for_each(|g| collect_points(g, out)),
        _ => {}
    }
}

/// Builds the most specific geometry for a list of parts: nothing gives an
/// empty collection, one part is returned as-is, homogeneous parts become the
/// matching multi-geometry, mixed parts a collection.
pub fn build_geometry(parts: Vec<Geometry>) -> Geometry {
    let parts: Vec<Geometry> = parts.into_iter().filter(|g| !g.is_empty()).collect();
    match parts.len() {
        0 => Geometry::GeometryCollection(Vec::new()),
        1 => parts.into_iter().next().unwrap_or(Geometry::GeometryCollection(Vec::new())),
        _ => {
            if parts.iter().all(|g| matches!(g, Geometry::Polygon(_))) {
                Geometry::MultiPolygon(
                    parts
                        .into_iter()
                        .filter_map(|g| match g {
                            Geometry::Polygon(p) => Some(p),
                            _ => None,
                        })
                        .collect(),
                )
            } else if parts.iter().all(|g| matches!(g, Geometry::LineString(_))) {
                Geometry::MultiLineString(
                    parts
                        .into_iter()
                        .filter_map(|g| match g {
                            Geometry::LineString(l) => Some(l),
                            _ => None,
                        })
                        .collect(),
                )
            } else if parts.iter().all(|g| matches!(g, Geometry::Point(_))) {
                Geometry::MultiPoint(
                    parts
                        .into_iter()
                        .filter_map(|g| match g {
                            Geometry::Point(p) => p,
                            _ => None,
                        })
                        .collect(),
                )
            } else {
                Geometry::GeometryCollection(parts)
            }
        }
    }
}

pub fn line_length(pts: &[Coordinate]) -> f64 {
    pts.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Lexicographic comparison of coordinate sequences.
pub fn compare_coords(a: &[Coordinate], b: &[Coordinate]) -> Ordering {
    for (p, q) in a.iter().zip(b.iter()) {
        let c = p.compare_2d(q);
        if c != Ordering::Equal {
            return c;
        }
    }
    a.len().cmp(&b.len())
}

fn normalize_line(pts: &[Coordinate]) -> Vec<Coordinate> {
    let reversed: Vec<Coordinate> = pts.iter().rev().copied().collect();
    if compare_coords(&reversed, pts) == Ordering::Less {
        reversed
    } else {
        pts.to_vec()
    }
}

fn normalize_ring(ring: &[Coordinate], ccw: bool) -> Vec<Coordinate> {
    if ring.len() < 4 {
        return ring.to_vec();
    }
    let mut pts: Vec<Coordinate> = ring[..ring.len() - 1].to_vec();
    let min_idx = pts
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.compare_2d(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    pts.rotate_left(min_idx);
    pts.push(pts[0]);
    if is_ccw(&pts) != ccw {
        pts.reverse();
    }
    pts
}
