// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Point results: intersection nodes, point/point overlay and point vs
//! line/area overlay.

use super::graph::{EdgeId, OverlayGraph};
use super::label::OverlayLabel;
use super::{result_dimension, Overlay, OverlayOp, OverlayOptions};
use crate::error::Result;
use crate::geometry::{
    build_geometry, locate_in_area, locate_on_lines, CoordKey, Coordinate, Dimension, Geometry,
    Location, PrecisionModel,
};
use ahash::AHashSet;

/// Nodes where edges of both operands meet without any result edge: the
/// isolated intersection points of an intersection.
pub fn intersection_points(graph: &OverlayGraph, strict: bool) -> Vec<Coordinate> {
    graph
        .node_edges()
        .iter()
        .copied()
        .filter(|&node| is_result_point(graph, node, strict))
        .map(|node| graph.orig(node))
        .collect()
}

fn is_result_point(graph: &OverlayGraph, node: EdgeId, strict: bool) -> bool {
    let mut of_a = false;
    let mut of_b = false;
    for e in graph.node_star(node) {
        if graph.is_in_result(e) {
            return false;
        }
        let label = graph.label(e);
        of_a |= is_edge_of(label, 0, strict);
        of_b |= is_edge_of(label, 1, strict);
    }
    of_a && of_b
}

fn is_edge_of(label: &OverlayLabel, index: usize, strict: bool) -> bool {
    if strict && label.is_boundary_collapse() {
        return false;
    }
    label.is_boundary(index) || label.is_line(index)
}

/// Rounded, deduplicated point coordinates in input order.
fn rounded_points(geom: &Geometry, pm: &PrecisionModel) -> Vec<Coordinate> {
    let mut seen = AHashSet::new();
    geom.points()
        .iter()
        .map(|p| pm.make_precise(p))
        .filter(|p| seen.insert(p.key()))
        .collect()
}

fn point_result(points: Vec<Coordinate>) -> Geometry {
    match points.len() {
        0 => Geometry::empty(Dimension::Point),
        1 => Geometry::Point(points.first().copied()),
        _ => Geometry::MultiPoint(points),
    }
}

/// Overlay of two puntal operands on rounded coordinates.
pub fn overlay_points(op: OverlayOp, a: &Geometry, b: &Geometry, pm: &PrecisionModel) -> Geometry {
    let pts_a = rounded_points(a, pm);
    let pts_b = rounded_points(b, pm);
    let keys_a: AHashSet<CoordKey> = pts_a.iter().map(|p| p.key()).collect();
    let keys_b: AHashSet<CoordKey> = pts_b.iter().map(|p| p.key()).collect();
    let only = |pts: &[Coordinate], other: &AHashSet<CoordKey>| -> Vec<Coordinate> {
        pts.iter().filter(|p| !other.contains(&p.key())).copied().collect()
    };
    let result = match op {
        OverlayOp::Intersection => pts_a
            .iter()
            .filter(|p| keys_b.contains(&p.key()))
            .copied()
            .collect(),
        OverlayOp::Union => {
            let mut out = pts_a.clone();
            out.extend(only(&pts_b, &keys_a));
            out
        }
        OverlayOp::Difference => only(&pts_a, &keys_b),
        OverlayOp::SymDifference => {
            let mut out = only(&pts_a, &keys_b);
            out.extend(only(&pts_b, &keys_a));
            out
        }
    };
    point_result(result)
}

/// Overlay of a puntal operand with a linear or areal one.
pub fn overlay_mixed_points(
    op: OverlayOp,
    a: &Geometry,
    b: &Geometry,
    pm: &PrecisionModel,
    options: &OverlayOptions,
) -> Result<Geometry> {
    let is_point_rhs = a.dimension() != Dimension::Point;
    let (points, non_point) = if is_point_rhs { (b, a) } else { (a, b) };
    let result_dim = result_dimension(op, a.dimension(), b.dimension());

    // the non-point operand is only noded when it appears in the output
    let prepared = if result_dim == Dimension::Point {
        non_point.clone()
    } else {
        let mut unary_options = options.clone();
        unary_options.precision = Some(*pm);
        Overlay::unary(non_point, unary_options).execute()?
    };
    let non_point_dim = prepared.dimension();
    let locate = |p: &Coordinate| -> Location {
        if non_point_dim == Dimension::Area {
            locate_in_area(p, &prepared)
        } else {
            locate_on_lines(p, &prepared)
        }
    };
    let coords = rounded_points(points, pm);
    let covered: Vec<Coordinate> = coords
        .iter()
        .filter(|p| locate(p) != Location::Exterior)
        .copied()
        .collect();
    let uncovered: Vec<Coordinate> = coords
        .iter()
        .filter(|p| locate(p) == Location::Exterior)
        .copied()
        .collect();

    Ok(match op {
        OverlayOp::Intersection => point_result(covered),
        OverlayOp::Union | OverlayOp::SymDifference => {
            let mut parts = split_components(&prepared);
            parts.extend(uncovered.into_iter().map(|p| Geometry::Point(Some(p))));
            build_geometry(parts)
        }
        OverlayOp::Difference if is_point_rhs => non_point.clone(),
        OverlayOp::Difference => point_result(uncovered),
    })
}

/// Polygons, then lines, then points of a geometry as separate parts.
fn split_components(geom: &Geometry) -> Vec<Geometry> {
    let mut parts: Vec<Geometry> = geom
        .polygons()
        .into_iter()
        .map(|p| Geometry::Polygon(p.clone()))
        .collect();
    parts.extend(geom.line_strings().into_iter().map(|l| Geometry::LineString(l.clone())));
    parts.extend(geom.points().into_iter().map(|p| Geometry::Point(Some(p))));
    parts
}
