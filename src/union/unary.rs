// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Unary union of all components of a geometry.
//!
//! Polygons are noded together in a single pass. Every merged edge records,
//! per input polygon, on which side that polygon's interior lies; polygons
//! not bounding the edge either cover it entirely or not at all, which is
//! found with a ray crossing test against the noded arrangement. An edge
//! belongs to the union boundary when exactly one of its sides is covered.

use crate::error::{OverlayError, Result};
use crate::geometry::{
    build_geometry, locate_in_area, locate_on_lines, remove_repeated, Coordinate, Dimension,
    Envelope, Geometry, Location, Polygon, PrecisionModel, RayCrossingCounter,
};
use crate::noding::{default_noder, EdgeSource, Noder, SegmentIndex, SegmentString};
use crate::overlay::{
    depth_delta, edge_key, overlay_points, overlay_with, robust_precision_model, Edge, Overlay,
    OverlayGraph, OverlayLabel, OverlayOp, OverlayOptions, PolygonBuilder, Position,
};
use ahash::{AHashMap, AHashSet};
use tracing::{debug, instrument};

/// A merged noded edge with the net depth change of each polygon bounding
/// it, relative to the stored direction.
#[derive(Debug)]
struct CoverEdge {
    pts: Vec<Coordinate>,
    deltas: Vec<(usize, i32)>,
}

impl CoverEdge {
    fn add_delta(&mut self, polygon: usize, delta: i32) {
        match self.deltas.iter_mut().find(|(p, _)| *p == polygon) {
            Some((_, d)) => *d += delta,
            None => self.deltas.push((polygon, delta)),
        }
    }

    fn bounding_polygons(&self) -> AHashSet<usize> {
        self.deltas.iter().map(|&(p, _)| p).collect()
    }

    /// Polygons with interior on the right and on the left.
    fn side_counts(&self) -> (usize, usize) {
        let right = self.deltas.iter().filter(|&&(_, d)| d > 0).count();
        let left = self.deltas.iter().filter(|&&(_, d)| d < 0).count();
        (right, left)
    }
}

/// Union of every component of `geom`. Without an explicit precision model
/// the robust scale of the input is used.
#[instrument(skip(geom), fields(kind = geom.type_name()))]
pub fn unary_union(geom: &Geometry, pm: Option<PrecisionModel>) -> Result<Geometry> {
    if geom.is_empty() {
        return Ok(Geometry::empty(geom.dimension()));
    }
    let pm = match pm {
        Some(pm) => {
            pm.validate()?;
            pm
        }
        None => robust_precision_model(geom, None)?,
    };
    let options = OverlayOptions::with_precision(pm);

    let polygons = geom.polygons();
    let lines = geom.line_strings();
    let points = geom.points();
    debug!(
        polygons = polygons.len(),
        lines = lines.len(),
        points = points.len(),
        "unary union input"
    );

    let area = if polygons.is_empty() {
        None
    } else {
        let noder = default_noder(&pm)?;
        Some(polygonal(union_polygons(&polygons, noder.as_ref(), true)?))
    };
    let linear = if lines.is_empty() {
        None
    } else {
        let multi = Geometry::MultiLineString(lines.into_iter().cloned().collect());
        Some(Overlay::unary(&multi, options.clone()).execute()?)
    };
    let puntal = if points.is_empty() {
        None
    } else {
        Some(overlay_points(
            OverlayOp::Union,
            &Geometry::MultiPoint(points),
            &Geometry::empty(Dimension::Point),
            &pm,
        ))
    };

    let non_point = match (area, linear) {
        (Some(a), Some(l)) => Some(overlay_with(&a, &l, OverlayOp::Union, options.clone())?),
        (a, l) => a.or(l),
    };
    Ok(match (non_point, puntal) {
        (Some(g), Some(p)) => union_with_points(g, &p),
        (g, p) => g.or(p).unwrap_or_else(|| Geometry::empty(geom.dimension())),
    })
}

/// Adds the points not already covered by a unioned line/area geometry.
fn union_with_points(geom: Geometry, points: &Geometry) -> Geometry {
    let uncovered: Vec<Geometry> = points
        .points()
        .into_iter()
        .filter(|p| {
            locate_in_area(p, &geom) == Location::Exterior
                && locate_on_lines(p, &geom) == Location::Exterior
        })
        .map(|p| Geometry::Point(Some(p)))
        .collect();
    if uncovered.is_empty() {
        return geom;
    }
    let mut parts: Vec<Geometry> = geom
        .polygons()
        .into_iter()
        .map(|p| Geometry::Polygon(p.clone()))
        .collect();
    parts.extend(geom.line_strings().into_iter().map(|l| Geometry::LineString(l.clone())));
    parts.extend(uncovered);
    build_geometry(parts)
}

fn polygonal(polygons: Vec<Polygon>) -> Geometry {
    if polygons.is_empty() {
        return Geometry::empty(Dimension::Area);
    }
    build_geometry(polygons.into_iter().map(Geometry::Polygon).collect())
}

/// Dissolves a set of polygons into the polygons of their union.
///
/// With `count_cover` false, edges are assumed to be bounded on each side
/// by at most one polygon and to lie inside no other polygon, as in a
/// polygonal coverage.
#[instrument(skip_all, fields(polygons = polygons.len(), noder = noder.name()))]
pub fn union_polygons(
    polygons: &[&Polygon],
    noder: &dyn Noder,
    count_cover: bool,
) -> Result<Vec<Polygon>> {
    let strings = ring_strings(polygons);
    let noded = noder.node(strings)?;
    let edges = merge_cover_edges(&noded)?;
    let ray_index = count_cover.then(|| RayIndex::new(&noded));

    let mut graph = OverlayGraph::new();
    let mut dissolved = 0usize;
    for edge in edges {
        let cover = match &ray_index {
            Some(index) => index.covering_polygons(&edge),
            None => 0,
        };
        let (right, left) = edge.side_counts();
        let (right, left) = (right + cover, left + cover);
        if (right == 0) == (left == 0) {
            dissolved += 1;
            continue;
        }
        let mut lbl = OverlayLabel::new();
        lbl.init_boundary(0, side_location(left), side_location(right), false);
        graph.add_edge(edge.pts, lbl);
    }
    debug!(kept = graph.edge_count(), dissolved, "classified union edges");

    for e in graph.half_edge_ids() {
        let right = graph
            .label(e)
            .location(0, Position::Right, OverlayGraph::is_forward(e));
        if right == Some(Location::Interior) {
            graph.mark_in_result_area(e);
        }
    }
    PolygonBuilder::new(&mut graph).build()
}

fn side_location(count: usize) -> Location {
    if count > 0 {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// One segment string per ring, tagged with the id of its polygon.
fn ring_strings(polygons: &[&Polygon]) -> Vec<SegmentString> {
    let mut strings = Vec::new();
    for (id, poly) in polygons.iter().enumerate() {
        if poly.is_empty() {
            continue;
        }
        let rings = std::iter::once((&poly.shell, false)).chain(poly.holes.iter().map(|h| (h, true)));
        for (ring, is_hole) in rings {
            let pts = remove_repeated(ring);
            // fewer than three distinct vertices encloses no area
            if pts.len() < 4 {
                continue;
            }
            let delta = depth_delta(&pts, is_hole);
            strings.push(SegmentString::new(pts, EdgeSource::area(id, delta, is_hole)));
        }
    }
    strings
}

/// Merges coincident noded edges, accumulating per-polygon depth deltas
/// relative to the first occurrence's direction.
fn merge_cover_edges(noded: &[SegmentString]) -> Result<Vec<CoverEdge>> {
    let mut edges: Vec<CoverEdge> = Vec::with_capacity(noded.len());
    let mut lookup = AHashMap::with_capacity(noded.len());
    for ss in noded {
        let pts = ss.coordinates();
        if Edge::is_collapsed(pts) {
            continue;
        }
        let source = ss.source();
        let key = edge_key(pts)?;
        match lookup.get(&key) {
            Some(&idx) => {
                let base: &mut CoverEdge = &mut edges[idx];
                if base.pts.len() != pts.len() {
                    return Err(OverlayError::topology_at(
                        "Edges with same first segment but different coordinate count",
                        pts[0],
                    ));
                }
                let same_direction = base.pts[0].equals_2d(&pts[0]) && base.pts[1].equals_2d(&pts[1]);
                let delta = if same_direction {
                    source.depth_delta
                } else {
                    -source.depth_delta
                };
                base.add_delta(source.index, delta);
            }
            None => {
                lookup.insert(key, edges.len());
                edges.push(CoverEdge {
                    pts: pts.to_vec(),
                    deltas: vec![(source.index, source.depth_delta)],
                });
            }
        }
    }
    Ok(edges)
}

/// Segment index over the noded arrangement for point-in-polygon tests.
struct RayIndex<'s> {
    strings: &'s [SegmentString],
    index: SegmentIndex,
    max_x: f64,
}

impl<'s> RayIndex<'s> {
    fn new(strings: &'s [SegmentString]) -> Self {
        let mut env = Envelope::empty();
        for ss in strings {
            for c in ss.coordinates() {
                env.expand_to_include(c);
            }
        }
        Self {
            strings,
            index: SegmentIndex::build(strings, 0.0),
            max_x: env.max_x,
        }
    }

    /// Number of polygons not bounding `edge` whose interior contains it.
    /// Polygons bounding the edge with zero net delta are ignored.
    fn covering_polygons(&self, edge: &CoverEdge) -> usize {
        let (p0, p1) = (&edge.pts[0], &edge.pts[1]);
        let mid = Coordinate::new((p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0);
        let bounding = edge.bounding_polygons();
        let ray = Envelope::new(mid.x, self.max_x.max(mid.x), mid.y, mid.y);

        let mut counters: AHashMap<usize, RayCrossingCounter> = AHashMap::new();
        for (si, seg) in self.index.query(&ray) {
            let ss = &self.strings[si];
            let polygon = ss.source().index;
            if bounding.contains(&polygon) {
                continue;
            }
            let (a, b) = ss.segment(seg);
            counters
                .entry(polygon)
                .or_insert_with(|| RayCrossingCounter::new(mid))
                .count_segment(a, b);
        }
        counters
            .values()
            .filter(|c| c.location() == Location::Interior)
            .count()
    }
}
