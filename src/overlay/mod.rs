// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Overlay - boolean set operations on planar geometries
//!
//! The pipeline for line and area operands is:
//!
//! 1. choose a precision model (explicit, or the robust scale of the inputs)
//! 2. optionally clip the operands to the region that can affect the result
//! 3. node all operand edges together and merge coincident edges
//! 4. build the half-edge graph and label every edge against both operands
//! 5. extract result polygons, lines and points for the operation
//!
//! Point operands bypass the graph and are located directly.

mod clip;
mod edge;
mod edge_noding;
mod elevation;
mod graph;
mod input;
mod label;
mod labeller;
mod line_builder;
mod point_builder;
mod polygon_builder;
mod reduce;
pub mod scale;

pub use clip::{clipping_envelope, safe_expand_distance, LineLimiter, RingClipper};
pub use edge::{canonical_direction, edge_key, merge_edges, Edge};
pub use edge_noding::{depth_delta, EdgeNodingBuilder};
pub use elevation::ElevationModel;
pub use graph::{EdgeId, OverlayGraph};
pub use input::InputGeometry;
pub use label::{LabelDim, OverlayLabel, Position};
pub use labeller::OverlayLabeller;
pub use line_builder::LineBuilder;
pub use point_builder::{intersection_points, overlay_mixed_points, overlay_points};
pub use polygon_builder::PolygonBuilder;
pub use reduce::reduce_precision;
pub use scale::{inherent_scale, robust_precision_model, robust_scale, safe_scale};

use crate::error::{OverlayError, Result};
use crate::geometry::{build_geometry, Dimension, Envelope, Geometry, Location, PrecisionModel};
use crate::noding::{default_noder, Noder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Boolean overlay operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayOp {
    Intersection,
    Union,
    Difference,
    SymDifference,
}

impl OverlayOp {
    pub const ALL: [OverlayOp; 4] = [
        OverlayOp::Intersection,
        OverlayOp::Union,
        OverlayOp::Difference,
        OverlayOp::SymDifference,
    ];

    /// Whether a region with the given locations in each operand belongs
    /// to the result. Boundary counts as interior; unknown as exterior.
    pub fn is_result_of(self, loc0: Option<Location>, loc1: Option<Location>) -> bool {
        let in0 = matches!(loc0, Some(Location::Interior | Location::Boundary));
        let in1 = matches!(loc1, Some(Location::Interior | Location::Boundary));
        match self {
            OverlayOp::Intersection => in0 && in1,
            OverlayOp::Union => in0 || in1,
            OverlayOp::Difference => in0 && !in1,
            OverlayOp::SymDifference => in0 != in1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OverlayOp::Intersection => "intersection",
            OverlayOp::Union => "union",
            OverlayOp::Difference => "difference",
            OverlayOp::SymDifference => "symdifference",
        }
    }
}

impl fmt::Display for OverlayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OverlayOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "intersection" | "intersect" => Ok(OverlayOp::Intersection),
            "union" => Ok(OverlayOp::Union),
            "difference" | "diff" => Ok(OverlayOp::Difference),
            "symdifference" | "symdiff" | "sym_difference" | "xor" => Ok(OverlayOp::SymDifference),
            other => Err(format!("unknown overlay operation '{other}'")),
        }
    }
}

/// Natural dimension of an overlay result: the lower operand dimension for
/// intersection, the first operand's for difference, otherwise the higher.
pub fn result_dimension(op: OverlayOp, dim0: Dimension, dim1: Dimension) -> Dimension {
    match op {
        OverlayOp::Intersection => dim0.min(dim1),
        OverlayOp::Union | OverlayOp::SymDifference => dim0.max(dim1),
        OverlayOp::Difference => dim0,
    }
}

/// Per-call overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// Explicit precision; the robust scale of the operands when absent.
    pub precision: Option<PrecisionModel>,
    /// Homogeneous results: no collapse lines or touch points beside areas.
    pub strict: bool,
    /// Clip operands to the region that can affect the result.
    pub optimize_clipping: bool,
    /// Join result line edges through nodes of degree two.
    pub merge_result_lines: bool,
    /// Fill in missing Z on result vertices from the operands.
    pub populate_z: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            precision: None,
            strict: false,
            optimize_clipping: true,
            merge_result_lines: false,
            populate_z: true,
        }
    }
}

impl OverlayOptions {
    pub fn with_precision(pm: PrecisionModel) -> Self {
        Self {
            precision: Some(pm),
            ..Self::default()
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

const AREA_HEURISTIC_TOLERANCE: f64 = 0.1;

/// A configured overlay of one or two operands.
///
/// ```
/// use polyframe_overlay::geometry::{Coordinate, Geometry, Polygon};
/// use polyframe_overlay::overlay::{Overlay, OverlayOp, OverlayOptions};
///
/// let square = |x: f64| {
///     let ring = [(x, 0.0), (x, 2.0), (x + 2.0, 2.0), (x + 2.0, 0.0), (x, 0.0)]
///         .iter()
///         .map(|&(x, y)| Coordinate::new(x, y))
///         .collect();
///     Geometry::Polygon(Polygon::new(ring, vec![]))
/// };
/// let (a, b) = (square(0.0), square(1.0));
/// let result = Overlay::new(&a, &b, OverlayOp::Intersection, OverlayOptions::default())
///     .execute()
///     .unwrap();
/// assert_eq!(result.area(), 2.0);
/// ```
pub struct Overlay<'a> {
    a: &'a Geometry,
    b: Option<&'a Geometry>,
    op: OverlayOp,
    options: OverlayOptions,
    noder: Option<Box<dyn Noder>>,
    area_result_only: bool,
}

impl<'a> Overlay<'a> {
    pub fn new(a: &'a Geometry, b: &'a Geometry, op: OverlayOp, options: OverlayOptions) -> Self {
        Self {
            a,
            b: Some(b),
            op,
            options,
            noder: None,
            area_result_only: false,
        }
    }

    /// Union of a single operand with itself: nodes it and rebuilds valid
    /// topology.
    pub fn unary(a: &'a Geometry, options: OverlayOptions) -> Self {
        Self {
            a,
            b: None,
            op: OverlayOp::Union,
            options,
            noder: None,
            area_result_only: false,
        }
    }

    /// Uses a specific noder instead of the default for the precision model.
    pub fn with_noder(mut self, noder: Box<dyn Noder>) -> Self {
        self.noder = Some(noder);
        self
    }

    /// Skips line and point extraction.
    pub fn area_result_only(mut self, area_only: bool) -> Self {
        self.area_result_only = area_only;
        self
    }

    /// Precision model used for this overlay. Without an explicit model a
    /// custom noder implies floating precision.
    pub fn precision_model(&self) -> Result<PrecisionModel> {
        let pm = match self.options.precision {
            Some(pm) => pm,
            None if self.noder.is_some() => PrecisionModel::Floating,
            None => robust_precision_model(self.a, self.b)?,
        };
        pm.validate()?;
        Ok(pm)
    }

    #[instrument(skip(self), fields(op = %self.op, unary = self.b.is_none()))]
    pub fn execute(&self) -> Result<Geometry> {
        let pm = self.precision_model()?;
        debug!(?pm, "precision model");
        let result = match self.b {
            None => self.execute_unary(&pm)?,
            Some(b) => self.execute_binary(b, &pm)?,
        };
        if self.options.populate_z && !result.is_empty() {
            let model = ElevationModel::create(self.a, self.b);
            if model.has_z() {
                return Ok(model.populate_z(&result));
            }
        }
        Ok(result)
    }

    fn execute_unary(&self, pm: &PrecisionModel) -> Result<Geometry> {
        if self.a.is_empty() {
            return Ok(Geometry::empty(self.a.dimension()));
        }
        if self.a.dimension() == Dimension::Point {
            return Ok(overlay_points(
                OverlayOp::Union,
                self.a,
                &Geometry::empty(Dimension::Point),
                pm,
            ));
        }
        self.compute_edge_overlay(pm)
    }

    fn execute_binary(&self, b: &Geometry, pm: &PrecisionModel) -> Result<Geometry> {
        let a = self.a;
        if self.options.strict
            && self.op == OverlayOp::Union
            && !a.is_empty()
            && !b.is_empty()
            && a.dimension() != b.dimension()
        {
            return Err(OverlayError::unsupported(format!(
                "strict union of {:?} and {:?} operands",
                a.dimension(),
                b.dimension()
            )));
        }
        if let Some(trivial) = self.trivial_result(b, pm) {
            debug!("empty operand short-circuit");
            return Ok(trivial);
        }
        let (dim_a, dim_b) = (a.dimension(), b.dimension());
        if dim_a == Dimension::Point && dim_b == Dimension::Point {
            return Ok(overlay_points(self.op, a, b, pm));
        }
        if dim_a == Dimension::Point || dim_b == Dimension::Point {
            return overlay_mixed_points(self.op, a, b, pm, &self.options);
        }
        let result = self.compute_edge_overlay(pm)?;
        if pm.is_floating()
            && result.dimension() == Dimension::Area
            && !is_result_area_consistent(self.op, a, b, &result)
        {
            return Err(OverlayError::topology(format!(
                "{} result area {} is inconsistent with operand areas {} and {}",
                self.op,
                result.area(),
                a.area(),
                b.area()
            )));
        }
        Ok(result)
    }

    /// Results determined by empty operands or disjoint envelopes, computed
    /// without noding.
    fn trivial_result(&self, b: &Geometry, pm: &PrecisionModel) -> Option<Geometry> {
        let a = self.a;
        let empty = || Geometry::empty(result_dimension(self.op, a.dimension(), b.dimension()));
        match self.op {
            OverlayOp::Intersection => {
                if a.is_empty() || b.is_empty() || is_env_disjoint(&a.envelope(), &b.envelope(), pm) {
                    return Some(empty());
                }
                None
            }
            OverlayOp::Difference => {
                if a.is_empty() {
                    Some(empty())
                } else if b.is_empty() {
                    Some(a.clone())
                } else {
                    None
                }
            }
            OverlayOp::Union | OverlayOp::SymDifference => match (a.is_empty(), b.is_empty()) {
                (true, true) => Some(empty()),
                (true, false) => Some(b.clone()),
                (false, true) => Some(a.clone()),
                (false, false) => None,
            },
        }
    }

    /// Nodes, merges and labels the operand edges, marking the half-edges
    /// bounding the result area.
    fn build_labelled_graph(&self, pm: &PrecisionModel) -> Result<OverlayGraph> {
        let (mut graph, has_edges) = self.build_graph(pm)?;
        let input = InputGeometry::new(self.a, self.b);
        let mut labeller = OverlayLabeller::new(&mut graph, input, has_edges);
        labeller.compute_labelling()?;
        labeller.mark_result_area_edges(self.op);
        labeller.unmark_duplicate_edges_from_result_area();
        Ok(graph)
    }

    fn build_graph(&self, pm: &PrecisionModel) -> Result<(OverlayGraph, [bool; 2])> {
        let default;
        let noder: &dyn Noder = match &self.noder {
            Some(noder) => noder.as_ref(),
            None => {
                default = default_noder(pm)?;
                default.as_ref()
            }
        };
        let mut builder = EdgeNodingBuilder::new(noder);
        if self.options.optimize_clipping {
            if let Some(env) = self
                .b
                .and_then(|b| clipping_envelope(self.op, self.a, b, pm))
            {
                debug!(?env, "clipping operands");
                builder.set_clip_envelope(env);
            }
        }
        let edges = builder.build(self.a, self.b)?;
        let has_edges = [builder.has_edges_for(0), builder.has_edges_for(1)];
        let merged = merge_edges(edges)?;
        let graph = OverlayGraph::from_edges(merged);
        debug!(
            edges = graph.edge_count(),
            nodes = graph.node_edges().len(),
            "built overlay graph"
        );
        Ok((graph, has_edges))
    }

    fn compute_edge_overlay(&self, pm: &PrecisionModel) -> Result<Geometry> {
        let mut graph = self.build_labelled_graph(pm)?;
        self.extract_result(&mut graph)
    }

    /// Builds result polygons, then lines and points where the operation
    /// and the strict setting allow them.
    fn extract_result(&self, graph: &mut OverlayGraph) -> Result<Geometry> {
        let input = InputGeometry::new(self.a, self.b);
        let strict = self.options.strict;
        let polygons = PolygonBuilder::new(graph).build()?;
        let has_area = !polygons.is_empty();

        let mut lines = Vec::new();
        let mut points = Vec::new();
        if !self.area_result_only {
            let allow_lines = !has_area || !strict || self.op == OverlayOp::SymDifference;
            if allow_lines {
                lines = LineBuilder::new(graph, self.op, has_area, input.area_index())
                    .strict(strict)
                    .merge_lines(self.options.merge_result_lines)
                    .build();
            }
            let has_components = has_area || !lines.is_empty();
            if self.op == OverlayOp::Intersection && (!has_components || !strict) {
                points = intersection_points(graph, strict);
            }
        }
        debug!(
            polygons = polygons.len(),
            lines = lines.len(),
            points = points.len(),
            "extracted result"
        );

        let parts: Vec<Geometry> = polygons
            .into_iter()
            .map(Geometry::Polygon)
            .chain(lines.into_iter().map(Geometry::LineString))
            .chain(points.into_iter().map(|p| Geometry::Point(Some(p))))
            .collect();
        if parts.is_empty() {
            let dim = result_dimension(self.op, input.dimension(0), input.dimension(1));
            return Ok(Geometry::empty(dim));
        }
        Ok(build_geometry(parts))
    }

    /// The merged noded edges as lines, before labelling.
    pub fn noded_edges(&self) -> Result<Geometry> {
        let pm = self.precision_model()?;
        let (graph, _) = self.build_graph(&pm)?;
        let lines = (0..graph.edge_count())
            .map(|k| graph.coordinates(2 * k))
            .collect();
        Ok(Geometry::MultiLineString(lines))
    }

    /// Edges bounding the result area, as lines in result orientation.
    pub fn result_edges(&self) -> Result<Geometry> {
        let pm = self.precision_model()?;
        let graph = self.build_labelled_graph(&pm)?;
        let lines = graph
            .result_area_edges()
            .into_iter()
            .map(|e| graph.coordinates(e))
            .collect();
        Ok(Geometry::MultiLineString(lines))
    }
}

/// Envelope disjointness after rounding the bounds to the precision grid.
fn is_env_disjoint(env0: &Envelope, env1: &Envelope, pm: &PrecisionModel) -> bool {
    if env0.is_empty() || env1.is_empty() {
        return true;
    }
    if pm.is_floating() {
        return env0.disjoint(env1);
    }
    let r = |v: f64| pm.make_precise_value(v);
    r(env0.min_x) > r(env1.max_x)
        || r(env0.max_x) < r(env1.min_x)
        || r(env0.min_y) > r(env1.max_y)
        || r(env0.max_y) < r(env1.min_y)
}

fn is_less(v1: f64, v2: f64, tol: f64) -> bool {
    v1 <= v2 * (1.0 + tol)
}

fn is_greater(v1: f64, v2: f64, tol: f64) -> bool {
    v1 >= v2 * (1.0 - tol)
}

/// Coarse check that a result area lies in the range the operation allows.
fn is_result_area_consistent(op: OverlayOp, a: &Geometry, b: &Geometry, result: &Geometry) -> bool {
    let tol = AREA_HEURISTIC_TOLERANCE;
    let (area_a, area_b, area) = (a.area(), b.area(), result.area());
    match op {
        OverlayOp::Intersection => is_less(area, area_a, tol) && is_less(area, area_b, tol),
        OverlayOp::Difference => is_less(area, area_a, tol) && is_greater(area, area_a - area_b, tol),
        OverlayOp::SymDifference => is_less(area, area_a + area_b, tol),
        OverlayOp::Union => {
            is_less(area_a, area, tol)
                && is_less(area_b, area, tol)
                && is_greater(area, area_a - area_b, tol)
        }
    }
}

/// Overlay with default options.
pub fn overlay(a: &Geometry, b: &Geometry, op: OverlayOp) -> Result<Geometry> {
    Overlay::new(a, b, op, OverlayOptions::default()).execute()
}

pub fn overlay_with(
    a: &Geometry,
    b: &Geometry,
    op: OverlayOp,
    options: OverlayOptions,
) -> Result<Geometry> {
    Overlay::new(a, b, op, options).execute()
}

pub fn intersection(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    overlay(a, b, OverlayOp::Intersection)
}

pub fn union(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    overlay(a, b, OverlayOp::Union)
}

pub fn difference(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    overlay(a, b, OverlayOp::Difference)
}

pub fn sym_difference(a: &Geometry, b: &Geometry) -> Result<Geometry> {
    overlay(a, b, OverlayOp::SymDifference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, Polygon};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry {
        let ring = [(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]
            .iter()
            .map(|&(x, y)| Coordinate::new(x, y))
            .collect();
        Geometry::Polygon(Polygon::new(ring, vec![]))
    }

    fn line(coords: &[(f64, f64)]) -> Geometry {
        Geometry::LineString(coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect())
    }

    #[test]
    fn test_is_result_of_truth_table() {
        let i = Some(Location::Interior);
        let b = Some(Location::Boundary);
        let e = Some(Location::Exterior);
        assert!(OverlayOp::Intersection.is_result_of(i, b));
        assert!(!OverlayOp::Intersection.is_result_of(i, e));
        assert!(OverlayOp::Union.is_result_of(e, i));
        assert!(!OverlayOp::Union.is_result_of(e, None));
        assert!(OverlayOp::Difference.is_result_of(i, e));
        assert!(!OverlayOp::Difference.is_result_of(i, i));
        assert!(OverlayOp::SymDifference.is_result_of(e, i));
        assert!(!OverlayOp::SymDifference.is_result_of(i, i));
    }

    #[test]
    fn test_op_parse_and_display() {
        for op in OverlayOp::ALL {
            assert_eq!(op.to_string().parse::<OverlayOp>().unwrap(), op);
        }
        assert_eq!("XOR".parse::<OverlayOp>().unwrap(), OverlayOp::SymDifference);
        assert!("merge".parse::<OverlayOp>().is_err());
    }

    #[test]
    fn test_result_dimension() {
        use Dimension::*;
        assert_eq!(result_dimension(OverlayOp::Intersection, Area, Line), Line);
        assert_eq!(result_dimension(OverlayOp::Union, Point, Area), Area);
        assert_eq!(result_dimension(OverlayOp::Difference, Line, Area), Line);
        assert_eq!(result_dimension(OverlayOp::SymDifference, Point, Line), Line);
    }

    #[test]
    fn test_overlapping_rectangles() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        assert_eq!(intersection(&a, &b).unwrap().area(), 25.0);
        assert_eq!(union(&a, &b).unwrap().area(), 175.0);
        assert_eq!(difference(&a, &b).unwrap().area(), 75.0);
        assert_eq!(sym_difference(&a, &b).unwrap().area(), 150.0);
    }

    #[test]
    fn test_floating_precision_overlay() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(0.5, 0.25, 1.5, 0.75);
        let options = OverlayOptions::with_precision(PrecisionModel::Floating);
        let result = overlay_with(&a, &b, OverlayOp::Intersection, options).unwrap();
        assert!((result.area() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_intersection_is_typed_empty() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(5.0, 5.0, 6.0, 6.0);
        let result = intersection(&a, &b).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.dimension(), Dimension::Area);
    }

    #[test]
    fn test_empty_operand_laws() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let empty = Geometry::empty(Dimension::Area);
        assert_eq!(union(&a, &empty).unwrap(), a);
        assert_eq!(difference(&a, &empty).unwrap(), a);
        assert!(intersection(&a, &empty).unwrap().is_empty());
        assert_eq!(sym_difference(&empty, &a).unwrap(), a);
    }

    #[test]
    fn test_touching_squares_intersect_in_line() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);
        let result = intersection(&a, &b).unwrap();
        assert_eq!(result.dimension(), Dimension::Line);
        assert_eq!(result.length(), 1.0);

        let strict = OverlayOptions::default().strict(true);
        let result = overlay_with(&a, &b, OverlayOp::Intersection, strict).unwrap();
        assert_eq!(result.dimension(), Dimension::Line);
    }

    #[test]
    fn test_corner_touch_gives_point() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 1.0, 2.0, 2.0);
        let result = intersection(&a, &b).unwrap();
        assert_eq!(result, Geometry::point(1.0, 1.0));
    }

    #[test]
    fn test_line_difference_with_area() {
        let l = line(&[(-5.0, 5.0), (15.0, 5.0)]);
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let result = difference(&l, &a).unwrap();
        assert_eq!(result.dimension(), Dimension::Line);
        assert_eq!(result.length(), 10.0);
        let inside = intersection(&l, &a).unwrap();
        assert_eq!(inside, line(&[(0.0, 5.0), (10.0, 5.0)]));
    }

    #[test]
    fn test_strict_union_of_mixed_dimensions_is_rejected() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let l = line(&[(2.0, 2.0), (3.0, 3.0)]);
        let strict = OverlayOptions::default().strict(true);
        let err = overlay_with(&a, &l, OverlayOp::Union, strict).unwrap_err();
        assert!(matches!(err, OverlayError::UnsupportedDimension { .. }));
    }

    #[test]
    fn test_invalid_precision_is_rejected() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let options = OverlayOptions {
            precision: Some(PrecisionModel::Fixed { scale: 0.0 }),
            ..OverlayOptions::default()
        };
        let err = overlay_with(&a, &a, OverlayOp::Union, options).unwrap_err();
        assert!(matches!(err, OverlayError::InvalidPrecision { .. }));
    }

    #[test]
    fn test_unary_removes_duplicate_points() {
        let mp = Geometry::MultiPoint(vec![Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.0)]);
        let result = Overlay::unary(&mp, OverlayOptions::default()).execute().unwrap();
        assert_eq!(result, Geometry::point(1.0, 1.0));
    }

    #[test]
    fn test_debug_edge_surfaces() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        let ov = Overlay::new(&a, &b, OverlayOp::Intersection, OverlayOptions::default());
        match ov.noded_edges().unwrap() {
            Geometry::MultiLineString(lines) => assert_eq!(lines.len(), 6),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ov.result_edges().unwrap().length(), 20.0);
    }

    #[test]
    fn test_z_populated_on_new_vertices() {
        let a = Geometry::LineString(vec![
            Coordinate::new_z(0.0, 0.0, 5.0),
            Coordinate::new_z(10.0, 0.0, 5.0),
        ]);
        let b = rect(2.0, -1.0, 4.0, 1.0);
        let result = intersection(&a, &b).unwrap();
        assert!(result.coordinates().iter().all(|c| c.z == 5.0));
    }
}
