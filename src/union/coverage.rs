// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Union of polygonal or linear coverages.
//!
//! A coverage is a set of geometries which meet only along exactly matching
//! edges, so no intersection search is needed: segments are extracted as-is
//! and edges shared by two polygons dissolve.

use super::unary::union_polygons;
use crate::error::{OverlayError, Result};
use crate::geometry::{build_geometry, Dimension, Geometry, PrecisionModel};
use crate::noding::SegmentExtractingNoder;
use crate::overlay::{Overlay, OverlayOptions};
use tracing::instrument;

/// Dissolves the shared edges of a polygonal or linear coverage. The input
/// must be a valid coverage; overlapping components give invalid results.
#[instrument(skip(geom), fields(kind = geom.type_name()))]
pub fn coverage_union(geom: &Geometry) -> Result<Geometry> {
    if geom.is_empty() {
        return Ok(Geometry::empty(geom.dimension()));
    }
    if !geom.is_homogeneous() {
        return Err(OverlayError::unsupported(
            "coverage union input must have a single dimension",
        ));
    }
    match geom.dimension() {
        Dimension::Area => {
            let polygons = union_polygons(&geom.polygons(), &SegmentExtractingNoder::new(), false)?;
            if polygons.is_empty() {
                return Ok(Geometry::empty(Dimension::Area));
            }
            Ok(build_geometry(polygons.into_iter().map(Geometry::Polygon).collect()))
        }
        Dimension::Line => {
            let options = OverlayOptions::with_precision(PrecisionModel::Floating);
            Overlay::unary(geom, options)
                .with_noder(Box::new(SegmentExtractingNoder::new()))
                .execute()
        }
        dim => Err(OverlayError::unsupported(format!(
            "coverage union is not defined for {dim:?} input"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, Polygon};

    fn poly(coords: &[(f64, f64)]) -> Polygon {
        Polygon::new(coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect(), vec![])
    }

    #[test]
    fn test_adjacent_squares_dissolve() {
        let coverage = Geometry::MultiPolygon(vec![
            poly(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]),
            poly(&[(1.0, 0.0), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0), (1.0, 0.0)]),
        ]);
        let result = coverage_union(&coverage).unwrap();
        assert_eq!(result.area(), 2.0);
        assert_eq!(result.polygons().len(), 1);
        assert_eq!(result.length(), 6.0);
    }

    #[test]
    fn test_disjoint_coverage_keeps_parts() {
        let coverage = Geometry::MultiPolygon(vec![
            poly(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]),
            poly(&[(5.0, 0.0), (5.0, 1.0), (6.0, 1.0), (6.0, 0.0), (5.0, 0.0)]),
        ]);
        let result = coverage_union(&coverage).unwrap();
        assert_eq!(result.polygons().len(), 2);
    }

    #[test]
    fn test_linear_coverage_removes_duplicates() {
        let coverage = Geometry::MultiLineString(vec![
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0)],
            vec![Coordinate::new(1.0, 0.0), Coordinate::new(0.0, 0.0)],
            vec![Coordinate::new(1.0, 0.0), Coordinate::new(2.0, 0.0)],
        ]);
        let result = coverage_union(&coverage).unwrap();
        assert_eq!(result.length(), 2.0);
    }

    #[test]
    fn test_points_are_rejected() {
        let err = coverage_union(&Geometry::point(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, OverlayError::UnsupportedDimension { .. }));
    }
}
