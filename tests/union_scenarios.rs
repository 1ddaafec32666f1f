// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Unary and coverage union through the public API

use anyhow::Result;
use approx::assert_relative_eq;
use polyframe_overlay::geometry::{Dimension, PrecisionModel};
use polyframe_overlay::{coverage_union, parse_wkt, unary_union, union, Geometry, OverlayError};

fn wkt(text: &str) -> Geometry {
    parse_wkt(text).unwrap()
}

#[test]
fn test_unary_union_matches_pairwise_union() -> Result<()> {
    let parts = [
        "POLYGON((0 0,0 4,4 4,4 0,0 0))",
        "POLYGON((2 2,2 6,6 6,6 2,2 2))",
        "POLYGON((5 0,5 3,9 3,9 0,5 0))",
    ];
    let mut pairwise = wkt(parts[0]);
    for part in &parts[1..] {
        pairwise = union(&pairwise, &wkt(part))?;
    }

    let all = wkt(&format!("GEOMETRYCOLLECTION({})", parts.join(",")));
    let merged = unary_union(&all, None)?;
    assert!(merged.equals_normalized(&pairwise));
    assert_relative_eq!(merged.area(), 16.0 + 16.0 + 12.0 - 4.0 - 1.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_unary_union_on_fine_grid() -> Result<()> {
    let g = wkt("MULTIPOLYGON(((0 0,0 1.5,1.5 1.5,1.5 0,0 0)),((1 1,1 2.5,2.5 2.5,2.5 1,1 1)))");
    let merged = unary_union(&g, Some(PrecisionModel::fixed(10.0)?))?;
    assert_eq!(merged.polygons().len(), 1);
    assert_relative_eq!(merged.area(), 2.25 + 2.25 - 0.25, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_unary_union_of_lines_nodes_crossings() -> Result<()> {
    let g = wkt("MULTILINESTRING((0 0,10 10),(0 10,10 0))");
    let merged = unary_union(&g, None)?;
    assert_eq!(merged.dimension(), Dimension::Line);
    assert_eq!(merged.line_strings().len(), 4);
    assert_relative_eq!(merged.length(), g.length(), epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_coverage_union_of_grid_cells() -> Result<()> {
    let cells: Vec<String> = (0..3)
        .flat_map(|i| (0..3).map(move |j| (i, j)))
        .map(|(i, j)| {
            format!(
                "(({x0} {y0},{x0} {y1},{x1} {y1},{x1} {y0},{x0} {y0}))",
                x0 = i,
                y0 = j,
                x1 = i + 1,
                y1 = j + 1
            )
        })
        .collect();
    let coverage = wkt(&format!("MULTIPOLYGON({})", cells.join(",")));
    let merged = coverage_union(&coverage)?;
    assert!(merged.equals_normalized(&wkt(
        "POLYGON((0 0,0 1,0 2,0 3,1 3,2 3,3 3,3 2,3 1,3 0,2 0,1 0,0 0))"
    )));
    Ok(())
}

#[test]
fn test_coverage_union_rejects_mixed_input() {
    let mixed = wkt("GEOMETRYCOLLECTION(POLYGON((0 0,0 1,1 1,1 0,0 0)),LINESTRING(0 0,5 5))");
    let err = coverage_union(&mixed).unwrap_err();
    assert!(matches!(err, OverlayError::UnsupportedDimension { .. }));
}
