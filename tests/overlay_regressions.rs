// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Regression cases for shared edges, line unions and snapping collapses

use anyhow::Result;
use polyframe_overlay::geometry::PrecisionModel;
use polyframe_overlay::{
    overlay_with, parse_wkt, to_wkt, unary_union, Geometry, OverlayOp, OverlayOptions,
};

fn wkt(text: &str) -> Geometry {
    parse_wkt(text).unwrap()
}

fn check(op: OverlayOp, a: &str, b: &str, scale: f64, expected: &str) -> Result<()> {
    let options = OverlayOptions::with_precision(PrecisionModel::fixed(scale)?);
    let actual = overlay_with(&wkt(a), &wkt(b), op, options)?;
    let expected = wkt(expected);
    assert!(
        actual.equals_normalized(&expected),
        "{} got {}, expected {}",
        op.name(),
        to_wkt(&actual),
        to_wkt(&expected)
    );
    Ok(())
}

const LEFT_BOX: &str = "POLYGON ((100 200, 200 200, 200 100, 100 100, 100 200))";
const RIGHT_BOX: &str = "POLYGON ((300 200, 300 100, 200 100, 200 200, 300 200))";

#[test]
fn test_adjacent_boxes_union_dissolves() -> Result<()> {
    check(
        OverlayOp::Union,
        LEFT_BOX,
        RIGHT_BOX,
        1.0,
        "POLYGON ((100 100, 100 200, 200 200, 300 200, 300 100, 200 100, 100 100))",
    )
}

#[test]
fn test_adjacent_boxes_intersection_is_shared_edge() -> Result<()> {
    check(
        OverlayOp::Intersection,
        LEFT_BOX,
        RIGHT_BOX,
        1.0,
        "LINESTRING (200 100, 200 200)",
    )
}

#[test]
fn test_area_line_intersection_keeps_touching_edges() -> Result<()> {
    check(
        OverlayOp::Intersection,
        "POLYGON ((360 200, 220 200, 220 180, 300 180, 300 160, 300 140, 360 200))",
        "MULTIPOLYGON (((280 180, 280 160, 300 160, 300 180, 280 180)), ((220 230, 240 230, 240 180, 220 180, 220 230)))",
        1.0,
        "GEOMETRYCOLLECTION (LINESTRING (280 180, 300 180), LINESTRING (300 160, 300 180), POLYGON ((220 180, 220 200, 240 200, 240 180, 220 180)))",
    )
}

#[test]
fn test_line_union_meeting_at_endpoint() -> Result<()> {
    check(
        OverlayOp::Union,
        "LINESTRING (0 0, 1 1)",
        "LINESTRING (1 1, 2 2)",
        1.0,
        "MULTILINESTRING ((0 0, 1 1), (1 1, 2 2))",
    )
}

#[test]
fn test_line_union_split_at_shared_vertex() -> Result<()> {
    check(
        OverlayOp::Union,
        "LINESTRING (0 0, 1 1, 0 1)",
        "LINESTRING (1 1, 2 2, 3 3)",
        1.0,
        "MULTILINESTRING ((0 0, 1 1), (0 1, 1 1), (1 1, 2 2, 3 3))",
    )
}

#[test]
fn test_line_union_split_at_interior_vertices() -> Result<()> {
    check(
        OverlayOp::Union,
        "MULTILINESTRING ((0 1, 1 1), (2 2, 2 0))",
        "LINESTRING (0 0, 1 1, 2 2, 3 3)",
        1.0,
        "MULTILINESTRING ((0 0, 1 1), (0 1, 1 1), (1 1, 2 2), (2 0, 2 2), (2 2, 3 3))",
    )
}

#[test]
fn test_line_union_with_repeated_point_and_shared_segment() -> Result<()> {
    check(
        OverlayOp::Union,
        "LINESTRING (100 300, 200 300, 200 100, 100 100)",
        "LINESTRING (300 300, 200 300, 200 300, 200 100, 300 100)",
        1.0,
        "MULTILINESTRING ((200 100, 100 100), (300 300, 200 300), (200 300, 200 100), (200 100, 300 100), (100 300, 200 300))",
    )
}

#[test]
fn test_line_union_figure_eight() -> Result<()> {
    check(
        OverlayOp::Union,
        "LINESTRING (5 1, 2 2, 5 3, 2 4, 5 5)",
        "LINESTRING (5 1, 8 2, 5 3, 8 4, 5 5)",
        1.0,
        "MULTILINESTRING ((5 1, 2 2, 5 3), (5 1, 8 2, 5 3), (5 3, 2 4, 5 5), (5 3, 8 4, 5 5))",
    )
}

#[test]
fn test_line_union_closing_a_ring() -> Result<()> {
    check(
        OverlayOp::Union,
        "LINESTRING (1 1, 5 5, 9 1)",
        "LINESTRING (1 1, 9 1)",
        1.0,
        "MULTILINESTRING ((1 1, 5 5, 9 1), (1 1, 9 1))",
    )
}

const GORE: &str = "MULTIPOLYGON (((1 1, 5 1, 5 0, 1 0, 1 1)), ((1 1, 5 2, 5 4, 1 4, 1 1)))";
const GORE_CLIP: &str = "POLYGON ((1 0, 1 2, 2 2, 2 0, 1 0))";

#[test]
fn test_gore_collapse_intersection() -> Result<()> {
    check(
        OverlayOp::Intersection,
        GORE,
        GORE_CLIP,
        1.0,
        "POLYGON ((2 0, 1 0, 1 1, 1 2, 2 2, 2 1, 2 0))",
    )
}

#[test]
fn test_gore_collapse_union() -> Result<()> {
    check(
        OverlayOp::Union,
        GORE,
        GORE_CLIP,
        1.0,
        "POLYGON ((2 0, 1 0, 1 1, 1 2, 1 4, 5 4, 5 2, 2 1, 5 1, 5 0, 2 0))",
    )
}

const SLIVER: &str = "POLYGON ((1 2, 1 1, 9 1, 1 2))";
const SLIVER_BOX: &str = "POLYGON ((9 2, 9 1, 8 1, 8 2, 9 2))";

#[test]
fn test_collapsed_sliver_intersection_is_line() -> Result<()> {
    check(OverlayOp::Intersection, SLIVER, SLIVER_BOX, 1.0, "LINESTRING (8 1, 9 1)")
}

#[test]
fn test_collapsed_sliver_union() -> Result<()> {
    check(
        OverlayOp::Union,
        SLIVER,
        SLIVER_BOX,
        1.0,
        "MULTIPOLYGON (((1 1, 1 2, 8 1, 1 1)), ((8 1, 8 2, 9 2, 9 1, 8 1)))",
    )
}

#[test]
fn test_collapse_leaves_dangling_line_in_union() -> Result<()> {
    check(
        OverlayOp::Union,
        "POLYGON ((0.9 1.7, 1.3 1.4, 2.1 1.4, 2.1 0.9, 1.3 0.9, 0.9 0, 0.9 1.7))",
        "POLYGON ((1 3, 3 3, 3 1, 1.3 0.9, 1 0.4, 1 3))",
        1.0,
        "GEOMETRYCOLLECTION (LINESTRING (1 0, 1 1), POLYGON ((1 1, 1 2, 1 3, 3 3, 3 1, 2 1, 1 1)))",
    )
}

#[test]
fn test_collapse_union_keeps_polygon() -> Result<()> {
    check(
        OverlayOp::Union,
        "POLYGON ((1 3.3, 1.3 1.4, 3.1 1.4, 3.1 0.9, 1.3 0.9, 1 -0.2, 0.8 1.3, 1 3.3))",
        "POLYGON ((1 2.9, 2.9 2.9, 2.9 1.3, 1.7 1, 1.3 0.9, 1 0.4, 1 2.9))",
        1.0,
        "GEOMETRYCOLLECTION (LINESTRING (1 0, 1 1), POLYGON ((1 1, 1 3, 3 3, 3 1, 2 1, 1 1)))",
    )
}

#[test]
fn test_hole_collapsing_onto_edge_of_other() -> Result<()> {
    check(
        OverlayOp::Intersection,
        "POLYGON ((0 3, 3 3, 3 0, 0 0, 0 3), (1 1.2, 1 1.1, 2.3 1.1, 1 1.2))",
        "POLYGON ((1 1, 2 1, 2 0, 1 0, 1 1))",
        1.0,
        "POLYGON ((1 1, 2 1, 2 0, 1 0, 1 1))",
    )
}

#[test]
fn test_holes_collapsing_onto_all_edges_of_other() -> Result<()> {
    check(
        OverlayOp::Intersection,
        "POLYGON ((0 3, 3 3, 3 0, 0 0, 0 3), (1 2.2, 1 2.1, 2 2.1, 1 2.2), (2.1 2, 2.2 2, 2.1 1, 2.1 2), (2 0.9, 2 0.8, 1 0.9, 2 0.9), (0.9 1, 0.8 1, 0.9 2, 0.9 1))",
        "POLYGON ((1 2, 2 2, 2 1, 1 1, 1 2))",
        1.0,
        "POLYGON ((1 2, 2 2, 2 1, 1 1, 1 2))",
    )
}

#[test]
fn test_flat_collapse_along_top() -> Result<()> {
    check(
        OverlayOp::Intersection,
        "POLYGON ((200 100, 150 200, 250 200, 150 200, 100 100, 200 100))",
        "POLYGON ((50 150, 250 150, 250 50, 50 50, 50 150))",
        1.0,
        "POLYGON ((175 150, 200 100, 100 100, 125 150, 175 150))",
    )
}

#[test]
fn test_collapsed_second_operand_located_as_lines() -> Result<()> {
    check(
        OverlayOp::Intersection,
        "POLYGON ((2.3442078 48.9331054, 2.3435211 48.9337921, 2.3428345 48.9358521, 2.3428345 48.9372253, 2.3433495 48.9370537, 2.3440361 48.936367, 2.3442078 48.9358521, 2.3442078 48.9331054))",
        "POLYGON ((2.3442078 48.9331054, 2.3435211 48.9337921, 2.3433494499999985 48.934307100000005, 2.3438644 48.9341354, 2.3442078 48.9331055, 2.3442078 48.9331054))",
        1000.0,
        "MULTILINESTRING ((2.343 48.934, 2.344 48.934), (2.344 48.933, 2.344 48.934))",
    )
}

#[test]
fn test_collapsed_edge_of_second_operand_labelled_interior() -> Result<()> {
    check(
        OverlayOp::Intersection,
        "POLYGON ((2.384376506250038 48.91765596875102, 2.3840332 48.916626, 2.3840332 48.9138794, 2.3833466 48.9118195, 2.3812866 48.9111328, 2.37854 48.9111328, 2.3764801 48.9118195, 2.3723602 48.9159393, 2.3703003 48.916626, 2.3723602 48.9173126, 2.3737335 48.9186859, 2.3757935 48.9193726, 2.3812866 48.9193726, 2.3833466 48.9186859, 2.384376506250038 48.91765596875102))",
        "MULTIPOLYGON (((2.3751067666731345 48.919143677778855, 2.3757935 48.9193726, 2.3812866 48.9193726, 2.3812866 48.9179993, 2.3809433 48.9169693, 2.3799133 48.916626, 2.3771667 48.916626, 2.3761368 48.9169693, 2.3754501 48.9190292, 2.3751067666731345 48.919143677778855)), ((2.3826108673454116 48.91893115612326, 2.3833466 48.9186859, 2.3840331750033394 48.91799930833141, 2.3830032 48.9183426, 2.3826108673454116 48.91893115612326)))",
        600.0,
        "POLYGON ((2.375 48.91833333333334, 2.375 48.92, 2.381666666666667 48.92, 2.381666666666667 48.91833333333334, 2.381666666666667 48.916666666666664, 2.38 48.916666666666664, 2.3766666666666665 48.916666666666664, 2.375 48.91833333333334))",
    )
}

#[test]
fn test_unary_union_dissolves_shared_edge_by_default() -> Result<()> {
    let cells = wkt("MULTIPOLYGON(((0 0,0 1,1 1,1 0,0 0)),((1 0,1 1,2 1,2 0,1 0)))");
    let merged = unary_union(&cells, None)?;
    let expected = wkt("POLYGON((0 0,0 1,1 1,2 1,2 0,1 0,0 0))");
    assert!(merged.equals_normalized(&expected), "got {}", to_wkt(&merged));
    Ok(())
}
