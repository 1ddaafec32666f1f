// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! WKT reader using pest

use crate::geometry::{Coordinate, Geometry, Polygon};
use anyhow::{anyhow, bail, Context, Result};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::path::Path;

#[derive(Parser)]
#[grammar = "io/wkt.pest"]
struct WktParser;

/// Parse a WKT string into a geometry
pub fn parse_wkt(source: &str) -> Result<Geometry> {
    let mut pairs = WktParser::parse(Rule::wkt, source.trim()).context("Failed to parse WKT")?;
    let geometry = pairs
        .next()
        .and_then(|wkt| wkt.into_inner().next())
        .ok_or_else(|| anyhow!("Empty WKT input"))?;
    parse_geometry(geometry)
}

/// Read a file containing a single WKT geometry
pub fn read_wkt_file(path: impl AsRef<Path>) -> Result<Geometry> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read WKT file: {}", path.display()))?;
    parse_wkt(&source).with_context(|| format!("Failed to parse WKT file: {}", path.display()))
}

fn parse_geometry(pair: Pair<Rule>) -> Result<Geometry> {
    let rule = pair.as_rule();
    let parts: Vec<Pair<Rule>> = pair
        .into_inner()
        .filter(|p| p.as_rule() != Rule::z_tag)
        .collect();
    let is_empty = parts.first().map_or(true, |p| p.as_rule() == Rule::empty);

    let geom = match rule {
        Rule::point if is_empty => Geometry::Point(None),
        Rule::point => Geometry::Point(Some(parse_coord(first(parts)?)?)),
        Rule::linestring if is_empty => Geometry::LineString(Vec::new()),
        Rule::linestring => Geometry::LineString(parse_coord_seq(first(parts)?)?),
        Rule::polygon if is_empty => Geometry::Polygon(Polygon::default()),
        Rule::polygon => Geometry::Polygon(parse_polygon(first(parts)?)?),
        Rule::multipoint if is_empty => Geometry::MultiPoint(Vec::new()),
        Rule::multipoint => {
            Geometry::MultiPoint(parts.into_iter().map(parse_coord).collect::<Result<_>>()?)
        }
        Rule::multilinestring if is_empty => Geometry::MultiLineString(Vec::new()),
        Rule::multilinestring => Geometry::MultiLineString(
            first(parts)?
                .into_inner()
                .map(parse_coord_seq)
                .collect::<Result<_>>()?,
        ),
        Rule::multipolygon if is_empty => Geometry::MultiPolygon(Vec::new()),
        Rule::multipolygon => Geometry::MultiPolygon(
            first(parts)?
                .into_inner()
                .map(parse_polygon)
                .collect::<Result<_>>()?,
        ),
        Rule::collection if is_empty => Geometry::GeometryCollection(Vec::new()),
        Rule::collection => Geometry::GeometryCollection(
            parts.into_iter().map(parse_geometry).collect::<Result<_>>()?,
        ),
        other => bail!("Unexpected WKT element: {:?}", other),
    };
    Ok(geom)
}

fn first(parts: Vec<Pair<Rule>>) -> Result<Pair<Rule>> {
    parts
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Missing WKT coordinates"))
}

fn parse_polygon(ring_seq: Pair<Rule>) -> Result<Polygon> {
    let mut rings = ring_seq
        .into_inner()
        .map(parse_coord_seq)
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let shell = rings.next().ok_or_else(|| anyhow!("Polygon without shell"))?;
    check_ring(&shell)?;
    let holes: Vec<Vec<Coordinate>> = rings.collect();
    for hole in &holes {
        check_ring(hole)?;
    }
    Ok(Polygon::new(shell, holes))
}

fn check_ring(ring: &[Coordinate]) -> Result<()> {
    let closed = ring.len() >= 4 && ring[0].equals_2d(&ring[ring.len() - 1]);
    if !closed {
        bail!("Polygon ring must be closed with at least 4 points");
    }
    Ok(())
}

fn parse_coord_seq(seq: Pair<Rule>) -> Result<Vec<Coordinate>> {
    seq.into_inner().map(parse_coord).collect()
}

fn parse_coord(pair: Pair<Rule>) -> Result<Coordinate> {
    let values = pair
        .into_inner()
        .map(|n| {
            n.as_str()
                .parse::<f64>()
                .with_context(|| format!("Invalid number: {}", n.as_str()))
        })
        .collect::<Result<Vec<f64>>>()?;
    match values.as_slice() {
        [x, y] => Ok(Coordinate::new(*x, *y)),
        [x, y, z] => Ok(Coordinate::new_z(*x, *y, *z)),
        _ => bail!("Coordinate must have 2 or 3 ordinates"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dimension;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_point_and_empty() {
        assert_eq!(parse_wkt("POINT (1 2)").unwrap(), Geometry::point(1.0, 2.0));
        assert_eq!(parse_wkt("point empty").unwrap(), Geometry::Point(None));
        let p = parse_wkt("POINT Z (1 2 3)").unwrap();
        assert!(p.has_z());
    }

    #[test]
    fn test_parse_polygon_with_hole() {
        let g = parse_wkt("POLYGON((0 0,0 10,10 10,10 0,0 0),(2 2,4 2,4 4,2 4,2 2))").unwrap();
        assert_eq!(g.dimension(), Dimension::Area);
        assert_eq!(g.area(), 96.0);
    }

    #[test]
    fn test_parse_multi_geometries() {
        let mp = parse_wkt("MULTIPOINT ((1 1), (2 2))").unwrap();
        assert_eq!(mp, parse_wkt("MULTIPOINT (1 1, 2 2)").unwrap());
        let ml = parse_wkt("MULTILINESTRING ((0 0, 1 1), (2 2, 3 3))").unwrap();
        assert_eq!(ml.line_strings().len(), 2);
        let mpoly = parse_wkt(
            "MULTIPOLYGON(((5 5,1 5,5 1,5 5)),((5 9,1 5,5 5,5 9)))",
        )
        .unwrap();
        assert_eq!(mpoly.polygons().len(), 2);
    }

    #[test]
    fn test_parse_collection() {
        let g = parse_wkt("GEOMETRYCOLLECTION (POINT (1 1), LINESTRING (0 0, 2 2))").unwrap();
        match g {
            Geometry::GeometryCollection(parts) => assert_eq!(parts.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse_wkt("GEOMETRYCOLLECTION EMPTY").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(parse_wkt("POLYGON((0 0, 1 1))").is_err());
        assert!(parse_wkt("CIRCLE (0 0, 1)").is_err());
        assert!(parse_wkt("POINT (1)").is_err());
    }

    #[test]
    fn test_read_wkt_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "LINESTRING (0 0, 3 4)")?;
        let g = read_wkt_file(file.path())?;
        assert_eq!(g.length(), 5.0);
        Ok(())
    }
}
