// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! WKT writer

use crate::geometry::{Coordinate, Geometry, Polygon};
use std::fmt::{self, Write};

/// Format a geometry as WKT. Geometries with any Z ordinate are written
/// with the `Z` tag; vertices without Z are written as `NaN`.
pub fn to_wkt(geom: &Geometry) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_geometry(&mut out, geom, geom.has_z());
    out
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_geometry(f, self, self.has_z())
    }
}

fn write_geometry(out: &mut impl Write, geom: &Geometry, with_z: bool) -> fmt::Result {
    out.write_str(&geom.type_name().to_ascii_uppercase())?;
    if with_z {
        out.write_str(" Z")?;
    }
    if geom.is_empty() {
        return out.write_str(" EMPTY");
    }
    out.write_char(' ')?;
    match geom {
        Geometry::Point(Some(c)) => {
            out.write_char('(')?;
            write_coord(out, c, with_z)?;
            out.write_char(')')
        }
        Geometry::Point(None) => Ok(()),
        Geometry::LineString(pts) => write_seq(out, pts, with_z),
        Geometry::Polygon(poly) => write_polygon(out, poly, with_z),
        Geometry::MultiPoint(pts) => {
            out.write_char('(')?;
            for (i, c) in pts.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                out.write_char('(')?;
                write_coord(out, c, with_z)?;
                out.write_char(')')?;
            }
            out.write_char(')')
        }
        Geometry::MultiLineString(lines) => {
            write_list(out, lines.iter().filter(|l| !l.is_empty()), |out, l| {
                write_seq(out, l, with_z)
            })
        }
        Geometry::MultiPolygon(polys) => {
            write_list(out, polys.iter().filter(|p| !p.is_empty()), |out, p| {
                write_polygon(out, p, with_z)
            })
        }
        Geometry::GeometryCollection(parts) => {
            write_list(out, parts.iter(), |out, g| write_geometry(out, g, with_z))
        }
    }
}

fn write_list<W: Write, T>(
    out: &mut W,
    items: impl Iterator<Item = T>,
    mut write_item: impl FnMut(&mut W, T) -> fmt::Result,
) -> fmt::Result {
    out.write_char('(')?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_item(out, item)?;
    }
    out.write_char(')')
}

fn write_polygon(out: &mut impl Write, poly: &Polygon, with_z: bool) -> fmt::Result {
    write_list(out, poly.rings(), |out, ring| write_seq(out, ring, with_z))
}

fn write_seq(out: &mut impl Write, pts: &[Coordinate], with_z: bool) -> fmt::Result {
    out.write_char('(')?;
    for (i, c) in pts.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_coord(out, c, with_z)?;
    }
    out.write_char(')')
}

fn write_coord(out: &mut impl Write, c: &Coordinate, with_z: bool) -> fmt::Result {
    write!(out, "{} {}", ordinate(c.x), ordinate(c.y))?;
    if with_z {
        write!(out, " {}", ordinate(c.z))?;
    }
    Ok(())
}

fn ordinate(v: f64) -> f64 {
    // Avoid writing "-0"
    if v == 0.0 {
        0.0
    } else {
        v
    }
}
