// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Extraction and noding of operand edges.
//!
//! Rings and lines of both operands become segment strings tagged with their
//! source topology. Against a clipping envelope, rings are clipped and long
//! lines limited before noding. The noded strings become [`Edge`]s.

use super::clip::{LineLimiter, RingClipper};
use super::edge::Edge;
use crate::error::{OverlayError, Result};
use crate::geometry::{is_ccw, remove_repeated, Coordinate, Envelope, Geometry, Polygon};
use crate::noding::{EdgeSource, Noder, SegmentString};
use tracing::{debug, instrument};

/// Lines with at most this many points are never limited.
const MIN_LIMIT_PTS: usize = 20;

pub struct EdgeNodingBuilder<'n> {
    noder: &'n dyn Noder,
    clip_env: Option<Envelope>,
    strings: Vec<SegmentString>,
    has_edges: [bool; 2],
}

impl<'n> EdgeNodingBuilder<'n> {
    pub fn new(noder: &'n dyn Noder) -> Self {
        Self {
            noder,
            clip_env: None,
            strings: Vec::new(),
            has_edges: [false; 2],
        }
    }

    pub fn set_clip_envelope(&mut self, env: Envelope) {
        self.clip_env = Some(env);
    }

    /// Whether an operand produced any non-collapsed edge.
    pub fn has_edges_for(&self, index: usize) -> bool {
        self.has_edges[index]
    }

    /// Nodes the edges of both operands together.
    #[instrument(skip_all, fields(noder = self.noder.name()))]
    pub fn build(&mut self, a: &Geometry, b: Option<&Geometry>) -> Result<Vec<Edge>> {
        self.add(a, 0)?;
        if let Some(b) = b {
            self.add(b, 1)?;
        }
        let strings = std::mem::take(&mut self.strings);
        debug!(strings = strings.len(), "noding input");
        let noded = self.noder.node(strings)?;
        Ok(self.create_edges(&noded))
    }

    fn create_edges(&mut self, noded: &[SegmentString]) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(noded.len());
        for ss in noded {
            if Edge::is_collapsed(ss.coordinates()) {
                continue;
            }
            self.has_edges[ss.source().index] = true;
            edges.push(Edge::from_segment_string(ss));
        }
        edges
    }

    fn add(&mut self, geom: &Geometry, index: usize) -> Result<()> {
        if geom.is_empty() || self.is_clipped_completely(&geom.envelope()) {
            return Ok(());
        }
        match geom {
            Geometry::Polygon(poly) => self.add_polygon(poly, index),
            Geometry::MultiPolygon(polys) => polys.iter().for_each(|p| self.add_polygon(p, index)),
            Geometry::LineString(line) => self.add_line(line, index),
            Geometry::MultiLineString(lines) => lines.iter().for_each(|l| self.add_line(l, index)),
            Geometry::GeometryCollection(geoms) => {
                let expected = geom.dimension();
                for g in geoms.iter().filter(|g| !g.is_empty()) {
                    if g.dimension() != expected {
                        return Err(OverlayError::unsupported("Overlay input is mixed-dimension"));
                    }
                    self.add(g, index)?;
                }
            }
            // points are handled by the point overlays
            Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        }
        Ok(())
    }

    fn add_polygon(&mut self, poly: &Polygon, index: usize) {
        if poly.is_empty() {
            return;
        }
        self.add_ring(&poly.shell, false, index);
        for hole in &poly.holes {
            self.add_ring(hole, true, index);
        }
    }

    fn add_ring(&mut self, ring: &[Coordinate], is_hole: bool, index: usize) {
        if ring.is_empty() {
            return;
        }
        let env = Envelope::from_coordinates(ring);
        if self.is_clipped_completely(&env) {
            return;
        }
        let pts = match self.clip_env {
            Some(clip) if !clip.covers(&env) => RingClipper::new(clip).clip(ring),
            _ => remove_repeated(ring),
        };
        if pts.len() < 2 {
            return;
        }
        let depth_delta = depth_delta(ring, is_hole);
        self.strings
            .push(SegmentString::new(pts, EdgeSource::area(index, depth_delta, is_hole)));
    }

    fn add_line(&mut self, line: &[Coordinate], index: usize) {
        if line.is_empty() {
            return;
        }
        let env = Envelope::from_coordinates(line);
        if self.is_clipped_completely(&env) {
            return;
        }
        match self.clip_env {
            Some(clip) if line.len() > MIN_LIMIT_PTS && !clip.covers(&env) => {
                for section in LineLimiter::new(clip).limit(line) {
                    self.add_line_section(section, index);
                }
            }
            _ => self.add_line_section(remove_repeated(line), index),
        }
    }

    fn add_line_section(&mut self, pts: Vec<Coordinate>, index: usize) {
        if pts.len() < 2 {
            return;
        }
        self.strings.push(SegmentString::new(pts, EdgeSource::line(index)));
    }

    fn is_clipped_completely(&self, env: &Envelope) -> bool {
        self.clip_env.map_or(false, |clip| clip.disjoint(env))
    }
}

/// Depth change across a ring edge in ring direction: +1 when the interior
/// is on the right (clockwise shells, counter-clockwise holes).
pub fn depth_delta(ring: &[Coordinate], is_hole: bool) -> i32 {
    let ccw = is_ccw(ring);
    let oriented = if is_hole { ccw } else { !ccw };
    if oriented {
        1
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noding::FloatingNoder;

    fn ring(coords: &[(f64, f64)]) -> Vec<Coordinate> {
        coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    fn square(x0: f64, y0: f64, size: f64) -> Geometry {
        Geometry::Polygon(Polygon::new(
            ring(&[(x0, y0), (x0, y0 + size), (x0 + size, y0 + size), (x0 + size, y0), (x0, y0)]),
            vec![],
        ))
    }

    #[test]
    fn test_depth_delta_orientation() {
        let cw = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        let ccw: Vec<Coordinate> = cw.iter().rev().copied().collect();
        assert_eq!(depth_delta(&cw, false), 1);
        assert_eq!(depth_delta(&ccw, false), -1);
        assert_eq!(depth_delta(&ccw, true), 1);
    }

    #[test]
    fn test_overlapping_squares_are_noded() {
        let noder = FloatingNoder::new();
        let mut builder = EdgeNodingBuilder::new(&noder);
        let edges = builder.build(&square(0.0, 0.0, 10.0), Some(&square(5.0, 5.0, 10.0))).unwrap();
        // each ring is split at its two crossing points and its start
        assert_eq!(edges.len(), 6);
        assert!(builder.has_edges_for(0));
        assert!(builder.has_edges_for(1));
    }

    #[test]
    fn test_disjoint_ring_is_skipped_by_clip() {
        let noder = FloatingNoder::new();
        let mut builder = EdgeNodingBuilder::new(&noder);
        builder.set_clip_envelope(Envelope::new(0.0, 1.0, 0.0, 1.0));
        let edges = builder.build(&square(0.0, 0.0, 1.0), Some(&square(50.0, 50.0, 1.0))).unwrap();
        assert_eq!(edges.len(), 1);
        assert!(!builder.has_edges_for(1));
    }

    #[test]
    fn test_mixed_collection_is_rejected() {
        let noder = FloatingNoder::new();
        let mut builder = EdgeNodingBuilder::new(&noder);
        let mixed = Geometry::GeometryCollection(vec![
            square(0.0, 0.0, 1.0),
            Geometry::LineString(ring(&[(0.0, 0.0), (5.0, 5.0)])),
        ]);
        let err = builder.build(&mixed, None).unwrap_err();
        assert!(matches!(err, OverlayError::UnsupportedDimension { .. }));
    }
}
