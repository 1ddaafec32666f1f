// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Snap-rounding noder.
//!
//! Every vertex and every intersection point defines a hot pixel: the grid
//! cell centred on the rounded point. Each segment passing through a hot
//! pixel is snapped to the pixel centre. The result is fully noded on the
//! precision grid.

use super::index::SegmentIndex;
use super::{noded_substrings, Noder, SegmentString};
use crate::error::{OverlayError, Result};
use crate::geometry::{
    distance_point_segment, orientation_index, push_distinct, CoordKey, Coordinate, LineIntersector,
    PrecisionModel,
};
use ahash::AHashMap;
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};
use tracing::{debug, instrument};

/// Intersections closer than this fraction of a grid cell to a segment are
/// treated as nodes.
const NEARNESS_FACTOR: f64 = 100.0;

/// Half-width of a hot pixel in scaled units.
const PIXEL_TOLERANCE: f64 = 0.5;

/// A grid cell around a rounded point. The top and right sides are open.
#[derive(Debug, Clone)]
pub struct HotPixel {
    coord: Coordinate,
    scale: f64,
    hpx: f64,
    hpy: f64,
    is_node: bool,
}

impl HotPixel {
    /// `pt` must already be rounded to the grid.
    pub fn new(pt: Coordinate, scale: f64) -> Self {
        let (hpx, hpy) = if scale != 1.0 {
            (round_half_up(pt.x * scale), round_half_up(pt.y * scale))
        } else {
            (pt.x, pt.y)
        };
        Self {
            coord: pt,
            scale,
            hpx,
            hpy,
            is_node: false,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coord
    }

    pub fn is_node(&self) -> bool {
        self.is_node
    }

    pub fn set_to_node(&mut self) {
        self.is_node = true;
    }

    fn scaled(&self, v: f64) -> f64 {
        v * self.scale
    }

    /// True if `p` lies in the pixel (half-open).
    pub fn intersects_point(&self, p: &Coordinate) -> bool {
        let x = self.scaled(p.x);
        let y = self.scaled(p.y);
        x < self.hpx + PIXEL_TOLERANCE
            && x >= self.hpx - PIXEL_TOLERANCE
            && y < self.hpy + PIXEL_TOLERANCE
            && y >= self.hpy - PIXEL_TOLERANCE
    }

    /// True if segment `p0`-`p1` meets the pixel (half-open).
    pub fn intersects_segment(&self, p0: &Coordinate, p1: &Coordinate) -> bool {
        if self.scale == 1.0 {
            return self.intersects_scaled(p0.x, p0.y, p1.x, p1.y);
        }
        self.intersects_scaled(
            self.scaled(p0.x),
            self.scaled(p0.y),
            self.scaled(p1.x),
            self.scaled(p1.y),
        )
    }

    fn intersects_scaled(&self, p0x: f64, p0y: f64, p1x: f64, p1y: f64) -> bool {
        // orient the segment left to right
        let (px, py, qx, qy) = if p0x > p1x {
            (p1x, p1y, p0x, p0y)
        } else {
            (p0x, p0y, p1x, p1y)
        };

        let max_x = self.hpx + PIXEL_TOLERANCE;
        if px.min(qx) >= max_x {
            return false;
        }
        let min_x = self.hpx - PIXEL_TOLERANCE;
        if px.max(qx) < min_x {
            return false;
        }
        let max_y = self.hpy + PIXEL_TOLERANCE;
        if py.min(qy) >= max_y {
            return false;
        }
        let min_y = self.hpy - PIXEL_TOLERANCE;
        if py.max(qy) < min_y {
            return false;
        }

        // axis-parallel segments now meet the interior or a closed side
        if px == qx || py == qy {
            return true;
        }

        let p = Coordinate::new(px, py);
        let q = Coordinate::new(qx, qy);
        let orient = |x: f64, y: f64| orientation_index(&p, &q, &Coordinate::new(x, y));

        let orient_ul = orient(min_x, max_y);
        if orient_ul == 0 {
            // upward segment only touches the open top-left corner
            return py >= qy;
        }
        let orient_ur = orient(max_x, max_y);
        if orient_ur == 0 {
            return py <= qy;
        }
        if orient_ul != orient_ur {
            return true;
        }
        let orient_ll = orient(min_x, min_y);
        if orient_ll == 0 {
            return true;
        }
        if orient_ll != orient_ul {
            return true;
        }
        let orient_lr = orient(max_x, min_y);
        if orient_lr == 0 {
            return py >= qy;
        }
        if orient_ll != orient_lr {
            return true;
        }
        orient_lr != orient_ur
    }
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Hot pixels keyed by their rounded coordinate, with a spatial index built
/// once all pixels are known.
struct HotPixelIndex {
    pm: PrecisionModel,
    scale: f64,
    pixels: Vec<HotPixel>,
    lookup: AHashMap<CoordKey, usize>,
    tree: RTree<GeomWithData<[f64; 2], usize>>,
}

impl HotPixelIndex {
    fn new(pm: PrecisionModel) -> Self {
        Self {
            pm,
            scale: pm.scale(),
            pixels: Vec::new(),
            lookup: AHashMap::new(),
            tree: RTree::new(),
        }
    }

    /// Adds the pixel for `p`. A point whose pixel already exists is shared
    /// by more than one vertex or intersection, so that pixel becomes a node.
    fn add(&mut self, p: &Coordinate) -> usize {
        if let Some(idx) = self.find(p) {
            self.pixels[idx].set_to_node();
            return idx;
        }
        let rounded = self.pm.make_precise(p);
        let idx = self.pixels.len();
        self.pixels.push(HotPixel::new(rounded, self.scale));
        self.lookup.insert(rounded.key(), idx);
        idx
    }

    /// Index of the pixel containing `p`, if one exists.
    fn find(&self, p: &Coordinate) -> Option<usize> {
        self.lookup.get(&self.pm.make_precise(p).key()).copied()
    }

    /// True if `p` lies in a pixel which has been marked as a node.
    fn is_node_at(&self, p: &Coordinate) -> bool {
        self.find(p).map_or(false, |idx| self.pixels[idx].is_node())
    }

    fn add_nodes(&mut self, pts: &[Coordinate]) {
        for p in pts {
            let idx = self.add(p);
            self.pixels[idx].set_to_node();
        }
    }

    fn build(&mut self) {
        let items = self
            .pixels
            .iter()
            .enumerate()
            .map(|(i, hp)| GeomWithData::new([hp.coord.x, hp.coord.y], i))
            .collect();
        self.tree = RTree::bulk_load(items);
    }

    /// Pixels whose centre lies within one grid cell of the segment envelope.
    fn query(&self, p0: &Coordinate, p1: &Coordinate) -> Vec<usize> {
        let tol = 1.0 / self.scale;
        let aabb = AABB::from_corners(
            [p0.x.min(p1.x) - tol, p0.y.min(p1.y) - tol],
            [p0.x.max(p1.x) + tol, p0.y.max(p1.y) + tol],
        );
        let mut found: Vec<usize> = self
            .tree
            .locate_in_envelope(&aabb)
            .map(|item| item.data)
            .collect();
        found.sort_unstable();
        found
    }
}

/// Noder that snap-rounds all vertices and intersections to a fixed grid.
#[derive(Debug, Clone)]
pub struct SnapRoundingNoder {
    pm: PrecisionModel,
}

impl SnapRoundingNoder {
    pub fn new(pm: PrecisionModel) -> Result<Self> {
        pm.validate()?;
        if pm.is_floating() {
            return Err(OverlayError::InvalidPrecision { scale: 0.0 });
        }
        Ok(Self { pm })
    }

    /// Intersection points from a floating pass, plus vertices lying within
    /// the nearness tolerance of another segment. Nodes are also recorded on
    /// the input strings.
    fn add_intersection_pixels(&self, strings: &mut [SegmentString], index: &mut HotPixelIndex) {
        let nearness = 1.0 / self.pm.scale() / NEARNESS_FACTOR;
        let seg_index = SegmentIndex::build(strings, nearness);
        let mut li = LineIntersector::new();
        let mut found: Vec<(usize, usize, Coordinate)> = Vec::new();
        let mut int_pts: Vec<Coordinate> = Vec::new();

        for ((s0, i0), (s1, i1)) in seg_index.candidate_pairs(strings) {
            let (p00, p01) = strings[s0].segment(i0);
            let (p10, p11) = strings[s1].segment(i1);
            li.compute_intersection(p00, p01, p10, p11);
            if li.has_intersection() && li.is_interior_intersection() {
                for k in 0..li.intersection_num() {
                    let pt = li.intersection(k);
                    int_pts.push(pt);
                    found.push((s0, i0, pt));
                    found.push((s1, i1, pt));
                }
                continue;
            }
            let near = [
                (*p00, s1, i1, *p10, *p11),
                (*p01, s1, i1, *p10, *p11),
                (*p10, s0, i0, *p00, *p01),
                (*p11, s0, i0, *p00, *p01),
            ];
            for (p, si, seg, a, b) in near {
                if p.distance(&a) < nearness || p.distance(&b) < nearness {
                    continue;
                }
                if distance_point_segment(&p, &a, &b) < nearness {
                    int_pts.push(p);
                    found.push((si, seg, p));
                }
            }
        }

        for (si, seg, pt) in found {
            strings[si].add_intersection(pt, seg);
        }
        index.add_nodes(&int_pts);
        debug!(intersections = int_pts.len(), "snap-rounding intersection pixels");
    }

    fn round(&self, pts: &[Coordinate]) -> Vec<Coordinate> {
        let mut out = Vec::with_capacity(pts.len());
        for p in pts {
            push_distinct(&mut out, self.pm.make_precise(p));
        }
        out
    }

    /// Rounds a string and snaps each of its segments to the hot pixels it
    /// passes through.
    fn compute_segment_snaps(
        &self,
        ss: &SegmentString,
        index: &mut HotPixelIndex,
    ) -> Option<SegmentString> {
        let pts = ss.noded_coordinates();
        let rounded = self.round(&pts);
        if rounded.len() <= 1 {
            return None;
        }
        let mut snapped = SegmentString::new(rounded, *ss.source());
        let mut snap_index = 0;
        for i in 0..pts.len().saturating_sub(1) {
            let curr = snapped.coordinates()[snap_index];
            let p1 = pts[i + 1];
            if self.pm.make_precise(&p1).equals_2d(&curr) {
                continue;
            }
            self.snap_segment(&pts[i], &p1, &mut snapped, snap_index, index);
            snap_index += 1;
        }
        Some(snapped)
    }

    fn snap_segment(
        &self,
        p0: &Coordinate,
        p1: &Coordinate,
        ss: &mut SegmentString,
        segment_index: usize,
        index: &mut HotPixelIndex,
    ) {
        for idx in index.query(p0, p1) {
            let hp = &index.pixels[idx];
            // a vertex pixel which is not yet a node is the source of this
            // segment's endpoint; vertex noding adds it later if needed
            if !hp.is_node() && (hp.intersects_point(p0) || hp.intersects_point(p1)) {
                continue;
            }
            if hp.intersects_segment(p0, p1) {
                ss.add_intersection(hp.coordinate(), segment_index);
                index.pixels[idx].set_to_node();
            }
        }
    }

    /// Nodes interior vertices which coincide with node pixels.
    fn add_vertex_node_snaps(&self, ss: &mut SegmentString, index: &HotPixelIndex) {
        let pts = ss.coordinates().to_vec();
        for i in 1..pts.len().saturating_sub(1) {
            let p = pts[i];
            if index.is_node_at(&p) {
                ss.add_intersection(p, i);
            }
        }
    }
}

impl Noder for SnapRoundingNoder {
    #[instrument(skip(self, strings), fields(strings = strings.len(), scale = self.pm.scale()))]
    fn node(&self, mut strings: Vec<SegmentString>) -> Result<Vec<SegmentString>> {
        let mut index = HotPixelIndex::new(self.pm);
        self.add_intersection_pixels(&mut strings, &mut index);
        for ss in &strings {
            for p in ss.coordinates() {
                index.add(p);
            }
        }
        index.build();
        debug!(pixels = index.pixels.len(), "hot pixels indexed");

        let mut snapped: Vec<SegmentString> = strings
            .iter()
            .filter_map(|ss| self.compute_segment_snaps(ss, &mut index))
            .collect();
        for ss in snapped.iter_mut() {
            self.add_vertex_node_snaps(ss, &index);
        }
        Ok(noded_substrings(&snapped))
    }

    fn name(&self) -> &'static str {
        "snap-rounding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noding::{check_noded, EdgeSource};

    fn line(coords: &[(f64, f64)]) -> SegmentString {
        SegmentString::new(
            coords.iter().map(|&(x, y)| Coordinate::new(x, y)).collect(),
            EdgeSource::line(0),
        )
    }

    #[test]
    fn test_hot_pixel_half_open() {
        let hp = HotPixel::new(Coordinate::new(1.0, 1.0), 1.0);
        assert!(hp.intersects_point(&Coordinate::new(0.5, 0.5)));
        assert!(!hp.intersects_point(&Coordinate::new(1.5, 1.0)));
        assert!(!hp.intersects_point(&Coordinate::new(1.0, 1.5)));
        assert!(hp.intersects_segment(&Coordinate::new(0.0, 1.0), &Coordinate::new(2.0, 1.0)));
        assert!(!hp.intersects_segment(&Coordinate::new(0.0, 1.5), &Coordinate::new(2.0, 1.5)));
        assert!(hp.intersects_segment(&Coordinate::new(0.0, 0.0), &Coordinate::new(2.0, 2.0)));
        assert!(!hp.intersects_segment(&Coordinate::new(0.0, 3.0), &Coordinate::new(3.0, 0.0)));
    }

    #[test]
    fn test_crossing_snapped_to_grid() {
        let pm = PrecisionModel::fixed(1.0).unwrap();
        let strings = vec![line(&[(0.0, 0.0), (3.0, 1.0)]), line(&[(0.0, 1.0), (3.0, 0.0)])];
        let noded = SnapRoundingNoder::new(pm).unwrap().node(strings).unwrap();
        assert_eq!(noded.len(), 4);
        for ss in &noded {
            for c in ss.coordinates() {
                assert_eq!(c.x, c.x.round());
                assert_eq!(c.y, c.y.round());
            }
        }
        assert!(check_noded(&noded).is_ok());
    }

    #[test]
    fn test_segment_through_vertex_pixel_is_noded() {
        let pm = PrecisionModel::fixed(1.0).unwrap();
        let strings = vec![
            line(&[(0.0, 0.0), (10.0, 0.2)]),
            line(&[(5.0, 0.0), (5.0, 5.0)]),
        ];
        let noded = SnapRoundingNoder::new(pm).unwrap().node(strings).unwrap();
        assert_eq!(noded.len(), 3);
        assert!(check_noded(&noded).is_ok());
    }

    #[test]
    fn test_shared_vertex_becomes_node() {
        let pm = PrecisionModel::fixed(1.0).unwrap();
        let strings = vec![
            line(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]),
            line(&[(5.0, 0.0), (5.0, 5.0)]),
        ];
        let noded = SnapRoundingNoder::new(pm).unwrap().node(strings).unwrap();
        assert_eq!(noded.len(), 3);
        assert_eq!(
            noded[0].coordinates(),
            &[Coordinate::new(0.0, 0.0), Coordinate::new(5.0, 0.0)]
        );
    }

    #[test]
    fn test_pixel_index_marks_repeated_points_as_nodes() {
        let mut index = HotPixelIndex::new(PrecisionModel::fixed(1.0).unwrap());
        let first = index.add(&Coordinate::new(2.2, 3.1));
        assert!(!index.is_node_at(&Coordinate::new(2.0, 3.0)));
        let again = index.add(&Coordinate::new(1.9, 2.8));
        assert_eq!(first, again);
        assert!(index.is_node_at(&Coordinate::new(2.0, 3.0)));
        assert!(!index.is_node_at(&Coordinate::new(7.0, 7.0)));
    }

    #[test]
    fn test_rejects_floating_model() {
        assert!(SnapRoundingNoder::new(PrecisionModel::Floating).is_err());
    }
}
