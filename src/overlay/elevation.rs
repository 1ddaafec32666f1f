// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Elevation model for carrying Z through an overlay.
//!
//! Z is an attribute, not part of the topology. Result vertices copied from
//! the inputs keep their Z, intersection vertices get Z interpolated from the
//! segments, and any vertex still missing Z takes the mean Z of the grid
//! cell it falls in.

use crate::geometry::{Coordinate, Envelope, Geometry};

const DEFAULT_CELL_NUM: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    sum: f64,
    count: usize,
}

impl Cell {
    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Coarse grid of mean Z values over the extent of the operands.
#[derive(Debug, Clone)]
pub struct ElevationModel {
    extent: Envelope,
    num_x: usize,
    num_y: usize,
    cell_width: f64,
    cell_height: f64,
    cells: Vec<Cell>,
    has_z: bool,
    average_z: f64,
}

impl ElevationModel {
    pub fn create(a: &Geometry, b: Option<&Geometry>) -> Self {
        let mut extent = a.envelope();
        if let Some(b) = b {
            extent.expand_to_include_env(&b.envelope());
        }
        let mut model = Self::new(extent, DEFAULT_CELL_NUM, DEFAULT_CELL_NUM);
        model.add(a);
        if let Some(b) = b {
            model.add(b);
        }
        model.compute_average();
        model
    }

    fn new(extent: Envelope, num_x: usize, num_y: usize) -> Self {
        let cell_width = extent.width() / num_x as f64;
        let cell_height = extent.height() / num_y as f64;
        let num_x = if cell_width > 0.0 { num_x } else { 1 };
        let num_y = if cell_height > 0.0 { num_y } else { 1 };
        Self {
            extent,
            num_x,
            num_y,
            cell_width,
            cell_height,
            cells: vec![Cell::default(); num_x * num_y],
            has_z: false,
            average_z: f64::NAN,
        }
    }

    fn add(&mut self, geom: &Geometry) {
        for c in geom.coordinates().iter().filter(|c| c.has_z()) {
            self.has_z = true;
            let idx = self.cell_index(c.x, c.y);
            self.cells[idx].sum += c.z;
            self.cells[idx].count += 1;
        }
    }

    fn compute_average(&mut self) {
        let means: Vec<f64> = self.cells.iter().filter_map(|c| c.mean()).collect();
        if !means.is_empty() {
            self.average_z = means.iter().sum::<f64>() / means.len() as f64;
        }
    }

    pub fn has_z(&self) -> bool {
        self.has_z
    }

    fn cell_xy(&self, x: f64, y: f64) -> (usize, usize) {
        let clamp = |v: f64, n: usize| -> usize {
            if n <= 1 || !v.is_finite() {
                return 0;
            }
            (v.max(0.0) as usize).min(n - 1)
        };
        let ix = clamp((x - self.extent.min_x) / self.cell_width, self.num_x);
        let iy = clamp((y - self.extent.min_y) / self.cell_height, self.num_y);
        (ix, iy)
    }

    fn cell_index(&self, x: f64, y: f64) -> usize {
        let (ix, iy) = self.cell_xy(x, y);
        iy * self.num_x + ix
    }

    /// Mean Z at a location: its cell, else the nearest populated cell,
    /// else the overall mean. `NaN` if no input had Z.
    pub fn z_at(&self, x: f64, y: f64) -> f64 {
        let (ix, iy) = self.cell_xy(x, y);
        if let Some(z) = self.cells[iy * self.num_x + ix].mean() {
            return z;
        }
        let mut best: Option<(usize, f64)> = None;
        for cy in 0..self.num_y {
            for cx in 0..self.num_x {
                let Some(z) = self.cells[cy * self.num_x + cx].mean() else {
                    continue;
                };
                let dist = ix.abs_diff(cx).pow(2) + iy.abs_diff(cy).pow(2);
                if best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, z));
                }
            }
        }
        best.map(|(_, z)| z).unwrap_or(self.average_z)
    }

    /// Fills in missing Z on every vertex. Geometries are returned unchanged
    /// when the inputs carried no Z.
    pub fn populate_z(&self, geom: &Geometry) -> Geometry {
        if !self.has_z {
            return geom.clone();
        }
        geom.map_coordinates(&|c: &Coordinate| {
            if c.has_z() {
                *c
            } else {
                Coordinate::new_z(c.x, c.y, self.z_at(c.x, c.y))
            }
        })
    }
}
