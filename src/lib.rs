// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Overlay
//!
//! A robust 2-D boolean overlay engine for planar vector geometries.
//! Computes intersection, union, difference and symmetric difference of
//! points, lines and polygons, plus unary union, coverage union and
//! precision reduction, using snap-rounding noding on a fixed grid.
//!
//! ```
//! use polyframe_overlay::{io::parse_wkt, union};
//!
//! let a = parse_wkt("POLYGON((0 0,0 10,10 10,10 0,0 0))").unwrap();
//! let b = parse_wkt("POLYGON((5 5,5 15,15 15,15 5,5 5))").unwrap();
//! let merged = union(&a, &b).unwrap();
//! assert_eq!(merged.area(), 175.0);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod noding;
pub mod overlay;
pub mod union;

pub use config::OverlayConfig;
pub use error::{OverlayError, Result};
pub use geometry::{Coordinate, Dimension, Geometry, Location, Polygon, PrecisionModel};
pub use io::{parse_wkt, to_wkt};
pub use noding::Noder;
pub use overlay::{
    difference, intersection, overlay, overlay_with, reduce_precision, sym_difference, union,
    Overlay, OverlayOp, OverlayOptions,
};
pub use union::{coverage_union, unary_union};
