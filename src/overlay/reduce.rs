// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Precision reduction through the overlay graph.
//!
//! Rounding coordinates alone can make rings self-intersect or collapse.
//! Reducing through a unary union snap-rounds every vertex and intersection,
//! drops collapsed components and rebuilds valid ring topology.

use super::{overlay_points, Overlay, OverlayOp, OverlayOptions};
use crate::error::Result;
use crate::geometry::{Dimension, Geometry, PrecisionModel};
use tracing::instrument;

/// Rounds a geometry to a precision model, keeping it topologically valid.
/// Polygonal inputs yield polygonal results; components which collapse are
/// removed. Reducing twice with the same model gives the same result.
#[instrument(skip(geom), fields(kind = geom.type_name()))]
pub fn reduce_precision(geom: &Geometry, pm: PrecisionModel) -> Result<Geometry> {
    pm.validate()?;
    if geom.is_empty() {
        return Ok(Geometry::empty(geom.dimension()));
    }
    let dim = geom.dimension();
    if dim == Dimension::Point {
        let empty = Geometry::empty(Dimension::Point);
        return Ok(overlay_points(OverlayOp::Union, geom, &empty, &pm));
    }
    let options = OverlayOptions::with_precision(pm);
    Overlay::unary(geom, options)
        .area_result_only(dim == Dimension::Area)
        .execute()
}
