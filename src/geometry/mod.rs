// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - planar geometry model and robust primitives

mod coordinate;
mod envelope;
mod intersector;
mod locate;
mod model;
mod precision;
pub mod robust_predicates;

pub use coordinate::{
    close_ring, is_closed, point_not_in_list, push_distinct, remove_repeated, CoordKey, Coordinate,
};
pub use envelope::{segment_envelope_contains, segments_envelopes_intersect, Envelope};
pub use intersector::{distance_point_segment, interpolate_z, IntersectionKind, LineIntersector};
pub use locate::{
    is_on_line, locate_in_area, locate_in_polygon, locate_in_ring, locate_on_lines, Location,
    RayCrossingCounter,
};
pub use model::{build_geometry, compare_coords, line_length, Dimension, Geometry, Polygon};
pub use precision::PrecisionModel;
pub use robust_predicates::{is_ccw, orientation_index, signed_area, Orientation};
