// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch union - dissolving many geometries in one noding pass

mod coverage;
mod unary;

pub use coverage::coverage_union;
pub use unary::{unary_union, union_polygons};
