// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Automatic scale selection.
//!
//! A fixed grid is only robust while scaled coordinates keep enough
//! significant digits in a double. The safe scale bounds the grid by the
//! largest coordinate magnitude; the inherent scale is the finest decimal
//! precision already present in the inputs.

use crate::error::Result;
use crate::geometry::{Geometry, PrecisionModel};

/// Significant decimal digits kept when scaling coordinates.
pub const MAX_ROBUST_DP_DIGITS: i32 = 14;

/// Largest power-of-ten scale that keeps `value` within the robust digits.
pub fn safe_scale_value(value: f64) -> f64 {
    let value = value.abs();
    let value = if value > 0.0 && value.is_finite() { value } else { 1.0 };
    let magnitude = (value.log10() + 1.0).floor() as i32;
    10f64.powi(MAX_ROBUST_DP_DIGITS - magnitude)
}

/// Safe scale for one or two operands, from their largest absolute bound.
pub fn safe_scale(a: &Geometry, b: Option<&Geometry>) -> f64 {
    let mut max_bound = a.envelope().max_abs_bound();
    if let Some(b) = b {
        max_bound = max_bound.max(b.envelope().max_abs_bound());
    }
    safe_scale_value(max_bound)
}

/// Number of decimal places in the shortest representation of `value`.
fn number_of_decimals(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let text = value.to_string();
    match text.split_once('.') {
        Some((_, frac)) => frac.trim_end_matches('0').len() as i32,
        None => 0,
    }
}

/// Scale that represents every ordinate of the operands exactly.
pub fn inherent_scale(a: &Geometry, b: Option<&Geometry>) -> f64 {
    let mut decimals = 0;
    let mut visit = |g: &Geometry| {
        g.for_each_coordinate(&mut |c| {
            decimals = decimals.max(number_of_decimals(c.x)).max(number_of_decimals(c.y));
        })
    };
    visit(a);
    if let Some(b) = b {
        visit(b);
    }
    10f64.powi(decimals)
}

/// The inherent scale, capped by the safe scale.
pub fn robust_scale(a: &Geometry, b: Option<&Geometry>) -> f64 {
    let inherent = inherent_scale(a, b);
    let safe = safe_scale(a, b);
    if safe < inherent {
        safe
    } else {
        inherent
    }
}

/// Fixed precision model at the robust scale of the operands.
pub fn robust_precision_model(a: &Geometry, b: Option<&Geometry>) -> Result<PrecisionModel> {
    PrecisionModel::fixed(robust_scale(a, b))
}
