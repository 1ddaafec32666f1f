// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for overlay operations

use crate::geometry::Coordinate;
use thiserror::Error;

/// Structured failure information for overlay operations.
#[derive(Debug, Clone, Error)]
pub enum OverlayError {
    /// The noded arrangement or the labelled graph is not a valid planar
    /// subdivision at the chosen precision.
    #[error("Topology error: {message}{}", fmt_location(.location))]
    Topology {
        message: String,
        location: Option<Coordinate>,
    },

    #[error("Invalid precision scale: {scale}")]
    InvalidPrecision { scale: f64 },

    #[error("Unsupported dimension combination: {reason}")]
    UnsupportedDimension { reason: String },
}

impl OverlayError {
    pub fn topology(message: impl Into<String>) -> Self {
        OverlayError::Topology {
            message: message.into(),
            location: None,
        }
    }

    pub fn topology_at(message: impl Into<String>, location: Coordinate) -> Self {
        OverlayError::Topology {
            message: message.into(),
            location: Some(location),
        }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        OverlayError::UnsupportedDimension {
            reason: reason.into(),
        }
    }

    pub fn is_topology(&self) -> bool {
        matches!(self, OverlayError::Topology { .. })
    }
}

fn fmt_location(location: &Option<Coordinate>) -> String {
    match location {
        Some(c) => format!(" [ {} {} ]", c.x, c.y),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;
