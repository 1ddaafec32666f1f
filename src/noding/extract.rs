// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Noder for inputs that are already noded, such as polygonal coverages

use super::{Noder, SegmentString};
use crate::error::Result;

/// Splits every string into single segments without searching for
/// intersections. Only valid when the input is known to be fully noded.
#[derive(Debug, Clone, Default)]
pub struct SegmentExtractingNoder;

impl SegmentExtractingNoder {
    pub fn new() -> Self {
        Self
    }
}

impl Noder for SegmentExtractingNoder {
    fn node(&self, strings: Vec<SegmentString>) -> Result<Vec<SegmentString>> {
        let mut out = Vec::new();
        for ss in &strings {
            for i in 0..ss.num_segments() {
                let (a, b) = ss.segment(i);
                out.push(SegmentString::new(vec![*a, *b], *ss.source()));
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "segment-extracting"
    }
}
