// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - WKT reading and writing

mod wkt_reader;
mod wkt_writer;

pub use wkt_reader::{parse_wkt, read_wkt_file};
pub use wkt_writer::to_wkt;
