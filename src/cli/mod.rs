// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem: batch case runner and terminal reporting

pub mod reporter;
pub mod runner;

pub use reporter::Reporter;
pub use runner::{BatchCase, BatchReport, BatchRunner, CaseOperation, CaseOutcome};
