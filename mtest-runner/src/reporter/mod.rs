// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prints out and aggregates test execution statuses.
//!
//! The main structure in this module is [`TestReporter`].

mod aggregator;
mod displayer;
mod events;
mod helpers;

pub use aggregator::RunStats;
pub use displayer::{ReporterOutput, TestReporter, TestReporterBuilder};
pub use events::*;
