// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Build a parallel test binary out of a registry of in-process tests.
//!
//! Tests are registered by name into a [`TestRegistry`], then handed to [`run_main`], which parses
//! the command line, runs the selected tests across a pool of worker threads and returns the exit
//! code for the process.
//!
//! ```no_run
//! use mtest::{TestContext, TestRegistry, TestResult, expect_eq, require};
//!
//! fn addition(cx: &mut TestContext) -> TestResult {
//!     expect_eq!(cx, 2 + 2, 4);
//!     require!(cx, 1 < 2);
//!     Ok(())
//! }
//!
//! fn main() {
//!     let mut registry = TestRegistry::new();
//!     registry.register("addition", addition).expect("name is unique");
//!     std::process::exit(mtest::run_main(&registry));
//! }
//! ```
//!
//! # Command-line options
//!
//! * `--list` prints every registered test name and exits.
//! * `--threads <N>` (or the `MTEST_TEST_THREADS` environment variable) sets the worker count.
//! * `--skip <PATTERN>` skips tests whose names contain the pattern.
//! * Positional arguments restrict the run to the named tests. Naming exactly one test prints
//!   only the final summary.
//!
//! Exit codes are documented in [`MtestExitCode`].

mod dispatch;
mod errors;
mod output;

pub use dispatch::{MtestApp, run_main, run_main_with_args};
pub use errors::ExpectedError;
pub use mtest_metadata::MtestExitCode;
pub use mtest_runner::{
    expect, expect_eq, expect_ge, expect_gt, expect_le, expect_lt, expect_ne, expect_op,
    failure::{TestContext, TestResult},
    list::TestRegistry,
    require, require_eq, require_ge, require_gt, require_le, require_lt, require_ne, require_op,
};
pub use output::{OutputWriter, StderrStyles};
