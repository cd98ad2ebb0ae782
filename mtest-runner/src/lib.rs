// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [mtest](https://crates.io/crates/mtest), a parallel in-process test
//! runner.
//!
//! A run flows through these pieces in order:
//!
//! 1. [`list::TestRegistry`] holds every test known to the binary.
//! 2. [`test_filter::TestFilterBuilder`] turns explicit names and skip patterns into a
//!    [`list::TestList`].
//! 3. [`runner::TestRunner`] executes the list on a pool of worker threads.
//! 4. [`reporter::TestReporter`] renders progress and the final summary.
//!
//! Test bodies report defects through [`failure::TestContext`], usually via the [`expect!`] and
//! [`require!`] families of macros.

pub mod config;
pub mod errors;
pub mod failure;
mod helpers;
pub mod list;
pub mod reporter;
pub mod runner;
pub mod test_filter;
mod time;

pub use helpers::plural;
