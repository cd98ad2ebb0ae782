// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Documented exit codes and machine-readable output for mtest test binaries.
//!
//! Test binaries built on the `mtest` harness can list their tests in a JSON format with
//! `--list --message-format json`. This crate contains the data structures for that output, so
//! that other tools can consume it without depending on the runner itself.

mod exit_codes;
mod test_list;

pub use exit_codes::*;
pub use test_list::*;
