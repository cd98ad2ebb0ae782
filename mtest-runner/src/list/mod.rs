// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support for registering tests and building the list of tests for a run.
//!
//! The main data structures in this module are:
//! * [`TestRegistry`], every test known to the binary, built once before any test runs.
//! * [`TestList`], the ordered tests chosen for one run, along with their outcomes.

mod output_format;
mod registry;
mod test_list;

pub use output_format::*;
pub use registry::*;
pub use test_list::*;
