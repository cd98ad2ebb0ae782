// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for a test run.
//!
//! Worker count is layered: the host's CPU count by default, then the
//! [`TEST_THREADS_ENV`] environment variable, then the value passed on the command line.

mod test_threads;

pub use test_threads::*;
