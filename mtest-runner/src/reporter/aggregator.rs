// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statistics gathered while a run progresses.

use crate::failure::TestOutcome;

/// Counters for a single run.
///
/// Every counter only ever grows. The runner updates them while holding the output lock, so the
/// counts seen by the reporter always agree with the progress lines printed so far.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// The number of tests selected for this run.
    pub initial_run_count: usize,

    /// The number of tests that have finished.
    pub executed: usize,

    /// The number of tests that finished without failures.
    pub passed: usize,

    /// The number of tests that recorded at least one failure.
    pub failed: usize,

    /// The number of tests that were stopped by a hard failure. A subset of `failed`.
    pub aborted: usize,

    /// The total number of failures recorded across all tests.
    pub total_failures: usize,
}

impl RunStats {
    /// Creates empty stats for a run of `initial_run_count` tests.
    pub fn new(initial_run_count: usize) -> Self {
        Self {
            initial_run_count,
            ..Self::default()
        }
    }

    /// Returns true if no test recorded a failure.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns true if every selected test has finished.
    pub fn is_complete(&self) -> bool {
        self.executed == self.initial_run_count
    }

    /// Merges a finished test into the counters and returns its one-based completion sequence
    /// number.
    pub(crate) fn on_test_finished(&mut self, outcome: &TestOutcome) -> usize {
        debug_assert!(
            self.executed < self.initial_run_count,
            "more tests finished than were selected"
        );
        self.executed += 1;
        if outcome.is_success() {
            self.passed += 1;
        } else {
            self.failed += 1;
            self.total_failures += outcome.failures().len();
        }
        if outcome.is_aborted() {
            self.aborted += 1;
        }
        self.executed
    }
}
