// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events produced during a test run.

use super::RunStats;
use crate::{
    failure::TestOutcome,
    list::{TestInstance, TestList},
};
use chrono::{DateTime, Local};
use std::time::Duration;

/// A test event.
///
/// Events are produced by a [`TestRunner`](crate::runner::TestRunner) and consumed by a
/// [`TestReporter`](super::TestReporter).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum TestEvent<'a> {
    /// The test run started.
    RunStarted {
        /// The list of tests that will be run.
        test_list: &'a TestList<'a>,

        /// The number of workers executing tests.
        worker_count: usize,

        /// The wall-clock time at which the run started.
        start_time: DateTime<Local>,
    },

    /// A test finished running.
    TestFinished {
        /// The index of the worker that ran the test.
        worker: usize,

        /// The one-based completion sequence number of this test.
        sequence: usize,

        /// The test that finished.
        test_instance: &'a TestInstance<'a>,

        /// The outcome of the test.
        outcome: &'a TestOutcome,

        /// Statistics for the run so far, including this test.
        run_stats: RunStats,
    },

    /// A periodic snapshot of what each worker is doing.
    StatusSnapshot {
        /// One entry per worker, in worker order.
        workers: &'a [WorkerStatus<'a>],
    },

    /// The test run finished.
    RunFinished {
        /// The list of tests that were run, with their outcomes.
        test_list: &'a TestList<'a>,

        /// The wall-clock time the run took.
        elapsed: Duration,

        /// Statistics for the run.
        run_stats: RunStats,
    },
}

/// What a worker was doing when a status snapshot was taken.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorkerStatus<'a> {
    /// Waiting for an assignment.
    Idle,

    /// Running the named test.
    Running(&'a str),

    /// Told to stop and about to be joined.
    Joining,
}
