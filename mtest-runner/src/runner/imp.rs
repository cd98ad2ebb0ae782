// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{dispatcher, status, worker};
use crate::{
    config::TestThreads,
    errors::{NumCpusError, WriteEventError},
    helpers::lock_ignore_poison,
    list::TestList,
    reporter::{RunStats, TestEvent, TestReporter},
    time::stopwatch,
};
use std::{
    panic,
    sync::{Mutex, PoisonError},
    thread,
    time::Duration,
};
use tracing::{debug, warn};

/// How long an idle worker sleeps before checking its slot again. The dispatcher also waits this
/// long when every worker is busy.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(10);

/// How often the status line is redrawn.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(250);

/// Test runner options.
#[derive(Debug, Default)]
pub struct TestRunnerBuilder {
    test_threads: Option<TestThreads>,
    backoff: Option<Duration>,
    status_interval: Option<Duration>,
    status_line: bool,
}

impl TestRunnerBuilder {
    /// Sets the number of tests to run simultaneously.
    pub fn set_test_threads(&mut self, test_threads: TestThreads) -> &mut Self {
        self.test_threads = Some(test_threads);
        self
    }

    /// Sets the polling interval used by idle workers and by the dispatcher.
    pub fn set_backoff(&mut self, backoff: Duration) -> &mut Self {
        self.backoff = Some(backoff);
        self
    }

    /// Sets how often the status line is redrawn.
    pub fn set_status_interval(&mut self, interval: Duration) -> &mut Self {
        self.status_interval = Some(interval);
        self
    }

    /// Sets whether a live status line is shown. It is never shown for selected runs.
    pub fn set_status_line(&mut self, status_line: bool) -> &mut Self {
        self.status_line = status_line;
        self
    }

    /// Creates a new test runner.
    pub fn build<'a>(&self, test_list: &'a TestList<'a>) -> Result<TestRunner<'a>, NumCpusError> {
        let worker_count = self.test_threads.unwrap_or_default().compute()?;
        let status_line = self.status_line && !test_list.mode().is_selected();
        debug!(worker_count, status_line, "built test runner");

        Ok(TestRunner {
            test_list,
            worker_count,
            backoff: self.backoff.unwrap_or(DEFAULT_BACKOFF),
            status_interval: self.status_interval.unwrap_or(DEFAULT_STATUS_INTERVAL),
            status_line,
        })
    }
}

/// Runs the tests in a [`TestList`] across a pool of worker threads.
#[derive(Debug)]
pub struct TestRunner<'a> {
    test_list: &'a TestList<'a>,
    worker_count: usize,
    backoff: Duration,
    status_interval: Duration,
    status_line: bool,
}

impl<'a> TestRunner<'a> {
    /// Returns the number of workers this runner uses.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Executes every test in the list, reporting events to the given reporter.
    ///
    /// Returns the statistics for the run once every worker has been joined. If writing to the
    /// reporter fails, the run still completes and the first error is returned instead.
    ///
    /// # Panics
    ///
    /// If a test body panics, the remaining workers are stopped once their current test finishes
    /// and the panic is resumed on the calling thread.
    pub fn execute(&self, reporter: &mut TestReporter<'_>) -> Result<RunStats, WriteEventError> {
        let stopwatch = stopwatch();
        let cx = RunContext {
            test_list: self.test_list,
            slots: (0..self.worker_count)
                .map(|_| Mutex::new(Slot::Idle))
                .collect(),
            output: Mutex::new(OutputState {
                reporter,
                stats: RunStats::new(self.test_list.run_count()),
                first_error: None,
            }),
            backoff: self.backoff,
            status_interval: self.status_interval,
        };

        cx.report(TestEvent::RunStarted {
            test_list: self.test_list,
            worker_count: self.worker_count,
            start_time: stopwatch.start_time(),
        });

        let result = thread::scope(|scope| {
            let cx = &cx;
            let handles: Vec<_> = (0..self.worker_count)
                .map(|index| scope.spawn(move || worker::run(cx, index)))
                .collect();
            let status_handle = self
                .status_line
                .then(|| scope.spawn(move || status::run(cx)));

            let result = dispatcher::run(cx, handles);

            if let Some(handle) = status_handle {
                // The status thread only reads shared state, so a panic there is not fatal.
                if handle.join().is_err() {
                    warn!("status thread panicked");
                }
            }
            result
        });

        if let Err(payload) = result {
            panic::resume_unwind(payload);
        }

        let elapsed = stopwatch.snapshot().duration;
        let mut output = cx.output.into_inner().unwrap_or_else(PoisonError::into_inner);
        let run_stats = output.stats;
        debug!(?run_stats, ?elapsed, "run finished");
        output.report(TestEvent::RunFinished {
            test_list: self.test_list,
            elapsed,
            run_stats,
        });

        match output.first_error {
            Some(err) => Err(err),
            None => Ok(run_stats),
        }
    }
}

/// The assignment mailbox of a single worker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Slot {
    /// Waiting for the dispatcher to assign a test.
    Idle,

    /// Running the test at this index in the list. Only the owning worker moves out of this state.
    Assigned(usize),

    /// Told to exit. Terminal.
    Stopping,
}

/// State shared between all threads of a single run.
pub(super) struct RunContext<'list, 'out, 'buf> {
    pub(super) test_list: &'list TestList<'list>,
    pub(super) slots: Box<[Mutex<Slot>]>,
    pub(super) output: Mutex<OutputState<'out, 'buf>>,
    pub(super) backoff: Duration,
    pub(super) status_interval: Duration,
}

impl RunContext<'_, '_, '_> {
    /// Reports an event under the output lock.
    pub(super) fn report(&self, event: TestEvent<'_>) {
        lock_ignore_poison(&self.output).report(event);
    }

    /// Moves every worker to [`Slot::Stopping`], regardless of what it is doing.
    pub(super) fn stop_all(&self) {
        for slot in self.slots.iter() {
            *lock_ignore_poison(slot) = Slot::Stopping;
        }
    }
}

/// Everything guarded by the output lock.
pub(super) struct OutputState<'out, 'buf> {
    reporter: &'out mut TestReporter<'buf>,
    pub(super) stats: RunStats,
    first_error: Option<WriteEventError>,
}

impl OutputState<'_, '_> {
    /// Writes an event. After the first write error, further events are dropped.
    pub(super) fn report(&mut self, event: TestEvent<'_>) {
        if self.first_error.is_some() {
            return;
        }
        if let Err(err) = self.reporter.report_event(event) {
            warn!("error writing test output, suppressing further output: {err}");
            self.first_error = Some(err);
        }
    }
}
