// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use mtest_runner::{
    config::TestThreads,
    errors::WriteEventError,
    failure::{TestContext, TestResult},
    list::{TestList, TestRegistry},
    reporter::{ReporterOutput, RunStats, TestReporterBuilder},
    runner::{TestRunner, TestRunnerBuilder},
};
use std::{
    io::{self, Write},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

/// Records how registered units were executed, from inside the units themselves.
#[derive(Debug)]
pub(crate) struct Tracker {
    runs: Vec<AtomicUsize>,
    active: Vec<AtomicUsize>,
    overlap: AtomicBool,
    running: AtomicUsize,
    max_running: AtomicUsize,
    order: Mutex<Vec<usize>>,
}

impl Tracker {
    pub(crate) fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            runs: (0..count).map(|_| AtomicUsize::new(0)).collect(),
            active: (0..count).map(|_| AtomicUsize::new(0)).collect(),
            overlap: AtomicBool::new(false),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
            order: Mutex::new(Vec::new()),
        })
    }

    fn enter(&self, index: usize) {
        if self.active[index].fetch_add(1, Ordering::SeqCst) != 0 {
            self.overlap.store(true, Ordering::SeqCst);
        }
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(running, Ordering::SeqCst);
        self.runs[index].fetch_add(1, Ordering::SeqCst);
        self.order.lock().unwrap().push(index);
    }

    fn exit(&self, index: usize) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.active[index].fetch_sub(1, Ordering::SeqCst);
    }

    /// Returns how many times each unit ran.
    pub(crate) fn runs(&self) -> Vec<usize> {
        self.runs
            .iter()
            .map(|count| count.load(Ordering::SeqCst))
            .collect()
    }

    /// Returns true if any unit was ever running on two workers at once.
    pub(crate) fn saw_overlap(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }

    /// Returns the largest number of units that were running at the same time.
    pub(crate) fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    /// Returns unit indexes in the order they started.
    pub(crate) fn order(&self) -> Vec<usize> {
        self.order.lock().unwrap().clone()
    }
}

/// Name of the tracked unit at `index`.
pub(crate) fn tracked_name(index: usize) -> String {
    format!("tracked_{index:03}")
}

/// Builds a registry of `count` passing units that report to the tracker and sleep for `sleep`.
pub(crate) fn tracked_registry(tracker: &Arc<Tracker>, sleep: Duration) -> TestRegistry {
    let mut registry = TestRegistry::new();
    for index in 0..tracker.runs.len() {
        let tracker = Arc::clone(tracker);
        registry
            .register(tracked_name(index), move |_cx: &mut TestContext| -> TestResult {
                tracker.enter(index);
                thread::sleep(sleep);
                tracker.exit(index);
                Ok(())
            })
            .unwrap();
    }
    registry
}

/// The result of running a list into a buffer.
pub(crate) struct RunOutput {
    pub(crate) result: Result<RunStats, WriteEventError>,
    pub(crate) output: String,
}

fn runner<'a>(test_list: &'a TestList<'a>, workers: usize, status_line: bool) -> TestRunner<'a> {
    let runner = TestRunnerBuilder::default()
        .set_test_threads(TestThreads::Count(workers))
        .set_backoff(Duration::from_millis(1))
        .set_status_interval(Duration::from_millis(5))
        .set_status_line(status_line)
        .build(test_list)
        .unwrap();
    assert_eq!(runner.worker_count(), workers);
    runner
}

/// Runs the list with `workers` threads and the given status-line setting, capturing output.
pub(crate) fn execute(test_list: &TestList<'_>, workers: usize, status_line: bool) -> RunOutput {
    let runner = runner(test_list, workers, status_line);

    let mut buf = Vec::new();
    let mut reporter = TestReporterBuilder::default()
        .set_terminal_width(60)
        .build(ReporterOutput::Buffer(&mut buf));
    let result = runner.execute(&mut reporter);
    drop(reporter);

    RunOutput {
        result,
        output: String::from_utf8(buf).unwrap(),
    }
}

/// Runs the list with `workers` threads, writing output to `writer`.
pub(crate) fn execute_to_writer(
    test_list: &TestList<'_>,
    workers: usize,
    writer: &mut (dyn Write + Send),
) -> Result<RunStats, WriteEventError> {
    let runner = runner(test_list, workers, false);
    let mut reporter = TestReporterBuilder::default()
        .set_terminal_width(60)
        .build(ReporterOutput::Writer(writer));
    runner.execute(&mut reporter)
}

/// A writer that accepts a fixed number of writes, then fails every call.
#[derive(Debug)]
pub(crate) struct BrokenAfter {
    remaining: usize,
    pub(crate) writes: usize,
    pub(crate) written: Vec<u8>,
}

impl BrokenAfter {
    pub(crate) fn new(ok_writes: usize) -> Self {
        Self {
            remaining: ok_writes,
            writes: 0,
            written: Vec::new(),
        }
    }
}

impl Write for BrokenAfter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"));
        }
        self.remaining -= 1;
        self.written.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
