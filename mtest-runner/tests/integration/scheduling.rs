// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::Result;
use mtest_runner::{list::TestRegistry, test_filter::TestFilterBuilder};
use pretty_assertions::assert_eq;
use regex::Regex;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::LazyLock,
    time::Duration,
};
use test_case::test_case;

/// Matches a progress line, capturing the test name.
static PROGRESS_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"    \[\d+\] +\d+ / \d+ +(?P<name>\S+) \.\.\. (?:OK|FAILED)").unwrap()
});

/// Matches a status snapshot, capturing its comma-separated entries.
static STATUS_SNAPSHOT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?P<entries>(?:\(idle\)|\(joining\)|tracked_\d{3})(?:, (?:\(idle\)|\(joining\)|tracked_\d{3}))*)\]")
        .unwrap()
});

#[test_case(1 ; "one worker")]
#[test_case(2 ; "two workers")]
#[test_case(4 ; "four workers")]
#[test_case(8 ; "more workers than cpus")]
fn every_test_runs_exactly_once(workers: usize) -> Result<()> {
    const COUNT: usize = 40;
    let tracker = Tracker::new(COUNT);
    let registry = tracked_registry(&tracker, Duration::from_millis(2));
    let test_list = TestFilterBuilder::default_set().build(&registry)?;

    let stats = execute(&test_list, workers, true).result?;

    assert_eq!(stats.executed, COUNT);
    assert_eq!(stats.passed, COUNT);
    assert!(stats.is_complete());
    assert_eq!(tracker.runs(), vec![1; COUNT]);
    assert!(!tracker.saw_overlap(), "a test was running on two workers");
    assert!(
        tracker.max_running() <= workers,
        "{} tests ran at once on {workers} workers",
        tracker.max_running()
    );
    assert!(test_list.iter().all(|instance| instance.outcome().is_some()));
    Ok(())
}

#[test]
fn fewer_tests_than_workers() -> Result<()> {
    let tracker = Tracker::new(2);
    let registry = tracked_registry(&tracker, Duration::from_millis(1));
    let test_list = TestFilterBuilder::default_set().build(&registry)?;

    let stats = execute(&test_list, 6, false).result?;
    assert_eq!(stats.executed, 2);
    assert_eq!(tracker.runs(), [1, 1]);
    Ok(())
}

#[test]
fn one_worker_preserves_list_order() -> Result<()> {
    let tracker = Tracker::new(10);
    let registry = tracked_registry(&tracker, Duration::ZERO);
    let test_list = TestFilterBuilder::default_set().build(&registry)?;

    let run = execute(&test_list, 1, false);
    run.result?;
    assert_eq!(tracker.order(), (0..10).collect::<Vec<_>>());

    let finished: Vec<_> = PROGRESS_LINE_REGEX
        .captures_iter(&run.output)
        .map(|captures| captures["name"].to_owned())
        .collect();
    let expected: Vec<_> = (0..10).map(tracked_name).collect();
    assert_eq!(finished, expected);
    Ok(())
}

#[test]
fn explicit_selection_order_is_kept() -> Result<()> {
    let tracker = Tracker::new(5);
    let registry = tracked_registry(&tracker, Duration::ZERO);
    let names = [tracked_name(3), tracked_name(0), tracked_name(4)];
    let filter = TestFilterBuilder::new(names.iter().map(String::as_str), &[] as &[&str])?;
    let test_list = filter.build(&registry)?;

    execute(&test_list, 1, false).result?;
    assert_eq!(tracker.order(), [3, 0, 4]);
    assert_eq!(tracker.runs(), [1, 0, 0, 1, 1]);
    Ok(())
}

#[test]
fn status_line_reports_workers() -> Result<()> {
    let tracker = Tracker::new(6);
    let registry = tracked_registry(&tracker, Duration::from_millis(20));
    let test_list = TestFilterBuilder::default_set().build(&registry)?;

    let run = execute(&test_list, 2, true);
    run.result?;

    // The last snapshot is taken after every worker has been told to stop.
    assert!(
        run.output.contains("[(joining), (joining)]"),
        "output: {}",
        run.output
    );
    // A status line is always cleared before a progress line is written after it.
    let clear = format!("\r{:60}\r", "");
    for line in run.output.lines().filter(|line| line.contains(" ... ")) {
        assert!(
            line.starts_with("    [") || line.contains(&clear),
            "uncleared status in {line:?}"
        );
    }
    Ok(())
}

#[test]
fn workers_are_idle_before_they_are_stopped() -> Result<()> {
    let tracker = Tracker::new(12);
    let registry = tracked_registry(&tracker, Duration::from_millis(15));
    let test_list = TestFilterBuilder::default_set().build(&registry)?;

    let run = execute(&test_list, 3, true);
    run.result?;

    let snapshots: Vec<(usize, Vec<&str>)> = STATUS_SNAPSHOT_REGEX
        .captures_iter(&run.output)
        .map(|captures| {
            let entries = captures.name("entries").expect("entries group always matches");
            (entries.start(), entries.as_str().split(", ").collect())
        })
        .collect();
    assert!(
        snapshots.iter().any(|(_, entries)| entries.iter().any(|e| e.starts_with("tracked_"))),
        "some snapshot saw a running test: {}",
        run.output
    );

    for (_, entries) in &snapshots {
        let joining = entries.contains(&"(joining)");
        let running = entries.iter().any(|entry| entry.starts_with("tracked_"));
        assert!(
            !(joining && running),
            "a worker was stopped while another was running: {entries:?}"
        );
    }

    // Every test finishes before the first worker is told to stop.
    let first_joining = snapshots
        .iter()
        .find(|(_, entries)| entries.contains(&"(joining)"))
        .map(|(start, _)| *start)
        .expect("the final snapshot shows every worker joining");
    let last_progress = PROGRESS_LINE_REGEX
        .find_iter(&run.output)
        .last()
        .map(|m| m.start())
        .expect("progress lines were written");
    assert!(
        last_progress < first_joining,
        "a test finished after stopping began: {}",
        run.output
    );
    assert_eq!(
        snapshots.last().map(|(_, entries)| entries.clone()),
        Some(vec!["(joining)"; 3])
    );
    Ok(())
}

#[test]
fn panicking_test_is_resumed_on_caller() -> Result<()> {
    let tracker = Tracker::new(4);
    let mut registry = tracked_registry(&tracker, Duration::from_millis(5));
    registry.register("Panics", |_cx| panic!("boom from unit"))?;
    let test_list = TestFilterBuilder::default_set().build(&registry)?;

    let result = panic::catch_unwind(AssertUnwindSafe(|| execute(&test_list, 2, false)));
    let payload = match result {
        Ok(_) => panic!("run should have panicked"),
        Err(payload) => payload,
    };
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
    assert_eq!(message, Some("boom from unit"));

    // Stopping the pool may preempt a pending assignment, but no test runs twice.
    assert!(tracker.runs().iter().all(|&runs| runs <= 1));
    assert!(!tracker.saw_overlap());
    Ok(())
}

#[test]
fn independent_runs_in_one_process() -> Result<()> {
    let registry = TestRegistry::new().with_test("Again", |_cx| Ok(()))?;
    for _ in 0..3 {
        let test_list = TestFilterBuilder::default_set().build(&registry)?;
        let stats = execute(&test_list, 2, false).result?;
        assert_eq!(stats.executed, 1);
    }
    Ok(())
}
