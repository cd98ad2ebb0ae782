// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::Result;
use mtest_runner::{
    errors::WriteEventError,
    expect, expect_eq, expect_lt,
    failure::FailureKind,
    list::{RunMode, TestRegistry},
    reporter::RunStats,
    require, require_eq,
    test_filter::TestFilterBuilder,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn scenario_registry() -> Result<TestRegistry> {
    let registry = TestRegistry::new()
        .with_test("A", |cx| {
            expect!(cx, 1 + 1 == 2);
            Ok(())
        })?
        .with_test("B", |cx| {
            expect_eq!(cx, 5, 52);
            expect_lt!(cx, 1, 2);
            Ok(())
        })?
        .with_test("C", |cx| {
            require!(cx, 10 - 10 != 0);
            expect!(cx, false);
            Ok(())
        })?;
    Ok(registry)
}

#[test]
fn soft_and_hard_failures_are_aggregated() -> Result<()> {
    let registry = scenario_registry()?;
    let test_list = TestFilterBuilder::default_set().build(&registry)?;
    let run = execute(&test_list, 1, false);
    let stats = run.result?;

    assert_eq!(
        stats,
        RunStats {
            initial_run_count: 3,
            executed: 3,
            passed: 1,
            failed: 2,
            aborted: 1,
            total_failures: 2,
        }
    );
    assert!(!stats.is_success());

    let failed: Vec<_> = test_list
        .failed()
        .map(|(instance, outcome)| {
            let kinds: Vec<_> = outcome.failures().iter().map(|f| f.kind()).collect();
            (instance.name(), kinds)
        })
        .collect();
    assert_eq!(
        failed,
        [
            ("B", vec![FailureKind::Expectation]),
            ("C", vec![FailureKind::Assertion]),
        ]
    );

    // With one worker, progress lines appear in list order.
    let progress: Vec<_> = run
        .output
        .lines()
        .filter(|line| line.starts_with("    [0]"))
        .collect();
    assert_eq!(progress.len(), 3);
    assert!(progress[0].contains("1 / 3    A ... OK     ("));
    assert!(progress[1].contains("2 / 3    B ... FAILED ("));
    assert!(progress[2].contains("3 / 3    C ... FAILED ("));

    assert!(run.output.contains("    > Testing on 1 thread\n"));
    assert!(run.output.contains(" SUMMARY OF 2 FAILED TESTS "));
    assert!(run.output.contains("\nB:\n    ["));
    assert!(
        run.output
            .contains("] expected \"5 == 52\", found 5 and 52\nC:\n    [")
    );
    assert!(
        run.output
            .ends_with("] asserted \"10 - 10 != 0\" to be true, found false\n")
    );
    Ok(())
}

#[test]
fn soft_failures_are_all_recorded() -> Result<()> {
    let registry = TestRegistry::new().with_test("Soft", |cx| {
        for i in 0..5 {
            expect_eq!(cx, i, 100);
        }
        Ok(())
    })?;
    let test_list = TestFilterBuilder::default_set().build(&registry)?;
    let stats = execute(&test_list, 2, false).result?;

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.total_failures, 5);
    assert_eq!(stats.aborted, 0);
    let instance = test_list.get(0).expect("one test");
    let outcome = instance.outcome().expect("test finished");
    assert!(!outcome.is_aborted());
    assert_eq!(outcome.failures().len(), 5);
    Ok(())
}

#[test]
fn hard_failure_first_records_one() -> Result<()> {
    let registry = TestRegistry::new().with_test("Hard", |cx| {
        require_eq!(cx, "left", "right");
        expect!(cx, false);
        expect!(cx, false);
        Ok(())
    })?;
    let test_list = TestFilterBuilder::default_set().build(&registry)?;
    let stats = execute(&test_list, 1, false).result?;

    assert_eq!(stats.total_failures, 1);
    assert_eq!(stats.aborted, 1);
    let outcome = test_list.get(0).and_then(|i| i.outcome()).expect("finished");
    assert!(outcome.is_aborted());
    assert_eq!(
        outcome.failures()[0].message_str(),
        "asserted \"\"left\" == \"right\"\", found \"left\" and \"right\""
    );
    Ok(())
}

#[test]
fn all_passing_run() -> Result<()> {
    let tracker = Tracker::new(4);
    let registry = tracked_registry(&tracker, Duration::ZERO);
    let test_list = TestFilterBuilder::default_set().build(&registry)?;
    let run = execute(&test_list, 2, false);
    let stats = run.result?;

    assert!(stats.is_success());
    assert_eq!(stats.passed, 4);
    assert!(run.output.contains(" TEST RUN (4 total): "));
    assert!(run.output.contains("    > Finished testing in "));
    assert!(
        run.output
            .ends_with("\n===================== ALL TESTS PASSED =====================\n"),
        "output: {}",
        run.output
    );
    Ok(())
}

#[test]
fn selected_run_only_prints_summary() -> Result<()> {
    let tracker = Tracker::new(3);
    let registry = tracked_registry(&tracker, Duration::ZERO);
    let name = tracked_name(1);
    let filter = TestFilterBuilder::new([name.as_str()], &[] as &[&str])?;
    let test_list = filter.build(&registry)?;
    assert_eq!(test_list.mode(), RunMode::Selected);

    // The status line is requested but suppressed for selected runs.
    let run = execute(&test_list, 4, true);
    let stats = run.result?;

    assert_eq!(stats.executed, 1);
    assert_eq!(tracker.runs(), [0, 1, 0]);
    assert_eq!(
        run.output,
        "===================== ALL TESTS PASSED =====================\n"
    );
    Ok(())
}

#[test]
fn unknown_name_runs_nothing() -> Result<()> {
    let tracker = Tracker::new(2);
    let registry = tracked_registry(&tracker, Duration::ZERO);
    let filter = TestFilterBuilder::new(["NoSuchTest", "AlsoMissing"], &[] as &[&str])?;

    let err = filter.build(&registry).expect_err("names are unknown");
    assert_eq!(err.names(), ["NoSuchTest", "AlsoMissing"]);
    assert_eq!(
        err.to_string(),
        "tests not found: `NoSuchTest`, `AlsoMissing`"
    );
    assert_eq!(tracker.runs(), [0, 0]);
    Ok(())
}

#[test]
fn skipped_tests_do_not_run() -> Result<()> {
    let tracker = Tracker::new(3);
    let registry = tracked_registry(&tracker, Duration::ZERO);
    let filter = TestFilterBuilder::new(Vec::<String>::new(), &["_001"])?;
    let test_list = filter.build(&registry)?;
    let run = execute(&test_list, 2, false);

    assert_eq!(run.result?.executed, 2);
    assert_eq!(tracker.runs(), [1, 0, 1]);
    assert!(run.output.contains("    > Testing on 2 threads, 1 test skipped\n"));
    Ok(())
}

#[test]
fn empty_list() -> Result<()> {
    let registry = TestRegistry::new();
    let test_list = TestFilterBuilder::default_set().build(&registry)?;
    let run = execute(&test_list, 3, true);
    let stats = run.result?;

    assert_eq!(stats, RunStats::new(0));
    assert!(stats.is_success());
    assert!(run.output.contains(" TEST RUN (0 total): "));
    Ok(())
}

#[test]
fn write_error_does_not_stop_the_run() -> Result<()> {
    let tracker = Tracker::new(6);
    let registry = tracked_registry(&tracker, Duration::from_millis(1));
    let test_list = TestFilterBuilder::default_set().build(&registry)?;

    // The header goes through; the first progress line fails.
    let mut writer = BrokenAfter::new(1);
    let result = execute_to_writer(&test_list, 2, &mut writer);

    let err = result.expect_err("the write error is returned");
    assert!(matches!(err, WriteEventError::Io(_)), "error: {err:?}");
    assert_eq!(tracker.runs(), vec![1; 6], "every test still ran");
    assert!(
        test_list.iter().all(|instance| instance.outcome().is_some()),
        "every outcome is published"
    );
    assert_eq!(writer.writes, 2, "nothing is written after the first error");
    let written = String::from_utf8(writer.written)?;
    assert!(written.contains(" TEST RUN (6 total): "), "header: {written}");
    assert!(!written.contains(" ... "), "no progress line: {written}");
    Ok(())
}
