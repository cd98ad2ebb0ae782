// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::imp::{RunContext, Slot};
use crate::{
    failure::{TestContext, TestOutcome},
    helpers::lock_ignore_poison,
    list::TestInstance,
    reporter::TestEvent,
    time::stopwatch,
};
use std::thread;
use tracing::{debug, trace};

/// The main loop of worker `index`.
///
/// Runs assigned tests one at a time until the slot is set to [`Slot::Stopping`].
pub(super) fn run(cx: &RunContext<'_, '_, '_>, index: usize) {
    debug!(worker = index, "worker started");
    let slot = &cx.slots[index];

    loop {
        let current = *lock_ignore_poison(slot);
        match current {
            Slot::Idle => thread::sleep(cx.backoff),
            Slot::Stopping => break,
            Slot::Assigned(test_index) => {
                let instance = cx.test_list.instance(test_index);
                trace!(worker = index, test = instance.name(), "running test");

                let outcome = instance.set_outcome(run_test(instance));
                report_finished(cx, index, instance, outcome);

                let mut slot = lock_ignore_poison(slot);
                // The dispatcher may have already asked this worker to stop.
                if *slot == Slot::Assigned(test_index) {
                    *slot = Slot::Idle;
                }
            }
        }
    }

    debug!(worker = index, "worker exiting");
}

fn run_test(instance: &TestInstance<'_>) -> TestOutcome {
    let stopwatch = stopwatch();
    let mut cx = TestContext::new();
    let result = instance.case().run(&mut cx);
    cx.finish(result, stopwatch.snapshot().duration)
}

fn report_finished(
    cx: &RunContext<'_, '_, '_>,
    worker: usize,
    instance: &TestInstance<'_>,
    outcome: &TestOutcome,
) {
    let mut output = lock_ignore_poison(&cx.output);
    let sequence = output.stats.on_test_finished(outcome);
    let run_stats = output.stats;
    output.report(TestEvent::TestFinished {
        worker,
        sequence,
        test_instance: instance,
        outcome,
        run_stats,
    });
}
