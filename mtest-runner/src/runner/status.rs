// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::imp::{RunContext, Slot};
use crate::{
    helpers::lock_ignore_poison,
    reporter::{TestEvent, WorkerStatus},
};
use std::thread;
use tracing::debug;

/// The main loop of the status thread.
///
/// Redraws the status line every interval until every worker has been told to stop.
pub(super) fn run(cx: &RunContext<'_, '_, '_>) {
    debug!("status thread started");
    let mut workers = Vec::with_capacity(cx.slots.len());

    loop {
        let all_stopping = {
            let mut output = lock_ignore_poison(&cx.output);
            workers.clear();
            workers.extend(cx.slots.iter().map(|slot| {
                let current = *lock_ignore_poison(slot);
                match current {
                    Slot::Idle => WorkerStatus::Idle,
                    Slot::Assigned(index) => {
                        WorkerStatus::Running(cx.test_list.instance(index).name())
                    }
                    Slot::Stopping => WorkerStatus::Joining,
                }
            }));
            output.report(TestEvent::StatusSnapshot { workers: &workers });
            workers.iter().all(|status| *status == WorkerStatus::Joining)
        };

        if all_stopping {
            break;
        }
        thread::sleep(cx.status_interval);
    }

    debug!("status thread exiting");
}
