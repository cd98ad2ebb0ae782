// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assigning tests to workers and shutting the pool down.

use super::imp::{RunContext, Slot};
use crate::helpers::{lock_ignore_poison, try_lock_ignore_poison};
use std::{any::Any, thread, thread::ScopedJoinHandle};
use tracing::{debug, trace, warn};

/// The payload of a panic raised on a worker thread.
pub(super) type PanicPayload = Box<dyn Any + Send + 'static>;

/// Assigns every test in the list, waits for the workers to drain, then stops and joins them.
///
/// If a worker thread exits on its own (because a test body panicked), every worker is stopped
/// and the panic payload is returned once all of them have been joined.
pub(super) fn run(
    cx: &RunContext<'_, '_, '_>,
    handles: Vec<ScopedJoinHandle<'_, ()>>,
) -> Result<(), PanicPayload> {
    let mut dispatcher = Dispatcher {
        cx,
        handles,
        next_worker: 0,
    };

    let crashed = dispatcher
        .assign_all()
        .and_then(|()| dispatcher.drain())
        .is_err();
    if crashed {
        warn!("a worker exited unexpectedly, stopping the remaining workers");
    }
    cx.stop_all();

    match dispatcher.join_all() {
        Err(payload) => Err(payload),
        Ok(()) if crashed => Err(Box::new("worker thread exited unexpectedly") as PanicPayload),
        Ok(()) => Ok(()),
    }
}

struct Dispatcher<'cx, 'scope, 'list, 'out, 'buf> {
    cx: &'cx RunContext<'list, 'out, 'buf>,
    handles: Vec<ScopedJoinHandle<'scope, ()>>,
    // Round-robin position: the search for a free worker starts here.
    next_worker: usize,
}

/// Marker for a worker thread that finished without being told to stop.
struct WorkerCrashed;

impl Dispatcher<'_, '_, '_, '_, '_> {
    fn assign_all(&mut self) -> Result<(), WorkerCrashed> {
        for index in 0..self.cx.test_list.run_count() {
            loop {
                if let Some(worker) = self.try_assign(index) {
                    trace!(worker, test = index, "assigned test");
                    break;
                }
                self.check_workers()?;
                thread::sleep(self.cx.backoff);
            }
        }
        debug!("all tests assigned");
        Ok(())
    }

    /// Offers the test to each worker once, starting after the last worker assigned. Returns the
    /// worker that accepted it.
    fn try_assign(&mut self, index: usize) -> Option<usize> {
        let worker_count = self.cx.slots.len();
        for offset in 0..worker_count {
            let worker = (self.next_worker + offset) % worker_count;
            let Some(mut slot) = try_lock_ignore_poison(&self.cx.slots[worker]) else {
                continue;
            };
            if *slot == Slot::Idle {
                *slot = Slot::Assigned(index);
                self.next_worker = (worker + 1) % worker_count;
                return Some(worker);
            }
        }
        None
    }

    /// Waits until every worker is idle.
    fn drain(&self) -> Result<(), WorkerCrashed> {
        while !self
            .cx
            .slots
            .iter()
            .all(|slot| *lock_ignore_poison(slot) == Slot::Idle)
        {
            self.check_workers()?;
            thread::sleep(self.cx.backoff);
        }
        debug!("all workers idle");
        Ok(())
    }

    fn check_workers(&self) -> Result<(), WorkerCrashed> {
        // Workers only exit after being told to stop, which hasn't happened yet.
        if self.handles.iter().any(|handle| handle.is_finished()) {
            Err(WorkerCrashed)
        } else {
            Ok(())
        }
    }

    /// Joins every worker, returning the first panic payload, if any.
    fn join_all(self) -> Result<(), PanicPayload> {
        let mut first_panic = None;
        for (worker, handle) in self.handles.into_iter().enumerate() {
            if let Err(payload) = handle.join() {
                debug!(worker, "worker panicked");
                first_panic.get_or_insert(payload);
            }
        }
        debug!("all workers joined");
        first_panic.map_or(Ok(()), Err)
    }
}
