// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for mtest-runner.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use unicode_width::UnicodeWidthStr;

/// Utilities for pluralizing various words based on count or plurality.
pub mod plural {
    /// Returns "test" if `count` is 1, otherwise "tests".
    pub fn tests_str(count: usize) -> &'static str {
        tests_plural_if(count != 1)
    }

    /// Returns "tests" if `plural` is true, otherwise "test".
    pub fn tests_plural_if(plural: bool) -> &'static str {
        if plural { "tests" } else { "test" }
    }

    /// Returns "TEST" if `count` is 1, otherwise "TESTS".
    pub fn tests_upper_str(count: usize) -> &'static str {
        if count == 1 { "TEST" } else { "TESTS" }
    }

    /// Returns "thread" if `count` is 1, otherwise "threads".
    pub fn threads_str(count: usize) -> &'static str {
        if count == 1 { "thread" } else { "threads" }
    }
}

/// Terminal width assumed when stdout is not a terminal.
pub(crate) const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Returns the width of the terminal attached to stdout, if any.
pub(crate) fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| usize::from(cols))
        .filter(|&cols| cols > 0)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

/// Returns the number of decimal digits needed to print `n`.
pub(crate) fn decimal_char_width(n: usize) -> usize {
    // checked_ilog10 returns None for 0, which is one character wide.
    n.checked_ilog10().map_or(1, |digits| digits as usize + 1)
}

/// Returns the display width of a test name.
pub(crate) fn name_width(name: &str) -> usize {
    name.width()
}

/// Locks a mutex, ignoring poisoning.
///
/// No lock is ever held while a unit runs, so the state behind a poisoned lock is still
/// consistent.
pub(crate) fn lock_ignore_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Attempts to lock a mutex without blocking, ignoring poisoning. Returns `None` if the lock is
/// held elsewhere.
pub(crate) fn try_lock_ignore_poison<T>(mutex: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    match mutex.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(err)) => Some(err.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}
