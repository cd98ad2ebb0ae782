// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test runner.
//!
//! The main structure in this module is [`TestRunner`].
//!
//! A run uses one thread per worker plus an optional status thread, all inside a single
//! [`std::thread::scope`]. The dispatcher runs on the caller's thread. Locks are always taken in
//! the order output lock, then worker slot lock, and neither is held while a test body runs.

mod dispatcher;
mod imp;
mod status;
mod worker;

pub use imp::*;
