// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{NumCpusError, TestThreadsError, TestThreadsParseError};
use std::{env, ffi::OsString, fmt, str::FromStr, sync::OnceLock};
use tracing::debug;

/// The environment variable consulted for a worker-count override.
pub const TEST_THREADS_ENV: &str = "MTEST_TEST_THREADS";

/// The largest explicit worker count accepted. Each worker is an OS thread.
pub const MAX_TEST_THREADS: usize = 1024;

/// Type for the worker-count setting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TestThreads {
    /// Run tests with a specified number of threads.
    Count(usize),

    /// Run tests with a number of threads equal to the logical CPU count.
    #[default]
    NumCpus,
}

impl TestThreads {
    /// Gets the actual number of test threads computed at runtime.
    pub fn compute(self) -> Result<usize, NumCpusError> {
        match self {
            Self::Count(threads) => Ok(threads),
            Self::NumCpus => get_num_cpus(),
        }
    }

    /// Reads the override from [`TEST_THREADS_ENV`], if set.
    ///
    /// An empty value is treated as unset.
    pub fn from_env() -> Result<Option<Self>, TestThreadsError> {
        Self::from_env_value(env::var_os(TEST_THREADS_ENV))
    }

    fn from_env_value(value: Option<OsString>) -> Result<Option<Self>, TestThreadsError> {
        let Some(value) = value else {
            return Ok(None);
        };
        let value = value
            .into_string()
            .map_err(|_| TestThreadsError::EnvNotUnicode {
                var: TEST_THREADS_ENV,
            })?;
        if value.is_empty() {
            return Ok(None);
        }

        let threads = value.parse().map_err(|err| TestThreadsError::Env {
            var: TEST_THREADS_ENV,
            err,
        })?;
        debug!("{TEST_THREADS_ENV} set to {threads}");
        Ok(Some(threads))
    }

    /// Resolves the worker count: the command-line value wins over the environment, which wins
    /// over the CPU count.
    pub fn resolve(cli: Option<Self>, env: Option<Self>) -> Self {
        cli.or(env).unwrap_or_default()
    }
}

impl FromStr for TestThreads {
    type Err = TestThreadsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "num-cpus" {
            return Ok(Self::NumCpus);
        }

        match s.parse::<isize>() {
            Err(e) => Err(TestThreadsParseError::new(s, e.to_string())),
            Ok(0) => Err(TestThreadsParseError::new(s, "thread count may not be 0")),
            Ok(j) if j < 0 => Err(TestThreadsParseError::new(
                s,
                "thread count must be a positive integer",
            )),
            Ok(j) if j as usize > MAX_TEST_THREADS => Err(TestThreadsParseError::new(
                s,
                format!("thread count may not exceed {MAX_TEST_THREADS}"),
            )),
            Ok(j) => Ok(TestThreads::Count(j as usize)),
        }
    }
}

impl fmt::Display for TestThreads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(threads) => write!(f, "{threads}"),
            Self::NumCpus => write!(f, "num-cpus"),
        }
    }
}

/// Gets the number of available CPUs.
pub fn get_num_cpus() -> Result<usize, NumCpusError> {
    static NUM_CPUS: OnceLock<usize> = OnceLock::new();

    if let Some(count) = NUM_CPUS.get() {
        return Ok(*count);
    }
    let count = std::thread::available_parallelism()
        .map_err(NumCpusError::new)?
        .get();
    Ok(*NUM_CPUS.get_or_init(|| count))
}
