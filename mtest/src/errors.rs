// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use mtest_metadata::MtestExitCode;
use mtest_runner::errors::{
    NumCpusError, TestFilterBuildError, TestThreadsError, UnknownTestNames, WriteEventError,
    WriteTestListError,
};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

// The #[error] strings are short summaries. Errors reach the user through display_to_stderr,
// which also prints the source chain.

/// An error that stops a test binary before or after its tests run.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("error parsing arguments")]
    ArgumentParse {
        #[from]
        err: clap::Error,
    },
    #[error("invalid thread count")]
    TestThreads {
        #[from]
        err: TestThreadsError,
    },
    #[error("unable to determine number of CPUs")]
    NumCpus {
        #[from]
        err: NumCpusError,
    },
    #[error("error building test filter")]
    FilterBuild {
        #[from]
        err: TestFilterBuildError,
    },
    #[error("unknown test names")]
    UnknownTestNames {
        #[from]
        err: UnknownTestNames,
    },
    #[error("error writing test list")]
    WriteTestList {
        #[from]
        err: WriteTestListError,
    },
    #[error("error writing test output")]
    WriteEvent {
        #[from]
        err: WriteEventError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ArgumentParse { .. }
            | Self::TestThreads { .. }
            | Self::NumCpus { .. }
            | Self::FilterBuild { .. }
            | Self::UnknownTestNames { .. } => MtestExitCode::SETUP_ERROR,
            Self::WriteTestList { .. } | Self::WriteEvent { .. } => {
                MtestExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error: Option<&dyn Error> = match self {
            Self::ArgumentParse { err } => {
                // clap formats its own errors, including usage.
                let _ = err.print();
                None
            }
            Self::TestThreads { err } => {
                error!("{err}");
                err.source()
            }
            Self::NumCpus { err } => {
                error!("{err}");
                err.source()
            }
            Self::FilterBuild { err } => {
                error!("{err}");
                err.source()
            }
            Self::UnknownTestNames { err } => {
                let names: Vec<_> = err
                    .names()
                    .iter()
                    .map(|name| name.style(styles.bold).to_string())
                    .collect();
                error!(
                    "{} not registered: {}",
                    mtest_runner::plural::tests_str(names.len()),
                    names.join(", "),
                );
                None
            }
            Self::WriteTestList { err } => {
                error!("failed to write test list to output");
                Some(err as &dyn Error)
            }
            Self::WriteEvent { err } => {
                error!("failed to write test output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtest_runner::config::TestThreads;
    use test_case::test_case;

    fn parse_error() -> ExpectedError {
        "0".parse::<TestThreads>()
            .map_err(|err| clap::Error::raw(clap::error::ErrorKind::ValueValidation, err))
            .expect_err("zero threads is invalid")
            .into()
    }

    #[test_case(parse_error(), MtestExitCode::SETUP_ERROR ; "argument parse")]
    #[test_case(
        ExpectedError::from(WriteEventError::from(std::io::Error::other("closed"))),
        MtestExitCode::WRITE_OUTPUT_ERROR
        ; "write event"
    )]
    #[test_case(
        ExpectedError::from(WriteTestListError::Io(std::io::Error::other("closed"))),
        MtestExitCode::WRITE_OUTPUT_ERROR
        ; "write test list"
    )]
    fn exit_codes(error: ExpectedError, expected: i32) {
        assert_eq!(error.process_exit_code(), expected);
    }
}
