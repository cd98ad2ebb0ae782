// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by mtest.

use std::fmt;
use thiserror::Error;

/// An error returned while registering a test with a
/// [`TestRegistry`](crate::list::TestRegistry).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum RegisterTestError {
    /// A test with this name was already registered.
    #[error(transparent)]
    Duplicate(#[from] DuplicateTestName),

    /// The name cannot be used for a test.
    #[error(transparent)]
    Invalid(#[from] InvalidTestName),
}

/// A test with the same name was already registered.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("test `{name}` is already registered (as test #{existing_ordinal})")]
pub struct DuplicateTestName {
    name: String,
    existing_ordinal: usize,
}

impl DuplicateTestName {
    pub(crate) fn new(name: impl Into<String>, existing_ordinal: usize) -> Self {
        Self {
            name: name.into(),
            existing_ordinal,
        }
    }

    /// Returns the name that was registered twice.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the registration index of the test that already holds this name.
    pub fn existing_ordinal(&self) -> usize {
        self.existing_ordinal
    }
}

/// A test name was empty or contained whitespace.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid test name {name:?}: {reason}")]
pub struct InvalidTestName {
    name: String,
    reason: &'static str,
}

impl InvalidTestName {
    pub(crate) fn new(name: impl Into<String>, reason: &'static str) -> Self {
        Self {
            name: name.into(),
            reason,
        }
    }

    /// Returns the rejected name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A single test name was looked up but is not registered.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("test `{name}` not found")]
pub struct TestNotFound {
    name: String,
}

impl TestNotFound {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the name that was looked up.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One or more explicitly selected test names are not registered.
///
/// An unknown name is a configuration error, not a skipped test.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{} not found: {}", plural_tests(.names.len()), DisplayNames(.names))]
pub struct UnknownTestNames {
    names: Vec<String>,
}

impl UnknownTestNames {
    pub(crate) fn new(names: Vec<String>) -> Self {
        debug_assert!(!names.is_empty(), "at least one unknown name");
        Self { names }
    }

    /// Returns the unknown names, in the order they were requested.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

fn plural_tests(count: usize) -> &'static str {
    crate::helpers::plural::tests_str(count)
}

struct DisplayNames<'a>(&'a [String]);

impl fmt::Display for DisplayNames<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "`{name}`")?;
        }
        Ok(())
    }
}

/// An error that occurs while building a [`TestFilterBuilder`](crate::test_filter::TestFilterBuilder).
#[derive(Debug, Error)]
#[error("error building skip pattern matcher")]
pub struct TestFilterBuildError {
    #[from]
    error: aho_corasick::BuildError,
}

/// An error that occurs while parsing a [`TestThreads`](crate::config::TestThreads) value.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid thread count `{input}`: {message}")]
pub struct TestThreadsParseError {
    input: String,
    message: String,
}

impl TestThreadsParseError {
    pub(crate) fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Returns the input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// The number of available CPUs could not be determined.
#[derive(Debug, Error)]
#[error("unable to determine the number of available CPUs")]
pub struct NumCpusError {
    #[source]
    err: std::io::Error,
}

impl NumCpusError {
    pub(crate) fn new(err: std::io::Error) -> Self {
        Self { err }
    }
}

/// An error that occurs while reading the worker-count override from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestThreadsError {
    /// The environment variable override could not be parsed.
    #[error("invalid value for environment variable `{var}`")]
    Env {
        /// The name of the environment variable.
        var: &'static str,

        /// The underlying parse error.
        #[source]
        err: TestThreadsParseError,
    },

    /// The environment variable override was not valid Unicode.
    #[error("environment variable `{var}` is not valid Unicode")]
    EnvNotUnicode {
        /// The name of the environment variable.
        var: &'static str,
    },
}

/// An error that occurs while writing an event to the reporter output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[from] std::io::Error),
}

/// An error that occurs while writing a list of tests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteTestListError {
    /// An error occurred while writing the list to the provided output.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),

    /// An error occurred while serializing the list to JSON.
    #[error("error serializing to JSON")]
    Json(#[source] serde_json::Error),
}
