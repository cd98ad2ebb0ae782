// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::OutputFormat;
use crate::{
    errors::{
        DuplicateTestName, InvalidTestName, RegisterTestError, TestNotFound, UnknownTestNames,
        WriteTestListError,
    },
    failure::{TestContext, TestResult},
};
use indexmap::{IndexMap, IndexSet, map::Entry};
use mtest_metadata::TestListSummary;
use std::{fmt, io};
use tracing::trace;

/// The runnable body of a test.
pub type TestFn = Box<dyn Fn(&mut TestContext) -> TestResult + Send + Sync + 'static>;

/// A single registered test.
pub struct TestCase {
    name: String,
    ordinal: usize,
    unit: TestFn,
}

impl TestCase {
    /// Returns the unique name of this test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the zero-based registration index of this test.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Runs the test body against the given context.
    ///
    /// Panics raised by the body are not caught.
    pub fn run(&self, cx: &mut TestContext) -> TestResult {
        (self.unit)(cx)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("ordinal", &self.ordinal)
            .finish_non_exhaustive()
    }
}

/// Every test known to a test binary, keyed by unique name.
///
/// Iteration order is registration order. The registry is built before any test runs and is
/// read-only while tests execute.
///
/// ```
/// use mtest_runner::{expect, list::TestRegistry};
///
/// let registry = TestRegistry::new()
///     .with_test("OkTest", |_cx| Ok(()))?
///     .with_test("BasicTest", |cx| {
///         expect!(cx, 200 > 0);
///         Ok(())
///     })?;
/// assert_eq!(registry.list_all().collect::<Vec<_>>(), ["OkTest", "BasicTest"]);
/// # Ok::<(), mtest_runner::errors::RegisterTestError>(())
/// ```
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: IndexMap<String, TestCase>,
}

impl TestRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a test and returns its registration index.
    ///
    /// Fails if the name is already registered, is empty, or contains whitespace.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        unit: F,
    ) -> Result<usize, RegisterTestError>
    where
        F: Fn(&mut TestContext) -> TestResult + Send + Sync + 'static,
    {
        let name = name.into();
        validate_name(&name)?;

        let ordinal = self.tests.len();
        match self.tests.entry(name) {
            Entry::Occupied(entry) => {
                Err(DuplicateTestName::new(entry.key().clone(), entry.index()).into())
            }
            Entry::Vacant(entry) => {
                trace!(name = %entry.key(), ordinal, "registered test");
                let name = entry.key().clone();
                entry.insert(TestCase {
                    name,
                    ordinal,
                    unit: Box::new(unit),
                });
                Ok(ordinal)
            }
        }
    }

    /// Registers a test, builder style.
    pub fn with_test<F>(mut self, name: impl Into<String>, unit: F) -> Result<Self, RegisterTestError>
    where
        F: Fn(&mut TestContext) -> TestResult + Send + Sync + 'static,
    {
        self.register(name, unit)?;
        Ok(self)
    }

    /// Looks up a test by exact name.
    pub fn lookup(&self, name: &str) -> Result<&TestCase, TestNotFound> {
        self.tests.get(name).ok_or_else(|| TestNotFound::new(name))
    }

    /// Returns the names of all registered tests, in registration order.
    pub fn list_all(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.tests.keys().map(String::as_str)
    }

    /// Returns all registered tests, in registration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TestCase> + '_ {
        self.tests.values()
    }

    /// Returns the tests with the given names, in the order the names were given.
    ///
    /// A name given more than once is only selected once. If any name is not registered, every
    /// unknown name is reported in the error.
    pub fn select_subset<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<&TestCase>, UnknownTestNames> {
        let names: IndexSet<&str> = names.into_iter().collect();

        let mut selected = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            match self.tests.get(name) {
                Some(case) => selected.push(case),
                None => unknown.push(name.to_owned()),
            }
        }

        if unknown.is_empty() {
            Ok(selected)
        } else {
            Err(UnknownTestNames::new(unknown))
        }
    }

    /// Returns the number of registered tests.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Returns true if no tests are registered.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Returns a machine-readable summary of the registered tests.
    pub fn to_summary(&self) -> TestListSummary {
        TestListSummary::new(self.list_all())
    }

    /// Writes the registered tests to the given writer in the given format.
    pub fn write(
        &self,
        output_format: OutputFormat,
        mut writer: impl io::Write,
    ) -> Result<(), WriteTestListError> {
        match output_format {
            OutputFormat::Human => {
                let names: Vec<&str> = self.list_all().collect();
                writeln!(writer, "{}", names.join(" ")).map_err(WriteTestListError::Io)
            }
            OutputFormat::Serializable(format) => {
                format
                    .to_writer(&self.to_summary(), &mut writer)
                    .map_err(WriteTestListError::Json)?;
                writeln!(writer).map_err(WriteTestListError::Io)
            }
        }
    }
}

fn validate_name(name: &str) -> Result<(), InvalidTestName> {
    if name.is_empty() {
        Err(InvalidTestName::new(name, "name is empty"))
    } else if name.chars().any(char::is_whitespace) {
        Err(InvalidTestName::new(name, "name contains whitespace"))
    } else {
        Ok(())
    }
}
