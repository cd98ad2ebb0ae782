// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::TestCase;
use crate::{failure::TestOutcome, helpers::name_width};
use std::sync::OnceLock;

/// How much reporting a run produces.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RunMode {
    /// A run over all tests (or several named tests): header, progress lines, status line and
    /// summary are shown.
    Full,

    /// A run restricted to exactly one named test. Only the summary is shown.
    Selected,
}

impl RunMode {
    /// Returns true for [`RunMode::Selected`].
    pub fn is_selected(self) -> bool {
        matches!(self, RunMode::Selected)
    }
}

/// One test within a [`TestList`], along with its outcome once it has finished.
#[derive(Debug)]
pub struct TestInstance<'reg> {
    case: &'reg TestCase,
    outcome: OnceLock<TestOutcome>,
}

impl<'reg> TestInstance<'reg> {
    fn new(case: &'reg TestCase) -> Self {
        Self {
            case,
            outcome: OnceLock::new(),
        }
    }

    /// Returns the name of the test.
    pub fn name(&self) -> &'reg str {
        self.case.name()
    }

    /// Returns the registered test.
    pub fn case(&self) -> &'reg TestCase {
        self.case
    }

    /// Returns the outcome, if the test has finished.
    pub fn outcome(&self) -> Option<&TestOutcome> {
        self.outcome.get()
    }

    /// Publishes the outcome of this test and returns the stored copy.
    ///
    /// Each test runs exactly once, so this is called at most once per instance.
    pub(crate) fn set_outcome(&self, outcome: TestOutcome) -> &TestOutcome {
        let mut fresh = false;
        let stored = self.outcome.get_or_init(|| {
            fresh = true;
            outcome
        });
        assert!(fresh, "outcome for test `{}` published twice", self.name());
        stored
    }
}

/// The ordered list of tests for a single run.
#[derive(Debug)]
pub struct TestList<'reg> {
    tests: Vec<TestInstance<'reg>>,
    skip_count: usize,
    mode: RunMode,
    name_width: usize,
}

impl<'reg> TestList<'reg> {
    /// Creates a new list from the tests to run, in the order they should be scheduled.
    pub fn new(
        cases: impl IntoIterator<Item = &'reg TestCase>,
        skip_count: usize,
        mode: RunMode,
    ) -> Self {
        let tests: Vec<_> = cases.into_iter().map(TestInstance::new).collect();
        let name_width = tests
            .iter()
            .map(|instance| name_width(instance.name()))
            .max()
            .unwrap_or_default();
        Self {
            tests,
            skip_count,
            mode,
            name_width,
        }
    }

    /// Returns the number of tests selected to run.
    pub fn run_count(&self) -> usize {
        self.tests.len()
    }

    /// Returns the number of tests removed by skip patterns.
    pub fn skip_count(&self) -> usize {
        self.skip_count
    }

    /// Returns the reporting mode for this run.
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Returns the display width of the longest test name.
    pub fn name_width(&self) -> usize {
        self.name_width
    }

    /// Returns the test at the given position.
    pub fn get(&self, index: usize) -> Option<&TestInstance<'reg>> {
        self.tests.get(index)
    }

    /// Returns the test at the given position, which must be in range.
    pub(crate) fn instance(&self, index: usize) -> &TestInstance<'reg> {
        &self.tests[index]
    }

    /// Iterates over the tests in scheduling order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TestInstance<'reg>> + '_ {
        self.tests.iter()
    }

    /// Iterates over finished tests that recorded at least one failure, in scheduling order.
    pub fn failed(&self) -> impl Iterator<Item = (&TestInstance<'reg>, &TestOutcome)> + '_ {
        self.tests.iter().filter_map(|instance| {
            instance
                .outcome()
                .filter(|outcome| !outcome.is_success())
                .map(|outcome| (instance, outcome))
        })
    }
}
