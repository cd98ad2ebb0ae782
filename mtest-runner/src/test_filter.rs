// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Choosing which registered tests take part in a run.

use crate::{
    errors::{TestFilterBuildError, UnknownTestNames},
    list::{RunMode, TestCase, TestList, TestRegistry},
};
use aho_corasick::AhoCorasick;
use tracing::debug;

/// Selects tests by exact name and removes tests by substring.
#[derive(Clone, Debug)]
pub struct TestFilterBuilder {
    names: Vec<String>,
    skip: SkipMatch,
}

#[derive(Clone, Debug)]
enum SkipMatch {
    SkipNone,
    SkipSet(Box<AhoCorasick>),
}

impl TestFilterBuilder {
    /// Creates a new filter.
    ///
    /// `names` are exact test names; if empty, every registered test is selected.
    /// `skip_patterns` remove tests whose name contains any of the patterns.
    pub fn new(
        names: impl IntoIterator<Item = impl Into<String>>,
        skip_patterns: &[impl AsRef<[u8]>],
    ) -> Result<Self, TestFilterBuildError> {
        let skip = if skip_patterns.is_empty() {
            SkipMatch::SkipNone
        } else {
            SkipMatch::SkipSet(Box::new(AhoCorasick::new(skip_patterns)?))
        };
        Ok(Self {
            names: names.into_iter().map(Into::into).collect(),
            skip,
        })
    }

    /// Creates a filter that selects every registered test.
    pub fn default_set() -> Self {
        Self {
            names: Vec::new(),
            skip: SkipMatch::SkipNone,
        }
    }

    /// Returns the mode a run built from this filter uses.
    ///
    /// Naming exactly one test produces a selected run.
    pub fn run_mode(&self) -> RunMode {
        if self.names.len() == 1 {
            RunMode::Selected
        } else {
            RunMode::Full
        }
    }

    /// Returns true if the test name matches a skip pattern.
    pub fn is_skipped(&self, name: &str) -> bool {
        match &self.skip {
            SkipMatch::SkipNone => false,
            SkipMatch::SkipSet(set) => set.is_match(name),
        }
    }

    /// Builds the list of tests for a run.
    ///
    /// Fails if any explicitly named test is not registered; in that case no test runs.
    pub fn build<'reg>(
        &self,
        registry: &'reg TestRegistry,
    ) -> Result<TestList<'reg>, UnknownTestNames> {
        let candidates: Vec<&TestCase> = if self.names.is_empty() {
            registry.iter().collect()
        } else {
            registry.select_subset(self.names.iter().map(String::as_str))?
        };

        let candidate_count = candidates.len();
        let selected: Vec<_> = candidates
            .into_iter()
            .filter(|case| !self.is_skipped(case.name()))
            .collect();
        let skip_count = candidate_count - selected.len();
        debug!(
            selected = selected.len(),
            skipped = skip_count,
            "built test list"
        );

        Ok(TestList::new(selected, skip_count, self.run_mode()))
    }
}
