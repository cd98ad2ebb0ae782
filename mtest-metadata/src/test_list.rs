// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::io;

/// Root element for a serializable list of tests generated by an mtest test binary.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct TestListSummary {
    /// Number of registered tests.
    pub test_count: usize,

    /// Registered tests, in registration order.
    pub tests: Vec<TestCaseSummary>,
}

impl TestListSummary {
    /// Creates a new summary from test names in registration order.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let tests: Vec<_> = names
            .into_iter()
            .enumerate()
            .map(|(ordinal, name)| TestCaseSummary {
                name: name.into(),
                ordinal,
            })
            .collect();
        Self {
            test_count: tests.len(),
            tests,
        }
    }

    /// Parses JSON output produced by `--list --message-format json`.
    pub fn parse_json(json: impl AsRef<str>) -> serde_json::Result<Self> {
        serde_json::from_str(json.as_ref())
    }

    /// Writes this summary as JSON to the given writer.
    pub fn write_json(&self, pretty: bool, writer: impl io::Write) -> serde_json::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)
        } else {
            serde_json::to_writer(writer, self)
        }
    }
}

/// Serializable information about a single registered test.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct TestCaseSummary {
    /// The unique name of the test.
    pub name: String,

    /// The zero-based registration index of the test.
    pub ordinal: usize,
}
