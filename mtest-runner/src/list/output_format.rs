// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use mtest_metadata::TestListSummary;
use std::io;

/// Output formats for the list of registered tests.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// Test names on a single line, separated by spaces.
    #[default]
    Human,

    /// Machine-readable output format.
    Serializable(SerializableFormat),
}

/// A serialized, machine-readable output format.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SerializableFormat {
    /// JSON with no whitespace.
    Json,
    /// JSON, prettified.
    JsonPretty,
}

impl SerializableFormat {
    /// Write the summary in this format to the writer.
    pub fn to_writer(
        self,
        summary: &TestListSummary,
        writer: impl io::Write,
    ) -> serde_json::Result<()> {
        summary.write_json(matches!(self, SerializableFormat::JsonPretty), writer)
    }
}
