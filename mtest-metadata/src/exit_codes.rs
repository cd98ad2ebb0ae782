// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for mtest test binaries.
///
/// A test binary may fail for a variety of reasons. This structure documents the exit codes that
/// may occur in case of expected failures.
///
/// A unit that panics is not insulated by the runner, so such runs exit with whatever code the
/// panic runtime picks (101 by default).
pub enum MtestExitCode {}

impl MtestExitCode {
    /// No errors occurred and every selected test passed.
    pub const OK: i32 = 0;

    /// One or more tests failed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// A configuration issue was detected before any test ran.
    ///
    /// This covers unknown test names, an invalid thread count (from `--threads` or the
    /// `MTEST_TEST_THREADS` environment variable), a failure to query the number of CPUs, and
    /// command-line parse errors.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            MtestExitCode::OK,
            MtestExitCode::TEST_RUN_FAILED,
            MtestExitCode::SETUP_ERROR,
            MtestExitCode::WRITE_OUTPUT_ERROR,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b, "exit codes must be distinguishable");
            }
        }
    }
}
