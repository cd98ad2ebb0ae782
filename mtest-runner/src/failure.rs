// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure records and the per-test sink that collects them.
//!
//! A running unit receives a [`TestContext`] and reports defects through it, usually via the check
//! macros exported at the crate root:
//!
//! * **Expectations** (`expect!`, `expect_eq!`, ...) record a soft failure and let the unit
//!   continue.
//! * **Requirements** (`require!`, `require_eq!`, ...) record a hard failure and return early from
//!   the unit with a [`HardFailure`].
//!
//! ```
//! use mtest_runner::{expect, expect_eq, failure::{TestContext, TestResult}, require};
//!
//! fn basic(cx: &mut TestContext) -> TestResult {
//!     expect_eq!(cx, 100, 200);
//!     expect!(cx, 200 > 0);
//!     require!(cx, 10 - 10 != 0);
//!     expect!(cx, false); // never reached
//!     Ok(())
//! }
//!
//! let mut cx = TestContext::new();
//! assert!(basic(&mut cx).is_err());
//! assert_eq!(cx.failures().len(), 2);
//! ```
//!
//! The context is owned by the worker running the unit, so the failure log has exactly one writer.
//! Once the unit returns, the context is frozen into a [`TestOutcome`].

use std::{borrow::Cow, fmt, time::Duration};

/// The result returned by a test unit.
///
/// `Err` means that a hard failure stopped the unit; the failure itself has already been recorded
/// in the [`TestContext`].
pub type TestResult = Result<(), HardFailure>;

/// Marker returned by a unit that was stopped by a hard failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use = "return this from the unit to stop it"]
pub struct HardFailure {
    _private: (),
}

/// A location in a source file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SourceLocation {
    /// The file name, as produced by `file!()`.
    pub file: &'static str,

    /// The line number, as produced by `line!()`.
    pub line: u32,
}

impl SourceLocation {
    /// Creates a new source location.
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Whether a failure stopped the unit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// A soft failure: the unit kept running.
    Expectation,

    /// A hard failure: the unit stopped at this point.
    Assertion,
}

impl FailureKind {
    /// Returns the verb used in failure messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Expectation => "expected",
            Self::Assertion => "asserted",
        }
    }
}

/// Stringified operands of a failed comparison check.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Operands {
    /// The left-hand operand, rendered with `Debug`.
    pub lhs: String,

    /// The right-hand operand, rendered with `Debug`.
    pub rhs: String,
}

/// A single recorded failure. Immutable once created.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Failure {
    kind: FailureKind,
    location: SourceLocation,
    message: Cow<'static, str>,
    operands: Option<Operands>,
}

impl Failure {
    /// Creates a failure for a boolean check.
    pub fn condition(kind: FailureKind, location: SourceLocation, expr: &'static str) -> Self {
        Self {
            kind,
            location,
            message: format!("{} \"{expr}\" to be true, found false", kind.verb()).into(),
            operands: None,
        }
    }

    /// Creates a failure for a comparison check such as `lhs == rhs`.
    pub fn comparison(
        kind: FailureKind,
        location: SourceLocation,
        expr: &'static str,
        lhs: String,
        rhs: String,
    ) -> Self {
        Self {
            kind,
            location,
            message: format!("{} \"{expr}\", found {lhs} and {rhs}", kind.verb()).into(),
            operands: Some(Operands { lhs, rhs }),
        }
    }

    /// Creates a failure with a free-form message.
    pub fn message(
        kind: FailureKind,
        location: SourceLocation,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
            operands: None,
        }
    }

    /// Returns whether this failure stopped the unit.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the source location of the failed check.
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Returns the human-readable message, without the location prefix.
    pub fn message_str(&self) -> &str {
        &self.message
    }

    /// Returns the stringified operands, for comparison checks.
    pub fn operands(&self) -> Option<&Operands> {
        self.operands.as_ref()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.location, self.message)
    }
}

/// The failure sink handed to a running unit.
#[derive(Debug, Default)]
pub struct TestContext {
    failures: Vec<Failure>,
}

impl TestContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure.
    ///
    /// For hard failures, prefer [`Self::record_hard`] so the unit can return the marker.
    pub fn record(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Records a hard failure and returns the marker that stops the unit.
    pub fn record_hard(&mut self, failure: Failure) -> HardFailure {
        debug_assert_eq!(failure.kind(), FailureKind::Assertion);
        self.failures.push(failure);
        HardFailure { _private: () }
    }

    /// Records a soft failure with a free-form message at the caller's location.
    #[track_caller]
    pub fn fail(&mut self, message: impl Into<Cow<'static, str>>) {
        let location = caller_location();
        self.record(Failure::message(
            FailureKind::Expectation,
            location,
            message,
        ));
    }

    /// Records a hard failure with a free-form message at the caller's location.
    ///
    /// Return the result from the unit: `return Err(cx.abort("..."))`.
    #[track_caller]
    pub fn abort(&mut self, message: impl Into<Cow<'static, str>>) -> HardFailure {
        let location = caller_location();
        self.record_hard(Failure::message(FailureKind::Assertion, location, message))
    }

    /// Returns the failures recorded so far.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Freezes this context into the outcome of a finished unit.
    pub fn finish(self, result: TestResult, time_taken: Duration) -> TestOutcome {
        TestOutcome {
            failures: self.failures,
            aborted: result.is_err(),
            time_taken,
        }
    }
}

#[track_caller]
fn caller_location() -> SourceLocation {
    let caller = std::panic::Location::caller();
    SourceLocation::new(caller.file(), caller.line())
}

/// The outcome of a finished test.
#[derive(Clone, Debug)]
pub struct TestOutcome {
    failures: Vec<Failure>,
    aborted: bool,
    time_taken: Duration,
}

impl TestOutcome {
    /// Returns true if no failures were recorded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the recorded failures, in the order they happened.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Returns true if the unit was stopped by a hard failure.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns the wall-clock time the unit took to run.
    pub fn time_taken(&self) -> Duration {
        self.time_taken
    }
}

/// Expands to the [`SourceLocation`] of the macro invocation.
#[doc(hidden)]
#[macro_export]
macro_rules! __mtest_location {
    () => {
        $crate::failure::SourceLocation::new(::core::file!(), ::core::line!())
    };
}

/// Records a soft failure if `cond` is false. The unit keeps running.
#[macro_export]
macro_rules! expect {
    ($cx:expr, $cond:expr $(,)?) => {
        if !$cond {
            $cx.record($crate::failure::Failure::condition(
                $crate::failure::FailureKind::Expectation,
                $crate::__mtest_location!(),
                ::core::stringify!($cond),
            ));
        }
    };
}

/// Records a hard failure and returns from the unit if `cond` is false.
#[macro_export]
macro_rules! require {
    ($cx:expr, $cond:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($cx.record_hard(
                $crate::failure::Failure::condition(
                    $crate::failure::FailureKind::Assertion,
                    $crate::__mtest_location!(),
                    ::core::stringify!($cond),
                ),
            ));
        }
    };
}

/// Shared expansion for comparison checks. Evaluates to `Some(failure)` if the comparison fails.
#[doc(hidden)]
#[macro_export]
macro_rules! __mtest_compare {
    ($kind:ident, $lhs:expr, $op:tt, $rhs:expr) => {
        match (&$lhs, &$rhs) {
            (lhs, rhs) => {
                if !(*lhs $op *rhs) {
                    ::core::option::Option::Some($crate::failure::Failure::comparison(
                        $crate::failure::FailureKind::$kind,
                        $crate::__mtest_location!(),
                        ::core::concat!(
                            ::core::stringify!($lhs),
                            " ",
                            ::core::stringify!($op),
                            " ",
                            ::core::stringify!($rhs)
                        ),
                        ::std::format!("{:?}", lhs),
                        ::std::format!("{:?}", rhs),
                    ))
                } else {
                    ::core::option::Option::None
                }
            }
        }
    };
}

/// Records a soft failure unless `lhs op rhs` holds, e.g. `expect_op!(cx, a, <=, b)`.
#[macro_export]
macro_rules! expect_op {
    ($cx:expr, $lhs:expr, $op:tt, $rhs:expr $(,)?) => {
        if let ::core::option::Option::Some(failure) =
            $crate::__mtest_compare!(Expectation, $lhs, $op, $rhs)
        {
            $cx.record(failure);
        }
    };
}

/// Records a hard failure and returns from the unit unless `lhs op rhs` holds.
#[macro_export]
macro_rules! require_op {
    ($cx:expr, $lhs:expr, $op:tt, $rhs:expr $(,)?) => {
        if let ::core::option::Option::Some(failure) =
            $crate::__mtest_compare!(Assertion, $lhs, $op, $rhs)
        {
            return ::core::result::Result::Err($cx.record_hard(failure));
        }
    };
}

/// Records a soft failure unless `lhs == rhs`.
#[macro_export]
macro_rules! expect_eq {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::expect_op!($cx, $lhs, ==, $rhs)
    };
}

/// Records a soft failure unless `lhs != rhs`.
#[macro_export]
macro_rules! expect_ne {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::expect_op!($cx, $lhs, !=, $rhs)
    };
}

/// Records a soft failure unless `lhs < rhs`.
#[macro_export]
macro_rules! expect_lt {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::expect_op!($cx, $lhs, <, $rhs)
    };
}

/// Records a soft failure unless `lhs <= rhs`.
#[macro_export]
macro_rules! expect_le {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::expect_op!($cx, $lhs, <=, $rhs)
    };
}

/// Records a soft failure unless `lhs > rhs`.
#[macro_export]
macro_rules! expect_gt {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::expect_op!($cx, $lhs, >, $rhs)
    };
}

/// Records a soft failure unless `lhs >= rhs`.
#[macro_export]
macro_rules! expect_ge {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::expect_op!($cx, $lhs, >=, $rhs)
    };
}

/// Records a hard failure and returns unless `lhs == rhs`.
#[macro_export]
macro_rules! require_eq {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::require_op!($cx, $lhs, ==, $rhs)
    };
}

/// Records a hard failure and returns unless `lhs != rhs`.
#[macro_export]
macro_rules! require_ne {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::require_op!($cx, $lhs, !=, $rhs)
    };
}

/// Records a hard failure and returns unless `lhs < rhs`.
#[macro_export]
macro_rules! require_lt {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::require_op!($cx, $lhs, <, $rhs)
    };
}

/// Records a hard failure and returns unless `lhs <= rhs`.
#[macro_export]
macro_rules! require_le {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::require_op!($cx, $lhs, <=, $rhs)
    };
}

/// Records a hard failure and returns unless `lhs > rhs`.
#[macro_export]
macro_rules! require_gt {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::require_op!($cx, $lhs, >, $rhs)
    };
}

/// Records a hard failure and returns unless `lhs >= rhs`.
#[macro_export]
macro_rules! require_ge {
    ($cx:expr, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::require_op!($cx, $lhs, >=, $rhs)
    };
}
