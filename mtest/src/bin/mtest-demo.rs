// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A small test binary exercising passing, soft-failing and hard-failing tests.

use color_eyre::Result;
use mtest::{
    TestContext, TestRegistry, TestResult, expect, expect_eq, expect_ge, expect_lt, require,
    require_eq,
};
use std::{thread, time::Duration};

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

fn is_prime_test(cx: &mut TestContext) -> TestResult {
    expect!(cx, !is_prime(1));
    expect!(cx, is_prime(2));
    expect!(cx, is_prime(97));
    // 91 = 7 * 13.
    expect!(cx, is_prime(91));
    require!(cx, !is_prime(100));
    Ok(())
}

fn basic_test(cx: &mut TestContext) -> TestResult {
    let words = ["alpha", "beta"];
    require_eq!(cx, words.len(), 3);
    // Not reached.
    expect!(cx, words.is_empty());
    Ok(())
}

fn comparison_test(cx: &mut TestContext) -> TestResult {
    let (a, b) = (3, 5);
    expect_lt!(cx, a, b);
    expect_ge!(cx, a, b);
    expect_eq!(cx, a + b, 8);
    Ok(())
}

fn ok_test(cx: &mut TestContext) -> TestResult {
    expect_eq!(cx, "mtest".len(), 5);
    Ok(())
}

fn slow_test(cx: &mut TestContext) -> TestResult {
    thread::sleep(Duration::from_millis(300));
    expect!(cx, true);
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = enable_ansi_support::enable_ansi_support();

    let registry = TestRegistry::new()
        .with_test("IsPrimeTest", is_prime_test)?
        .with_test("BasicTest", basic_test)?
        .with_test("ComparisonTest", comparison_test)?
        .with_test("OkTest", ok_test)?
        .with_test("SlowTest", slow_test)?;

    std::process::exit(mtest::run_main(&registry))
}
