// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    output::{OutputContext, OutputOpts, OutputWriter, StatusLine, StderrStyles, clap_styles},
};
use clap::{Parser, ValueEnum, error::ErrorKind};
use mtest_metadata::MtestExitCode;
use mtest_runner::{
    config::TestThreads,
    list::{OutputFormat, SerializableFormat, TestRegistry},
    reporter::TestReporterBuilder,
    runner::TestRunnerBuilder,
    test_filter::TestFilterBuilder,
};
use std::{ffi::OsString, io::Write};
use tracing::debug;

/// Runs the tests in a registry, using the process's command-line arguments.
///
/// Returns the exit code the process should terminate with. Pass it to
/// [`std::process::exit`].
///
/// `MTEST_TEST_THREADS` is read after the command line is parsed, and only when tests are about to
/// run: `--help`, `--version` and `--list` ignore it, even if it is invalid.
pub fn run_main(registry: &TestRegistry) -> i32 {
    run_main_with_args(registry, std::env::args_os(), &mut OutputWriter::default())
}

/// Runs the tests in a registry, using the given command-line arguments. The first argument is
/// the binary name.
pub fn run_main_with_args<I, T>(registry: &TestRegistry, args: I, writer: &mut OutputWriter) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let app = match MtestApp::try_parse_from(args) {
        Ok(app) => app,
        Err(err) => return handle_parse_error(err),
    };
    let output = app.output.init();

    match app.exec(registry, output, writer) {
        Ok(code) => code,
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            error.process_exit_code()
        }
    }
}

fn handle_parse_error(err: clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            MtestExitCode::OK
        }
        _ => {
            let error = ExpectedError::from(err);
            error.display_to_stderr(&StderrStyles::default());
            error.process_exit_code()
        }
    }
}

/// Command-line options for an mtest test binary.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style())]
pub struct MtestApp {
    /// Number of tests to run simultaneously [possible values: integer or "num-cpus"]
    #[arg(
        long,
        short = 'j',
        visible_alias = "test-threads",
        value_name = "THREADS"
    )]
    threads: Option<TestThreads>,

    /// List all registered tests and exit
    #[arg(long)]
    list: bool,

    /// Output format for --list
    #[arg(long, value_enum, default_value_t, value_name = "FMT")]
    message_format: MessageFormat,

    /// Skip tests whose names contain PATTERN
    #[arg(long, value_name = "PATTERN")]
    skip: Vec<String>,

    /// Show a live status line of worker activity: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        value_name = "WHEN"
    )]
    status_line: StatusLine,

    #[command(flatten)]
    output: OutputOpts,

    /// Run only the named tests, in the order given
    #[arg(value_name = "TEST")]
    names: Vec<String>,
}

impl MtestApp {
    fn exec(
        self,
        registry: &TestRegistry,
        output: OutputContext,
        writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        if self.list {
            let mut stdout = writer.stdout_writer();
            registry.write(self.message_format.into(), &mut stdout)?;
            stdout
                .flush()
                .map_err(mtest_runner::errors::WriteTestListError::Io)?;
            return Ok(MtestExitCode::OK);
        }

        // The environment override is validated even when --threads is passed.
        let env_threads = TestThreads::from_env()?;
        let test_threads = TestThreads::resolve(self.threads, env_threads);
        debug!(%test_threads, "resolved thread count");

        let filter = TestFilterBuilder::new(self.names, self.skip.as_slice())?;
        let test_list = filter.build(registry)?;

        let runner = TestRunnerBuilder::default()
            .set_test_threads(test_threads)
            .set_status_line(self.status_line.should_show(writer))
            .build(&test_list)?;

        let mut reporter = TestReporterBuilder::default()
            .set_colorize(output.colorize_stdout())
            .build(writer.reporter_output());

        let run_stats = runner.execute(&mut reporter)?;
        if run_stats.is_success() {
            Ok(MtestExitCode::OK)
        } else {
            Ok(MtestExitCode::TEST_RUN_FAILED)
        }
    }
}

/// The format `--list` writes in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum MessageFormat {
    /// Test names on a single line, separated by spaces.
    #[default]
    Human,
    /// JSON, on a single line.
    Json,
    /// Indented JSON.
    JsonPretty,
}

impl From<MessageFormat> for OutputFormat {
    fn from(format: MessageFormat) -> Self {
        match format {
            MessageFormat::Human => OutputFormat::Human,
            MessageFormat::Json => OutputFormat::Serializable(SerializableFormat::Json),
            MessageFormat::JsonPretty => OutputFormat::Serializable(SerializableFormat::JsonPretty),
        }
    }
}
