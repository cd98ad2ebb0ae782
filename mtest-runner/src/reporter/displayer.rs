// Copyright (c) The mtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    RunStats,
    events::{TestEvent, WorkerStatus},
    helpers::{Styles, banner},
};
use crate::{
    errors::WriteEventError,
    failure::TestOutcome,
    helpers::{DEFAULT_TERMINAL_WIDTH, decimal_char_width, name_width, plural, terminal_width},
    list::{RunMode, TestInstance, TestList},
};
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Where a [`TestReporter`] writes its output.
pub enum ReporterOutput<'a> {
    /// Write to the process's standard output.
    Terminal,

    /// Write to the given buffer.
    Buffer(&'a mut Vec<u8>),

    /// Write to the given writer, flushing after each event.
    Writer(&'a mut (dyn Write + Send)),
}

/// Test reporter builder.
#[derive(Debug, Default)]
pub struct TestReporterBuilder {
    should_colorize: bool,
    terminal_width: Option<usize>,
}

impl TestReporterBuilder {
    /// Sets whether the output should be colorized.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets the width used to center banners. By default, the width of the terminal attached to
    /// standard output is used, or 80 columns when writing to a buffer or writer.
    pub fn set_terminal_width(&mut self, width: usize) -> &mut Self {
        self.terminal_width = Some(width);
        self
    }

    /// Creates a new test reporter.
    pub fn build<'a>(&self, output: ReporterOutput<'a>) -> TestReporter<'a> {
        let mut styles = Styles::default();
        if self.should_colorize {
            styles.colorize();
        }

        let terminal_width = self.terminal_width.unwrap_or_else(|| match &output {
            ReporterOutput::Terminal => terminal_width(),
            ReporterOutput::Buffer(_) | ReporterOutput::Writer(_) => DEFAULT_TERMINAL_WIDTH,
        });

        TestReporter {
            output,
            styles,
            terminal_width,
            run_mode: RunMode::Full,
            name_width: 0,
            status_shown: false,
        }
    }
}

/// Functionality to report test results to standard output.
pub struct TestReporter<'a> {
    output: ReporterOutput<'a>,
    styles: Styles,
    terminal_width: usize,
    run_mode: RunMode,
    name_width: usize,
    // Whether the last thing written was a status line that must be cleared before the next write.
    status_shown: bool,
}

impl TestReporter<'_> {
    /// Report a test event.
    pub fn report_event(&mut self, event: TestEvent<'_>) -> Result<(), WriteEventError> {
        let mut buf = Vec::with_capacity(256);
        self.write_event(event, &mut buf)?;
        if buf.is_empty() {
            return Ok(());
        }

        match &mut self.output {
            ReporterOutput::Terminal => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(&buf)?;
                // Status lines don't end in a newline.
                stdout.flush()?;
            }
            ReporterOutput::Buffer(out) => out.extend_from_slice(&buf),
            ReporterOutput::Writer(writer) => {
                writer.write_all(&buf)?;
                writer.flush()?;
            }
        }
        Ok(())
    }

    fn write_event(&mut self, event: TestEvent<'_>, writer: &mut dyn Write) -> io::Result<()> {
        match event {
            TestEvent::RunStarted {
                test_list,
                worker_count,
                start_time,
            } => {
                self.run_mode = test_list.mode();
                self.name_width = test_list.name_width();
                if self.run_mode.is_selected() {
                    return Ok(());
                }

                let header = format!(
                    "TEST RUN ({} total): {}",
                    test_list.run_count(),
                    start_time.format("%m/%d/%Y %H:%M"),
                );
                writeln!(
                    writer,
                    "{}",
                    banner(&header, self.terminal_width, self.styles.count)
                )?;

                write!(
                    writer,
                    "    > Testing on {} {}",
                    worker_count.style(self.styles.count),
                    plural::threads_str(worker_count),
                )?;
                let skip_count = test_list.skip_count();
                if skip_count > 0 {
                    write!(
                        writer,
                        ", {} {} skipped",
                        skip_count.style(self.styles.count),
                        plural::tests_str(skip_count),
                    )?;
                }
                writeln!(writer)?;
            }
            TestEvent::TestFinished {
                worker,
                sequence,
                test_instance,
                outcome,
                run_stats,
            } => {
                if self.run_mode.is_selected() {
                    return Ok(());
                }
                self.clear_status(writer)?;
                self.write_progress_line(
                    worker,
                    sequence,
                    test_instance,
                    outcome,
                    &run_stats,
                    writer,
                )?;
            }
            TestEvent::StatusSnapshot { workers } => {
                self.clear_status(writer)?;
                write!(writer, "[")?;
                for (i, status) in workers.iter().enumerate() {
                    if i > 0 {
                        write!(writer, ", ")?;
                    }
                    match status {
                        WorkerStatus::Idle => write!(writer, "(idle)")?,
                        WorkerStatus::Joining => write!(writer, "(joining)")?,
                        WorkerStatus::Running(name) => write!(writer, "{name}")?,
                    }
                }
                write!(writer, "]")?;
                self.status_shown = true;
            }
            TestEvent::RunFinished {
                test_list,
                elapsed,
                run_stats,
            } => {
                self.clear_status(writer)?;
                if !self.run_mode.is_selected() {
                    writeln!(
                        writer,
                        "    > Finished testing in {:.1} seconds",
                        elapsed.as_secs_f64()
                    )?;
                }
                self.write_summary(test_list, &run_stats, writer)?;
            }
        }
        Ok(())
    }

    fn write_progress_line(
        &self,
        worker: usize,
        sequence: usize,
        test_instance: &TestInstance<'_>,
        outcome: &TestOutcome,
        run_stats: &RunStats,
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        let total = run_stats.initial_run_count;
        let name = test_instance.name();
        let name_padding = self.name_width.saturating_sub(name_width(name));

        write!(
            writer,
            "    [{}] {:>seq_width$} / {}    {:name_padding$}{} ... ",
            worker.style(self.styles.worker),
            sequence,
            total,
            "",
            name,
            seq_width = decimal_char_width(total),
        )?;

        if outcome.is_success() {
            write!(writer, "{}     ", "OK".style(self.styles.pass))?;
        } else {
            write!(writer, "{} ", "FAILED".style(self.styles.fail))?;
        }

        writeln!(writer, "( {} ms )", outcome.time_taken().as_millis())
    }

    fn write_summary(
        &self,
        test_list: &TestList<'_>,
        run_stats: &RunStats,
        writer: &mut dyn Write,
    ) -> io::Result<()> {
        if run_stats.is_success() {
            return writeln!(
                writer,
                "{}",
                banner("ALL TESTS PASSED", self.terminal_width, self.styles.pass)
            );
        }

        let header = format!(
            "SUMMARY OF {} FAILED {}",
            run_stats.failed,
            plural::tests_upper_str(run_stats.failed),
        );
        writeln!(
            writer,
            "{}",
            banner(&header, self.terminal_width, self.styles.fail)
        )?;

        for (instance, outcome) in test_list.failed() {
            writeln!(writer, "{}:", instance.name().style(self.styles.count))?;
            for failure in outcome.failures() {
                writeln!(writer, "    {failure}")?;
            }
        }
        Ok(())
    }

    fn clear_status(&mut self, writer: &mut dyn Write) -> io::Result<()> {
        if self.status_shown {
            write!(writer, "\r{:width$}\r", "", width = self.terminal_width)?;
            self.status_shown = false;
        }
        Ok(())
    }
}
