// system-tests/src/report.rs
// ============================================================================
// Module: Test Report
// Description: Aggregated outcome of one system-test run.
// Purpose: Decode a runner's JSON event stream into pass/fail totals.
// Dependencies: serde, serde_json, crate::error
// ============================================================================

//! ## Overview
//! Runners emit one JSON event per line (`{"Action": "pass", "Test": ...}`).
//! [`TestReport::from_events`] folds the stream into totals and keeps the
//! captured output of each failed test for [`TestReport::summary`].
//! Package-level events carry no `Test` name and only contribute output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::BufRead;

use serde::Deserialize;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Action recorded by a test event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestAction {
    /// Test started.
    Run,
    /// Test paused.
    Pause,
    /// Test resumed.
    Cont,
    /// Test passed.
    Pass,
    /// Test failed.
    Fail,
    /// Test was skipped.
    Skip,
    /// Test produced output.
    Output,
    /// Benchmark result.
    Bench,
    /// Build output preceding the run.
    Start,
}

/// One line of a runner's event stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestEvent {
    /// What happened.
    pub action: TestAction,
    /// Package or suite the event belongs to.
    #[serde(default)]
    pub package: String,
    /// Test name; absent for package-level events.
    #[serde(default)]
    pub test: Option<String>,
    /// Output text for `output` events.
    #[serde(default)]
    pub output: Option<String>,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Failed test with the output it produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FailedTest {
    /// Package or suite name.
    pub package: String,
    /// Test name.
    pub name: String,
    /// Output lines captured before the failure.
    pub output: Vec<String>,
}

/// Totals for one system-test run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestReport {
    /// Tests that finished.
    pub total_tests: usize,
    /// Tests that passed.
    pub total_passed_tests: usize,
    /// Tests that were skipped.
    pub total_skipped_tests: usize,
    /// Tests that failed.
    pub total_failed_tests: usize,
    /// Failures in the order they were reported.
    pub failures: Vec<FailedTest>,
}

impl TestReport {
    /// Decodes a line-delimited JSON event stream.
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when reading fails and
    /// [`HarnessError::Event`] for a line that is not a valid event.
    pub fn from_events<R: BufRead>(reader: R) -> Result<Self, HarnessError> {
        let mut report = Self::default();
        let mut output: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| HarnessError::Io(err.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let event: TestEvent = serde_json::from_str(&line).map_err(|err| HarnessError::Event {
                line: index + 1,
                reason: err.to_string(),
            })?;
            report.record(event, &mut output);
        }
        Ok(report)
    }

    /// Folds one event into the totals.
    fn record(&mut self, event: TestEvent, output: &mut BTreeMap<(String, String), Vec<String>>) {
        let Some(test) = event.test else {
            return;
        };
        let key = (event.package, test);
        match event.action {
            TestAction::Output => {
                if let Some(text) = event.output {
                    output.entry(key).or_default().push(text.trim_end().to_string());
                }
            }
            TestAction::Pass => {
                self.total_tests += 1;
                self.total_passed_tests += 1;
                output.remove(&key);
            }
            TestAction::Skip => {
                self.total_tests += 1;
                self.total_skipped_tests += 1;
                output.remove(&key);
            }
            TestAction::Fail => {
                self.total_tests += 1;
                self.total_failed_tests += 1;
                let lines = output.remove(&key).unwrap_or_default();
                let (package, name) = key;
                self.failures.push(FailedTest {
                    package,
                    name,
                    output: lines,
                });
            }
            TestAction::Run
            | TestAction::Pause
            | TestAction::Cont
            | TestAction::Bench
            | TestAction::Start => {}
        }
    }

    /// Returns true when no test failed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.total_failed_tests == 0
    }

    /// Renders totals followed by each failure and its output.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!(
            "tests: {} passed: {} skipped: {} failed: {}\n",
            self.total_tests,
            self.total_passed_tests,
            self.total_skipped_tests,
            self.total_failed_tests
        );
        for failure in &self.failures {
            let _ = writeln!(out, "FAIL {} {}", failure.package, failure.name);
            for line in &failure.output {
                let _ = writeln!(out, "    {line}");
            }
        }
        out
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
