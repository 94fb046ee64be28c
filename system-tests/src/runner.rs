// system-tests/src/runner.rs
// ============================================================================
// Module: Test Runner Interfaces
// Description: Run options, provisioned endpoints, and runner/provisioner seams.
// Purpose: Drive suites locally or against provisioned environments.
// Dependencies: tracing, crate::{config, error, report}
// ============================================================================

//! ## Overview
//! A [`Provisioner`] turns a host binary into reachable [`Endpoints`]; a
//! [`TestRunner`] executes suites with [`RunOptions`] and returns a
//! [`TestReport`]. [`run_environments`] provisions and runs each target in
//! order and stops at the first infrastructure failure; [`run_configured`]
//! picks between a local run and that loop from [`SystemTestConfig`].
//! Invariants:
//! - Rendered arguments and environment depend only on the options.
//! - Failing tests never abort the loop; only harness errors do.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;

use crate::config::SystemTestConfig;
use crate::error::HarnessError;
use crate::report::TestReport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Marks a process as running end-to-end suites.
pub const E2E_FLAG_ENV: &str = "PLUGIN_CONFIG_E2E";
/// Address of the plugin host API.
pub const API_ADDR_ENV: &str = "PLUGIN_HOST_ADDR";
/// Address of the service catalog.
pub const CATALOG_ADDR_ENV: &str = "CATALOG_HTTP_ADDR";
/// Address of the secrets store.
pub const SECRETS_ADDR_ENV: &str = "SECRETS_ADDR";

// ============================================================================
// SECTION: Targets And Endpoints
// ============================================================================

/// Environment a suite runs against, written `<provider>/<environment>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Infrastructure provider, such as `aws`.
    pub provider: String,
    /// Environment name within the provider.
    pub environment: String,
}

impl Target {
    /// Parses `<provider>/<environment>`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidTarget`] unless the argument has exactly
    /// two non-empty segments.
    pub fn parse(raw: &str) -> Result<Self, HarnessError> {
        match raw.split('/').collect::<Vec<_>>().as_slice() {
            [provider, environment] if !provider.is_empty() && !environment.is_empty() => Ok(Self {
                provider: (*provider).to_string(),
                environment: (*environment).to_string(),
            }),
            _ => Err(HarnessError::InvalidTarget(raw.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.environment)
    }
}

/// Addresses of a provisioned environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoints {
    /// Plugin host API address.
    pub api_addr: Option<String>,
    /// Service catalog address.
    pub catalog_addr: Option<String>,
    /// Secrets store address.
    pub secrets_addr: Option<String>,
}

// ============================================================================
// SECTION: Run Options
// ============================================================================

/// Settings for one suite run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Suite or package to execute.
    pub suite: String,
    /// Environment the run targets; `None` runs locally.
    pub target: Option<Target>,
    /// Endpoints of the provisioned environment.
    pub endpoints: Endpoints,
    /// Optional test-name filter.
    pub run_filter: Option<String>,
    /// Include slow suites.
    pub slow: bool,
    /// Print the summary for passing runs too.
    pub verbose: bool,
    /// Per-run timeout handed to the runner.
    pub timeout: Option<Duration>,
}

impl RunOptions {
    /// Options for a local run of `suite`.
    #[must_use]
    pub fn local(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            target: None,
            endpoints: Endpoints::default(),
            run_filter: None,
            slow: false,
            verbose: false,
            timeout: None,
        }
    }

    /// Copies filter, flags, and timeout from environment configuration.
    #[must_use]
    pub fn with_config(mut self, config: &SystemTestConfig) -> Self {
        self.run_filter.clone_from(&config.run_filter);
        self.slow = config.slow;
        self.verbose = config.verbose;
        self.timeout = config.timeout;
        self
    }

    /// Targets a provisioned environment.
    #[must_use]
    pub fn against(mut self, target: Target, endpoints: Endpoints) -> Self {
        self.target = Some(target);
        self.endpoints = endpoints;
        self
    }

    /// Returns true when no environment is targeted.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.target.is_none()
    }

    /// Renders runner arguments.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["test".to_string(), "-json".to_string(), self.suite.clone()];
        if let Some(target) = &self.target {
            args.push(format!("-env={}", target.environment));
            args.push(format!("-env.provider={}", target.provider));
        }
        if let Some(filter) = &self.run_filter {
            args.push(format!("-run={filter}"));
        }
        if let Some(timeout) = self.timeout {
            args.push(format!("-timeout={}s", timeout.as_secs()));
        }
        if self.slow {
            args.push("-slow".to_string());
        }
        if self.is_local() {
            args.push("-local".to_string());
        }
        args
    }

    /// Renders the outcome line for a finished run.
    ///
    /// Failures always carry the summary; passes carry it when verbose.
    #[must_use]
    pub fn outcome(&self, report: &TestReport) -> String {
        match (report.passed(), self.verbose) {
            (true, false) => "PASSED!".to_string(),
            (true, true) => format!("PASSED!\n{}", report.summary()),
            (false, _) => format!("***FAILED***\n{}", report.summary()),
        }
    }

    /// Renders environment variables added to the runner process.
    #[must_use]
    pub fn env(&self) -> Vec<(String, String)> {
        let mut env = vec![(E2E_FLAG_ENV.to_string(), "1".to_string())];
        let endpoints = [
            (API_ADDR_ENV, &self.endpoints.api_addr),
            (CATALOG_ADDR_ENV, &self.endpoints.catalog_addr),
            (SECRETS_ADDR_ENV, &self.endpoints.secrets_addr),
        ];
        for (name, addr) in endpoints {
            if let Some(addr) = addr.as_ref().filter(|addr| !addr.is_empty()) {
                env.push((name.to_string(), addr.clone()));
            }
        }
        env
    }
}

// ============================================================================
// SECTION: Seams
// ============================================================================

/// Executes a suite and reports its outcome.
pub trait TestRunner {
    /// Runs the suite described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when no report could be produced.
    fn run(&self, options: &RunOptions) -> Result<TestReport, HarnessError>;
}

/// Brings up an environment for a host binary.
pub trait Provisioner {
    /// Environment this provisioner manages.
    fn target(&self) -> &Target;

    /// Provisions the environment and returns its endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Provision`] when the environment cannot be
    /// brought up.
    fn provision(&self, binary_path: &Path) -> Result<Endpoints, HarnessError>;
}

/// Runner that spawns a program and reads its JSON event stream from stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRunner {
    /// Program to execute.
    program: PathBuf,
}

impl CommandRunner {
    /// Creates a runner for `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TestRunner for CommandRunner {
    fn run(&self, options: &RunOptions) -> Result<TestReport, HarnessError> {
        let mut child = Command::new(&self.program)
            .args(options.args())
            .envs(options.env())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|err| {
                HarnessError::Io(format!("failed to start {}: {err}", self.program.display()))
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Io("runner stdout unavailable".to_string()))?;
        let report = TestReport::from_events(BufReader::new(stdout));
        let status = child.wait().map_err(|err| HarnessError::Io(err.to_string()))?;
        tracing::debug!(status = %status, "runner exited");
        report
    }
}

// ============================================================================
// SECTION: Orchestration
// ============================================================================

/// Report for one provisioned environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentReport {
    /// Environment the suite ran against; `None` for a local run.
    pub target: Option<Target>,
    /// Suite outcome.
    pub report: TestReport,
}

/// Provisions each environment in turn and runs the suite against it.
///
/// # Errors
///
/// Returns the first [`HarnessError`] from provisioning or running; reports
/// gathered before it are discarded.
pub fn run_environments<R: TestRunner>(
    runner: &R,
    base: &RunOptions,
    binary_path: &Path,
    environments: &[&dyn Provisioner],
) -> Result<Vec<EnvironmentReport>, HarnessError> {
    let total = environments.len();
    let mut reports = Vec::with_capacity(total);
    for (index, provisioner) in environments.iter().enumerate() {
        let target = provisioner.target().clone();
        tracing::debug!(target = %target, "provisioning environment");
        let endpoints = provisioner.provision(binary_path)?;
        let options = base.clone().against(target.clone(), endpoints);
        let report = runner.run(&options)?;
        tracing::info!(
            target = %target,
            position = index + 1,
            total,
            failed = report.total_failed_tests,
            outcome = %options.outcome(&report),
            "environment finished"
        );
        reports.push(EnvironmentReport {
            target: Some(target),
            report,
        });
    }
    Ok(reports)
}

/// Runs `suite` as configured: locally when no environments are given,
/// otherwise against each environment with the configured host binary.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] when environments are given without a
/// host binary, and otherwise the first error from provisioning or running.
pub fn run_configured<R: TestRunner>(
    runner: &R,
    suite: &str,
    config: &SystemTestConfig,
    environments: &[&dyn Provisioner],
) -> Result<Vec<EnvironmentReport>, HarnessError> {
    let base = RunOptions::local(suite).with_config(config);
    if environments.is_empty() {
        tracing::info!("no environments specified, running suite locally");
        let report = runner.run(&base)?;
        tracing::info!(outcome = %base.outcome(&report), "local run finished");
        return Ok(vec![EnvironmentReport {
            target: None,
            report,
        }]);
    }
    run_environments(runner, &base, config.host_binary()?, environments)
}
