// system-tests/tests/suites/runner_contracts.rs
// ============================================================================
// Module: Runner Contract Suite
// Description: Option rendering and environment orchestration checks.
// Purpose: Ensure runs are configured and sequenced deterministically.
// Dependencies: helpers::stubs, system-tests
// ============================================================================

//! ## Overview
//! Exercises [`RunOptions`] rendering, [`run_environments`] and
//! [`run_configured`] with scripted runners and static provisioners.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use system_tests::Endpoints;
use system_tests::HarnessError;
use system_tests::Provisioner;
use system_tests::RunOptions;
use system_tests::Target;
use system_tests::TestReport;
use system_tests::config::SystemTestConfig;
use system_tests::runner::run_configured;
use system_tests::runner::run_environments;

use crate::helpers::stubs::ScriptedRunner;
use crate::helpers::stubs::StaticProvisioner;

const PASSING: &str = r#"{"Action":"pass","Package":"e2e","Test":"TestDocker"}"#;
const FAILING: &str = r#"{"Action":"fail","Package":"e2e","Test":"TestDocker"}"#;

fn endpoints() -> Endpoints {
    Endpoints {
        api_addr: Some("http://10.0.0.1:4646".to_string()),
        catalog_addr: Some("http://10.0.0.1:8500".to_string()),
        secrets_addr: None,
    }
}

#[test]
fn local_runs_render_local_flag() {
    let options = RunOptions::local("e2e").with_config(&SystemTestConfig {
        slow: true,
        run_filter: Some("Docker".to_string()),
        timeout: Some(Duration::from_secs(600)),
        ..SystemTestConfig::default()
    });
    assert_eq!(options.args(), vec![
        "test",
        "-json",
        "e2e",
        "-run=Docker",
        "-timeout=600s",
        "-slow",
        "-local"
    ]);
    assert_eq!(options.env(), vec![("PLUGIN_CONFIG_E2E".to_string(), "1".to_string())]);
}

#[test]
fn environment_runs_render_target_and_endpoints() {
    let target = Target::parse("aws/rc").unwrap();
    let options = RunOptions::local("e2e").against(target, endpoints());
    assert_eq!(options.args(), vec!["test", "-json", "e2e", "-env=rc", "-env.provider=aws"]);
    assert_eq!(options.env(), vec![
        ("PLUGIN_CONFIG_E2E".to_string(), "1".to_string()),
        ("PLUGIN_HOST_ADDR".to_string(), "http://10.0.0.1:4646".to_string()),
        ("CATALOG_HTTP_ADDR".to_string(), "http://10.0.0.1:8500".to_string()),
    ]);
}

#[test]
fn targets_require_provider_and_environment() {
    assert!(Target::parse("aws").is_err());
    assert!(Target::parse("aws/rc/extra").is_err());
    assert!(Target::parse("/rc").is_err());
    assert_eq!(Target::parse("aws/rc").unwrap().to_string(), "aws/rc");
}

#[test]
fn environments_run_in_order() {
    let runner = ScriptedRunner::new(PASSING);
    let first = StaticProvisioner {
        target: Target::parse("aws/rc").unwrap(),
        endpoints: Some(endpoints()),
    };
    let second = StaticProvisioner {
        target: Target::parse("gcp/edge").unwrap(),
        endpoints: Some(Endpoints::default()),
    };
    let environments: [&dyn Provisioner; 2] = [&first, &second];
    let base = RunOptions::local("e2e");
    let reports = run_environments(&runner, &base, Path::new("/bin/host"), &environments).unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|entry| entry.report.passed()));
    let calls = runner.calls();
    assert_eq!(calls[0].target, Some(first.target.clone()));
    assert_eq!(calls[0].endpoints, endpoints());
    assert_eq!(calls[1].target, Some(second.target.clone()));
}

#[test]
fn provisioning_failures_stop_the_loop() {
    let runner = ScriptedRunner::new(PASSING);
    let broken = StaticProvisioner {
        target: Target::parse("aws/rc").unwrap(),
        endpoints: None,
    };
    let environments: [&dyn Provisioner; 1] = [&broken];
    let base = RunOptions::local("e2e");
    let err = run_environments(&runner, &base, Path::new("/bin/host"), &environments).unwrap_err();
    assert!(matches!(err, HarnessError::Provision { .. }));
    assert!(runner.calls().is_empty());
}

#[test]
fn configured_runs_without_environments_stay_local() {
    let runner = ScriptedRunner::new(PASSING);
    let config = SystemTestConfig {
        timeout: Some(Duration::from_secs(30)),
        ..SystemTestConfig::default()
    };
    let reports = run_configured(&runner, "e2e", &config, &[]).unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].target, None);
    let calls = runner.calls();
    assert!(calls[0].is_local());
    assert_eq!(calls[0].args(), vec!["test", "-json", "e2e", "-timeout=30s", "-local"]);
}

#[test]
fn configured_environment_runs_need_a_host_binary() {
    let runner = ScriptedRunner::new(PASSING);
    let provisioner = StaticProvisioner {
        target: Target::parse("aws/rc").unwrap(),
        endpoints: Some(endpoints()),
    };
    let environments: [&dyn Provisioner; 1] = [&provisioner];
    let config = SystemTestConfig::default();
    let err = run_configured(&runner, "e2e", &config, &environments).unwrap_err();
    assert!(matches!(err, HarnessError::Config { .. }));
    assert!(runner.calls().is_empty());
}

#[test]
fn configured_host_binary_reaches_the_provisioner() {
    let runner = ScriptedRunner::new(PASSING);
    let broken = StaticProvisioner {
        target: Target::parse("aws/rc").unwrap(),
        endpoints: None,
    };
    let config = SystemTestConfig {
        host_binary: Some(PathBuf::from("/opt/host/plugin-host")),
        ..SystemTestConfig::default()
    };
    let environments: [&dyn Provisioner; 1] = [&broken];
    let err = run_configured(&runner, "e2e", &config, &environments).unwrap_err();
    let HarnessError::Provision {
        reason, ..
    } = err
    else {
        panic!("expected a provisioning failure");
    };
    assert!(reason.contains("/opt/host/plugin-host"));
}

#[test]
fn outcome_shows_the_summary_for_failures_or_when_verbose() {
    let passed = TestReport::from_events(PASSING.as_bytes()).unwrap();
    let failed = TestReport::from_events(FAILING.as_bytes()).unwrap();
    let quiet = RunOptions::local("e2e");
    let verbose = RunOptions::local("e2e").with_config(&SystemTestConfig {
        verbose: true,
        ..SystemTestConfig::default()
    });

    assert_eq!(quiet.outcome(&passed), "PASSED!");
    assert!(verbose.outcome(&passed).starts_with("PASSED!\ntests: 1 passed: 1"));
    assert!(quiet.outcome(&failed).starts_with("***FAILED***\n"));
    assert!(quiet.outcome(&failed).contains("FAIL e2e TestDocker"));
}
