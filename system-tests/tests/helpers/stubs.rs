// system-tests/tests/helpers/stubs.rs
// ============================================================================
// Module: Harness Stubs
// Description: In-memory runner and provisioner implementations.
// Purpose: Exercise harness orchestration without external infrastructure.
// Dependencies: system-tests
// ============================================================================

//! ## Overview
//! [`ScriptedRunner`] replays a fixed event stream and records the options it
//! was called with; [`StaticProvisioner`] hands out fixed endpoints or a
//! fixed failure.

use std::path::Path;
use std::sync::Mutex;

use system_tests::Endpoints;
use system_tests::HarnessError;
use system_tests::Provisioner;
use system_tests::RunOptions;
use system_tests::Target;
use system_tests::TestReport;
use system_tests::TestRunner;

/// Runner that replays one event stream per call.
pub struct ScriptedRunner {
    pub events: &'static str,
    pub calls: Mutex<Vec<RunOptions>>,
}

impl ScriptedRunner {
    pub fn new(events: &'static str) -> Self {
        Self {
            events,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RunOptions> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl TestRunner for ScriptedRunner {
    fn run(&self, options: &RunOptions) -> Result<TestReport, HarnessError> {
        self.calls.lock().expect("calls lock").push(options.clone());
        TestReport::from_events(self.events.as_bytes())
    }
}

/// Provisioner returning fixed endpoints, or failing when `endpoints` is `None`.
pub struct StaticProvisioner {
    pub target: Target,
    pub endpoints: Option<Endpoints>,
}

impl Provisioner for StaticProvisioner {
    fn target(&self) -> &Target {
        &self.target
    }

    fn provision(&self, binary_path: &Path) -> Result<Endpoints, HarnessError> {
        self.endpoints.clone().ok_or_else(|| HarnessError::Provision {
            target: self.target.to_string(),
            reason: format!("cannot start {}", binary_path.display()),
        })
    }
}
