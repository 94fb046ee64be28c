// system-tests/tests/suites/notation_equivalence.rs
// ============================================================================
// Module: Notation Equivalence Suite
// Description: Host parses both notations and the plugin decodes the result.
// Purpose: Validate that block syntax and JSON reach identical plugin values.
// Dependencies: helpers::fixtures, plugin-config-codec, plugin-config-parser
// ============================================================================

//! ## Overview
//! Every fixture case is parsed in both notations by the host, encoded,
//! decoded by the plugin, and compared against the expected [`TaskConfig`].

use plugin_config_codec::decode;
use plugin_config_codec::encode;
use plugin_config_core::DynamicValue;
use plugin_config_parser::DiagnosticKind;

use crate::helpers::fixtures::TaskConfig;
use crate::helpers::fixtures::allocation_vars;
use crate::helpers::fixtures::cases;
use crate::helpers::fixtures::driver_parser;

#[test]
fn every_case_agrees_across_notations() {
    let parser = driver_parser();
    let vars = allocation_vars();
    for case in cases() {
        let (from_block, block_diagnostics) = parser.parse_block_syntax(case.block_syntax, &vars);
        let (from_json, json_diagnostics) = parser.parse_json(case.json, &vars);
        assert!(block_diagnostics.is_empty(), "{}: {block_diagnostics}", case.name);
        assert!(json_diagnostics.is_empty(), "{}: {json_diagnostics}", case.name);
        assert_eq!(from_block, from_json, "{}", case.name);

        let decoded: TaskConfig = decode(&encode(&from_block)).unwrap();
        assert_eq!(decoded, case.expected, "{}", case.name);
    }
}

#[test]
fn omitted_block_lists_reach_the_plugin_as_empty_lists() {
    let parser = driver_parser();
    let source = r#"{"Config": {"image": "x", "devices": null}}"#;
    let (value, diagnostics) = parser.parse_json(source, &allocation_vars());
    assert!(diagnostics.is_empty());
    assert_eq!(value.get("devices"), Some(&DynamicValue::List(Vec::new())));
    assert_eq!(value.get("mounts"), Some(&DynamicValue::List(Vec::new())));
    let decoded: TaskConfig = decode(&encode(&value)).unwrap();
    assert!(decoded.devices.is_empty());
}

#[test]
fn missing_required_image_is_reported_once() {
    let parser = driver_parser();
    let vars = allocation_vars();
    let sources =
        [("config {\n  pids_limit = 1\n}\n", false), (r#"{"Config": {"pids_limit": 1}}"#, true)];
    for (source, from_json) in sources {
        let (_, diagnostics) = if from_json {
            parser.parse_json(source, &vars)
        } else {
            parser.parse_block_syntax(source, &vars)
        };
        let missing: Vec<_> = diagnostics.of_kind(DiagnosticKind::MissingRequiredField).collect();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].path.ends_with(".image"));
        assert!(diagnostics.has_errors());
    }
}
