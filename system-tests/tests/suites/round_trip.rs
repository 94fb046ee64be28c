// system-tests/tests/suites/round_trip.rs
// ============================================================================
// Module: Round-Trip Suite
// Description: Envelope round trips between host values and plugin types.
// Purpose: Validate that crossing the boundary loses nothing.
// Dependencies: helpers::fixtures, plugin-config-codec
// ============================================================================

//! ## Overview
//! For every parsed fixture value `v`, decoding `encode(v)` equals decoding
//! `v` in-process, and a plugin value survives value -> envelope -> value.

use plugin_config_codec::CodecError;
use plugin_config_codec::decode;
use plugin_config_codec::decode_into;
use plugin_config_codec::decode_value;
use plugin_config_codec::encode;
use plugin_config_codec::from_value;
use plugin_config_core::DynamicValue;
use serde::Deserialize;
use serde::Serialize;

use crate::helpers::fixtures::TaskConfig;
use crate::helpers::fixtures::allocation_vars;
use crate::helpers::fixtures::cases;
use crate::helpers::fixtures::driver_parser;

#[test]
fn parsed_values_cross_the_boundary_unchanged() {
    let parser = driver_parser();
    let vars = allocation_vars();
    for case in cases() {
        let from_blocks = parser.parse_block_syntax(case.block_syntax, &vars);
        let from_json = parser.parse_json(case.json, &vars);
        for (value, _) in [from_blocks, from_json] {
            let envelope = encode(&value);
            assert_eq!(decode_value(&envelope).unwrap(), value, "{}", case.name);
            let in_process: TaskConfig = from_value(&value).unwrap();
            let across: TaskConfig = decode(&envelope).unwrap();
            assert_eq!(across, in_process, "{}", case.name);
        }
    }
}

#[test]
fn plugin_values_survive_projection() {
    for case in cases() {
        let projected = DynamicValue::from_json(&serde_json::to_value(&case.expected).unwrap());
        let decoded: TaskConfig = decode(&encode(&projected)).unwrap();
        assert_eq!(decoded, case.expected, "{}", case.name);
    }
}

/// Older plugin build that predates most driver options.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct LegacyTaskConfig {
    image: String,
    pids_limit: u16,
    auth_soft_fail: bool,
}

#[test]
fn older_plugins_ignore_newer_fields_and_keep_their_defaults() {
    let (value, diagnostics) = driver_parser().parse_block_syntax(
        r#"
config {
  image = "redis:3.2"
  pids_limit = "${NOMAD_ALLOC_INDEX + 2}"
  network_mode = "host"
}
"#,
        &allocation_vars(),
    );
    assert!(diagnostics.is_empty());

    let mut target = LegacyTaskConfig {
        auth_soft_fail: true,
        ..LegacyTaskConfig::default()
    };
    decode_into(&encode(&value), &mut target).unwrap();
    assert_eq!(target, LegacyTaskConfig {
        image: "redis:3.2".to_string(),
        pids_limit: 4,
        auth_soft_fail: true,
    });
}

#[test]
fn out_of_range_fields_fail_without_blocking_others() {
    let value = DynamicValue::object([
        ("image", DynamicValue::from("redis:3.2")),
        ("pids_limit", DynamicValue::from(70_000_i64)),
    ]);
    let mut target = LegacyTaskConfig::default();
    let err = decode_into(&encode(&value), &mut target).unwrap_err();
    assert!(
        matches!(err, CodecError::FieldTypeMismatch { ref field, .. } if field == "pids_limit"),
        "{err}"
    );
    assert_eq!(target.image, "redis:3.2");
    assert_eq!(target.pids_limit, 0);
}
