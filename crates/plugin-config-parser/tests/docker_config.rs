// crates/plugin-config-parser/tests/docker_config.rs
// ============================================================================
// Module: Driver Task Config Parsing Tests
// Description: End-to-end parsing of a container driver's task configuration.
// Purpose: Validate notation equivalence, zero values, interpolation, and diagnostics.
// ============================================================================

//! Driver task config parsing tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use plugin_config_core::DynamicValue;
use plugin_config_core::Spec;
use plugin_config_core::VariableBinding;
use plugin_config_core::compile;
use plugin_config_parser::ConfigParser;
use plugin_config_parser::DiagnosticKind;
use plugin_config_parser::Diagnostics;
use plugin_config_parser::Notation;
use plugin_config_parser::ParseOptions;
use plugin_config_parser::Position;
use plugin_config_parser::parse;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn docker_spec() -> Spec {
    Spec::object([
        ("image", Spec::attr("image", "string", true)),
        ("args", Spec::attr("args", "list(string)", false)),
        ("pids_limit", Spec::attr("pids_limit", "number", false)),
        ("network_mode", Spec::attr("network_mode", "string", false)),
        ("dns_servers", Spec::attr("dns_servers", "list(string)", false)),
        ("port_map", Spec::block_attrs("port_map", "number", false)),
        (
            "devices",
            Spec::block_list(
                "devices",
                Spec::object([
                    ("host_path", Spec::attr("host_path", "string", false)),
                    ("container_path", Spec::attr("container_path", "string", false)),
                    ("cgroup_permissions", Spec::attr("cgroup_permissions", "string", false)),
                ]),
            ),
        ),
        (
            "logging",
            Spec::block(
                "logging",
                false,
                Spec::object([
                    ("type", Spec::attr("type", "string", false)),
                    ("config", Spec::block_attrs("config", "string", false)),
                ]),
            ),
        ),
        (
            "mounts",
            Spec::block_list(
                "mounts",
                Spec::object([
                    (
                        "type",
                        Spec::default_value(Spec::attr("type", "string", false), "volume".into()),
                    ),
                    ("target", Spec::attr("target", "string", false)),
                    ("source", Spec::attr("source", "string", false)),
                    ("readonly", Spec::attr("readonly", "bool", false)),
                ]),
            ),
        ),
    ])
}

fn vars() -> VariableBinding {
    VariableBinding::from([
        ("NOMAD_ALLOC_INDEX".to_string(), DynamicValue::from(2_i64)),
        ("NOMAD_META_hello".to_string(), DynamicValue::from("world")),
    ])
}

fn parser() -> ConfigParser {
    ConfigParser::new(&docker_spec()).unwrap()
}

fn hcl(source: &str) -> (DynamicValue, Diagnostics) {
    parser().parse_block_syntax(source, &vars())
}

fn json(source: &str) -> (DynamicValue, Diagnostics) {
    parser().parse_json(source, &vars())
}

fn clean(result: (DynamicValue, Diagnostics)) -> DynamicValue {
    let (value, diagnostics) = result;
    assert!(diagnostics.is_empty(), "unexpected diagnostics:\n{diagnostics}");
    value
}

fn strings(items: &[&str]) -> DynamicValue {
    DynamicValue::List(items.iter().map(|item| DynamicValue::from(*item)).collect())
}

/// Task config with only the image set, as every omitted field decodes.
fn image_only(image: &str) -> DynamicValue {
    DynamicValue::object([
        ("image", DynamicValue::from(image)),
        ("args", DynamicValue::List(Vec::new())),
        ("pids_limit", DynamicValue::from(0_i64)),
        ("network_mode", DynamicValue::from("")),
        ("dns_servers", DynamicValue::List(Vec::new())),
        ("port_map", DynamicValue::Null),
        ("devices", DynamicValue::List(Vec::new())),
        ("logging", DynamicValue::Null),
        ("mounts", DynamicValue::List(Vec::new())),
    ])
}

fn with(mut base: DynamicValue, key: &str, value: DynamicValue) -> DynamicValue {
    if let DynamicValue::Object(map) = &mut base {
        map.insert(key.to_string(), value);
    }
    base
}

// ============================================================================
// SECTION: Notation Equivalence
// ============================================================================

#[test]
fn single_string_attribute_in_both_notations() {
    let from_hcl = clean(hcl("config {\n  image = \"redis:3.2\"\n}\n"));
    let from_json = clean(json(r#"{"Config": {"image": "redis:3.2"}}"#));
    assert_eq!(from_hcl, image_only("redis:3.2"));
    assert_eq!(from_json, from_hcl);
}

#[test]
fn numeric_attributes_accept_numbers_and_numeric_strings() {
    let from_hcl = clean(hcl("config {\n  image = \"redis:3.2\"\n  pids_limit = 2\n}\n"));
    let from_json = clean(json(r#"{"Config": {"image": "redis:3.2", "pids_limit": "2"}}"#));
    let expected = with(image_only("redis:3.2"), "pids_limit", DynamicValue::from(2_i64));
    assert_eq!(from_hcl, expected);
    assert_eq!(from_json, expected);
}

#[test]
fn interpolated_arithmetic_yields_a_number() {
    let source = "config {\n  image = \"redis:3.2\"\n  pids_limit = \"${2 + 2}\"\n}\n";
    let from_hcl = clean(hcl(source));
    let from_json = clean(json(r#"{"Config": {"image": "redis:3.2", "pids_limit": "${2 + 2}"}}"#));
    let expected = with(image_only("redis:3.2"), "pids_limit", DynamicValue::from(4_i64));
    assert_eq!(from_hcl, expected);
    assert_eq!(from_json, expected);
}

#[test]
fn variables_are_substituted() {
    let source = r#"
config {
  image = "redis:3.2"
  args = ["${NOMAD_META_hello}", "${NOMAD_ALLOC_INDEX}"]
  pids_limit = "${NOMAD_ALLOC_INDEX + 2}"
}
"#;
    let value = clean(hcl(source));
    assert_eq!(value.get("args").unwrap(), &strings(&["world", "2"]));
    assert_eq!(value.get("pids_limit").unwrap(), &DynamicValue::from(4_i64));

    let from_json = clean(json(
        r#"{"Config": {"image": "redis:3.2",
            "args": ["${NOMAD_META_hello}", "${NOMAD_ALLOC_INDEX}"],
            "pids_limit": "${NOMAD_ALLOC_INDEX + 2}"}}"#,
    ));
    assert_eq!(from_json, value);
}

#[test]
fn port_map_block_and_json_list_agree() {
    let from_hcl = clean(hcl(
        "config {\n  image = \"redis:3.2\"\n  port_map {\n    foo = 1234\n    bar = 5678\n  }\n}\n",
    ));
    let from_json = clean(json(
        r#"{"Config": {"image": "redis:3.2", "port_map": [{"foo": 1234, "bar": 5678}]}}"#,
    ));
    let ports = DynamicValue::object([
        ("bar", DynamicValue::from(5678_i64)),
        ("foo", DynamicValue::from(1234_i64)),
    ]);
    assert_eq!(from_hcl, with(image_only("redis:3.2"), "port_map", ports));
    assert_eq!(from_json, from_hcl);
}

#[test]
fn devices_as_blocks_attribute_list_and_json_agree() {
    let as_blocks = clean(hcl(r#"
config {
  image = "redis:3.2"
  devices {
    host_path = "/dev/sda1"
    container_path = "/dev/xvdc"
    cgroup_permissions = "r"
  }
  devices {
    host_path = "/dev/sda2"
    container_path = "/dev/xvdd"
  }
}
"#));
    let as_attribute = clean(hcl(r#"
config {
  image = "redis:3.2"
  devices = [
    {
      host_path = "/dev/sda1"
      container_path = "/dev/xvdc"
      cgroup_permissions = "r"
    },
    {
      host_path = "/dev/sda2"
      container_path = "/dev/xvdd"
    }
  ]
}
"#));
    let as_json = clean(json(
        r#"{"Config": {"image": "redis:3.2", "devices": [
            {"host_path": "/dev/sda1", "container_path": "/dev/xvdc", "cgroup_permissions": "r"},
            {"host_path": "/dev/sda2", "container_path": "/dev/xvdd"}]}}"#,
    ));

    let device = |host: &str, container: &str, permissions: &str| {
        DynamicValue::object([
            ("cgroup_permissions", DynamicValue::from(permissions)),
            ("container_path", DynamicValue::from(container)),
            ("host_path", DynamicValue::from(host)),
        ])
    };
    let expected = with(
        image_only("redis:3.2"),
        "devices",
        DynamicValue::List(vec![
            device("/dev/sda1", "/dev/xvdc", "r"),
            device("/dev/sda2", "/dev/xvdd", ""),
        ]),
    );
    assert_eq!(as_blocks, expected);
    assert_eq!(as_attribute, expected);
    assert_eq!(as_json, expected);
}

#[test]
fn nested_logging_block_with_attribute_map() {
    let from_hcl = clean(hcl(r#"
config {
  image = "redis:3.2"
  network_mode = "host"
  dns_servers = ["169.254.1.1"]
  logging {
    type = "syslog"
    config {
      tag = "driver-test"
    }
  }
}
"#));
    let from_json = clean(json(
        r#"{"Config": {"image": "redis:3.2", "network_mode": "host", "dns_servers": ["169.254.1.1"],
            "logging": [{"type": "syslog", "config": [{"tag": "driver-test"}]}]}}"#,
    ));
    let logging = DynamicValue::object([
        ("config", DynamicValue::object([("tag", DynamicValue::from("driver-test"))])),
        ("type", DynamicValue::from("syslog")),
    ]);
    assert_eq!(from_hcl.get("logging").unwrap(), &logging);
    assert_eq!(from_hcl.get("dns_servers").unwrap(), &strings(&["169.254.1.1"]));
    assert_eq!(from_json, from_hcl);
}

#[test]
fn defaults_fill_absent_block_attributes() {
    let source = "config {\n  image = \"x\"\n  mounts {\n    target = \"/data\"\n  }\n}\n";
    let value = clean(hcl(source));
    let mounts = value.get("mounts").and_then(DynamicValue::as_list).unwrap();
    assert_eq!(mounts[0].get("type").unwrap(), &DynamicValue::from("volume"));
    assert_eq!(mounts[0].get("readonly").unwrap(), &DynamicValue::Bool(false));
}

#[test]
fn root_block_name_is_case_insensitive() {
    assert_eq!(clean(hcl("CONFIG { image = \"x\" }\n")), image_only("x"));
    assert_eq!(clean(json(r#"{"config": [{"image": "x"}]}"#)), image_only("x"));
}

// ============================================================================
// SECTION: Null And Omitted Fields
// ============================================================================

fn null_fields_spec() -> Spec {
    let sub = || Spec::object([("f", Spec::attr("f", "string", true))]);
    Spec::object([
        ("array_field", Spec::attr("array_field", "list(string)", false)),
        ("string_field", Spec::attr("string_field", "string", false)),
        ("boolean_field", Spec::attr("boolean_field", "bool", false)),
        ("number_field", Spec::attr("number_field", "number", false)),
        ("block_field", Spec::block("block_field", false, sub())),
        ("block_list_field", Spec::block_list("block_list_field", sub())),
    ])
}

#[test]
fn omitted_and_null_fields_decode_to_zero_values() {
    let plan = compile(&null_fields_spec()).unwrap();
    let expected = DynamicValue::object([
        ("array_field", DynamicValue::List(Vec::new())),
        ("block_field", DynamicValue::Null),
        ("block_list_field", DynamicValue::List(Vec::new())),
        ("boolean_field", DynamicValue::Bool(false)),
        ("number_field", DynamicValue::from(0_i64)),
        ("string_field", DynamicValue::from("")),
    ]);
    let vars = VariableBinding::new();

    let (omitted, diagnostics) = parse(r#"{"Config": {}}"#, Notation::Json, &plan, &vars);
    assert!(diagnostics.is_empty());
    assert_eq!(omitted, expected);

    let explicit = r#"{"Config": {"array_field": null, "string_field": null, "boolean_field": null,
        "number_field": null, "block_field": null, "block_list_field": null}}"#;
    let (nulls, diagnostics) = parse(explicit, Notation::Json, &plan, &vars);
    assert!(diagnostics.is_empty());
    assert_eq!(nulls, expected);

    let source = "config {\n  string_field = null\n}\n";
    let (from_hcl, diagnostics) = parse(source, Notation::BlockSyntax, &plan, &vars);
    assert!(diagnostics.is_empty());
    assert_eq!(from_hcl, expected);
}

#[test]
fn explicitly_set_fields_are_kept() {
    let plan = compile(&null_fields_spec()).unwrap();
    let source = r#"{"Config": {"array_field": ["a"], "string_field": "a", "boolean_field": true,
        "number_field": 5, "block_field": [{"f": "a"}],
        "block_list_field": [{"f": "a"}, {"f": "b"}]}}"#;
    let (value, diagnostics) = parse(source, Notation::Json, &plan, &VariableBinding::new());
    assert!(diagnostics.is_empty());
    assert_eq!(value.get("number_field").unwrap(), &DynamicValue::from(5_i64));
    let block = DynamicValue::object([("f", DynamicValue::from("a"))]);
    assert_eq!(value.get("block_field").unwrap(), &block);
    let items = value.get("block_list_field").and_then(DynamicValue::as_list).map(<[_]>::len);
    assert_eq!(items, Some(2));
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

#[test]
fn missing_required_attribute_is_reported() {
    let (value, diagnostics) = hcl("config {\n  args = [\"a\"]\n}\n");
    let missing: Vec<_> = diagnostics.of_kind(DiagnosticKind::MissingRequiredField).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].path, "config.image");
    assert_eq!(value.get("image").unwrap(), &DynamicValue::Null);
    assert_eq!(value.get("args").unwrap(), &strings(&["a"]));
}

#[test]
fn missing_root_block_yields_null() {
    let (value, diagnostics) = json(r#"{"Task": {}}"#);
    assert!(value.is_null());
    assert!(diagnostics.of_kind(DiagnosticKind::MissingRequiredField).any(|d| d.path == "config"));
    assert!(diagnostics.of_kind(DiagnosticKind::UnsupportedField).any(|d| d.path == "Task"));
}

#[test]
fn unsupported_argument_reports_path_and_position() {
    let (_, diagnostics) = hcl("config {\n  image = \"redis:7\"\n  imgae = \"typo\"\n}\n");
    let unsupported: Vec<_> = diagnostics.of_kind(DiagnosticKind::UnsupportedField).collect();
    assert_eq!(unsupported.len(), 1);
    assert_eq!(unsupported[0].path, "config.imgae");
    assert_eq!(unsupported[0].position, Some(Position {
        line: 3,
        column: 3
    }));
}

#[test]
fn repeated_single_block_keeps_first() {
    let source = r#"
config {
  image = "x"
  logging {
    type = "syslog"
  }
  logging {
    type = "journald"
  }
}
"#;
    let (value, diagnostics) = hcl(source);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::BlockCount).count(), 1);
    assert_eq!(
        value.get("logging").and_then(|logging| logging.get("type")),
        Some(&DynamicValue::from("syslog"))
    );
}

#[test]
fn coercion_failures_carry_list_index_paths() {
    let source = r#"
config {
  image = "x"
  pids_limit = "lots"
  devices {
    host_path = "/dev/sda1"
  }
  devices {
    host_path = "/dev/sda2"
    cgroup_permissions = ["r"]
  }
}
"#;
    let (value, diagnostics) = hcl(source);
    let paths: Vec<_> =
        diagnostics.of_kind(DiagnosticKind::TypeCoercionFailure).map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["config.devices[1].cgroup_permissions", "config.pids_limit"]);
    assert_eq!(value.get("pids_limit").unwrap(), &DynamicValue::Null);
}

#[test]
fn syntax_errors_are_recovered_line_by_line() {
    let source = concat!(
        "config {\n  image = \"x\"\n  pids_limit = = 4\n",
        "  args = [\"a\"]\n  dns_servers = [1,, 2]\n}\n",
    );
    let (value, diagnostics) = hcl(source);
    let lines: Vec<_> = diagnostics
        .of_kind(DiagnosticKind::Syntax)
        .filter_map(|d| d.position.map(|position| position.line))
        .collect();
    assert_eq!(lines, vec![3, 5]);
    assert_eq!(value.get("args").unwrap(), &strings(&["a"]));
    assert_eq!(value.get("image").unwrap(), &DynamicValue::from("x"));
}

#[test]
fn unresolved_variables_are_warnings() {
    let (value, diagnostics) = hcl("config {\n  image = \"redis:${NOMAD_META_tag}\"\n}\n");
    assert_eq!(value.get("image").unwrap(), &DynamicValue::from("redis:${NOMAD_META_tag}"));
    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics.has_errors());
}

#[test]
fn malformed_json_reports_position() {
    let (value, diagnostics) = json("{\"Config\": {\"image\": }}");
    assert!(value.is_null());
    let syntax: Vec<_> = diagnostics.of_kind(DiagnosticKind::Syntax).collect();
    assert_eq!(syntax.len(), 1);
    assert_eq!(syntax[0].position.map(|position| position.line), Some(1));
}

#[test]
fn oversized_source_is_rejected() {
    let options = ParseOptions {
        max_source_bytes: 16,
        ..ParseOptions::default()
    };
    let parser = parser().with_options(options).unwrap();
    let source = "config {\n  image = \"redis:3.2\"\n}\n";
    let (value, diagnostics) = parser.parse_block_syntax(source, &vars());
    assert!(value.is_null());
    assert_eq!(diagnostics.of_kind(DiagnosticKind::Syntax).count(), 1);
}

#[test]
fn custom_root_block_name() {
    let options = ParseOptions::from_toml_str("root_block = \"driver\"").unwrap();
    let parser = parser().with_options(options).unwrap();
    let value = clean(parser.parse_block_syntax("driver {\n  image = \"x\"\n}\n", &vars()));
    assert_eq!(value, image_only("x"));
}

// ============================================================================
// SECTION: Block Maps
// ============================================================================

#[test]
fn labelled_blocks_decode_to_nested_objects() {
    let spec = Spec::object([(
        "ports",
        Spec::block_map(
            "port",
            ["name"],
            Spec::object([("static", Spec::attr("static", "number", true))]),
        ),
    )]);
    let plan = compile(&spec).unwrap();
    let vars = VariableBinding::new();
    let (from_hcl, diagnostics) = parse(
        "config {\n  port \"http\" { static = 8080 }\n  port \"grpc\" { static = 9090 }\n}\n",
        Notation::BlockSyntax,
        &plan,
        &vars,
    );
    assert!(diagnostics.is_empty());
    let (from_json, diagnostics) = parse(
        r#"{"Config": {"port": {"http": {"static": 8080}, "grpc": {"static": 9090}}}}"#,
        Notation::Json,
        &plan,
        &vars,
    );
    assert!(diagnostics.is_empty());
    assert_eq!(from_hcl, from_json);
    assert_eq!(
        from_hcl
            .get("ports")
            .and_then(|ports| ports.get("http"))
            .and_then(|http| http.get("static")),
        Some(&DynamicValue::from(8080_i64))
    );

    let (_, diagnostics) = parse(
        "config {\n  port \"http\" { static = 1 }\n  port \"http\" { static = 2 }\n}\n",
        Notation::BlockSyntax,
        &plan,
        &vars,
    );
    assert_eq!(diagnostics.of_kind(DiagnosticKind::BlockCount).count(), 1);
}

// ============================================================================
// SECTION: Block Counts
// ============================================================================

fn volumes_spec(min: u32, max: u32) -> Spec {
    Spec::object([(
        "volumes",
        Spec::block_set("volume", Spec::object([("path", Spec::attr("path", "string", true))]))
            .with_items(min, max),
    )])
}

fn parse_hcl(spec: &Spec, source: &str) -> (DynamicValue, Diagnostics) {
    let plan = compile(spec).unwrap();
    parse(source, Notation::BlockSyntax, &plan, &VariableBinding::new())
}

#[test]
fn block_sets_drop_repeated_items_before_counting() {
    let source = r#"
config {
  volume { path = "/data" }
  volume { path = "/logs" }
  volume { path = "/data" }
}
"#;
    let (value, diagnostics) = parse_hcl(&volumes_spec(1, 2), source);
    assert!(diagnostics.is_empty(), "unexpected diagnostics:\n{diagnostics}");
    let volumes = value.get("volumes").unwrap();
    assert_eq!(
        volumes,
        &DynamicValue::List(vec![
            DynamicValue::object([("path", DynamicValue::from("/data"))]),
            DynamicValue::object([("path", DynamicValue::from("/logs"))]),
        ])
    );
}

#[test]
fn block_sets_enforce_item_bounds() {
    let (value, diagnostics) = parse_hcl(&volumes_spec(1, 2), "config {\n}\n");
    assert_eq!(value.get("volumes").unwrap(), &DynamicValue::List(Vec::new()));
    let counts: Vec<_> = diagnostics.of_kind(DiagnosticKind::BlockCount).collect();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].path, "config.volume");
    assert!(counts[0].message.contains("at least 1"));

    let source = r#"
config {
  volume { path = "/a" }
  volume { path = "/b" }
  volume { path = "/c" }
}
"#;
    let (_, diagnostics) = parse_hcl(&volumes_spec(0, 2), source);
    let counts: Vec<_> = diagnostics.of_kind(DiagnosticKind::BlockCount).collect();
    assert_eq!(counts.len(), 1);
    assert!(counts[0].message.contains("at most 2"));
}

#[test]
fn block_lists_keep_repeated_items_and_count_them() {
    let spec = Spec::object([(
        "mounts",
        Spec::block_list("mount", Spec::object([("target", Spec::attr("target", "string", false))]))
            .with_items(0, 1),
    )]);
    let source = "config {\n  mount { target = \"/a\" }\n  mount { target = \"/a\" }\n}\n";
    let (value, diagnostics) = parse_hcl(&spec, source);
    assert_eq!(value.get("mounts").and_then(DynamicValue::as_list).map(<[_]>::len), Some(2));
    assert_eq!(diagnostics.of_kind(DiagnosticKind::BlockCount).count(), 1);
}

#[test]
fn missing_required_blocks_are_reported() {
    let spec = Spec::object([
        (
            "network",
            Spec::block(
                "network",
                true,
                Spec::object([("mode", Spec::attr("mode", "string", false))]),
            ),
        ),
        ("labels", Spec::block_attrs("labels", "string", true)),
    ]);
    let (value, diagnostics) = parse_hcl(&spec, "config {\n}\n");
    let mut paths: Vec<_> = diagnostics
        .of_kind(DiagnosticKind::MissingRequiredField)
        .map(|d| d.path.as_str())
        .collect();
    paths.sort_unstable();
    assert_eq!(paths, vec!["config.labels", "config.network"]);
    assert_eq!(value.get("network").unwrap(), &DynamicValue::Null);
    assert_eq!(value.get("labels").unwrap(), &DynamicValue::Null);

    let source = "config {\n  network { mode = \"host\" }\n  labels { env = \"prod\" }\n}\n";
    let (value, diagnostics) = parse_hcl(&spec, source);
    assert!(diagnostics.is_empty(), "unexpected diagnostics:\n{diagnostics}");
    assert_eq!(
        value.get("labels").and_then(|labels| labels.get("env")),
        Some(&DynamicValue::from("prod"))
    );
}

// ============================================================================
// SECTION: Hostile Input
// ============================================================================

#[test]
fn long_operator_chains_are_rejected_without_overflow() {
    let chain = vec!["1"; 100_000].join(" + ");
    let source = format!("config {{\n  image = \"x\"\n  pids_limit = {chain}\n}}\n");
    let (value, diagnostics) = hcl(&source);
    let syntax: Vec<_> = diagnostics.of_kind(DiagnosticKind::Syntax).collect();
    assert_eq!(syntax.len(), 1);
    assert!(syntax[0].message.contains("nesting exceeds"));
    assert_eq!(value.get("image").unwrap(), &DynamicValue::from("x"));
    assert_eq!(value.get("pids_limit").unwrap(), &DynamicValue::from(0_i64));
}

#[test]
fn huge_exponents_are_rejected_quickly() {
    let (value, diagnostics) = json(r#"{"Config": {"image": "x", "pids_limit": "1e400000000"}}"#);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::TypeCoercionFailure).count(), 1);
    assert_eq!(value.get("pids_limit").unwrap(), &DynamicValue::Null);

    let (value, diagnostics) = hcl("config {\n  image = \"x\"\n  pids_limit = 1e400000000\n}\n");
    assert_eq!(diagnostics.of_kind(DiagnosticKind::Syntax).count(), 1);
    assert_eq!(value.get("image").unwrap(), &DynamicValue::from("x"));

    let (value, diagnostics) = hcl("config {\n  image = \"x\"\n  pids_limit = 1e4000\n}\n");
    assert!(diagnostics.is_empty(), "unexpected diagnostics:\n{diagnostics}");
    assert_eq!(value.get("pids_limit").unwrap(), &DynamicValue::Number("1e4000".parse().unwrap()));
}
