// system-tests/tests/helpers/fixtures.rs
// ============================================================================
// Module: Driver Fixtures
// Description: Container driver schema, plugin-side types, and config cases.
// Purpose: Share one realistic plugin across the end-to-end suites.
// Dependencies: plugin-config-core, plugin-config-parser, serde
// ============================================================================

//! ## Overview
//! The fixture plays both roles of the boundary: [`driver_spec`] is what the
//! plugin publishes to the host, and [`TaskConfig`] is the plugin-owned type
//! the envelope is decoded into. The two are written independently, the same
//! way a real plugin and host would be built.

use std::collections::BTreeMap;

use plugin_config_core::DynamicValue;
use plugin_config_core::Spec;
use plugin_config_core::VariableBinding;
use plugin_config_parser::ConfigParser;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Host Side
// ============================================================================

/// Schema the driver plugin publishes.
pub fn driver_spec() -> Spec {
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

/// Parser bound to the driver schema.
pub fn driver_parser() -> ConfigParser {
    ConfigParser::new(&driver_spec()).expect("driver schema compiles")
}

/// Variables the host injects for an allocation.
pub fn allocation_vars() -> VariableBinding {
    VariableBinding::from([
        ("NOMAD_ALLOC_INDEX".to_string(), DynamicValue::from(2_i64)),
        ("NOMAD_META_hello".to_string(), DynamicValue::from("world")),
    ])
}

// ============================================================================
// SECTION: Plugin Side
// ============================================================================

/// Device passthrough settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub host_path: String,
    pub container_path: String,
    pub cgroup_permissions: String,
}

/// Logging driver settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub config: BTreeMap<String, String>,
}

/// Mount settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
    pub source: String,
    pub readonly: bool,
}

/// Plugin-owned task configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub image: String,
    pub args: Vec<String>,
    pub pids_limit: i64,
    pub network_mode: String,
    pub dns_servers: Vec<String>,
    pub port_map: BTreeMap<String, i64>,
    pub devices: Vec<DeviceConfig>,
    pub logging: Option<LoggingConfig>,
    pub mounts: Vec<MountConfig>,
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// One configuration written in both notations.
pub struct Case {
    pub name: &'static str,
    pub block_syntax: &'static str,
    pub json: &'static str,
    pub expected: TaskConfig,
}

fn image(image: &str) -> TaskConfig {
    TaskConfig {
        image: image.to_string(),
        ..TaskConfig::default()
    }
}

/// Driver configurations with their expected plugin-side values.
pub fn cases() -> Vec<Case> {
    vec![
        Case {
            name: "single string attribute",
            block_syntax: "config {\n  image = \"redis:3.2\"\n}\n",
            json: r#"{"Config": {"image": "redis:3.2"}}"#,
            expected: image("redis:3.2"),
        },
        Case {
            name: "number attribute",
            block_syntax: "config {\n  image = \"redis:3.2\"\n  pids_limit = 2\n}\n",
            json: r#"{"Config": {"image": "redis:3.2", "pids_limit": 2}}"#,
            expected: TaskConfig {
                pids_limit: 2,
                ..image("redis:3.2")
            },
        },
        Case {
            name: "number attribute from string",
            block_syntax: "config {\n  image = \"redis:3.2\"\n  pids_limit = \"2\"\n}\n",
            json: r#"{"Config": {"image": "redis:3.2", "pids_limit": "2"}}"#,
            expected: TaskConfig {
                pids_limit: 2,
                ..image("redis:3.2")
            },
        },
        Case {
            name: "number attribute from arithmetic",
            block_syntax: "config {\n  image = \"redis:3.2\"\n  pids_limit = \"${2 + 2}\"\n}\n",
            json: r#"{"Config": {"image": "redis:3.2", "pids_limit": "${2 + 2}"}}"#,
            expected: TaskConfig {
                pids_limit: 4,
                ..image("redis:3.2")
            },
        },
        Case {
            name: "list of strings",
            block_syntax: "config {\n  image = \"redis:3.2\"\n  args = [\"foo\", \"bar\"]\n}\n",
            json: r#"{"Config": {"image": "redis:3.2", "args": ["foo", "bar"]}}"#,
            expected: TaskConfig {
                args: vec!["foo".to_string(), "bar".to_string()],
                ..image("redis:3.2")
            },
        },
        Case {
            name: "interpolated variables",
            block_syntax: r#"
config {
  image = "redis:3.2"
  args = ["${NOMAD_META_hello}", "${NOMAD_ALLOC_INDEX}"]
  pids_limit = "${NOMAD_ALLOC_INDEX + 2}"
}
"#,
            json: r#"{"Config": {"image": "redis:3.2",
                "args": ["${NOMAD_META_hello}", "${NOMAD_ALLOC_INDEX}"],
                "pids_limit": "${NOMAD_ALLOC_INDEX + 2}"}}"#,
            expected: TaskConfig {
                args: vec!["world".to_string(), "2".to_string()],
                pids_limit: 4,
                ..image("redis:3.2")
            },
        },
        Case {
            name: "port map",
            block_syntax: r#"
config {
  image = "redis:3.2"
  port_map {
    foo = 1234
    bar = 5678
  }
}
"#,
            json: r#"{"Config": {"image": "redis:3.2", "port_map": [{"foo": 1234, "bar": 5678}]}}"#,
            expected: TaskConfig {
                port_map: BTreeMap::from([("bar".to_string(), 5678), ("foo".to_string(), 1234)]),
                ..image("redis:3.2")
            },
        },
        Case {
            name: "devices",
            block_syntax: r#"config {
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
"#,
            json: r#"{"Config": {"image": "redis:3.2", "devices": [
                {"host_path": "/dev/sda1", "container_path": "/dev/xvdc",
                 "cgroup_permissions": "r"},
                {"host_path": "/dev/sda2", "container_path": "/dev/xvdd"}]}}"#,
            expected: TaskConfig {
                devices: vec![
                    DeviceConfig {
                        host_path: "/dev/sda1".to_string(),
                        container_path: "/dev/xvdc".to_string(),
                        cgroup_permissions: "r".to_string(),
                    },
                    DeviceConfig {
                        host_path: "/dev/sda2".to_string(),
                        container_path: "/dev/xvdd".to_string(),
                        cgroup_permissions: String::new(),
                    },
                ],
                ..image("redis:3.2")
            },
        },
        Case {
            name: "nested logging block",
            block_syntax: r#"config {
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
"#,
            json: r#"{"Config": {"image": "redis:3.2", "network_mode": "host",
                "dns_servers": ["169.254.1.1"],
                "logging": [{"type": "syslog", "config": [{"tag": "driver-test"}]}]}}"#,
            expected: TaskConfig {
                network_mode: "host".to_string(),
                dns_servers: vec!["169.254.1.1".to_string()],
                logging: Some(LoggingConfig {
                    kind: "syslog".to_string(),
                    config: BTreeMap::from([("tag".to_string(), "driver-test".to_string())]),
                }),
                ..image("redis:3.2")
            },
        },
        Case {
            name: "mount defaults",
            block_syntax: r#"
config {
  image = "redis:3.2"
  mounts {
    target = "/data"
    readonly = true
  }
}
"#,
            json: r#"{"Config": {"image": "redis:3.2",
                "mounts": [{"target": "/data", "readonly": "true"}]}}"#,
            expected: TaskConfig {
                mounts: vec![MountConfig {
                    kind: "volume".to_string(),
                    target: "/data".to_string(),
                    source: String::new(),
                    readonly: true,
                }],
                ..image("redis:3.2")
            },
        },
    ]
}
