//! End-to-end layering tests for the loader.
//!
//! These tests inject the environment as a map so they can run in parallel;
//! the process environment is covered in `process_env.rs`.

mod common;

use common::{env_of, json_file, Deployment, MetricsConfig, ServerConfig, ServiceConfig};
use confstack::{specification, ConfigError, Loader};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

fn load_with(
    paths: &[&std::path::Path],
    env: HashMap<String, String>,
) -> Result<ServiceConfig, ConfigError> {
    Loader::new("app")
        .files(paths.iter().copied())
        .environment(env)
        .load()
}

#[test]
fn test_defaults_only() {
    let config = load_with(&[], env_of(&[])).expect("defaults should load");

    assert_eq!(
        config,
        ServiceConfig {
            name: "service".into(),
            workers: 5,
            ratio: 0.5,
            tags: Vec::new(),
            ports: Vec::new(),
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 3000,
                timeout: Duration::from_secs(5),
            },
            deployment: Deployment {
                region: "eu-west-1".into(),
                debug: false,
            },
            metrics: Some(Box::new(MetricsConfig {
                endpoint: String::new(),
                interval: Duration::from_secs(15),
            })),
            max_retries: None,
            api_token: String::new(),
            labels: HashMap::new(),
        }
    );
}

#[test]
fn test_duration_default_is_seconds_not_integer() {
    let config = load_with(&[], env_of(&[])).unwrap();
    assert_eq!(config.server.timeout, Duration::from_secs(5));
    assert_ne!(config.server.timeout, Duration::from_nanos(5));
}

#[test]
fn test_file_value_beats_default() {
    let file = json_file(r#"{"workers": 12, "server": {"port": 4000}}"#);
    let config = load_with(&[file.path()], env_of(&[])).unwrap();

    assert_eq!(config.workers, 12);
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.server.host, "127.0.0.1", "untouched by the file");
}

#[test]
fn test_file_only_field() {
    let file = json_file(r#"{"labels": {"team": "core"}, "max_retries": 4}"#);
    let config = load_with(&[file.path()], env_of(&[])).unwrap();

    assert_eq!(config.labels.get("team").map(String::as_str), Some("core"));
    assert_eq!(config.max_retries, Some(4));
}

#[test]
fn test_environment_beats_file_and_default() {
    let file = json_file(r#"{"workers": 12}"#);
    let config = load_with(&[file.path()], env_of(&[("APP_WORKERS", "20")])).unwrap();
    assert_eq!(config.workers, 20);
}

#[test]
fn test_environment_key_derivation() {
    let config = load_with(
        &[],
        env_of(&[
            ("APP_SERVER_PORT", "8080"),
            ("APP_PORT", "1"),
            ("APP_SERVER_HOSTNAME", "0.0.0.0"),
            ("APP_SERVER_HOST", "wrong"),
            ("APP_REGION", "us-east-2"),
            ("APP_DEPLOYMENT_REGION", "wrong"),
            ("APP_DEBUG", "true"),
            ("APP_METRICS_ENDPOINT", "http://collector:4318"),
        ]),
    )
    .unwrap();

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.deployment.region, "us-east-2");
    assert!(config.deployment.debug);
    assert_eq!(
        config.metrics.as_ref().map(|m| m.endpoint.as_str()),
        Some("http://collector:4318")
    );
}

#[test]
fn test_lists_from_environment() {
    let config = load_with(
        &[],
        env_of(&[("APP_TAGS", "a,b,c"), ("APP_PORTS", "80,0x1bb")]),
    )
    .unwrap();
    assert_eq!(config.tags, vec!["a", "b", "c"]);
    assert_eq!(config.ports, vec![80, 443]);
}

#[test]
fn test_list_element_failure() {
    let err = load_with(&[], env_of(&[("APP_PORTS", "1,2,x")])).unwrap_err();
    let parse = match err {
        ConfigError::Parse(parse) => parse,
        other => panic!("expected a parse error, got {other:?}"),
    };
    assert_eq!(parse.key.as_deref(), Some("APP_PORTS"));
    assert_eq!(parse.value, "1,2,x");
    assert!(parse.source.to_string().contains("\"x\""));
}

#[test]
fn test_empty_value_counts_as_set() {
    let file = json_file(r#"{"name": "from-file"}"#);
    let config = load_with(&[file.path()], env_of(&[("APP_NAME", "")])).unwrap();
    assert_eq!(config.name, "");
}

#[test]
fn test_ignored_field_untouched() {
    let config = load_with(&[], env_of(&[("APP_API_TOKEN", "secret")])).unwrap();
    assert_eq!(config.api_token, "");
}

#[test]
fn test_optional_scalar_set_from_environment() {
    let config = load_with(&[], env_of(&[("APP_MAX_RETRIES", "7")])).unwrap();
    assert_eq!(config.max_retries, Some(7));
}

#[test]
fn test_bad_files_do_not_fail_and_environment_still_runs() {
    let malformed = json_file("{\"workers\": ");
    let wrong_shape = json_file("[1, 2, 3]");
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let good = json_file(r#"{"name": "from-good-file"}"#);

    let config = load_with(
        &[malformed.path(), missing.as_path(), wrong_shape.path(), good.path()],
        env_of(&[("APP_WORKERS", "9")]),
    )
    .expect("unreadable or malformed files must not fail the load");

    assert_eq!(config.name, "from-good-file");
    assert_eq!(config.workers, 9);
}

#[test]
fn test_environment_conversion_failure() {
    let err = load_with(&[], env_of(&[("APP_SERVER_PORT", "70000")])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "confstack: assigning APP_SERVER_PORT to port: converting '70000' to type u16. \
         details: parsing \"70000\": value out of range"
    );
}

#[test]
fn test_absent_specification_rejected() {
    let loader = Loader::new("app").environment(env_of(&[("APP_WORKERS", "9")]));
    let err = loader
        .apply_optional::<ServiceConfig>(None)
        .expect_err("absent specification must be rejected");
    assert!(matches!(err, ConfigError::InvalidSpecification));

    let mut config = ServiceConfig::default();
    loader.apply_optional(Some(&mut config)).unwrap();
    assert_eq!(config.workers, 9);
}

/// Runtime settings with a field serde never reads or writes.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Runtime {
    name: String,
    #[serde(skip)]
    runtime_dir: String,
    ratio: f64,
    timeout: Duration,
}

specification!(Runtime {
    name,
    runtime_dir(default = "/run/app"),
    ratio(default = "nan"),
    timeout(default = "5s"),
});

fn load_runtime(contents: &str) -> Runtime {
    let file = json_file(contents);
    Loader::new("rt")
        .file(file.path())
        .environment(env_of(&[]))
        .load()
        .expect("runtime settings should load")
}

#[test]
fn test_file_keeps_defaults_of_fields_it_does_not_name() {
    let runtime = load_runtime(r#"{"name": "x"}"#);
    assert_eq!(runtime.name, "x");
    assert_eq!(runtime.runtime_dir, "/run/app");
    assert_eq!(runtime.timeout, Duration::from_secs(5));
}

#[test]
fn test_non_finite_default_does_not_block_file() {
    let runtime = load_runtime(r#"{"name": "from-file"}"#);
    assert_eq!(runtime.name, "from-file");
    assert!(runtime.ratio.is_nan());
}

#[test]
fn test_duration_member_in_nanoseconds() {
    let runtime = load_runtime(r#"{"name": "from-file", "timeout": 2000000000}"#);
    assert_eq!(runtime.name, "from-file");
    assert_eq!(runtime.timeout, Duration::from_secs(2));
}

#[test]
fn test_mismatched_member_keeps_rest_of_file() {
    let file = json_file(
        r#"{"name": "from-file", "workers": "many", "server": {"port": 4000, "host": 1}}"#,
    );
    let config = load_with(&[file.path()], env_of(&[])).unwrap();

    assert_eq!(config.name, "from-file");
    assert_eq!(config.workers, 5, "rejected member keeps the default");
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.server.host, "127.0.0.1");
}
