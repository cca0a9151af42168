//! Shared fixtures for confstack integration tests.
//!
//! Provides:
//! - A representative service configuration with nested, embedded and optional sections
//! - JSON file and environment map builders

#![allow(dead_code)]

use confstack::specification;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

/// HTTP listener settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

specification!(ServerConfig {
    host(env = "HOSTNAME", default = "127.0.0.1"),
    port(default = "3000"),
    timeout(default = "5s"),
});

/// Settings shared by every deployment, keyed without a section name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub region: String,
    pub debug: bool,
}

specification!(Deployment {
    region(default = "eu-west-1"),
    debug,
});

/// Optional metrics exporter settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub endpoint: String,
    pub interval: Duration,
}

specification!(MetricsConfig {
    endpoint,
    interval(default = "15s"),
});

/// Root configuration used across the integration tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub workers: u32,
    pub ratio: f64,
    pub tags: Vec<String>,
    pub ports: Vec<u16>,
    pub server: ServerConfig,
    pub deployment: Deployment,
    pub metrics: Option<Box<MetricsConfig>>,
    pub max_retries: Option<u8>,
    pub api_token: String,
    pub labels: HashMap<String, String>,
}

specification!(ServiceConfig {
    name(default = "service"),
    workers(default = "5"),
    ratio(default = "0.5"),
    tags,
    ports,
    server,
    deployment(embedded),
    metrics,
    max_retries,
    api_token(ignored, default = "not-applied"),
    labels,
});

/// Write `contents` to a temporary JSON file that lives as long as the handle.
pub fn json_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

/// Build an environment map from key/value pairs.
pub fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
