//! Orchestration of the three passes.

use crate::env::{Environment, ProcessEnv};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::merge_files;
use crate::schema::Specification;
use crate::walk::{fill_defaults, fill_environment};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration loader with file list and environment source.
///
/// Values are applied with the following priority (highest to lowest):
/// 1. Environment variables (`<PREFIX>_<PATH>_<FIELD>`)
/// 2. JSON files, later files first
/// 3. Declared field defaults
///
/// ```rust,ignore
/// let mut config = AppConfig::default();
/// Loader::new("app")
///     .files(confstack::search_paths("app"))
///     .path_var("APP_CONFIG")
///     .apply(&mut config)?;
/// ```
#[derive(Debug, Clone)]
pub struct Loader<E = ProcessEnv> {
    prefix: String,
    paths: Vec<PathBuf>,
    path_var: Option<String>,
    env: E,
}

impl Loader<ProcessEnv> {
    /// Create a loader reading the process environment under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            paths: Vec::new(),
            path_var: None,
            env: ProcessEnv,
        }
    }
}

impl<E: Environment> Loader<E> {
    /// Append a JSON file to merge.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Append several JSON files, merged in iteration order.
    pub fn files<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        self.paths
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Name an environment variable holding one more file path.
    ///
    /// When set, that file is merged after all others.
    pub fn path_var(mut self, name: impl Into<String>) -> Self {
        self.path_var = Some(name.into());
        self
    }

    /// Replace the environment source.
    pub fn environment<F: Environment>(self, env: F) -> Loader<F> {
        Loader {
            prefix: self.prefix,
            paths: self.paths,
            path_var: self.path_var,
            env,
        }
    }

    /// Prefix used to build environment keys.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Files the merge pass will try, in order.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths = self.paths.clone();
        if let Some(var) = &self.path_var {
            if let Some(path) = self.env.lookup(var).filter(|p| !p.is_empty()) {
                debug!(var = var.as_str(), "configuration path taken from environment");
                paths.push(PathBuf::from(path));
            }
        }
        paths
    }

    /// Populate `spec` from defaults, files and the environment, in that order.
    pub fn apply<S>(&self, spec: &mut S) -> ConfigResult<()>
    where
        S: Specification,
    {
        debug!(prefix = self.prefix.as_str(), "applying declared defaults");
        fill_defaults(spec)?;

        let paths = self.paths();
        debug!(count = paths.len(), "merging configuration files");
        merge_files(spec, paths.as_slice());

        debug!(prefix = self.prefix.as_str(), "applying environment overrides");
        fill_environment(spec, &self.prefix, &self.env)?;

        info!(prefix = self.prefix.as_str(), "configuration loaded");
        Ok(())
    }

    /// Like [`apply`](Self::apply), rejecting an absent specification.
    pub fn apply_optional<S>(&self, spec: Option<&mut S>) -> ConfigResult<()>
    where
        S: Specification,
    {
        let spec = spec.ok_or(ConfigError::InvalidSpecification)?;
        self.apply(spec)
    }

    /// Build a fresh specification from `S::default()`.
    pub fn load<S>(&self) -> ConfigResult<S>
    where
        S: Specification + Default,
    {
        let mut spec = S::default();
        self.apply(&mut spec)?;
        Ok(spec)
    }
}

/// Populate `spec` from declared defaults, then `paths`, then environment
/// variables under `prefix`.
///
/// Files that are missing or malformed are skipped. The first conversion
/// failure is returned; fields written before it keep their new values.
///
/// Only structures implementing [`Specification`] are accepted:
///
/// ```compile_fail
/// let mut port = 8080u16;
/// confstack::process("app", &["app.json"], &mut port).unwrap();
/// ```
pub fn process<S, P>(prefix: &str, paths: &[P], spec: &mut S) -> ConfigResult<()>
where
    S: Specification,
    P: AsRef<Path>,
{
    Loader::new(prefix).files(paths).apply(spec)
}

/// Same as [`process`], but panics on error.
pub fn must_process<S, P>(prefix: &str, paths: &[P], spec: &mut S)
where
    S: Specification,
    P: AsRef<Path>,
{
    if let Err(err) = process(prefix, paths, spec) {
        panic!("{err}");
    }
}

/// Conventional configuration file locations for `app`, lowest priority first.
///
/// 1. `./<app>.json` (current directory)
/// 2. `~/.config/<app>/config.json` (XDG on Linux), or the platform equivalent
pub fn search_paths(app: &str) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(format!("{app}.json"))];
    if let Some(dirs) = ProjectDirs::from("", "", app) {
        paths.push(dirs.config_dir().join("config.json"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_paths_include_path_var_last() {
        let env: HashMap<String, String> =
            [("APP_CONFIG".to_string(), "/etc/app/override.json".to_string())].into();
        let loader = Loader::new("app")
            .file("base.json")
            .files(["local.json"])
            .path_var("APP_CONFIG")
            .environment(env);

        assert_eq!(
            loader.paths(),
            vec![
                PathBuf::from("base.json"),
                PathBuf::from("local.json"),
                PathBuf::from("/etc/app/override.json"),
            ]
        );
        assert_eq!(loader.prefix(), "app");
    }

    #[test]
    fn test_empty_path_var_is_ignored() {
        let env: HashMap<String, String> = [("APP_CONFIG".to_string(), String::new())].into();
        let loader = Loader::new("app").path_var("APP_CONFIG").environment(env);
        assert!(loader.paths().is_empty());
    }

    #[test]
    fn test_search_paths_start_with_working_directory() {
        let paths = search_paths("demo");
        assert_eq!(paths[0], PathBuf::from("demo.json"));
        assert!(paths.iter().skip(1).all(|p| p.ends_with("config.json")));
    }
}
