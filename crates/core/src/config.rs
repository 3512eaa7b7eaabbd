// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration document parsing and validation (§6.1).
//!
//! A single TOML document loaded at startup. Parsing is strict
//! (`deny_unknown_fields`, so typos in a year-old config fail loudly
//! instead of being silently ignored); validation is a separate pass so
//! `--validate` can distinguish a malformed document from a well-formed
//! but semantically invalid one.

use crate::step::{StepDef, StepName};
use crate::window::{self, WindowError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("step '{step}' declares a dependency on unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    #[error("dependency cycle detected involving step '{step}'")]
    DependencyCycle { step: String },

    #[error("step '{step}' has invalid windows: {source}")]
    InvalidWindows { step: String, source: WindowError },

    #[error("step '{step}' references executable '{path}' which does not exist")]
    MissingExecutable { step: String, path: PathBuf },

    #[error("state_dir '{0}' is not writable")]
    UnwritableStateDir(PathBuf),

    #[error("global_parallelism must be >= 1, got {0}")]
    InvalidParallelism(i64),

    #[error("duplicate step name '{0}'")]
    DuplicateStepName(String),
}

/// Process-name-glob hygiene patterns for the legacy target application (C7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessHygieneConfig {
    pub patterns: Vec<String>,
    #[serde(default = "ProcessHygieneConfig::default_grace")]
    #[serde(with = "humantime_field")]
    pub grace_period: std::time::Duration,
    /// Name of the step (declared in `steps`, typically `kind = "unconditional"`)
    /// whose "run" is `terminate_family` itself rather than an external
    /// executable. Lets the fixed daily hygiene moment (§4.7) live in the
    /// DAG as an ordinary Step — so it gets a journal entry, retries, and
    /// shows up in `--status` — without requiring an executable on disk.
    #[serde(default)]
    pub trigger_step: Option<StepName>,
}

impl ProcessHygieneConfig {
    fn default_grace() -> std::time::Duration {
        std::time::Duration::from_secs(5)
    }
}

/// The top-level configuration document (§6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub root_dir: PathBuf,
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
    #[serde(default = "Config::default_tick_interval")]
    #[serde(with = "humantime_field")]
    pub tick_interval: std::time::Duration,
    #[serde(default = "Config::default_parallelism")]
    pub global_parallelism: i64,
    pub mailer_executable: PathBuf,
    pub mailer_args_template: String,
    pub process_hygiene: ProcessHygieneConfig,
    #[serde(alias = "step")]
    pub steps: Vec<StepDef>,
    /// Clean up (terminate_family, release lock) on graceful shutdown.
    #[serde(default)]
    pub cleanup_on_exit: bool,
    /// Wall-clock time of day the daily heartbeat alert fires if nothing
    /// else has alerted yet (§4.9).
    #[serde(default = "Config::default_heartbeat_time")]
    pub heartbeat_time: chrono::NaiveTime,
}

impl Config {
    fn default_tick_interval() -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }

    fn default_parallelism() -> i64 {
        2
    }

    fn default_heartbeat_time() -> chrono::NaiveTime {
        chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(chrono::NaiveTime::MIN)
    }

    /// Parse a configuration document from TOML source text. Does not
    /// validate semantics; call [`Config::validate`] afterward.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load and parse a configuration document from disk.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Validate semantic correctness: DAG acyclic, no overlapping windows
    /// per step, unknown dependency names, missing executables, unwritable
    /// state_dir, `global_parallelism < 1`. Returns every violation found,
    /// not just the first, so `--validate` gives a complete report.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.global_parallelism < 1 {
            errors.push(ConfigError::InvalidParallelism(self.global_parallelism));
        }

        let mut seen_names = HashSet::new();
        for step in &self.steps {
            if !seen_names.insert(step.name.as_str()) {
                errors.push(ConfigError::DuplicateStepName(step.name.to_string()));
            }
        }

        let known: HashSet<&str> = self.steps.iter().map(|s| s.name.as_str()).collect();
        for step in &self.steps {
            for dep in &step.dependencies {
                if !known.contains(dep.as_str()) {
                    errors.push(ConfigError::UnknownDependency {
                        step: step.name.to_string(),
                        dependency: dep.to_string(),
                    });
                }
            }
            if let Err(source) = window::validate_windows(&step.windows) {
                errors.push(ConfigError::InvalidWindows {
                    step: step.name.to_string(),
                    source,
                });
            }
            let is_hygiene_trigger = self
                .process_hygiene
                .trigger_step
                .as_ref()
                .is_some_and(|name| name == &step.name);
            if !is_hygiene_trigger && !step.executable.exists() {
                errors.push(ConfigError::MissingExecutable {
                    step: step.name.to_string(),
                    path: step.executable.clone(),
                });
            }
        }

        if let Some(cycle_step) = find_cycle(&self.steps) {
            errors.push(ConfigError::DependencyCycle { step: cycle_step });
        }

        if !is_dir_writable(&self.state_dir) {
            errors.push(ConfigError::UnwritableStateDir(self.state_dir.clone()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Depth-first cycle detection over the dependency graph. Returns the name
/// of a step participating in a cycle, if any.
fn find_cycle(steps: &[StepDef]) -> Option<String> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    let by_name: HashMap<&str, &StepDef> = steps.iter().map(|s| (s.name.as_str(), s)).collect();
    let mut marks: HashMap<&str, Mark> = HashMap::new();

    fn visit<'a>(
        name: &'a str,
        by_name: &HashMap<&'a str, &'a StepDef>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> bool {
        match marks.get(name) {
            Some(Mark::Done) => return false,
            Some(Mark::Visiting) => return true,
            None => {}
        }
        marks.insert(name, Mark::Visiting);
        if let Some(step) = by_name.get(name) {
            for dep in &step.dependencies {
                if let Some(dep_name) = by_name.get_key_value(dep.as_str()).map(|(k, _)| *k) {
                    if visit(dep_name, by_name, marks) {
                        return true;
                    }
                }
            }
        }
        marks.insert(name, Mark::Done);
        false
    }

    for step in steps {
        if visit(step.name.as_str(), &by_name, &mut marks) {
            return Some(step.name.to_string());
        }
    }
    None
}

fn is_dir_writable(dir: &std::path::Path) -> bool {
    if !dir.exists() {
        return std::fs::create_dir_all(dir).is_ok();
    }
    let probe = dir.join(".dayorch-write-probe");
    match std::fs::write(&probe, b"") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Serde helper: (de)serialize a `Duration` from strings like `30s`.
mod humantime_field {
    use super::Duration;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        crate::duration::format_duration(*d).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        crate::duration::parse_duration(&raw).map_err(D::Error::custom)
    }
}
use std::time::Duration;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
