//! Session backend configuration
//!
//! Built-in defaults register `python3` (and its alias `py`) running the
//! bundled driver. A YAML file can override the default target, add
//! targets, or replace built-in ones:
//!
//! ```yaml
//! default_target: python3
//! shutdown_grace_ms: 2000
//! targets:
//!   sh:
//!     command: ["my-shell-driver", "--json"]
//!     env: { LANG: C.UTF-8 }
//! ```

use crate::error::{KernelError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use splice_core::DEFAULT_TARGET;
use std::path::Path;

/// Bundled python driver speaking the line protocol
pub const PYTHON_DRIVER: &str = include_str!("../drivers/python3.py");

/// How to launch the session for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Program followed by its arguments
    pub command: Vec<String>,
    /// Extra environment for the session process
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

impl TargetConfig {
    /// Create target running `command`
    pub fn new<S: Into<String>>(command: impl IntoIterator<Item = S>) -> Self {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            env: IndexMap::new(),
        }
    }

    /// With environment variable
    #[inline]
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The bundled python driver under `python3`
    #[must_use]
    pub fn python3() -> Self {
        Self::new(["python3", "-u", "-c", PYTHON_DRIVER]).with_env("PYTHONUNBUFFERED", "1")
    }
}

/// Session backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelConfig {
    /// Target for markers that name none
    pub default_target: String,
    /// Launch settings per target identifier
    pub targets: IndexMap<String, TargetConfig>,
    /// How long a session may take to exit after its input closes
    pub shutdown_grace_ms: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        let mut targets = IndexMap::new();
        targets.insert("python3".to_string(), TargetConfig::python3());
        targets.insert("py".to_string(), TargetConfig::python3());
        Self {
            default_target: DEFAULT_TARGET.to_string(),
            targets,
            shutdown_grace_ms: 2_000,
        }
    }
}

/// File form: every field optional, laid over the defaults
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    default_target: Option<String>,
    #[serde(default)]
    targets: IndexMap<String, TargetConfig>,
    shutdown_grace_ms: Option<u64>,
}

impl KernelConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default target
    #[inline]
    #[must_use]
    pub fn with_default_target(mut self, target: impl Into<String>) -> Self {
        self.default_target = target.into();
        self
    }

    /// With target, replacing any existing one of the same name
    #[inline]
    #[must_use]
    pub fn with_target(mut self, name: impl Into<String>, target: TargetConfig) -> Self {
        self.targets.insert(name.into(), target);
        self
    }

    /// With shutdown grace period
    #[inline]
    #[must_use]
    pub fn with_shutdown_grace_ms(mut self, millis: u64) -> Self {
        self.shutdown_grace_ms = millis;
        self
    }

    /// Launch settings for `target`
    ///
    /// # Errors
    /// - `KernelError::UnknownTarget` if nothing is configured for it
    pub fn target(&self, target: &str) -> Result<&TargetConfig> {
        self.targets
            .get(target)
            .ok_or_else(|| KernelError::UnknownTarget(target.to_string()))
    }

    /// Parse YAML text laid over the defaults
    ///
    /// # Errors
    /// Returns error if the YAML is invalid or has unknown fields
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::overlay(yaml, Path::new("<inline>"))
    }

    /// Load a YAML config file laid over the defaults
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| KernelError::config(path, e))?;
        let config = Self::overlay(&text, path)?;
        tracing::debug!(path = %path.display(), targets = config.targets.len(), "loaded config");
        Ok(config)
    }

    fn overlay(yaml: &str, origin: &Path) -> Result<Self> {
        // an empty file deserializes as null
        let file: ConfigFile = if yaml.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| KernelError::config(origin, e))?
        };

        let mut config = Self::default();
        if let Some(default_target) = file.default_target {
            config.default_target = default_target;
        }
        if let Some(grace) = file.shutdown_grace_ms {
            config.shutdown_grace_ms = grace;
        }
        config.targets.extend(file.targets);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_register_python() {
        let config = KernelConfig::default();
        assert_eq!(config.default_target, "python3");
        assert_eq!(config.target("python3").unwrap(), config.target("py").unwrap());
        assert_eq!(config.target("py").unwrap().command[0], "python3");
        assert!(config.target("py").unwrap().command[3].contains("def main"));
    }

    #[test]
    fn unknown_target_is_an_error() {
        let err = KernelConfig::default().target("ruby").unwrap_err();
        assert!(matches!(err, KernelError::UnknownTarget(name) if name == "ruby"));
    }

    #[test]
    fn yaml_overlays_defaults() {
        let config = KernelConfig::from_yaml(
            "default_target: sh\ntargets:\n  sh:\n    command: [sh, driver.sh]\n    env: {A: '1'}\n",
        )
        .unwrap();
        assert_eq!(config.default_target, "sh");
        assert_eq!(
            config.target("sh").unwrap(),
            &TargetConfig::new(["sh", "driver.sh"]).with_env("A", "1")
        );
        assert!(config.target("python3").is_ok());
        assert_eq!(config.shutdown_grace_ms, 2_000);
    }

    #[test]
    fn yaml_can_replace_builtin() {
        let config =
            KernelConfig::from_yaml("targets:\n  py: {command: [python3.12, -u, driver.py]}\n").unwrap();
        assert_eq!(config.target("py").unwrap().command[0], "python3.12");
        assert!(config.target("py").unwrap().env.is_empty());
    }

    #[test]
    fn empty_yaml_is_defaults() {
        assert_eq!(KernelConfig::from_yaml("").unwrap(), KernelConfig::default());
    }

    #[test]
    fn unknown_field_rejected() {
        let err = KernelConfig::from_yaml("default_targte: py\n").unwrap_err();
        assert!(matches!(err, KernelError::Config { .. }));
    }

    #[test]
    fn builders() {
        let config = KernelConfig::new()
            .with_default_target("sh")
            .with_target("sh", TargetConfig::new(["sh"]))
            .with_shutdown_grace_ms(10);
        assert_eq!(config.default_target, "sh");
        assert_eq!(config.shutdown_grace_ms, 10);
        assert!(config.target("sh").is_ok());
    }
}
