//! Tool configuration.
//!
//! Resolved in layers (lowest first): built-in defaults, an optional
//! `memberlint.json`, then CLI overrides. The result is passed explicitly to
//! the model adapter and the scope filter.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

pub const CONFIG_FILE: &str = "memberlint.json";
pub const DEFAULT_COMPILE_COMMANDS: &str = "compile_commands.json";
pub const DEFAULT_MODEL: &str = "memberlint-model.json";

/// Raw, partially filled configuration as read from JSON or the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_commands: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl ConfigLayer {
    /// Overlay `other` on top of `self`; excludes accumulate.
    pub fn merge(mut self, other: ConfigLayer) -> ConfigLayer {
        if other.project_root.is_some() {
            self.project_root = other.project_root;
        }
        if other.compile_commands.is_some() {
            self.compile_commands = other.compile_commands;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        self.exclude.extend(other.exclude);
        self
    }

    pub fn load(path: &Path) -> Result<ConfigLayer> {
        let content = io::read_file(path, &format!("read {}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::config_invalid_json(path.to_string_lossy(), e))
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub project_root: PathBuf,
    pub compile_commands: PathBuf,
    pub model: PathBuf,
    pub exclude: Vec<String>,
}

impl Config {
    /// Resolve layers against `cwd`. An explicit `config_path` must exist;
    /// the default `memberlint.json` is optional.
    pub fn resolve(cwd: &Path, config_path: Option<&Path>, cli: ConfigLayer) -> Result<Config> {
        let file_layer = match config_path {
            Some(path) => ConfigLayer::load(path)?,
            None => {
                let default_path = cwd.join(CONFIG_FILE);
                if default_path.is_file() {
                    ConfigLayer::load(&default_path)?
                } else {
                    ConfigLayer::default()
                }
            }
        };

        Self::from_layer(cwd, ConfigLayer::default().merge(file_layer).merge(cli))
    }

    pub fn from_layer(cwd: &Path, layer: ConfigLayer) -> Result<Config> {
        let raw_root = layer
            .project_root
            .ok_or_else(|| {
                Error::config_missing_key("project_root", None)
                    .with_hint("Pass --root <path> or set project_root in memberlint.json")
            })?;

        let project_root = paths::resolve(&raw_root, cwd)?;
        if project_root.parent().is_none() {
            return Err(Error::config_invalid_value(
                "project_root",
                Some(raw_root),
                "project root cannot be the filesystem root",
            ));
        }

        let compile_commands = paths::resolve(
            layer
                .compile_commands
                .as_deref()
                .unwrap_or(DEFAULT_COMPILE_COMMANDS),
            cwd,
        )?;
        let model = paths::resolve(layer.model.as_deref().unwrap_or(DEFAULT_MODEL), cwd)?;

        for pattern in &layer.exclude {
            if pattern.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    "exclude",
                    Some(pattern.clone()),
                    "exclude patterns cannot be empty",
                ));
            }
        }

        Ok(Config {
            project_root,
            compile_commands,
            model,
            exclude: layer.exclude,
        })
    }
}
