//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/helptree/helptree.toml`
//! 3. Local config: `<project_dir>/.helptree.toml`
//! 4. Environment variables: `HELPTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{HelpOptions, DEFAULT_HEADER};

pub const LOCAL_CONFIG_FILE: &str = ".helptree.toml";

/// Raw settings for intermediate parsing (`None` means "inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub targets_file: Option<PathBuf>,
    pub help_attribute: Option<String>,
    pub all_attribute: Option<String>,
    pub header: Option<String>,
    pub annotated_attrs_only: Option<bool>,
}

/// Unified configuration for helptree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Target file, relative paths resolve against the project directory
    pub targets_file: PathBuf,
    /// Attribute carrying the rendered help
    pub help_attribute: String,
    /// Attribute carrying the erased tree
    pub all_attribute: String,
    /// First line of the help text; empty disables the header
    pub header: String,
    /// List only annotated leaves
    pub annotated_attrs_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let options = HelpOptions::default();
        Self {
            targets_file: PathBuf::from("targets.toml"),
            help_attribute: options.help_attribute,
            all_attribute: options.all_attribute,
            header: DEFAULT_HEADER.to_string(),
            annotated_attrs_only: options.annotated_attrs_only,
        }
    }
}

/// Get the XDG config directory for helptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "helptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("helptree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            targets_file: overlay
                .targets_file
                .clone()
                .unwrap_or_else(|| self.targets_file.clone()),
            help_attribute: overlay
                .help_attribute
                .clone()
                .unwrap_or_else(|| self.help_attribute.clone()),
            all_attribute: overlay
                .all_attribute
                .clone()
                .unwrap_or_else(|| self.all_attribute.clone()),
            header: overlay.header.clone().unwrap_or_else(|| self.header.clone()),
            annotated_attrs_only: overlay
                .annotated_attrs_only
                .unwrap_or(self.annotated_attrs_only),
        }
    }

    /// Apply HELPTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("HELPTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("targets_file") {
            settings.targets_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("help_attribute") {
            settings.help_attribute = val;
        }
        if let Ok(val) = config.get_string("all_attribute") {
            settings.all_attribute = val;
        }
        if let Ok(val) = config.get_string("header") {
            settings.header = val;
        }
        if let Ok(val) = config.get_bool("annotated_attrs_only") {
            settings.annotated_attrs_only = val;
        }

        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the targets file path.
    fn expand_paths(&mut self) {
        let raw = self.targets_file.to_string_lossy().to_string();
        match shellexpand::full(&raw) {
            Ok(expanded) => self.targets_file = PathBuf::from(expanded.as_ref()),
            Err(e) => debug!("leaving targets_file unexpanded: {e}"),
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.help_attribute.is_empty() || self.all_attribute.is_empty() {
            return Err(ApplicationError::Config {
                message: "help_attribute and all_attribute must not be empty".to_string(),
            });
        }
        if self.help_attribute == self.all_attribute {
            return Err(ApplicationError::Config {
                message: format!(
                    "help_attribute and all_attribute are both '{}'",
                    self.help_attribute
                ),
            });
        }
        Ok(())
    }

    /// The targets file, resolved against `project_dir` when relative.
    pub fn targets_path(&self, project_dir: &Path) -> PathBuf {
        if self.targets_file.is_absolute() {
            self.targets_file.clone()
        } else {
            project_dir.join(&self.targets_file)
        }
    }

    /// Help options carrying the configured names and header.
    pub fn help_options(&self) -> HelpOptions {
        HelpOptions::default()
            .with_help_attribute(self.help_attribute.as_str())
            .with_all_attribute(self.all_attribute.as_str())
            .with_header(self.header.as_str())
            .with_annotated_attrs_only(self.annotated_attrs_only)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# helptree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/helptree/helptree.toml
#   Local:  <project_dir>/.helptree.toml
#   Env:    HELPTREE_* environment variables

# Target file, relative to the project directory
# targets_file = "targets.toml"

# Attribute that fails with the rendered help when evaluated
# help_attribute = "help"

# Attribute holding the tree without annotations
# all_attribute = "all"

# First line of the help text (empty string: no header)
# header = "Available targets:"

# List only annotated leaves (false: list every leaf)
# annotated_attrs_only = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
