//! Tool settings
//!
//! Settings are merged in this order (later sources override earlier):
//! 1. Default values from `Settings::default()`
//! 2. `dagrules.toml` in the project directory, or an explicit settings file
//! 3. Environment variables with the `DAGRULES_` prefix; nested keys are
//!    separated by `__` (e.g. `DAGRULES_OUTPUT__FORMAT=json`)
//!
//! These are settings of the tool itself. The rule document
//! (`dagrules.yml`) is loaded separately.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use dagrules::EngineOptions;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_LOG_LEVEL, DEFAULT_MANIFEST_PATH, DEFAULT_RULES_FILENAME, DEFAULT_SETTINGS_FILENAME,
    SETTINGS_ENV_PREFIX, SETTINGS_ENV_SEPARATOR,
};
use crate::logging::parse_log_level;

/// Settings could not be loaded
#[derive(Error, Debug)]
pub enum SettingsError {
    /// An explicitly requested settings file does not exist
    #[error("Settings file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// A settings source could not be merged or deserialized
    #[error("Failed to extract settings: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// `logging.level` is not a tracing level
    #[error("Invalid log level: {level}. Use trace, debug, info, warn, or error")]
    InvalidLogLevel { level: String },
}

/// Report rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Checking rule ... PASSED/FAILED` lines
    #[default]
    Human,
    /// The serialized report
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `DAGRULES_LOG` is unset
    pub level: String,
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

/// Input files, relative to the project directory unless absolute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub rules_file: PathBuf,
    pub manifest_file: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            rules_file: PathBuf::from(DEFAULT_RULES_FILENAME),
            manifest_file: PathBuf::from(DEFAULT_MANIFEST_PATH),
        }
    }
}

impl PathSettings {
    pub fn rules_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.rules_file)
    }

    pub fn manifest_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.manifest_file)
    }
}

/// Effective tool settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub engine: EngineOptions,
    pub output: OutputSettings,
    pub paths: PathSettings,
}

/// Settings loader
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    project_dir: PathBuf,
    settings_path: Option<PathBuf>,
    env_prefix: String,
}

impl SettingsLoader {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            settings_path: None,
            env_prefix: SETTINGS_ENV_PREFIX.to_string(),
        }
    }

    /// Use an explicit settings file, which must exist
    pub fn with_settings_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(&self) -> Result<Settings, SettingsError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        if let Some(path) = &self.settings_path {
            if !path.exists() {
                return Err(SettingsError::NotFound { path: path.clone() });
            }
            figment = figment.merge(Toml::file(path));
        } else {
            let default_path = self.project_dir.join(DEFAULT_SETTINGS_FILENAME);
            if default_path.exists() {
                figment = figment.merge(Toml::file(&default_path));
            }
        }

        figment = figment.merge(Env::prefixed(&self.env_prefix).split(SETTINGS_ENV_SEPARATOR));

        let settings: Settings = figment.extract().map_err(Box::new)?;
        validate_settings(&settings)?;
        Ok(settings)
    }
}

fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    parse_log_level(&settings.logging.level)?;
    Ok(())
}
