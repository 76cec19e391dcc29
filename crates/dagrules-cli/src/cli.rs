//! Command line arguments

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::constants::PROJECT_DIR_ENV_VAR;
use crate::settings::{OutputFormat, Settings};

/// Check a dbt project's dependency graph against dagrules.yml
#[derive(Parser, Debug)]
#[command(name = "dagrules")]
#[command(about = "Check a dbt project's dependency graph against architectural rules")]
#[command(version)]
pub struct Cli {
    /// dbt project root
    #[arg(long, env = PROJECT_DIR_ENV_VAR, default_value = ".", global = true)]
    pub project_dir: PathBuf,

    /// Rule document (default: <project-dir>/dagrules.yml)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Compiled manifest (default: <project-dir>/target/manifest.json)
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Tool settings file (default: <project-dir>/dagrules.toml if present)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Accepted for compatibility; checking is the default action
    #[arg(long = "check", hide = true)]
    pub legacy_check: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Validate the rule document and evaluate every rule (default)
    Check,
    /// Validate and compile the rule document without reading the manifest
    Validate,
    /// Print the effective settings as TOML
    Settings,
}

impl Cli {
    /// The requested subcommand, `check` when none is given
    pub fn subcommand(&self) -> Command {
        self.command.unwrap_or(Command::Check)
    }

    /// Apply command line overrides on top of loaded settings
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(rules) = &self.rules {
            settings.paths.rules_file.clone_from(rules);
        }
        if let Some(manifest) = &self.manifest {
            settings.paths.manifest_file.clone_from(manifest);
        }
        if let Some(format) = self.format {
            settings.output.format = format;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
        if self.no_color {
            settings.output.color = false;
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}
