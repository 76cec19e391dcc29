//! # dagrules CLI
//!
//! Thin I/O layer around the [`dagrules`] policy engine: settings, logging,
//! file loading, report rendering and exit codes.
//!
//! | Exit code | Meaning |
//! |-----------|---------|
//! | 0 | every rule passed |
//! | 1 | at least one rule failed |
//! | 2 | the rule document or the tool settings are invalid |
//! | 3 | an input file could not be read or parsed |

pub mod cli;
pub mod constants;
pub mod loader;
pub mod logging;
pub mod render;
pub mod settings;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use dagrules::{PolicyEngine, RuleSet};
use tracing::info;

pub use cli::{Cli, Command};
pub use settings::{OutputFormat, Settings, SettingsError, SettingsLoader};

use crate::constants::{EXIT_CONFIG_ERROR, EXIT_IO_ERROR, EXIT_RULES_FAILED};

/// Outcome of a successful invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    RulesFailed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Passed => Self::SUCCESS,
            Outcome::RulesFailed => Self::from(EXIT_RULES_FAILED),
        }
    }
}

/// Run the CLI and map the result to a process exit code
pub fn run(cli: &Cli) -> ExitCode {
    let stdout = io::stdout();
    match execute(cli, &mut stdout.lock()) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("{}: {err:#}", "error".red().bold());
            ExitCode::from(error_exit_status(&err))
        }
    }
}

/// Exit status for an error that aborted the run
pub fn error_exit_status(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<dagrules::Error>().is_some()
        || err.downcast_ref::<dagrules::ConfigError>().is_some()
        || err.downcast_ref::<SettingsError>().is_some()
    {
        EXIT_CONFIG_ERROR
    } else {
        EXIT_IO_ERROR
    }
}

/// Execute the requested subcommand, writing the report to `out`
pub fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<Outcome> {
    let settings = load_settings(cli)?;
    render::set_color(settings.output.color);
    logging::init_logging(&settings.logging)?;

    match cli.subcommand() {
        Command::Check => check(cli, &settings, out),
        Command::Validate => validate(cli, &settings, out),
        Command::Settings => {
            let toml = toml::to_string_pretty(&settings).context("Failed to serialize settings")?;
            write!(out, "{toml}").context("Failed to write settings")?;
            Ok(Outcome::Passed)
        }
    }
}

/// Load settings and apply command line overrides
pub fn load_settings(cli: &Cli) -> Result<Settings, SettingsError> {
    let mut loader = SettingsLoader::new(cli.project_dir());
    if let Some(path) = &cli.settings {
        loader = loader.with_settings_path(path);
    }
    let mut settings = loader.load()?;
    cli.apply_overrides(&mut settings);
    logging::parse_log_level(&settings.logging.level)?;
    Ok(settings)
}

fn check<W: Write>(cli: &Cli, settings: &Settings, out: &mut W) -> Result<Outcome> {
    // Config errors surface before the manifest is read
    let rules = RuleSet::compile(&loader::load_rules(
        &settings.paths.rules_path(cli.project_dir()),
    )?)?;
    rules.check_version()?;
    let graph = loader::load_manifest(&settings.paths.manifest_path(cli.project_dir()))?;

    let engine = PolicyEngine::new(settings.engine);
    let report = engine.evaluate_rules(&rules, &graph)?;
    render::render(out, &report, settings.output.format).context("Failed to write report")?;

    match report.into_result() {
        Ok(_) => Ok(Outcome::Passed),
        Err(err) => {
            eprintln!("{err}");
            Ok(Outcome::RulesFailed)
        }
    }
}

fn validate<W: Write>(cli: &Cli, settings: &Settings, out: &mut W) -> Result<Outcome> {
    let path = settings.paths.rules_path(cli.project_dir());
    let rules = RuleSet::compile(&loader::load_rules(&path)?)?;
    rules.check_version()?;
    info!(rules = rules.len(), "Rule document is valid");
    writeln!(
        out,
        "{} {} ({} rules)",
        "OK".green(),
        path.display(),
        rules.len()
    )
    .context("Failed to write result")?;
    Ok(Outcome::Passed)
}
