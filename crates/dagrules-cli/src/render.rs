//! Console rendering of a policy report

use std::io::{self, Write};

use colored::Colorize;
use dagrules::{HumanStyle, PolicyReport, Reporter};

use crate::settings::OutputFormat;

/// Terminal colors for the human-readable report
struct ConsoleStyle;

impl HumanStyle for ConsoleStyle {
    fn passed(&self, text: &str) -> String {
        text.green().bold().to_string()
    }

    fn failed(&self, text: &str) -> String {
        text.red().bold().to_string()
    }

    fn code(&self, text: &str) -> String {
        text.dimmed().to_string()
    }

    fn message(&self, text: &str) -> String {
        text.red().to_string()
    }
}

/// Write a report in the requested format
pub fn render<W: Write>(out: &mut W, report: &PolicyReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Human => render_human(out, report),
        OutputFormat::Json => writeln!(out, "{}", Reporter::to_json(report)),
    }
}

/// `Checking rule <name> ... PASSED|FAILED`, then each violation of a failed rule
pub fn render_human<W: Write>(out: &mut W, report: &PolicyReport) -> io::Result<()> {
    write!(out, "{}", Reporter::to_styled(report, &ConsoleStyle))
}

/// Enable or disable ANSI colors for everything rendered afterwards
pub fn set_color(enabled: bool) {
    colored::control::set_override(enabled);
}
