//! dagrules - Entry Point

use std::process::ExitCode;

use clap::Parser;
use dagrules_cli::{Cli, run};

fn main() -> ExitCode {
    let cli = Cli::parse();
    run(&cli)
}
