//! Berth CLI - compiler toolchain detection

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use berth::probe::ConfigureError;
use berth::util::diagnostic;
use berth::util::shell::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};

fn main() {
    let cli = Cli::parse();
    let shell = Arc::new(Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    ));

    if let Err(e) = run(cli, &shell) {
        match e.downcast_ref::<ConfigureError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Arc<Shell>) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("berth=debug")
    } else if cli.quiet {
        EnvFilter::new("berth=warn")
    } else {
        EnvFilter::new("berth=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args, shell),
        Commands::Candidates(args) => commands::candidates::execute(args, shell),
        Commands::Env(args) => commands::env::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
