//! Loom CLI - A generator for multi-project build descriptions

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use loom::util::diagnostic::emit;
use loom::GeneratorError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<GeneratorError>() {
            Some(err) => emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("loom=debug")
    } else {
        EnvFilter::new("loom=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Graph(args) => commands::graph::execute(args),
        Commands::Schemes(args) => commands::schemes::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
