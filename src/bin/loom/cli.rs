//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Loom - A generator for multi-project build descriptions
#[derive(Parser)]
#[command(name = "loom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, lint and map the manifests, then apply the side effects
    Generate(GenerateArgs),

    /// Display the resolved target graph
    Graph(GraphArgs),

    /// List the schemes of every project, including generated ones
    Schemes(SchemesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Directory holding a Project.toml or Workspace.toml (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Number of parallel jobs used to convert manifests
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the side effects instead of applying them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Json,
}

#[derive(Args)]
pub struct GraphArgs {
    /// Directory holding a Project.toml or Workspace.toml (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = GraphFormat::Text)]
    pub format: GraphFormat,
}

#[derive(Args)]
pub struct SchemesArgs {
    /// Directory holding a Project.toml or Workspace.toml (defaults to the current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
