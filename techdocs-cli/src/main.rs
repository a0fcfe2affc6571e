//! techdocs: technique documentation sync and release CLI.
//!
//! # Usage
//!
//! ```text
//! techdocs [--root DIR] [--config FILE] generate|update|build|serve|validate|clean|full [--dry-run] [--verbose]
//! techdocs list [--json]
//! techdocs release bump <major|minor|patch|X.Y.Z> [--dry-run] [--no-tag]
//! techdocs release check --tag <TAG>
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{docs::StepArgs, list::ListArgs, release::ReleaseCommand, Project};
use techdocs_sync::Command as Step;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "techdocs",
    version,
    about = "Keep technique documentation in sync with the registry and cut releases",
    long_about = None,
)]
struct Cli {
    /// Project root; config paths resolve against it.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to `<root>/techdocs.yaml` when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Regenerate the techniques index.
    Generate(StepArgs),

    /// Refresh README/reference regions and the scaffolds (runs generate first).
    Update(StepArgs),

    /// Build the static site (runs generate and update first).
    Build(StepArgs),

    /// Serve a local preview of the built site.
    Serve(StepArgs),

    /// Check required files, markers, artifact freshness and the built site.
    Validate(StepArgs),

    /// Remove generated artifacts and the built site.
    Clean(StepArgs),

    /// clean, generate, update and build in one run.
    Full(StepArgs),

    /// List discovered techniques grouped by category.
    List(ListArgs),

    /// Bump, stamp and tag releases.
    Release {
        #[command(subcommand)]
        command: ReleaseCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let project = Project::load(cli.root, cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => args.run(Step::Generate, &project),
        Commands::Update(args) => args.run(Step::Update, &project),
        Commands::Build(args) => args.run(Step::Build, &project),
        Commands::Serve(args) => args.run(Step::Serve, &project),
        Commands::Validate(args) => args.run(Step::Validate, &project),
        Commands::Clean(args) => args.run(Step::Clean, &project),
        Commands::Full(args) => args.run(Step::Full, &project),
        Commands::List(args) => args.run(&project),
        Commands::Release { command } => commands::release::run(command, &project),
    }
}

/// Diagnostics go to stderr; stdout carries the command's own output.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
