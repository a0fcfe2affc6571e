//! `techdocs generate|update|build|serve|validate|clean|full`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use techdocs_sync::{
    Command, Pipeline, PipelineError, Removal, RemovalOutcome, RunOptions, RunReport,
    StepOutcome, SyncResult, WriteOutcome,
};

use super::Project;

/// Flags shared by every pipeline command.
#[derive(Args, Debug)]
pub struct StepArgs {
    /// Report what would change without writing, deleting, building or serving.
    #[arg(long)]
    pub dry_run: bool,

    /// Print a unified diff for every changed target.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl StepArgs {
    pub fn run(self, command: Command, project: &Project) -> Result<()> {
        let pipeline = Pipeline::new(project.root.clone(), project.config.clone())
            .context("failed to set up the documentation pipeline")?;
        let options = RunOptions {
            dry_run: self.dry_run,
            verbose: self.verbose,
        };

        match pipeline.run(command, options) {
            Ok(report) => {
                print_report(project, &report, options);
                Ok(())
            }
            Err(err) => {
                // Completed steps stay applied; show them before the failure.
                if let PipelineError::StepFailed { completed, .. } = &err {
                    print_report(project, completed, options);
                }
                Err(err.into())
            }
        }
    }
}

fn print_report(project: &Project, report: &RunReport, options: RunOptions) {
    let prefix = if options.dry_run { "[dry-run] " } else { "" };
    let done = "✓".green();

    for step in &report.steps {
        let name = step.command.name();
        match &step.outcome {
            StepOutcome::Synced(results) => {
                let changed = results.iter().filter(|r| r.changed()).count();
                println!(
                    "{prefix}{done} {name} ({changed} changed, {} unchanged)",
                    results.len() - changed
                );
                for result in results {
                    print_sync_result(project, result);
                }
            }
            StepOutcome::Built { skipped: true } | StepOutcome::Served { skipped: true } => {
                println!("{prefix}{} {name} skipped", "-".yellow());
            }
            StepOutcome::Built { skipped: false } => {
                println!("{prefix}{done} {name}: site built");
            }
            StepOutcome::Served { skipped: false } => {
                println!("{prefix}{done} {name}: preview server stopped");
            }
            StepOutcome::Validated => println!("{prefix}{done} {name}: no problems found"),
            StepOutcome::Cleaned(removals) => {
                println!("{prefix}{done} {name}");
                for removal in removals {
                    print_removal(project, removal);
                }
            }
            StepOutcome::Composite => println!("{prefix}{done} {name}"),
        }

        for preview in &step.previews {
            println!("{}", preview.trim_end());
        }
    }
}

fn print_sync_result(project: &Project, result: &SyncResult) {
    let path = project.display_path(&result.path);
    match result.outcome {
        WriteOutcome::Written => println!(
            "  ✎  {path} {}",
            format!("+{} -{}", result.changes.insertions(), result.changes.deletions()).bright_black()
        ),
        WriteOutcome::WouldWrite => println!(
            "  ~  {path} {}",
            format!("+{} -{}", result.changes.insertions(), result.changes.deletions()).bright_black()
        ),
        WriteOutcome::Unchanged => println!("  ·  {path}"),
    }
}

fn print_removal(project: &Project, removal: &Removal) {
    let path = project.display_path(&removal.path);
    match removal.outcome {
        RemovalOutcome::Removed => println!("  ✗  {path}"),
        RemovalOutcome::WouldRemove => println!("  ~  {path}"),
        RemovalOutcome::Absent => println!("  ·  {path} (absent)"),
    }
}
