//! `techdocs release bump` and `techdocs release check`.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use techdocs_release::{
    check_release_tag, prepare_release, BumpKind, GitCli, ReleaseOptions, ReleaseReport,
};

use super::Project;

/// Release version management.
#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// Bump the declared version, stamp the changelog, commit and tag.
    Bump(BumpArgs),

    /// Fail unless the declared version matches a release tag (for CI).
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct BumpArgs {
    /// `major`, `minor`, `patch`, or an explicit version such as `2.0.0-rc.1`.
    pub kind: BumpKind,

    /// Run every check without writing files or touching git.
    #[arg(long)]
    pub dry_run: bool,

    /// Edit the manifest and changelog only; skip the clean-tree check, commit and tag.
    #[arg(long)]
    pub no_tag: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Release tag to compare against, e.g. `v1.4.0` or `refs/tags/v1.4.0`.
    #[arg(long)]
    pub tag: String,
}

pub fn run(cmd: ReleaseCommand, project: &Project) -> Result<()> {
    match cmd {
        ReleaseCommand::Bump(args) => bump(args, project),
        ReleaseCommand::Check(args) => check(args, project),
    }
}

fn bump(args: BumpArgs, project: &Project) -> Result<()> {
    let git = GitCli::new(project.root.clone());
    let options = ReleaseOptions {
        dry_run: args.dry_run,
        tag: !args.no_tag,
        date: chrono::Local::now().date_naive(),
    };
    let report = prepare_release(&project.root, &project.config.release, &args.kind, &git, options)
        .with_context(|| format!("{} release failed", args.kind))?;
    print_report(project, &report);
    Ok(())
}

fn check(args: CheckArgs, project: &Project) -> Result<()> {
    let tag = args.tag.strip_prefix("refs/tags/").unwrap_or(&args.tag);
    let declared = check_release_tag(&project.root, &project.config.release, tag)
        .with_context(|| format!("release check failed for tag '{tag}'"))?;
    println!(
        "{} tag {tag} matches declared version {declared}",
        "✓".green()
    );
    Ok(())
}

fn print_report(project: &Project, report: &ReleaseReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}{} {} → {}",
        "✓".green(),
        report.previous,
        report.next.to_string().bold()
    );
    println!("  manifest   {}", project.display_path(&report.manifest));
    let changelog = if report.changelog_stamped {
        "stamped"
    } else {
        "unchanged"
    };
    println!("  changelog  {changelog}");
    if report.tagged {
        println!("  tag        {}", report.tag);
    } else {
        println!("  tag        {} (not created)", report.tag);
    }
}
