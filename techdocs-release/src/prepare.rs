//! The release sequence: checks, bump, manifest, changelog, commit, tag.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use techdocs_core::config::ReleaseConfig;

use crate::changelog;
use crate::error::{io_err, ReleaseError};
use crate::manifest;
use crate::tag::Tagger;
use crate::version::{assert_consistent_with_prefix, BumpKind, ReleaseVersion};

/// Knobs for [`prepare_release`].
#[derive(Debug, Clone, Copy)]
pub struct ReleaseOptions {
    /// Run every check, write nothing.
    pub dry_run: bool,
    /// Commit the bumped files and create the release tag.
    pub tag: bool,
    /// Date stamped into the changelog.
    pub date: NaiveDate,
}

/// What a release did (or would do, in dry-run mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReport {
    pub previous: ReleaseVersion,
    pub next: ReleaseVersion,
    pub tag: String,
    pub manifest: PathBuf,
    pub changelog_stamped: bool,
    pub tagged: bool,
    pub dry_run: bool,
}

/// Tag name for `version` under `config`.
pub fn tag_name(config: &ReleaseConfig, version: &ReleaseVersion) -> String {
    format!("{}{version}", config.tag_prefix)
}

/// Bump the declared version of the project at `root`.
///
/// Order: clean-tree and tag checks (when tagging), bump, write manifest,
/// stamp changelog, re-read the manifest and check it against the tag, then
/// commit and tag. In dry-run mode every check runs against in-memory
/// content and nothing is written.
pub fn prepare_release(
    root: &Path,
    config: &ReleaseConfig,
    kind: &BumpKind,
    tagger: &dyn Tagger,
    options: ReleaseOptions,
) -> Result<ReleaseReport, ReleaseError> {
    let manifest_path = resolve(root, &config.manifest);
    let changelog_path = resolve(root, &config.changelog);

    if options.tag {
        tagger.ensure_clean()?;
    }

    let previous = ReleaseVersion::parse(&manifest::read_declared_version(&manifest_path)?)?;
    let next = previous.bump(kind)?;
    let tag = tag_name(config, &next);
    tracing::info!(previous = %previous, next = %next, dry_run = options.dry_run, "preparing release");

    if options.tag && tagger.tag_exists(&tag)? {
        return Err(ReleaseError::TagExists { tag });
    }

    let dry_run_declared = if options.dry_run {
        let content = std::fs::read_to_string(&manifest_path).map_err(|e| io_err(&manifest_path, e))?;
        let updated = manifest::set_declared_version(&content, &manifest_path, &next.to_string())?;
        Some(manifest::parse_declared_version(&updated, &manifest_path)?)
    } else {
        manifest::write_declared_version(&manifest_path, &next)?;
        None
    };

    let changelog_stamped = changelog::stamp_file(&changelog_path, &next, options.date, options.dry_run)?;

    let declared = match dry_run_declared {
        Some(declared) => declared,
        None => manifest::read_declared_version(&manifest_path)?,
    };
    assert_consistent_with_prefix(&declared, &tag, config.tag_prefix)?;

    let tagged = options.tag && !options.dry_run;
    if tagged {
        let mut paths = vec![manifest_path.clone()];
        if changelog_stamped {
            paths.push(changelog_path);
        }
        tagger.commit(&paths, &format!("Bump version to {next}"))?;
        tagger.create_tag(&tag, &format!("Release {tag}"))?;
    }

    Ok(ReleaseReport {
        previous,
        next,
        tag,
        manifest: manifest_path,
        changelog_stamped,
        tagged,
        dry_run: options.dry_run,
    })
}

/// CI guard: the manifest's declared version must match `tag`.
pub fn check_release_tag(root: &Path, config: &ReleaseConfig, tag: &str) -> Result<String, ReleaseError> {
    let manifest_path = resolve(root, &config.manifest);
    let declared = manifest::read_declared_version(&manifest_path)?;
    assert_consistent_with_prefix(&declared, tag, config.tag_prefix)?;
    Ok(declared)
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
