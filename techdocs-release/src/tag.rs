//! Version-control collaborator for release commits and tags.
//!
//! Only local operations; pushing is left to the caller.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ReleaseError;

/// Local version-control operations a release needs.
pub trait Tagger {
    /// `Ok(())` when there are no uncommitted changes.
    fn ensure_clean(&self) -> Result<(), ReleaseError>;

    fn tag_exists(&self, tag: &str) -> Result<bool, ReleaseError>;

    /// Commit `paths` with `message`.
    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<(), ReleaseError>;

    /// Create an annotated tag on the current commit.
    fn create_tag(&self, tag: &str, message: &str) -> Result<(), ReleaseError>;
}

/// [`Tagger`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn git(&self, args: &[&str]) -> Result<std::process::Output, ReleaseError> {
        let command = format!("git {}", args.join(" "));
        tracing::debug!(command = %command, "running git");
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| ReleaseError::Vcs {
                command,
                detail: format!("{e}; is git installed?"),
            })
    }

    fn git_ok(&self, args: &[&str]) -> Result<String, ReleaseError> {
        let output = self.git(args)?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(ReleaseError::Vcs {
                command: format!("git {}", args.join(" ")),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Tagger for GitCli {
    fn ensure_clean(&self) -> Result<(), ReleaseError> {
        let status = self.git_ok(&["status", "--porcelain"])?;
        if status.trim().is_empty() {
            Ok(())
        } else {
            Err(ReleaseError::DirtyTree {
                status: status.trim_end().to_string(),
            })
        }
    }

    fn tag_exists(&self, tag: &str) -> Result<bool, ReleaseError> {
        let reference = format!("refs/tags/{tag}");
        let output = self.git(&["rev-parse", "-q", "--verify", &reference])?;
        Ok(output.status.success())
    }

    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<(), ReleaseError> {
        let relative: Vec<String> = paths
            .iter()
            .map(|p| relative_to(&self.root, p))
            .collect();
        let mut add = vec!["add", "--"];
        add.extend(relative.iter().map(String::as_str));
        self.git_ok(&add)?;
        self.git_ok(&["commit", "-m", message])?;
        Ok(())
    }

    fn create_tag(&self, tag: &str, message: &str) -> Result<(), ReleaseError> {
        self.git_ok(&["tag", "-a", tag, "-m", message])?;
        tracing::info!(tag = %tag, "created tag");
        Ok(())
    }
}

fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
