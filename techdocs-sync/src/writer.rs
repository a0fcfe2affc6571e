//! Atomic writer and single-target sync.
//!
//! ## `atomic_write` protocol
//!
//! 1. Ensure the parent directory exists.
//! 2. Write the new content to `<path>.techdocs.tmp`.
//! 3. Rename the temporary file onto the final path (atomic on POSIX).
//!
//! The temporary file is owned by a guard that removes it on every exit path
//! unless the rename succeeded. No other file is created or modified.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use techdocs_core::{RegionName, RenderedFragment, SyncTarget, TargetMode};

use crate::diff::{self, ChangeSet};
use crate::error::{io_err, SyncError};
use crate::region;

/// Suffix of the sibling file used for atomic replacement.
pub const TMP_SUFFIX: &str = ".techdocs.tmp";

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Whether a sync writes or only reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Apply,
    DryRun,
}

/// Outcome of an individual file write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// File was written (content changed or did not previously exist).
    Written,
    /// File was left untouched; merged content equals what is on disk.
    Unchanged,
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite,
}

/// Result of syncing one fragment into one target.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub region: RegionName,
    pub path: PathBuf,
    pub outcome: WriteOutcome,
    pub changes: ChangeSet,
}

impl SyncResult {
    /// `true` when the target differs (or would differ) from its previous state.
    pub fn changed(&self) -> bool {
        !matches!(self.outcome, WriteOutcome::Unchanged)
    }

    /// Unified diff of the change, labelled relative to `root`.
    pub fn preview(&self, root: &Path) -> String {
        let relative = self.path.strip_prefix(root).unwrap_or(self.path.as_path());
        let label = relative.display().to_string().replace('\\', "/");
        self.changes
            .unified(&format!("a/{label}"), &format!("b/{label}"))
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Removes the temporary file on drop unless disarmed.
struct TmpGuard<'a> {
    path: &'a Path,
    armed: bool,
}

impl Drop for TmpGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = std::fs::remove_file(self.path) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), "failed to remove temp file: {e}");
                }
            }
        }
    }
}

/// Path of the sibling temporary file for `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}{TMP_SUFFIX}", path.display()))
}

/// Atomically replace `path` with `content`, creating parent directories.
pub fn atomic_write(path: &Path, content: &str) -> Result<(), SyncError> {
    atomic_write_with_tmp(path, content, &tmp_path(path))
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let mut guard = TmpGuard { path: tmp, armed: true };
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    std::fs::rename(tmp, path).map_err(|e| io_err(path, e))?;
    guard.armed = false;
    Ok(())
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

fn read_optional(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Content `target` should hold after merging `body`, next to what it holds
/// now (`None` when a generated target does not exist yet).
pub fn merged_content(
    target: &SyncTarget,
    body: &str,
) -> Result<(Option<String>, String), SyncError> {
    match &target.mode {
        TargetMode::Generated => {
            let existing = read_optional(&target.path)?;
            let eol = existing.as_deref().map(region::detect_eol).unwrap_or("\n");
            let body = diff::normalize_line_endings(body);
            let merged = if eol == "\n" { body } else { body.replace('\n', eol) };
            Ok((existing, merged))
        }
        TargetMode::Delimited(markers) => {
            let existing = std::fs::read_to_string(&target.path)
                .map_err(|e| io_err(&target.path, e))?;
            let merged = region::splice(&existing, markers, body, &target.path, &target.region)?;
            Ok((Some(existing), merged))
        }
    }
}

/// Merge `fragment` into `target`.
///
/// Writes only when the merged content differs from what is on disk, so a
/// second sync with the same fragment leaves the file (and its mtime) alone.
/// [`SyncMode::DryRun`] performs every read and check but never writes.
pub fn sync(
    target: &SyncTarget,
    fragment: RenderedFragment,
    mode: SyncMode,
) -> Result<SyncResult, SyncError> {
    let (region, body) = fragment.into_parts();
    if region != target.region {
        return Err(SyncError::MissingFragment {
            path: target.path.clone(),
            region: target.region.clone(),
        });
    }

    let (existing, merged) = merged_content(target, &body)?;
    let changes = diff::plan(existing.as_deref().unwrap_or(""), &merged);

    let outcome = if existing.as_deref() == Some(merged.as_str()) {
        tracing::debug!(path = %target.path.display(), region = %region, "unchanged");
        WriteOutcome::Unchanged
    } else if mode == SyncMode::DryRun {
        tracing::info!(path = %target.path.display(), region = %region, "[dry-run] would write");
        WriteOutcome::WouldWrite
    } else {
        atomic_write(&target.path, &merged)?;
        tracing::info!(
            path = %target.path.display(),
            region = %region,
            insertions = changes.insertions(),
            deletions = changes.deletions(),
            "wrote"
        );
        WriteOutcome::Written
    };

    Ok(SyncResult {
        region,
        path: target.path.clone(),
        outcome,
        changes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use techdocs_core::RegionMarkers;
    use tempfile::TempDir;

    fn generated(path: PathBuf) -> SyncTarget {
        SyncTarget {
            region: RegionName::from("idx"),
            path,
            mode: TargetMode::Generated,
        }
    }

    fn delimited(path: PathBuf) -> SyncTarget {
        let region = RegionName::from("sec");
        SyncTarget {
            mode: TargetMode::Delimited(RegionMarkers::for_region(&region)),
            region,
            path,
        }
    }

    fn fragment(region: &str, body: &str) -> RenderedFragment {
        RenderedFragment::new(RegionName::from(region), body.to_string())
    }

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs").join("index.md");
        let result = sync(&generated(path.clone()), fragment("idx", "hello\n"), SyncMode::Apply).unwrap();
        assert_eq!(result.outcome, WriteOutcome::Written);
        assert!(result.changed());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn second_write_same_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let target = generated(tmp.path().join("file.md"));
        sync(&target, fragment("idx", "same\n"), SyncMode::Apply).unwrap();
        let result = sync(&target, fragment("idx", "same\n"), SyncMode::Apply).unwrap();
        assert_eq!(result.outcome, WriteOutcome::Unchanged);
        assert!(!result.changed());
        assert!(result.changes.is_empty());
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.md");
        let result = sync(&generated(path.clone()), fragment("idx", "content\n"), SyncMode::DryRun).unwrap();
        assert_eq!(result.outcome, WriteOutcome::WouldWrite);
        assert!(!path.exists(), "dry-run must not create files");
        assert_eq!(result.changes.insertions(), 1);
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.md");
        atomic_write(&path, "data").unwrap();
        assert!(!tmp_path(&path).exists(), ".techdocs.tmp must be cleaned up");
    }

    #[test]
    fn generated_target_keeps_crlf_convention() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("crlf.md");
        fs::write(&path, "a\r\nb\r\n").unwrap();
        let result = sync(&generated(path.clone()), fragment("idx", "a\nb\n"), SyncMode::Apply).unwrap();
        assert_eq!(result.outcome, WriteOutcome::Unchanged);
    }

    #[test]
    fn delimited_target_requires_existing_file() {
        let tmp = TempDir::new().unwrap();
        let err = sync(&delimited(tmp.path().join("README.md")), fragment("sec", "x"), SyncMode::DryRun)
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
    }

    #[test]
    fn mismatched_fragment_region_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = sync(&generated(tmp.path().join("x.md")), fragment("other", "x"), SyncMode::Apply)
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingFragment { .. }));
    }

    #[test]
    fn preview_uses_relative_labels() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs").join("index.md");
        let result = sync(&generated(path), fragment("idx", "new\n"), SyncMode::DryRun).unwrap();
        let preview = result.preview(tmp.path());
        assert!(preview.contains("--- a/docs/index.md"), "{preview}");
        assert!(preview.contains("+new"));
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("file.md");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp = tmp_dir.path().join("file.md.techdocs.tmp");

        let result = atomic_write_with_tmp(&path, "new content", &tmp);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root ignores directory permissions; only assert when the rename failed.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        }
        assert!(!tmp.exists(), ".techdocs.tmp should be cleaned up");
    }
}
