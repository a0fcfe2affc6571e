//! Keep-a-changelog stamping.

use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{io_err, ReleaseError};
use crate::version::ReleaseVersion;

const UNRELEASED: &str = "## [Unreleased]";

/// Heading written for a release.
pub fn release_heading(version: &ReleaseVersion, date: NaiveDate) -> String {
    format!("## [{version}] - {}", date.format("%Y-%m-%d"))
}

/// `content` with a heading for `version` inserted below `## [Unreleased]`,
/// so pending entries move under the new release. Returns `None` when the
/// version already has a heading.
///
/// Without an Unreleased section the heading goes before the first `## `
/// heading, or at the end of the file.
pub fn stamp(content: &str, version: &ReleaseVersion, date: NaiveDate) -> Option<String> {
    let existing = format!("## [{version}]");
    if content.lines().any(|line| line.trim_start().starts_with(&existing)) {
        return None;
    }

    let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let heading = release_heading(version, date);
    let mut out = String::with_capacity(content.len() + heading.len() + 4);
    let mut inserted = false;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if !inserted && trimmed.starts_with("## ") && !trimmed.eq_ignore_ascii_case(UNRELEASED) {
            out.push_str(&heading);
            out.push_str(eol);
            out.push_str(eol);
            inserted = true;
        }
        out.push_str(line);
        if !inserted && trimmed.eq_ignore_ascii_case(UNRELEASED) {
            if !line.ends_with('\n') {
                out.push_str(eol);
            }
            out.push_str(eol);
            out.push_str(&heading);
            out.push_str(eol);
            inserted = true;
        }
    }

    if !inserted {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push_str(eol);
        }
        if !out.is_empty() {
            out.push_str(eol);
        }
        out.push_str(&heading);
        out.push_str(eol);
    }
    Some(out)
}

/// Stamp the changelog at `path`. Returns whether it changed; a missing file
/// is left alone.
pub fn stamp_file(
    path: &Path,
    version: &ReleaseVersion,
    date: NaiveDate,
    dry_run: bool,
) -> Result<bool, ReleaseError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no changelog; skipping");
            return Ok(false);
        }
        Err(e) => return Err(io_err(path, e)),
    };

    let Some(stamped) = stamp(&content, version, date) else {
        tracing::debug!(path = %path.display(), version = %version, "changelog already stamped");
        return Ok(false);
    };
    if !dry_run {
        std::fs::write(path, stamped).map_err(|e| io_err(path, e))?;
        tracing::info!(path = %path.display(), version = %version, "stamped changelog");
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
    }

    fn version() -> ReleaseVersion {
        ReleaseVersion::new(1, 3, 0)
    }

    #[test]
    fn heading_goes_below_unreleased() {
        let content = "# Changelog\n\n## [Unreleased]\n### Added\n- thing\n\n## [1.2.3] - 2026-01-01\n";
        let out = stamp(content, &version(), date()).expect("stamped");
        assert_eq!(
            out,
            "# Changelog\n\n## [Unreleased]\n\n## [1.3.0] - 2026-10-16\n### Added\n- thing\n\n## [1.2.3] - 2026-01-01\n"
        );
    }

    #[test]
    fn already_stamped_is_none() {
        let content = "## [Unreleased]\n\n## [1.3.0] - 2026-10-01\n";
        assert!(stamp(content, &version(), date()).is_none());
    }

    #[test]
    fn without_unreleased_heading_precedes_first_release() {
        let content = "# Changelog\n\n## [1.2.3] - 2026-01-01\n- fix\n";
        let out = stamp(content, &version(), date()).expect("stamped");
        assert_eq!(
            out,
            "# Changelog\n\n## [1.3.0] - 2026-10-16\n\n## [1.2.3] - 2026-01-01\n- fix\n"
        );
    }

    #[test]
    fn empty_changelog_gets_a_heading() {
        assert_eq!(
            stamp("", &version(), date()).expect("stamped"),
            "## [1.3.0] - 2026-10-16\n"
        );
    }
}
