//! Default documentation validator.

use std::fmt;
use std::path::{Path, PathBuf};

use techdocs_core::{DocsConfig, RegionName, SyncTarget};

use crate::collaborators::Validator;
use crate::error::{CollaboratorError, SyncError};
use crate::pipeline::Catalog;
use crate::writer::merged_content;

/// What kind of problem a [`Finding`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    MissingFile,
    Marker,
    Stale,
    MissingSite,
    EmptyRegistry,
}

/// One validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Finding {
    fn at(kind: FindingKind, path: &Path, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: Some(path.to_path_buf()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Checks required files, marker pairs, artifact freshness, the built site
/// and the registry itself.
#[derive(Debug, Clone)]
pub struct DocValidator {
    config: DocsConfig,
}

impl DocValidator {
    pub fn new(config: DocsConfig) -> Self {
        Self { config }
    }

    fn check_target(&self, target: &SyncTarget, catalog: &Catalog, findings: &mut Vec<Finding>) {
        let remedy = if target.region.as_str() == RegionName::TECHNIQUES_INDEX {
            "techdocs generate"
        } else {
            "techdocs update"
        };
        let Some(fragment) = catalog.fragment(&target.region) else {
            return;
        };
        if catalog.is_pending(&target.path) {
            tracing::debug!(path = %target.path.display(), "pending dry-run write counts as fresh");
            return;
        }

        match merged_content(target, fragment.body()) {
            Ok((None, _)) => findings.push(Finding::at(
                FindingKind::MissingFile,
                &target.path,
                format!("generated file is missing; run `{remedy}`"),
            )),
            Ok((Some(existing), merged)) if existing != merged => findings.push(Finding::at(
                FindingKind::Stale,
                &target.path,
                format!("`{}` is out of date; run `{remedy}`", target.region),
            )),
            Ok(_) => {}
            Err(SyncError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                findings.push(Finding::at(
                    FindingKind::MissingFile,
                    &target.path,
                    "file is missing; create it with the region markers",
                ))
            }
            Err(err @ (SyncError::RegionNotFound { .. } | SyncError::AmbiguousRegion { .. })) => {
                findings.push(Finding::at(FindingKind::Marker, &target.path, err.to_string()))
            }
            Err(err) => findings.push(Finding::at(FindingKind::MissingFile, &target.path, err.to_string())),
        }
    }
}

impl Validator for DocValidator {
    fn validate(&self, doc_root: &Path, catalog: &Catalog) -> Result<Vec<Finding>, CollaboratorError> {
        let mut findings = Vec::new();

        for required in &self.config.validation.required_files {
            let path = self.config.resolve(doc_root, required);
            if !path.is_file() {
                findings.push(Finding::at(FindingKind::MissingFile, &path, "required file is missing"));
            }
        }

        if catalog.records.is_empty() {
            findings.push(Finding {
                kind: FindingKind::EmptyRegistry,
                path: None,
                message: "no techniques are registered".to_string(),
            });
        }

        let mut targets = vec![self.config.index_target(doc_root)];
        targets.extend(self.config.update_targets(doc_root));
        for target in &targets {
            self.check_target(target, catalog, &mut findings);
        }

        if self.config.validation.require_site {
            let site = self.config.resolve(doc_root, &self.config.site_dir);
            if !site.is_dir() {
                findings.push(Finding::at(
                    FindingKind::MissingSite,
                    &site,
                    "site directory is missing; run `techdocs build`",
                ));
            }
        }

        tracing::debug!(findings = findings.len(), targets = targets.len(), "validation finished");
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_display_includes_path() {
        let finding = Finding::at(FindingKind::MissingFile, Path::new("README.md"), "required file is missing");
        assert_eq!(finding.to_string(), "README.md: required file is missing");

        let bare = Finding {
            kind: FindingKind::EmptyRegistry,
            path: None,
            message: "no techniques are registered".to_string(),
        };
        assert_eq!(bare.to_string(), "no techniques are registered");
    }
}
