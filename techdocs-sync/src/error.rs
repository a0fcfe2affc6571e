//! Error types for techdocs-sync.

use std::path::PathBuf;

use thiserror::Error;

use techdocs_core::{DiscoveryError, RegionName};
use techdocs_renderer::RenderError;

use crate::pipeline::{Command, RunReport};
use crate::validate::Finding;
use crate::writer::SyncResult;

/// Errors from merging one fragment into one target.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A marker is missing, or the end marker precedes the begin marker.
    #[error("region `{region}` not found in {path}: {detail}; add the marker pair `{begin}` ... `{end}` to the file")]
    RegionNotFound {
        path: PathBuf,
        region: RegionName,
        begin: String,
        end: String,
        detail: String,
    },

    /// A marker occurs more than once.
    #[error("region `{region}` is ambiguous in {path}: marker `{marker}` occurs {count} times; keep exactly one begin/end pair")]
    AmbiguousRegion {
        path: PathBuf,
        region: RegionName,
        marker: String,
        count: usize,
    },

    /// No fragment was rendered for the target's region.
    #[error("no rendered fragment for region `{region}` (target {path}); check custom templates")]
    MissingFragment { path: PathBuf, region: RegionName },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}; check that the path exists and is writable")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Failures of the external collaborators (site builder, preview server,
/// validator).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("failed to launch `{command}`: {source}; is it installed and on PATH?")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}; rerun it by hand to see its output")]
    Failed { command: String, status: String },

    #[error("{0}")]
    Other(String),
}

/// Why a single pipeline step failed.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// Every target was attempted; `failed` lists the ones that did not sync.
    #[error("{} target(s) failed:{}", .failed.len(), bullet_list(.failed))]
    Targets {
        failed: Vec<SyncError>,
        synced: Vec<SyncResult>,
    },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("validation found {} problem(s):{}", .findings.len(), bullet_list(.findings))]
    Validation { findings: Vec<Finding> },

    #[error(transparent)]
    Clean(SyncError),

    /// Refusing to delete a directory holding the project root or a hand-authored input.
    #[error("refusing to remove {path}: it contains {protected}; point `site_dir` at a build output directory")]
    UnsafeClean { path: PathBuf, protected: PathBuf },
}

/// A pipeline run that stopped at a failing step.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("step `{step}` failed: {source}")]
    StepFailed {
        step: Command,
        /// Steps that finished before the failure; nothing is rolled back.
        completed: RunReport,
        #[source]
        source: StepError,
    },

    /// The default collaborators could not be set up.
    #[error(transparent)]
    Setup(#[from] RenderError),
}

impl PipelineError {
    /// The failing step, if the run got that far.
    pub fn step(&self) -> Option<Command> {
        match self {
            PipelineError::StepFailed { step, .. } => Some(*step),
            PipelineError::Setup(_) => None,
        }
    }
}

fn bullet_list<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| format!("\n  - {item}")).collect()
}
