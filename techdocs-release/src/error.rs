//! Error types for techdocs-release.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from release operations.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("invalid version `{input}`: {reason}; expected MAJOR.MINOR.PATCH (e.g. 1.2.3)")]
    InvalidVersion { input: String, reason: String },

    /// An explicit target version that does not move forward.
    #[error("version {requested} is not greater than the current version {current}; pick a higher version")]
    VersionOrder { current: String, requested: String },

    #[error("version component overflow while bumping {version}")]
    Overflow { version: String },

    /// Declared package version and release tag disagree.
    #[error("declared version {declared} does not match tag `{tag}`; bump the manifest or retag")]
    VersionMismatch { declared: String, tag: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no version declared in {path}; add `version = \"x.y.z\"` under [package], [project] or [workspace.package]")]
    MissingVersion { path: PathBuf },

    #[error("working tree is not clean; commit or stash changes first:\n{status}")]
    DirtyTree { status: String },

    #[error("tag `{tag}` already exists; delete it or choose another version")]
    TagExists { tag: String },

    #[error("`{command}` failed: {detail}")]
    Vcs { command: String, detail: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ReleaseError {
    ReleaseError::Io {
        path: path.into(),
        source,
    }
}
