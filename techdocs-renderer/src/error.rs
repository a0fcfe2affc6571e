//! Error types for techdocs-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while compiling templates or rendering a fragment.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template syntax error or a failed render (unknown variable, filter).
    #[error("template error: {0}; check custom templates under `templates_dir`")]
    Tera(#[from] tera::Error),

    #[error("cannot build the render context: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading the override directory failed.
    #[error("template io error at {path}: {source}; check `templates_dir` in techdocs.yaml")]
    Io { path: PathBuf, source: std::io::Error },
}
