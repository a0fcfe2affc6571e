pub mod docs;
pub mod list;
pub mod release;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use techdocs_core::DocsConfig;

/// The project a command operates on: its root plus the loaded config.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: DocsConfig,
}

impl Project {
    pub fn load(root: PathBuf, config: Option<&Path>) -> Result<Self> {
        let config = DocsConfig::load_at(&root, config)
            .with_context(|| format!("failed to load config for {}", root.display()))?;
        tracing::debug!(root = %root.display(), "project config loaded");
        Ok(Self { root, config })
    }

    /// `path` relative to the project root, for display.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
            .replace('\\', "/")
    }
}
