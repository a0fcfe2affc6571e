//! External collaborators the pipeline delegates to.
//!
//! Each is an opaque blocking call. [`ExternalCommand`] is the default site
//! builder and preview server; tests substitute in-process fakes.

use std::path::{Path, PathBuf};
use std::process::Command as Process;

use techdocs_core::config::CONFIG_PLACEHOLDER;

use crate::error::CollaboratorError;
use crate::pipeline::Catalog;
use crate::validate::Finding;

/// Builds the static documentation site.
pub trait SiteBuilder {
    fn build(&self, config_path: &Path) -> Result<(), CollaboratorError>;
}

/// Serves the built site locally; blocks until the server exits.
pub trait PreviewServer {
    fn serve(&self, config_path: &Path) -> Result<(), CollaboratorError>;
}

/// Checks the documentation tree. An empty list means valid.
pub trait Validator {
    fn validate(&self, doc_root: &Path, catalog: &Catalog) -> Result<Vec<Finding>, CollaboratorError>;
}

/// Runs a configured argv, substituting `{config}` with the site config path.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    argv: Vec<String>,
    cwd: PathBuf,
}

impl ExternalCommand {
    pub fn new(argv: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            argv,
            cwd: cwd.into(),
        }
    }

    /// The argv with the placeholder substituted.
    pub fn resolved_argv(&self, config_path: &Path) -> Vec<String> {
        let config = config_path.display().to_string();
        self.argv
            .iter()
            .map(|arg| arg.replace(CONFIG_PLACEHOLDER, &config))
            .collect()
    }

    fn run(&self, config_path: &Path) -> Result<(), CollaboratorError> {
        let argv = self.resolved_argv(config_path);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CollaboratorError::Other("empty command line".to_string()))?;
        let command = argv.join(" ");

        tracing::info!(command = %command, cwd = %self.cwd.display(), "running external command");
        let status = Process::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .status()
            .map_err(|source| CollaboratorError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CollaboratorError::Failed {
                command,
                status: status.to_string(),
            })
        }
    }
}

impl SiteBuilder for ExternalCommand {
    fn build(&self, config_path: &Path) -> Result<(), CollaboratorError> {
        self.run(config_path)
    }
}

impl PreviewServer for ExternalCommand {
    fn serve(&self, config_path: &Path) -> Result<(), CollaboratorError> {
        self.run(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn placeholder_is_substituted() {
        let cmd = ExternalCommand::new(
            vec!["mkdocs".into(), "build".into(), "-f".into(), "{config}".into()],
            "/proj",
        );
        assert_eq!(
            cmd.resolved_argv(Path::new("/proj/mkdocs.yml")),
            vec!["mkdocs", "build", "-f", "/proj/mkdocs.yml"]
        );
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let cmd = ExternalCommand::new(vec!["techdocs-no-such-program-xyz".into()], dir.path());
        let err = cmd.build(Path::new("mkdocs.yml")).unwrap_err();
        assert!(matches!(err, CollaboratorError::Spawn { .. }), "got: {err}");
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_failure() {
        let dir = TempDir::new().unwrap();
        let cmd = ExternalCommand::new(vec!["false".into()], dir.path());
        let err = cmd.build(Path::new("mkdocs.yml")).unwrap_err();
        assert!(matches!(err, CollaboratorError::Failed { .. }), "got: {err}");
    }

    #[test]
    #[cfg(unix)]
    fn zero_exit_is_success() {
        let dir = TempDir::new().unwrap();
        let cmd = ExternalCommand::new(vec!["true".into()], dir.path());
        assert!(cmd.serve(Path::new("mkdocs.yml")).is_ok());
    }
}
