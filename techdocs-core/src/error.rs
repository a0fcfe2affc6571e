//! Error types for techdocs-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TechniqueKey;

/// Boxed cause carried by [`DiscoveryError::ModuleImport`].
pub type ImportCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can arise while discovering technique records.
///
/// Discovery errors are fatal for a run: nothing can be rendered without the
/// registry, so no target is attempted once one of these is returned.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The module list itself could not be produced (e.g. manifest dir missing).
    #[error("cannot enumerate technique modules at {path}: {source}; check `registry.manifest_dir` in techdocs.yaml")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A known module failed to import.
    #[error("failed to import technique module `{module}` at {path}: {source}; fix or remove the module and rerun")]
    ModuleImport {
        module: String,
        path: PathBuf,
        #[source]
        source: ImportCause,
    },

    /// Every module imported but none registered a technique.
    #[error("registry is empty after importing {modules} module(s); check `registry.manifest_dir` and `registry.modules` in techdocs.yaml")]
    EmptyRegistry { modules: usize },

    /// Two records claim the same key.
    #[error("technique key `{key}` registered by both `{first}` and `{second}`; keys must be unique")]
    DuplicateKey {
        key: TechniqueKey,
        first: String,
        second: String,
    },
}

/// Errors raised while loading `techdocs.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config not found at {path}; create it or drop the --config flag")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure while reading the config file.
    #[error("cannot read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file parsed but a value is unusable.
    #[error("invalid config value `{field}` in {path}: {reason}; fix the value or remove it to use the default")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        reason: String,
    },
}
