//! Registry adapter: turns the set of known technique modules into a plain,
//! ordered collection of [`TechniqueRecord`]s.
//!
//! # Module layout
//!
//! ```text
//! <root>/
//!   techniques/            (registry.manifest_dir)
//!     bm25.yaml            (one module; may register several techniques)
//!     fixed_size_chunker.yaml
//! ```
//!
//! # API pattern
//!
//! [`discover`] works against any [`TechniqueSource`]; [`ManifestSource`] is
//! the on-disk implementation. Discovery never writes.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::RegistryConfig;
use crate::error::{DiscoveryError, ImportCause};
use crate::types::{Category, TechniqueKey, TechniqueRecord};

// ---------------------------------------------------------------------------
// 1. Source abstraction
// ---------------------------------------------------------------------------

/// A read-only enumerable of technique records, reachable after importing a
/// known set of modules.
pub trait TechniqueSource {
    /// Identifiers of every module known to register techniques, in import order.
    fn modules(&self) -> Result<Vec<String>, DiscoveryError>;

    /// Import one module and return the records it registers.
    fn import(&self, module: &str) -> Result<Vec<TechniqueRecord>, ImportCause>;

    /// Where `module` lives, for error messages.
    fn location(&self, module: &str) -> PathBuf {
        PathBuf::from(module)
    }
}

// ---------------------------------------------------------------------------
// 2. Discovery
// ---------------------------------------------------------------------------

/// Import every module of `source` and collect the registered records.
///
/// Fails on the first module that cannot be imported, when two records share
/// a key, or when nothing was registered at all.
pub fn discover(source: &dyn TechniqueSource) -> Result<Vec<TechniqueRecord>, DiscoveryError> {
    let modules = source.modules()?;
    let mut owners: HashMap<TechniqueKey, String> = HashMap::new();
    let mut records = Vec::new();

    for module in &modules {
        let imported = source
            .import(module)
            .map_err(|cause| DiscoveryError::ModuleImport {
                module: module.clone(),
                path: source.location(module),
                source: cause,
            })?;
        tracing::debug!(module = %module, count = imported.len(), "imported technique module");

        for record in imported {
            if let Some(first) = owners.get(&record.key) {
                return Err(DiscoveryError::DuplicateKey {
                    key: record.key,
                    first: first.clone(),
                    second: module.clone(),
                });
            }
            owners.insert(record.key.clone(), module.clone());
            records.push(record);
        }
    }

    if records.is_empty() {
        return Err(DiscoveryError::EmptyRegistry {
            modules: modules.len(),
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// 3. On-disk manifests
// ---------------------------------------------------------------------------

/// Technique source backed by YAML manifests, one file per module.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    dir: PathBuf,
    explicit: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleManifest {
    /// Dotted module path; defaults to `techniques.<file stem>`.
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    techniques: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    key: String,
    #[serde(default)]
    display_name: Option<String>,
    category: String,
    description: String,
    #[serde(default = "default_version")]
    version: String,
    implementing_type: String,
    #[serde(default)]
    dependencies: BTreeSet<String>,
    #[serde(default)]
    usage_example: Option<String>,
    /// Free-form documentation attached to the implementation.
    #[serde(default)]
    doc: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl ManifestSource {
    /// Source reading every manifest in `dir` (sorted by file name).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            explicit: Vec::new(),
        }
    }

    /// Source for the project rooted at `root`, honouring an explicit module list.
    pub fn from_config(root: &Path, config: &RegistryConfig) -> Self {
        let dir = if config.manifest_dir.is_absolute() {
            config.manifest_dir.clone()
        } else {
            root.join(&config.manifest_dir)
        };
        Self {
            dir,
            explicit: config.modules.clone(),
        }
    }

}

impl TechniqueSource for ManifestSource {
    fn modules(&self) -> Result<Vec<String>, DiscoveryError> {
        if !self.explicit.is_empty() {
            return Ok(self
                .explicit
                .iter()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .collect());
        }

        let unavailable = |source| DiscoveryError::SourceUnavailable {
            path: self.dir.clone(),
            source,
        };
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)
            .map_err(unavailable)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
            .collect();
        names.sort();
        Ok(names)
    }

    fn location(&self, module: &str) -> PathBuf {
        self.dir.join(module)
    }

    fn import(&self, module: &str) -> Result<Vec<TechniqueRecord>, ImportCause> {
        let path = self.location(module);
        let contents = std::fs::read_to_string(&path)?;
        let manifest: ModuleManifest = serde_yaml::from_str(&contents)?;

        let source_module = manifest.module.unwrap_or_else(|| {
            let stem = Path::new(module)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| module.to_string());
            format!("techniques.{stem}")
        });

        Ok(manifest
            .techniques
            .into_iter()
            .map(|entry| {
                let usage_example = entry
                    .usage_example
                    .or_else(|| entry.doc.as_deref().and_then(extract_usage_example));
                TechniqueRecord {
                    display_name: entry.display_name.unwrap_or_else(|| entry.key.clone()),
                    key: TechniqueKey::from(entry.key),
                    category: Category::from(entry.category),
                    description: entry.description,
                    version: entry.version,
                    implementing_type: entry.implementing_type,
                    source_module: source_module.clone(),
                    dependencies: entry.dependencies,
                    usage_example,
                }
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// 4. Usage examples
// ---------------------------------------------------------------------------

/// Best-effort extraction of a usage example from attached documentation.
///
/// Takes the lines following the first line containing `Example:` up to the
/// first non-empty line that is not indented. Returns `None` when there is no
/// such block or it is blank.
pub fn extract_usage_example(doc: &str) -> Option<String> {
    let mut lines = doc.lines().skip_while(|line| !line.contains("Example:"));
    lines.next()?;

    let block: Vec<&str> = lines
        .take_while(|line| line.trim().is_empty() || line.starts_with(' ') || line.starts_with('\t'))
        .collect();

    // Indentation is ASCII space/tab only, so byte offsets stay on char boundaries.
    let indent_of = |l: &str| l.len() - l.trim_start_matches([' ', '\t']).len();
    let indent = block
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()?;

    let text = block
        .iter()
        .map(|l| if l.trim().is_empty() { "" } else { &l[indent..] })
        .collect::<Vec<&str>>()
        .join("\n");
    let text = text.trim_matches('\n').trim_end().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
