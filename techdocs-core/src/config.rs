//! Project configuration: `techdocs.yaml` at the project root.
//!
//! Every section is optional; a missing default config file yields
//! [`DocsConfig::default`]. Paths are relative to the project root and are
//! resolved with [`DocsConfig::resolve`].
//!
//! ```yaml
//! registry:
//!   manifest_dir: techniques
//!   category_order: [chunking, retrieval, reranking, generation, orchestration]
//! generated:
//!   index: docs/techniques_generated.md
//! regions:
//!   readme:
//!     path: README.md
//! site:
//!   config: mkdocs.yml
//!   build_command: [mkdocs, build, -f, "{config}"]
//! release:
//!   manifest: Cargo.toml
//!   tag_prefix: v
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Category, RegionMarkers, RegionName, SyncTarget, TargetMode};

/// File name looked up at the project root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "techdocs.yaml";

/// Placeholder substituted with the site config path in collaborator commands.
pub const CONFIG_PLACEHOLDER: &str = "{config}";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Root of `techdocs.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    pub site_dir: PathBuf,
    /// Directory of `.tera` files overriding the embedded templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    pub registry: RegistryConfig,
    pub generated: GeneratedConfig,
    pub regions: RegionsConfig,
    pub site: SiteConfig,
    pub validation: ValidationConfig,
    pub release: ReleaseConfig,
}

/// Where technique modules live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Directory scanned for `*.yaml` / `*.yml` technique manifests.
    pub manifest_dir: PathBuf,
    /// Explicit module list (relative to `manifest_dir`); empty means "scan".
    pub modules: Vec<PathBuf>,
    pub category_order: Vec<Category>,
}

/// Files fully owned by techdocs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratedConfig {
    pub index: PathBuf,
    pub benchmark: PathBuf,
    pub showcase: PathBuf,
}

/// Hand-authored files carrying one marker pair each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegionsConfig {
    pub readme: RegionTargetConfig,
    pub reference: RegionTargetConfig,
}

/// One delimited region target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionTargetConfig {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl RegionTargetConfig {
    fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(path),
            begin: None,
            end: None,
        }
    }

    fn markers(&self, region: &RegionName) -> RegionMarkers {
        let defaults = RegionMarkers::for_region(region);
        RegionMarkers {
            begin: self.begin.clone().unwrap_or(defaults.begin),
            end: self.end.clone().unwrap_or(defaults.end),
        }
    }
}

/// Static-site collaborator commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub config: PathBuf,
    pub build_command: Vec<String>,
    pub serve_command: Vec<String>,
}

/// Inputs of the built-in validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub required_files: Vec<PathBuf>,
    /// Whether a missing site directory counts as a finding.
    pub require_site: bool,
}

/// Release path settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    pub manifest: PathBuf,
    pub changelog: PathBuf,
    pub tag_prefix: char,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            site_dir: PathBuf::from("site"),
            templates_dir: None,
            registry: RegistryConfig::default(),
            generated: GeneratedConfig::default(),
            regions: RegionsConfig::default(),
            site: SiteConfig::default(),
            validation: ValidationConfig::default(),
            release: ReleaseConfig::default(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            manifest_dir: PathBuf::from("techniques"),
            modules: Vec::new(),
            category_order: Category::canonical_order(),
        }
    }
}

impl Default for GeneratedConfig {
    fn default() -> Self {
        Self {
            index: PathBuf::from("docs/techniques_generated.md"),
            benchmark: PathBuf::from("benchmarks/techniques.bench.yaml"),
            showcase: PathBuf::from("docs/showcase_generated.md"),
        }
    }
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            readme: RegionTargetConfig::new("README.md"),
            reference: RegionTargetConfig::new("docs/techniques.md"),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config: PathBuf::from("mkdocs.yml"),
            build_command: ["mkdocs", "build", "-f", CONFIG_PLACEHOLDER]
                .map(String::from)
                .to_vec(),
            serve_command: ["mkdocs", "serve", "-f", CONFIG_PLACEHOLDER]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_files: vec![PathBuf::from("README.md"), PathBuf::from("mkdocs.yml")],
            require_site: true,
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("Cargo.toml"),
            changelog: PathBuf::from("CHANGELOG.md"),
            tag_prefix: 'v',
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl DocsConfig {
    /// Load the config for the project rooted at `root`.
    ///
    /// `explicit` must exist when given. Without it, `<root>/techdocs.yaml` is
    /// read if present, otherwise defaults are used.
    pub fn load_at(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => {
                let p = resolve_path(root, p);
                if !p.exists() {
                    return Err(ConfigError::NotFound { path: p });
                }
                p
            }
            None => {
                let p = root.join(DEFAULT_CONFIG_FILE);
                if !p.exists() {
                    tracing::debug!("no {} at {}, using defaults", DEFAULT_CONFIG_FILE, root.display());
                    return Ok(Self::default());
                }
                p
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: DocsConfig =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        config.validate_at(&path)?;
        Ok(config)
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_at(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// [`DocsConfig::validate`], naming `path` as the offending file.
    pub fn validate_at(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            field,
            reason,
        };

        if self.site.build_command.is_empty() {
            return Err(invalid(
                "site.build_command",
                "must name at least the program to run".to_string(),
            ));
        }
        if self.site.serve_command.is_empty() {
            return Err(invalid(
                "site.serve_command",
                "must name at least the program to run".to_string(),
            ));
        }
        let site = lexical(&self.site_dir);
        if let Some(inside) = self
            .hand_authored()
            .into_iter()
            .find(|p| lexical(p).starts_with(&site))
        {
            return Err(invalid(
                "site_dir",
                format!(
                    "{} would delete {} on `techdocs clean`; point it at the build output directory",
                    self.site_dir.display(),
                    inside.display()
                ),
            ));
        }
        let owned = [
            &self.generated.index,
            &self.generated.benchmark,
            &self.generated.showcase,
        ];
        for (name, region) in [
            (RegionName::README_SECTION, &self.regions.readme),
            (RegionName::REFERENCE_SECTION, &self.regions.reference),
        ] {
            let markers = region.markers(&RegionName::from(name));
            if markers.begin.is_empty()
                || markers.end.is_empty()
                || markers.begin.contains(&markers.end)
                || markers.end.contains(&markers.begin)
            {
                return Err(invalid(
                    "regions",
                    format!("markers for {name} must be non-empty and distinct"),
                ));
            }
            if owned.contains(&&region.path) {
                return Err(invalid(
                    "regions",
                    format!(
                        "{} is both a generated artifact and a hand-authored file",
                        region.path.display()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Resolve a config-relative path against the project root.
    pub fn resolve(&self, root: &Path, path: &Path) -> PathBuf {
        resolve_path(root, path)
    }

    /// The generated techniques index.
    pub fn index_target(&self, root: &Path) -> SyncTarget {
        generated_target(root, RegionName::TECHNIQUES_INDEX, &self.generated.index)
    }

    /// Targets refreshed by `update` on top of the index, in sync order.
    pub fn update_targets(&self, root: &Path) -> Vec<SyncTarget> {
        let readme = RegionName::from(RegionName::README_SECTION);
        let reference = RegionName::from(RegionName::REFERENCE_SECTION);
        vec![
            SyncTarget {
                path: resolve_path(root, &self.regions.readme.path),
                mode: TargetMode::Delimited(self.regions.readme.markers(&readme)),
                region: readme,
            },
            SyncTarget {
                path: resolve_path(root, &self.regions.reference.path),
                mode: TargetMode::Delimited(self.regions.reference.markers(&reference)),
                region: reference,
            },
            generated_target(root, RegionName::BENCHMARK_SCAFFOLD, &self.generated.benchmark),
            generated_target(root, RegionName::SHOWCASE_SCAFFOLD, &self.generated.showcase),
        ]
    }

    /// Inputs written by people; `clean` must never delete any of them.
    pub fn protected_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.hand_authored()
            .into_iter()
            .map(|p| resolve_path(root, p))
            .collect()
    }

    fn hand_authored(&self) -> Vec<&Path> {
        let mut paths = vec![
            self.regions.readme.path.as_path(),
            self.regions.reference.path.as_path(),
            self.registry.manifest_dir.as_path(),
            self.release.manifest.as_path(),
            self.release.changelog.as_path(),
            self.site.config.as_path(),
        ];
        paths.extend(self.templates_dir.as_deref());
        paths.extend(self.validation.required_files.iter().map(PathBuf::as_path));
        paths
    }

    /// Every file fully owned by techdocs; `clean` may delete exactly these.
    pub fn generated_artifacts(&self, root: &Path) -> Vec<PathBuf> {
        [
            &self.generated.index,
            &self.generated.benchmark,
            &self.generated.showcase,
        ]
        .into_iter()
        .map(|p| resolve_path(root, p))
        .collect()
    }
}

fn generated_target(root: &Path, region: &str, path: &Path) -> SyncTarget {
    SyncTarget {
        region: RegionName::from(region),
        path: resolve_path(root, path),
        mode: TargetMode::Generated,
    }
}

/// `path` without `.` components, for containment checks on unresolved paths.
fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
