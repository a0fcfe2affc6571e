//! Domain types for technique discovery and documentation sync.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Unique, stable identifier of a technique in the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechniqueKey(pub String);

impl fmt::Display for TechniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TechniqueKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TechniqueKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The category a technique belongs to (e.g. `chunking`, `retrieval`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

/// Display order used for known categories; anything else follows in
/// first-seen order.
pub const CANONICAL_CATEGORIES: &[&str] = &[
    "chunking",
    "retrieval",
    "reranking",
    "generation",
    "orchestration",
];

impl Category {
    /// The built-in canonical ordering as owned categories.
    pub fn canonical_order() -> Vec<Category> {
        CANONICAL_CATEGORIES.iter().map(|c| Category::from(*c)).collect()
    }

    /// Human-readable heading: `query_expansion` → `Query Expansion`.
    pub fn title(&self) -> String {
        self.0
            .split(['_', '-', ' '])
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Logical name of a documentation region (e.g. `techniques-index`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionName(pub String);

impl RegionName {
    pub const TECHNIQUES_INDEX: &'static str = "techniques-index";
    pub const README_SECTION: &'static str = "readme-techniques-section";
    pub const REFERENCE_SECTION: &'static str = "reference-techniques-section";
    pub const BENCHMARK_SCAFFOLD: &'static str = "benchmark-scaffold";
    pub const SHOWCASE_SCAFFOLD: &'static str = "showcase-scaffold";

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RegionName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RegionName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Technique records
// ---------------------------------------------------------------------------

/// One discovered technique. Records are recomputed on every run and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechniqueRecord {
    pub key: TechniqueKey,
    pub display_name: String,
    pub category: Category,
    pub description: String,
    /// Semantic-version string as declared by the technique.
    pub version: String,
    pub implementing_type: String,
    pub source_module: String,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_example: Option<String>,
}

// ---------------------------------------------------------------------------
// Rendering and sync
// ---------------------------------------------------------------------------

/// A rendered block of text bound to the region it belongs to.
///
/// Immutable once produced; the synchronizer consumes it by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    region: RegionName,
    body: String,
}

impl RenderedFragment {
    pub fn new(region: RegionName, body: String) -> Self {
        Self { region, body }
    }

    pub fn region(&self) -> &RegionName {
        &self.region
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_parts(self) -> (RegionName, String) {
        (self.region, self.body)
    }
}

/// Begin/end sentinel pair delimiting a region inside a hand-authored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMarkers {
    pub begin: String,
    pub end: String,
}

impl RegionMarkers {
    /// Default markers: `<!-- techdocs:begin <region> -->` / `<!-- techdocs:end <region> -->`.
    pub fn for_region(region: &RegionName) -> Self {
        Self {
            begin: format!("<!-- techdocs:begin {region} -->"),
            end: format!("<!-- techdocs:end {region} -->"),
        }
    }
}

/// How a fragment is merged into its target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetMode {
    /// The whole file is owned by techdocs and regenerated from the fragment.
    Generated,
    /// Only the text between the markers is replaced.
    Delimited(RegionMarkers),
}

/// Where a rendered fragment is merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub region: RegionName,
    /// Absolute path of the target file.
    pub path: PathBuf,
    pub mode: TargetMode,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
