//! Tera rendering engine: [`FragmentKind`] enum and [`Renderer`].
//!
//! # Fragment mapping
//!
//! | Kind              | Region                          | Template              |
//! |-------------------|---------------------------------|-----------------------|
//! | TechniquesIndex   | `techniques-index`              | `index.md.tera`       |
//! | ReadmeSection     | `readme-techniques-section`     | `readme.md.tera`      |
//! | ReferenceSection  | `reference-techniques-section`  | `reference.md.tera`   |
//! | BenchmarkScaffold | `benchmark-scaffold`            | `benchmark.yaml.tera` |
//! | ShowcaseScaffold  | `showcase-scaffold`             | `showcase.md.tera`    |

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tera::Tera;

use techdocs_core::{Category, RegionName, RenderedFragment, TechniqueRecord};

use crate::context::CatalogContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Built-in templates; a `.tera` file of the same name under `templates_dir` wins
// ---------------------------------------------------------------------------

const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("index.md.tera", include_str!("templates/index.md.tera")),
    ("readme.md.tera", include_str!("templates/readme.md.tera")),
    ("reference.md.tera", include_str!("templates/reference.md.tera")),
    ("benchmark.yaml.tera", include_str!("templates/benchmark.yaml.tera")),
    ("showcase.md.tera", include_str!("templates/showcase.md.tera")),
];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn walk_override_dir(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            walk_override_dir(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_overrides(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    walk_override_dir(dir, &mut files)?;
    files.sort();
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!(template = %name, path = %path.display(), "loaded template override");
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(overrides: Option<&Path>) -> Result<Tera, RenderError> {
    let mut sources: HashMap<String, String> = HashMap::new();
    for (name, content) in EMBEDDED_TEMPLATES {
        sources.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = overrides {
        for (name, content) in load_overrides(dir)? {
            sources.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    // Markdown and YAML output; HTML escaping would mangle both.
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(sources.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

/// LF endings and exactly one trailing newline.
fn normalize_output(rendered: &str) -> String {
    let text = rendered.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = text.trim_end_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

// ---------------------------------------------------------------------------
// FragmentKind
// ---------------------------------------------------------------------------

/// Every documentation fragment the renderer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FragmentKind {
    TechniquesIndex,
    ReadmeSection,
    ReferenceSection,
    BenchmarkScaffold,
    ShowcaseScaffold,
}

impl FragmentKind {
    /// All kinds in a stable order.
    pub fn all() -> &'static [FragmentKind] {
        &[
            FragmentKind::TechniquesIndex,
            FragmentKind::ReadmeSection,
            FragmentKind::ReferenceSection,
            FragmentKind::BenchmarkScaffold,
            FragmentKind::ShowcaseScaffold,
        ]
    }

    /// Region the rendered fragment is bound to.
    pub fn region(&self) -> RegionName {
        let name = match self {
            FragmentKind::TechniquesIndex   => RegionName::TECHNIQUES_INDEX,
            FragmentKind::ReadmeSection     => RegionName::README_SECTION,
            FragmentKind::ReferenceSection  => RegionName::REFERENCE_SECTION,
            FragmentKind::BenchmarkScaffold => RegionName::BENCHMARK_SCAFFOLD,
            FragmentKind::ShowcaseScaffold  => RegionName::SHOWCASE_SCAFFOLD,
        };
        RegionName::from(name)
    }

    /// Template rendered for this kind.
    pub fn template_name(&self) -> &'static str {
        match self {
            FragmentKind::TechniquesIndex   => "index.md.tera",
            FragmentKind::ReadmeSection     => "readme.md.tera",
            FragmentKind::ReferenceSection  => "reference.md.tera",
            FragmentKind::BenchmarkScaffold => "benchmark.yaml.tera",
            FragmentKind::ShowcaseScaffold  => "showcase.md.tera",
        }
    }

    /// Reverse of [`FragmentKind::region`].
    pub fn for_region(region: &RegionName) -> Option<FragmentKind> {
        FragmentKind::all()
            .iter()
            .copied()
            .find(|kind| &kind.region() == region)
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Compiled templates, one per [`FragmentKind`], plus any overrides.
///
/// Override names are matched case-insensitively against the built-in names.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Compile the built-in templates, replacing any that `overrides` redefines.
    /// A missing `overrides` directory is not an error.
    pub fn new(overrides: Option<&Path>) -> Result<Self, RenderError> {
        Ok(TemplateEngine {
            tera: build_tera(overrides)?,
        })
    }

    /// Render `kind` against an already-built catalog context.
    pub fn render(
        &self,
        ctx: &CatalogContext,
        kind: FragmentKind,
    ) -> Result<RenderedFragment, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        self.render_tera(&tera_ctx, kind)
    }

    fn render_tera(
        &self,
        tera_ctx: &tera::Context,
        kind: FragmentKind,
    ) -> Result<RenderedFragment, RenderError> {
        let content = self.tera.render(kind.template_name(), tera_ctx)?;
        Ok(RenderedFragment::new(kind.region(), normalize_output(&content)))
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Turns technique records into documentation fragments.
///
/// Rendering is pure: the same records always produce byte-identical output.
/// Create once and reuse.
pub struct Renderer {
    engine: TemplateEngine,
    category_order: Vec<Category>,
}

impl Renderer {
    /// Construct a new [`Renderer`] with embedded templates and the canonical
    /// category order.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_options(None, Category::canonical_order())
    }

    /// Construct a [`Renderer`] honouring template overrides and a custom
    /// category order.
    pub fn with_options(
        templates_dir: Option<&Path>,
        category_order: Vec<Category>,
    ) -> Result<Self, RenderError> {
        Ok(Renderer {
            engine: TemplateEngine::new(templates_dir)?,
            category_order,
        })
    }

    /// Render the requested `kinds`, keyed by region.
    pub fn render(
        &self,
        records: &[TechniqueRecord],
        kinds: &[FragmentKind],
    ) -> Result<BTreeMap<RegionName, RenderedFragment>, RenderError> {
        let ctx = CatalogContext::from_records(records, &self.category_order);
        let tera_ctx = ctx.to_tera_context()?;

        let mut fragments = BTreeMap::new();
        for kind in kinds {
            let fragment = self.engine.render_tera(&tera_ctx, *kind)?;
            fragments.insert(kind.region(), fragment);
        }
        Ok(fragments)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
