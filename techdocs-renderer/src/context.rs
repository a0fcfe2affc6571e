//! Template context: serializable rendering payload built from
//! [`TechniqueRecord`]s.
//!
//! Every fragment kind renders from the same [`CatalogContext`], so the
//! summary counts and category ordering always agree across documents.

use serde::{Deserialize, Serialize};

use techdocs_core::{group_by_category, Category, TechniqueRecord};

use crate::error::RenderError;

/// Rendering payload shared by all fragment kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogContext {
    pub summary: SummaryCtx,
    /// Non-empty categories in display order.
    pub categories: Vec<CategoryCtx>,
}

/// Registry-wide counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryCtx {
    pub total_techniques: usize,
    pub total_categories: usize,
}

/// One category with its members sorted by display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCtx {
    /// Raw category name (`query_expansion`).
    pub name: String,
    /// Heading form (`Query Expansion`).
    pub title: String,
    pub count: usize,
    /// Members carrying a usage example.
    pub example_count: usize,
    pub techniques: Vec<TechniqueCtx>,
}

/// One technique, flattened to strings the templates can print directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueCtx {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub implementing_type: String,
    pub source_module: String,
    pub dependencies: Vec<String>,
    /// `` `a`, `b` `` or `None`.
    pub dependencies_display: String,
    /// `a, b` or `None`.
    pub dependencies_plain: String,
    pub usage_example: Option<String>,
}

impl TechniqueCtx {
    fn from_record(record: &TechniqueRecord) -> Self {
        let dependencies: Vec<String> = record.dependencies.iter().cloned().collect();
        let (dependencies_display, dependencies_plain) = if dependencies.is_empty() {
            ("None".to_string(), "None".to_string())
        } else {
            (
                dependencies
                    .iter()
                    .map(|d| format!("`{d}`"))
                    .collect::<Vec<_>>()
                    .join(", "),
                dependencies.join(", "),
            )
        };

        TechniqueCtx {
            key: record.key.0.clone(),
            display_name: record.display_name.clone(),
            description: record.description.clone(),
            version: record.version.clone(),
            implementing_type: record.implementing_type.clone(),
            source_module: record.source_module.clone(),
            dependencies,
            dependencies_display,
            dependencies_plain,
            usage_example: record
                .usage_example
                .as_deref()
                .map(|e| e.replace("\r\n", "\n").trim_end().to_string())
                .filter(|e| !e.is_empty()),
        }
    }
}

impl CatalogContext {
    /// Build a [`CatalogContext`] from discovered records.
    pub fn from_records(records: &[TechniqueRecord], category_order: &[Category]) -> Self {
        let categories: Vec<CategoryCtx> = group_by_category(records, category_order)
            .into_iter()
            .map(|group| {
                let techniques: Vec<TechniqueCtx> =
                    group.records.iter().map(TechniqueCtx::from_record).collect();
                CategoryCtx {
                    name: group.category.0.clone(),
                    title: group.category.title(),
                    count: techniques.len(),
                    example_count: techniques
                        .iter()
                        .filter(|t| t.usage_example.is_some())
                        .count(),
                    techniques,
                }
            })
            .collect();

        CatalogContext {
            summary: SummaryCtx {
                total_techniques: categories.iter().map(|c| c.count).sum(),
                total_categories: categories.len(),
            },
            categories,
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
