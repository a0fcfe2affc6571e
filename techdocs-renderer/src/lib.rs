//! # techdocs-renderer
//!
//! Tera-based renderer turning discovered technique records into
//! documentation fragments, one per region.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use techdocs_core::TechniqueRecord;
//! use techdocs_renderer::{FragmentKind, Renderer};
//!
//! fn render_index(records: &[TechniqueRecord]) {
//!     if let Ok(renderer) = Renderer::new() {
//!         if let Ok(fragments) = renderer.render(records, &[FragmentKind::TechniquesIndex]) {
//!             for (region, fragment) in fragments {
//!                 println!("{region}: {} bytes", fragment.body().len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::CatalogContext;
pub use engine::{FragmentKind, Renderer, TemplateEngine};
pub use error::RenderError;
