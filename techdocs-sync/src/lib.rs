//! # techdocs-sync
//!
//! Region synchronizer, diff planner and pipeline orchestrator.
//!
//! [`writer::sync`] merges one rendered fragment into one target file through
//! an atomic replace. [`Pipeline::run`] sequences the named commands
//! (`generate`, `update`, `build`, `serve`, `validate`, `clean`, `full`) with
//! their prerequisites.

pub mod collaborators;
pub mod diff;
pub mod error;
pub mod pipeline;
pub mod region;
pub mod validate;
pub mod writer;

pub use collaborators::{ExternalCommand, PreviewServer, SiteBuilder, Validator};
pub use diff::{plan, ChangeSet};
pub use error::{CollaboratorError, PipelineError, StepError, SyncError};
pub use pipeline::{
    execution_plan, Catalog, Command, Pipeline, Removal, RemovalOutcome, RunOptions, RunReport,
    StepOutcome, StepReport,
};
pub use validate::{DocValidator, Finding, FindingKind};
pub use writer::{atomic_write, sync, SyncMode, SyncResult, WriteOutcome};
