//! Pipeline orchestrator: named commands, their prerequisites and a
//! fail-fast runner.
//!
//! | Command  | Prerequisites           | Own action                                   |
//! |----------|-------------------------|----------------------------------------------|
//! | generate | none                    | discover, render, sync the techniques index  |
//! | update   | generate                | sync README, reference, benchmark, showcase  |
//! | build    | update                  | [`SiteBuilder::build`]                       |
//! | serve    | build                   | [`PreviewServer::serve`]                     |
//! | validate | update                  | [`Validator::validate`], fail on findings    |
//! | clean    | none                    | delete generated artifacts and the site dir  |
//! | full     | clean, update, build    | none                                         |
//!
//! Discovery and rendering happen at most once per [`Pipeline::run`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use techdocs_core::{
    discover, DiscoveryError, DocsConfig, ManifestSource, RegionName, RenderedFragment, SyncTarget, TechniqueRecord,
    TechniqueSource,
};
use techdocs_renderer::{FragmentKind, Renderer};

use crate::collaborators::{ExternalCommand, PreviewServer, SiteBuilder, Validator};
use crate::error::{io_err, PipelineError, StepError, SyncError};
use crate::validate::DocValidator;
use crate::writer::{self, SyncMode, SyncResult, WriteOutcome};

// ---------------------------------------------------------------------------
// Commands and plans
// ---------------------------------------------------------------------------

/// A named pipeline command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    Generate,
    Update,
    Build,
    Serve,
    Validate,
    Clean,
    Full,
}

impl Command {
    /// All commands in a stable order.
    pub fn all() -> &'static [Command] {
        &[
            Command::Generate,
            Command::Update,
            Command::Build,
            Command::Serve,
            Command::Validate,
            Command::Clean,
            Command::Full,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Generate => "generate",
            Command::Update   => "update",
            Command::Build    => "build",
            Command::Serve    => "serve",
            Command::Validate => "validate",
            Command::Clean    => "clean",
            Command::Full     => "full",
        }
    }

    /// Commands that must complete before this one, in order.
    pub fn prerequisites(&self) -> &'static [Command] {
        match self {
            Command::Generate | Command::Clean => &[],
            Command::Update   => &[Command::Generate],
            Command::Build    => &[Command::Update],
            Command::Serve    => &[Command::Build],
            Command::Validate => &[Command::Update],
            Command::Full     => &[Command::Clean, Command::Update, Command::Build],
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::all()
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Command::all().iter().map(|c| c.name()).collect();
                format!("unknown command `{s}`; expected one of: {}", names.join(", "))
            })
    }
}

/// Prerequisites expanded depth-first, then `command` itself. Every step
/// appears at most once.
pub fn execution_plan(command: Command) -> Vec<Command> {
    let mut plan = Vec::new();
    visit(command, &mut plan);
    plan
}

fn visit(command: Command, plan: &mut Vec<Command>) {
    if plan.contains(&command) {
        return;
    }
    for prerequisite in command.prerequisites() {
        visit(*prerequisite, plan);
    }
    plan.push(command);
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Options propagated to every step of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip writes, deletions, builds and serving.
    pub dry_run: bool,
    /// Attach unified-diff previews of changed targets.
    pub verbose: bool,
}

/// Discovered records and their rendered fragments, shared by every step of a run.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub records: Vec<TechniqueRecord>,
    pub fragments: BTreeMap<RegionName, RenderedFragment>,
    /// Targets an earlier dry-run step of this run would have rewritten.
    pub pending: BTreeSet<PathBuf>,
}

impl Catalog {
    pub fn fragment(&self, region: &RegionName) -> Option<&RenderedFragment> {
        self.fragments.get(region)
    }

    /// Whether `path` is only out of date because the run is a dry run.
    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.contains(path)
    }

    fn record_pending(&mut self, results: &[SyncResult]) {
        self.pending.extend(
            results
                .iter()
                .filter(|r| r.outcome == WriteOutcome::WouldWrite)
                .map(|r| r.path.clone()),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    Absent,
    WouldRemove,
}

/// One path handled by `clean`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub path: PathBuf,
    pub outcome: RemovalOutcome,
}

/// What a completed step did.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Synced(Vec<SyncResult>),
    /// `skipped` is set in dry-run mode.
    Built { skipped: bool },
    Served { skipped: bool },
    Validated,
    Cleaned(Vec<Removal>),
    /// Composite command with no action of its own.
    Composite,
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub command: Command,
    pub outcome: StepOutcome,
    /// Unified diffs of changed targets (verbose runs only).
    pub previews: Vec<String>,
}

/// Reports of completed steps, in execution order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn commands(&self) -> Vec<Command> {
        self.steps.iter().map(|s| s.command).collect()
    }

    pub fn step(&self, command: Command) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.command == command)
    }

    /// Sync results across all steps.
    pub fn sync_results(&self) -> impl Iterator<Item = &SyncResult> {
        self.steps.iter().flat_map(|s| match &s.outcome {
            StepOutcome::Synced(results) => results.as_slice(),
            _ => &[][..],
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runs commands against one project root.
pub struct Pipeline {
    root: PathBuf,
    config: DocsConfig,
    source: Box<dyn TechniqueSource>,
    renderer: Renderer,
    builder: Box<dyn SiteBuilder>,
    server: Box<dyn PreviewServer>,
    validator: Box<dyn Validator>,
}

impl Pipeline {
    /// Pipeline with the default collaborators derived from `config`.
    pub fn new(root: impl Into<PathBuf>, config: DocsConfig) -> Result<Self, PipelineError> {
        let root = root.into();
        let templates_dir = config
            .templates_dir
            .as_ref()
            .map(|dir| config.resolve(&root, dir));
        let renderer = Renderer::with_options(
            templates_dir.as_deref(),
            config.registry.category_order.clone(),
        )?;

        Ok(Pipeline {
            source: Box::new(ManifestSource::from_config(&root, &config.registry)),
            renderer,
            builder: Box::new(ExternalCommand::new(config.site.build_command.clone(), &root)),
            server: Box::new(ExternalCommand::new(config.site.serve_command.clone(), &root)),
            validator: Box::new(DocValidator::new(config.clone())),
            root,
            config,
        })
    }

    pub fn with_source(mut self, source: impl TechniqueSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_site_builder(mut self, builder: impl SiteBuilder + 'static) -> Self {
        self.builder = Box::new(builder);
        self
    }

    pub fn with_preview_server(mut self, server: impl PreviewServer + 'static) -> Self {
        self.server = Box::new(server);
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Run `command` and its prerequisites.
    ///
    /// Stops at the first failing step; steps that already completed are
    /// returned inside the error and are not rolled back.
    pub fn run(&self, command: Command, options: RunOptions) -> Result<RunReport, PipelineError> {
        let plan = execution_plan(command);
        tracing::debug!(command = %command, plan = ?plan, "execution plan");

        let mut report = RunReport::default();
        let mut catalog = None;
        for step in plan {
            tracing::info!(step = %step, dry_run = options.dry_run, "running step");
            match self.run_step(step, options, &mut catalog) {
                Ok(done) => report.steps.push(done),
                Err(source) => {
                    tracing::warn!(step = %step, "step failed: {source}");
                    return Err(PipelineError::StepFailed {
                        step,
                        completed: report,
                        source,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Discover records through the configured source without rendering.
    pub fn records(&self) -> Result<Vec<TechniqueRecord>, DiscoveryError> {
        discover(self.source.as_ref())
    }

    /// Discover and render everything once; later steps reuse the result.
    fn catalog<'c>(&self, cache: &'c mut Option<Catalog>) -> Result<&'c Catalog, StepError> {
        let catalog = match cache.take() {
            Some(catalog) => catalog,
            None => {
                let records = discover(self.source.as_ref())?;
                let fragments = self.renderer.render(&records, FragmentKind::all())?;
                tracing::debug!(records = records.len(), fragments = fragments.len(), "catalog ready");
                Catalog {
                    records,
                    fragments,
                    pending: BTreeSet::new(),
                }
            }
        };
        Ok(cache.insert(catalog))
    }

    fn run_step(
        &self,
        step: Command,
        options: RunOptions,
        cache: &mut Option<Catalog>,
    ) -> Result<StepReport, StepError> {
        let mut previews = Vec::new();
        let outcome = match step {
            Command::Generate | Command::Update => {
                let targets = if step == Command::Generate {
                    vec![self.config.index_target(&self.root)]
                } else {
                    self.config.update_targets(&self.root)
                };
                let catalog = self.catalog(cache)?;
                let outcome = self.sync_targets(&targets, catalog, options, &mut previews)?;
                if let (StepOutcome::Synced(results), Some(catalog)) = (&outcome, cache.as_mut()) {
                    catalog.record_pending(results);
                }
                outcome
            }
            Command::Build => {
                if !options.dry_run {
                    self.builder.build(&self.site_config())?;
                }
                StepOutcome::Built { skipped: options.dry_run }
            }
            Command::Serve => {
                if !options.dry_run {
                    self.server.serve(&self.site_config())?;
                }
                StepOutcome::Served { skipped: options.dry_run }
            }
            Command::Validate => {
                let catalog = self.catalog(cache)?;
                let findings = self.validator.validate(&self.root, catalog)?;
                if !findings.is_empty() {
                    return Err(StepError::Validation { findings });
                }
                StepOutcome::Validated
            }
            Command::Clean => StepOutcome::Cleaned(self.clean(options)?),
            Command::Full => StepOutcome::Composite,
        };

        Ok(StepReport {
            command: step,
            outcome,
            previews,
        })
    }

    fn site_config(&self) -> PathBuf {
        self.config.resolve(&self.root, &self.config.site.config)
    }

    /// Attempt every target; report all failures together.
    fn sync_targets(
        &self,
        targets: &[SyncTarget],
        catalog: &Catalog,
        options: RunOptions,
        previews: &mut Vec<String>,
    ) -> Result<StepOutcome, StepError> {
        let mode = if options.dry_run { SyncMode::DryRun } else { SyncMode::Apply };
        let mut synced = Vec::new();
        let mut failed = Vec::new();

        for target in targets {
            let result = match catalog.fragment(&target.region) {
                Some(fragment) => writer::sync(target, fragment.clone(), mode),
                None => Err(SyncError::MissingFragment {
                    path: target.path.clone(),
                    region: target.region.clone(),
                }),
            };
            match result {
                Ok(result) => {
                    if options.verbose && result.changed() {
                        previews.push(result.preview(&self.root));
                    }
                    synced.push(result);
                }
                Err(err) => {
                    tracing::warn!(path = %target.path.display(), "target failed: {err}");
                    failed.push(err);
                }
            }
        }

        if failed.is_empty() {
            Ok(StepOutcome::Synced(synced))
        } else {
            Err(StepError::Targets { failed, synced })
        }
    }

    fn clean(&self, options: RunOptions) -> Result<Vec<Removal>, StepError> {
        let site = self.config.resolve(&self.root, &self.config.site_dir);
        let canonical = |p: &Path| p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
        let site_real = canonical(&site);
        let mut protected = vec![self.root.clone()];
        protected.extend(self.config.protected_paths(&self.root));
        if let Some(inside) = protected.into_iter().find(|p| canonical(p).starts_with(&site_real)) {
            return Err(StepError::UnsafeClean {
                path: site,
                protected: inside,
            });
        }

        let mut paths = self.config.generated_artifacts(&self.root);
        paths.push(site);

        let mut removals = Vec::with_capacity(paths.len());
        for path in paths {
            let outcome = remove(&path, options.dry_run).map_err(StepError::Clean)?;
            removals.push(Removal { path, outcome });
        }
        Ok(removals)
    }
}

fn remove(path: &Path, dry_run: bool) -> Result<RemovalOutcome, SyncError> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(RemovalOutcome::Absent),
        Err(err) => return Err(io_err(path, err)),
    };
    if dry_run {
        tracing::info!(path = %path.display(), "[dry-run] would remove");
        return Ok(RemovalOutcome::WouldRemove);
    }

    if meta.is_dir() {
        std::fs::remove_dir_all(path).map_err(|e| io_err(path, e))?;
    } else {
        std::fs::remove_file(path).map_err(|e| io_err(path, e))?;
    }
    tracing::info!(path = %path.display(), "removed");
    Ok(RemovalOutcome::Removed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_follow_prerequisites() {
        use Command::*;
        assert_eq!(execution_plan(Generate), vec![Generate]);
        assert_eq!(execution_plan(Update), vec![Generate, Update]);
        assert_eq!(execution_plan(Build), vec![Generate, Update, Build]);
        assert_eq!(execution_plan(Serve), vec![Generate, Update, Build, Serve]);
        assert_eq!(execution_plan(Validate), vec![Generate, Update, Validate]);
        assert_eq!(execution_plan(Clean), vec![Clean]);
        assert_eq!(execution_plan(Full), vec![Clean, Generate, Update, Build, Full]);
    }

    #[test]
    fn every_plan_lists_each_step_once_after_its_prerequisites() {
        for command in Command::all() {
            let plan = execution_plan(*command);
            for (i, step) in plan.iter().enumerate() {
                assert_eq!(plan.iter().filter(|s| *s == step).count(), 1, "{command}: {step} repeated");
                for prerequisite in step.prerequisites() {
                    let at = plan.iter().position(|s| s == prerequisite);
                    assert!(matches!(at, Some(p) if p < i), "{command}: {prerequisite} must precede {step}");
                }
            }
            assert_eq!(plan.last(), Some(command));
        }
    }

    #[test]
    fn command_names_round_trip() {
        for command in Command::all() {
            assert_eq!(command.name().parse::<Command>(), Ok(*command));
        }
        let err = "deploy".parse::<Command>().unwrap_err();
        assert!(err.contains("generate"));
    }
}
