//! Incremental build driver
//!
//! Walks the module graph from the root, compiles each stale module as soon as all of its imports are done, and
//! links the result. One orchestrator run is strictly sequential: the toolchain runs in the output directory with a
//! shared environment cache, so no two invocations may overlap.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use modbuild_graph::{
    DependencyWalker, FileImportScanner, ImportScanner, ModuleName, ModuleRecord, ModuleResolver, SourceLayout,
};

use super::error::BuildError;
use super::report::{BuildOutcome, ModuleAction, ModuleOutcome};
use super::staleness;
use crate::config::BuildConfig;
use crate::toolchain::{Arch, CompilerAdapter};

/// Where a build run currently is.
///
/// `NotStarted → Walking → (Compiling)* → Linking | LinkSkipped → Done`, or `Failed` from any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    NotStarted,
    Walking,
    Compiling,
    Linking,
    LinkSkipped,
    Done,
    Failed,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildPhase::NotStarted => "not started",
            BuildPhase::Walking => "walking",
            BuildPhase::Compiling => "compiling",
            BuildPhase::Linking => "linking",
            BuildPhase::LinkSkipped => "link skipped",
            BuildPhase::Done => "done",
            BuildPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one incremental build through a [`CompilerAdapter`].
pub struct BuildOrchestrator<A, R = SourceLayout, S = FileImportScanner> {
    adapter: A,
    resolver: R,
    scanner: S,
    output_dir: PathBuf,
    target: Option<Arch>,
    phase: BuildPhase,
}

impl<A: CompilerAdapter> BuildOrchestrator<A> {
    /// An orchestrator for the project layout described by `config`.
    pub fn new(config: &BuildConfig, adapter: A) -> Self {
        let mut orchestrator = Self::with_parts(adapter, config.layout(), FileImportScanner, config.output_path());
        orchestrator.target = config.target;
        orchestrator
    }
}

impl<A, R, S> BuildOrchestrator<A, R, S>
where
    A: CompilerAdapter,
    R: ModuleResolver,
    S: ImportScanner,
{
    pub fn with_parts(adapter: A, resolver: R, scanner: S, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            adapter,
            resolver,
            scanner,
            output_dir: output_dir.into(),
            target: None,
            phase: BuildPhase::NotStarted,
        }
    }

    /// Build for `target` instead of the host architecture.
    pub fn with_target(mut self, target: Arch) -> Self {
        self.target = Some(target);
        self
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Build `root` and everything it imports, then link if anything changed.
    ///
    /// Compilation is fail-fast: the first module the toolchain rejects ends the run, its dependents are never
    /// compiled and the link never runs.
    #[tracing::instrument(skip_all, fields(root = %root))]
    pub fn build(&mut self, root: &ModuleName) -> Result<BuildOutcome, BuildError> {
        self.phase = BuildPhase::NotStarted;
        let result = self.run(root);
        if let Err(e) = &result {
            tracing::debug!(phase = %self.phase, "build failed: {}", e);
            self.phase = BuildPhase::Failed;
        }
        result
    }

    fn run(&mut self, root: &ModuleName) -> Result<BuildOutcome, BuildError> {
        let target = self.prepare()?;
        tracing::info!("Compiling {} -> {}", target, self.output_dir.display());

        self.phase = BuildPhase::Walking;
        let mut compiled: HashSet<ModuleName> = HashSet::new();
        let mut outputs: Vec<PathBuf> = Vec::new();
        let mut modules: Vec<ModuleOutcome> = Vec::new();

        let mut walker = DependencyWalker::new(&self.resolver, &self.scanner);
        let adapter = &mut self.adapter;
        let phase = &mut self.phase;
        let output_dir = self.output_dir.as_path();
        let mut root_built = false;
        walker.walk(root, |record| {
            root_built |= record.is_root;
            let outcome = visit_module(adapter, output_dir, phase, &mut compiled, record)?;
            outputs.push(outcome.output.clone());
            modules.push(outcome);
            Ok::<(), BuildError>(())
        })?;

        if !root_built {
            return Err(BuildError::NothingToBuild { root: root.clone() });
        }

        let artifact = self.output_dir.join(self.adapter.link_output_file(root));
        let artifact_exists = artifact.try_exists().map_err(|source| BuildError::Io {
            path: artifact.clone(),
            source,
        })?;

        let linked = if !compiled.is_empty() || !artifact_exists {
            self.phase = BuildPhase::Linking;
            tracing::info!("Linking {} -> {}", target, artifact.display());
            let result = self.adapter.link(&outputs, &artifact)?;
            if !result.is_success() {
                return Err(BuildError::Link {
                    artifact,
                    status: result.status,
                    output: result.combined(),
                });
            }
            true
        } else {
            self.phase = BuildPhase::LinkSkipped;
            tracing::info!("{} is up to date", artifact.display());
            false
        };

        self.phase = BuildPhase::Done;
        Ok(BuildOutcome {
            artifact,
            outputs,
            modules,
            linked,
        })
    }

    /// Create the output directory and initialize the toolchain. Returns the target architecture.
    fn prepare(&mut self) -> Result<Arch, BuildError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| BuildError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let host = self
            .adapter
            .host_architecture()
            .map_err(BuildError::ToolchainDiscovery)?;
        let target = self.target.unwrap_or(host);
        self.adapter
            .initialize(&self.output_dir, host, target)
            .map_err(BuildError::ToolchainDiscovery)?;
        Ok(target)
    }
}

/// Handle one module in dependency order: assign its artifact, decide staleness, compile if needed.
fn visit_module<A: CompilerAdapter>(
    adapter: &mut A,
    output_dir: &Path,
    phase: &mut BuildPhase,
    compiled: &mut HashSet<ModuleName>,
    mut record: ModuleRecord,
) -> Result<ModuleOutcome, BuildError> {
    let output = output_dir.join(adapter.module_output_file(&record.name));
    record.output = Some(output.clone());

    let Some(reason) = staleness::check(&record, &output, compiled)? else {
        tracing::debug!(module = %record.name, "up to date");
        return Ok(ModuleOutcome {
            name: record.name,
            output,
            action: ModuleAction::UpToDate,
        });
    };

    *phase = BuildPhase::Compiling;
    tracing::debug!(module = %record.name, %reason, "stale");
    tracing::info!("{} -> {}", record.name, output.display());

    let result = adapter.compile_module(&record)?;
    if !result.is_success() {
        return Err(BuildError::Compile {
            module: record.name,
            status: result.status,
            output: result.combined(),
        });
    }

    record.compiled = true;
    compiled.insert(record.name.clone());
    *phase = BuildPhase::Walking;
    Ok(ModuleOutcome {
        name: record.name,
        output,
        action: ModuleAction::Compiled(reason),
    })
}
