//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use modbuild_graph::{DependencyWalker, FileImportScanner, GraphError, ModuleName};

use crate::build::{BuildError, BuildOrchestrator};
use crate::toolchain::MsvcCompiler;

use super::{CliError, CliResult, ExitCode, ProjectArgs};

// ============================================================================
// Build / run
// ============================================================================

/// Build the main module; with `run`, execute the result and return its exit status.
pub fn build_module(project: &ProjectArgs, run: bool) -> CliResult<ExitCode> {
    let main = ModuleName::new(project.main_module()?);
    let config = project.config();

    let compiler = MsvcCompiler::new().with_flags(&project.cl_flags);
    let mut orchestrator = BuildOrchestrator::new(&config, compiler);
    let outcome = orchestrator.build(&main)?;

    tracing::debug!("build plan:\n{}", outcome);
    tracing::info!("{}", outcome.summary());
    println!("{}", outcome.artifact.display());

    if run {
        run_artifact(&outcome.artifact)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Run a linked program with inherited stdio. Its exit status becomes ours.
fn run_artifact(artifact: &Path) -> CliResult<ExitCode> {
    tracing::info!("Running {}", artifact.display());
    let status = Command::new(artifact)
        .status()
        .map_err(|e| CliError::failure(format!("Error running {}: {}", artifact.display(), e)))?;

    // Killed by a signal: report as a plain failure
    let code = status.code().unwrap_or(1);
    tracing::info!("Process exited with status: {}", code);
    Ok(ExitCode(code))
}

// ============================================================================
// Graph
// ============================================================================

/// Print every module reachable from the main module, dependencies first.
pub fn print_graph(project: &ProjectArgs) -> CliResult<ExitCode> {
    let main = ModuleName::new(project.main_module()?);
    let layout = project.config().layout();
    let scanner = FileImportScanner;

    let mut walker = DependencyWalker::new(&layout, &scanner);
    let mut lines = Vec::new();
    walker
        .walk(&main, |record| {
            lines.push(format!("{} ({})", record.name, record.filename.display()));
            if !record.imports.is_empty() {
                let imports: Vec<&str> = record.imports.iter().map(ModuleName::as_str).collect();
                lines.push(format!("  imports: {}", imports.join(", ")));
            }
            Ok::<(), GraphError>(())
        })
        .map_err(|e| CliError::from(BuildError::from(e)))?;

    for line in lines {
        println!("{}", line);
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Clean
// ============================================================================

/// Empty `out_dir`, which must lie inside the current working directory.
pub fn clean(out_dir: &Path) -> CliResult<ExitCode> {
    let cwd = env::current_dir().map_err(|e| CliError::failure(format!("Error reading working directory: {}", e)))?;
    let removed = empty_dir(out_dir, &cwd).map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    tracing::info!("Removed {} entries from {}", removed, out_dir.display());
    Ok(ExitCode::SUCCESS)
}

/// Delete everything inside `dir`, keeping `dir` itself. Returns the number of top-level entries removed.
///
/// Refuses to touch anything that is not strictly below `cwd`, both as written and after resolving symlinks. A
/// missing directory is already empty.
pub fn empty_dir(dir: &Path, cwd: &Path) -> io::Result<usize> {
    let target = normalize(&cwd.join(dir));
    if !is_strictly_inside(&target, &normalize(cwd)) {
        return Err(outside_cwd(&target));
    }
    if !target.try_exists()? {
        return Ok(0);
    }
    // `build` may be a symlink pointing anywhere
    let resolved = fs::canonicalize(&target)?;
    if !is_strictly_inside(&resolved, &fs::canonicalize(cwd)?) {
        return Err(outside_cwd(&resolved));
    }

    let mut removed = 0;
    for entry in fs::read_dir(&resolved)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
        removed += 1;
    }
    Ok(removed)
}

fn is_strictly_inside(path: &Path, dir: &Path) -> bool {
    path != dir && path.starts_with(dir)
}

fn outside_cwd(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("refusing to clear {}: it is not inside the working directory", path.display()),
    )
}

/// Resolve `.` and `..` lexically so `build/..` cannot escape the containment check.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
