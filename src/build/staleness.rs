//! Staleness policy: does a module need recompiling?
//!
//! A module is stale when any of these hold, checked in this order:
//!
//! 1. one of its *direct* imports was recompiled earlier in this run (cascade invalidation: the dependency's
//!    interface may have changed, whatever the timestamps say)
//! 2. its artifact does not exist
//! 3. its source was modified at or after its artifact (equal timestamps count as stale)

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use modbuild_graph::{GraphError, ModuleName, ModuleRecord};

use super::error::BuildError;

/// Why a module is being recompiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// A direct import was recompiled in this run.
    DependencyRebuilt(ModuleName),
    /// The artifact does not exist.
    MissingArtifact,
    /// The source is at least as new as the artifact.
    SourceNewer,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::DependencyRebuilt(dep) => write!(f, "dependency `{dep}` was rebuilt"),
            StaleReason::MissingArtifact => write!(f, "no artifact"),
            StaleReason::SourceNewer => write!(f, "source changed"),
        }
    }
}

/// Decide whether `module` must be compiled into `output`. `None` means the existing artifact is reusable.
pub fn check(
    module: &ModuleRecord,
    output: &Path,
    compiled: &HashSet<ModuleName>,
) -> Result<Option<StaleReason>, BuildError> {
    if let Some(dep) = module.imports.iter().find(|name| compiled.contains(*name)) {
        return Ok(Some(StaleReason::DependencyRebuilt(dep.clone())));
    }

    let Some(output_time) = modified(output)? else {
        return Ok(Some(StaleReason::MissingArtifact));
    };

    let Some(source_time) = modified(&module.filename)? else {
        // The scanner read it moments ago; it has since been removed
        return Err(GraphError::Resolution {
            module: module.name.clone(),
            path: module.filename.clone(),
        }
        .into());
    };

    if source_time >= output_time {
        Ok(Some(StaleReason::SourceNewer))
    } else {
        Ok(None)
    }
}

/// Modification time of `path`, or `None` if it does not exist.
fn modified(path: &Path) -> Result<Option<SystemTime>, BuildError> {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(time) => Ok(Some(time)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(BuildError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
