//! What a build did, module by module.

use std::fmt;
use std::path::{Path, PathBuf};

use modbuild_graph::ModuleName;

use super::staleness::StaleReason;

/// What happened to one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleAction {
    Compiled(StaleReason),
    UpToDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    pub name: ModuleName,
    pub output: PathBuf,
    pub action: ModuleAction,
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Final linked artifact, freshly linked or reused.
    pub artifact: PathBuf,
    /// Every visited module's artifact, dependencies before dependents, root last. This is the link input.
    pub outputs: Vec<PathBuf>,
    /// Per-module decisions, in visit order.
    pub modules: Vec<ModuleOutcome>,
    /// Whether the link step ran.
    pub linked: bool,
}

impl BuildOutcome {
    /// Names of the modules compiled in this run, in compile order.
    pub fn compiled(&self) -> impl Iterator<Item = &ModuleName> {
        self.modules
            .iter()
            .filter(|m| matches!(m.action, ModuleAction::Compiled(_)))
            .map(|m| &m.name)
    }

    pub fn compiled_count(&self) -> usize {
        self.compiled().count()
    }

    pub fn up_to_date_count(&self) -> usize {
        self.modules.len() - self.compiled_count()
    }

    /// True when nothing was compiled and the link was skipped.
    pub fn is_cache_hit(&self) -> bool {
        self.compiled_count() == 0 && !self.linked
    }

    /// One-line summary, e.g. `2 compiled, 3 up to date, linked scratch.exe`.
    pub fn summary(&self) -> String {
        let artifact = file_name(&self.artifact);
        let link = if self.linked {
            format!("linked {artifact}")
        } else {
            format!("{artifact} up to date")
        };
        format!(
            "{} compiled, {} up to date, {}",
            self.compiled_count(),
            self.up_to_date_count(),
            link
        )
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for module in &self.modules {
            let output = file_name(&module.output);
            match &module.action {
                ModuleAction::Compiled(reason) => writeln!(f, "compiled   {} -> {} ({})", module.name, output, reason)?,
                ModuleAction::UpToDate => writeln!(f, "up to date {} -> {}", module.name, output)?,
            }
        }
        write!(f, "{}", self.summary())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
