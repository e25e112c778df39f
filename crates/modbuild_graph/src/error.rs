//! Errors raised while discovering the module graph.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::module::ModuleName;

/// Structural failures of a walk. None of these are recoverable: the walk stops at the first one.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// The module name maps to a source file that does not exist.
    #[error("cannot resolve module `{module}`: {} does not exist", .path.display())]
    #[diagnostic(
        code(modbuild::resolve),
        help("check the spelling of the import and the configured source/test directories")
    )]
    Resolution { module: ModuleName, path: PathBuf },

    /// An import chain re-entered a module that is still being resolved.
    ///
    /// `chain` starts and ends with `module`.
    #[error("module cycle detected at `{module}`: {}", format_chain(.chain))]
    #[diagnostic(code(modbuild::cycle), help("modules cannot import each other, directly or indirectly"))]
    Cycle { module: ModuleName, chain: Vec<ModuleName> },

    /// The source file exists but could not be read.
    #[error("failed to read {} for module `{module}`", .path.display())]
    #[diagnostic(code(modbuild::io))]
    Io {
        module: ModuleName,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GraphError {
    /// Classify a read failure: a missing file is a resolution error, anything else is I/O.
    pub fn from_read(module: ModuleName, path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            GraphError::Resolution { module, path }
        } else {
            GraphError::Io { module, path, source }
        }
    }

    /// The module the error is about.
    pub fn module(&self) -> &ModuleName {
        match self {
            GraphError::Resolution { module, .. } | GraphError::Cycle { module, .. } | GraphError::Io { module, .. } => {
                module
            }
        }
    }
}

fn format_chain(chain: &[ModuleName]) -> String {
    chain.iter().map(ModuleName::as_str).collect::<Vec<_>>().join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_resolution_error() {
        let err = GraphError::from_read(
            "Token".into(),
            PathBuf::from("src/Token.cpp"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, GraphError::Resolution { .. }));
        assert_eq!(err.module().as_str(), "Token");
    }

    #[test]
    fn test_other_read_failures_stay_io() {
        let err = GraphError::from_read(
            "Token".into(),
            PathBuf::from("src/Token.cpp"),
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, GraphError::Io { .. }));
    }

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = GraphError::Cycle {
            module: "A".into(),
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "module cycle detected at `A`: A -> B -> A");
    }
}
