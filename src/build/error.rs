//! Build failures.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use modbuild_graph::{GraphError, ModuleName};
use thiserror::Error;

use crate::toolchain::ToolchainError;

/// Everything that can stop a build. All of these end the run; none is retried.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// Resolution or cycle error while walking the module graph.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    /// The toolchain could not be located or initialized. Raised before any module work.
    #[error("toolchain unavailable")]
    #[diagnostic(code(modbuild::toolchain_discovery))]
    ToolchainDiscovery(#[source] ToolchainError),

    /// The compiler ran and reported failure for `module`.
    #[error("failed to compile module `{module}` (status {status})")]
    #[diagnostic(code(modbuild::compile))]
    Compile {
        module: ModuleName,
        status: i32,
        output: String,
    },

    /// The linker ran and reported failure.
    #[error("failed to link {} (status {status})", .artifact.display())]
    #[diagnostic(code(modbuild::link))]
    Link { artifact: PathBuf, status: i32, output: String },

    /// A tool could not be run at all.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Toolchain(#[from] ToolchainError),

    /// The root module produced nothing to link (e.g. it lives in the `std` namespace).
    #[error("module `{root}` has nothing to build")]
    #[diagnostic(code(modbuild::empty), help("the root module must be a source module, not a toolchain-provided one"))]
    NothingToBuild { root: ModuleName },

    #[error("I/O error on {}", .path.display())]
    #[diagnostic(code(modbuild::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Process exit code for this failure: the tool's own status for compile and link failures, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Compile { status, .. } | BuildError::Link { status, .. } if *status != 0 => *status,
            _ => 1,
        }
    }

    /// Captured tool output, for compile and link failures.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            BuildError::Compile { output, .. } | BuildError::Link { output, .. } => Some(output),
            _ => None,
        }
    }
}
