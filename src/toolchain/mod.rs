//! Native toolchain boundary
//!
//! The build orchestrator never runs a compiler itself. Everything toolchain-specific (flags, environment
//! discovery, artifact naming) sits behind the [`CompilerAdapter`] trait.
//!
//! ## Modules
//!
//! - `arch` - Host/target architecture tokens
//! - `env_cache` - Toolchain environment variables, cached on disk per host/target pair
//! - `msvc` - Microsoft Visual C++ adapter

pub mod arch;
pub mod env_cache;
pub mod msvc;

use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;

use miette::Diagnostic;
use modbuild_graph::{ModuleName, ModuleRecord};
use thiserror::Error;

pub use arch::Arch;
pub use env_cache::ToolchainEnvironment;
pub use msvc::MsvcCompiler;

/// Errors raised by a toolchain adapter itself (as opposed to a tool reporting a failed compile).
#[derive(Debug, Error, Diagnostic)]
pub enum ToolchainError {
    #[error("toolchain discovery failed: {0}")]
    #[diagnostic(code(modbuild::toolchain::discovery))]
    Discovery(String),

    #[error("unable to determine host processor architecture")]
    #[diagnostic(code(modbuild::toolchain::host), help("pass --target explicitly"))]
    UnknownHost,

    #[error("toolchain used before initialize()")]
    #[diagnostic(code(modbuild::toolchain::uninitialized))]
    NotInitialized,

    #[error("failed to launch `{tool}`")]
    #[diagnostic(code(modbuild::toolchain::spawn), help("is the toolchain installed and on PATH?"))]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot access toolchain environment cache {}", .path.display())]
    #[diagnostic(code(modbuild::toolchain::cache))]
    Cache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode toolchain environment cache {}", .path.display())]
    #[diagnostic(code(modbuild::toolchain::cache))]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Exit status and captured output of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// A zero-status result with no output.
    pub fn success() -> Self {
        Self::default()
    }

    /// A failed result with the given status and message on stdout.
    pub fn failure(status: i32, stdout: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Stdout followed by stderr, trimmed, for error reports.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        text
    }
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        Self {
            // Terminated by a signal: no code, but still a failure
            status: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Capabilities the build orchestrator needs from a native toolchain.
///
/// All calls are blocking. A non-zero [`ToolOutput::status`] from `compile_module` or `link` is a hard failure; an
/// `Err` means the tool could not be run at all.
pub trait CompilerAdapter {
    /// One-time setup before any module work. May perform expensive environment discovery, which implementations
    /// cache under `output_dir` keyed by `(host, target)`.
    fn initialize(&mut self, output_dir: &Path, host: Arch, target: Arch) -> Result<(), ToolchainError>;

    /// Artifact file name for a compiled module, relative to the output directory.
    fn module_output_file(&self, name: &ModuleName) -> PathBuf;

    /// File name of the final linked artifact for the root module, relative to the output directory.
    fn link_output_file(&self, name: &ModuleName) -> PathBuf;

    /// Compile one module. `module.output` holds the artifact path to produce.
    fn compile_module(&mut self, module: &ModuleRecord) -> Result<ToolOutput, ToolchainError>;

    /// Link `outputs` (dependencies before dependents, root last) into `artifact`.
    fn link(&mut self, outputs: &[PathBuf], artifact: &Path) -> Result<ToolOutput, ToolchainError>;

    /// Architecture of the machine running the toolchain.
    fn host_architecture(&self) -> Result<Arch, ToolchainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_failure_status() {
        assert!(ToolOutput::success().is_success());
        assert!(!ToolOutput::failure(2, "boom").is_success());
    }

    #[test]
    fn test_combined_output_joins_streams() {
        let output = ToolOutput {
            status: 2,
            stdout: "Token.cpp\n".to_string(),
            stderr: "error C2065: undeclared identifier\n".to_string(),
        };
        assert_eq!(output.combined(), "Token.cpp\nerror C2065: undeclared identifier");
    }

    #[test]
    fn test_combined_output_without_stderr() {
        assert_eq!(ToolOutput::failure(1, "only stdout\n").combined(), "only stdout");
    }
}
