//! CLI module for modbuild
//!
//! ## Commands
//!
//! - `build <MAIN>` - Incrementally compile a module and everything it imports, then link
//! - `run <MAIN>` - Build, then execute the linked program
//! - `graph <MAIN>` - Print the module graph in build order (no toolchain needed)
//! - `clean` - Empty the output directory
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::build::BuildError;
use crate::config::BuildConfig;
use crate::toolchain::Arch;
use crate::version::MODBUILD_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an error with a custom exit code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl From<BuildError> for CliError {
    /// Tool output first (it is what the user needs to read), then the rendered diagnostic.
    fn from(err: BuildError) -> Self {
        let code = err.exit_code();
        let mut message = String::new();
        if let Some(output) = err.tool_output().filter(|o| !o.is_empty()) {
            message.push_str(output);
            message.push('\n');
        }
        message.push_str(&format!("{:?}", miette::Report::new(err)));
        Self::with_code(message.trim_end(), code)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Incremental build tool for C++ modules
#[derive(Parser, Debug)]
#[command(name = "modbuild")]
#[command(version = MODBUILD_VERSION)]
#[command(about = "Incremental, dependency-ordered build tool for C++ modules", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log staleness decisions and tool invocations
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a module and everything it imports, then link
    Build {
        #[command(flatten)]
        project: ProjectArgs,
        /// Run the linked program after a successful build
        #[arg(short, long)]
        run: bool,
    },

    /// Build, then run the linked program
    Run {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Print modules in build order with their imports
    Graph {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Empty the output directory
    Clean {
        /// Output directory to clear
        #[arg(long, value_name = "DIR", env = "MODBUILD_OUT_DIR", default_value = "build")]
        out_dir: PathBuf,
    },
}

/// Project layout flags shared by `build`, `run` and `graph`.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Root module name, e.g. `scratch` or `test.lexer`
    #[arg(value_name = "MAIN")]
    pub main: Option<String>,

    /// Directory holding the default module namespace
    #[arg(long, value_name = "DIR", env = "MODBUILD_SRC_DIR", default_value = "src")]
    pub src_dir: PathBuf,

    /// Directory holding the `test` module namespace
    #[arg(long, value_name = "DIR", default_value = "test")]
    pub test_dir: PathBuf,

    /// Where compiled artifacts go
    #[arg(long, value_name = "DIR", env = "MODBUILD_OUT_DIR", default_value = "build")]
    pub out_dir: PathBuf,

    /// Target architecture (x86, x64, arm64); defaults to the host
    #[arg(long, value_name = "ARCH", env = "MODBUILD_TARGET")]
    pub target: Option<Arch>,

    /// Extra compiler flag, passed to every module compile (repeatable)
    #[arg(long = "cl-flag", value_name = "FLAG", allow_hyphen_values = true)]
    pub cl_flags: Vec<String>,
}

impl ProjectArgs {
    /// The root module, or a usage error when none was given.
    pub fn main_module(&self) -> CliResult<&str> {
        self.main
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| CliError::failure("No main module specified"))
    }

    /// Build configuration rooted at the current directory.
    pub fn config(&self) -> BuildConfig {
        BuildConfig::new(".")
            .with_source_dir(&self.src_dir)
            .with_test_dir(&self.test_dir)
            .with_output_dir(&self.out_dir)
            .with_target(self.target)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run(cli: Cli) {
    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Build { project, run } => commands::build_module(&project, run),
        Command::Run { project } => commands::build_module(&project, true),
        Command::Graph { project } => commands::print_graph(&project),
        Command::Clean { out_dir } => commands::clean(&out_dir),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_cli_parse_build() {
        let cli = Cli::try_parse_from(["modbuild", "build", "scratch"]).unwrap();
        if let Command::Build { project, run } = cli.command {
            assert_eq!(project.main.as_deref(), Some("scratch"));
            assert_eq!(project.out_dir, PathBuf::from("build"));
            assert!(!run);
        } else {
            panic!("Expected Build command");
        }
    }

    #[test]
    fn test_cli_parse_build_run_short_flag() {
        let cli = Cli::try_parse_from(["modbuild", "build", "-r", "test.lexer"]).unwrap();
        if let Command::Build { project, run } = cli.command {
            assert!(run);
            assert_eq!(project.main.as_deref(), Some("test.lexer"));
        } else {
            panic!("Expected Build command");
        }
    }

    #[test]
    fn test_cli_parse_layout_flags() {
        let cli = Cli::try_parse_from([
            "modbuild",
            "graph",
            "scratch",
            "--src-dir",
            "modules",
            "--test-dir",
            "tests/cpp",
            "--out-dir",
            "out",
            "--target",
            "amd64",
        ])
        .unwrap();
        let Command::Graph { project } = cli.command else {
            panic!("Expected Graph command");
        };
        assert_eq!(project.target, Some(Arch::X64));
        let config = project.config();
        assert_eq!(config.layout().source_root(), Path::new("./modules"));
        assert_eq!(config.layout().test_root(), Path::new("./tests/cpp"));
        assert_eq!(config.output_path(), PathBuf::from("./out"));
    }

    #[test]
    fn test_cli_parse_repeated_cl_flags() {
        let cli = Cli::try_parse_from(["modbuild", "build", "scratch", "--cl-flag", "/W4", "--cl-flag", "-DTRACE=1"])
            .unwrap();
        let Command::Build { project, .. } = cli.command else {
            panic!("Expected Build command");
        };
        assert_eq!(project.cl_flags, vec!["/W4", "-DTRACE=1"]);
    }

    #[test]
    fn test_cli_rejects_unknown_target() {
        assert!(Cli::try_parse_from(["modbuild", "build", "scratch", "--target", "sparc"]).is_err());
    }

    #[test]
    fn test_cli_parse_global_verbose() {
        let cli = Cli::try_parse_from(["modbuild", "run", "scratch", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Run { .. }));
    }

    #[test]
    fn test_cli_parse_clean() {
        let cli = Cli::try_parse_from(["modbuild", "clean", "--out-dir", "out"]).unwrap();
        if let Command::Clean { out_dir } = cli.command {
            assert_eq!(out_dir, PathBuf::from("out"));
        } else {
            panic!("Expected Clean command");
        }
    }

    #[test]
    fn test_missing_main_module_is_failure() {
        let cli = Cli::try_parse_from(["modbuild", "build"]).unwrap();
        let Command::Build { project, .. } = cli.command else {
            panic!("Expected Build command");
        };
        let err = project.main_module().unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert_eq!(err.message, "No main module specified");
    }

    #[test]
    fn test_compile_error_keeps_tool_status_and_output() {
        let err = CliError::from(BuildError::Compile {
            module: "Token".into(),
            status: 2,
            output: "Token.cpp(3): error C2143: syntax error".into(),
        });
        assert_eq!(err.exit_code, ExitCode(2));
        assert!(err.message.starts_with("Token.cpp(3): error C2143: syntax error\n"));
        assert!(err.message.contains("failed to compile module `Token`"));
    }
}
