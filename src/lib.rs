#![forbid(unsafe_code)]
//! modbuild: incremental build tool for C++ modules
//!
//! Given a root module, modbuild discovers its transitive imports by scanning `import` lines, compiles the modules
//! dependencies-first, recompiles only what is stale, and links the result through a pluggable native toolchain.
//!
//! - `modbuild_graph` (workspace crate): module names, resolution, import scanning, graph walking
//! - [`build`]: staleness rules and the build orchestrator
//! - [`toolchain`]: the [`toolchain::CompilerAdapter`] boundary and the MSVC adapter
//! - [`cli`]: the `modbuild` command line
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod build;
pub mod cli;
pub mod config;
pub mod toolchain;
pub mod version;

pub use build::{BuildError, BuildOrchestrator, BuildOutcome, BuildPhase};
pub use config::BuildConfig;
pub use toolchain::{Arch, CompilerAdapter, MsvcCompiler, ToolOutput, ToolchainError};

pub use modbuild_graph as graph;
