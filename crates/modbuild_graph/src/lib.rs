//! Module import graph for `modbuild`: names, resolution, import scanning and traversal.
//!
//! This crate knows nothing about compilers. It turns a root module name into a dependency-ordered stream of
//! [`ModuleRecord`]s, which the build orchestrator in the `modbuild` crate consumes.
//!
//! ## Notes
//! - Resolution and scanning sit behind traits ([`ModuleResolver`], [`ImportScanner`]) so the walker can run against
//!   in-memory graphs in tests.
//! - The walker uses an explicit stack; import chain depth is bounded by memory, not by the thread stack.
//!
//! ## Examples
//! ```rust,no_run
//! use modbuild_graph::{DependencyWalker, FileImportScanner, GraphError, ModuleName, SourceLayout};
//!
//! let layout = SourceLayout::new("src", "test");
//! let scanner = FileImportScanner;
//! let mut walker = DependencyWalker::new(&layout, &scanner);
//! walker
//!     .walk(&ModuleName::new("scratch"), |record| {
//!         println!("{} ({} imports)", record.name, record.imports.len());
//!         Ok::<(), GraphError>(())
//!     })
//!     .unwrap();
//! ```

pub mod error;
pub mod module;
pub mod resolver;
pub mod scanner;
pub mod walker;

pub use error::GraphError;
pub use module::{ModuleName, ModuleRecord};
pub use resolver::{ModuleResolver, Resolution, SourceLayout, STD_NAMESPACE, TEST_NAMESPACE};
pub use scanner::{FileImportScanner, ImportScanner, scan_source};
pub use walker::{DependencyWalker, VisitState};
