//! Incremental build orchestration
//!
//! The pipeline is:
//! 1. `modbuild_graph` walks the import graph from the root module, leaves first
//! 2. `staleness` decides per module whether the existing artifact is reusable
//! 3. stale modules are compiled through the `CompilerAdapter`, in walk order
//! 4. the final artifact is linked if anything was compiled or it is missing
//!
//! ## Module Organization
//!
//! - `orchestrator.rs` - Build driver and phase tracking
//! - `staleness.rs` - Missing artifact / timestamp / cascade rules
//! - `report.rs` - Per-module outcome and summary
//! - `error.rs` - Build error kinds and exit codes

pub mod error;
pub mod orchestrator;
pub mod report;
pub mod staleness;

pub use error::BuildError;
pub use orchestrator::{BuildOrchestrator, BuildPhase};
pub use report::{BuildOutcome, ModuleAction, ModuleOutcome};
pub use staleness::StaleReason;
