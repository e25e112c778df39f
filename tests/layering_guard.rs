//! Layering guardrails to keep the graph crate independent of the build driver and the toolchain.
//!
//! `modbuild_graph` only names, resolves, scans and walks modules. It must not depend on the `modbuild` crate and
//! must never spawn processes; both belong behind the `CompilerAdapter` boundary.

use std::fs;
use std::path::Path;

#[test]
fn graph_crate_does_not_depend_on_driver() {
    let manifest = include_str!("../crates/modbuild_graph/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        let crate_name = line_no_comment.split('=').next().unwrap_or("").trim();
        if crate_name == "modbuild" {
            panic!("`modbuild_graph` must not depend on the `modbuild` driver crate");
        }
    }
}

#[test]
fn graph_crate_never_spawns_processes() {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("crates/modbuild_graph/src");
    for entry in fs::read_dir(&src).unwrap() {
        let path = entry.unwrap().path();
        let source = fs::read_to_string(&path).unwrap();
        assert!(
            !source.contains("std::process"),
            "{} uses std::process; tool invocations belong in the toolchain adapter",
            path.display()
        );
    }
}
