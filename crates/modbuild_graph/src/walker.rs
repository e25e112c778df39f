//! Dependency-ordered traversal of the module graph.
//!
//! The walker is a depth-first search with explicit per-module state:
//!
//! - `Visited` modules are skipped, so a module imported along several paths (a diamond) is visited once.
//! - Re-entering a `Visiting` module means the module is still on the DFS stack: that is a cycle.
//!
//! The DFS stack is a `Vec` of frames rather than the call stack, so a long chain of imports cannot overflow the
//! thread stack.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::module::{ModuleName, ModuleRecord};
use crate::resolver::{ModuleResolver, Resolution};
use crate::scanner::ImportScanner;

/// Per-module traversal state within one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitState {
    #[default]
    Unvisited,
    Visiting,
    Visited,
}

/// A module whose imports are being visited.
struct Frame {
    record: ModuleRecord,
    next_import: usize,
}

/// Walks the import graph from a root module, emitting records leaves-first.
///
/// A walker owns the visitation map of a single build run. After a walk fails the map is left mid-traversal; start
/// a new walker for the next run.
pub struct DependencyWalker<'a> {
    resolver: &'a dyn ModuleResolver,
    scanner: &'a dyn ImportScanner,
    states: HashMap<ModuleName, VisitState>,
}

impl<'a> DependencyWalker<'a> {
    pub fn new(resolver: &'a dyn ModuleResolver, scanner: &'a dyn ImportScanner) -> Self {
        Self {
            resolver,
            scanner,
            states: HashMap::new(),
        }
    }

    /// Current state of `name` in this walk.
    pub fn state(&self, name: &ModuleName) -> VisitState {
        self.states.get(name).copied().unwrap_or_default()
    }

    /// Visit every module reachable from `root`.
    ///
    /// `visit` is called exactly once per reachable module, after it has been called for all of that module's
    /// imports. Modules in the `std` namespace are never resolved, scanned, or passed to `visit`.
    ///
    /// ## Errors
    ///
    /// - [`GraphError::Resolution`] if a module's source file does not exist
    /// - [`GraphError::Cycle`] if an import chain leads back to a module still being visited
    /// - any error returned by `visit`, which stops the walk immediately
    #[tracing::instrument(skip_all, fields(root = %root))]
    pub fn walk<E, F>(&mut self, root: &ModuleName, mut visit: F) -> Result<(), E>
    where
        F: FnMut(ModuleRecord) -> Result<(), E>,
        E: From<GraphError>,
    {
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.enter(root, true, &stack)? {
            stack.push(frame);
        }

        while let Some(mut frame) = stack.pop() {
            if let Some(import) = frame.record.imports.get(frame.next_import).cloned() {
                frame.next_import += 1;
                stack.push(frame);
                if let Some(child) = self.enter(&import, false, &stack)? {
                    stack.push(child);
                }
                continue;
            }

            let name = frame.record.name.clone();
            visit(frame.record)?;
            self.states.insert(name, VisitState::Visited);
        }

        Ok(())
    }

    /// Start visiting `name`. Returns `None` when there is nothing to descend into.
    fn enter(&mut self, name: &ModuleName, is_root: bool, stack: &[Frame]) -> Result<Option<Frame>, GraphError> {
        match self.state(name) {
            VisitState::Visited => return Ok(None),
            VisitState::Visiting => {
                return Err(GraphError::Cycle {
                    module: name.clone(),
                    chain: cycle_chain(name, stack),
                });
            }
            VisitState::Unvisited => {}
        }

        self.states.insert(name.clone(), VisitState::Visiting);

        let path = match self.resolver.resolve(name) {
            Resolution::External => {
                tracing::debug!(module = %name, "external module, not resolved");
                self.states.insert(name.clone(), VisitState::Visited);
                return Ok(None);
            }
            Resolution::File(path) => path,
        };

        let imports = self
            .scanner
            .scan(&path)
            .map_err(|e| GraphError::from_read(name.clone(), path.clone(), e))?;
        tracing::debug!(module = %name, file = %path.display(), imports = imports.len(), "scanned module");

        Ok(Some(Frame {
            record: ModuleRecord::new(name.clone(), path, imports).with_root(is_root),
            next_import: 0,
        }))
    }
}

/// The import chain from the first occurrence of `name` on the stack back to `name` itself.
fn cycle_chain(name: &ModuleName, stack: &[Frame]) -> Vec<ModuleName> {
    let start = stack
        .iter()
        .position(|frame| &frame.record.name == name)
        .unwrap_or(0);
    stack[start..]
        .iter()
        .map(|frame| frame.record.name.clone())
        .chain(std::iter::once(name.clone()))
        .collect()
}
