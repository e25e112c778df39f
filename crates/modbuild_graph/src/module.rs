//! Module identity and per-visit records.

use std::fmt;
use std::path::PathBuf;

/// Separator between namespace segments in a module name (`test.scanner`).
pub const NAMESPACE_SEPARATOR: char = '.';

/// A namespace-qualified module name, e.g. `Scanner` or `test.scanner`.
///
/// Names are opaque identity keys: two names are the same module iff their text is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dot-separated segments of the name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(NAMESPACE_SEPARATOR)
    }

    /// The leading namespace segment, if the name is qualified.
    ///
    /// `test.scanner` has namespace `test`; a bare `Scanner` has none.
    pub fn namespace(&self) -> Option<&str> {
        self.0
            .split_once(NAMESPACE_SEPARATOR)
            .map(|(namespace, _)| namespace)
    }

    /// True if the name is `namespace` itself or lives under it.
    pub fn is_in_namespace(&self, namespace: &str) -> bool {
        self.0 == namespace || self.namespace() == Some(namespace)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ModuleName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Everything known about one module during a single build run.
///
/// The walker fills in `name`, `filename`, `imports` and `is_root`. The build orchestrator attaches `output` and
/// `compiled` while the module is being visited; records are dropped when the run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub name: ModuleName,
    /// Resolved source file.
    pub filename: PathBuf,
    /// Direct imports, in the order the directives appear in the source.
    pub imports: Vec<ModuleName>,
    /// Artifact path, once the orchestrator has assigned one.
    pub output: Option<PathBuf>,
    /// Whether the module was (re)compiled in this run.
    pub compiled: bool,
    /// Whether this is the root module the walk started from.
    pub is_root: bool,
}

impl ModuleRecord {
    pub fn new(name: ModuleName, filename: PathBuf, imports: Vec<ModuleName>) -> Self {
        Self {
            name,
            filename,
            imports,
            output: None,
            compiled: false,
            is_root: false,
        }
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }
}
