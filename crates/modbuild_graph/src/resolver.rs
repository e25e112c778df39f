//! Module name → source file mapping.
//!
//! Resolution is pure: it never touches the file system. A path that does not exist is reported when the scanner
//! tries to read it (see [`GraphError::from_read`](crate::GraphError::from_read)).

use std::path::{Path, PathBuf};

use crate::module::ModuleName;

/// Namespace supplied by the toolchain itself (`import std.core;`). Never resolved to a file.
pub const STD_NAMESPACE: &str = "std";

/// Namespace whose modules live under the test root instead of the source root.
pub const TEST_NAMESPACE: &str = "test";

/// Source file extension used when none is configured.
pub const DEFAULT_EXTENSION: &str = "cpp";

/// Where a module's source lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A source file on disk (which may or may not exist).
    File(PathBuf),
    /// Provided by the toolchain; no file, no import scan, no compile.
    External,
}

/// Maps module names to source locations.
pub trait ModuleResolver {
    fn resolve(&self, name: &ModuleName) -> Resolution;
}

/// The standard project layout: `src/` for modules, `test/` for the `test` namespace.
///
/// `Lexer.Scanner` resolves to `<source_root>/Lexer/Scanner.cpp` and `test.scanner` to `<test_root>/scanner.cpp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    source_root: PathBuf,
    test_root: PathBuf,
    extension: String,
}

impl SourceLayout {
    pub fn new(source_root: impl Into<PathBuf>, test_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            test_root: test_root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different source extension (without the leading dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn test_root(&self) -> &Path {
        &self.test_root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn file_under<'a>(&self, root: &Path, segments: impl Iterator<Item = &'a str>) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in segments {
            path.push(segment);
        }
        path.set_extension(&self.extension);
        path
    }
}

impl ModuleResolver for SourceLayout {
    fn resolve(&self, name: &ModuleName) -> Resolution {
        if name.is_in_namespace(STD_NAMESPACE) {
            return Resolution::External;
        }

        match name.namespace() {
            Some(TEST_NAMESPACE) => Resolution::File(self.file_under(&self.test_root, name.segments().skip(1))),
            _ => Resolution::File(self.file_under(&self.source_root, name.segments())),
        }
    }
}
