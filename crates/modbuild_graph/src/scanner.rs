//! Import directive scanning.
//!
//! A directive is the word `import` at the very start of a line, whitespace, then a module name that runs up to the
//! first `;`, carriage return or line feed:
//!
//! ```text
//! import BasicTypes;
//! import test.fixtures;
//! ```
//!
//! Anything else (`export import`, indented imports, `#include`) is not a directive.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::module::ModuleName;

static IMPORT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^import[ \t]+([^;\r\n]+)").expect("INVARIANT: import directive pattern is a valid regex")
});

/// Extracts the imports of a module's source file.
pub trait ImportScanner {
    /// Read `path` and return its imports in directive order.
    fn scan(&self, path: &Path) -> io::Result<Vec<ModuleName>>;
}

/// Scans source files on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImportScanner;

impl ImportScanner for FileImportScanner {
    fn scan(&self, path: &Path) -> io::Result<Vec<ModuleName>> {
        // Directives are ASCII; stray bytes elsewhere (legacy code pages in comments) must not fail the scan
        let bytes = fs::read(path)?;
        Ok(scan_source(&String::from_utf8_lossy(&bytes)))
    }
}

/// Return the imported module names of `source`, in the order the directives appear.
///
/// Duplicated directives are kept; the walker collapses repeated visits.
pub fn scan_source(source: &str) -> Vec<ModuleName> {
    IMPORT_DIRECTIVE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end())
        .filter(|name| !name.is_empty())
        .map(ModuleName::from)
        .collect()
}
