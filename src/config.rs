//! Build configuration
//!
//! Directory names follow the usual project shape: sources in `src/`, test modules in `test/`, artifacts in
//! `build/`, all relative to the project root unless given as absolute paths.

use std::path::{Path, PathBuf};

use modbuild_graph::SourceLayout;
use modbuild_graph::resolver::DEFAULT_EXTENSION;

use crate::toolchain::Arch;

/// Build configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directory the other paths are relative to
    pub project_root: PathBuf,
    /// Root of the default module namespace
    pub source_dir: PathBuf,
    /// Root of the `test` module namespace
    pub test_dir: PathBuf,
    /// Where artifacts and the toolchain cache go
    pub output_dir: PathBuf,
    /// Source file extension, without the dot
    pub extension: String,
    /// Target architecture; `None` builds for the host
    pub target: Option<Arch>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            source_dir: PathBuf::from("src"),
            test_dir: PathBuf::from("test"),
            output_dir: PathBuf::from("build"),
            extension: DEFAULT_EXTENSION.to_string(),
            target: None,
        }
    }
}

impl BuildConfig {
    /// Default layout rooted at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    pub fn with_test_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_target(mut self, target: Option<Arch>) -> Self {
        self.target = target;
        self
    }

    /// Module resolver for this configuration.
    pub fn layout(&self) -> SourceLayout {
        SourceLayout::new(self.under_root(&self.source_dir), self.under_root(&self.test_dir))
            .with_extension(self.extension.clone())
    }

    /// Absolute-or-root-relative output directory.
    pub fn output_path(&self) -> PathBuf {
        self.under_root(&self.output_dir)
    }

    fn under_root(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}
