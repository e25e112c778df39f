//! Toolchain environment variables and their on-disk cache.
//!
//! Running the vendor setup script takes seconds, so the resulting variables are stored next to the build outputs
//! as `msvsenv_<spec>.json` and reused by later runs with the same host/target pair.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::arch::Arch;
use super::ToolchainError;

/// The environment a toolchain process must run with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolchainEnvironment {
    vars: BTreeMap<String, String>,
}

impl ToolchainEnvironment {
    pub fn new(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse the output of `set` that follows `marker`.
    ///
    /// Lines without `=` (script banners, blank lines) and keys starting with `=` (cmd's per-drive cwd entries) are
    /// skipped. If the marker is absent the whole text is parsed.
    pub fn parse_set_output(output: &str, marker: &str) -> Self {
        let body = output
            .find(marker)
            .map(|at| &output[at + marker.len()..])
            .unwrap_or(output);

        let vars = body
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()))
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Self { vars }
    }

    /// Load a cached environment.
    ///
    /// Returns `Ok(None)` when there is no cache file or it cannot be decoded; the caller rediscovers in both cases.
    pub fn load(path: &Path) -> Result<Option<Self>, ToolchainError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ToolchainError::Cache {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match serde_json::from_str(&text) {
            Ok(env) => Ok(Some(env)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable toolchain cache {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Write the environment to `path`.
    pub fn store(&self, path: &Path) -> Result<(), ToolchainError> {
        let text = serde_json::to_string(self).map_err(|source| ToolchainError::CacheFormat {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ToolchainError::Cache {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The `vcvarsall.bat` argument for a host/target pair: `x64`, or `x64_arm64` when cross-compiling.
pub fn env_spec(host: Arch, target: Arch) -> String {
    if host == target {
        target.to_string()
    } else {
        format!("{host}_{target}")
    }
}

/// Cache file for a host/target pair inside `output_dir`.
pub fn cache_path(output_dir: &Path, host: Arch, target: Arch) -> PathBuf {
    output_dir.join(format!("msvsenv_{}.json", env_spec(host, target)))
}
