//! Microsoft Visual C++ adapter
//!
//! Locates the newest Visual Studio installation, captures the environment its `vcvarsall.bat` sets up for the
//! requested host/target pair, then runs `cl` and `link` with that environment from inside the output directory.
//! `cl` writes module interface files (`.ifc`) to its working directory and finds them there when later modules
//! import them.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use modbuild_graph::{ModuleName, ModuleRecord};

use super::arch::Arch;
use super::env_cache::{self, ToolchainEnvironment};
use super::{CompilerAdapter, ToolOutput, ToolchainError};

/// Printed between the setup script's banner and the `set` dump.
const ENV_MARKER: &str = "__MSVS_ENV_VARS__";

const VCVARSALL: &str = "VC/Auxiliary/Build/vcvarsall.bat";

const DEFAULT_CL_FLAGS: &[&str] = &["/std:c++latest", "/EHsc", "/nologo", "/experimental:module"];

/// [`CompilerAdapter`] for `cl.exe` / `link.exe`.
#[derive(Debug, Default)]
pub struct MsvcCompiler {
    output_dir: PathBuf,
    environment: Option<ToolchainEnvironment>,
    /// Overrides `%ProgramFiles(x86)%` when searching for Visual Studio.
    install_root: Option<PathBuf>,
    extra_flags: Vec<String>,
}

impl MsvcCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for Visual Studio under `root` instead of `%ProgramFiles(x86)%`.
    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = Some(root.into());
        self
    }

    /// Extra flags passed to every `cl` invocation.
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_flags.extend(flags.into_iter().map(Into::into));
        self
    }

    pub fn environment(&self) -> Option<&ToolchainEnvironment> {
        self.environment.as_ref()
    }

    fn install_root(&self) -> Result<PathBuf, ToolchainError> {
        if let Some(root) = &self.install_root {
            return Ok(root.clone());
        }
        env::var_os("ProgramFiles(x86)")
            .map(PathBuf::from)
            .ok_or_else(|| ToolchainError::Discovery("unable to find the \"Program Files (x86)\" directory".into()))
    }

    /// Run `vcvarsall.bat` and capture the environment it produces.
    fn discover_environment(&self, host: Arch, target: Arch) -> Result<ToolchainEnvironment, ToolchainError> {
        let script = find_vcvarsall(&self.install_root()?)?;
        let spec = env_cache::env_spec(host, target);
        tracing::info!("Discovering MSVC environment ({}) via {}", spec, script.display());

        let line = format!("\"{}\" {} & echo {} & set", script.display(), spec, ENV_MARKER);
        let output = shell(&line).output().map_err(|source| ToolchainError::Spawn {
            tool: "vcvarsall.bat".into(),
            source,
        })?;
        let output = ToolOutput::from(output);
        if !output.is_success() {
            return Err(ToolchainError::Discovery(format!(
                "vcvarsall.bat {} exited with status {}: {}",
                spec,
                output.status,
                output.combined()
            )));
        }

        let environment = ToolchainEnvironment::parse_set_output(&output.stdout, ENV_MARKER);
        if environment.is_empty() {
            return Err(ToolchainError::Discovery(
                "vcvarsall.bat did not report any environment variables".into(),
            ));
        }
        Ok(environment)
    }

    fn cl_args(&self, module: &ModuleRecord, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = DEFAULT_CL_FLAGS.iter().map(|f| f.to_string()).collect();
        args.extend(self.extra_flags.iter().cloned());
        args.push("/c".into());
        args.push(format!("/Fo{}", output.display()));
        args.push("/module:interface".into());
        args.push(module.filename.display().to_string());
        args
    }

    fn run(&self, tool: &str, args: &[String]) -> Result<ToolOutput, ToolchainError> {
        let environment = self.environment.as_ref().ok_or(ToolchainError::NotInitialized)?;
        tracing::debug!("{} {}", tool, args.join(" "));

        let output = Command::new(tool)
            .args(args)
            .current_dir(&self.output_dir)
            .env_clear()
            .envs(environment.vars())
            .output()
            .map_err(|source| ToolchainError::Spawn {
                tool: tool.to_string(),
                source,
            })?;
        Ok(ToolOutput::from(output))
    }
}

impl CompilerAdapter for MsvcCompiler {
    fn initialize(&mut self, output_dir: &Path, host: Arch, target: Arch) -> Result<(), ToolchainError> {
        self.output_dir = output_dir.to_path_buf();
        if self.environment.is_some() {
            return Ok(());
        }

        let cache = env_cache::cache_path(output_dir, host, target);
        let environment = match ToolchainEnvironment::load(&cache)? {
            Some(environment) => {
                tracing::debug!("Using cached MSVC environment {}", cache.display());
                environment
            }
            None => {
                let environment = self.discover_environment(host, target)?;
                environment.store(&cache)?;
                environment
            }
        };
        self.environment = Some(environment);
        Ok(())
    }

    fn module_output_file(&self, name: &ModuleName) -> PathBuf {
        PathBuf::from(format!("{name}.obj"))
    }

    fn link_output_file(&self, name: &ModuleName) -> PathBuf {
        PathBuf::from(format!("{name}.exe"))
    }

    fn compile_module(&mut self, module: &ModuleRecord) -> Result<ToolOutput, ToolchainError> {
        let output = module
            .output
            .clone()
            .unwrap_or_else(|| self.output_dir.join(self.module_output_file(&module.name)));
        let args = self.cl_args(module, &output);
        self.run("cl", &args)
    }

    fn link(&mut self, outputs: &[PathBuf], artifact: &Path) -> Result<ToolOutput, ToolchainError> {
        let mut args = vec!["/nologo".to_string(), format!("/OUT:{}", artifact.display())];
        args.extend(outputs.iter().map(|p| p.display().to_string()));
        self.run("link", &args)
    }

    fn host_architecture(&self) -> Result<Arch, ToolchainError> {
        Arch::host().ok_or(ToolchainError::UnknownHost)
    }
}

/// Find `vcvarsall.bat` in the newest Visual Studio version under `install_root`.
///
/// Versions are directories like `2019`, `2022` or `Preview`; within the newest one, the first edition
/// (`Community`, `Professional`, `BuildTools`, ...) that ships the script wins.
pub fn find_vcvarsall(install_root: &Path) -> Result<PathBuf, ToolchainError> {
    let vs_root = install_root.join("Microsoft Visual Studio");
    let mut versions: Vec<String> = list_dir(&vs_root)?
        .into_iter()
        .filter(|name| name.chars().any(|c| c.is_ascii_digit()) || name == "Preview")
        .collect();
    versions.sort();

    let Some(version) = versions.pop() else {
        return Err(ToolchainError::Discovery(format!(
            "no Visual Studio version directories in {}",
            vs_root.display()
        )));
    };

    let version_dir = vs_root.join(&version);
    let mut editions = list_dir(&version_dir)?;
    editions.sort();
    editions
        .iter()
        .map(|edition| version_dir.join(edition).join(VCVARSALL))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            ToolchainError::Discovery(format!("cannot find a Visual Studio {version} installation with vcvarsall.bat"))
        })
}

fn list_dir(dir: &Path) -> Result<Vec<String>, ToolchainError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ToolchainError::Discovery(format!("cannot read {}: {}", dir.display(), e)))?;
    Ok(entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect())
}

#[cfg(windows)]
fn shell(line: &str) -> Command {
    use std::os::windows::process::CommandExt;
    let mut command = Command::new("cmd");
    command.args(["/d", "/s", "/c"]).raw_arg(format!("\"{line}\""));
    command
}

#[cfg(not(windows))]
fn shell(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}
