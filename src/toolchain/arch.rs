//! Processor architecture tokens used to select toolchain environments.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;

/// A host or target architecture, spelled the way `vcvarsall.bat` expects (`x86`, `x64`, `arm64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X64,
    Arm64,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }

    /// Detect the host architecture.
    ///
    /// Windows reports it through `PROCESSOR_ARCHITECTURE` (or `PROCESSOR_ARCHITEW6432` under WOW64). Elsewhere the
    /// architecture this binary was built for is used.
    pub fn host() -> Option<Arch> {
        from_processor_env(env::vars_os()).or_else(|| env::consts::ARCH.parse().ok())
    }
}

/// Read the architecture from the first `PROCESSOR_ARCH*` variable. `AMD64` is x64, `ARM64` is arm64, anything else
/// is treated as x86.
///
/// Entries that are not valid Unicode are skipped.
pub fn from_processor_env(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Option<Arch> {
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .find(|(key, _)| key.to_ascii_uppercase().starts_with("PROCESSOR_ARCH"))
        .map(|(_, value)| match value.to_ascii_uppercase().as_str() {
            "AMD64" => Arch::X64,
            "ARM64" => Arch::Arm64,
            _ => Arch::X86,
        })
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i386" | "i686" | "win32" => Ok(Arch::X86),
            "x64" | "amd64" | "x86_64" => Ok(Arch::X64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            other => Err(format!("unknown architecture `{other}` (expected x86, x64 or arm64)")),
        }
    }
}
