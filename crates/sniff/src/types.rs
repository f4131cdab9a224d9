//! Shared classification types.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating systems a candidate can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
        }
    }

    /// Whether executables for this OS rely on mode bits to run.
    pub fn is_unix(self) -> bool {
        matches!(self, Os::Linux | Os::Darwin)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized OS or architecture names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseOsArchError {
    #[error("unknown operating system: {0}")]
    Os(String),

    #[error("unknown architecture: {0}")]
    Arch(String),
}

impl FromStr for Os {
    type Err = ParseOsArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "darwin" | "macos" | "osx" => Ok(Os::Darwin),
            "windows" => Ok(Os::Windows),
            _ => Err(ParseOsArchError::Os(s.to_string())),
        }
    }
}

/// CPU architectures, named the way Go names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "386")]
    X86,
    #[serde(rename = "amd64")]
    Amd64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86 => "386",
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = ParseOsArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "386" | "x86" | "i386" | "i686" => Ok(Arch::X86),
            "amd64" | "x86_64" | "x64" => Ok(Arch::Amd64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            _ => Err(ParseOsArchError::Arch(s.to_string())),
        }
    }
}

/// Structural category of a launch candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flavor {
    /// ELF, PE or Mach-O executable.
    Native,
    /// Shebang script or Windows batch file.
    Script,
    /// macOS `.app` directory.
    AppBundle,
    /// Runtime-loadable archive (jar).
    Archive,
    /// HTML entry point for browser-run content.
    Markup,
}

impl Flavor {
    /// Whether candidates of this flavor are executed directly.
    pub fn is_executed_directly(self) -> bool {
        matches!(self, Flavor::Native | Flavor::Script | Flavor::AppBundle)
    }
}

/// PE-specific details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsInfo {
    /// GUI subsystem (as opposed to console).
    pub gui: bool,
}

/// Result of sniffing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniffed {
    pub flavor: Flavor,
    /// OSes the file is valid for; empty means any.
    pub os: BTreeSet<Os>,
    /// Architectures embedded in the file; empty means agnostic.
    pub arch: BTreeSet<Arch>,
    pub windows: Option<WindowsInfo>,
}

impl Sniffed {
    pub(crate) fn native(os: Os, arch: impl IntoIterator<Item = Arch>) -> Self {
        Self {
            flavor: Flavor::Native,
            os: BTreeSet::from([os]),
            arch: arch.into_iter().collect(),
            windows: None,
        }
    }

    pub(crate) fn agnostic(flavor: Flavor, os: &[Os]) -> Self {
        Self {
            flavor,
            os: os.iter().copied().collect(),
            arch: BTreeSet::new(),
            windows: None,
        }
    }

    /// True for native executables of the given OS.
    pub fn is_native_for(&self, os: Os) -> bool {
        self.flavor == Flavor::Native && self.os.contains(&os)
    }
}
