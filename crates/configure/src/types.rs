//! Candidate and verdict types.

use std::collections::BTreeSet;
use std::path::PathBuf;

use launchscout_sniff::{Arch, Flavor, Os, Sniffed, WindowsInfo};
use serde::{Deserialize, Serialize};

use crate::signatures::SpellRole;

/// A detected runtime/wrapper signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spell {
    pub tag: String,
    pub role: SpellRole,
}

/// App-bundle details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppBundleInfo {
    /// Designated executable, relative to the bundle directory.
    pub executable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

/// Target platform for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Architectures this platform runs besides its own.
    pub fn compatible_arches(self) -> &'static [Arch] {
        match (self.os, self.arch) {
            // WoW64
            (Os::Windows, Arch::Amd64) => &[Arch::X86],
            _ => &[],
        }
    }
}

/// How well a candidate's architecture matches a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArchFit {
    /// Same architecture, or architecture-agnostic.
    Exact,
    /// Runs through the platform's compatibility layer.
    Compatible,
}

/// One discovered launch possibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Slash-separated path relative to the scan root.
    pub path: String,
    pub flavor: Flavor,
    /// OSes this candidate is valid for; empty means any.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub os: BTreeSet<Os>,
    /// Embedded architectures; empty means agnostic.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub arch: BTreeSet<Arch>,
    pub size: u64,
    pub depth: usize,
    /// Permission bits at scan time (the designated executable's, for bundles).
    pub mode: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spell: Vec<Spell>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub denylisted: bool,
    /// Engine helper process (crash handler and the like).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub helper: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_bundle: Option<AppBundleInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<WindowsInfo>,
}

impl Candidate {
    pub(crate) fn from_sniffed(path: String, sniffed: Sniffed, size: u64, mode: u32) -> Self {
        Self {
            depth: path_depth(&path),
            path,
            flavor: sniffed.flavor,
            os: sniffed.os,
            arch: sniffed.arch,
            size,
            mode,
            spell: Vec::new(),
            denylisted: false,
            helper: false,
            annotations: Vec::new(),
            app_bundle: None,
            windows: sniffed.windows,
        }
    }

    /// Whether this candidate is valid on `os`.
    pub fn runs_on(&self, os: Os) -> bool {
        self.os.is_empty() || self.os.contains(&os)
    }

    /// `None` when no embedded architecture runs on `platform`.
    pub fn arch_fit(&self, platform: Platform) -> Option<ArchFit> {
        if self.arch.is_empty() || self.arch.contains(&platform.arch) {
            return Some(ArchFit::Exact);
        }
        platform
            .compatible_arches()
            .iter()
            .any(|a| self.arch.contains(a))
            .then_some(ArchFit::Compatible)
    }

    /// 0 for game binaries, 2 for wrappers/installers/helpers, 1 otherwise.
    pub fn spell_bias(&self) -> u8 {
        if self.spell.iter().any(|s| s.role.promotes()) {
            0
        } else if self.spell.is_empty() {
            1
        } else {
            2
        }
    }

    /// Named like a helper process, or tagged by a helper spell.
    pub fn is_helper(&self) -> bool {
        self.helper || self.spell.iter().any(|s| s.role == SpellRole::Helper)
    }

    /// Relative path of the file that must carry execute bits, if any.
    ///
    /// Only Unix-valid natives, scripts and app bundles are executed
    /// through mode bits; bundles report their designated executable.
    pub fn exec_path(&self) -> Option<String> {
        if !self.os.iter().any(|os| os.is_unix()) {
            return None;
        }
        match self.flavor {
            Flavor::Native | Flavor::Script => Some(self.path.clone()),
            Flavor::AppBundle => self
                .app_bundle
                .as_ref()
                .map(|b| format!("{}/{}", self.path, b.executable)),
            Flavor::Archive | Flavor::Markup => None,
        }
    }

    pub(crate) fn annotate(&mut self, note: impl Into<String>) {
        self.annotations.push(note.into());
    }
}

/// Number of `/` separators: root-level entries have depth 0.
pub(crate) fn path_depth(path: &str) -> usize {
    path.matches('/').count()
}

/// Result of scanning one tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub base_path: PathBuf,
    /// Insertion order after a scan, rank order after filtering.
    pub candidates: Vec<Candidate>,
    /// Sum of every regular file visited, candidate or not.
    pub total_size: u64,
    /// Platform of the last [`Verdict::filter_platform`] call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

impl Verdict {
    /// Highest-ranked candidate (meaningful after filtering).
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
