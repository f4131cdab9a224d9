//! Denylist and spell signature tables.
//!
//! Both tables are data: the built-in set ships as `signatures.json`
//! and callers may load their own to recognize new engines or helper
//! processes without touching the ranking code.

use std::path::Path;
use std::sync::OnceLock;

use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigureError;
use crate::types::Spell;

/// The embedded default table.
pub const BUILTIN_SIGNATURES: &str = include_str!("signatures.json");

/// Default number of bytes inspected for spell needles.
pub const DEFAULT_SCAN_WINDOW: usize = 1024 * 1024;

static BUILTIN: OnceLock<Signatures> = OnceLock::new();

/// How a spell biases ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellRole {
    /// The actual game binary.
    Game,
    /// A bundled interpreter or launcher stub.
    Wrapper,
    Installer,
    /// Crash reporters, sandboxes and other auxiliary processes.
    Helper,
}

impl SpellRole {
    pub fn promotes(self) -> bool {
        self == SpellRole::Game
    }
}

/// One runtime signature: any needle found in a candidate's leading
/// bytes tags it with `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSignature {
    pub tag: String,
    pub role: SpellRole,
    pub needles: Vec<String>,
}

/// Versionable heuristics data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signatures {
    /// Case-insensitive file name regexes; matches are ranked last.
    #[serde(default)]
    pub denylist: Vec<String>,
    /// Case-insensitive file name regexes for engine helper processes
    /// (crash handlers and the like); matches are dropped by the platform
    /// filter whenever anything else survives.
    #[serde(default)]
    pub helpers: Vec<String>,
    #[serde(default)]
    pub spells: Vec<SpellSignature>,
    /// Leading bytes searched for spell needles.
    #[serde(default = "default_scan_window")]
    pub scan_window: usize,
}

fn default_scan_window() -> usize {
    DEFAULT_SCAN_WINDOW
}

impl Default for Signatures {
    fn default() -> Self {
        Self {
            denylist: Vec::new(),
            helpers: Vec::new(),
            spells: Vec::new(),
            scan_window: DEFAULT_SCAN_WINDOW,
        }
    }
}

impl Signatures {
    /// The built-in table, parsed once.
    pub fn builtin() -> &'static Signatures {
        BUILTIN.get_or_init(|| {
            Self::from_json_str(BUILTIN_SIGNATURES).unwrap_or_else(|e| {
                tracing::error!(error = %e, "built-in signature table is invalid, using an empty one");
                Self::default()
            })
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Compiles the tables into matchers, validating every pattern.
    pub fn compile(&self) -> Result<CompiledSignatures, ConfigureError> {
        let denylist = NameSet::new(&self.denylist, "denylist")?;
        let helpers = NameSet::new(&self.helpers, "helpers")?;

        let mut needles = Vec::new();
        let mut owners = Vec::new();
        for (index, spell) in self.spells.iter().enumerate() {
            if spell.tag.is_empty() {
                return Err(ConfigureError::Signatures(format!(
                    "spell #{index} has an empty tag"
                )));
            }
            for needle in spell.needles.iter().filter(|n| !n.is_empty()) {
                needles.push(regex::escape(needle));
                owners.push(index);
            }
        }
        let needles = regex::bytes::RegexSet::new(&needles)
            .map_err(|e| ConfigureError::Signatures(format!("spells: {e}")))?;

        Ok(CompiledSignatures {
            denylist,
            helpers,
            needles,
            owners,
            spells: self.spells.clone(),
            scan_window: self.scan_window,
        })
    }
}

/// Case-insensitive file name patterns, remembering their sources.
#[derive(Debug, Clone)]
struct NameSet {
    set: RegexSet,
    sources: Vec<String>,
}

impl NameSet {
    fn new(patterns: &[String], table: &str) -> Result<Self, ConfigureError> {
        let set = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigureError::Signatures(format!("{table}: {e}")))?;
        Ok(Self {
            set,
            sources: patterns.to_vec(),
        })
    }

    fn first_match(&self, file_name: &str) -> Option<&str> {
        self.set
            .matches(file_name)
            .iter()
            .next()
            .map(|i| self.sources[i].as_str())
    }
}

/// Ready-to-match form of [`Signatures`].
#[derive(Debug, Clone)]
pub struct CompiledSignatures {
    denylist: NameSet,
    helpers: NameSet,
    needles: regex::bytes::RegexSet,
    /// Spell index for each needle.
    owners: Vec<usize>,
    spells: Vec<SpellSignature>,
    scan_window: usize,
}

impl CompiledSignatures {
    pub fn scan_window(&self) -> usize {
        self.scan_window
    }

    /// Returns the first denylist pattern matching `file_name`.
    pub fn denylisted(&self, file_name: &str) -> Option<&str> {
        self.denylist.first_match(file_name)
    }

    /// Returns the first helper pattern matching `file_name`.
    pub fn helper(&self, file_name: &str) -> Option<&str> {
        self.helpers.first_match(file_name)
    }

    /// Returns every spell whose needles occur in `data`, in table order.
    pub fn spells_in(&self, data: &[u8]) -> Vec<Spell> {
        let mut hit: Vec<usize> = self
            .needles
            .matches(data)
            .iter()
            .map(|needle| self.owners[needle])
            .collect();
        hit.sort_unstable();
        hit.dedup();

        hit.into_iter()
            .map(|i| Spell {
                tag: self.spells[i].tag.clone(),
                role: self.spells[i].role,
            })
            .collect()
    }
}
