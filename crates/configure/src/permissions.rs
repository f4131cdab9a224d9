//! Execute-bit fixing for candidates that are launched directly.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consumer::{Consumer, TracingConsumer};
use crate::error::ConfigureError;
use crate::types::Verdict;

#[cfg(unix)]
const EXEC_BITS: u32 = 0o111;

/// Inputs for [`fix_permissions`].
#[derive(Clone, Copy)]
pub struct FixParams<'a> {
    pub consumer: &'a dyn Consumer,
    /// Report what would change without touching the filesystem.
    pub dry_run: bool,
}

impl Default for FixParams<'static> {
    fn default() -> Self {
        Self {
            consumer: &TracingConsumer,
            dry_run: false,
        }
    }
}

/// A path whose mode could not be read or changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixFailure {
    pub path: String,
    pub error: String,
}

impl fmt::Display for FixFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

/// Result of a [`fix_permissions`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixOutcome {
    /// Relative paths that were (or, in a dry run, would be) made executable.
    pub changed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FixFailure>,
}

impl FixOutcome {
    pub fn into_result(self) -> Result<Vec<String>, ConfigureError> {
        if self.failed.is_empty() {
            Ok(self.changed)
        } else {
            Err(ConfigureError::Permissions(self.failed))
        }
    }
}

/// Adds execute bits to every candidate of `verdict` that needs them.
///
/// Pass a filtered verdict to only touch the chosen platform's files.
pub fn fix_permissions(verdict: &Verdict, params: &FixParams<'_>) -> FixOutcome {
    let mut outcome = FixOutcome::default();
    let mut seen = HashSet::new();

    for rel in verdict.candidates.iter().filter_map(|c| c.exec_path()) {
        if !seen.insert(rel.clone()) {
            continue;
        }
        match fix_one(&verdict.base_path.join(&rel), params.dry_run) {
            Ok(true) => {
                let verb = if params.dry_run { "would fix" } else { "fixed" };
                params.consumer.info(&format!("{rel}: {verb} execute permission"));
                outcome.changed.push(rel);
            }
            Ok(false) => {}
            Err(err) => {
                params
                    .consumer
                    .warn(&format!("{rel}: cannot fix permissions ({err})"));
                outcome.failed.push(FixFailure {
                    path: rel,
                    error: err.to_string(),
                });
            }
        }
    }
    outcome
}

/// Returns whether `path` lacked execute bits.
#[cfg(unix)]
fn fix_one(path: &Path, dry_run: bool) -> io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode();
    if mode & EXEC_BITS == EXEC_BITS {
        return Ok(false);
    }
    if !dry_run {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | EXEC_BITS))?;
    }
    Ok(true)
}

#[cfg(not(unix))]
fn fix_one(path: &Path, _dry_run: bool) -> io::Result<bool> {
    std::fs::metadata(path)?;
    Ok(false)
}
