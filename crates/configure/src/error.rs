//! Configure error types.

use std::path::PathBuf;

use launchscout_sniff::ParseOsArchError;

use crate::permissions::FixFailure;

/// Errors produced while scanning, filtering or fixing a tree.
///
/// Per-entry problems (an unreadable file, one failed chmod) are reported
/// through the [`Consumer`](crate::Consumer) instead and never surface here,
/// except as the aggregate [`ConfigureError::Permissions`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigureError {
    #[error("cannot read scan root {}: {source}", .path.display())]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("scan root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Platform(#[from] ParseOsArchError),

    #[error("invalid signature table: {0}")]
    Signatures(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to fix permissions on {} path(s)", .0.len())]
    Permissions(Vec<FixFailure>),
}
