//! Launch target detection for extracted game builds.
//!
//! Given a directory, figures out what can be launched and, for a given
//! OS/architecture, what *should* be launched.
//!
//! # Pipeline
//!
//! 1. **Configure**: walk the tree once, sniff every file, resolve `.app`
//!    bundles and tag denylisted helpers and known runtime signatures
//! 2. **Filter**: narrow a [`Verdict`] to one platform and rank it
//!    ([`Verdict::filter_platform`] works in place; clone first for
//!    several views)
//! 3. **Fix permissions**: set execute bits on whatever must be run
//!    directly, optionally as a dry run

pub mod builder;
pub mod bundle;
pub mod consumer;
pub mod error;
pub mod filter;
mod fsutil;
pub mod permissions;
pub mod signatures;
pub mod types;

#[cfg(test)]
mod scenarios;

// Re-export primary types for convenience.
pub use builder::{ConfigureParams, configure};
pub use bundle::{AppBundle, BundleOutcome, GhostReason};
pub use consumer::{Consumer, Level, TracingConsumer};
pub use error::ConfigureError;
pub use launchscout_sniff::{Arch, Flavor, Os, WindowsInfo};
pub use permissions::{FixFailure, FixOutcome, FixParams, fix_permissions};
pub use signatures::{Signatures, SpellRole, SpellSignature};
pub use types::{AppBundleInfo, Candidate, Platform, Spell, Verdict};
