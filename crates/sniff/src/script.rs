//! Launcher scripts: shebang scripts and Windows batch files.

use crate::{Flavor, Os, Sniffed};

pub(crate) const SHEBANG: &[u8] = b"#!";

pub(crate) fn unix() -> Sniffed {
    Sniffed::agnostic(Flavor::Script, &[Os::Linux, Os::Darwin])
}

pub(crate) fn windows() -> Sniffed {
    Sniffed::agnostic(Flavor::Script, &[Os::Windows])
}

/// Batch files have no magic; the extension decides, provided the
/// content is text.
pub(crate) fn is_batch(file_name: &str, data: &[u8]) -> bool {
    matches!(crate::extension(file_name).as_deref(), Some("bat" | "cmd")) && !data.contains(&0)
}
