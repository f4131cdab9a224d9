//! Executable format sniffing.
//!
//! Classifies a file from a bounded byte prefix: native executables
//! (ELF, PE, Mach-O including fat binaries), scripts, jar-like archives
//! and HTML entry points. Nothing here touches the filesystem; callers
//! read at most [`SNIFF_LEN`] bytes and hand them over.

mod archive;
mod bytes;
mod elf;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod macho;
mod markup;
mod pe;
mod script;
mod types;

pub use types::{Arch, Flavor, Os, ParseOsArchError, Sniffed, WindowsInfo};

/// Number of leading bytes needed to classify any supported format.
pub const SNIFF_LEN: usize = 8 * 1024;

/// Classifies a file given its name and leading bytes.
///
/// Returns `None` for anything that is not a launch target, including
/// shared libraries, DLLs and plain data files.
pub fn sniff(file_name: &str, prefix: &[u8]) -> Option<Sniffed> {
    if prefix.starts_with(elf::MAGIC) {
        return elf::sniff(file_name, prefix);
    }
    if prefix.starts_with(pe::MZ_MAGIC) {
        return pe::sniff(prefix);
    }
    if let Some(sniffed) = macho::sniff(file_name, prefix) {
        return Some(sniffed);
    }
    if prefix.starts_with(script::SHEBANG) {
        return Some(script::unix());
    }
    if prefix.starts_with(archive::ZIP_MAGIC) {
        return archive::sniff(file_name, prefix);
    }
    if script::is_batch(file_name, prefix) {
        return Some(script::windows());
    }
    markup::sniff(file_name, prefix)
}

/// Returns the lowercased extension of `file_name`, without the dot.
pub(crate) fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
