//! Jar-like archives.

use crate::bytes::{Endian, u16_at};
use crate::{Flavor, Sniffed};

pub(crate) const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

const LOCAL_HEADER_LEN: usize = 30;
const MANIFEST_DIR: &[u8] = b"META-INF/";

pub(crate) fn sniff(file_name: &str, data: &[u8]) -> Option<Sniffed> {
    let is_jar_name = crate::extension(file_name).as_deref() == Some("jar");
    if is_jar_name || first_entry_is_manifest(data) {
        return Some(Sniffed::agnostic(Flavor::Archive, &[]));
    }
    None
}

/// Jar tooling writes `META-INF/` (or the manifest itself) first.
fn first_entry_is_manifest(data: &[u8]) -> bool {
    let Some(name_len) = u16_at(data, 26, Endian::Little) else {
        return false;
    };
    let end = LOCAL_HEADER_LEN + name_len as usize;
    data.get(LOCAL_HEADER_LEN..end)
        .is_some_and(|name| name.starts_with(MANIFEST_DIR))
}
