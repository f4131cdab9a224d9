//! Mach-O (macOS) executables, thin and fat.

use std::collections::BTreeSet;

use crate::bytes::{Endian, u32_at, u64_at};
use crate::{Arch, Os, Sniffed};

const MH_MAGIC: u32 = 0xfeed_face;
const MH_CIGAM: u32 = 0xcefa_edfe;
const MH_MAGIC_64: u32 = 0xfeed_facf;
const MH_CIGAM_64: u32 = 0xcffa_edfe;
const FAT_MAGIC: u32 = 0xcafe_babe;
const FAT_MAGIC_64: u32 = 0xcafe_babf;

const MH_EXECUTE: u32 = 2;

const CPU_TYPE_X86: u32 = 7;
const CPU_TYPE_X86_64: u32 = 0x0100_0007;
const CPU_TYPE_ARM64: u32 = 0x0100_000c;

/// Java class files share `cafebabe`; their "slice count" is the class
/// version, which is always well above any real fat binary.
const MAX_FAT_SLICES: u32 = 30;

pub(crate) fn sniff(file_name: &str, data: &[u8]) -> Option<Sniffed> {
    match u32_at(data, 0, Endian::Big)? {
        MH_MAGIC | MH_MAGIC_64 => thin(data, Endian::Big),
        MH_CIGAM | MH_CIGAM_64 => thin(data, Endian::Little),
        FAT_MAGIC => fat(file_name, data, 20),
        FAT_MAGIC_64 => fat(file_name, data, 32),
        _ => None,
    }
}

fn thin(data: &[u8], endian: Endian) -> Option<Sniffed> {
    let arch = cpu_arch(u32_at(data, 4, endian)?)?;
    if u32_at(data, 12, endian)? != MH_EXECUTE {
        return None;
    }
    Some(Sniffed::native(Os::Darwin, [arch]))
}

fn fat(file_name: &str, data: &[u8], entry_size: usize) -> Option<Sniffed> {
    let count = u32_at(data, 4, Endian::Big)?;
    if count == 0 || count > MAX_FAT_SLICES {
        return None;
    }

    let mut arch = BTreeSet::new();
    let mut unseen = false;
    for i in 0..count as usize {
        let entry = 8 + i * entry_size;
        let cputype = u32_at(data, entry, Endian::Big)?;
        let offset = if entry_size == 32 {
            usize::try_from(u64_at(data, entry + 8, Endian::Big)?).ok()?
        } else {
            u32_at(data, entry + 8, Endian::Big)? as usize
        };

        match slice_is_executable(data, offset) {
            Some(false) => return None,
            Some(true) => {}
            None => unseen = true,
        }
        if let Some(a) = cpu_arch(cputype) {
            arch.insert(a);
        }
    }

    // Slices past the prefix can't be checked; fall back to the name.
    if unseen && is_library_name(file_name) {
        return None;
    }
    if arch.is_empty() {
        return None;
    }
    Some(Sniffed::native(Os::Darwin, arch))
}

/// `None` when the slice header lies beyond `data`.
fn slice_is_executable(data: &[u8], offset: usize) -> Option<bool> {
    if offset.checked_add(16)? > data.len() {
        return None;
    }
    let endian = match u32_at(data, offset, Endian::Big)? {
        MH_MAGIC | MH_MAGIC_64 => Endian::Big,
        MH_CIGAM | MH_CIGAM_64 => Endian::Little,
        _ => return Some(false),
    };
    Some(u32_at(data, offset + 12, endian)? == MH_EXECUTE)
}

fn is_library_name(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    [".dylib", ".so", ".bundle", ".jnilib"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

fn cpu_arch(cputype: u32) -> Option<Arch> {
    match cputype {
        CPU_TYPE_X86 => Some(Arch::X86),
        CPU_TYPE_X86_64 => Some(Arch::Amd64),
        CPU_TYPE_ARM64 => Some(Arch::Arm64),
        _ => None,
    }
}
