//! ELF (Linux) executables.

use crate::bytes::{Endian, u16_at, u32_at, u64_at};
use crate::{Arch, Os, Sniffed};

pub(crate) const MAGIC: &[u8] = b"\x7fELF";

const CLASS_32: u8 = 1;
const CLASS_64: u8 = 2;
const DATA_LSB: u8 = 1;
const DATA_MSB: u8 = 2;

const ET_EXEC: u16 = 2;
const ET_DYN: u16 = 3;

const EM_386: u16 = 3;
const EM_X86_64: u16 = 62;
const EM_AARCH64: u16 = 183;

const PT_INTERP: u32 = 3;

pub(crate) fn sniff(file_name: &str, data: &[u8]) -> Option<Sniffed> {
    let class = *data.get(4)?;
    let endian = match *data.get(5)? {
        DATA_LSB => Endian::Little,
        DATA_MSB => Endian::Big,
        _ => return None,
    };
    if class != CLASS_32 && class != CLASS_64 {
        return None;
    }

    let arch = match u16_at(data, 18, endian)? {
        EM_386 => Arch::X86,
        EM_X86_64 => Arch::Amd64,
        EM_AARCH64 => Arch::Arm64,
        _ => return None,
    };

    let executable = match u16_at(data, 16, endian)? {
        ET_EXEC => true,
        // PIE executables and shared objects share ET_DYN; only the former
        // request a program interpreter.
        ET_DYN => has_interp(data, class, endian).unwrap_or_else(|| !looks_like_library(file_name)),
        _ => false,
    };

    executable.then(|| Sniffed::native(Os::Linux, [arch]))
}

/// Scans the program header table for `PT_INTERP`.
///
/// Returns `None` when the table does not fit in the prefix.
fn has_interp(data: &[u8], class: u8, endian: Endian) -> Option<bool> {
    let (phoff, phentsize, phnum) = if class == CLASS_64 {
        (
            usize::try_from(u64_at(data, 32, endian)?).ok()?,
            u16_at(data, 54, endian)? as usize,
            u16_at(data, 56, endian)? as usize,
        )
    } else {
        (
            u32_at(data, 28, endian)? as usize,
            u16_at(data, 42, endian)? as usize,
            u16_at(data, 44, endian)? as usize,
        )
    };

    if phentsize < 4 {
        return None;
    }

    for i in 0..phnum {
        let entry = phoff.checked_add(i.checked_mul(phentsize)?)?;
        if u32_at(data, entry, endian)? == PT_INTERP {
            return Some(true);
        }
    }
    Some(false)
}

/// `libfoo.so`, `libfoo.so.1.2` and friends.
fn looks_like_library(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".so") || lower.contains(".so.")
}
