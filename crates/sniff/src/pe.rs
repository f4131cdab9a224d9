//! PE (Windows) executables.

use crate::bytes::{Endian, u16_at, u32_at};
use crate::{Arch, Os, Sniffed, WindowsInfo};

pub(crate) const MZ_MAGIC: &[u8] = b"MZ";
const PE_SIGNATURE: &[u8] = b"PE\0\0";

const MACHINE_I386: u16 = 0x014c;
const MACHINE_AMD64: u16 = 0x8664;
const MACHINE_ARM64: u16 = 0xaa64;

const CHARACTERISTIC_DLL: u16 = 0x2000;

const OPTIONAL_MAGIC_PE32: u16 = 0x10b;
const OPTIONAL_MAGIC_PE32_PLUS: u16 = 0x20b;
const SUBSYSTEM_WINDOWS_GUI: u16 = 2;

pub(crate) fn sniff(data: &[u8]) -> Option<Sniffed> {
    let pe_offset = u32_at(data, 0x3c, Endian::Little)? as usize;
    if data.get(pe_offset..pe_offset.checked_add(4)?)? != PE_SIGNATURE {
        return None;
    }
    let coff = pe_offset + 4;

    let arch = match u16_at(data, coff, Endian::Little)? {
        MACHINE_I386 => Arch::X86,
        MACHINE_AMD64 => Arch::Amd64,
        MACHINE_ARM64 => Arch::Arm64,
        _ => return None,
    };

    let characteristics = u16_at(data, coff + 18, Endian::Little)?;
    if characteristics & CHARACTERISTIC_DLL != 0 {
        return None;
    }

    // Subsystem sits at the same offset in PE32 and PE32+ optional headers.
    let optional = coff + 20;
    let gui = match u16_at(data, optional, Endian::Little) {
        Some(OPTIONAL_MAGIC_PE32 | OPTIONAL_MAGIC_PE32_PLUS) => {
            u16_at(data, optional + 68, Endian::Little) == Some(SUBSYSTEM_WINDOWS_GUI)
        }
        _ => false,
    };

    let mut sniffed = Sniffed::native(Os::Windows, [arch]);
    sniffed.windows = Some(WindowsInfo { gui });
    Some(sniffed)
}
