//! Minimal synthetic binaries for tests.
//!
//! Each builder emits just enough header to be recognized; pad the
//! result with `Vec::resize` when a test cares about file size.

use crate::Arch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfKind {
    Exec,
    Pie,
    SharedObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeKind {
    Gui,
    Console,
    Dll,
}

const PT_LOAD: u32 = 1;
const PT_INTERP: u32 = 3;
const PT_PHDR: u32 = 6;

/// ELF executable; 386 yields a 32-bit file, everything else 64-bit.
pub fn elf(arch: Arch, kind: ElfKind) -> Vec<u8> {
    let is_64 = arch != Arch::X86;
    let machine: u16 = match arch {
        Arch::X86 => 3,
        Arch::Amd64 => 62,
        Arch::Arm64 => 183,
    };
    let (e_type, segments): (u16, &[u32]) = match kind {
        ElfKind::Exec => (2, &[PT_LOAD]),
        ElfKind::Pie => (3, &[PT_PHDR, PT_INTERP, PT_LOAD]),
        ElfKind::SharedObject => (3, &[PT_LOAD]),
    };

    let (ehsize, phentsize) = if is_64 { (64usize, 56usize) } else { (52, 32) };
    let mut out = vec![0u8; ehsize + phentsize * segments.len()];
    out[..4].copy_from_slice(b"\x7fELF");
    out[4] = if is_64 { 2 } else { 1 };
    out[5] = 1;
    out[6] = 1;
    out[16..18].copy_from_slice(&e_type.to_le_bytes());
    out[18..20].copy_from_slice(&machine.to_le_bytes());
    out[20..24].copy_from_slice(&1u32.to_le_bytes());

    let phnum = segments.len() as u16;
    if is_64 {
        out[32..40].copy_from_slice(&(ehsize as u64).to_le_bytes());
        out[52..54].copy_from_slice(&(ehsize as u16).to_le_bytes());
        out[54..56].copy_from_slice(&(phentsize as u16).to_le_bytes());
        out[56..58].copy_from_slice(&phnum.to_le_bytes());
    } else {
        out[28..32].copy_from_slice(&(ehsize as u32).to_le_bytes());
        out[40..42].copy_from_slice(&(ehsize as u16).to_le_bytes());
        out[42..44].copy_from_slice(&(phentsize as u16).to_le_bytes());
        out[44..46].copy_from_slice(&phnum.to_le_bytes());
    }

    for (i, p_type) in segments.iter().enumerate() {
        let at = ehsize + i * phentsize;
        out[at..at + 4].copy_from_slice(&p_type.to_le_bytes());
    }
    out
}

/// PE image with a DOS stub and an optional header.
pub fn pe(arch: Arch, kind: PeKind) -> Vec<u8> {
    const PE_OFFSET: usize = 0x80;
    let (machine, optional_magic, optional_len): (u16, u16, usize) = match arch {
        Arch::X86 => (0x014c, 0x10b, 0xe0),
        Arch::Amd64 => (0x8664, 0x20b, 0xf0),
        Arch::Arm64 => (0xaa64, 0x20b, 0xf0),
    };
    let characteristics: u16 = match kind {
        PeKind::Dll => 0x2102,
        _ => 0x0102,
    };
    let subsystem: u16 = match kind {
        PeKind::Gui | PeKind::Dll => 2,
        PeKind::Console => 3,
    };

    let coff = PE_OFFSET + 4;
    let optional = coff + 20;
    let mut out = vec![0u8; optional + optional_len];
    out[..2].copy_from_slice(b"MZ");
    out[0x3c..0x40].copy_from_slice(&(PE_OFFSET as u32).to_le_bytes());
    out[PE_OFFSET..coff].copy_from_slice(b"PE\0\0");
    out[coff..coff + 2].copy_from_slice(&machine.to_le_bytes());
    out[coff + 16..coff + 18].copy_from_slice(&(optional_len as u16).to_le_bytes());
    out[coff + 18..coff + 20].copy_from_slice(&characteristics.to_le_bytes());
    out[optional..optional + 2].copy_from_slice(&optional_magic.to_le_bytes());
    out[optional + 68..optional + 70].copy_from_slice(&subsystem.to_le_bytes());
    out
}

fn macho_cputype(arch: Arch) -> u32 {
    match arch {
        Arch::X86 => 7,
        Arch::Amd64 => 0x0100_0007,
        Arch::Arm64 => 0x0100_000c,
    }
}

/// Thin little-endian Mach-O executable.
pub fn macho(arch: Arch) -> Vec<u8> {
    let (magic, header_len): (&[u8], usize) = if arch == Arch::X86 {
        (&[0xce, 0xfa, 0xed, 0xfe], 28)
    } else {
        (&[0xcf, 0xfa, 0xed, 0xfe], 32)
    };
    let mut out = vec![0u8; header_len];
    out[..4].copy_from_slice(magic);
    out[4..8].copy_from_slice(&macho_cputype(arch).to_le_bytes());
    out[12..16].copy_from_slice(&2u32.to_le_bytes());
    out
}

/// Universal binary header listing one slice per architecture.
pub fn macho_fat(archs: &[Arch]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + archs.len() * 20);
    out.extend_from_slice(&0xcafe_babeu32.to_be_bytes());
    out.extend_from_slice(&(archs.len() as u32).to_be_bytes());
    for (i, arch) in archs.iter().enumerate() {
        out.extend_from_slice(&macho_cputype(*arch).to_be_bytes());
        out.extend_from_slice(&3u32.to_be_bytes());
        out.extend_from_slice(&(0x4000 * (i as u32 + 1)).to_be_bytes());
        out.extend_from_slice(&0x4000u32.to_be_bytes());
        out.extend_from_slice(&14u32.to_be_bytes());
    }
    out
}

/// Zip with a single stored entry.
pub fn zip(entry_name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"PK\x03\x04");
    out.extend_from_slice(&20u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&(entry_name.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(entry_name.as_bytes());
    out
}

/// Jar whose first entry is the manifest.
pub fn jar() -> Vec<u8> {
    let mut out = zip("META-INF/MANIFEST.MF");
    out.extend_from_slice(b"Manifest-Version: 1.0\r\nMain-Class: game.Main\r\n");
    out
}
