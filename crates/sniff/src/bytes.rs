//! Bounds-checked integer reads over a byte prefix.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

pub(crate) fn u16_at(data: &[u8], pos: usize, endian: Endian) -> Option<u16> {
    let raw: [u8; 2] = data.get(pos..pos.checked_add(2)?)?.try_into().ok()?;
    Some(match endian {
        Endian::Little => u16::from_le_bytes(raw),
        Endian::Big => u16::from_be_bytes(raw),
    })
}

pub(crate) fn u32_at(data: &[u8], pos: usize, endian: Endian) -> Option<u32> {
    let raw: [u8; 4] = data.get(pos..pos.checked_add(4)?)?.try_into().ok()?;
    Some(match endian {
        Endian::Little => u32::from_le_bytes(raw),
        Endian::Big => u32::from_be_bytes(raw),
    })
}

pub(crate) fn u64_at(data: &[u8], pos: usize, endian: Endian) -> Option<u64> {
    let raw: [u8; 8] = data.get(pos..pos.checked_add(8)?)?.try_into().ok()?;
    Some(match endian {
        Endian::Little => u64::from_le_bytes(raw),
        Endian::Big => u64::from_be_bytes(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_endiannesses() {
        let data = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(u16_at(&data, 0, Endian::Little), Some(0x3412));
        assert_eq!(u16_at(&data, 0, Endian::Big), Some(0x1234));
        assert_eq!(u32_at(&data, 0, Endian::Big), Some(0x1234_5678));
    }

    #[test]
    fn out_of_bounds_is_none() {
        let data = [0u8; 4];
        assert_eq!(u32_at(&data, 1, Endian::Little), None);
        assert_eq!(u64_at(&data, 0, Endian::Little), None);
        assert_eq!(u16_at(&data, usize::MAX, Endian::Little), None);
    }
}
