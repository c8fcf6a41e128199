// Tue Jan 13 2026 - Alex

use crate::error::ParseError;
use crate::format::constants::*;
use crate::format::endian::MachView;
use crate::options::LinkOptions;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatSelection {
    /// Not a universal file at all.
    NotFat,
    /// The slice to parse, in bytes from the start of the file.
    Slice { offset: u64, len: u64, slices: u32 },
    /// Universal file without a slice for the requested architecture.
    NoMatch { slices: u32 },
}

/// Reads the (big-endian) fat header and picks the slice for the link
/// architecture: an exact (cputype, cpusubtype) match when a
/// sub-architecture is preferred, otherwise the first cputype match.
pub fn select_slice(
    data: &[u8],
    path: &Path,
    declared_len: u64,
    options: &LinkOptions,
) -> Result<FatSelection, ParseError> {
    let view = MachView::big_endian(data);
    if view.get_u32(0) != Some(FAT_MAGIC) {
        return Ok(FatSelection::NotFat);
    }
    let slices = view
        .get_u32(4)
        .ok_or_else(|| ParseError::malformed(path, "truncated fat header"))?;
    let cpu_type = match options.architecture {
        Some(arch) => arch.cpu_type(),
        None => return Ok(FatSelection::NoMatch { slices }),
    };

    let arch_at = |i: u32| -> Result<(u32, u32, u32, u32), ParseError> {
        let off = FAT_HEADER_SIZE + (i as usize) * FAT_ARCH_SIZE;
        let read = |field: usize| {
            view.get_u32(off + field)
                .ok_or_else(|| ParseError::malformed(path, format!("fat arch #{} truncated", i)))
        };
        Ok((read(0)?, read(4)?, read(8)?, read(12)?))
    };

    let mut chosen = None;
    if options.prefer_sub_architecture {
        for i in 0..slices {
            let (ct, cst, off, size) = arch_at(i)?;
            if ct == cpu_type && cst == options.cpu_subtype {
                chosen = Some((off, size));
                break;
            }
        }
    }
    if chosen.is_none() {
        for i in 0..slices {
            let (ct, _, off, size) = arch_at(i)?;
            if ct == cpu_type {
                chosen = Some((off, size));
                break;
            }
        }
    }

    let (offset, len) = match chosen {
        Some((o, l)) => (o as u64, l as u64),
        None => return Ok(FatSelection::NoMatch { slices }),
    };

    if offset + len > declared_len {
        // The file size was read a while ago. If the file is still being
        // written, give it a second and re-stat before giving up.
        std::thread::sleep(Duration::from_secs(1));
        let new_len = std::fs::metadata(path).map(|m| m.len()).unwrap_or(declared_len);
        if offset + len > new_len {
            return Err(ParseError::TruncatedFat {
                path: path.to_path_buf(),
                offset,
                end: offset + len,
                len: declared_len,
            });
        }
    }

    Ok(FatSelection::Slice {
        offset,
        len,
        slices,
    })
}

/// Remap (rather than index into the whole-file mapping) only when the
/// slice starts on a 4 KiB boundary.
pub fn slice_wants_remap(offset: u64) -> bool {
    offset & 0xfff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Architecture;

    fn fat_bytes(archs: &[(u32, u32, u32, u32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&FAT_MAGIC.to_be_bytes());
        data.extend_from_slice(&(archs.len() as u32).to_be_bytes());
        for &(ct, cst, off, size) in archs {
            data.extend_from_slice(&ct.to_be_bytes());
            data.extend_from_slice(&cst.to_be_bytes());
            data.extend_from_slice(&off.to_be_bytes());
            data.extend_from_slice(&size.to_be_bytes());
            data.extend_from_slice(&0u32.to_be_bytes()); // align
        }
        data
    }

    #[test]
    fn test_selects_matching_cpu_type() {
        let data = fat_bytes(&[
            (CPU_TYPE_ARM64, 0, 0x1000, 0x100),
            (CPU_TYPE_X86_64, 3, 0x2000, 0x200),
        ]);
        let mut options = LinkOptions::default();
        options.architecture = Some(Architecture::X86_64);
        let sel = select_slice(&data, Path::new("t.o"), 0x4000, &options).unwrap();
        assert_eq!(
            sel,
            FatSelection::Slice {
                offset: 0x2000,
                len: 0x200,
                slices: 2
            }
        );
    }

    #[test]
    fn test_prefers_exact_subtype() {
        let data = fat_bytes(&[
            (CPU_TYPE_ARM, CPU_SUBTYPE_ARM_V7, 0x1000, 0x100),
            (CPU_TYPE_ARM, CPU_SUBTYPE_ARM_V7S, 0x2000, 0x100),
        ]);
        let mut options = LinkOptions::default();
        options.architecture = Some(Architecture::Arm);
        options.cpu_subtype = CPU_SUBTYPE_ARM_V7S;
        options.prefer_sub_architecture = true;
        let sel = select_slice(&data, Path::new("t.a"), 0x4000, &options).unwrap();
        assert_eq!(
            sel,
            FatSelection::Slice {
                offset: 0x2000,
                len: 0x100,
                slices: 2
            }
        );
    }

    #[test]
    fn test_no_matching_slice() {
        let data = fat_bytes(&[(CPU_TYPE_ARM64, 0, 0x1000, 0x100)]);
        let mut options = LinkOptions::default();
        options.architecture = Some(Architecture::X86_64);
        let sel = select_slice(&data, Path::new("t.o"), 0x4000, &options).unwrap();
        assert_eq!(sel, FatSelection::NoMatch { slices: 1 });
    }

    #[test]
    fn test_not_fat() {
        let data = [0u8; 16];
        let options = LinkOptions::default();
        let sel = select_slice(&data, Path::new("t.o"), 16, &options).unwrap();
        assert_eq!(sel, FatSelection::NotFat);
    }

    #[test]
    fn test_remap_alignment_policy() {
        assert!(slice_wants_remap(0x1000));
        assert!(slice_wants_remap(0x4000));
        assert!(!slice_wants_remap(0x1200));
    }
}
