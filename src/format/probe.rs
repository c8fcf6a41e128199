// Tue Jan 13 2026 - Alex

use crate::dylib;
use crate::error::ParseError;
use crate::files::bitcode::{self, BitcodeFile};
use crate::files::{ArchiveFile, ObjectFile, ParsedFile};
use crate::format::constants::*;
use crate::format::endian::MachView;
use crate::format::fat::{self, FatSelection};
use crate::format::mapping::InputMapping;
use crate::options::{FileInfo, LinkOptions};
use std::fs::File;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Running totals over everything the probe has accepted.
#[derive(Default)]
pub struct IngestStats {
    pub total_object_size: AtomicU64,
    pub total_archive_size: AtomicU64,
    pub objects_loaded: AtomicU32,
    pub archives_loaded: AtomicU32,
    pub dylibs_loaded: AtomicU32,
}

/// Names the architecture of a file we rejected, for diagnostics. Falls
/// back to a hex dump of the leading bytes.
pub fn file_arch_name(data: &[u8]) -> String {
    if let Some(view) = MachView::from_header(data) {
        if let (Some(ct), Some(cst)) = (view.cpu_type(), view.cpu_subtype()) {
            return arch_name_for(ct, cst).to_string();
        }
    }
    if data.len() >= ARCHIVE_MAGIC.len() && &data[..ARCHIVE_MAGIC.len()] == ARCHIVE_MAGIC {
        return "archive".to_string();
    }
    if bitcode::is_bitcode(data) {
        return bitcode::bitcode_arch_name(data).to_string();
    }
    let mut msg = String::from("unsupported file format (");
    for byte in data.iter().take(16) {
        msg.push_str(&format!(" 0x{:02X}", byte));
    }
    msg.push_str(" )");
    msg
}

fn is_dylib_shaped(data: &[u8]) -> bool {
    match MachView::from_header(data) {
        Some(view) => matches!(view.filetype(), Some(MH_DYLIB) | Some(MH_DYLIB_STUB)),
        None => false,
    }
}

/// Maps an input file, selects the fat slice for the link architecture,
/// and dispatches across the five container formats. This runs on worker
/// threads; nothing here touches orchestrator state besides the atomic
/// statistics.
pub fn make_file(
    options: &Arc<LinkOptions>,
    info: &FileInfo,
    indirect_dylib: bool,
    stats: &IngestStats,
) -> Result<ParsedFile, ParseError> {
    let file = File::open(&info.path).map_err(|e| ParseError::Open {
        path: info.path.clone(),
        source: e,
    })?;
    if info.file_len < 20 {
        return Err(ParseError::TooSmall {
            path: info.path.clone(),
            len: info.file_len,
        });
    }
    let whole = InputMapping::map(&file, info.file_len, &info.path)?;

    let selection = fat::select_slice(whole.as_bytes(), &info.path, info.file_len, options)?;
    let (mapping, fat_slices) = match selection {
        FatSelection::NotFat => (whole, None),
        FatSelection::Slice {
            offset,
            len,
            slices,
        } => {
            let narrowed = if fat::slice_wants_remap(offset) {
                InputMapping::map_at(&file, offset, len, &info.path)?
            } else {
                whole.window(offset as usize, len as usize)
            };
            (narrowed, Some((slices, true)))
        }
        FatSelection::NoMatch { slices } => (whole, Some((slices, false))),
    };
    drop(file);
    let len = mapping.len() as u64;

    if let Some(obj) = ObjectFile::parse(
        mapping.clone(),
        &info.path,
        info.mod_time,
        info.ordinal,
        options,
    )? {
        stats.total_object_size.fetch_add(len, Ordering::Relaxed);
        stats.objects_loaded.fetch_add(1, Ordering::Relaxed);
        return Ok(ParsedFile::Object(obj));
    }

    if let Some(bc) = BitcodeFile::parse(
        mapping.as_bytes(),
        &info.path,
        info.mod_time,
        info.ordinal,
        options,
    )? {
        stats.total_object_size.fetch_add(len, Ordering::Relaxed);
        stats.objects_loaded.fetch_add(1, Ordering::Relaxed);
        return Ok(ParsedFile::Bitcode(bc));
    }

    let dylibs_allowed = options.output_kind.allows_dylibs();
    if dylibs_allowed {
        if let Some(d) = dylib::parse(
            &mapping,
            &info.path,
            info.mod_time,
            info.ordinal,
            options,
            info.options.bundle_loader,
            indirect_dylib,
        )? {
            return Ok(ParsedFile::Dylib(d));
        }
        if let Some(d) = dylib::parse_text_stub(
            mapping.as_bytes(),
            &info.path,
            info.mod_time,
            info.ordinal,
            options,
            info.options.bundle_loader,
            indirect_dylib,
        )? {
            return Ok(ParsedFile::Dylib(d));
        }
    }

    if let Some(archive) = ArchiveFile::parse(
        mapping.clone(),
        &info.path,
        info.mod_time,
        info.ordinal,
        info.options.force_load,
        options.clone(),
    )? {
        stats.total_archive_size.fetch_add(len, Ordering::Relaxed);
        stats.archives_loaded.fetch_add(1, Ordering::Relaxed);
        return Ok(ParsedFile::Archive(archive));
    }

    // nothing claimed the file; figure out the most instructive error
    let bytes = mapping.as_bytes();

    if bitcode::is_bitcode(bytes) && options.lto_library.is_some() {
        return Err(ParseError::WrongBitcodeArchitecture {
            path: info.path.clone(),
            file_arch: file_arch_name(bytes),
            arch: options.architecture_name(),
        });
    }

    if !dylibs_allowed && is_dylib_shaped(bytes) {
        return Err(ParseError::UnexpectedDylib {
            path: info.path.clone(),
        });
    }

    match fat_slices {
        Some((slices, false)) => Err(ParseError::MissingSlice {
            path: info.path.clone(),
            arch: options.architecture_name(),
            slices,
        }),
        Some((slices, true)) => Err(ParseError::UniversalNoSlice {
            path: info.path.clone(),
            arch: options.architecture_name(),
            slices,
        }),
        None => Err(ParseError::WrongArchitecture {
            path: info.path.clone(),
            file_arch: file_arch_name(bytes),
            arch: options.architecture_name(),
        }),
    }
}
