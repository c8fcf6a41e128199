// Tue Jan 13 2026 - Alex

use crate::error::ParseError;
use crate::files::Ordinal;
use crate::format::constants::*;
use crate::options::LinkOptions;
use std::path::{Path, PathBuf};

/// An LLVM bitcode input. The ingestion core only identifies bitcode and
/// records its architecture; code generation happens elsewhere.
#[derive(Debug)]
pub struct BitcodeFile {
    path: PathBuf,
    mod_time: i64,
    ordinal: Ordinal,
    len: u64,
}

/// True for both raw bitcode and the 0x0B17C0DE wrapper.
pub fn is_bitcode(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }
    if &data[0..4] == BITCODE_MAGIC {
        return true;
    }
    u32::from_le_bytes([data[0], data[1], data[2], data[3]]) == BITCODE_WRAPPER_MAGIC
}

/// The wrapper records the cpu type; raw bitcode does not say.
pub fn bitcode_cpu_type(data: &[u8]) -> Option<u32> {
    if data.len() >= 20
        && u32::from_le_bytes([data[0], data[1], data[2], data[3]]) == BITCODE_WRAPPER_MAGIC
    {
        return Some(u32::from_le_bytes([data[16], data[17], data[18], data[19]]));
    }
    None
}

pub fn bitcode_arch_name(data: &[u8]) -> &'static str {
    match bitcode_cpu_type(data) {
        Some(ct) => arch_name_for(ct, 0),
        None => "bitcode",
    }
}

impl BitcodeFile {
    /// Ok(None) when the bytes are not bitcode or are bitcode for a
    /// different architecture; the probe's error handling names the
    /// mismatch.
    pub fn parse(
        data: &[u8],
        path: &Path,
        mod_time: i64,
        ordinal: Ordinal,
        options: &LinkOptions,
    ) -> Result<Option<BitcodeFile>, ParseError> {
        if !is_bitcode(data) {
            return Ok(None);
        }
        if let (Some(ct), Some(arch)) = (bitcode_cpu_type(data), options.architecture) {
            if ct != arch.cpu_type() {
                return Ok(None);
            }
        }
        if options.lto_library.is_none() {
            return Err(ParseError::BitcodeUnavailable {
                path: path.to_path_buf(),
                lib: if cfg!(target_os = "macos") {
                    "libLTO.dylib".to_string()
                } else {
                    "libLTO.so".to_string()
                },
            });
        }
        if options.log_all_files {
            log::debug!("{}", path.display());
        }
        Ok(Some(BitcodeFile {
            path: path.to_path_buf(),
            mod_time,
            ordinal,
            len: data.len() as u64,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mod_time(&self) -> i64 {
        self.mod_time
    }

    pub fn ordinal(&self) -> Ordinal {
        self.ordinal
    }

    pub fn size(&self) -> u64 {
        self.len
    }
}
