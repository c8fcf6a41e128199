// Tue Jan 13 2026 - Alex

use crate::error::ParseError;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
enum Backing {
    Mapped(Arc<Mmap>),
    Owned(Arc<Vec<u8>>),
}

/// A read-only, private, file-backed mapping of an input file, possibly
/// narrowed to a fat slice. Clones share the underlying mapping. An
/// owned-bytes backing exists for inputs synthesized in memory.
#[derive(Clone)]
pub struct InputMapping {
    backing: Backing,
    offset: usize,
    len: usize,
}

impl InputMapping {
    /// Maps the declared length of the file starting at offset zero.
    pub fn map(file: &File, len: u64, path: &Path) -> Result<InputMapping, ParseError> {
        let mmap = unsafe { MmapOptions::new().len(len as usize).map(file) }.map_err(|e| {
            ParseError::Map {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        Ok(InputMapping {
            backing: Backing::Mapped(Arc::new(mmap)),
            offset: 0,
            len: len as usize,
        })
    }

    /// Re-maps just a slice of the file. Used when a fat slice is
    /// page-aligned so the rest of the universal file can be released.
    pub fn map_at(
        file: &File,
        offset: u64,
        len: u64,
        path: &Path,
    ) -> Result<InputMapping, ParseError> {
        let mmap = unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(len as usize)
                .map(file)
        }
        .map_err(|e| ParseError::Map {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(InputMapping {
            backing: Backing::Mapped(Arc::new(mmap)),
            offset: 0,
            len: len as usize,
        })
    }

    pub fn from_vec(data: Vec<u8>) -> InputMapping {
        let len = data.len();
        InputMapping {
            backing: Backing::Owned(Arc::new(data)),
            offset: 0,
            len,
        }
    }

    /// Narrows the view without re-mapping; the full mapping stays resident.
    pub fn window(&self, offset: usize, len: usize) -> InputMapping {
        InputMapping {
            backing: self.backing.clone(),
            offset: self.offset + offset,
            len,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        let all: &[u8] = match &self.backing {
            Backing::Mapped(m) => m,
            Backing::Owned(v) => v,
        };
        &all[self.offset..self.offset + self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
