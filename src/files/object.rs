// Tue Jan 13 2026 - Alex

use crate::error::ParseError;
use crate::files::atom::{Atom, AtomContent, AtomHandler, AtomScope};
use crate::files::Ordinal;
use crate::format::constants::*;
use crate::format::endian::{MachView, Nlist};
use crate::format::mapping::InputMapping;
use crate::options::{LinkOptions, PackedVersion, Platform};
use std::path::{Path, PathBuf};

/// A defined external symbol pulled out of a relocatable file. The full
/// atom graph (sections, relocations) belongs to the atom-level parser;
/// the ingestion core only needs names, addresses and a data/text split
/// for archive member selection.
#[derive(Debug, Clone)]
pub struct ObjectSymbol {
    pub name: String,
    pub address: u64,
    pub weak_def: bool,
    pub is_data: bool,
}

pub struct ObjectFile {
    path: PathBuf,
    mod_time: i64,
    ordinal: Ordinal,
    mapping: InputMapping,
    symbols: Vec<ObjectSymbol>,
    linker_options: Vec<Vec<String>>,
    platform: Platform,
    min_os: PackedVersion,
}

impl ObjectFile {
    /// Probes and parses a thin Mach-O relocatable. Returns Ok(None) when
    /// the bytes are not a relocatable for the link architecture.
    pub fn parse(
        mapping: InputMapping,
        path: &Path,
        mod_time: i64,
        ordinal: Ordinal,
        options: &LinkOptions,
    ) -> Result<Option<ObjectFile>, ParseError> {
        let data = mapping.as_bytes();
        let view = match MachView::from_header(data) {
            Some(v) => v,
            None => return Ok(None),
        };
        let arch = match options.architecture {
            Some(a) => a,
            None => return Ok(None),
        };
        if view.is64() != arch.is_64bit() {
            return Ok(None);
        }
        let malformed = |reason: &str| ParseError::malformed(path, reason);
        if view.cpu_type().ok_or_else(|| malformed("truncated header"))? != arch.cpu_type() {
            return Ok(None);
        }
        if !options.allow_sub_architecture_mismatches
            && options.cpu_subtype != 0
            && view.cpu_subtype().ok_or_else(|| malformed("truncated header"))?
                != options.cpu_subtype
        {
            return Ok(None);
        }
        if view.filetype().ok_or_else(|| malformed("truncated header"))? != MH_OBJECT {
            return Ok(None);
        }

        let ncmds = view.ncmds().ok_or_else(|| malformed("truncated header"))?;
        let sizeofcmds = view.sizeofcmds().ok_or_else(|| malformed("truncated header"))? as usize;
        let cmds_end = view.header_size() + sizeofcmds;

        let mut symtab: Option<(usize, u32, usize, u32)> = None;
        let mut linker_options = Vec::new();
        let mut platform = Platform::Unknown;
        let mut min_os = PackedVersion::default();
        // global 1-based section index -> owning segment name
        let mut section_segments: Vec<String> = Vec::new();

        let mut off = view.header_size();
        for i in 0..ncmds {
            let cmd = view
                .get_u32(off)
                .ok_or_else(|| malformed(&format!("load command #{} truncated", i)))?;
            let cmdsize = view
                .get_u32(off + 4)
                .ok_or_else(|| malformed(&format!("load command #{} truncated", i)))? as usize;
            if cmdsize < 8 || off + cmdsize > cmds_end {
                return Err(malformed(&format!(
                    "load command #{} is outside size of load commands",
                    i
                )));
            }
            match cmd {
                LC_SYMTAB => {
                    let symoff = view.get_u32(off + 8).ok_or_else(|| malformed("bad LC_SYMTAB"))?;
                    let nsyms = view.get_u32(off + 12).ok_or_else(|| malformed("bad LC_SYMTAB"))?;
                    let stroff = view.get_u32(off + 16).ok_or_else(|| malformed("bad LC_SYMTAB"))?;
                    let strsize =
                        view.get_u32(off + 20).ok_or_else(|| malformed("bad LC_SYMTAB"))?;
                    if stroff as u64 + strsize as u64 > data.len() as u64 {
                        return Err(malformed("string pool extends beyond end of file"));
                    }
                    symtab = Some((symoff as usize, nsyms, stroff as usize, strsize));
                }
                LC_LINKER_OPTION => {
                    let count = view
                        .get_u32(off + 8)
                        .ok_or_else(|| malformed("bad LC_LINKER_OPTION"))?;
                    let blob = view
                        .bytes(off + 12, cmdsize - 12)
                        .ok_or_else(|| malformed("bad LC_LINKER_OPTION"))?;
                    let mut strings = Vec::new();
                    let mut start = 0usize;
                    for _ in 0..count {
                        let nul = blob[start..]
                            .iter()
                            .position(|&b| b == 0)
                            .ok_or_else(|| malformed("unterminated linker option"))?;
                        strings
                            .push(String::from_utf8_lossy(&blob[start..start + nul]).into_owned());
                        start += nul + 1;
                    }
                    linker_options.push(strings);
                }
                LC_VERSION_MIN_MACOSX
                | LC_VERSION_MIN_IPHONEOS
                | LC_VERSION_MIN_WATCHOS
                | LC_VERSION_MIN_TVOS => {
                    platform = Platform::from_load_command(cmd);
                    min_os = PackedVersion(
                        view.get_u32(off + 8)
                            .ok_or_else(|| malformed("bad version-min command"))?,
                    );
                }
                LC_SEGMENT | LC_SEGMENT_64 => {
                    let (nsects_off, sect0, sect_size) = if cmd == LC_SEGMENT_64 {
                        (64, SEGMENT_CMD_SIZE_64, SECTION_SIZE_64)
                    } else {
                        (48, SEGMENT_CMD_SIZE_32, SECTION_SIZE_32)
                    };
                    let nsects = view
                        .get_u32(off + nsects_off)
                        .ok_or_else(|| malformed("bad segment command"))?;
                    if sect0 + nsects as usize * sect_size > cmdsize {
                        return Err(malformed("section table past end of segment command"));
                    }
                    // relocatables keep one unnamed segment; each section
                    // carries its own segment name
                    for s in 0..nsects as usize {
                        let sect_off = off + sect0 + s * sect_size;
                        let sect_segname = view
                            .name16(sect_off + 16)
                            .ok_or_else(|| malformed("bad section"))?;
                        section_segments.push(sect_segname);
                    }
                }
                _ => {}
            }
            off += cmdsize;
        }

        let mut symbols = Vec::new();
        if let Some((symoff, nsyms, stroff, strsize)) = symtab {
            for idx in 0..nsyms as usize {
                let sym = Nlist::read(&view, symoff, idx)
                    .ok_or_else(|| malformed("symbol table extends beyond end of file"))?;
                if !sym.is_defined() || !sym.is_external() {
                    continue;
                }
                if sym.strx as u64 >= strsize as u64 {
                    return Err(malformed("symbol name outside string pool"));
                }
                let name = view
                    .cstr(stroff + sym.strx as usize)
                    .ok_or_else(|| malformed("unterminated symbol name"))?;
                let is_data = (sym.n_sect as usize)
                    .checked_sub(1)
                    .and_then(|i| section_segments.get(i))
                    .map(|seg| seg != "__TEXT")
                    .unwrap_or(false);
                symbols.push(ObjectSymbol {
                    name,
                    address: sym.n_value,
                    weak_def: sym.is_weak_def(),
                    is_data,
                });
            }
        }

        if options.log_all_files {
            log::debug!("{}", path.display());
        }

        Ok(Some(ObjectFile {
            path: path.to_path_buf(),
            mod_time,
            ordinal,
            mapping,
            symbols,
            linker_options,
            platform,
            min_os,
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

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn min_os(&self) -> PackedVersion {
        self.min_os
    }

    pub fn size(&self) -> usize {
        self.mapping.len()
    }

    pub fn symbols(&self) -> &[ObjectSymbol] {
        &self.symbols
    }

    /// Linker options embedded by the compiler, one group per
    /// LC_LINKER_OPTION command (e.g. ["-framework", "Foo"] or ["-lz"]).
    pub fn linker_options(&self) -> &[Vec<String>] {
        &self.linker_options
    }

    pub fn defines(&self, name: &str) -> Option<&ObjectSymbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn emit_atoms(&self, handler: &mut dyn AtomHandler) {
        for sym in &self.symbols {
            handler.do_atom(&Atom {
                name: sym.name.clone(),
                scope: AtomScope::Global,
                content: AtomContent::ObjectSymbol {
                    address: sym.address,
                    weak_def: sym.weak_def,
                    is_data: sym.is_data,
                },
                provider: Some(self.ordinal),
                provider_path: Some(self.path.clone()),
            });
        }
    }
}

