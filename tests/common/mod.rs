// Tue Jan 15 2026 - Alex
//
// Builders that synthesize just enough Mach-O to exercise the ingestion
// paths: thin objects, dylibs (classical symbol table or export trie),
// universal wrappers, and static archives.

#![allow(dead_code)]

use machld::format::constants::*;
use machld::options::{Architecture, LinkOptions, PackedVersion};
use machld::{Atom, AtomHandler, Ordinal};
use std::path::{Path, PathBuf};

pub struct Writer {
    pub data: Vec<u8>,
}

impl Writer {
    pub fn new() -> Writer {
        Writer { data: Vec::new() }
    }

    pub fn u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u64(&mut self, v: u64) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn name16(&mut self, name: &str) {
        let mut field = [0u8; 16];
        field[..name.len()].copy_from_slice(name.as_bytes());
        self.data.extend_from_slice(&field);
    }

    pub fn bytes(&mut self, b: &[u8]) {
        self.data.extend_from_slice(b);
    }
}

fn padded_str_len(s: &str) -> usize {
    let raw = s.len() + 1;
    (raw + 7) & !7
}

fn push_padded_str(w: &mut Writer, s: &str, padded: usize) {
    w.bytes(s.as_bytes());
    for _ in s.len()..padded {
        w.u8(0);
    }
}

struct NlistEntry {
    name: String,
    n_type: u8,
    n_sect: u8,
    n_desc: u16,
    n_value: u64,
}

fn write_symtab(entries: &[NlistEntry]) -> (Vec<u8>, Vec<u8>) {
    let mut strings = vec![0u8];
    let mut table = Writer::new();
    for e in entries {
        let strx = strings.len() as u32;
        strings.extend_from_slice(e.name.as_bytes());
        strings.push(0);
        table.u32(strx);
        table.u8(e.n_type);
        table.u8(e.n_sect);
        table.u16(e.n_desc);
        table.u64(e.n_value);
    }
    (table.data, strings)
}

// ---------------------------------------------------------------------------
// objects

pub struct ObjectBuilder {
    arch: Architecture,
    text_symbols: Vec<(String, u64, bool)>,
    data_symbols: Vec<(String, u64)>,
    local_symbols: Vec<(String, u64)>,
    linker_options: Vec<Vec<String>>,
}

impl ObjectBuilder {
    pub fn new(arch: Architecture) -> ObjectBuilder {
        assert!(arch.is_64bit(), "builders emit 64-bit files");
        ObjectBuilder {
            arch,
            text_symbols: Vec::new(),
            data_symbols: Vec::new(),
            local_symbols: Vec::new(),
            linker_options: Vec::new(),
        }
    }

    pub fn symbol(mut self, name: &str, address: u64, weak: bool) -> Self {
        self.text_symbols.push((name.to_string(), address, weak));
        self
    }

    pub fn data_symbol(mut self, name: &str, address: u64) -> Self {
        self.data_symbols.push((name.to_string(), address));
        self
    }

    pub fn local_symbol(mut self, name: &str, address: u64) -> Self {
        self.local_symbols.push((name.to_string(), address));
        self
    }

    pub fn linker_option(mut self, parts: &[&str]) -> Self {
        self.linker_options
            .push(parts.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut entries = Vec::new();
        for (name, value) in &self.local_symbols {
            entries.push(NlistEntry {
                name: name.clone(),
                n_type: N_SECT, // not external
                n_sect: 1,
                n_desc: 0,
                n_value: *value,
            });
        }
        for (name, value, weak) in &self.text_symbols {
            entries.push(NlistEntry {
                name: name.clone(),
                n_type: N_SECT | N_EXT,
                n_sect: 1,
                n_desc: if *weak { N_WEAK_DEF } else { 0 },
                n_value: *value,
            });
        }
        for (name, value) in &self.data_symbols {
            entries.push(NlistEntry {
                name: name.clone(),
                n_type: N_SECT | N_EXT,
                n_sect: 2,
                n_desc: 0,
                n_value: *value,
            });
        }

        let seg_cmdsize = (SEGMENT_CMD_SIZE_64 + 2 * SECTION_SIZE_64) as u32;
        let mut lopt_sizes = Vec::new();
        for group in &self.linker_options {
            let raw: usize = group.iter().map(|s| s.len() + 1).sum();
            lopt_sizes.push(((12 + raw + 7) & !7) as u32);
        }
        let symtab_cmdsize = 24u32;
        let sizeofcmds =
            seg_cmdsize + lopt_sizes.iter().sum::<u32>() + symtab_cmdsize;
        let ncmds = 2 + self.linker_options.len() as u32;

        let symoff = MACHO_HEADER_SIZE_64 as u32 + sizeofcmds;
        let (table, strings) = write_symtab(&entries);
        let stroff = symoff + table.len() as u32;

        let mut w = Writer::new();
        w.u32(MH_MAGIC_64);
        w.u32(self.arch.cpu_type());
        w.u32(0);
        w.u32(MH_OBJECT);
        w.u32(ncmds);
        w.u32(sizeofcmds);
        w.u32(0); // flags
        w.u32(0); // reserved

        // one unnamed segment, sections carry their own segment names
        w.u32(LC_SEGMENT_64);
        w.u32(seg_cmdsize);
        w.name16("");
        w.u64(0); // vmaddr
        w.u64(0x2000); // vmsize
        w.u64(0); // fileoff
        w.u64(0); // filesize
        w.u32(7); // maxprot
        w.u32(5); // initprot
        w.u32(2); // nsects
        w.u32(0); // flags
        for (sect, seg) in [("__text", "__TEXT"), ("__data", "__DATA")] {
            w.name16(sect);
            w.name16(seg);
            w.u64(0); // addr
            w.u64(0); // size
            w.u32(0); // offset
            w.u32(0); // align
            w.u32(0); // reloff
            w.u32(0); // nreloc
            w.u32(0); // flags
            w.u32(0);
            w.u32(0);
            w.u32(0);
        }

        for (group, cmdsize) in self.linker_options.iter().zip(&lopt_sizes) {
            w.u32(LC_LINKER_OPTION);
            w.u32(*cmdsize);
            w.u32(group.len() as u32);
            let start = w.data.len();
            for s in group {
                w.bytes(s.as_bytes());
                w.u8(0);
            }
            while (w.data.len() - start) + 12 < *cmdsize as usize {
                w.u8(0);
            }
        }

        w.u32(LC_SYMTAB);
        w.u32(symtab_cmdsize);
        w.u32(symoff);
        w.u32(entries.len() as u32);
        w.u32(stroff);
        w.u32(strings.len() as u32);

        assert_eq!(w.data.len(), symoff as usize);
        w.bytes(&table);
        w.bytes(&strings);
        w.data
    }
}

// ---------------------------------------------------------------------------
// dylibs

pub struct DylibBuilder {
    arch: Architecture,
    filetype: u32,
    flags: u32,
    install_name: Option<String>,
    current_version: u32,
    compat_version: u32,
    deps: Vec<(String, u32)>,
    sub_framework: Option<String>,
    sub_clients: Vec<String>,
    sub_umbrellas: Vec<String>,
    sub_libraries: Vec<String>,
    version_min: Option<(u32, u32)>,
    exports: Vec<(String, u64, bool)>,
    undefs: Vec<String>,
    trie: Option<Vec<u8>>,
    blank_stub: bool,
}

impl DylibBuilder {
    pub fn new(arch: Architecture, install_name: &str) -> DylibBuilder {
        assert!(arch.is_64bit(), "builders emit 64-bit files");
        DylibBuilder {
            arch,
            filetype: MH_DYLIB,
            flags: MH_TWOLEVEL,
            install_name: Some(install_name.to_string()),
            current_version: PackedVersion::new(1, 0, 0).0,
            compat_version: PackedVersion::new(1, 0, 0).0,
            deps: Vec::new(),
            sub_framework: None,
            sub_clients: Vec::new(),
            sub_umbrellas: Vec::new(),
            sub_libraries: Vec::new(),
            version_min: None,
            exports: Vec::new(),
            undefs: Vec::new(),
            trie: None,
            blank_stub: false,
        }
    }

    /// A main executable usable via -bundle_loader: no LC_ID_DYLIB.
    pub fn executable(arch: Architecture) -> DylibBuilder {
        let mut builder = DylibBuilder::new(arch, "");
        builder.install_name = None;
        builder.filetype = MH_EXECUTE;
        builder
    }

    pub fn blank_stub(arch: Architecture) -> Vec<u8> {
        let mut w = Writer::new();
        w.u32(MH_MAGIC_64);
        w.u32(arch.cpu_type());
        w.u32(0);
        w.u32(MH_DYLIB_STUB);
        w.u32(0);
        w.u32(0);
        w.u32(0);
        w.u32(0);
        w.data
    }

    pub fn flag(mut self, flag: u32) -> Self {
        self.flags |= flag;
        self
    }

    pub fn flat(mut self) -> Self {
        self.flags &= !MH_TWOLEVEL;
        self
    }

    pub fn export(mut self, name: &str, address: u64) -> Self {
        self.exports.push((name.to_string(), address, false));
        self
    }

    pub fn weak_export(mut self, name: &str, address: u64) -> Self {
        self.exports.push((name.to_string(), address, true));
        self.flags |= MH_WEAK_DEFINES;
        self
    }

    pub fn undef(mut self, name: &str) -> Self {
        self.undefs.push(name.to_string());
        self
    }

    pub fn load_dylib(mut self, path: &str) -> Self {
        self.deps.push((path.to_string(), LC_LOAD_DYLIB));
        self
    }

    pub fn reexport_dylib(mut self, path: &str) -> Self {
        self.deps.push((path.to_string(), LC_REEXPORT_DYLIB));
        self
    }

    pub fn sub_framework(mut self, umbrella: &str) -> Self {
        self.sub_framework = Some(umbrella.to_string());
        self
    }

    pub fn sub_client(mut self, client: &str) -> Self {
        self.sub_clients.push(client.to_string());
        self
    }

    pub fn sub_umbrella(mut self, name: &str) -> Self {
        self.sub_umbrellas.push(name.to_string());
        self
    }

    pub fn sub_library(mut self, name: &str) -> Self {
        self.sub_libraries.push(name.to_string());
        self
    }

    pub fn version_min(mut self, cmd: u32, version: PackedVersion) -> Self {
        self.version_min = Some((cmd, version.0));
        self
    }

    pub fn export_trie(mut self, trie: Vec<u8>) -> Self {
        self.trie = Some(trie);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut entries = Vec::new();
        for (name, value, weak) in &self.exports {
            entries.push(NlistEntry {
                name: name.clone(),
                n_type: N_SECT | N_EXT,
                n_sect: 1,
                n_desc: if *weak { N_WEAK_DEF } else { 0 },
                n_value: *value,
            });
        }
        for name in &self.undefs {
            entries.push(NlistEntry {
                name: name.clone(),
                n_type: N_EXT, // undefined external
                n_sect: 0,
                n_desc: 0,
                n_value: 0,
            });
        }

        let mut ncmds = 2u32; // symtab + dysymtab
        let mut sizeofcmds = 24 + 80;
        if let Some(name) = &self.install_name {
            ncmds += 1;
            sizeofcmds += 24 + padded_str_len(name);
        }
        for (path, _) in &self.deps {
            ncmds += 1;
            sizeofcmds += 24 + padded_str_len(path);
        }
        if let Some(name) = &self.sub_framework {
            ncmds += 1;
            sizeofcmds += 12 + padded_str_len(name) + 4; // keep 8-aligned
        }
        for name in self
            .sub_clients
            .iter()
            .chain(&self.sub_umbrellas)
            .chain(&self.sub_libraries)
        {
            ncmds += 1;
            sizeofcmds += 12 + padded_str_len(name) + 4;
        }
        if self.version_min.is_some() {
            ncmds += 1;
            sizeofcmds += 16;
        }
        if self.trie.is_some() {
            ncmds += 1;
            sizeofcmds += 48;
        }

        let symoff = MACHO_HEADER_SIZE_64 + sizeofcmds;
        let (table, strings) = write_symtab(&entries);
        let stroff = symoff + table.len();
        let trie_off = stroff + strings.len();

        let mut w = Writer::new();
        w.u32(MH_MAGIC_64);
        w.u32(self.arch.cpu_type());
        w.u32(0);
        w.u32(self.filetype);
        w.u32(ncmds);
        w.u32(sizeofcmds as u32);
        w.u32(self.flags);
        w.u32(0);

        if let Some(name) = &self.install_name {
            let cmdsize = 24 + padded_str_len(name);
            w.u32(LC_ID_DYLIB);
            w.u32(cmdsize as u32);
            w.u32(24); // name offset
            w.u32(1); // timestamp
            w.u32(self.current_version);
            w.u32(self.compat_version);
            push_padded_str(&mut w, name, padded_str_len(name));
        }
        for (path, cmd) in &self.deps {
            let cmdsize = 24 + padded_str_len(path);
            w.u32(*cmd);
            w.u32(cmdsize as u32);
            w.u32(24);
            w.u32(2);
            w.u32(0x10000);
            w.u32(0x10000);
            push_padded_str(&mut w, path, padded_str_len(path));
        }

        let mut lc_str_cmd = |w: &mut Writer, cmd: u32, name: &str| {
            let cmdsize = 12 + padded_str_len(name) + 4;
            w.u32(cmd);
            w.u32(cmdsize as u32);
            w.u32(12);
            push_padded_str(w, name, padded_str_len(name) + 4);
        };
        if let Some(name) = &self.sub_framework {
            lc_str_cmd(&mut w, LC_SUB_FRAMEWORK, name);
        }
        for name in &self.sub_clients {
            lc_str_cmd(&mut w, LC_SUB_CLIENT, name);
        }
        for name in &self.sub_umbrellas {
            lc_str_cmd(&mut w, LC_SUB_UMBRELLA, name);
        }
        for name in &self.sub_libraries {
            lc_str_cmd(&mut w, LC_SUB_LIBRARY, name);
        }

        if let Some((cmd, version)) = self.version_min {
            w.u32(cmd);
            w.u32(16);
            w.u32(version);
            w.u32(version); // sdk
        }

        if let Some(trie) = &self.trie {
            w.u32(LC_DYLD_INFO_ONLY);
            w.u32(48);
            for _ in 0..8 {
                w.u32(0); // rebase/bind/weak/lazy off+size
            }
            w.u32(trie_off as u32);
            w.u32(trie.len() as u32);
        }

        w.u32(LC_SYMTAB);
        w.u32(24);
        w.u32(symoff as u32);
        w.u32(entries.len() as u32);
        w.u32(stroff as u32);
        w.u32(strings.len() as u32);

        w.u32(LC_DYSYMTAB);
        w.u32(80);
        w.u32(0); // ilocalsym
        w.u32(0); // nlocalsym
        w.u32(0); // iextdefsym
        w.u32(self.exports.len() as u32); // nextdefsym
        w.u32(self.exports.len() as u32); // iundefsym
        w.u32(self.undefs.len() as u32); // nundefsym
        for _ in 0..12 {
            w.u32(0); // toc, modtab, extref, indirect, extrel, locrel
        }

        assert_eq!(w.data.len(), symoff);
        w.bytes(&table);
        w.bytes(&strings);
        if let Some(trie) = &self.trie {
            w.bytes(trie);
        }
        w.data
    }
}

fn uleb(mut v: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if v == 0 {
            break;
        }
    }
}

/// A flat export trie: the root fans out one fully-labeled edge per symbol.
pub fn tiny_trie(symbols: &[(&str, u64, u64)]) -> Vec<u8> {
    let mut root_size = 2; // terminal size 0 + child count
    for (name, _, _) in symbols {
        root_size += name.len() + 1 + 3; // label, nul, fixed 3-byte offset
    }
    let mut nodes: Vec<Vec<u8>> = Vec::new();
    let mut offsets = Vec::new();
    let mut at = root_size;
    for &(_, flags, address) in symbols {
        let mut body = Vec::new();
        uleb(flags, &mut body);
        uleb(address, &mut body);
        let mut node = Vec::new();
        uleb(body.len() as u64, &mut node);
        node.extend_from_slice(&body);
        node.push(0); // no children
        offsets.push(at);
        at += node.len();
        nodes.push(node);
    }
    let mut out = vec![0u8, symbols.len() as u8];
    for ((name, _, _), off) in symbols.iter().zip(&offsets) {
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        out.push((*off & 0x7f) as u8 | 0x80);
        out.push(((*off >> 7) & 0x7f) as u8 | 0x80);
        out.push(((*off >> 14) & 0x7f) as u8);
    }
    assert_eq!(out.len(), root_size);
    for node in nodes {
        out.extend_from_slice(&node);
    }
    out
}

// ---------------------------------------------------------------------------
// wrappers

/// Universal wrapper; each slice lands at the next multiple of `align_to`.
pub fn fat_wrap(slices: &[(Architecture, &[u8])], align_to: usize) -> Vec<u8> {
    let mut header = Writer::new();
    header.data.extend_from_slice(&FAT_MAGIC.to_be_bytes());
    header
        .data
        .extend_from_slice(&(slices.len() as u32).to_be_bytes());

    let mut offset = FAT_HEADER_SIZE + slices.len() * FAT_ARCH_SIZE;
    let mut placed = Vec::new();
    for (arch, bytes) in slices {
        offset = (offset + align_to - 1) / align_to * align_to;
        placed.push((offset, *arch, *bytes));
        offset += bytes.len();
    }
    for (off, arch, bytes) in &placed {
        header.data.extend_from_slice(&arch.cpu_type().to_be_bytes());
        header.data.extend_from_slice(&0u32.to_be_bytes());
        header.data.extend_from_slice(&(*off as u32).to_be_bytes());
        header
            .data
            .extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        header.data.extend_from_slice(&0u32.to_be_bytes()); // align
    }
    let mut out = header.data;
    for (off, _, bytes) in &placed {
        out.resize(*off, 0);
        out.extend_from_slice(*bytes);
    }
    out
}

pub fn ar_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = ARCHIVE_MAGIC.to_vec();
    for (name, payload) in members {
        out.extend_from_slice(format!("{:<16}", name).as_bytes());
        out.extend_from_slice(format!("{:<12}", 0).as_bytes());
        out.extend_from_slice(format!("{:<6}", 0).as_bytes());
        out.extend_from_slice(format!("{:<6}", 0).as_bytes());
        out.extend_from_slice(format!("{:<8}", "100644").as_bytes());
        out.extend_from_slice(format!("{:<10}", payload.len()).as_bytes());
        out.extend_from_slice(b"`\n");
        out.extend_from_slice(payload);
        if out.len() & 1 == 1 {
            out.push(b'\n');
        }
    }
    out
}

// ---------------------------------------------------------------------------
// harness

pub fn write_input(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

pub fn base_options(arch: Architecture) -> LinkOptions {
    let mut options = LinkOptions::default();
    options.architecture = Some(arch);
    options.min_os_version = PackedVersion::new(10, 9, 0);
    options
}

pub fn input(options: &mut LinkOptions, path: &Path) -> usize {
    let info = machld::FileInfo::new(path).expect("stat fixture");
    options.inputs.push(info);
    options.inputs.len() - 1
}

/// Records every doFile/doAtom callback in order.
#[derive(Default)]
pub struct Collector {
    pub files: Vec<PathBuf>,
    pub ordinals: Vec<Ordinal>,
    pub atoms: Vec<Atom>,
}

impl AtomHandler for Collector {
    fn do_file(&mut self, path: &Path, ordinal: Ordinal) {
        self.files.push(path.to_path_buf());
        self.ordinals.push(ordinal);
    }

    fn do_atom(&mut self, atom: &Atom) {
        self.atoms.push(atom.clone());
    }
}

impl Collector {
    pub fn atom_names(&self) -> Vec<&str> {
        self.atoms.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.name == name)
    }
}
