// Tue Jan 13 2026 - Alex

use crate::dylib::exports::ExportTableBuilder;
use crate::dylib::file::{Dependent, DylibFile, DylibInit, ObjcConstraint};
use crate::dylib::trie::parse_export_trie;
use crate::error::ParseError;
use crate::files::textstub::{self, TextStub};
use crate::files::Ordinal;
use crate::format::constants::*;
use crate::format::endian::{MachView, Nlist};
use crate::format::mapping::InputMapping;
use crate::options::{Architecture, LinkOptions, OutputKind, PackedVersion, Platform};
use std::path::Path;
use std::sync::Arc;

#[derive(Default)]
struct SymtabInfo {
    symoff: usize,
    nsyms: u32,
    stroff: usize,
    strsize: u32,
}

#[derive(Default)]
struct DysymtabInfo {
    iextdefsym: u32,
    nextdefsym: u32,
    iundefsym: u32,
    nundefsym: u32,
    tocoff: usize,
    ntoc: u32,
}

/// Only dylibs in standard public locations may be hoisted to direct
/// dependencies when re-exported.
fn is_public_location(path: &str, hoist: bool) -> bool {
    if !hoist {
        return false;
    }
    if let Some(rest) = path.strip_prefix("/usr/lib/") {
        return !rest.contains('/');
    }
    if let Some(rest) = path.strip_prefix("/System/Library/Frameworks/") {
        // only a top-level framework's main dylib counts:
        //   /System/Library/Frameworks/Foo.framework/Versions/A/Foo    yes
        //   /System/Library/Frameworks/Foo.framework/Resources/libBar  no
        if let Some(dot) = rest.find('.') {
            let name = &rest[..dot];
            let mut suffix = String::with_capacity(name.len() + 1);
            suffix.push('/');
            suffix.push_str(name);
            return path.ends_with(&suffix);
        }
    }
    false
}

fn platform_description(platform: Platform, simulator: bool) -> String {
    if simulator {
        format!("{} simulator", platform.name())
    } else {
        platform.name().to_string()
    }
}

/// Applies the cross-linking compatibility policy. Returns whether the
/// dylib is for the wrong OS; hard mismatches on known platforms fail.
fn check_platform(
    lc_platform: Platform,
    options: &LinkOptions,
    path: &Path,
    indirect_dylib: bool,
) -> Result<bool, ParseError> {
    if lc_platform == options.platform {
        return Ok(false);
    }
    let ignore_mismatch = options.output_kind == OutputKind::Preload;
    if !options.add_version_load_command || indirect_dylib || ignore_mismatch {
        return Ok(true);
    }
    if options.building_for_simulator && options.allow_simulator_to_link_with_macosx {
        return Ok(true);
    }
    let mismatch = || ParseError::PlatformMismatch {
        path: path.to_path_buf(),
        building: platform_description(options.platform, options.building_for_simulator),
        linking: lc_platform.name().to_string(),
    };
    match options.platform {
        Platform::MacOsx | Platform::Ios => {
            if lc_platform != Platform::Unknown {
                return Err(mismatch());
            }
        }
        Platform::WatchOs => return Err(mismatch()),
        Platform::TvOs => {
            // grandfathered: an error only once bitcode is in play
            if options.using_bitcode {
                return Err(mismatch());
            }
            log::warn!(
                "URGENT: building for {}, but linking against dylib ({}) built for {}. \
                 Note: This will be an error in the future.",
                platform_description(options.platform, options.building_for_simulator),
                path.display(),
                lc_platform.name()
            );
        }
        Platform::Unknown => {}
    }
    Ok(true)
}

/// Parses a Mach-O dynamic library (or a bundle/executable used as a
/// bundle loader). All exported names end up in an owned hash table and
/// the mapping is released; Ok(None) means "not a dylib for this
/// architecture".
pub fn parse(
    mapping: &InputMapping,
    path: &Path,
    mod_time: i64,
    ordinal: Ordinal,
    options: &LinkOptions,
    bundle_loader: bool,
    indirect_dylib: bool,
) -> Result<Option<Arc<DylibFile>>, ParseError> {
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
    let malformed = |reason: String| ParseError::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    if view.cpu_type().ok_or_else(|| malformed("truncated header".into()))? != arch.cpu_type() {
        return Ok(None);
    }
    let filetype = view
        .filetype()
        .ok_or_else(|| malformed("truncated header".into()))?;
    match filetype {
        MH_DYLIB | MH_DYLIB_STUB => {}
        MH_BUNDLE => {
            if !bundle_loader {
                return Err(ParseError::Policy {
                    path: path.to_path_buf(),
                    reason: "can't link with bundle (MH_BUNDLE) only dylibs (MH_DYLIB)".into(),
                });
            }
        }
        MH_EXECUTE => {
            if !bundle_loader {
                return Err(ParseError::Policy {
                    path: path.to_path_buf(),
                    reason: "can't link with a main executable".into(),
                });
            }
        }
        _ => return Ok(None),
    }

    if options.log_all_files {
        log::debug!("{}", path.display());
    }

    let ncmds = view.ncmds().ok_or_else(|| malformed("truncated header".into()))?;
    let sizeofcmds = view
        .sizeofcmds()
        .ok_or_else(|| malformed("truncated header".into()))? as usize;
    let flags = view.flags().ok_or_else(|| malformed("truncated header".into()))?;

    let linking_flat = options.flat_namespace();

    // a "blank" stub has zero load commands and nothing to offer
    if filetype == MH_DYLIB_STUB && ncmds == 0 {
        return Ok(Some(DylibFile::new(DylibInit {
            path: path.to_path_buf(),
            mod_time,
            ordinal,
            install_path: None,
            timestamp: 0,
            current_version: PackedVersion::default(),
            compatibility_version: PackedVersion::default(),
            parent_umbrella: None,
            allowable_clients: Vec::new(),
            objc_constraint: ObjcConstraint::None,
            swift_version: 0,
            platform_in_dylib: Platform::Unknown,
            min_version_in_dylib: PackedVersion::default(),
            has_weak_exports: false,
            dead_strippable: false,
            app_extension_safe: false,
            has_public_install_name: false,
            install_path_overridden: false,
            wrong_os: false,
            no_reexports: true,
            explicit_reexport_found: false,
            linking_flat,
            bitcode_size: None,
            is_bundle_loader: bundle_loader,
            dependents: Vec::new(),
            exports: Default::default(),
            ignore_exports: Default::default(),
            import_atom_undefs: None,
        })));
    }

    // bundles and executables can only arrive via -bundle_loader, and
    // neither can re-export anything
    let no_reexports = (flags & MH_NO_REEXPORTED_DYLIBS != 0)
        || filetype == MH_BUNDLE
        || filetype == MH_EXECUTE;
    let has_weak_exports = flags & MH_WEAK_DEFINES != 0;
    let dead_strippable = flags & MH_DEAD_STRIPPABLE_DYLIB != 0;
    let app_extension_safe = flags & MH_APP_EXTENSION_SAFE != 0;

    let cmds_end = view.header_size() + sizeofcmds;

    // pass 1: pointers, metadata, and the compressed-linkedit decision
    let mut symtab: Option<SymtabInfo> = None;
    let mut dysymtab: Option<DysymtabInfo> = None;
    let mut dyld_info: Option<(usize, usize)> = None; // export_off, export_size
    let mut compressed_link_edit = false;
    let mut install_path: Option<String> = None;
    let mut timestamp = 0u32;
    let mut current_version = PackedVersion::default();
    let mut compatibility_version = PackedVersion::default();
    let mut has_public_install_name = false;
    let mut dependent_lib_count = 0usize;
    let mut explicit_reexport_found = false;
    let mut parent_umbrella: Option<String> = None;
    let mut allowable_clients: Vec<String> = Vec::new();
    let mut lc_platform = Platform::Unknown;
    let mut min_version_in_dylib = PackedVersion::default();
    let mut objc_constraint = ObjcConstraint::None;
    let mut swift_version = 0u8;
    let mut bitcode_size: Option<u64> = None;

    let (objc_segment, objc_section) = arch.objc_info_section();

    let mut off = view.header_size();
    for i in 0..ncmds {
        let cmd = view
            .get_u32(off)
            .ok_or_else(|| malformed(format!("load command #{} truncated", i)))?;
        let cmdsize = view
            .get_u32(off + 4)
            .ok_or_else(|| malformed(format!("load command #{} truncated", i)))?
            as usize;
        if cmdsize < 8 || off + cmdsize > cmds_end {
            return Err(malformed(format!(
                "load command #{} is outside size of load commands",
                i
            )));
        }
        match cmd {
            LC_SYMTAB => {
                let stroff = view.get_u32(off + 16).ok_or_else(|| malformed("bad LC_SYMTAB".into()))?;
                let strsize = view.get_u32(off + 20).ok_or_else(|| malformed("bad LC_SYMTAB".into()))?;
                if stroff as u64 + strsize as u64 > data.len() as u64 {
                    return Err(malformed("string pool extends beyond end of file".into()));
                }
                symtab = Some(SymtabInfo {
                    symoff: view.get_u32(off + 8).ok_or_else(|| malformed("bad LC_SYMTAB".into()))?
                        as usize,
                    nsyms: view.get_u32(off + 12).ok_or_else(|| malformed("bad LC_SYMTAB".into()))?,
                    stroff: stroff as usize,
                    strsize,
                });
            }
            LC_DYSYMTAB => {
                let read = |field: usize| {
                    view.get_u32(off + field)
                        .ok_or_else(|| malformed("bad LC_DYSYMTAB".into()))
                };
                dysymtab = Some(DysymtabInfo {
                    iextdefsym: read(16)?,
                    nextdefsym: read(20)?,
                    iundefsym: read(24)?,
                    nundefsym: read(28)?,
                    tocoff: read(32)? as usize,
                    ntoc: read(36)?,
                });
            }
            LC_DYLD_INFO | LC_DYLD_INFO_ONLY => {
                let export_off = view
                    .get_u32(off + 40)
                    .ok_or_else(|| malformed("bad LC_DYLD_INFO".into()))?;
                let export_size = view
                    .get_u32(off + 44)
                    .ok_or_else(|| malformed("bad LC_DYLD_INFO".into()))?;
                dyld_info = Some((export_off as usize, export_size as usize));
                compressed_link_edit = true;
            }
            LC_ID_DYLIB => {
                let name_off = view
                    .get_u32(off + 8)
                    .ok_or_else(|| malformed("bad LC_ID_DYLIB".into()))? as usize;
                let name = view
                    .cstr(off + name_off)
                    .ok_or_else(|| malformed("bad LC_ID_DYLIB name".into()))?;
                has_public_install_name =
                    is_public_location(&name, options.implicitly_link_indirect_public_dylibs);
                install_path = Some(name);
                timestamp = view
                    .get_u32(off + 12)
                    .ok_or_else(|| malformed("bad LC_ID_DYLIB".into()))?;
                current_version = PackedVersion(
                    view.get_u32(off + 16)
                        .ok_or_else(|| malformed("bad LC_ID_DYLIB".into()))?,
                );
                compatibility_version = PackedVersion(
                    view.get_u32(off + 20)
                        .ok_or_else(|| malformed("bad LC_ID_DYLIB".into()))?,
                );
            }
            LC_LOAD_DYLIB | LC_LOAD_WEAK_DYLIB => {
                dependent_lib_count += 1;
            }
            LC_REEXPORT_DYLIB => {
                explicit_reexport_found = true;
                dependent_lib_count += 1;
            }
            LC_SUB_FRAMEWORK => {
                let name_off = view
                    .get_u32(off + 8)
                    .ok_or_else(|| malformed("bad LC_SUB_FRAMEWORK".into()))?
                    as usize;
                parent_umbrella = Some(
                    view.cstr(off + name_off)
                        .ok_or_else(|| malformed("bad LC_SUB_FRAMEWORK".into()))?,
                );
            }
            LC_SUB_CLIENT => {
                let name_off = view
                    .get_u32(off + 8)
                    .ok_or_else(|| malformed("bad LC_SUB_CLIENT".into()))?
                    as usize;
                allowable_clients.push(
                    view.cstr(off + name_off)
                        .ok_or_else(|| malformed("bad LC_SUB_CLIENT".into()))?,
                );
                // restricted dylibs are not candidates for implicit linking
                has_public_install_name = false;
            }
            LC_VERSION_MIN_MACOSX
            | LC_VERSION_MIN_IPHONEOS
            | LC_VERSION_MIN_WATCHOS
            | LC_VERSION_MIN_TVOS => {
                min_version_in_dylib = PackedVersion(
                    view.get_u32(off + 8)
                        .ok_or_else(|| malformed("bad version-min command".into()))?,
                );
                lc_platform = Platform::from_load_command(cmd);
            }
            LC_SEGMENT | LC_SEGMENT_64 => {
                let (nsects_off, sect0, sect_size) = if cmd == LC_SEGMENT_64 {
                    (64, SEGMENT_CMD_SIZE_64, SECTION_SIZE_64)
                } else {
                    (48, SEGMENT_CMD_SIZE_32, SECTION_SIZE_32)
                };
                let segname = view
                    .name16(off + 8)
                    .ok_or_else(|| malformed("bad segment command".into()))?;
                let nsects = view
                    .get_u32(off + nsects_off)
                    .ok_or_else(|| malformed("bad segment command".into()))?
                    as usize;
                if sect0 + nsects * sect_size > cmdsize {
                    return Err(malformed("section table past end of segment command".into()));
                }
                if segname.starts_with(objc_segment) {
                    for s in 0..nsects {
                        let sect_off = off + sect0 + s * sect_size;
                        let sectname = view
                            .name16(sect_off)
                            .ok_or_else(|| malformed("bad section".into()))?;
                        if sectname != objc_section {
                            continue;
                        }
                        let (size, content_off) = if cmd == LC_SEGMENT_64 {
                            (
                                view.get_u64(sect_off + 40)
                                    .ok_or_else(|| malformed("bad section".into()))?,
                                view.get_u32(sect_off + 48)
                                    .ok_or_else(|| malformed("bad section".into()))?,
                            )
                        } else {
                            (
                                view.get_u32(sect_off + 36)
                                    .ok_or_else(|| malformed("bad section".into()))?
                                    as u64,
                                view.get_u32(sect_off + 40)
                                    .ok_or_else(|| malformed("bad section".into()))?,
                            )
                        };
                        let version = view.get_u32(content_off as usize);
                        if size >= 8 && version == Some(0) {
                            let info_flags = view
                                .get_u32(content_off as usize + 4)
                                .ok_or_else(|| malformed("bad objc image info".into()))?;
                            objc_constraint = if info_flags & OBJC_IMAGE_GC_ONLY != 0 {
                                ObjcConstraint::GC
                            } else if info_flags & OBJC_IMAGE_SUPPORTS_GC != 0 {
                                ObjcConstraint::RetainReleaseOrGC
                            } else if info_flags & OBJC_IMAGE_IS_SIMULATED != 0 {
                                ObjcConstraint::RetainReleaseForSimulator
                            } else {
                                ObjcConstraint::RetainRelease
                            };
                            swift_version = ((info_flags >> 8) & 0xff) as u8;
                        } else if size > 0 {
                            log::warn!(
                                "can't parse {}/{} section in {}",
                                objc_segment,
                                objc_section,
                                path.display()
                            );
                        }
                    }
                } else if segname == "__LLVM" && nsects > 0 {
                    // record only the size; the bundle content is opaque here
                    let sectname = view
                        .name16(off + sect0)
                        .ok_or_else(|| malformed("bad section".into()))?;
                    if sectname.starts_with("__bundle") {
                        let size = if cmd == LC_SEGMENT_64 {
                            view.get_u64(off + sect0 + 40)
                                .ok_or_else(|| malformed("bad section".into()))?
                        } else {
                            view.get_u32(off + sect0 + 36)
                                .ok_or_else(|| malformed("bad section".into()))?
                                as u64
                        };
                        bitcode_size = Some(size);
                    }
                }
            }
            _ => {}
        }
        off += cmdsize;
    }

    // arm targets without a version-min command predate the load command
    // and are iOS
    if lc_platform == Platform::Unknown
        && matches!(arch, Architecture::Arm | Architecture::Arm64)
    {
        lc_platform = Platform::Ios;
    }

    let wrong_os = check_platform(lc_platform, options, path, indirect_dylib)?;

    // with compressed LINKEDIT, MH_NO_REEXPORTED_DYLIBS can be trusted
    let process_dependents = !(compressed_link_edit && no_reexports && !linking_flat);

    let mut dependents: Vec<Dependent> = Vec::new();
    if process_dependents {
        dependents.reserve(dependent_lib_count);
        let mut reexport_count = 0usize;
        let mut off = view.header_size();
        for _ in 0..ncmds {
            let cmd = view.get_u32(off).unwrap_or(0);
            let cmdsize = view.get_u32(off + 4).unwrap_or(8) as usize;
            let mut record = false;
            match cmd {
                LC_LOAD_DYLIB | LC_LOAD_WEAK_DYLIB => {
                    // with compressed linkedit only re-exports matter
                    record = !(compressed_link_edit && !linking_flat);
                }
                LC_REEXPORT_DYLIB => record = true,
                _ => {}
            }
            if record {
                reexport_count += 1;
                let name_off = view
                    .get_u32(off + 8)
                    .ok_or_else(|| malformed("bad dylib load command".into()))?
                    as usize;
                let dep_path = view
                    .cstr(off + name_off)
                    .ok_or_else(|| malformed("bad dylib load command name".into()))?;
                // a dylib that names the output being linked would re-export
                // straight back into us
                if options.install_path.as_deref() != Some(dep_path.as_str()) {
                    dependents.push(Dependent::new(dep_path, cmd == LC_REEXPORT_DYLIB));
                }
            }
            off += cmdsize;
        }
        if compressed_link_edit && !linking_flat && reexport_count == 0 {
            return Err(malformed(
                "has MH_NO_REEXPORTED_DYLIBS flag but no LC_REEXPORT_DYLIB load commands".into(),
            ));
        }

        // pass 3: LC_SUB_UMBRELLA / LC_SUB_LIBRARY retroactively mark
        // matching dependents as re-exports
        let mut off = view.header_size();
        for _ in 0..ncmds {
            let cmd = view.get_u32(off).unwrap_or(0);
            let cmdsize = view.get_u32(off + 4).unwrap_or(8) as usize;
            match cmd {
                LC_SUB_UMBRELLA => {
                    let name_off = view
                        .get_u32(off + 8)
                        .ok_or_else(|| malformed("bad LC_SUB_UMBRELLA".into()))?
                        as usize;
                    let leaf = view
                        .cstr(off + name_off)
                        .ok_or_else(|| malformed("bad LC_SUB_UMBRELLA".into()))?;
                    for dep in &dependents {
                        let dep_leaf = dep.path.rsplit('/').next().unwrap_or("");
                        if dep.path.contains('/') && dep_leaf == leaf {
                            dep.set_re_export();
                        }
                    }
                }
                LC_SUB_LIBRARY => {
                    let name_off = view
                        .get_u32(off + 8)
                        .ok_or_else(|| malformed("bad LC_SUB_LIBRARY".into()))?
                        as usize;
                    let base = view
                        .cstr(off + name_off)
                        .ok_or_else(|| malformed("bad LC_SUB_LIBRARY".into()))?;
                    for dep in &dependents {
                        let leaf = dep.path.rsplit('/').next().unwrap_or(&dep.path);
                        let stem = leaf.split('.').next().unwrap_or(leaf);
                        if stem == base {
                            dep.set_re_export();
                        }
                    }
                }
                _ => {}
            }
            off += cmdsize;
        }
    }

    if install_path.is_none() && matches!(filetype, MH_DYLIB | MH_DYLIB_STUB) {
        return Err(ParseError::Malformed {
            path: path.to_path_buf(),
            reason: "dylib missing LC_ID_DYLIB load command".into(),
        });
    }
    if dyld_info.is_none() {
        if symtab.is_none() {
            return Err(malformed("binary missing LC_SYMTAB load command".into()));
        }
        if dysymtab.is_none() {
            return Err(malformed("binary missing LC_DYSYMTAB load command".into()));
        }
    }

    // flat main executables keep every transitive flat import alive
    let mut import_atom_undefs = None;
    if linking_flat && options.linking_main_executable() && (flags & MH_TWOLEVEL) == 0 {
        let st = symtab.as_ref().ok_or_else(|| malformed("binary missing LC_SYMTAB load command".into()))?;
        let dt = dysymtab
            .as_ref()
            .ok_or_else(|| malformed("binary missing LC_DYSYMTAB load command".into()))?;
        let mut undefs = Vec::with_capacity(dt.nundefsym as usize);
        for idx in dt.iundefsym..dt.iundefsym.saturating_add(dt.nundefsym) {
            let sym = Nlist::read(&view, st.symoff, idx as usize)
                .ok_or_else(|| malformed("symbol table extends beyond end of file".into()))?;
            let name = view
                .cstr(st.stroff + sym.strx as usize)
                .ok_or_else(|| malformed("unterminated symbol name".into()))?;
            undefs.push(name);
        }
        import_atom_undefs = Some(undefs);
    }

    // build the export hash table
    let mut builder = ExportTableBuilder::new(path, options.min_os_version);
    match dyld_info {
        Some((export_off, export_size)) => {
            if export_size > 0 {
                let trie = view
                    .bytes(export_off, export_size)
                    .ok_or_else(|| malformed("export info extends beyond end of file".into()))?;
                let entries =
                    parse_export_trie(trie).map_err(|reason| malformed(reason))?;
                for entry in entries {
                    builder.add_symbol(
                        &entry.name,
                        entry.flags & EXPORT_SYMBOL_FLAGS_WEAK_DEFINITION != 0,
                        entry.flags & EXPORT_SYMBOL_FLAGS_KIND_MASK
                            == EXPORT_SYMBOL_FLAGS_KIND_THREAD_LOCAL,
                        entry.address,
                    );
                }
            }
        }
        None => {
            let st = symtab.as_ref().expect("validated above");
            let dt = dysymtab.as_ref().expect("validated above");
            let mut add_nlist = |builder: &mut ExportTableBuilder,
                                 index: usize|
             -> Result<(), ParseError> {
                let sym = Nlist::read(&view, st.symoff, index)
                    .ok_or_else(|| malformed("symbol table extends beyond end of file".into()))?;
                let name = view
                    .cstr(st.stroff + sym.strx as usize)
                    .ok_or_else(|| malformed("unterminated symbol name".into()))?;
                builder.add_symbol(&name, sym.is_weak_def(), false, sym.n_value);
                Ok(())
            };
            if dt.tocoff == 0 {
                for idx in dt.iextdefsym..dt.iextdefsym.saturating_add(dt.nextdefsym) {
                    add_nlist(&mut builder, idx as usize)?;
                }
            } else {
                for i in 0..dt.ntoc as usize {
                    let index = view
                        .get_u32(dt.tocoff + i * TOC_ENTRY_SIZE)
                        .ok_or_else(|| malformed("table of contents extends beyond end of file".into()))?;
                    add_nlist(&mut builder, index as usize)?;
                }
            }
            // old Intel libSystem gets the fast stub binder synthesized
            if install_path.as_deref() == Some(LIBSYSTEM_INSTALL_PATH)
                && matches!(arch, Architecture::X86 | Architecture::X86_64)
            {
                builder.add_symbol("dyld_stub_binder", false, false, 0);
            }
        }
    }

    let install_path_overridden = builder.install_path_override.is_some();
    if let Some(p) = builder.install_path_override.take() {
        install_path = Some(p);
    }
    if let Some(v) = builder.compatibility_version_override.take() {
        compatibility_version = v;
    }
    let (exports, ignore_exports) = builder.finish();

    Ok(Some(DylibFile::new(DylibInit {
        path: path.to_path_buf(),
        mod_time,
        ordinal,
        install_path,
        timestamp,
        current_version,
        compatibility_version,
        parent_umbrella,
        allowable_clients,
        objc_constraint,
        swift_version,
        platform_in_dylib: lc_platform,
        min_version_in_dylib,
        has_weak_exports,
        dead_strippable,
        app_extension_safe,
        has_public_install_name,
        install_path_overridden,
        wrong_os,
        no_reexports,
        explicit_reexport_found,
        linking_flat,
        bitcode_size,
        is_bundle_loader: bundle_loader,
        dependents,
        exports,
        ignore_exports,
        import_atom_undefs,
    })))
}

/// A text-based stub produces the same in-memory dylib a binary would.
pub fn parse_text_stub(
    data: &[u8],
    path: &Path,
    mod_time: i64,
    ordinal: Ordinal,
    options: &LinkOptions,
    bundle_loader: bool,
    indirect_dylib: bool,
) -> Result<Option<Arc<DylibFile>>, ParseError> {
    let stub: TextStub = match textstub::parse(data, path, options)? {
        Some(s) => s,
        None => return Ok(None),
    };
    if options.log_all_files {
        log::debug!("{}", path.display());
    }
    let wrong_os = check_platform(stub.platform, options, path, indirect_dylib)?;

    let mut builder = ExportTableBuilder::new(path, options.min_os_version);
    for sym in &stub.exports {
        builder.add_symbol(&sym.name, sym.weak_def, sym.tlv, 0);
    }
    let has_weak_exports = stub.exports.iter().any(|s| s.weak_def);

    let mut install_path = stub.install_name.clone();
    let install_path_overridden = builder.install_path_override.is_some();
    if let Some(p) = builder.install_path_override.take() {
        install_path = p;
    }
    let mut compatibility_version = stub.compatibility_version;
    if let Some(v) = builder.compatibility_version_override.take() {
        compatibility_version = v;
    }
    let (exports, ignore_exports) = builder.finish();

    let mut has_public_install_name =
        is_public_location(&install_path, options.implicitly_link_indirect_public_dylibs);
    if !stub.allowable_clients.is_empty() {
        has_public_install_name = false;
    }

    let dependents = stub
        .reexported_libs
        .iter()
        .filter(|p| options.install_path.as_deref() != Some(p.as_str()))
        .map(|p| Dependent::new(p.clone(), true))
        .collect::<Vec<_>>();
    let explicit_reexport_found = !dependents.is_empty();

    Ok(Some(DylibFile::new(DylibInit {
        path: path.to_path_buf(),
        mod_time,
        ordinal,
        install_path: Some(install_path),
        timestamp: 0,
        current_version: stub.current_version,
        compatibility_version,
        parent_umbrella: stub.parent_umbrella.clone(),
        allowable_clients: stub.allowable_clients.clone(),
        objc_constraint: ObjcConstraint::None,
        swift_version: stub.swift_version,
        platform_in_dylib: stub.platform,
        min_version_in_dylib: PackedVersion::default(),
        has_weak_exports,
        dead_strippable: false,
        app_extension_safe: false,
        has_public_install_name,
        install_path_overridden,
        wrong_os,
        no_reexports: false,
        explicit_reexport_found,
        linking_flat: options.flat_namespace(),
        bitcode_size: None,
        is_bundle_loader: bundle_loader,
        dependents,
        exports,
        ignore_exports,
        import_atom_undefs: None,
    })))
}
