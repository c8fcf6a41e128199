// Tue Jan 13 2026 - Alex

use crate::error::ParseError;
use crate::files::atom::{Atom, AtomContent, AtomHandler, AtomScope};
use crate::files::Ordinal;
use crate::dylib::exports::ExportEntry;
use crate::options::{PackedVersion, Platform};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjcConstraint {
    None,
    RetainRelease,
    RetainReleaseOrGC,
    RetainReleaseForSimulator,
    GC,
}

/// One LC_LOAD_DYLIB / LC_REEXPORT_DYLIB edge. The target dylib is
/// resolved exactly once, during indirect-dylib processing.
pub struct Dependent {
    pub path: String,
    re_export: AtomicBool,
    dylib: RwLock<Option<Arc<DylibFile>>>,
}

impl Dependent {
    pub fn new(path: String, re_export: bool) -> Dependent {
        Dependent {
            path,
            re_export: AtomicBool::new(re_export),
            dylib: RwLock::new(None),
        }
    }

    pub fn re_export(&self) -> bool {
        self.re_export.load(Ordering::Relaxed)
    }

    pub fn set_re_export(&self) {
        self.re_export.store(true, Ordering::Relaxed);
    }

    pub fn dylib(&self) -> Option<Arc<DylibFile>> {
        self.dylib.read().clone()
    }
}

/// Everything a parser has to supply to build a DylibFile. The parser owns
/// all mutation; after construction only the documented setters and the
/// export cache change.
pub struct DylibInit {
    pub path: PathBuf,
    pub mod_time: i64,
    pub ordinal: Ordinal,
    pub install_path: Option<String>,
    pub timestamp: u32,
    pub current_version: PackedVersion,
    pub compatibility_version: PackedVersion,
    pub parent_umbrella: Option<String>,
    pub allowable_clients: Vec<String>,
    pub objc_constraint: ObjcConstraint,
    pub swift_version: u8,
    pub platform_in_dylib: Platform,
    pub min_version_in_dylib: PackedVersion,
    pub has_weak_exports: bool,
    pub dead_strippable: bool,
    pub app_extension_safe: bool,
    pub has_public_install_name: bool,
    pub install_path_overridden: bool,
    pub wrong_os: bool,
    pub no_reexports: bool,
    pub explicit_reexport_found: bool,
    pub linking_flat: bool,
    pub bitcode_size: Option<u64>,
    pub is_bundle_loader: bool,
    pub dependents: Vec<Dependent>,
    pub exports: HashMap<String, ExportEntry>,
    pub ignore_exports: HashSet<String>,
    pub import_atom_undefs: Option<Vec<String>>,
}

/// Resolves an install path to a loaded dylib, loading it if necessary.
/// Implemented by the orchestrator.
pub trait DylibResolver {
    fn find_dylib(
        &mut self,
        install_path: &str,
        from_path: &Path,
    ) -> Result<Arc<DylibFile>, ParseError>;
}

struct ReExportChain<'a> {
    prev: Option<&'a ReExportChain<'a>>,
    file: &'a DylibFile,
}

/// A parsed dynamic library. The backing file mapping is released by the
/// time one of these exists; every name it retains is an owned copy.
pub struct DylibFile {
    path: PathBuf,
    mod_time: i64,
    ordinal: Ordinal,
    install_path: Option<String>,
    timestamp: u32,
    current_version: PackedVersion,
    compatibility_version: PackedVersion,
    parent_umbrella: Option<String>,
    allowable_clients: Vec<String>,
    objc_constraint: ObjcConstraint,
    swift_version: u8,
    platform_in_dylib: Platform,
    min_version_in_dylib: PackedVersion,
    has_weak_exports: bool,
    dead_strippable: bool,
    app_extension_safe: bool,
    has_public_install_name: bool,
    install_path_overridden: bool,
    wrong_os: bool,
    no_reexports: bool,
    explicit_reexport_found: bool,
    linking_flat: bool,
    bitcode_size: Option<u64>,
    is_bundle_loader: bool,
    dependents: Vec<Dependent>,
    exports: RwLock<HashMap<String, ExportEntry>>,
    ignore_exports: HashSet<String>,
    import_atom_undefs: Option<Vec<String>>,

    explicitly_linked: AtomicBool,
    implicitly_linked: AtomicBool,
    will_be_reexported: AtomicBool,
    will_be_upward: AtomicBool,
    forced_weak_linked: AtomicBool,
    will_be_lazy_loaded: AtomicBool,
    provided_export_atom: AtomicBool,
    indirects_processed: AtomicBool,
}

impl DylibFile {
    pub fn new(init: DylibInit) -> Arc<DylibFile> {
        Arc::new(DylibFile {
            path: init.path,
            mod_time: init.mod_time,
            ordinal: init.ordinal,
            install_path: init.install_path,
            timestamp: init.timestamp,
            current_version: init.current_version,
            compatibility_version: init.compatibility_version,
            parent_umbrella: init.parent_umbrella,
            allowable_clients: init.allowable_clients,
            objc_constraint: init.objc_constraint,
            swift_version: init.swift_version,
            platform_in_dylib: init.platform_in_dylib,
            min_version_in_dylib: init.min_version_in_dylib,
            has_weak_exports: init.has_weak_exports,
            dead_strippable: init.dead_strippable,
            app_extension_safe: init.app_extension_safe,
            has_public_install_name: init.has_public_install_name,
            install_path_overridden: init.install_path_overridden,
            wrong_os: init.wrong_os,
            no_reexports: init.no_reexports,
            explicit_reexport_found: init.explicit_reexport_found,
            linking_flat: init.linking_flat,
            bitcode_size: init.bitcode_size,
            is_bundle_loader: init.is_bundle_loader,
            dependents: init.dependents,
            exports: RwLock::new(init.exports),
            ignore_exports: init.ignore_exports,
            import_atom_undefs: init.import_atom_undefs,
            explicitly_linked: AtomicBool::new(false),
            implicitly_linked: AtomicBool::new(false),
            will_be_reexported: AtomicBool::new(false),
            will_be_upward: AtomicBool::new(false),
            forced_weak_linked: AtomicBool::new(false),
            will_be_lazy_loaded: AtomicBool::new(false),
            provided_export_atom: AtomicBool::new(false),
            indirects_processed: AtomicBool::new(false),
        })
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

    pub fn install_path(&self) -> Option<&str> {
        self.install_path.as_deref()
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn current_version(&self) -> PackedVersion {
        self.current_version
    }

    pub fn compatibility_version(&self) -> PackedVersion {
        self.compatibility_version
    }

    pub fn parent_umbrella(&self) -> Option<&str> {
        self.parent_umbrella.as_deref()
    }

    pub fn allowable_clients(&self) -> &[String] {
        &self.allowable_clients
    }

    pub fn objc_constraint(&self) -> ObjcConstraint {
        self.objc_constraint
    }

    pub fn swift_version(&self) -> u8 {
        self.swift_version
    }

    pub fn platform(&self) -> Platform {
        self.platform_in_dylib
    }

    pub fn min_os_version(&self) -> PackedVersion {
        self.min_version_in_dylib
    }

    pub fn has_weak_externals(&self) -> bool {
        self.has_weak_exports
    }

    pub fn dead_strippable(&self) -> bool {
        self.dead_strippable
    }

    pub fn app_extension_safe(&self) -> bool {
        self.app_extension_safe
    }

    pub fn has_public_install_name(&self) -> bool {
        self.has_public_install_name
    }

    pub fn install_path_version_specific(&self) -> bool {
        self.install_path_overridden
    }

    pub fn wrong_os(&self) -> bool {
        self.wrong_os
    }

    pub fn bitcode_size(&self) -> Option<u64> {
        self.bitcode_size
    }

    pub fn is_bundle_loader(&self) -> bool {
        self.is_bundle_loader
    }

    pub fn dependents(&self) -> &[Dependent] {
        &self.dependents
    }

    pub fn provided_export_atom(&self) -> bool {
        self.provided_export_atom.load(Ordering::Relaxed)
    }

    // link-mode flags

    pub fn explicitly_linked(&self) -> bool {
        self.explicitly_linked.load(Ordering::Relaxed)
    }

    pub fn set_explicitly_linked(&self) {
        self.explicitly_linked.store(true, Ordering::Relaxed);
    }

    pub fn implicitly_linked(&self) -> bool {
        self.implicitly_linked.load(Ordering::Relaxed)
    }

    pub fn set_implicitly_linked(&self) {
        self.implicitly_linked.store(true, Ordering::Relaxed);
    }

    pub fn will_be_reexported(&self) -> bool {
        self.will_be_reexported.load(Ordering::Relaxed)
    }

    pub fn set_will_be_reexported(&self) {
        self.will_be_reexported.store(true, Ordering::Relaxed);
    }

    pub fn will_be_upward_dylib(&self) -> bool {
        self.will_be_upward.load(Ordering::Relaxed)
    }

    pub fn set_will_be_upward_dylib(&self) {
        self.will_be_upward.store(true, Ordering::Relaxed);
    }

    pub fn forced_weak_linked(&self) -> bool {
        self.forced_weak_linked.load(Ordering::Relaxed)
    }

    pub fn set_forced_weak_linked(&self) {
        self.forced_weak_linked.store(true, Ordering::Relaxed);
    }

    pub fn will_be_lazy_loaded(&self) -> bool {
        self.will_be_lazy_loaded.load(Ordering::Relaxed)
    }

    pub fn set_will_be_lazy_loaded(&self) {
        self.will_be_lazy_loaded.store(true, Ordering::Relaxed);
    }

    /// doFile plus, when linking a flat main executable against a flat
    /// dylib, the atom that drags in all of this dylib's undefined symbols.
    pub fn for_each_atom(&self, handler: &mut dyn AtomHandler) -> bool {
        handler.do_file(&self.path, self.ordinal);
        if let Some(undefs) = &self.import_atom_undefs {
            handler.do_atom(&Atom {
                name: "import-atom".to_string(),
                scope: AtomScope::TranslationUnit,
                content: AtomContent::ImportList {
                    undefs: undefs.clone(),
                },
                provider: Some(self.ordinal),
                provider_path: Some(self.path.clone()),
            });
            return true;
        }
        false
    }

    fn has_weak_definition_impl(&self, name: &str) -> Option<bool> {
        if let Some(entry) = self.exports.read().get(name) {
            return Some(entry.weak_def);
        }
        for dep in &self.dependents {
            if dep.re_export() {
                if let Some(child) = dep.dylib() {
                    if let Some(found) = child.has_weak_definition_impl(name) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    pub fn has_weak_definition(&self, name: &str) -> bool {
        if self.ignore_exports.contains(name) {
            return false;
        }
        self.has_weak_definition_impl(name).unwrap_or(false)
    }

    fn contains_or_reexports(&self, name: &str) -> Option<ExportEntry> {
        if self.ignore_exports.contains(name) {
            return None;
        }
        if let Some(entry) = self.exports.read().get(name) {
            return Some(*entry);
        }
        for dep in &self.dependents {
            if dep.re_export() {
                if let Some(child) = dep.dylib() {
                    if child.implicitly_linked() {
                        continue;
                    }
                    if let Some(entry) = child.contains_or_reexports(name) {
                        return Some(entry);
                    }
                }
            }
        }
        None
    }

    /// Just-in-time lookup. On a hit the proxy atom is cached in this
    /// dylib's export table and handed to the handler.
    pub fn just_in_time_for_each_atom(&self, name: &str, handler: &mut dyn AtomHandler) -> bool {
        if self.ignore_exports.contains(name) {
            return false;
        }
        let entry = match self.contains_or_reexports(name) {
            Some(e) => e,
            None => return false,
        };
        let mut cached = entry;
        cached.materialized = true;
        self.exports.write().insert(name.to_string(), cached);
        self.provided_export_atom.store(true, Ordering::Relaxed);
        handler.do_atom(&Atom {
            name: name.to_string(),
            scope: AtomScope::LinkageUnit,
            content: AtomContent::ExportProxy {
                weak_def: entry.weak_def,
                tlv: entry.tlv,
                address: entry.address,
            },
            provider: Some(self.ordinal),
            provider_path: Some(self.path.clone()),
        });
        true
    }

    /// Lets the driver record whether the proxy it pulled for `name` is
    /// only ever weak-imported.
    pub fn set_weak_imported(&self, name: &str, weak: bool) {
        if let Some(entry) = self.exports.write().get_mut(name) {
            entry.weak_imported = weak;
        }
    }

    /// A dylib whose every used import is weak-imported may itself be
    /// weak-linked by the driver. Dylibs from which nothing was used never
    /// qualify.
    pub fn all_symbols_are_weak_imported(&self) -> bool {
        let mut found_weak = false;
        let mut found_non_weak = false;
        for entry in self.exports.read().values() {
            if entry.materialized {
                if entry.weak_imported {
                    found_weak = true;
                } else {
                    found_non_weak = true;
                }
            }
        }
        found_weak && !found_non_weak
    }

    /// Resolves each dependent to a loaded dylib. Call once per dylib, from
    /// the orchestrator, iterating to a fixed point as resolution adds more
    /// dylibs.
    pub fn process_indirect_libraries(
        &self,
        resolver: &mut dyn DylibResolver,
    ) -> Result<(), ParseError> {
        if self.indirects_processed.load(Ordering::Relaxed) {
            return Ok(());
        }
        if self.linking_flat {
            for dep in &self.dependents {
                let child = resolver.find_dylib(&dep.path, &self.path)?;
                *dep.dylib.write() = Some(child);
            }
        } else if self.no_reexports {
            // MH_NO_REEXPORTED_DYLIBS is trusted, nothing to resolve
        } else {
            for dep in &self.dependents {
                if dep.re_export() {
                    let child = resolver.find_dylib(&dep.path, &self.path)?;
                    if child.has_public_install_name() && !child.wrong_os() {
                        // promote the child to a direct dependency when the
                        // parent itself is directly linked under the child's
                        // own install name
                        if (self.explicitly_linked() || self.implicitly_linked())
                            && child.install_path() == Some(dep.path.as_str())
                        {
                            child.set_implicitly_linked();
                        }
                    }
                    *dep.dylib.write() = Some(child);
                } else if !self.explicit_reexport_found {
                    // the child may name us as its umbrella via
                    // LC_SUB_FRAMEWORK
                    let child = resolver.find_dylib(&dep.path, &self.path)?;
                    if let Some(umbrella) = child.parent_umbrella() {
                        let my_leaf = self
                            .path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned());
                        if my_leaf.as_deref() == Some(umbrella) {
                            dep.set_re_export();
                        }
                    }
                    *dep.dylib.write() = Some(child);
                }
            }
        }

        let chain = ReExportChain {
            prev: None,
            file: self,
        };
        self.assert_no_reexport_cycles(Some(&chain))?;

        self.indirects_processed.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn assert_no_reexport_cycles(&self, prev: Option<&ReExportChain>) -> Result<(), ParseError> {
        let chain = ReExportChain { prev, file: self };
        for dep in &self.dependents {
            if dep.re_export() {
                if let Some(child) = dep.dylib() {
                    let mut link = prev;
                    while let Some(l) = link {
                        if std::ptr::eq(l.file as *const DylibFile, Arc::as_ptr(&child)) {
                            return Err(ParseError::ReExportCycle {
                                child: child.path.clone(),
                                parent: self.path.clone(),
                            });
                        }
                        link = l.prev;
                    }
                    child.assert_no_reexport_cycles(Some(&chain))?;
                }
            }
        }
        Ok(())
    }
}
