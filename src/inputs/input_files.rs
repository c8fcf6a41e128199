// Tue Jan 15 2026 - Alex

use crate::dylib::{DylibFile, DylibResolver};
use crate::error::{LinkError, ParseError};
use crate::files::{ArchiveFile, Atom, AtomContent, AtomHandler, AtomScope, Ordinal, ParsedFile};
use crate::format::endian::MachView;
use crate::format::constants::MH_OBJECT;
use crate::format::probe::{make_file, IngestStats};
use crate::inputs::state::LinkState;
use crate::inputs::trace::{real_path_for, DependencyCategory, TraceLog};
use crate::options::{
    Architecture, FileInfo, LinkOptions, Namespace, OutputKind,
};
use crate::pool::{self, PoolShared};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

enum SearchLibrary {
    Dylib(Arc<DylibFile>),
    Archive(Arc<ArchiveFile>),
}

/// The orchestrator. Owns the parsed-files vector, the ordinal allocators,
/// the install-path index, and the search-library list; drives ingestion
/// and answers symbol queries for the link driver.
pub struct InputFiles {
    options: Arc<LinkOptions>,
    pool: Arc<PoolShared>,
    files: Vec<ParsedFile>,
    search_libraries: Vec<SearchLibrary>,
    // BTreeMap keeps implicit-dylib iteration deterministic by install path
    install_path_to_dylib: BTreeMap<String, Arc<DylibFile>>,
    all_dylibs: Vec<Arc<DylibFile>>,
    bundle_loader: Option<Arc<DylibFile>>,
    next_indirect_ordinal: u32,
    next_linker_option_ordinal: u32,
    inferred_arch: bool,
    trace: TraceLog,
}

impl InputFiles {
    pub fn new(mut options: LinkOptions) -> Result<InputFiles, LinkError> {
        let mut inferred_arch = false;
        if options.architecture.is_none() {
            infer_architecture(&mut options);
            inferred_arch = true;
        }
        if options.inputs.is_empty() {
            return Err(LinkError::NoInputFiles);
        }
        for (slot, info) in options.inputs.iter_mut().enumerate() {
            info.slot = slot;
            info.ordinal = Ordinal::command_line(slot as u32);
        }

        let trace = TraceLog::new(&options);
        let options = Arc::new(options);
        let pool = PoolShared::new(options.clone());
        if options.pipeline_enabled() {
            pool::spawn_listener(&pool);
        }
        // one parser starts now; more are spawned on demand as parsed
        // files get consumed
        {
            let mut state = pool.state.lock();
            state.available_workers = state.available_workers.saturating_sub(1);
        }
        pool::spawn_worker(&pool);

        Ok(InputFiles {
            options,
            pool,
            files: Vec::new(),
            search_libraries: Vec::new(),
            install_path_to_dylib: BTreeMap::new(),
            all_dylibs: Vec::new(),
            bundle_loader: None,
            next_indirect_ordinal: 0,
            next_linker_option_ordinal: 0,
            inferred_arch,
            trace,
        })
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    pub fn stats(&self) -> &IngestStats {
        &self.pool.stats
    }

    pub fn architecture_was_inferred(&self) -> bool {
        self.inferred_arch
    }

    pub fn files(&self) -> &[ParsedFile] {
        &self.files
    }

    pub fn bundle_loader(&self) -> Option<&Arc<DylibFile>> {
        self.bundle_loader.as_ref()
    }

    pub fn dylib_for_install_path(&self, install_path: &str) -> Option<&Arc<DylibFile>> {
        self.install_path_to_dylib.get(install_path)
    }

    /// Delivers every input file's atoms in command-line order, then runs
    /// the post passes: explicit-dylib marking, auto-linked libraries,
    /// indirect-dylib resolution, extra sections, and the synthetic header
    /// and segment atoms for the output kind.
    pub fn for_each_initial_atom(
        &mut self,
        state: &mut LinkState,
        handler: &mut dyn AtomHandler,
    ) -> Result<(), LinkError> {
        let count = self.options.inputs.len();
        for slot in 0..count {
            let file = PoolShared::wait_for_slot(&self.pool, slot)?;
            let info = self.options.inputs[slot].clone();
            match &file {
                ParsedFile::Object(obj) => {
                    self.trace
                        .dump_dependency(DependencyCategory::ObjectFile, obj.path());
                    for group in obj.linker_options() {
                        record_linker_option(state, group);
                    }
                }
                ParsedFile::Bitcode(bc) => {
                    self.trace
                        .dump_dependency(DependencyCategory::ObjectFile, bc.path());
                }
                ParsedFile::Dylib(dylib) => {
                    let dylib = dylib.clone();
                    self.add_dylib(&dylib, &info)?;
                }
                ParsedFile::Archive(archive) => {
                    // force loaded archives count as used
                    if (info.options.force_load || self.options.fully_load_archives)
                        && self.options.trace_archives
                    {
                        self.log_archive(archive)?;
                    }
                    self.search_libraries
                        .push(SearchLibrary::Archive(archive.clone()));
                    self.trace
                        .dump_dependency(DependencyCategory::Archive, archive.path());
                }
                ParsedFile::Ignored(_) => {}
            }
            file.for_each_atom(handler)
                .map_err(|e| LinkError::in_file(file.path().to_path_buf(), e))?;
            self.files.push(file);
        }

        self.mark_explicitly_linked_dylibs()?;
        self.add_linker_option_libraries(state, handler)?;
        self.create_indirect_dylibs()?;
        self.create_opaque_sections(handler);

        for atom in Atom::header_atoms(self.options.output_kind) {
            handler.do_atom(&atom);
        }
        if matches!(
            self.options.output_kind,
            OutputKind::StaticExecutable | OutputKind::DynamicExecutable
        ) {
            if self.options.page_zero_size != 0 {
                handler.do_atom(&Atom::page_zero(self.options.page_zero_size));
            }
            if self.options.has_custom_stack() && !self.options.needs_entry_point_load_command {
                handler.do_atom(&Atom::custom_stack(self.options.custom_stack_size));
            }
        }
        Ok(())
    }

    /// Resolves an undefined reference. Explicit libraries first, in input
    /// order; then indirect dylibs under the namespace rules. A weak
    /// definition keeps the search going for a strong one.
    pub fn search_libraries(
        &self,
        name: &str,
        search_dylibs: bool,
        search_archives: bool,
        data_symbol_only: bool,
        handler: &mut dyn AtomHandler,
    ) -> Result<bool, LinkError> {
        for lib in &self.search_libraries {
            match lib {
                SearchLibrary::Dylib(dylib) => {
                    if search_dylibs && dylib.just_in_time_for_each_atom(name, handler) {
                        // done, unless the hit is a weak definition
                        if !dylib.has_weak_externals() || !dylib.has_weak_definition(name) {
                            return Ok(true);
                        }
                    }
                }
                SearchLibrary::Archive(archive) => {
                    if search_archives {
                        let hit = archive
                            .just_in_time_for_each_atom(name, data_symbol_only, handler)
                            .map_err(|e| {
                                LinkError::in_file(archive.path().to_path_buf(), e)
                            })?;
                        if hit {
                            if self.options.trace_archives {
                                self.log_archive(archive)?;
                            }
                            return Ok(true);
                        }
                    }
                }
            }
        }

        if search_dylibs {
            for dylib in self.install_path_to_dylib.values() {
                let search_this = match self.options.namespace {
                    // two level: just the implicitly linked dylibs
                    Namespace::TwoLevel => {
                        dylib.implicitly_linked() && !dylib.explicitly_linked()
                    }
                    // flat: every indirect dylib
                    Namespace::Flat => !dylib.explicitly_linked(),
                };
                if search_this && dylib.just_in_time_for_each_atom(name, handler) {
                    if !dylib.has_weak_externals() || !dylib.has_weak_definition(name) {
                        return Ok(true);
                    }
                }
            }
        }

        Ok(false)
    }

    /// True when some linked dylib advertising MH_WEAK_DEFINES weakly
    /// defines the name.
    pub fn search_weak_def_in_dylib(&self, name: &str) -> bool {
        for dylib in self.install_path_to_dylib.values() {
            if (dylib.implicitly_linked() || dylib.explicitly_linked())
                && dylib.has_weak_externals()
                && dylib.has_weak_definition(name)
            {
                return true;
            }
        }
        false
    }

    /// Populates the output's dylib list: explicit dylibs in input order,
    /// then, under two-level namespace, implicit dylibs sorted by install
    /// path.
    pub fn dylibs(&self, state: &mut LinkState) -> Result<(), LinkError> {
        let dylibs_ok = self.options.output_kind.allows_dylibs();

        for file in &self.files {
            if let Some(dylib) = file.as_dylib() {
                let is_bundle_loader = self
                    .bundle_loader
                    .as_ref()
                    .map_or(false, |b| Arc::ptr_eq(b, dylib));
                // blank dylib stubs have nothing to contribute
                if dylib.install_path().is_none() && !is_bundle_loader {
                    continue;
                }
                if dylibs_ok {
                    if !state.dylibs.iter().any(|d| Arc::ptr_eq(d, dylib)) {
                        state.dylibs.push(dylib.clone());
                    }
                } else {
                    log::warn!("unexpected dylib ({}) on link line", dylib.path().display());
                }
            }
        }

        if self.options.namespace == Namespace::TwoLevel && dylibs_ok {
            // the BTreeMap iterates in install-path order, which keeps the
            // implicit portion of the list stable across runs
            for dylib in self.install_path_to_dylib.values() {
                if dylib.implicitly_linked()
                    && !state.dylibs.iter().any(|d| Arc::ptr_eq(d, dylib))
                {
                    state.dylibs.push(dylib.clone());
                }
            }
        }

        state.bundle_loader = self.bundle_loader.clone();

        if state.dylibs.is_empty() && self.options.needs_entry_point_load_command {
            return Err(LinkError::MissingLibSystem);
        }
        Ok(())
    }

    fn mark_explicitly_linked_dylibs(&mut self) -> Result<(), LinkError> {
        let dylibs: Vec<Arc<DylibFile>> = self.install_path_to_dylib.values().cloned().collect();
        for dylib in dylibs {
            dylib.set_explicitly_linked();
            self.check_dylib_client_restrictions(&dylib)?;
        }
        Ok(())
    }

    fn check_dylib_client_restrictions(&self, dylib: &Arc<DylibFile>) -> Result<(), LinkError> {
        let parent_umbrella = dylib.parent_umbrella();
        let clients = dylib.allowable_clients();
        if parent_umbrella.is_none() && clients.is_empty() {
            return Ok(());
        }

        let install_name = self.options.install_path.clone().unwrap_or_default();
        let leaf = match install_name.rfind('/') {
            Some(pos) => Some(&install_name[pos + 1..]),
            None => None,
        };

        let mut is_parent = false;
        let mut is_sibling = false;
        if let (Some(parent), Some(leaf)) = (parent_umbrella, leaf) {
            // the dylib is in an umbrella, and we are creating that parent
            is_parent = derived_client_name(leaf) == parent;
            // or a sibling under the same parent
            is_sibling = self.options.umbrella_name.as_deref() == Some(parent);
        }

        let mut is_allowable_client = false;
        if !is_parent && !is_sibling && !clients.is_empty() {
            let derived;
            let client_name = match self.options.client_name.as_deref() {
                Some(name) => name,
                None => {
                    // infer from the output path:
                    //   xxx/libfoo_variant.A.dylib -> foo
                    //   Bar.framework/Bar_variant  -> Bar
                    derived = derived_client_name(leaf.unwrap_or(&install_name)).to_string();
                    &derived
                }
            };
            is_allowable_client = clients.iter().any(|c| c.starts_with(client_name));
        }

        if !is_parent && !is_sibling && !is_allowable_client {
            let reason = match parent_umbrella {
                Some(parent) => format!(
                    "cannot link directly with {}.  Link against the umbrella framework '{}.framework' instead.",
                    dylib.path().display(),
                    parent
                ),
                None => format!("cannot link directly with {}", dylib.path().display()),
            };
            return Err(LinkError::Parse(ParseError::Policy {
                path: dylib.path().to_path_buf(),
                reason,
            }));
        }
        Ok(())
    }

    fn library_already_loaded(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path() == path)
    }

    /// Loads the frameworks and libraries that object files asked for via
    /// embedded linker options. Failures here only warn; the build system
    /// may supply them some other way.
    fn add_linker_option_libraries(
        &mut self,
        state: &mut LinkState,
        handler: &mut dyn AtomHandler,
    ) -> Result<(), LinkError> {
        if self.options.output_kind == OutputKind::ObjectFile {
            return Ok(());
        }

        for framework in state.linker_option_frameworks.clone() {
            let mut info = match self.options.find_framework(&framework) {
                Ok(info) => info,
                Err(e) => {
                    log::warn!("Auto-Linking supplied '{}', {}", framework, e);
                    continue;
                }
            };
            if self.library_already_loaded(&info.path) {
                continue;
            }
            self.next_linker_option_ordinal += 1;
            info.ordinal = Ordinal::linker_option(self.next_linker_option_ordinal);
            match make_file(&self.options, &info, true, &self.pool.stats) {
                Ok(ParsedFile::Dylib(dylib)) => {
                    if !dylib.install_path_version_specific() {
                        dylib.for_each_atom(handler);
                        dylib.set_implicitly_linked();
                        self.add_dylib(&dylib, &info)?;
                    }
                }
                Ok(_) => {
                    log::warn!(
                        "Auto-Linking supplied '{}', framework linker option at {} is not a dylib",
                        framework,
                        info.path.display()
                    );
                }
                Err(e) => {
                    log::warn!("Auto-Linking supplied '{}', {}", info.path.display(), e);
                }
            }
        }

        for library in state.linker_option_libraries.clone() {
            let mut info = match self.options.find_library(&library) {
                Ok(info) => info,
                Err(e) => {
                    log::warn!("Auto-Linking supplied '{}', {}", library, e);
                    continue;
                }
            };
            if self.library_already_loaded(&info.path) {
                continue;
            }
            self.next_linker_option_ordinal += 1;
            info.ordinal = Ordinal::linker_option(self.next_linker_option_ordinal);
            info.options.force_load =
                self.options.force_load_swift_libs && library.starts_with("swift");
            match make_file(&self.options, &info, true, &self.pool.stats) {
                Ok(ParsedFile::Dylib(dylib)) => {
                    dylib.for_each_atom(handler);
                    dylib.set_implicitly_linked();
                    self.add_dylib(&dylib, &info)?;
                }
                Ok(ParsedFile::Archive(archive)) => {
                    self.search_libraries
                        .push(SearchLibrary::Archive(archive.clone()));
                    self.trace
                        .dump_dependency(DependencyCategory::Archive, archive.path());
                    if info.options.force_load {
                        archive.for_each_member_atom(handler).map_err(|e| {
                            LinkError::in_file(archive.path().to_path_buf(), e)
                        })?;
                    }
                }
                Ok(_) => {
                    log::warn!(
                        "Auto-Linking supplied '{}', linker option dylib at {} is not a dylib",
                        library,
                        info.path.display()
                    );
                }
                Err(e) => {
                    log::warn!("Auto-Linking supplied '{}', {}", info.path.display(), e);
                }
            }
        }
        Ok(())
    }

    /// Resolves dependents to concrete dylibs, iterating because each
    /// resolution may load more dylibs; finishes by marking sub-frameworks
    /// of the output as re-exported.
    fn create_indirect_dylibs(&mut self) -> Result<(), LinkError> {
        let mut processed: Vec<Arc<DylibFile>> = Vec::new();
        let mut last_count = usize::MAX;
        while last_count != self.all_dylibs.len() {
            last_count = self.all_dylibs.len();
            let unprocessed: Vec<Arc<DylibFile>> = self
                .all_dylibs
                .iter()
                .filter(|d| !processed.iter().any(|p| Arc::ptr_eq(p, d)))
                .cloned()
                .collect();
            for dylib in unprocessed {
                processed.push(dylib.clone());
                dylib
                    .process_indirect_libraries(self)
                    .map_err(LinkError::Parse)?;
            }
        }

        if self.options.output_kind == OutputKind::DynamicLibrary {
            if let Some(install) = self.options.install_path.clone() {
                if let Some(pos) = install.rfind('/') {
                    let my_leaf = &install[pos + 1..];
                    for file in &self.files {
                        if let Some(dylib) = file.as_dylib() {
                            if dylib.parent_umbrella() == Some(my_leaf) {
                                dylib.set_will_be_reexported();
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn create_opaque_sections(&self, handler: &mut dyn AtomHandler) {
        // extra command line sections always at end
        for extra in &self.options.extra_sections {
            handler.do_atom(&Atom {
                name: format!("{}/{}", extra.segment_name, extra.section_name),
                scope: AtomScope::TranslationUnit,
                content: AtomContent::OpaqueSection {
                    segment: extra.segment_name.clone(),
                    section: extra.section_name.clone(),
                    data: extra.data.clone(),
                },
                provider: None,
                provider_path: Some(extra.path.clone()),
            });
            self.trace
                .dump_dependency(DependencyCategory::Section, &extra.path);
        }
    }

    fn add_dylib(&mut self, reader: &Arc<DylibFile>, info: &FileInfo) -> Result<(), LinkError> {
        if !self.all_dylibs.iter().any(|d| Arc::ptr_eq(d, reader)) {
            self.all_dylibs.push(reader.clone());
        }

        if reader.install_path().is_none() && !info.options.bundle_loader {
            // a "blank" stub; silently ignore it
            return Ok(());
        }

        if info.options.weak_import {
            reader.set_forced_weak_linked();
        }
        if info.options.re_export {
            reader.set_will_be_reexported();
        }
        if info.options.upward {
            if self.options.output_kind == OutputKind::DynamicLibrary {
                reader.set_will_be_upward_dylib();
            } else {
                log::warn!("ignoring upward dylib option for {}", info.path.display());
            }
        }
        if info.options.lazy_load {
            reader.set_will_be_lazy_loaded();
        }

        if let Some(install_path) = reader.install_path() {
            // first writer wins; a duplicate install name is either the
            // same dylib reached through a symlink or a deliberate
            // duplicate, and neither warrants a warning
            self.install_path_to_dylib
                .entry(install_path.to_string())
                .or_insert_with(|| reader.clone());
        } else if info.options.bundle_loader {
            self.bundle_loader = Some(reader.clone());
        }

        if !info.options.indirect_dylib {
            self.log_dylib(reader, false)?;
        }

        self.pool
            .stats
            .dylibs_loaded
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        // only direct libraries join the search-first list
        if !info.options.indirect_dylib {
            self.search_libraries
                .push(SearchLibrary::Dylib(reader.clone()));
        }
        Ok(())
    }

    fn log_dylib(&self, file: &Arc<DylibFile>, indirect: bool) -> Result<(), LinkError> {
        if self.options.trace_dylibs {
            let full_path = real_path_for(file.path());
            if file.will_be_upward_dylib() {
                // upward dylibs are hidden from the dependency scraper
                self.trace.trace(&format!(
                    "[Logging for XBS] Used upward dynamic library: {}\n",
                    full_path.display()
                ))?;
            } else if indirect {
                self.trace.trace(&format!(
                    "[Logging for XBS] Used indirect dynamic library: {}\n",
                    full_path.display()
                ))?;
            } else {
                self.trace.trace(&format!(
                    "[Logging for XBS] Used dynamic library: {}\n",
                    full_path.display()
                ))?;
            }
        }

        if self.options.dump_dependency_info() {
            let is_bundle_loader = self
                .bundle_loader
                .as_ref()
                .map_or(false, |b| Arc::ptr_eq(b, file));
            let category = if is_bundle_loader {
                DependencyCategory::BundleLoader
            } else if file.will_be_upward_dylib() {
                if indirect {
                    DependencyCategory::UpwardIndirectDylib
                } else {
                    DependencyCategory::UpwardDirectDylib
                }
            } else if indirect {
                DependencyCategory::IndirectDylib
            } else {
                DependencyCategory::DirectDylib
            };
            self.trace.dump_dependency(category, file.path());
        }
        Ok(())
    }

    fn log_archive(&self, archive: &Arc<ArchiveFile>) -> Result<(), LinkError> {
        if self.options.trace_archives && archive.mark_trace_logged() {
            let full_path = real_path_for(archive.path());
            self.trace.trace(&format!(
                "[Logging for XBS] Used static archive: {}\n",
                full_path.display()
            ))?;
        }
        Ok(())
    }

    fn load_indirect_dylib(&mut self, mut info: FileInfo) -> Result<Arc<DylibFile>, ParseError> {
        self.next_indirect_ordinal += 1;
        info.ordinal = Ordinal::indirect_dylib(self.next_indirect_ordinal);
        info.options.indirect_dylib = true;
        let file = make_file(&self.options, &info, true, &self.pool.stats)?;
        match file {
            ParsedFile::Dylib(dylib) => {
                self.add_dylib(&dylib, &info).map_err(|e| ParseError::Policy {
                    path: info.path.clone(),
                    reason: e.to_string(),
                })?;
                self.log_dylib(&dylib, true).map_err(|e| ParseError::Policy {
                    path: info.path.clone(),
                    reason: e.to_string(),
                })?;
                Ok(dylib)
            }
            _ => Err(ParseError::NotADylib { path: info.path }),
        }
    }
}

impl DylibResolver for InputFiles {
    /// Resolution order: install-path index, -dylib_file overrides,
    /// @loader_path rewrite, then the library and framework search paths.
    fn find_dylib(
        &mut self,
        install_path: &str,
        from_path: &Path,
    ) -> Result<Arc<DylibFile>, ParseError> {
        if let Some(found) = self.install_path_to_dylib.get(install_path) {
            return Ok(found.clone());
        }

        for over in self.options.dylib_overrides.clone() {
            if over.install_name == install_path {
                match self
                    .options
                    .find_file(&over.use_instead)
                    .map_err(|e| ParseError::Open {
                        path: over.use_instead.clone(),
                        source: e,
                    })
                    .and_then(|info| self.load_indirect_dylib(info))
                {
                    Ok(dylib) => return Ok(dylib),
                    Err(msg) => {
                        log::warn!("ignoring -dylib_file option, {}", msg);
                    }
                }
            }
        }

        let mut requested = install_path.to_string();
        if let Some(rest) = install_path.strip_prefix("@loader_path/") {
            let mut base = from_path.to_path_buf();
            base.pop();
            requested = base.join(rest).to_string_lossy().into_owned();
        }

        let info = self
            .options
            .find_file_using_paths(&requested)
            .map_err(|e| ParseError::Open {
                path: requested.clone().into(),
                source: e,
            })?;
        self.load_indirect_dylib(info)
    }
}

/// Output leaf name reduced the way client checks expect: no `lib` prefix,
/// cut at the first dot or underscore.
fn derived_client_name(leaf: &str) -> &str {
    let name = leaf.strip_prefix("lib").unwrap_or(leaf);
    let mut len = name.len();
    if let Some(dot) = name.find('.') {
        len = len.min(dot);
    }
    if let Some(underscore) = name.find('_') {
        len = len.min(underscore);
    }
    &name[..len]
}

fn record_linker_option(state: &mut LinkState, group: &[String]) {
    if group.len() == 1 {
        if let Some(lib) = group[0].strip_prefix("-l") {
            state.linker_option_libraries.insert(lib.to_string());
            return;
        }
    } else if group.len() == 2 && group[0] == "-framework" {
        state
            .linker_option_frameworks
            .insert(group[1].clone());
        return;
    }
    log::warn!("unknown linker option from object file: {:?}", group);
}

/// Scans the inputs for a thin relocatable and adopts its architecture;
/// falls back to the architecture this tool was built for.
fn infer_architecture(options: &mut LinkOptions) {
    let mut buffer = [0u8; 4096];
    for info in &options.inputs {
        let mut file = match std::fs::File::open(&info.path) {
            Ok(f) => f,
            Err(_) => continue,
        };
        let read = match file.read(&mut buffer) {
            Ok(n) => n,
            Err(_) => continue,
        };
        if let Some(view) = MachView::from_header(&buffer[..read]) {
            if view.filetype() == Some(MH_OBJECT) {
                if let Some(arch) = view.cpu_type().and_then(Architecture::from_cpu_type) {
                    options.architecture = Some(arch);
                    if let Some(subtype) = view.cpu_subtype() {
                        options.cpu_subtype = subtype;
                    }
                    return;
                }
            }
        }
    }
    log::warn!("-arch not specified");
    options.architecture = Some(Architecture::host());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_client_name() {
        assert_eq!(derived_client_name("libfoo_variant.A.dylib"), "foo");
        assert_eq!(derived_client_name("Bar_variant"), "Bar");
        assert_eq!(derived_client_name("Bar"), "Bar");
        assert_eq!(derived_client_name("libz.dylib"), "z");
    }

    #[test]
    fn test_record_linker_option() {
        let mut state = LinkState::new();
        record_linker_option(&mut state, &["-lz".to_string()]);
        record_linker_option(
            &mut state,
            &["-framework".to_string(), "CoreFoundation".to_string()],
        );
        assert!(state.linker_option_libraries.contains("z"));
        assert!(state.linker_option_frameworks.contains("CoreFoundation"));
    }
}
