// Tue Jan 13 2026 - Alex

use crate::files::Ordinal;
use crate::format::constants::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    X86,
    X86_64,
    Arm,
    Arm64,
}

impl Architecture {
    pub fn cpu_type(&self) -> u32 {
        match self {
            Architecture::X86 => CPU_TYPE_I386,
            Architecture::X86_64 => CPU_TYPE_X86_64,
            Architecture::Arm => CPU_TYPE_ARM,
            Architecture::Arm64 => CPU_TYPE_ARM64,
        }
    }

    pub fn from_cpu_type(cpu_type: u32) -> Option<Architecture> {
        match cpu_type {
            CPU_TYPE_I386 => Some(Architecture::X86),
            CPU_TYPE_X86_64 => Some(Architecture::X86_64),
            CPU_TYPE_ARM => Some(Architecture::Arm),
            CPU_TYPE_ARM64 => Some(Architecture::Arm64),
            _ => None,
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Architecture::X86_64 | Architecture::Arm64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Architecture::X86 => "i386",
            Architecture::X86_64 => "x86_64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Segment and section holding the Objective-C image info for this
    /// architecture.
    pub fn objc_info_section(&self) -> (&'static str, &'static str) {
        match self {
            Architecture::X86 => ("__OBJC", "__image_info"),
            _ => ("__DATA", "__objc_imageinfo"),
        }
    }

    pub fn host() -> Architecture {
        if cfg!(target_arch = "x86_64") {
            Architecture::X86_64
        } else if cfg!(target_arch = "x86") {
            Architecture::X86
        } else if cfg!(target_arch = "arm") {
            Architecture::Arm
        } else {
            Architecture::Arm64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Platform {
    #[default]
    Unknown,
    MacOsx,
    Ios,
    WatchOs,
    TvOs,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Unknown => "unknown",
            Platform::MacOsx => "OSX",
            Platform::Ios => "iOS",
            Platform::WatchOs => "watchOS",
            Platform::TvOs => "tvOS",
        }
    }

    pub fn from_load_command(cmd: u32) -> Platform {
        match cmd {
            LC_VERSION_MIN_MACOSX => Platform::MacOsx,
            LC_VERSION_MIN_IPHONEOS => Platform::Ios,
            LC_VERSION_MIN_WATCHOS => Platform::WatchOs,
            LC_VERSION_MIN_TVOS => Platform::TvOs,
            _ => Platform::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputKind {
    #[default]
    DynamicExecutable,
    DynamicLibrary,
    DynamicBundle,
    StaticExecutable,
    Dyld,
    Preload,
    ObjectFile,
    KextBundle,
}

impl OutputKind {
    pub fn allows_dylibs(&self) -> bool {
        matches!(
            self,
            OutputKind::DynamicExecutable | OutputKind::DynamicLibrary | OutputKind::DynamicBundle
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Namespace {
    #[default]
    TwoLevel,
    Flat,
}

/// Version number packed as xxxx.yy.zz nibbles in a u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PackedVersion(pub u32);

impl PackedVersion {
    pub fn new(x: u32, y: u32, z: u32) -> PackedVersion {
        PackedVersion((x << 16) | (y << 8) | z)
    }

    /// Parses X[.Y[.Z]]. Fails on trailing garbage or overflow.
    pub fn parse(s: &str) -> Option<PackedVersion> {
        let mut parts = s.split('.');
        let x: u32 = parts.next()?.parse().ok()?;
        let y: u32 = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let z: u32 = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() || x > 0xffff || y > 0xff || z > 0xff {
            return None;
        }
        Some(PackedVersion::new(x, y, z))
    }

    pub fn major(&self) -> u32 {
        self.0 >> 16
    }

    pub fn minor(&self) -> u32 {
        (self.0 >> 8) & 0xff
    }
}

impl std::fmt::Display for PackedVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.0 >> 16,
            (self.0 >> 8) & 0xff,
            self.0 & 0xff
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DylibOverride {
    pub install_name: String,
    pub use_instead: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraSection {
    pub segment_name: String,
    pub section_name: String,
    pub path: PathBuf,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FileOptions {
    pub force_load: bool,
    pub weak_import: bool,
    pub re_export: bool,
    pub upward: bool,
    pub lazy_load: bool,
    pub bundle_loader: bool,
    pub indirect_dylib: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_len: u64,
    pub mod_time: i64,
    pub ordinal: Ordinal,
    pub options: FileOptions,
    pub slot: usize,
    pub from_file_list: bool,
}

impl FileInfo {
    pub fn new<P: Into<PathBuf>>(path: P) -> std::io::Result<FileInfo> {
        let path = path.into();
        let meta = std::fs::metadata(&path)?;
        let mod_time = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Ok(FileInfo {
            path,
            file_len: meta.len(),
            mod_time,
            ordinal: Ordinal::invalid(),
            options: FileOptions::default(),
            slot: 0,
            from_file_list: false,
        })
    }

    pub fn exists_non_empty(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkOptions {
    pub architecture: Option<Architecture>,
    pub cpu_subtype: u32,
    pub prefer_sub_architecture: bool,
    pub allow_sub_architecture_mismatches: bool,
    pub platform: Platform,
    pub min_os_version: PackedVersion,
    pub building_for_simulator: bool,
    pub allow_simulator_to_link_with_macosx: bool,
    pub add_version_load_command: bool,
    pub output_kind: OutputKind,
    pub namespace: Namespace,
    pub install_path: Option<String>,
    pub umbrella_name: Option<String>,
    pub client_name: Option<String>,
    pub library_search_paths: Vec<PathBuf>,
    pub framework_search_paths: Vec<PathBuf>,
    pub dylib_overrides: Vec<DylibOverride>,
    pub implicitly_link_indirect_public_dylibs: bool,
    pub fully_load_archives: bool,
    pub force_load_swift_libs: bool,
    pub using_bitcode: bool,
    pub lto_library: Option<PathBuf>,
    pub ignore_other_arch_input_files: bool,
    pub error_on_other_arch_files: bool,
    pub trace_dylibs: bool,
    pub trace_archives: bool,
    pub trace_output_file: Option<PathBuf>,
    pub dependency_info_path: Option<PathBuf>,
    pub pipeline_fifo: Option<PathBuf>,
    pub page_zero_size: u64,
    pub custom_stack_size: u64,
    pub needs_entry_point_load_command: bool,
    pub log_all_files: bool,
    pub extra_sections: Vec<ExtraSection>,
    pub inputs: Vec<FileInfo>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            architecture: None,
            cpu_subtype: 0,
            prefer_sub_architecture: false,
            allow_sub_architecture_mismatches: false,
            platform: Platform::Unknown,
            min_os_version: PackedVersion::default(),
            building_for_simulator: false,
            allow_simulator_to_link_with_macosx: false,
            add_version_load_command: true,
            output_kind: OutputKind::DynamicExecutable,
            namespace: Namespace::TwoLevel,
            install_path: None,
            umbrella_name: None,
            client_name: None,
            library_search_paths: Vec::new(),
            framework_search_paths: Vec::new(),
            dylib_overrides: Vec::new(),
            implicitly_link_indirect_public_dylibs: true,
            fully_load_archives: false,
            force_load_swift_libs: false,
            using_bitcode: false,
            lto_library: None,
            ignore_other_arch_input_files: false,
            error_on_other_arch_files: false,
            trace_dylibs: false,
            trace_archives: false,
            trace_output_file: None,
            dependency_info_path: None,
            pipeline_fifo: None,
            page_zero_size: 0x100000000,
            custom_stack_size: 0,
            needs_entry_point_load_command: true,
            log_all_files: false,
            extra_sections: Vec::new(),
            inputs: Vec::new(),
        }
    }
}

impl LinkOptions {
    pub fn architecture_name(&self) -> &'static str {
        self.architecture.map(|a| a.name()).unwrap_or("unknown")
    }

    pub fn flat_namespace(&self) -> bool {
        self.namespace == Namespace::Flat
    }

    pub fn linking_main_executable(&self) -> bool {
        self.output_kind == OutputKind::DynamicExecutable
    }

    pub fn pipeline_enabled(&self) -> bool {
        self.pipeline_fifo.is_some()
    }

    pub fn dump_dependency_info(&self) -> bool {
        self.dependency_info_path.is_some()
    }

    pub fn has_custom_stack(&self) -> bool {
        self.custom_stack_size != 0
    }

    /// Stats a concrete path into a FileInfo. The ordinal is filled in by
    /// the caller.
    pub fn find_file(&self, path: &Path) -> std::io::Result<FileInfo> {
        FileInfo::new(path)
    }

    /// Locates a dylib by install path: framework search paths for
    /// framework-shaped paths, library search paths for plain leaves,
    /// finally the install path itself.
    pub fn find_file_using_paths(&self, install_path: &str) -> std::io::Result<FileInfo> {
        let leaf = install_path.rsplit('/').next().unwrap_or(install_path);
        if install_path.contains(".framework/") {
            for dir in &self.framework_search_paths {
                let candidate = dir.join(leaf);
                if candidate.exists() {
                    return FileInfo::new(candidate);
                }
            }
        }
        for dir in &self.library_search_paths {
            let candidate = dir.join(leaf);
            if candidate.exists() {
                return FileInfo::new(candidate);
            }
        }
        FileInfo::new(install_path)
    }

    /// -l style lookup: lib<name>.dylib then lib<name>.a per search dir.
    pub fn find_library(&self, name: &str) -> std::io::Result<FileInfo> {
        for dir in &self.library_search_paths {
            let dylib = dir.join(format!("lib{}.dylib", name));
            if dylib.exists() {
                return FileInfo::new(dylib);
            }
            let archive = dir.join(format!("lib{}.a", name));
            if archive.exists() {
                return FileInfo::new(archive);
            }
        }
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("library not found for -l{}", name),
        ))
    }

    pub fn find_framework(&self, name: &str) -> std::io::Result<FileInfo> {
        for dir in &self.framework_search_paths {
            let candidate = dir.join(format!("{}.framework", name)).join(name);
            if candidate.exists() {
                return FileInfo::new(candidate);
            }
        }
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("framework not found {}", name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_version_parse() {
        assert_eq!(PackedVersion::parse("10.9"), Some(PackedVersion::new(10, 9, 0)));
        assert_eq!(PackedVersion::parse("1.2.3"), Some(PackedVersion::new(1, 2, 3)));
        assert_eq!(PackedVersion::parse("1"), Some(PackedVersion::new(1, 0, 0)));
        assert_eq!(PackedVersion::parse("1.2.3.4"), None);
        assert_eq!(PackedVersion::parse("70000.1.1"), None);
        assert_eq!(PackedVersion::parse("banana"), None);
    }

    #[test]
    fn test_packed_version_display() {
        assert_eq!(PackedVersion::new(10, 11, 2).to_string(), "10.11.2");
        assert_eq!(PackedVersion::new(1, 0, 0).major(), 1);
        assert_eq!(PackedVersion::new(10, 9, 0).minor(), 9);
    }

    #[test]
    fn test_architecture_round_trip() {
        for arch in [
            Architecture::X86,
            Architecture::X86_64,
            Architecture::Arm,
            Architecture::Arm64,
        ] {
            assert_eq!(Architecture::from_cpu_type(arch.cpu_type()), Some(arch));
        }
        assert_eq!(Architecture::from_cpu_type(0xdead), None);
    }

    #[test]
    fn test_output_kind_dylib_policy() {
        assert!(OutputKind::DynamicExecutable.allows_dylibs());
        assert!(OutputKind::DynamicBundle.allows_dylibs());
        assert!(!OutputKind::StaticExecutable.allows_dylibs());
        assert!(!OutputKind::KextBundle.allows_dylibs());
    }
}
