// Tue Jan 13 2026 - Alex

use crate::options::PackedVersion;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

const APPLICATION_SERVICES_PATH: &str =
    "/System/Library/Frameworks/ApplicationServices.framework/Versions/A/ApplicationServices";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportEntry {
    pub weak_def: bool,
    pub tlv: bool,
    pub address: u64,
    /// True once a proxy atom for this name has been handed to the driver.
    pub materialized: bool,
    /// Set by the driver for materialized atoms that are only weak-imported.
    pub weak_imported: bool,
}

impl ExportEntry {
    pub fn new(weak_def: bool, tlv: bool, address: u64) -> ExportEntry {
        ExportEntry {
            weak_def,
            tlv,
            address,
            materialized: false,
            weak_imported: false,
        }
    }
}

/// Accumulates a dylib's export hash table. Symbols named `$ld$...` are
/// directives to the static linker, not exports; they apply only when
/// their os<major>.<minor> condition matches the link's minimum OS.
pub struct ExportTableBuilder {
    path: PathBuf,
    link_min_os: PackedVersion,
    map: HashMap<String, ExportEntry>,
    ignore: HashSet<String>,
    pub install_path_override: Option<String>,
    pub compatibility_version_override: Option<PackedVersion>,
}

impl ExportTableBuilder {
    pub fn new(path: &Path, link_min_os: PackedVersion) -> ExportTableBuilder {
        ExportTableBuilder {
            path: path.to_path_buf(),
            link_min_os,
            map: HashMap::new(),
            ignore: HashSet::new(),
            install_path_override: None,
            compatibility_version_override: None,
        }
    }

    pub fn add_symbol(&mut self, name: &str, weak_def: bool, tlv: bool, address: u64) {
        if let Some(rest) = name.strip_prefix("$ld$") {
            let dollar = match rest.find('$') {
                Some(d) => d,
                None => {
                    log::warn!(
                        "bad symbol condition: {} in dylib {}",
                        name,
                        self.path.display()
                    );
                    return;
                }
            };
            let action = &rest[..dollar];
            let after = &rest[dollar..];
            let expected = format!(
                "$os{}.{}$",
                self.link_min_os.major(),
                self.link_min_os.minor()
            );
            if !after.starts_with(&expected) {
                // condition for some other OS release
                return;
            }
            let sym_name = &after[expected.len()..];
            match action {
                "hide" => {
                    self.ignore.insert(sym_name.to_string());
                }
                "add" => {
                    self.add_symbol(sym_name, weak_def, false, 0);
                }
                "install_name" => {
                    self.install_path_override = Some(sym_name.to_string());
                    // one grandfathered redirect ships with the wrong
                    // compatibility version
                    if sym_name == APPLICATION_SERVICES_PATH {
                        self.compatibility_version_override = Some(PackedVersion::new(1, 0, 0));
                    }
                }
                "compatibility_version" => match PackedVersion::parse(sym_name) {
                    Some(v) => self.compatibility_version_override = Some(v),
                    None => log::warn!(
                        "malformed 32-bit x.y.z version number: {} in dylib {}",
                        sym_name,
                        self.path.display()
                    ),
                },
                _ => {
                    log::warn!(
                        "bad symbol action: {} in dylib {}",
                        name,
                        self.path.display()
                    );
                }
            }
            return;
        }

        if !self.ignore.contains(name) {
            self.map
                .insert(name.to_string(), ExportEntry::new(weak_def, tlv, address));
        }
    }

    pub fn finish(self) -> (HashMap<String, ExportEntry>, HashSet<String>) {
        (self.map, self.ignore)
    }
}
