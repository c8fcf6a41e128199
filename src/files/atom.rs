// Tue Jan 13 2026 - Alex

use crate::files::Ordinal;
use crate::options::OutputKind;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomScope {
    TranslationUnit,
    LinkageUnit,
    Global,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtomContent {
    /// Synthetic mach-header / dso-handle label.
    MachHeader,
    /// The __PAGEZERO zero-fill region of an executable.
    PageZero { size: u64 },
    /// A -stack_size region.
    CustomStack { size: u64 },
    /// A defined symbol extracted from an object file or archive member.
    ObjectSymbol {
        address: u64,
        weak_def: bool,
        is_data: bool,
    },
    /// Zero-content proxy for a symbol exported by a dylib.
    ExportProxy {
        weak_def: bool,
        tlv: bool,
        address: u64,
    },
    /// Zero-content atom whose fixups name every undefined symbol of a
    /// flat-namespace dylib.
    ImportList { undefs: Vec<String> },
    /// A -sectcreate section injected from the command line.
    OpaqueSection {
        segment: String,
        section: String,
        data: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub name: String,
    pub scope: AtomScope,
    pub content: AtomContent,
    /// Ordinal and path of the file that supplied this atom; None for
    /// synthetic atoms the orchestrator injects itself.
    pub provider: Option<Ordinal>,
    pub provider_path: Option<PathBuf>,
}

impl Atom {
    pub fn synthetic(name: &str, scope: AtomScope, content: AtomContent) -> Atom {
        Atom {
            name: name.to_string(),
            scope,
            content,
            provider: None,
            provider_path: None,
        }
    }

    pub fn page_zero(size: u64) -> Atom {
        Atom::synthetic("page zero", AtomScope::TranslationUnit, AtomContent::PageZero { size })
    }

    pub fn custom_stack(size: u64) -> Atom {
        Atom::synthetic(
            "custom stack",
            AtomScope::TranslationUnit,
            AtomContent::CustomStack { size },
        )
    }

    /// The implicit header and ___dso_handle labels for an output kind.
    pub fn header_atoms(kind: OutputKind) -> Vec<Atom> {
        let hdr = |name: &str, scope| Atom::synthetic(name, scope, AtomContent::MachHeader);
        match kind {
            OutputKind::StaticExecutable | OutputKind::DynamicExecutable => vec![
                hdr("__mh_execute_header", AtomScope::Global),
                hdr("___dso_handle", AtomScope::LinkageUnit),
            ],
            OutputKind::DynamicLibrary => vec![
                hdr("__mh_dylib_header", AtomScope::LinkageUnit),
                hdr("___dso_handle", AtomScope::LinkageUnit),
            ],
            OutputKind::DynamicBundle => vec![
                hdr("__mh_bundle_header", AtomScope::LinkageUnit),
                hdr("___dso_handle", AtomScope::LinkageUnit),
            ],
            OutputKind::Dyld => vec![
                hdr("__mh_dylinker_header", AtomScope::LinkageUnit),
                hdr("___dso_handle", AtomScope::LinkageUnit),
            ],
            // with -preload the mach header is not in the address space, so
            // the dso handle lands in __text instead
            OutputKind::Preload => vec![
                hdr("__mh_preload_header", AtomScope::LinkageUnit),
                hdr("___dso_handle", AtomScope::LinkageUnit),
            ],
            OutputKind::ObjectFile => vec![hdr("__mh_object_header", AtomScope::LinkageUnit)],
            OutputKind::KextBundle => vec![hdr("___dso_handle", AtomScope::LinkageUnit)],
        }
    }
}

/// Callback protocol the link driver hands to the ingestion core; files are
/// announced before their atoms.
pub trait AtomHandler {
    fn do_file(&mut self, path: &std::path::Path, ordinal: Ordinal);
    fn do_atom(&mut self, atom: &Atom);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_header_atoms() {
        let atoms = Atom::header_atoms(OutputKind::DynamicExecutable);
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].name, "__mh_execute_header");
        assert_eq!(atoms[0].scope, AtomScope::Global);
        assert_eq!(atoms[1].name, "___dso_handle");
    }

    #[test]
    fn test_object_output_has_no_dso_handle() {
        let atoms = Atom::header_atoms(OutputKind::ObjectFile);
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].name, "__mh_object_header");
    }
}
