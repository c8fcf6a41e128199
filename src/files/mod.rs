// Tue Jan 13 2026 - Alex

pub mod archive;
pub mod atom;
pub mod bitcode;
pub mod object;
pub mod ordinal;
pub mod textstub;

pub use archive::{ArchiveFile, ArchiveMember};
pub use atom::{Atom, AtomContent, AtomHandler, AtomScope};
pub use bitcode::BitcodeFile;
pub use object::{ObjectFile, ObjectSymbol};
pub use ordinal::Ordinal;

use crate::dylib::DylibFile;
use crate::error::ParseError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sentinel for an input that was deliberately skipped (wrong architecture
/// under the ignore flags, stray dylib). Contributes nothing.
pub struct IgnoredFile {
    path: PathBuf,
    mod_time: i64,
    ordinal: Ordinal,
}

impl IgnoredFile {
    pub fn new(path: &Path, mod_time: i64, ordinal: Ordinal) -> IgnoredFile {
        IgnoredFile {
            path: path.to_path_buf(),
            mod_time,
            ordinal,
        }
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
}

/// Closed sum of everything an input file can turn out to be.
pub enum ParsedFile {
    Object(ObjectFile),
    Archive(Arc<ArchiveFile>),
    Dylib(Arc<DylibFile>),
    Bitcode(BitcodeFile),
    Ignored(IgnoredFile),
}

impl ParsedFile {
    pub fn path(&self) -> &Path {
        match self {
            ParsedFile::Object(f) => f.path(),
            ParsedFile::Archive(f) => f.path(),
            ParsedFile::Dylib(f) => f.path(),
            ParsedFile::Bitcode(f) => f.path(),
            ParsedFile::Ignored(f) => f.path(),
        }
    }

    pub fn ordinal(&self) -> Ordinal {
        match self {
            ParsedFile::Object(f) => f.ordinal(),
            ParsedFile::Archive(f) => f.ordinal(),
            ParsedFile::Dylib(f) => f.ordinal(),
            ParsedFile::Bitcode(f) => f.ordinal(),
            ParsedFile::Ignored(f) => f.ordinal(),
        }
    }

    pub fn as_dylib(&self) -> Option<&Arc<DylibFile>> {
        match self {
            ParsedFile::Dylib(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_archive(&self) -> Option<&Arc<ArchiveFile>> {
        match self {
            ParsedFile::Archive(a) => Some(a),
            _ => None,
        }
    }

    pub fn for_each_atom(&self, handler: &mut dyn AtomHandler) -> Result<(), ParseError> {
        match self {
            ParsedFile::Object(f) => {
                handler.do_file(f.path(), f.ordinal());
                f.emit_atoms(handler);
            }
            ParsedFile::Archive(f) => {
                handler.do_file(f.path(), f.ordinal());
                if f.fully_loaded() {
                    f.for_each_member_atom(handler)?;
                }
            }
            ParsedFile::Dylib(f) => {
                f.for_each_atom(handler);
            }
            ParsedFile::Bitcode(f) => {
                handler.do_file(f.path(), f.ordinal());
            }
            ParsedFile::Ignored(_) => {}
        }
        Ok(())
    }
}
