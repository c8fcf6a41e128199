// Tue Jan 15 2026 - Alex

#![allow(unused_variables)]
#![allow(dead_code)]

pub mod dylib;
pub mod error;
pub mod files;
pub mod format;
pub mod inputs;
pub mod options;
pub mod pool;

pub use dylib::{DylibFile, DylibResolver, ObjcConstraint};
pub use error::{LinkError, ParseError};
pub use files::{Atom, AtomContent, AtomHandler, AtomScope, Ordinal, ParsedFile};
pub use inputs::{InputFiles, LinkState};
pub use options::{
    Architecture, FileInfo, FileOptions, LinkOptions, Namespace, OutputKind, PackedVersion,
    Platform,
};
