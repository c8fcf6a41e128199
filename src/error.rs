// Tue Jan 13 2026 - Alex

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("can't open file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("can't map file {path}: {source}")]
    Map {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file too small (length={len})")]
    TooSmall { path: PathBuf, len: u64 },
    #[error("truncated fat file. Slice from {offset} to {end} is past end of file with length {len}")]
    TruncatedFat {
        path: PathBuf,
        offset: u64,
        end: u64,
        len: u64,
    },
    #[error("missing required architecture {arch} in file {path} ({slices} slices)")]
    MissingSlice {
        path: PathBuf,
        arch: &'static str,
        slices: u32,
    },
    #[error("file is universal ({slices} slices) but does not contain a(n) {arch} slice: {path}")]
    UniversalNoSlice {
        path: PathBuf,
        arch: &'static str,
        slices: u32,
    },
    #[error("file was built for {file_arch} which is not the architecture being linked ({arch}): {path}")]
    WrongArchitecture {
        path: PathBuf,
        file_arch: String,
        arch: &'static str,
    },
    #[error("lto file was built for {file_arch} which is not the architecture being linked ({arch}): {path}")]
    WrongBitcodeArchitecture {
        path: PathBuf,
        file_arch: String,
        arch: &'static str,
    },
    #[error("malformed file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("ignoring unexpected dylib file")]
    UnexpectedDylib { path: PathBuf },
    #[error("{reason}")]
    Policy { path: PathBuf, reason: String },
    #[error("building for {building}, but linking against dylib built for {linking}: {path}")]
    PlatformMismatch {
        path: PathBuf,
        building: String,
        linking: String,
    },
    #[error("cycle in dylib re-exports with {child} and {parent}")]
    ReExportCycle { child: PathBuf, parent: PathBuf },
    #[error("pipelined linking error - {reason}")]
    Pipeline { reason: String },
    #[error("could not process llvm bitcode object file, because {lib} could not be loaded")]
    BitcodeUnavailable { path: PathBuf, lib: String },
    #[error("indirect dylib at {path} is not a dylib")]
    NotADylib { path: PathBuf },
}

impl ParseError {
    pub fn malformed<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        ParseError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ParseError::Open { path, .. }
            | ParseError::Map { path, .. }
            | ParseError::TooSmall { path, .. }
            | ParseError::TruncatedFat { path, .. }
            | ParseError::MissingSlice { path, .. }
            | ParseError::UniversalNoSlice { path, .. }
            | ParseError::WrongArchitecture { path, .. }
            | ParseError::WrongBitcodeArchitecture { path, .. }
            | ParseError::Malformed { path, .. }
            | ParseError::UnexpectedDylib { path }
            | ParseError::Policy { path, .. }
            | ParseError::PlatformMismatch { path, .. }
            | ParseError::BitcodeUnavailable { path, .. }
            | ParseError::NotADylib { path } => Some(path),
            ParseError::ReExportCycle { .. } | ParseError::Pipeline { .. } => None,
        }
    }

    /// Errors that only mean "this file is for some other architecture".
    /// These may be downgraded to a warning or skipped outright.
    pub fn is_architecture_mismatch(&self) -> bool {
        matches!(
            self,
            ParseError::MissingSlice { .. } | ParseError::WrongArchitecture { .. }
        )
    }

    pub fn is_unexpected_dylib(&self) -> bool {
        matches!(self, ParseError::UnexpectedDylib { .. })
    }
}

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("{source} file '{path}'")]
    File {
        path: PathBuf,
        source: ParseError,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("no object files specified")]
    NoInputFiles,
    #[error("dynamic main executables must link with libSystem.dylib")]
    MissingLibSystem,
    #[error("Unknown file type for {path}")]
    UnknownFileType { path: PathBuf },
    #[error("Could not open or create trace file: {path}")]
    TraceFile { path: PathBuf },
}

impl LinkError {
    pub fn in_file(path: PathBuf, source: ParseError) -> Self {
        LinkError::File { path, source }
    }
}
