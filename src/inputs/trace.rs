// Tue Jan 15 2026 - Alex

use crate::error::LinkError;
use crate::options::LinkOptions;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyCategory {
    ObjectFile,
    Archive,
    DirectDylib,
    IndirectDylib,
    UpwardDirectDylib,
    UpwardIndirectDylib,
    BundleLoader,
    Section,
}

impl DependencyCategory {
    fn tag(&self) -> &'static str {
        match self {
            DependencyCategory::ObjectFile => "object",
            DependencyCategory::Archive => "archive",
            DependencyCategory::DirectDylib => "direct-dylib",
            DependencyCategory::IndirectDylib => "indirect-dylib",
            DependencyCategory::UpwardDirectDylib => "upward-direct-dylib",
            DependencyCategory::UpwardIndirectDylib => "upward-indirect-dylib",
            DependencyCategory::BundleLoader => "bundle-loader",
            DependencyCategory::Section => "section",
        }
    }
}

enum TraceSink {
    File(std::fs::File),
    Stderr,
}

/// Sink for the "[Logging for XBS]" lines the build system scrapes, plus
/// the categorized dependency dump. Write failures never fail the build;
/// only failing to open the configured trace file does.
pub struct TraceLog {
    trace_path: Option<PathBuf>,
    dependency_path: Option<PathBuf>,
    sink: Mutex<Option<TraceSink>>,
    dep_sink: Mutex<Option<std::fs::File>>,
}

impl TraceLog {
    pub fn new(options: &LinkOptions) -> TraceLog {
        TraceLog {
            trace_path: options.trace_output_file.clone(),
            dependency_path: options.dependency_info_path.clone(),
            sink: Mutex::new(None),
            dep_sink: Mutex::new(None),
        }
    }

    pub fn trace(&self, line: &str) -> Result<(), LinkError> {
        let mut sink = self.sink.lock();
        if sink.is_none() {
            *sink = Some(match &self.trace_path {
                Some(path) => {
                    let file = OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(path)
                        .map_err(|_| LinkError::TraceFile { path: path.clone() })?;
                    TraceSink::File(file)
                }
                None => TraceSink::Stderr,
            });
        }
        match sink.as_mut().expect("opened above") {
            TraceSink::File(f) => {
                let _ = f.write_all(line.as_bytes());
            }
            TraceSink::Stderr => {
                let _ = std::io::stderr().write_all(line.as_bytes());
            }
        }
        Ok(())
    }

    pub fn dump_dependency(&self, category: DependencyCategory, path: &Path) {
        let dep_path = match &self.dependency_path {
            Some(p) => p,
            None => return,
        };
        let mut sink = self.dep_sink.lock();
        if sink.is_none() {
            *sink = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dep_path)
                .ok();
        }
        if let Some(f) = sink.as_mut() {
            let _ = writeln!(f, "{}: {}", category.tag(), path.display());
        }
    }
}

/// Trace lines use the real path when it resolves.
pub fn real_path_for(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
