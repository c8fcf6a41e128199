// Tue Jan 15 2026 - Alex

use crate::dylib::DylibFile;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The slice of link-wide state the ingestion core populates for the
/// driver: the output's dylib list, the bundle loader, and any libraries
/// requested by object files' embedded linker options.
#[derive(Default)]
pub struct LinkState {
    pub dylibs: Vec<Arc<DylibFile>>,
    pub bundle_loader: Option<Arc<DylibFile>>,
    pub linker_option_libraries: BTreeSet<String>,
    pub linker_option_frameworks: BTreeSet<String>,
}

impl LinkState {
    pub fn new() -> LinkState {
        LinkState::default()
    }
}
