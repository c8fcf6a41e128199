// Tue Jan 15 2026 - Alex

pub mod input_files;
pub mod state;
pub mod trace;

pub use input_files::InputFiles;
pub use state::LinkState;
pub use trace::{DependencyCategory, TraceLog};
