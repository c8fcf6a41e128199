// Tue Jan 13 2026 - Alex

pub mod constants;
pub mod endian;
pub mod fat;
pub mod mapping;
pub mod probe;

pub use endian::{MachView, Nlist};
pub use fat::{select_slice, FatSelection};
pub use mapping::InputMapping;
pub use probe::{file_arch_name, make_file, IngestStats};
