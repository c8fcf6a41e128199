// Tue Jan 15 2026 - Alex

pub mod pipeline;
pub mod queue;
pub mod worker;

pub use pipeline::spawn_listener;
pub use queue::{PoolShared, PoolState};
pub use worker::spawn_worker;
