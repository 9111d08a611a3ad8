//! Host queues and their readiness-ordered directory

mod directory;
mod host_queue;

pub use directory::QueueDirectory;
pub use host_queue::{HostQueue, QueueState, Settlement};
