//! Background work that runs off the interaction path.

mod outline_tasks;

pub use outline_tasks::{OutlineResult, OutlineTasks};

/// Errors from starting background work.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The OS refused to start a worker thread
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}
