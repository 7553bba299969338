#![forbid(unsafe_code)]

//! Runtime services for the palette: persisted state storage and
//! generation-tagged background work.

pub mod state_persistence;
pub mod task;

pub use state_persistence::{
    MemoryStorage, StorageBackend, StorageError, StorageResult, StoredEntry,
};
#[cfg(feature = "state-persistence")]
pub use state_persistence::FileStorage;
pub use task::{CancellationToken, GenerationCounter, ReplyChannel, Responder, Response, TaskError};
