//! Save/load over key-value storage
//!
//! Features:
//! - Run snapshot under a fixed key, restored within a time window
//! - Corrupt, expired or unreadable snapshots degrade to a fresh run
//! - Storage abstraction so the same code runs on `localStorage` and in tests

pub mod snapshot;
pub mod store;

pub use snapshot::{PersistError, SNAPSHOT_KEY, Snapshot, autosave_due, clear, load, save, try_load};
pub use store::{KeyValueStore, MemoryStore, StorageError};
