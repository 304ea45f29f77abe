// Adapters layer: concrete implementations for external systems (snapshot storage).

pub mod storage;

pub use storage::{FileSnapshotStore, MemorySnapshotStore};
