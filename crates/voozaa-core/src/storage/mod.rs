//! Storage layer
//!
//! The tracker persists its whole state as one JSON text blob under a single
//! key. The store never touches files directly; it goes through a
//! [`BlobStore`]:
//!
//! - **FileBlobStore**: one `<key>.json` file per key in the data directory
//! - **MemoryBlobStore**: in-process map for tests and embedding

pub mod error;
pub mod file;
pub mod gateway;

pub use error::{StorageError, StorageResult};
pub use file::FileBlobStore;
pub use gateway::{BlobStore, MemoryBlobStore};

/// Key the tracker state is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "voozaa_tracker_v2_state";
