//! # Storage Layer
//!
//! Creature documents are stored one directory per document. There is no
//! index file: the directory listing *is* the index.
//!
//! ## Storage Layout
//!
//! ```text
//! PrivateDocuments/
//! ├── 1.scarycreature/
//! │   ├── record.bin      # Encoded Record (see codec.rs)
//! │   ├── thumb.img       # Raw thumbnail bytes
//! │   └── full.img        # Raw full-size image bytes
//! ├── 2.scarycreature/
//! └── ...
//! ```
//!
//! ## Identity Allocation
//!
//! A new document gets `max(N) + 1` over the directories currently present.
//! Numbers freed by deleting a document in the middle are not reused; only
//! deleting the highest-numbered document makes its number available again.
//! This is O(n) per allocation, which is fine at the scale of a personal list.
//!
//! ## Split of Responsibilities
//!
//! - [`backend::StorageBackend`]: raw I/O (read/write/list/create/remove).
//!   - [`fs_backend::FsBackend`]: production, on the real filesystem.
//!   - [`mem_backend::MemBackend`]: in-memory, counts reads and simulates
//!     failures for tests.
//! - [`doc_store::DocumentStore`]: root directory, allocation, enumeration.
//! - [`Document`](crate::document::Document): one entry's lazy cache and
//!   its own save/delete.
//!
//! ## Concurrency
//!
//! Everything here is single-threaded and blocking. Two documents bound to
//! the same location are not coordinated and the last writer wins per file.

pub mod backend;
pub mod doc_store;
pub mod fs_backend;
pub mod mem_backend;

pub use doc_store::{DocumentStore, FileDocumentStore, MemDocumentStore};

/// Default extension of document directories.
pub const DEFAULT_EXTENSION: &str = "scarycreature";

pub const RECORD_FILE: &str = "record.bin";
pub const THUMBNAIL_FILE: &str = "thumb.img";
pub const FULL_IMAGE_FILE: &str = "full.img";
