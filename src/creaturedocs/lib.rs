//! # Creaturedocs Architecture
//!
//! Creaturedocs is the persistence layer behind a list of user-created
//! "creatures". Each creature is a small [`Record`](model::Record) (title and
//! rating) plus two images, stored together in one numbered directory.
//!
//! The crate knows nothing about presentation. Callers create, read, update,
//! delete and enumerate creatures through [`DocumentStore`](store::DocumentStore)
//! and [`Document`](document::Document); everything else is theirs.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Document Store (store/doc_store.rs)                        │
//! │  - Owns the root directory                                  │
//! │  - Allocates numbered locations, enumerates documents       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Document (document.rs)                                     │
//! │  - Lazy, cached access to record + thumbnail + full image   │
//! │  - Save / delete of its own directory                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Record Codec (codec.rs)      │ │  StorageBackend (store/)  │
//! │  - Record <-> bytes           │ │  - FsBackend, MemBackend  │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Nothing here panics on bad data or exits the process. Raw `io::Error`s
//! from document storage are converted at the Document/Store boundary into
//! [`StoreError`](error::StoreError). A missing file is never an error, only
//! an absent value.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`debug` for normal storage activity,
//! `warn` for absorbed failures) and leaves installing a subscriber to the
//! host application.
//!
//! ## Threading
//!
//! Single-threaded and blocking. The caches are `unsync` cells, so the
//! compiler refuses to share a store or a document across threads; a
//! multi-threaded host has to put the store behind its own lock.
//!
//! ## Module Overview
//!
//! - [`model`]: The [`Record`](model::Record) type
//! - [`codec`]: Record encoding and decoding
//! - [`document`]: One creature document
//! - [`store`]: Backends and the document store
//! - [`config`]: `config.json` loading and saving
//! - [`init`]: Root directory resolution and store construction
//! - [`error`]: Error types

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod init;
pub mod model;
pub mod store;

pub use document::Document;
pub use error::{Result, StoreError};
pub use model::Record;
pub use store::{DocumentStore, FileDocumentStore, MemDocumentStore};
