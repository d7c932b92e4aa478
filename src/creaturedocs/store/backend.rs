use std::io;
use std::path::{Path, PathBuf};

/// Abstract interface for raw storage I/O.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`DocumentStore`](super::doc_store::DocumentStore) and
/// [`Document`](crate::document::Document) handle the "what" (addressing,
/// allocation, caching). Errors are plain `io::Error`s; translating them into
/// [`StoreError`](crate::error::StoreError) is the caller's job.
pub trait StorageBackend {
    /// Read a whole file.
    /// Returns Ok(None) if the file does not exist.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Write a whole file, replacing any previous content.
    /// The parent directory must already exist.
    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Create a directory and any missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// List the immediate children of a directory, as full paths.
    /// Hidden entries are included; filtering is up to the caller.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}
