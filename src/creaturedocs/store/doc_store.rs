use super::backend::StorageBackend;
use super::fs_backend::FsBackend;
use super::mem_backend::MemBackend;
use super::DEFAULT_EXTENSION;
use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::model::Record;
use once_cell::unsync::OnceCell;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The root collection of creature documents.
///
/// Owns the root directory, allocates numeric identities for new documents
/// and enumerates existing ones. Holds no cached list of documents: every
/// call to [`list_documents`](Self::list_documents) rescans the root.
pub struct DocumentStore<B: StorageBackend> {
    backend: B,
    root: PathBuf,
    extension: String,
    root_prepared: OnceCell<()>,
}

pub type FileDocumentStore = DocumentStore<FsBackend>;
pub type MemDocumentStore = DocumentStore<MemBackend>;

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_backend(FsBackend::new(), root)
    }
}

impl<B: StorageBackend> DocumentStore<B> {
    pub fn with_backend(backend: B, root: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            root_prepared: OnceCell::new(),
        }
    }

    pub fn with_extension(mut self, ext: &str) -> Self {
        self.extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The root directory, created on first use.
    ///
    /// Creation is attempted once per store. If it fails the path is still
    /// returned; operations that need the directory will fail on their own.
    pub fn root_directory(&self) -> &Path {
        self.root_prepared.get_or_init(|| {
            match self.backend.create_dir_all(&self.root) {
                Ok(()) => debug!(root = %self.root.display(), "document root ready"),
                Err(e) => warn!(
                    root = %self.root.display(),
                    error = %e,
                    "could not create document root"
                ),
            }
        });
        &self.root
    }

    /// Location of the document numbered `number`.
    pub fn location_for(&self, number: u64) -> PathBuf {
        self.root.join(format!("{}.{}", number, self.extension))
    }

    /// Pick the location for a new document: one past the highest number in
    /// use. The directory is not created.
    ///
    /// Gaps left by deleted documents are never backfilled; only removing the
    /// highest-numbered document frees its number.
    pub fn allocate_next_location(&self) -> Result<PathBuf> {
        let root = self.root_directory();
        let entries = self
            .document_entries()
            .map_err(|e| StoreError::storage(root, e))?;

        let max_number = entries
            .iter()
            .map(|path| document_number(path))
            .max()
            .unwrap_or(0);
        let next = max_number
            .checked_add(1)
            .ok_or_else(|| StoreError::Store("document numbers exhausted".to_string()))?;

        let location = self.location_for(next);
        debug!(location = %location.display(), "allocated document location");
        Ok(location)
    }

    /// All documents under the root, in the backend's enumeration order.
    ///
    /// Only the directory listing is read. If the root cannot be listed the
    /// result is empty.
    pub fn list_documents(&self) -> Vec<Document<'_, B>> {
        match self.document_entries() {
            Ok(entries) => entries
                .into_iter()
                .map(|location| Document::at(self, location))
                .collect(),
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "could not list documents");
                Vec::new()
            }
        }
    }

    /// Bind a document to a known location. Nothing is read until a field is
    /// accessed.
    pub fn open_document(&self, location: impl Into<PathBuf>) -> Document<'_, B> {
        Document::at(self, location.into())
    }

    /// A transient document with no storage slot yet.
    pub fn new_document(
        &self,
        record: Record,
        thumbnail: Option<Vec<u8>>,
        full_image: Option<Vec<u8>>,
    ) -> Document<'_, B> {
        Document::new(self, record, thumbnail, full_image)
    }

    /// Create a document and persist it into a freshly allocated slot.
    pub fn create_document(
        &self,
        title: impl Into<String>,
        rating: f32,
        thumbnail: Option<Vec<u8>>,
        full_image: Option<Vec<u8>>,
    ) -> Result<Document<'_, B>> {
        let mut doc = self.new_document(Record::new(title, rating), thumbnail, full_image);
        doc.save()?;
        Ok(doc)
    }

    fn document_entries(&self) -> std::io::Result<Vec<PathBuf>> {
        let entries = self.backend.list_dir(self.root_directory())?;
        Ok(entries
            .into_iter()
            .filter(|path| !is_hidden(path) && self.has_extension(path))
            .collect())
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.extension))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Numeric part of `<N>.<ext>`. Anything that is not a plain number counts as 0.
fn document_number(path: &Path) -> u64 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
