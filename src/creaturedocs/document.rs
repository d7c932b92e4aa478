//! # Document
//!
//! A [`Document`] is one creature entry: its [`Record`] plus a thumbnail and
//! a full-size image, all living in one directory under the store root.
//!
//! ## Lazy Read-Through Cache
//!
//! Each of the three fields is read from disk the first time it is accessed
//! and cached for the lifetime of the handle. A missing or unreadable file
//! is cached as "absent". The one exception is a record file that exists but
//! does not decode: that surfaces as [`StoreError::CorruptRecord`] and is
//! not cached, so a later access tries again.
//!
//! Setters only touch the cache. Nothing reaches disk until [`Document::save`].
//!
//! ## Location
//!
//! A document created in memory has no location. The first successful
//! [`Document::save`] allocates one through the store; after that it never
//! changes.

use crate::codec;
use crate::error::{Result, StoreError};
use crate::model::Record;
use crate::store::backend::StorageBackend;
use crate::store::{DocumentStore, FULL_IMAGE_FILE, RECORD_FILE, THUMBNAIL_FILE};
use once_cell::unsync::OnceCell;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct Document<'s, B: StorageBackend> {
    store: &'s DocumentStore<B>,
    location: Option<PathBuf>,
    record: OnceCell<Option<Record>>,
    thumbnail: OnceCell<Option<Vec<u8>>>,
    full_image: OnceCell<Option<Vec<u8>>>,
}

impl<'s, B: StorageBackend> Document<'s, B> {
    /// A fresh document held in memory only.
    pub fn new(
        store: &'s DocumentStore<B>,
        record: Record,
        thumbnail: Option<Vec<u8>>,
        full_image: Option<Vec<u8>>,
    ) -> Self {
        Self {
            store,
            location: None,
            record: OnceCell::with_value(Some(record)),
            thumbnail: OnceCell::with_value(thumbnail),
            full_image: OnceCell::with_value(full_image),
        }
    }

    /// A document bound to an existing location, with nothing read yet.
    pub fn at(store: &'s DocumentStore<B>, location: PathBuf) -> Self {
        Self {
            store,
            location: Some(location),
            record: OnceCell::new(),
            thumbnail: OnceCell::new(),
            full_image: OnceCell::new(),
        }
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn is_saved(&self) -> bool {
        self.location.is_some()
    }

    pub fn record(&self) -> Result<Option<&Record>> {
        let Some(location) = self.location.as_deref() else {
            return Ok(self.record.get().and_then(Option::as_ref));
        };
        self.record
            .get_or_try_init(|| self.load_record(location))
            .map(Option::as_ref)
    }

    pub fn set_record(&mut self, record: Record) {
        self.record = OnceCell::with_value(Some(record));
    }

    pub fn title(&self) -> Result<Option<&str>> {
        Ok(self.record()?.map(|r| r.title.as_str()))
    }

    pub fn rating(&self) -> Result<Option<f32>> {
        Ok(self.record()?.map(|r| r.rating))
    }

    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.image(&self.thumbnail, THUMBNAIL_FILE)
    }

    /// Replace the cached thumbnail. `None` clears the in-memory value only;
    /// a thumbnail already on disk is left alone by the next save.
    pub fn set_thumbnail(&mut self, thumbnail: Option<Vec<u8>>) {
        self.thumbnail = OnceCell::with_value(thumbnail);
    }

    pub fn full_image(&self) -> Option<&[u8]> {
        self.image(&self.full_image, FULL_IMAGE_FILE)
    }

    /// Replace the cached full-size image. Same rules as [`set_thumbnail`](Self::set_thumbnail).
    pub fn set_full_image(&mut self, full_image: Option<Vec<u8>>) {
        self.full_image = OnceCell::with_value(full_image);
    }

    /// Make sure the document has a storage slot, allocating and creating one
    /// if needed. On failure the document stays without a location.
    pub fn ensure_location(&mut self) -> Result<&Path> {
        let location = match self.location.take() {
            Some(location) => location,
            None => self.create_location()?,
        };
        Ok(self.location.insert(location).as_path())
    }

    /// Persist the in-memory state.
    ///
    /// Does nothing when there is no record. Otherwise writes the record and
    /// whichever images are held in memory. Every write is attempted; if any
    /// fail the result is [`StoreError::IncompleteSave`] and the files that
    /// did get written stay in place.
    pub fn save(&mut self) -> Result<()> {
        let encoded = match self.record()? {
            Some(record) => codec::encode(record)?,
            None => {
                debug!("nothing to save, document has no record");
                return Ok(());
            }
        };
        let location = self.ensure_location()?.to_path_buf();
        let backend = self.store.backend();

        let writes = [
            (RECORD_FILE, Some(encoded.as_slice())),
            (THUMBNAIL_FILE, cached_bytes(&self.thumbnail)),
            (FULL_IMAGE_FILE, cached_bytes(&self.full_image)),
        ];

        let mut failed = Vec::new();
        for (file_name, bytes) in writes {
            let Some(bytes) = bytes else { continue };
            let path = location.join(file_name);
            if let Err(e) = backend.write_file(&path, bytes) {
                warn!(path = %path.display(), error = %e, "could not write document file");
                failed.push(file_name.to_string());
            }
        }

        if failed.is_empty() {
            debug!(location = %location.display(), "document saved");
            Ok(())
        } else {
            Err(StoreError::IncompleteSave { location, failed })
        }
    }

    /// Remove the document's directory and everything in it.
    ///
    /// Consumes the handle. A document that was never saved, or whose
    /// directory is already gone, deletes successfully.
    pub fn delete(self) -> Result<()> {
        let Some(location) = self.location else {
            return Ok(());
        };
        match self.store.backend().remove_dir_all(&location) {
            Ok(()) => {
                debug!(location = %location.display(), "document deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::storage(location, e)),
        }
    }

    fn create_location(&self) -> Result<PathBuf> {
        let location = self.store.allocate_next_location()?;
        self.store
            .backend()
            .create_dir_all(&location)
            .map_err(|e| StoreError::storage(&location, e))?;
        debug!(location = %location.display(), "created document directory");
        Ok(location)
    }

    fn load_record(&self, location: &Path) -> Result<Option<Record>> {
        let path = location.join(RECORD_FILE);
        match self.read_optional(&path) {
            Some(bytes) => {
                let record = codec::decode(&bytes).inspect_err(|e| {
                    warn!(path = %path.display(), error = %e, "corrupt record file");
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn image<'a>(
        &'a self,
        cell: &'a OnceCell<Option<Vec<u8>>>,
        file_name: &str,
    ) -> Option<&'a [u8]> {
        let Some(location) = self.location.as_deref() else {
            return cached_bytes(cell);
        };
        cell.get_or_init(|| self.read_optional(&location.join(file_name)))
            .as_deref()
    }

    /// Missing and unreadable files both come back as `None`.
    fn read_optional(&self, path: &Path) -> Option<Vec<u8>> {
        debug!(path = %path.display(), "loading");
        match self.store.backend().read_file(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read document file");
                None
            }
        }
    }
}

fn cached_bytes(cell: &OnceCell<Option<Vec<u8>>>) -> Option<&[u8]> {
    cell.get().and_then(|bytes| bytes.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use crate::store::MemDocumentStore;
    use crate::store::FileDocumentStore;
    use std::fs;
    use tempfile::TempDir;

    fn mem_store() -> MemDocumentStore {
        DocumentStore::with_backend(MemBackend::new(), "/docs")
    }

    fn disk_store(dir: &TempDir) -> FileDocumentStore {
        FileDocumentStore::new(dir.path().join("PrivateDocuments"))
    }

    #[test]
    fn transient_document_serves_memory_only() {
        let store = mem_store();
        let doc = store.new_document(Record::new("Bat", 4.0), Some(vec![1, 2]), None);

        assert!(!doc.is_saved());
        assert_eq!(doc.title().unwrap(), Some("Bat"));
        assert_eq!(doc.thumbnail(), Some(&[1u8, 2][..]));
        assert_eq!(doc.full_image(), None);
        assert_eq!(store.backend().total_reads(), 0);
    }

    #[test]
    fn record_is_loaded_once() {
        let store = mem_store();
        let location = store
            .create_document("Bat", 4.0, None, None)
            .unwrap()
            .location()
            .unwrap()
            .to_path_buf();
        let record_path = location.join(RECORD_FILE);

        let doc = store.open_document(&location);
        assert_eq!(store.backend().read_count(&record_path), 0);

        let first = doc.record().unwrap().cloned();
        let second = doc.record().unwrap().cloned();

        assert_eq!(first, Some(Record::new("Bat", 4.0)));
        assert_eq!(first, second);
        assert_eq!(store.backend().read_count(&record_path), 1);
    }

    #[test]
    fn missing_images_are_cached_as_absent() {
        let store = mem_store();
        let doc = store.create_document("Bat", 4.0, None, None).unwrap();
        let location = doc.location().unwrap().to_path_buf();

        let reopened = store.open_document(&location);
        assert_eq!(reopened.thumbnail(), None);
        assert_eq!(reopened.thumbnail(), None);
        assert_eq!(
            store.backend().read_count(&location.join(THUMBNAIL_FILE)),
            1
        );
    }

    #[test]
    fn missing_record_file_is_absent_not_error() {
        let store = mem_store();
        let location = store.location_for(1);
        store.backend().create_dir_all(&location).unwrap();

        let doc = store.open_document(&location);
        assert!(doc.record().unwrap().is_none());
    }

    #[test]
    fn corrupt_record_is_isolated_from_images() {
        let store = mem_store();
        let location = store.location_for(1);
        let backend = store.backend();
        backend.create_dir_all(&location).unwrap();
        backend
            .write_file(&location.join(RECORD_FILE), b"{ not a record")
            .unwrap();
        backend
            .write_file(&location.join(THUMBNAIL_FILE), b"thumb")
            .unwrap();
        backend
            .write_file(&location.join(FULL_IMAGE_FILE), b"full")
            .unwrap();

        let doc = store.open_document(&location);
        assert!(matches!(doc.record(), Err(StoreError::CorruptRecord(_))));
        assert_eq!(doc.thumbnail(), Some(&b"thumb"[..]));
        assert_eq!(doc.full_image(), Some(&b"full"[..]));
    }

    #[test]
    fn corrupt_record_is_retried() {
        let store = mem_store();
        let location = store.location_for(1);
        let record_path = location.join(RECORD_FILE);
        store.backend().create_dir_all(&location).unwrap();
        store.backend().write_file(&record_path, b"junk").unwrap();

        let doc = store.open_document(&location);
        assert!(doc.record().is_err());

        let good = codec::encode(&Record::new("Fixed", 1.0)).unwrap();
        store.backend().write_file(&record_path, &good).unwrap();
        assert_eq!(doc.title().unwrap(), Some("Fixed"));
        assert_eq!(store.backend().read_count(&record_path), 2);
    }

    #[test]
    fn setters_do_not_touch_disk() {
        let store = mem_store();
        let mut doc = store.create_document("Bat", 4.0, None, None).unwrap();
        let record_path = doc.location().unwrap().join(RECORD_FILE);

        doc.set_record(Record::new("Renamed", 1.0));
        doc.set_thumbnail(Some(vec![9]));

        let on_disk = store.backend().read_file(&record_path).unwrap().unwrap();
        assert_eq!(codec::decode(&on_disk).unwrap().title, "Bat");
        assert_eq!(doc.title().unwrap(), Some("Renamed"));
        assert_eq!(doc.thumbnail(), Some(&[9u8][..]));
    }

    #[test]
    fn save_without_record_is_noop() {
        let store = mem_store();
        let location = store.location_for(5);
        let mut doc = store.open_document(&location);

        doc.save().unwrap();

        assert!(!store.backend().dir_exists(&location));
    }

    #[test]
    fn save_allocates_once_and_keeps_location() {
        let store = mem_store();
        let mut doc = store.new_document(Record::new("Bat", 4.0), None, None);
        doc.save().unwrap();
        let first = doc.location().unwrap().to_path_buf();

        doc.set_record(Record::new("Bat", 5.0));
        doc.save().unwrap();

        assert_eq!(doc.location(), Some(first.as_path()));
        assert_eq!(store.list_documents().len(), 1);
    }

    #[test]
    fn failed_allocation_leaves_document_unsaved() {
        let store = mem_store();
        store.root_directory();
        store.backend().set_simulate_dir_error(true);

        let mut doc = store.new_document(Record::new("Bat", 4.0), None, None);
        let err = doc.save().unwrap_err();

        assert!(matches!(err, StoreError::StorageUnavailable { .. }));
        assert!(!doc.is_saved());
    }

    #[test]
    fn failed_directory_creation_leaves_document_unsaved() {
        let store = mem_store();
        store.root_directory();
        store.backend().set_simulate_create_dir_error(true);

        let mut doc = store.new_document(Record::new("Bat", 4.0), None, None);
        let err = doc.ensure_location().unwrap_err();

        match err {
            StoreError::StorageUnavailable { path, .. } => {
                assert_eq!(path, store.location_for(1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!doc.is_saved());

        // save goes through the same path and still persists nothing
        assert!(matches!(
            doc.save(),
            Err(StoreError::StorageUnavailable { .. })
        ));
        assert!(!doc.is_saved());
        assert!(!store.backend().dir_exists(&store.location_for(1)));

        store.backend().set_simulate_create_dir_error(false);
        doc.save().unwrap();
        assert_eq!(doc.location(), Some(store.location_for(1).as_path()));
    }

    #[test]
    fn invalid_record_is_rejected_before_allocation() {
        let store = mem_store();
        let mut doc = store.new_document(Record::new("Bad", f32::NAN), None, None);

        assert!(matches!(doc.save(), Err(StoreError::InvalidRecord(_))));
        assert!(!doc.is_saved());
        assert!(store.list_documents().is_empty());
    }

    #[test]
    fn partial_save_reports_failed_files_and_keeps_the_rest() {
        let store = mem_store();
        store.backend().fail_writes_to(THUMBNAIL_FILE);

        let mut doc =
            store.new_document(Record::new("Bat", 4.0), Some(vec![1]), Some(vec![2]));
        let err = doc.save().unwrap_err();

        match err {
            StoreError::IncompleteSave { location, failed } => {
                assert_eq!(failed, vec![THUMBNAIL_FILE.to_string()]);
                assert!(store.backend().file_exists(&location.join(RECORD_FILE)));
                assert!(store.backend().file_exists(&location.join(FULL_IMAGE_FILE)));
                assert!(!store.backend().file_exists(&location.join(THUMBNAIL_FILE)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(doc.is_saved());
    }

    #[test]
    fn save_skips_images_never_loaded() {
        let store = mem_store();
        let location = store
            .create_document("Bat", 4.0, Some(vec![7]), None)
            .unwrap()
            .location()
            .unwrap()
            .to_path_buf();

        let mut doc = store.open_document(&location);
        doc.set_record(Record::new("Bat", 2.0));
        doc.save().unwrap();

        let reopened = store.open_document(&location);
        assert_eq!(reopened.rating().unwrap(), Some(2.0));
        assert_eq!(reopened.thumbnail(), Some(&[7u8][..]));
    }

    #[test]
    fn delete_unsaved_is_noop() {
        let store = mem_store();
        let doc = store.new_document(Record::new("Bat", 4.0), None, None);
        doc.delete().unwrap();
    }

    #[test]
    fn delete_reports_removal_failure() {
        let store = mem_store();
        let doc = store.create_document("Bat", 4.0, None, None).unwrap();
        store.backend().set_simulate_dir_error(true);

        assert!(matches!(
            doc.delete(),
            Err(StoreError::StorageUnavailable { .. })
        ));
    }

    #[test]
    fn delete_of_missing_directory_succeeds() {
        let store = mem_store();
        let doc = store.open_document(store.location_for(9));
        doc.delete().unwrap();
    }

    #[test]
    fn save_then_reload_on_disk() {
        let dir = TempDir::new().unwrap();
        let store = disk_store(&dir);
        let doc = store
            .create_document("Vampire Bat", 4.5, Some(vec![0xAA; 16]), Some(vec![0xBB; 64]))
            .unwrap();
        let location = doc.location().unwrap().to_path_buf();
        assert_eq!(
            location,
            dir.path().join("PrivateDocuments").join("1.scarycreature")
        );

        let reloaded = store.open_document(&location);
        assert_eq!(
            reloaded.record().unwrap(),
            Some(&Record::new("Vampire Bat", 4.5))
        );
        assert_eq!(reloaded.thumbnail(), Some(&[0xAAu8; 16][..]));
        assert_eq!(reloaded.full_image(), Some(&[0xBBu8; 64][..]));
        assert!(fs::metadata(location.join(RECORD_FILE)).unwrap().is_file());
    }
}
