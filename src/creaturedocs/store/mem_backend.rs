use super::backend::StorageBackend;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the store is single-threaded.
/// This allows the `StorageBackend` trait to use `&self` for all methods.
///
/// Besides holding files, it counts how many times each path was read and
/// can simulate failures, which is what the lazy-loading and error-path
/// tests rely on.
#[derive(Default)]
pub struct MemBackend {
    dirs: RefCell<BTreeSet<PathBuf>>,
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    reads: RefCell<HashMap<PathBuf, usize>>,
    simulate_write_error: RefCell<bool>,
    simulate_dir_error: RefCell<bool>,
    simulate_create_dir_error: RefCell<bool>,
    failing_files: RefCell<Vec<String>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for every file.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make writes fail for files with this name, wherever they live.
    pub fn fail_writes_to(&self, file_name: &str) {
        self.failing_files.borrow_mut().push(file_name.to_string());
    }

    /// Enable error simulation for directory creation, removal and listing.
    pub fn set_simulate_dir_error(&self, simulate: bool) {
        *self.simulate_dir_error.borrow_mut() = simulate;
    }

    /// Enable error simulation for directory creation only; listing and
    /// removal keep working.
    pub fn set_simulate_create_dir_error(&self, simulate: bool) {
        *self.simulate_create_dir_error.borrow_mut() = simulate;
    }

    /// Number of `read_file` calls made for `path`, hits and misses alike.
    pub fn read_count(&self, path: &Path) -> usize {
        self.reads.borrow().get(path).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.reads.borrow().values().sum()
    }

    pub fn dir_exists(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
    }

    pub fn file_exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn dir_error(&self, op: &str) -> Option<io::Error> {
        if *self.simulate_dir_error.borrow() {
            Some(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Simulated {} error", op),
            ))
        } else {
            None
        }
    }

    fn write_fails(&self, path: &Path) -> bool {
        if *self.simulate_write_error.borrow() {
            return true;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.failing_files.borrow().iter().any(|f| f == name)
    }
}

impl StorageBackend for MemBackend {
    fn read_file(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        *self.reads.borrow_mut().entry(path.to_path_buf()).or_insert(0) += 1;
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if self.write_fails(path) {
            return Err(io::Error::new(io::ErrorKind::Other, "Simulated write error"));
        }
        if self.dirs.borrow().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "a directory exists at this path",
            ));
        }
        let parent_exists = path
            .parent()
            .is_some_and(|parent| self.dirs.borrow().contains(parent));
        if !parent_exists {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "parent directory does not exist",
            ));
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if let Some(err) = self.dir_error("create_dir") {
            return Err(err);
        }
        if *self.simulate_create_dir_error.borrow() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Simulated create_dir error",
            ));
        }
        let files = self.files.borrow();
        if path.ancestors().any(|p| files.contains_key(p)) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "a file exists at this path",
            ));
        }
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        if let Some(err) = self.dir_error("remove_dir") {
            return Err(err);
        }
        if !self.dirs.borrow().contains(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        self.dirs.borrow_mut().retain(|d| !d.starts_with(path));
        self.files.borrow_mut().retain(|f, _| !f.starts_with(path));
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if let Some(err) = self.dir_error("list_dir") {
            return Err(err);
        }
        let dirs = self.dirs.borrow();
        if !dirs.contains(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        let files = self.files.borrow();
        let children = dirs
            .iter()
            .chain(files.keys())
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        Ok(children)
    }
}
