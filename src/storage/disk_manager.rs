//! Disk Manager - page-granular file I/O.
//!
//! The [`DiskManager`] owns the open heap files and performs synchronous
//! page transfers addressed by `(FileId, PageId)`:
//! - Reading and writing pages
//! - Opening, creating and closing table files
//! - File-name lookup for diagnostics

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, FileId, PageId, Result};
use crate::storage::page::Page;

struct DbFile {
    file: File,
    path: PathBuf,
}

/// Manages disk I/O for a set of heap files.
///
/// # File Layout
/// Each file holds pages laid out sequentially; page N lives at offset
/// `N × PAGE_SIZE`.
///
/// # Fresh pages
/// The table layer allocates a page by bumping its page counter and
/// fetching the new id; no explicit allocation call reaches the disk.
/// Reading past end-of-file therefore yields a zeroed page, and the
/// first write-back materializes it.
///
/// # Thread Safety
/// `DiskManager` is single-threaded; the `BufferPoolManager` serializes
/// access behind a mutex.
///
/// # Durability
/// Every page write is followed by `fsync()`. Conservative, and the
/// right default until a WAL takes over durability.
pub struct DiskManager {
    files: HashMap<FileId, DbFile>,
    next_file_id: u32,
}

impl DiskManager {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            next_file_id: 0,
        }
    }

    /// Create a new file and register it.
    ///
    /// # Errors
    /// Fails if the file already exists or cannot be created.
    pub fn create_file<P: AsRef<Path>>(&mut self, path: P) -> Result<FileId> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;
        Ok(self.register(file, path.as_ref().to_path_buf()))
    }

    /// Open an existing file and register it.
    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> Result<FileId> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Ok(self.register(file, path.as_ref().to_path_buf()))
    }

    /// Open an existing file, or create it if missing.
    pub fn open_or_create<P: AsRef<Path>>(&mut self, path: P) -> Result<FileId> {
        if path.as_ref().exists() {
            self.open_file(path)
        } else {
            self.create_file(path)
        }
    }

    /// Unregister a file and close its handle.
    ///
    /// The buffer pool must have dropped all of the file's pages first.
    pub fn close_file(&mut self, file_id: FileId) -> Result<()> {
        self.files
            .remove(&file_id)
            .map(|_| ())
            .ok_or(Error::UnknownFile(file_id))
    }

    /// Path of the backing file, for diagnostics and table naming.
    pub fn file_name(&self, file_id: FileId) -> Result<String> {
        let db_file = self.files.get(&file_id).ok_or(Error::UnknownFile(file_id))?;
        Ok(db_file.path.to_string_lossy().into_owned())
    }

    /// Read a page into `page`.
    ///
    /// Reads past the end of the file zero-fill the buffer; a fresh page
    /// looks empty until its first write-back.
    pub fn read_page(&mut self, file_id: FileId, page_id: PageId, page: &mut Page) -> Result<()> {
        let db_file = self
            .files
            .get_mut(&file_id)
            .ok_or(Error::UnknownFile(file_id))?;

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        db_file.file.seek(SeekFrom::Start(offset))?;

        let buf = page.as_mut_slice();
        let mut filled = 0;
        while filled < PAGE_SIZE {
            match db_file.file.read(&mut buf[filled..]) {
                Ok(0) => break, // EOF: zero-fill the rest
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buf[filled..].fill(0);
        Ok(())
    }

    /// Write a page, extending the file as needed, then fsync.
    pub fn write_page(&mut self, file_id: FileId, page_id: PageId, page: &Page) -> Result<()> {
        let db_file = self
            .files
            .get_mut(&file_id)
            .ok_or(Error::UnknownFile(file_id))?;

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        db_file.file.seek(SeekFrom::Start(offset))?;
        db_file.file.write_all(page.as_slice())?;
        db_file.file.sync_all()?;

        Ok(())
    }

    /// Number of whole pages currently materialized in the file.
    pub fn page_count(&self, file_id: FileId) -> Result<u32> {
        let db_file = self.files.get(&file_id).ok_or(Error::UnknownFile(file_id))?;
        let len = db_file.file.metadata()?.len();
        Ok((len / PAGE_SIZE as u64) as u32)
    }

    fn register(&mut self, file: File, path: PathBuf) -> FileId {
        let file_id = FileId::new(self.next_file_id);
        self.next_file_id += 1;
        self.files.insert(file_id, DbFile { file, path });
        file_id
    }
}

impl Default for DiskManager {
    fn default() -> Self {
        Self::new()
    }
}
