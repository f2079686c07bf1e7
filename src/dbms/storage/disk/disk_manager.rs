use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::dbms::types::{PageData, PageId, PAGE_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum DiskManagerError {
    /// The page was never allocated, or has been deallocated
    #[error("page {0} not found on disk")]
    PageNotFound(PageId),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Synchronous page-granularity storage underneath the buffer pool.
///
/// Page ids are allocated monotonically and never reused. Reads and writes
/// are atomic at page granularity as far as the pool is concerned.
#[cfg_attr(test, automock)]
pub trait IDiskManager {
    fn write_page(&mut self, page_id: PageId, page: &PageData) -> Result<(), DiskManagerError>;
    fn read_page(&mut self, page_id: PageId) -> Result<PageData, DiskManagerError>;
    fn write_log(&mut self, log: &[u8]) -> Result<(), DiskManagerError>;
    fn read_log(&mut self, size: usize, offset: u64) -> Result<Vec<u8>, DiskManagerError>;
    fn allocate_page(&mut self) -> Result<PageId, DiskManagerError>;
    fn deallocate_page(&mut self, page_id: PageId) -> Result<(), DiskManagerError>;
}

/// File-backed disk manager: one database file holding pages back to back,
/// plus a sibling log file reserved for write-ahead-log records.
pub struct FileDiskManager {
    db_file: File,
    log_file: File,
    next_page_id: PageId,
}

impl FileDiskManager {
    /// Opens (or creates) the database file and its `.log` sibling. The page
    /// id allocator resumes from the current file length.
    pub fn new(db_path: &Path) -> Result<Self, DiskManagerError> {
        let log_path = db_path.with_extension("log");

        let db_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(db_path)?;
        let log_file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&log_path)?;

        let next_page_id = (db_file.metadata()?.len() / PAGE_SIZE as u64) as PageId;

        Ok(FileDiskManager {
            db_file,
            log_file,
            next_page_id,
        })
    }

    fn page_offset(page_id: PageId) -> u64 {
        page_id as u64 * PAGE_SIZE as u64
    }
}

impl IDiskManager for FileDiskManager {
    fn write_page(&mut self, page_id: PageId, page: &PageData) -> Result<(), DiskManagerError> {
        self.db_file.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        self.db_file.write_all(page)?;
        self.db_file.flush()?;
        Ok(())
    }

    fn read_page(&mut self, page_id: PageId) -> Result<PageData, DiskManagerError> {
        let mut page = [0u8; PAGE_SIZE];
        let offset = Self::page_offset(page_id);
        let file_len = self.db_file.metadata()?.len();

        // A page past the end of the file has simply never been written;
        // it reads back as zeroes.
        if offset < file_len {
            self.db_file.seek(SeekFrom::Start(offset))?;
            let available = ((file_len - offset) as usize).min(PAGE_SIZE);
            self.db_file.read_exact(&mut page[..available])?;
        }
        Ok(page)
    }

    fn write_log(&mut self, log: &[u8]) -> Result<(), DiskManagerError> {
        self.log_file.write_all(log)?;
        self.log_file.flush()?;
        Ok(())
    }

    fn read_log(&mut self, size: usize, offset: u64) -> Result<Vec<u8>, DiskManagerError> {
        let file_len = self.log_file.metadata()?.len();
        if offset >= file_len {
            return Ok(Vec::new());
        }

        let mut log = vec![0u8; size.min((file_len - offset) as usize)];
        self.log_file.seek(SeekFrom::Start(offset))?;
        self.log_file.read_exact(&mut log)?;
        Ok(log)
    }

    fn allocate_page(&mut self) -> Result<PageId, DiskManagerError> {
        let page_id = self.next_page_id;
        self.next_page_id += 1;
        Ok(page_id)
    }

    fn deallocate_page(&mut self, _page_id: PageId) -> Result<(), DiskManagerError> {
        // Space is not reclaimed; the id is never handed out again because
        // allocation is monotonic. Idempotent by construction.
        Ok(())
    }
}
