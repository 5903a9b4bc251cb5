//! File registry.
//!
//! Maps the small [`FileId`] enumeration onto OS file handles. A file is
//! opened on first use (read/write, created if absent) and stays open for
//! the life of the registry. The registry also owns page-id allocation:
//! `nextPageId` is derived from the file length at open time and then
//! only ever increments; page ids are one-based and never reused.
//!
//! Every read and write seeks explicitly before transferring, so no code
//! may assume the OS file position survives between operations.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

use tracing::debug;

use crate::engine::config::Config;
use crate::RowdbError;

/// Identifies one of the engine's backing files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileId {
    /// The heap data file.
    Data,
    /// The write-ahead log file (reserved; not yet written).
    Log,
}

impl FileId {
    /// The on-disk/file-table code for this id.
    pub fn code(self) -> u32 {
        match self {
            FileId::Data => 1,
            FileId::Log => 2,
        }
    }

    /// Map a code back to a `FileId`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(FileId::Data),
            2 => Some(FileId::Log),
            _ => None,
        }
    }
}

/// One registered file: its id, path, open handle, and the next page id
/// to hand out.
pub struct FileHandle {
    pub file_id: FileId,
    pub path: PathBuf,
    file: File,
    next_page_id: u32,
    page_size: usize,
}

impl FileHandle {
    /// Read page `page_id` into `buf` (one full page).
    ///
    /// Fails with `ShortRead` when fewer than `page_size` bytes come
    /// back, including reads past the end of the file: a page that was
    /// never written does not exist, and creating pages is the buffer
    /// manager's allocate path, not a read side effect.
    pub fn read_page(&mut self, page_id: u32, buf: &mut [u8]) -> Result<(), RowdbError> {
        debug_assert_eq!(buf.len(), self.page_size);
        self.seek_to(page_id)?;

        let mut got = 0;
        while got < buf.len() {
            let n = self
                .file
                .read(&mut buf[got..])
                .map_err(|e| RowdbError::Io(format!("read page {}: {}", page_id, e)))?;
            if n == 0 {
                break;
            }
            got += n;
        }
        if got != buf.len() {
            return Err(RowdbError::ShortRead {
                file_id: self.file_id.code(),
                page_id,
                got,
                expected: buf.len(),
            });
        }
        Ok(())
    }

    /// Write one full page at `page_id`'s position.
    pub fn write_page(&mut self, page_id: u32, buf: &[u8]) -> Result<(), RowdbError> {
        debug_assert_eq!(buf.len(), self.page_size);
        self.seek_to(page_id)?;

        let mut written = 0;
        while written < buf.len() {
            let n = self
                .file
                .write(&buf[written..])
                .map_err(|e| RowdbError::Io(format!("write page {}: {}", page_id, e)))?;
            if n == 0 {
                return Err(RowdbError::ShortWrite {
                    file_id: self.file_id.code(),
                    page_id,
                    got: written,
                    expected: buf.len(),
                });
            }
            written += n;
        }
        Ok(())
    }

    fn seek_to(&mut self, page_id: u32) -> Result<(), RowdbError> {
        let pos = (page_id as u64 - 1) * self.page_size as u64;
        self.file
            .seek(SeekFrom::Start(pos))
            .map_err(|e| RowdbError::Io(format!("seek to page {}: {}", page_id, e)))?;
        Ok(())
    }
}

/// Open files keyed by [`FileId`].
pub struct FileRegistry {
    config: Config,
    entries: Vec<FileHandle>,
}

impl FileRegistry {
    pub fn new(config: &Config) -> Self {
        FileRegistry {
            config: config.clone(),
            entries: Vec::new(),
        }
    }

    /// The handle for `file_id`, opening the file on first use.
    pub fn handle(&mut self, file_id: FileId) -> Result<&mut FileHandle, RowdbError> {
        if let Some(i) = self.entries.iter().position(|h| h.file_id == file_id) {
            return Ok(&mut self.entries[i]);
        }

        let path = match file_id {
            FileId::Data => self.config.data_file.clone(),
            // The log file id is reserved; nothing writes it yet.
            FileId::Log => return Err(RowdbError::UnknownFileId(file_id.code())),
        };

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        // Created files are private to the owning user.
        #[cfg(unix)]
        options.mode(0o600);
        let file = options
            .open(&path)
            .map_err(|e| RowdbError::Io(format!("cannot open {}: {}", path.display(), e)))?;

        let len = file
            .metadata()
            .map_err(|e| RowdbError::Io(format!("cannot stat {}: {}", path.display(), e)))?
            .len();
        let next_page_id = (len / self.config.page_size as u64) as u32 + 1;
        debug!(?file_id, path = %path.display(), next_page_id, "opened data file");

        self.entries.push(FileHandle {
            file_id,
            path,
            file,
            next_page_id,
            page_size: self.config.page_size,
        });
        let last = self.entries.len() - 1;
        Ok(&mut self.entries[last])
    }

    /// Claim the next unallocated page id of `file_id` and advance the
    /// counter.
    pub fn allocate_new_page_id(&mut self, file_id: FileId) -> Result<u32, RowdbError> {
        let handle = self.handle(file_id)?;
        let page_id = handle.next_page_id;
        handle.next_page_id += 1;
        Ok(page_id)
    }

    /// Peek at the next page id without claiming it.
    pub fn next_page_id(&mut self, file_id: FileId) -> Result<u32, RowdbError> {
        Ok(self.handle(file_id)?.next_page_id)
    }
}
