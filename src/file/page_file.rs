use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::error::{PageFileError, PageFileResult};
use super::{PAGE_SIZE, PageBuffer, PageId};

/// One page of zero bytes, used to initialize fresh pages
const ZERO_PAGE: PageBuffer = [0u8; PAGE_SIZE];

/// Handle to an open page file
///
/// The backing file is an array of `PAGE_SIZE` pages with no header or
/// metadata: page `i` occupies bytes `[i*PAGE_SIZE, (i+1)*PAGE_SIZE)`.
/// The handle owns the OS file exclusively; at most one handle per file
/// may be live at a time.
pub struct PageFile {
    /// Path of the backing file
    path: PathBuf,
    /// Number of pages in the file, derived from its byte length at open
    /// and incremented on every successful append
    total_pages: usize,
    /// Page targeted by the last successful positioned read or write
    current_position: PageId,
    /// Exclusively owned OS file; taken out exactly once on close
    file: Option<File>,
}

impl PageFile {
    /// Create a new page file containing a single zero-filled page
    ///
    /// Truncates any existing content at `path`. Does not return a handle;
    /// callers open the file separately.
    pub fn create<P: AsRef<Path>>(path: P) -> PageFileResult<()> {
        let path = path.as_ref();

        let mut file = File::create(path)
            .map_err(|_| PageFileError::FileUnavailable(path.display().to_string()))?;

        file.write_all(&ZERO_PAGE)
            .map_err(|e| PageFileError::WriteFailed(e.to_string()))?;

        Ok(())
    }

    /// Open an existing page file for reading and writing
    ///
    /// The page count is the file's byte length divided by `PAGE_SIZE`,
    /// rounded down: a trailing partial page is not counted and its bytes
    /// are unreachable through the page interface.
    pub fn open<P: AsRef<Path>>(path: P) -> PageFileResult<PageFile> {
        let path = path.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|_| PageFileError::FileUnavailable(path.display().to_string()))?;

        let file_size = file
            .metadata()
            .map_err(|_| PageFileError::FileUnavailable(path.display().to_string()))?
            .len();

        Ok(PageFile {
            path: path.to_path_buf(),
            total_pages: (file_size / PAGE_SIZE as u64) as usize,
            current_position: 0,
            file: Some(file),
        })
    }

    /// Close the page file, releasing the OS resource
    ///
    /// The handle stays around but every subsequent operation on it fails
    /// with `HandleNotInitialized`, including a second close.
    pub fn close(&mut self) -> PageFileResult<()> {
        self.file
            .take()
            .map(drop)
            .ok_or(PageFileError::HandleNotInitialized)
    }

    /// Remove a page file from disk
    ///
    /// No handle involved; the caller must not have the file open.
    pub fn destroy<P: AsRef<Path>>(path: P) -> PageFileResult<()> {
        let path = path.as_ref();

        fs::remove_file(path)
            .map_err(|_| PageFileError::FileUnavailable(path.display().to_string()))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages currently in the file
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Whether the OS resource is still held
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Page targeted by the last successful positioned read or write
    ///
    /// Starts at 0 on open. Pure query, cannot fail.
    pub fn position(&self) -> PageId {
        self.current_position
    }

    /// Read page `page_id` into `buf`
    ///
    /// On success the current position moves to `page_id`.
    pub fn read_block(&mut self, page_id: PageId, buf: &mut PageBuffer) -> PageFileResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or(PageFileError::HandleNotInitialized)?;

        if page_id >= self.total_pages {
            return Err(PageFileError::PageOutOfRange(page_id));
        }

        let offset = (page_id * PAGE_SIZE) as u64;
        file.seek(SeekFrom::Start(offset))
            .map_err(|_| PageFileError::PageOutOfRange(page_id))?;
        file.read_exact(buf)
            .map_err(|_| PageFileError::PageOutOfRange(page_id))?;

        self.current_position = page_id;
        Ok(())
    }

    /// Write `buf` to page `page_id` and force it to disk
    ///
    /// The write path folds range violations and I/O errors into one error
    /// kind: any `WriteFailed` means the page was not durably written. On
    /// success the current position moves to `page_id`.
    pub fn write_block(&mut self, page_id: PageId, buf: &PageBuffer) -> PageFileResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or(PageFileError::HandleNotInitialized)?;

        if page_id >= self.total_pages {
            return Err(PageFileError::WriteFailed(format!(
                "page_id={} outside file of {} pages",
                page_id, self.total_pages
            )));
        }

        let offset = (page_id * PAGE_SIZE) as u64;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| PageFileError::WriteFailed(e.to_string()))?;
        file.write_all(buf)
            .map_err(|e| PageFileError::WriteFailed(e.to_string()))?;
        file.sync_data()
            .map_err(|e| PageFileError::WriteFailed(e.to_string()))?;

        self.current_position = page_id;
        Ok(())
    }

    /// Read the first page of the file
    pub fn read_first(&mut self, buf: &mut PageBuffer) -> PageFileResult<()> {
        self.read_block(0, buf)
    }

    /// Read the page before the current position
    ///
    /// Fails with `PageOutOfRange` at position 0.
    pub fn read_previous(&mut self, buf: &mut PageBuffer) -> PageFileResult<()> {
        match self.current_position.checked_sub(1) {
            Some(prev) => self.read_block(prev, buf),
            None => Err(PageFileError::PageOutOfRange(0)),
        }
    }

    /// Read the page at the current position
    pub fn read_current(&mut self, buf: &mut PageBuffer) -> PageFileResult<()> {
        self.read_block(self.current_position, buf)
    }

    /// Read the page after the current position
    ///
    /// Fails with `PageOutOfRange` past the last page; callers iterating
    /// forward use that as the end-of-file signal.
    pub fn read_next(&mut self, buf: &mut PageBuffer) -> PageFileResult<()> {
        self.read_block(self.current_position + 1, buf)
    }

    /// Read the last page of the file
    pub fn read_last(&mut self, buf: &mut PageBuffer) -> PageFileResult<()> {
        match self.total_pages.checked_sub(1) {
            Some(last) => self.read_block(last, buf),
            None => Err(PageFileError::PageOutOfRange(0)),
        }
    }

    /// Write `buf` to the page at the current position
    pub fn write_current(&mut self, buf: &PageBuffer) -> PageFileResult<()> {
        self.write_block(self.current_position, buf)
    }

    /// Append one zero-filled page at the end of the file
    ///
    /// The current position is left unchanged.
    pub fn append_empty_block(&mut self) -> PageFileResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or(PageFileError::HandleNotInitialized)?;

        file.seek(SeekFrom::End(0))
            .map_err(|e| PageFileError::WriteFailed(e.to_string()))?;
        file.write_all(&ZERO_PAGE)
            .map_err(|e| PageFileError::WriteFailed(e.to_string()))?;
        file.sync_data()
            .map_err(|e| PageFileError::WriteFailed(e.to_string()))?;

        self.total_pages += 1;
        Ok(())
    }

    /// Grow the file to at least `min_pages` pages
    ///
    /// No-op when the file is already large enough. Pages are appended one
    /// at a time; on failure the pages appended so far are kept and
    /// `total_pages` reflects exactly that partial progress.
    pub fn ensure_capacity(&mut self, min_pages: usize) -> PageFileResult<()> {
        if self.total_pages >= min_pages {
            return Ok(());
        }

        let pages_to_add = min_pages - self.total_pages;
        for _ in 0..pages_to_add {
            self.append_empty_block()?;
        }

        Ok(())
    }
}
