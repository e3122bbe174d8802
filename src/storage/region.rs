//! Mapped Region
//!
//! One backing file mapped read/write in full. The first 8 bytes are a
//! little-endian `u64` metadata header; the rest is the body, addressed
//! from 0 by the owners of the region (datastore or index).

use std::fs::{File, OpenOptions};
use std::ops::Range;
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::error::{DbError, Result};

use super::HEADER_SIZE;

/// A fixed-size, memory-mapped backing file with a `u64` header
pub struct Region {
    /// Path of the backing file (for diagnostics)
    path: PathBuf,
    /// Kept open for the lifetime of the mapping
    _file: File,
    /// The whole file, header included
    mmap: MmapMut,
}

impl Region {
    /// Create (or truncate) the file at `path` with room for `body_len` bytes
    /// after the header. The header starts at zero.
    pub fn create(path: &Path, body_len: u64) -> Result<Self> {
        let total = HEADER_SIZE.checked_add(body_len).ok_or_else(|| {
            DbError::Config(format!("region size overflows: {} bytes", body_len))
        })?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(total)?;

        let mut region = Self::map(path, file)?;
        region.set_header(0);
        region.flush_header()?;
        Ok(region)
    }

    /// Map an existing file. Fails if it is missing or shorter than a header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let len = file.metadata()?.len();
        if len < HEADER_SIZE {
            return Err(DbError::Corrupted(format!(
                "{} is {} bytes, shorter than its header",
                path.display(),
                len
            )));
        }

        Self::map(path, file)
    }

    fn map(path: &Path, file: File) -> Result<Self> {
        // SAFETY: the engine is the only writer of this file while the region
        // is alive, and every access below is bounds-checked against the map.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
            mmap,
        })
    }

    // =========================================================================
    // Header
    // =========================================================================

    pub fn header(&self) -> u64 {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf.copy_from_slice(&self.mmap[..HEADER_SIZE as usize]);
        u64::from_le_bytes(buf)
    }

    pub fn set_header(&mut self, value: u64) {
        self.mmap[..HEADER_SIZE as usize].copy_from_slice(&value.to_le_bytes());
    }

    pub fn flush_header(&self) -> Result<()> {
        self.mmap.flush_range(0, HEADER_SIZE as usize)?;
        Ok(())
    }

    // =========================================================================
    // Body
    // =========================================================================

    /// Bytes available after the header
    pub fn body_len(&self) -> u64 {
        self.mmap.len() as u64 - HEADER_SIZE
    }

    /// Copy `buf.len()` bytes starting at body position `pos` into `buf`
    pub fn read_into(&self, pos: u64, buf: &mut [u8]) -> Result<()> {
        let span = self.span(pos, buf.len() as u64)?;
        buf.copy_from_slice(&self.mmap[span]);
        Ok(())
    }

    /// Borrow a body range without copying
    pub fn slice(&self, pos: u64, len: u64) -> Result<&[u8]> {
        let span = self.span(pos, len)?;
        Ok(&self.mmap[span])
    }

    /// Write `bytes` at body position `pos`; nothing is written if out of bounds
    pub fn write(&mut self, pos: u64, bytes: &[u8]) -> Result<()> {
        let span = self.span(pos, bytes.len() as u64)?;
        self.mmap[span].copy_from_slice(bytes);
        Ok(())
    }

    /// Flush a body range to the backing file
    pub fn flush_body(&self, pos: u64, len: u64) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let span = self.span(pos, len)?;
        self.mmap.flush_range(span.start, span.len())?;
        Ok(())
    }

    /// Flush the whole mapping
    pub fn flush_all(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }

    /// Translate a body range into a checked range of the mapping
    fn span(&self, pos: u64, len: u64) -> Result<Range<usize>> {
        let end = pos
            .checked_add(len)
            .filter(|&end| end <= self.body_len())
            .ok_or_else(|| {
                DbError::Corrupted(format!(
                    "range {}+{} outside {} ({} body bytes)",
                    pos,
                    len,
                    self.path.display(),
                    self.body_len()
                ))
            })?;

        let start = (HEADER_SIZE + pos) as usize;
        let end = (HEADER_SIZE + end) as usize;
        Ok(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_sizes_file_and_zeroes_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("region");

        let region = Region::create(&path, 100).unwrap();

        assert_eq!(region.header(), 0);
        assert_eq!(region.body_len(), 100);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 108);
    }

    #[test]
    fn test_header_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("region");

        {
            let mut region = Region::create(&path, 16).unwrap();
            region.set_header(42);
            region.flush_header().unwrap();
        }

        let region = Region::open(&path).unwrap();
        assert_eq!(region.header(), 42);

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..8], &42u64.to_le_bytes());
    }

    #[test]
    fn test_out_of_bounds_write_leaves_body_untouched() {
        let temp = TempDir::new().unwrap();
        let mut region = Region::create(&temp.path().join("region"), 8).unwrap();

        region.write(0, &[9; 8]).unwrap();
        let result = region.write(4, &[1; 8]);

        assert!(matches!(result, Err(DbError::Corrupted(_))));
        assert_eq!(region.slice(0, 8).unwrap(), &[9; 8]);
    }

    #[test]
    fn test_open_rejects_short_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("region");
        std::fs::write(&path, [0u8; 3]).unwrap();

        assert!(matches!(Region::open(&path), Err(DbError::Corrupted(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = Region::open(&temp.path().join("absent"));
        assert!(matches!(result, Err(DbError::Io(_))));
    }
}
