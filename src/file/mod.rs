//! Input file abstraction for mapping tables and compiled class files.
//!
//! This module provides the [`File`] type, a thin wrapper over bytes that are either a
//! memory-mapped file on disk or an owned in-memory buffer. Both mapping-table
//! loading and the directory-backed byte provider read their inputs through it, so the rest of
//! the crate never touches `std::fs` directly.
//!
//! # Key Components
//!
//! - [`File`] - Owned handle to input data, independent of where the bytes live
//! - [`crate::file::parser::Parser`] - Cursor-based big-endian reader used by the class-file reader
//! - [`crate::file::io`] - Bounds-checked primitive reads
//!
//! # Examples
//!
//! ## Loading from Disk
//!
//! ```rust,no_run
//! use jremap::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("mappings/notch-srg.srg"))?;
//! for line in file.text().lines() {
//!     println!("{line}");
//! }
//! # Ok::<(), jremap::Error>(())
//! ```
//!
//! ## Loading from Memory
//!
//! ```rust
//! use jremap::File;
//!
//! let file = File::from_mem(vec![0xCA, 0xFE, 0xBA, 0xBE])?;
//! assert_eq!(file.len(), 4);
//! assert_eq!(file.data_slice(0, 2)?, &[0xCA, 0xFE]);
//! # Ok::<(), jremap::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`File`] is `Send + Sync`; a [`File`] can be shared across threads once loaded.

pub mod io;
pub mod parser;

mod source;

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use crate::Result;
use source::Source;

/// Owned input data, loaded from disk or memory.
pub struct File {
    source: Source,
    path: Option<PathBuf>,
}

impl File {
    /// Memory-maps the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, or
    /// [`crate::Error::Error`] if it cannot be mapped.
    pub fn from_file(path: &Path) -> Result<File> {
        Ok(File {
            source: Source::map(path)?,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an owned buffer.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` mirrors [`File::from_file`].
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Ok(File {
            source: Source::Owned(data),
            path: None,
        })
    }

    /// The path this file was loaded from, `None` for in-memory data.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the total length of the data in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.bytes().len()
    }

    /// Returns `true` if the data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the full data buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.source.bytes()
    }

    /// Returns a bounds-checked slice of the data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range exceeds the data.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.source.slice(offset, len)
    }

    /// Interprets the data as text, replacing invalid UTF-8 sequences.
    ///
    /// Mapping tables are plain ASCII in practice; a stray invalid byte only damages the line
    /// it appears on, which the record parser then skips.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.source.bytes())
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}
