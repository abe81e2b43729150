use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{Error, Result};

/// Where the bytes of a [`super::File`] live.
#[derive(Debug)]
pub(crate) enum Source {
    /// A read-only mapping of a file on disk
    Mapped(Mmap),
    /// A buffer handed over by the caller
    Owned(Vec<u8>),
    /// A zero-length file, which some platforms refuse to map
    Empty,
}

impl Source {
    /// Maps the file at `path`.
    pub(crate) fn map(path: &Path) -> Result<Source> {
        let file = fs::File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Source::Empty);
        }

        // The mapping is read-only and mapping files are not rewritten while loaded
        match unsafe { Mmap::map(&file) } {
            Ok(mmap) => Ok(Source::Mapped(mmap)),
            Err(error) => Err(Error::Error(format!(
                "cannot map {}: {error}",
                path.display()
            ))),
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            Source::Mapped(mmap) => mmap.as_ref(),
            Source::Owned(data) => data.as_slice(),
            Source::Empty => &[],
        }
    }

    pub(crate) fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = offset.checked_add(len).ok_or(Error::OutOfBounds)?;
        self.bytes().get(offset..end).ok_or(Error::OutOfBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.class");
        std::fs::write(&path, [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34]).unwrap();

        let source = Source::map(&path).unwrap();
        assert!(matches!(source, Source::Mapped(_)));
        assert_eq!(source.bytes().len(), 8);
        assert_eq!(source.slice(0, 4).unwrap(), &[0xCA, 0xFE, 0xBA, 0xBE]);
        assert!(source.slice(7, 2).is_err());
    }

    #[test]
    fn empty_file_is_not_mapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.srg");
        std::fs::write(&path, b"").unwrap();

        let source = Source::map(&path).unwrap();
        assert!(matches!(source, Source::Empty));
        assert!(source.slice(0, 1).is_err());
        assert_eq!(source.slice(0, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn offset_overflow() {
        let source = Source::Owned(vec![0; 8]);
        assert!(matches!(
            source.slice(usize::MAX, 1),
            Err(crate::Error::OutOfBounds)
        ));
        assert!(source.slice(8, 0).is_ok());
        assert!(source.slice(9, 0).is_err());
    }

    #[test]
    fn missing_file() {
        match Source::map(Path::new("/nonexistent/path/to/file.class")) {
            Err(crate::Error::FileError(error)) => {
                assert_eq!(error.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected FileError, got {other:?}"),
        }
    }
}
