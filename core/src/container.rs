//! Container codec seam.
//!
//! The engine only sees an ordered list of named entries. [`Zip`] is the
//! format shipped with dirpack.

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Entries at or above this size need ZIP64 extensions.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// Write side of a container, open for the duration of one encode.
pub trait ContainerWriter {
    /// Adds a directory marker. `name` ends with `/`.
    fn add_directory(&mut self, name: &str) -> Result<()>;

    /// Starts a file entry and returns the sink for its payload.
    fn start_file(&mut self, name: &str, size_hint: u64) -> Result<&mut dyn Write>;

    /// Writes the container trailer and closes the underlying file.
    fn finish(self) -> Result<()>;
}

/// One entry handed out by a [`ContainerReader`].
pub enum ContainerEntry<'a> {
    Directory { name: String },
    File { name: String, size: u64, reader: Box<dyn Read + 'a> },
}

impl ContainerEntry<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name } | Self::File { name, .. } => name,
        }
    }
}

/// Read side of a container.
pub trait ContainerReader {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&mut self, index: usize) -> Result<ContainerEntry<'_>>;
}

/// A concrete container format bound to a file extension.
pub trait ContainerFormat {
    /// Extension without the leading dot.
    const EXTENSION: &'static str;

    type Writer: ContainerWriter;
    type Reader: ContainerReader;

    fn create(file: File, path: &Path) -> Result<Self::Writer>;

    fn open(file: File, path: &Path) -> Result<Self::Reader>;
}

/// ZIP container, Deflate compressed.
pub struct Zip;

impl ContainerFormat for Zip {
    const EXTENSION: &'static str = "zip";

    type Writer = ZipContainerWriter;
    type Reader = ZipContainerReader;

    fn create(file: File, path: &Path) -> Result<Self::Writer> {
        Ok(ZipContainerWriter {
            path: path.to_path_buf(),
            writer: ZipWriter::new(file),
        })
    }

    fn open(file: File, path: &Path) -> Result<Self::Reader> {
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|e| zip_error(path, e))?;
        Ok(ZipContainerReader {
            path: path.to_path_buf(),
            archive,
        })
    }
}

pub struct ZipContainerWriter {
    path: PathBuf,
    writer: ZipWriter<File>,
}

impl ZipContainerWriter {
    fn options(size_hint: u64) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(size_hint >= ZIP64_THRESHOLD)
    }
}

impl ContainerWriter for ZipContainerWriter {
    fn add_directory(&mut self, name: &str) -> Result<()> {
        self.writer
            .add_directory(name, Self::options(0))
            .map_err(|e| zip_error(&self.path, e))
    }

    fn start_file(&mut self, name: &str, size_hint: u64) -> Result<&mut dyn Write> {
        self.writer
            .start_file(name, Self::options(size_hint))
            .map_err(|e| zip_error(&self.path, e))?;
        Ok(&mut self.writer)
    }

    fn finish(self) -> Result<()> {
        let path = self.path;
        let file = self.writer.finish().map_err(|e| zip_error(&path, e))?;
        file.sync_all().map_err(|e| Error::io(&path, e))
    }
}

pub struct ZipContainerReader {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl ContainerReader for ZipContainerReader {
    fn len(&self) -> usize {
        self.archive.len()
    }

    fn entry(&mut self, index: usize) -> Result<ContainerEntry<'_>> {
        let file = self
            .archive
            .by_index(index)
            .map_err(|e| zip_error(&self.path, e))?;

        // Only a trailing `/` marks a directory; `\` is a plain name character.
        let name = file.name().to_string();
        if name.ends_with('/') {
            Ok(ContainerEntry::Directory { name })
        } else {
            Ok(ContainerEntry::File {
                name,
                size: file.size(),
                reader: Box::new(file),
            })
        }
    }
}

fn zip_error(path: &Path, err: ZipError) -> Error {
    match err {
        ZipError::Io(source) => Error::io(path, source),
        ZipError::UnsupportedArchive(reason) => Error::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        },
        other => Error::CorruptArchive {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_zip_entries_keep_order_and_kind() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sample.zip");

        let mut writer = Zip::create(File::create(&path).unwrap(), &path).unwrap();
        writer.add_directory("docs/").unwrap();
        writer
            .start_file("docs/readme.txt", 5)
            .unwrap()
            .write_all(b"hello")
            .unwrap();
        writer.finish().unwrap();

        let mut reader = Zip::open(File::open(&path).unwrap(), &path).unwrap();
        assert_eq!(reader.len(), 2);

        assert!(matches!(
            reader.entry(0).unwrap(),
            ContainerEntry::Directory { ref name } if name == "docs/"
        ));

        match reader.entry(1).unwrap() {
            ContainerEntry::File { name, size, mut reader } => {
                let mut payload = String::new();
                reader.read_to_string(&mut payload).unwrap();
                assert_eq!(name, "docs/readme.txt");
                assert_eq!(size, 5);
                assert_eq!(payload, "hello");
            }
            ContainerEntry::Directory { .. } => panic!("expected a file entry"),
        }
    }

    #[test]
    fn test_trailing_backslash_is_a_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("odd.zip");

        let mut writer = Zip::create(File::create(&path).unwrap(), &path).unwrap();
        writer
            .start_file("odd\\", 3)
            .unwrap()
            .write_all(b"odd")
            .unwrap();
        writer.finish().unwrap();

        let mut reader = Zip::open(File::open(&path).unwrap(), &path).unwrap();
        match reader.entry(0).unwrap() {
            ContainerEntry::File { name, size, .. } => {
                assert_eq!(name, "odd\\");
                assert_eq!(size, 3);
            }
            ContainerEntry::Directory { .. } => panic!("expected a file entry"),
        }
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bogus.zip");
        std::fs::write(&path, b"this is not a zip archive at all").unwrap();

        let err = Zip::open(File::open(&path).unwrap(), &path).err().unwrap();
        assert!(matches!(
            err,
            Error::CorruptArchive { .. } | Error::UnsupportedFormat { .. }
        ));
    }
}
