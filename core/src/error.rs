use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Path {path} has no prefix {root}")]
    PrefixMismatch { path: PathBuf, root: PathBuf },

    #[error("Unsupported archive {path}: {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("Archive corrupted: {path}: {reason}")]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("Cannot extract archive on existing path {path}: {source}")]
    DestinationConflict {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Entry '{name}' escapes the extraction root")]
    UnsafeEntryPath { name: String },

    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: PathBuf },

    #[error("Path {path} is not under home directory {home}")]
    OutsideHome { path: PathBuf, home: PathBuf },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error in {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for failures of the underlying filesystem or stream.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        Self::Io {
            path,
            source: err.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
