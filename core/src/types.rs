use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::File => write!(f, "file"),
        }
    }
}

/// One entry as it was written to, or extracted from, a container.
#[derive(Debug, Clone, Serialize)]
pub struct EntryRecord {
    /// Archive-relative name, `/`-separated.
    pub name: String,
    pub kind: EntryKind,
    /// Payload size in bytes; zero for directories.
    pub size: u64,
}

impl EntryRecord {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
        }
    }

    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
        }
    }
}

/// Outcome of a finished encode or decode.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OperationReport {
    /// The archive written by an encode, or the extraction root of a decode.
    pub path: PathBuf,
    pub directories: usize,
    pub files: usize,
    pub bytes: u64,
}

impl OperationReport {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    pub fn record(&mut self, entry: &EntryRecord) {
        match entry.kind {
            EntryKind::Directory => self.directories += 1,
            EntryKind::File => {
                self.files += 1;
                self.bytes += entry.size;
            }
        }
    }

    pub fn entry_count(&self) -> usize {
        self.directories + self.files
    }

    pub fn summary(&self) -> String {
        format!(
            "{} - {} directories, {} files, {:.2} MB",
            self.path.display(),
            self.directories,
            self.files,
            self.bytes as f64 / 1024.0 / 1024.0
        )
    }
}
