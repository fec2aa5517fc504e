use crate::archiver::Archiver;
use crate::container::{ContainerEntry, ContainerFormat, ContainerReader};
use crate::copy::copy_stream;
use crate::path::{extraction_root, resolve_entry_path};
use crate::types::{EntryRecord, OperationReport};
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::{debug, info, warn};

impl<F: ContainerFormat> Archiver<F> {
    /// Unpacks `archive_path` into a directory next to it.
    ///
    /// The directory is named after the archive without its extension, or gets a
    /// random name when that leaves nothing. Whatever already exists at that path
    /// is removed first unless `overwrite_existing` is off.
    ///
    /// # Errors
    ///
    /// * `Error::UnsupportedFormat` / `Error::CorruptArchive` - the container cannot be read
    /// * `Error::DestinationConflict` - the existing destination could not be cleared
    /// * `Error::UnsafeEntryPath` - an entry would land outside the extraction root
    /// * `Error::Io` - any create or write failure; files extracted so far stay on disk
    pub fn decode(&self, archive_path: &Path) -> Result<OperationReport> {
        let file = File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
        let mut container = F::open(file, archive_path)?;

        let root = extraction_root(archive_path, F::EXTENSION)?;
        self.clear_destination(&root)?;
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;

        info!(
            "Extracting {} entries from {} into {} ...",
            container.len(),
            archive_path.display(),
            root.display()
        );

        let mut report = OperationReport::new(root.clone());

        for index in 0..container.len() {
            let record = match container.entry(index)? {
                ContainerEntry::Directory { name } => {
                    let target = resolve_entry_path(&root, &name)?;
                    debug!("Creating directory {} ...", target.display());
                    fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
                    EntryRecord::directory(name)
                }
                ContainerEntry::File { name, mut reader, .. } => {
                    let target = resolve_entry_path(&root, &name)?;
                    debug!("Extracting file {} ...", name);

                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                    }
                    let mut output = File::create(&target).map_err(|e| Error::io(&target, e))?;

                    let bytes = copy_stream(&mut reader, &mut output, self.config.chunk_size)
                        .map_err(|e| payload_error(archive_path, &target, e))?;
                    EntryRecord::file(name, bytes)
                }
            };

            report.record(&record);
            self.notify(&record);
        }

        info!(
            "Extracted {} directories and {} files into {}",
            report.directories,
            report.files,
            report.path.display()
        );
        Ok(report)
    }

    fn clear_destination(&self, root: &Path) -> Result<()> {
        let metadata = match fs::symlink_metadata(root) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(Error::DestinationConflict {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };

        if !self.config.overwrite_existing {
            return Err(Error::DestinationConflict {
                path: root.to_path_buf(),
                source: io::Error::new(ErrorKind::AlreadyExists, "destination already exists"),
            });
        }

        warn!("Removing existing {} before extraction", root.display());
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(root)
        } else {
            fs::remove_file(root)
        };

        removed.map_err(|source| Error::DestinationConflict {
            path: root.to_path_buf(),
            source,
        })
    }
}

/// Checksum and decompression failures surface as `InvalidData` while reading.
fn payload_error(archive_path: &Path, target: &Path, err: io::Error) -> Error {
    if err.kind() == ErrorKind::InvalidData {
        Error::CorruptArchive {
            path: archive_path.to_path_buf(),
            reason: err.to_string(),
        }
    } else {
        Error::io(target, err)
    }
}
