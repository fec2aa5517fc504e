use crate::archiver::Archiver;
use crate::container::{ContainerFormat, ContainerWriter};
use crate::copy::copy_stream;
use crate::path::{archive_destination, archive_entry_name};
use crate::types::{EntryRecord, OperationReport};
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

impl<F: ContainerFormat> Archiver<F> {
    /// Packs the directory tree at `source_root` into a single container.
    ///
    /// The archive goes to `dest_hint` when that path already exists, otherwise
    /// next to the source as `<name>.<extension>`. Entries are emitted in
    /// pre-order with siblings sorted by name, so the same tree always produces
    /// the same entry sequence.
    ///
    /// # Errors
    ///
    /// * `Error::NotADirectory` - `source_root` is missing or not a directory
    /// * `Error::Io` - any walk, read or write failure; the walk stops at the
    ///   first one and the partial archive is left on disk. A source that has
    ///   no file name even after resolving (`/`) is reported here too
    pub fn encode(&self, source_root: &Path, dest_hint: Option<&Path>) -> Result<OperationReport> {
        match fs::metadata(source_root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                return Err(Error::NotADirectory {
                    path: source_root.to_path_buf(),
                });
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotADirectory {
                    path: source_root.to_path_buf(),
                });
            }
            Err(e) => return Err(Error::io(source_root, e)),
        }

        let archive_path = archive_destination(source_root, dest_hint, F::EXTENSION)?;
        info!("Creating archive {} ...", archive_path.display());

        let file = File::create(&archive_path).map_err(|e| Error::io(&archive_path, e))?;
        let mut writer = F::create(file, &archive_path)?;

        let skip = archive_inside_source(source_root, &archive_path);
        let mut report = OperationReport::new(archive_path);

        self.write_tree(&mut writer, source_root, skip.as_deref(), &mut report)?;
        writer.finish()?;

        info!(
            "Archived {} directories and {} files into {}",
            report.directories,
            report.files,
            report.path.display()
        );
        Ok(report)
    }

    fn write_tree(
        &self,
        writer: &mut F::Writer,
        source_root: &Path,
        skip: Option<&Path>,
        report: &mut OperationReport,
    ) -> Result<()> {
        let walker = WalkDir::new(source_root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            let record = if entry.file_type().is_dir() {
                let name = archive_entry_name(path, source_root, true)?;
                debug!("Creating directory {} in archive ...", name);
                writer.add_directory(&name)?;
                EntryRecord::directory(name)
            } else {
                if skip.is_some() && path.strip_prefix(source_root).ok() == skip {
                    debug!("Skipping the archive itself: {}", path.display());
                    continue;
                }
                if !is_archivable_file(&entry)? {
                    warn!("Skipping {}: not a regular file", path.display());
                    continue;
                }

                let name = archive_entry_name(path, source_root, false)?;
                debug!("Adding file {} into archive ...", name);
                let size = self.write_file(writer, path, &name)?;
                EntryRecord::file(name, size)
            };

            report.record(&record);
            self.notify(&record);
        }

        Ok(())
    }

    fn write_file(&self, writer: &mut F::Writer, path: &Path, name: &str) -> Result<u64> {
        let mut input = File::open(path).map_err(|e| Error::io(path, e))?;
        let size_hint = input.metadata().map(|m| m.len()).unwrap_or(0);

        let sink = writer.start_file(name, size_hint)?;
        copy_stream(&mut input, sink, self.config.chunk_size).map_err(|e| Error::io(path, e))
    }
}

/// Regular files, and symlinks that resolve to one, become file records.
///
/// A dangling symlink is an I/O error. Other special files are not archived.
fn is_archivable_file(entry: &DirEntry) -> Result<bool> {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return Ok(true);
    }
    if file_type.is_symlink() {
        let target = fs::metadata(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        return Ok(target.is_file());
    }
    Ok(false)
}

/// Location of the archive relative to `source_root` when it was created inside it.
fn archive_inside_source(source_root: &Path, archive_path: &Path) -> Option<PathBuf> {
    let root = fs::canonicalize(source_root).ok()?;
    let archive = fs::canonicalize(archive_path).ok()?;
    archive.strip_prefix(&root).ok().map(Path::to_path_buf)
}
