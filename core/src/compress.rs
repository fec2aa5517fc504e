//! Gzip backups of individual files.
//!
//! Unlike the archive engine this keeps files separate: every regular file is
//! compressed on its own into `<backup_dir>/.../<name>.gz`.

use crate::config::BackupConfig;
use crate::copy::{DEFAULT_CHUNK_SIZE, copy_stream};
use crate::{Error, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Where compressed copies land inside the backup directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirLayout {
    /// Every output goes straight into the backup directory.
    #[default]
    Flat,
    /// Keep the file's directory path relative to the home directory.
    Preserve,
}

pub struct Compressor {
    config: BackupConfig,
}

impl Compressor {
    pub fn new(config: BackupConfig) -> Self {
        Self { config }
    }

    /// Compresses `source`, or every regular file below it when it is a directory.
    ///
    /// Returns the paths of the written `.gz` files in walk order.
    pub fn compress(&self, source: &Path, layout: DirLayout) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(source).map_err(|e| Error::io(source, e))?;

        if !metadata.is_dir() {
            let dest = self.destination(source, layout)?;
            self.compress_file(source, &dest)?;
            return Ok(vec![dest]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        info!("Compressing {} files under {}", files.len(), source.display());

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let dest = self.destination(&file, layout)?;
            self.compress_file(&file, &dest)?;
            written.push(dest);
        }
        Ok(written)
    }

    /// Path of the `.gz` copy for the regular file at `source`.
    pub fn destination(&self, source: &Path, layout: DirLayout) -> Result<PathBuf> {
        let metadata = fs::metadata(source).map_err(|e| Error::io(source, e))?;
        if metadata.is_dir() {
            return Err(Error::NotAFile {
                path: source.to_path_buf(),
            });
        }

        let file_name = source.file_name().ok_or_else(|| Error::NotAFile {
            path: source.to_path_buf(),
        })?;
        let mut gz_name = file_name.to_os_string();
        gz_name.push(".gz");

        let mut dest = self.config.backup_dir.clone();
        if layout == DirLayout::Preserve {
            let parent = source.parent().unwrap_or_else(|| Path::new(""));
            let subdirs = parent
                .strip_prefix(&self.config.home_dir)
                .map_err(|_| Error::OutsideHome {
                    path: source.to_path_buf(),
                    home: self.config.home_dir.clone(),
                })?;
            dest.push(subdirs);
        }
        dest.push(gz_name);
        Ok(dest)
    }

    fn compress_file(&self, source: &Path, dest: &Path) -> Result<()> {
        let mut input = File::open(source).map_err(|e| Error::io(source, e))?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let output = File::create(dest).map_err(|e| Error::io(dest, e))?;

        debug!("Compressing {} into {} ...", source.display(), dest.display());

        let mut encoder = GzEncoder::new(output, Compression::new(self.config.compression_level));
        copy_stream(&mut input, &mut encoder, DEFAULT_CHUNK_SIZE)
            .map_err(|e| Error::io(source, e))?;
        encoder.finish().map_err(|e| Error::io(dest, e))?;
        Ok(())
    }
}
