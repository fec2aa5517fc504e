use crate::config::ArchiveConfig;
use crate::container::{ContainerFormat, Zip};
use crate::types::EntryRecord;
use std::marker::PhantomData;

type EntryCallback = Box<dyn Fn(&EntryRecord)>;

/// Packs directory trees into containers and unpacks them again.
///
/// An `Archiver` runs one operation at a time. Concurrent operations on the same
/// source or archive path must be serialized by the caller.
///
/// # Examples
///
/// ```no_run
/// use dirpack_core::{Archiver, ArchiveConfig};
/// use std::path::Path;
///
/// # fn main() -> dirpack_core::Result<()> {
/// let archiver = Archiver::new(ArchiveConfig::default());
///
/// let packed = archiver.encode(Path::new("/srv/photos"), None)?;
/// assert_eq!(packed.path, Path::new("/srv/photos.zip"));
///
/// let unpacked = archiver.decode(&packed.path)?;
/// assert_eq!(unpacked.path, Path::new("/srv/photos"));
/// # Ok(())
/// # }
/// ```
pub struct Archiver<F: ContainerFormat = Zip> {
    pub(crate) config: ArchiveConfig,
    pub(crate) on_entry: Option<EntryCallback>,
    _format: PhantomData<F>,
}

impl Archiver<Zip> {
    pub fn new(config: ArchiveConfig) -> Self {
        Self::with_format(config)
    }
}

impl<F: ContainerFormat> Archiver<F> {
    /// Builds an archiver for a container format other than the default.
    pub fn with_format(config: ArchiveConfig) -> Self {
        Self {
            config,
            on_entry: None,
            _format: PhantomData,
        }
    }

    /// Registers a callback run after every entry is written or extracted.
    pub fn on_entry(mut self, callback: impl Fn(&EntryRecord) + 'static) -> Self {
        self.on_entry = Some(Box::new(callback));
        self
    }

    pub(crate) fn notify(&self, entry: &EntryRecord) {
        if let Some(callback) = &self.on_entry {
            callback(entry);
        }
    }
}

impl Default for Archiver<Zip> {
    fn default() -> Self {
        Self::new(ArchiveConfig::default())
    }
}
