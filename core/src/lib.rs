pub mod archiver;
pub mod compress;
pub mod config;
pub mod container;
pub mod copy;
mod decode;
mod encode;
pub mod error;
pub mod path;
pub mod types;

pub use archiver::Archiver;
pub use compress::{Compressor, DirLayout};
pub use config::{ArchiveConfig, BackupConfig, Config};
pub use container::{ContainerFormat, Zip};
pub use error::{Error, Result};
pub use types::*;
