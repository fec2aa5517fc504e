use anyhow::{Context, Result};
use clap::Args;
use dirpack_core::{Compressor, DirLayout};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct CompressCommand {
    #[arg(help = "File or directory to compress")]
    path: PathBuf,

    #[arg(long, help = "Mirror the home-relative directory layout inside the backup directory")]
    preserve_dirs: bool,

    #[arg(long, help = "Backup directory override")]
    backup_dir: Option<PathBuf>,
}

impl CompressCommand {
    pub fn run(&self, cli: &crate::Cli) -> Result<()> {
        let mut config = cli.load_config()?;
        if let Some(backup_dir) = &self.backup_dir {
            config.backup.backup_dir = backup_dir.clone();
        }

        let layout = if self.preserve_dirs {
            DirLayout::Preserve
        } else {
            DirLayout::Flat
        };

        // Home-relative layouts need an absolute path to strip the home prefix from.
        let path = fs::canonicalize(&self.path)
            .with_context(|| format!("Cannot resolve {}", self.path.display()))?;

        info!(
            "Compressing {} into {}",
            path.display(),
            config.backup.backup_dir.display()
        );

        let compressor = Compressor::new(config.backup);
        let written = compressor.compress(&path, layout)?;

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&written)?);
            return Ok(());
        }

        for path in &written {
            println!("🗜️  {}", path.display());
        }
        println!("✅ Compressed {} files", written.len());
        Ok(())
    }
}
