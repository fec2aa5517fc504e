use anyhow::Result;
use clap::Args;
use dirpack_core::Archiver;
use std::path::PathBuf;
use tracing::{info, warn};

use super::entry_spinner;

#[derive(Args)]
pub struct ExtractCommand {
    #[arg(help = "Archive to extract")]
    archive: PathBuf,

    #[arg(long, help = "Fail instead of replacing an existing destination")]
    no_clobber: bool,
}

impl ExtractCommand {
    pub fn run(&self, cli: &crate::Cli) -> Result<()> {
        let mut config = cli.load_config()?;
        if self.no_clobber {
            config.archive.overwrite_existing = false;
        } else if config.archive.overwrite_existing {
            warn!("An existing destination directory will be replaced");
        }

        info!("Extracting {}", self.archive.display());

        let pb = entry_spinner(cli, "Extracting...");
        let progress = pb.clone();
        let archiver = Archiver::new(config.archive).on_entry(move |entry| {
            progress.inc(1);
            progress.set_message(entry.name.clone());
        });

        let report = archiver.decode(&self.archive)?;
        pb.finish_and_clear();

        cli.print_report("Extraction", &report)
    }
}
