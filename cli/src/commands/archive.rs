use anyhow::Result;
use clap::Args;
use dirpack_core::Archiver;
use std::path::PathBuf;
use tracing::info;

use super::entry_spinner;

#[derive(Args)]
pub struct ArchiveCommand {
    #[arg(help = "Directory to archive")]
    source: PathBuf,

    #[arg(
        short,
        long,
        help = "Archive path to write; used only if it already exists, otherwise <SOURCE>.zip is created next to the source"
    )]
    output: Option<PathBuf>,
}

impl ArchiveCommand {
    pub fn run(&self, cli: &crate::Cli) -> Result<()> {
        let config = cli.load_config()?;

        info!("Archiving {}", self.source.display());

        let pb = entry_spinner(cli, "Archiving...");
        let progress = pb.clone();
        let archiver = Archiver::new(config.archive).on_entry(move |entry| {
            progress.inc(1);
            progress.set_message(entry.name.clone());
        });

        let report = archiver.encode(&self.source, self.output.as_deref())?;
        pb.finish_and_clear();

        cli.print_report("Archive", &report)
    }
}
