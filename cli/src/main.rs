mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{archive::ArchiveCommand, compress::CompressCommand, extract::ExtractCommand};
use dirpack_core::{Config, OperationReport};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(
    name = "dirpack",
    about = "Pack directory trees into archives and back",
    long_about = "Dirpack packs a whole directory tree into a single ZIP archive, extracts archives back into directories, and keeps gzip backups of individual files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DIRPACK_CONFIG", global = true, help = "Path to config.toml")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Enable quiet mode")]
    quiet: bool,

    #[arg(long, global = true, help = "Print the result as JSON")]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Archive a directory tree")]
    Archive(ArchiveCommand),

    #[command(about = "Extract an archive next to itself")]
    Extract(ExtractCommand),

    #[command(about = "Gzip files into the backup directory")]
    Compress(CompressCommand),
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let config = Config::discover(self.config.as_deref())?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn print_report(&self, verb: &str, report: &OperationReport) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        println!("✅ {} completed", verb);
        println!("📦 {}", report.summary());
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    info!("Starting dirpack");

    match cli.command {
        Commands::Archive(ref cmd) => cmd.run(&cli),
        Commands::Extract(ref cmd) => cmd.run(&cli),
        Commands::Compress(ref cmd) => cmd.run(&cli),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = format!("dirpack={level},dirpack_core={level}");
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Setting default subscriber failed");
}
