pub mod archive;
pub mod compress;
pub mod extract;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner updated once per archive entry. Hidden in quiet and JSON modes.
pub fn entry_spinner(cli: &crate::Cli, message: &str) -> ProgressBar {
    if cli.quiet || cli.json {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} entries {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb
}
