mod cli;
mod config;
mod db;
mod reset;
mod site;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitewipe", version, about = "Reset a CMS installation to a pristine fresh-install state")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reset the installation (destructive, asks for typed confirmation)
    Reset {
        /// Preserve existing user accounts and re-create them after the reset
        #[arg(long)]
        keep_users: bool,
        /// Recursively delete everything inside the uploads directory
        #[arg(long)]
        delete_uploads: bool,
    },
    /// Print a report about the installation
    Status {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::SitewipeConfig::load()?;

    // Initialize tracing with the configured log level, writing to stderr so
    // stdout stays clean for the report output.
    let filter = EnvFilter::try_new(&config.log.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Reset { keep_users, delete_uploads } => {
            cli::reset::reset(&config, keep_users, delete_uploads)?;
        }
        Command::Status { json } => {
            cli::status::status(&config, json)?;
        }
    }

    Ok(())
}
