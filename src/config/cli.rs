use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "conversion-import")]
#[command(about = "Import recent BigQuery conversions into a Google Sheet")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file (environment variables otherwise)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the HTTP import endpoint
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one import from a JSON payload file
    Run {
        #[arg(long)]
        payload: PathBuf,
    },
}
