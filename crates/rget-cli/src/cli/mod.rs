//! CLI for the rget remote-file retrieval client.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rget_core::{config, Transport, TransferClient};
use std::path::PathBuf;

use commands::{run_config, run_get, run_stat};

/// Top-level CLI for rget.
#[derive(Debug, Parser)]
#[command(name = "rget")]
#[command(about = "rget: fetch remote file metadata and contents over HTTP", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where to fetch from and which request headers to send.
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Absolute HTTP/HTTPS URL of the remote file.
    pub url: String,

    /// Extra request header, repeatable (e.g. -H "Accept: application/json").
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Send `Authorization: token <contents>` using the token stored in this file.
    #[arg(long, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Print the response status and headers as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show size, modification time and range support of a remote file (HEAD).
    Stat {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Download a remote file (GET) to a path or to stdout.
    Get {
        #[command(flatten)]
        request: RequestArgs,

        /// Destination file. Written to a temp file first and renamed on success.
        #[arg(short = 'o', long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Stat { request } => {
                let client = TransferClient::new(Transport::new(cfg.transport));
                run_stat(&client, &request)?;
            }
            CliCommand::Get { request, output } => {
                let client = TransferClient::new(Transport::new(cfg.transport));
                run_get(&client, &request, output.as_deref())?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}
