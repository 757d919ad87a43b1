//! # SalesPulse — CRM follow-up timer & notification engine
//!
//! Scans due follow-up timers, fans out notifications to their recipients,
//! computes the next recurrence, and advances timer state.
//!
//! Usage:
//!   salespulse serve                 # Start the HTTP trigger gateway
//!   salespulse serve --port 9000     # Custom port
//!   salespulse process               # One batch run, print the summary
//!   salespulse init                  # Write a default config file

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use salespulse_channels::EmailSink;
use salespulse_core::PulseConfig;
use salespulse_core::traits::{NotificationSink, RecordStore};
use salespulse_engine::run_due_timers;
use salespulse_store::RestStore;

#[derive(Parser)]
#[command(
    name = "salespulse",
    version,
    about = "⏰ SalesPulse — CRM follow-up timer & notification engine"
)]
struct Cli {
    /// Path to config file (default: ~/.salespulse/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP trigger gateway
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one batch of due timers and print the summary JSON
    Process,
    /// Write a default config file to ~/.salespulse/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => PulseConfig::load_from(path)?,
        None => PulseConfig::load()?,
    };

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            salespulse_gateway::start(config).await
        }
        Command::Process => {
            let store: Arc<dyn RecordStore> = Arc::new(RestStore::new(&config.store)?);
            let sink: Arc<dyn NotificationSink> = Arc::new(EmailSink::new(config.smtp.clone()));
            let summary = run_due_timers(store, sink).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Init => {
            let path = PulseConfig::default_path();
            if path.exists() {
                println!("Config already exists at {}", path.display());
                return Ok(());
            }
            // Write pristine defaults: env-sourced secrets stay out of the file.
            PulseConfig::default().save()?;
            println!("✅ Config written to {}", path.display());
            println!("Set SALESPULSE_STORE_KEY and SALESPULSE_SMTP_PASSWORD in the environment.");
            Ok(())
        }
    }
}
