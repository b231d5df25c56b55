//! vmclipd - shared clipboard host service daemon.
//!
//! Entry point for the service binary. The binary hosts the service core
//! with a headless backend; a real deployment embeds the library next to
//! its transport and host clipboard bindings.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use vmclipd::config::Config;
use vmclipd::{NullClipboard, ServiceConfig, SharedClipboardService, SharingMode};

/// Command-line arguments for vmclipd
#[derive(Parser, Debug)]
#[command(name = "vmclipd")]
#[command(version, about = "Shared clipboard host service", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/vmclipd/config.toml")]
    pub config: String,

    /// Sharing mode override (off|host-to-guest|guest-to-host|bidirectional)
    #[arg(short, long, env = "VMCLIPD_MODE")]
    pub mode: Option<String>,

    /// Run headless (never touch the host's real clipboard)
    #[arg(long)]
    pub headless: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("vmclipd v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(&args.config).or_else(|e| {
        tracing::warn!("Failed to load config: {}, using defaults", e);
        anyhow::Ok(Config::default())
    })?;

    let mode_override = match args.mode.as_deref() {
        Some("off") => Some(SharingMode::Off),
        Some("host-to-guest") => Some(SharingMode::HostToGuest),
        Some("guest-to-host") => Some(SharingMode::GuestToHost),
        Some("bidirectional") => Some(SharingMode::Bidirectional),
        Some(other) => anyhow::bail!("Invalid sharing mode: {}", other),
        None => None,
    };
    let config = config.with_overrides(mode_override, args.headless);
    config.validate()?;

    let service = Arc::new(SharedClipboardService::new(
        ServiceConfig {
            initial_mode: config.clipboard.mode,
            headless: config.clipboard.headless,
            max_data_size: config.clipboard.max_data_size,
        },
        Arc::new(NullClipboard),
    ));

    info!(mode = ?service.mode(), "service ready, waiting for transport");

    tokio::signal::ctrl_c().await?;

    service.shutdown();
    info!("vmclipd shut down");
    Ok(())
}

fn init_logging(args: &Args) {
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("vmclipd={log_level},warn")));

    match args.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .json()
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .compact()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .pretty()
                .init();
        }
    }
}
