//! MOX LT bridge: entry point.
//!
//! Loads the accessory config, binds a UDP client to the MOX LT server and
//! either keeps running (logging every status change) or performs a single
//! get/set and exits.
//!
//! # Usage
//!
//! ```text
//! mox-bridge [OPTIONS] [COMMAND]
//!
//! Commands:
//!   run                          Prime every accessory and log status changes (default)
//!   list                         Print the configured accessories
//!   get <NAME> [CHARACTERISTIC]  Read one characteristic
//!   set <NAME> <VALUE>           Write one characteristic
//!
//! Options:
//!   -c, --config <PATH>      Config file [env: MOX_CONFIG] [default: mox-bridge.toml]
//!       --log-level <FILTER> Log filter [env: MOX_LOG_LEVEL]
//! ```
//!
//! # Log level precedence
//!
//! `RUST_LOG` wins, then `--log-level`, then `log_level` from the config
//! file.  An unparsable filter falls back to `info`.
//!
//! # Reads and the cache (for beginners)
//!
//! A one-shot `get` starts with an empty cache, so if the device does not
//! answer within `status_timeout_ms` it prints the default (`off` / `0`)
//! marked `(cache)`.  Under `run` the cache is primed at startup and kept
//! current by every status reply the server sends.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mox_bridge::domain::{AccessoryKind, BridgeConfig, Characteristic, CharacteristicValue};
use mox_bridge::infrastructure::{connect, load_config};
use mox_client::StatusEvent;
use mox_core::CorrelationKey;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Bridge for devices on a MOX LT home-automation server.
#[derive(Debug, Parser)]
#[command(name = "mox-bridge", about = "Accessory bridge for MOX LT servers", version)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, short, default_value = "mox-bridge.toml", env = "MOX_CONFIG")]
    config: PathBuf,

    /// `tracing` filter, e.g. `debug` or `mox_client=trace`.
    ///
    /// Overrides `log_level` from the config file; `RUST_LOG` overrides both.
    #[arg(long, env = "MOX_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Prime every accessory and log status changes until Ctrl+C.
    Run,
    /// Print the configured accessories.
    List,
    /// Read one characteristic of an accessory.
    Get {
        /// Accessory name (case-insensitive).
        name: String,
        /// e.g. `on`, `brightness`, `current-position`.  Defaults to the
        /// accessory's primary characteristic.
        characteristic: Option<String>,
    },
    /// Write one characteristic of an accessory.
    Set {
        /// Accessory name (case-insensitive).
        name: String,
        /// `on`, `off`, or a number (levels are clamped to 0-100).
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Characteristic to write.  Inferred from the value when omitted.
        #[arg(long, short = 'C')]
        characteristic: Option<String>,
    },
}

impl Cli {
    fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

fn init_logging(cli: &Cli, config: &BridgeConfig) {
    let fallback = cli.log_level.as_deref().unwrap_or(&config.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(fallback))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    init_logging(&cli, &config);

    match cli.command() {
        Command::Run => run(&config).await,
        Command::List => {
            list(&config);
            Ok(())
        }
        Command::Get {
            name,
            characteristic,
        } => get(&config, &name, characteristic.as_deref()).await,
        Command::Set {
            name,
            value,
            characteristic,
        } => set(&config, &name, &value, characteristic.as_deref()).await,
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run(config: &BridgeConfig) -> anyhow::Result<()> {
    let (platform, client) = connect(config).await.context("failed to start MOX client")?;

    let mut names: HashMap<CorrelationKey, Vec<String>> = HashMap::new();
    for accessory in platform.accessories() {
        names
            .entry(accessory.key())
            .or_default()
            .push(accessory.name().to_string());
    }

    // Subscribe before priming so the first replies are not missed.
    let mut events = client.subscribe();
    let primed = platform.prime_all().await;
    info!("MOX bridge running: {primed}/{} accessories primed", platform.len());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            signal = &mut shutdown => {
                match signal {
                    Ok(()) => info!("received Ctrl+C, shutting down"),
                    Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
                }
                break;
            }
            event = events.recv() => match event {
                Ok(event) => log_event(&names, &event),
                Err(RecvError::Lagged(missed)) => warn!("missed {missed} status events"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    client.shutdown();
    info!("MOX bridge stopped");
    Ok(())
}

fn log_event(names: &HashMap<CorrelationKey, Vec<String>>, event: &StatusEvent) {
    let header = &event.report.header;
    match names.get(&event.key) {
        Some(names) => info!("{}: {:?}", names.join(", "), event.report.value),
        None => info!(
            "unconfigured device {} ch {}: {:?}",
            header.address, header.channel, event.report.value
        ),
    }
}

fn list(config: &BridgeConfig) {
    let mut rows: Vec<_> = config.accessories().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    for accessory in rows {
        let kind = accessory.kind.as_deref().unwrap_or_default();
        let detail = match kind.parse::<AccessoryKind>() {
            Ok(kind) => kind
                .characteristics()
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Err(_) => "skipped: unknown type".to_string(),
        };
        println!(
            "{:<24} {:<8} {} ch {}  [{detail}]",
            accessory.name, kind, accessory.module_id, accessory.channel_id
        );
    }
}

async fn get(config: &BridgeConfig, name: &str, characteristic: Option<&str>) -> anyhow::Result<()> {
    let (platform, client) = connect(config).await.context("failed to start MOX client")?;
    let accessory = platform
        .find(name)
        .with_context(|| format!("no accessory named {name:?}"))?;
    let characteristic = match characteristic {
        Some(text) => text.parse::<Characteristic>()?,
        None => accessory.kind().primary(),
    };

    let outcome = accessory.get(characteristic).await?;
    let source = if outcome.is_fresh() { "device" } else { "cache" };
    println!("{} {characteristic} = {} ({source})", accessory.name(), outcome.into_inner());

    client.shutdown();
    Ok(())
}

async fn set(
    config: &BridgeConfig,
    name: &str,
    value: &str,
    characteristic: Option<&str>,
) -> anyhow::Result<()> {
    let value: CharacteristicValue = value.parse()?;
    let (platform, client) = connect(config).await.context("failed to start MOX client")?;
    let accessory = platform
        .find(name)
        .with_context(|| format!("no accessory named {name:?}"))?;
    let characteristic = match characteristic {
        Some(text) => text.parse::<Characteristic>()?,
        None => accessory.kind().characteristic_for(value),
    };

    accessory.set(characteristic, value).await?;
    println!("{} {characteristic} <- {value}", accessory.name());

    client.shutdown();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
