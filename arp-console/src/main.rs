//! arpsim - ARP/RARP teaching simulator for the terminal
//!
//! Walks through address resolution step by step: pick a protocol and a
//! device, watch the timed packet exchange, and inspect the resulting ARP
//! cache and device table.

mod render;
mod session;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arp_engine::{EnginePhase, SimulationEngine, SimulationSnapshot};
use arp_proto::ProtocolMode;
use arp_topology::{Device, DeviceId, DeviceRegistry, FileStore, MemoryStore, DEVICES_KEY};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use render::{render_devices, render_event, render_summary};
use session::Session;
use settings::Settings;

/// ARP/RARP teaching simulator
#[derive(Debug, Parser)]
#[command(name = "arpsim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Delay between packet phases in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one simulation
    Run {
        /// Protocol to simulate (arp or rarp)
        #[arg(long)]
        mode: ProtocolMode,
        /// Id of the device that starts the exchange
        #[arg(long)]
        device: String,
    },
    /// Run an ARP simulation followed by a RARP simulation
    Demo,
    /// List the stored devices
    Devices,
    /// Replace the stored devices with a random topology
    Randomize {
        /// Seed for a reproducible topology
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Replace the stored devices with the contents of a JSON file
    Import {
        /// JSON array of devices
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "arpsim=info,arp_engine=info,arp_topology=info,arp_proto=info".into()
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load_or_init();
    if let Some(delay_ms) = cli.delay_ms {
        settings.engine.phase_delay_ms = delay_ms;
    }
    let json = cli.json || settings.print_json;

    let registry = open_registry(&settings);
    let mut engine = SimulationEngine::new(registry, settings.engine.clone());

    match cli.command {
        Commands::Run { mode, device } => {
            let mut session = Session::spawn(engine, !json);
            let snapshot = session.run(mode, &DeviceId::new(device)).await?;
            session.shutdown().await?;
            print_outcome(&snapshot, json)?;
        }
        Commands::Demo => {
            let (sender, client) = demo_devices(engine.registry().devices())?;
            let mut session = Session::spawn(engine, !json);

            let snapshot = session.run(ProtocolMode::Arp, &sender).await?;
            if snapshot.phase != EnginePhase::Complete {
                bail!("ARP simulation did not complete");
            }
            if !json {
                println!();
            }

            let snapshot = session.run(ProtocolMode::Rarp, &client).await?;
            session.shutdown().await?;
            print_outcome(&snapshot, json)?;
        }
        Commands::Devices => {
            print_devices(engine.registry().devices(), json)?;
        }
        Commands::Randomize { seed } => {
            let lines = randomize_topology(&mut engine, seed);
            if !json {
                lines.iter().for_each(|line| println!("{}", line));
            }
            print_devices(engine.registry().devices(), json)?;
        }
        Commands::Import { file } => {
            let lines = import_devices(&mut engine, &file)?;
            if !json {
                lines.iter().for_each(|line| println!("{}", line));
            }
            print_devices(engine.registry().devices(), json)?;
        }
    }

    Ok(())
}

/// Open the device registry in the configured data directory
fn open_registry(settings: &Settings) -> DeviceRegistry {
    match settings.storage_dir.clone().or_else(FileStore::default_dir) {
        Some(dir) => {
            info!("Device database at {}", dir.display());
            DeviceRegistry::load(Box::new(FileStore::new(dir)), DEVICES_KEY)
        }
        None => {
            warn!("No data directory available, device changes will not be saved");
            DeviceRegistry::load(Box::new(MemoryStore::new()), DEVICES_KEY)
        }
    }
}

/// Pick the ARP sender and the RARP client for the demo
fn demo_devices(devices: &[Device]) -> Result<(DeviceId, DeviceId)> {
    let mut endpoints = devices.iter().filter(|d| !d.is_relay() && d.online);

    let Some(sender) = endpoints.next() else {
        bail!("the demo needs at least one online endpoint");
    };
    let client = endpoints.last().unwrap_or(sender);

    Ok((sender.id.clone(), client.id.clone()))
}

fn randomize_topology(engine: &mut SimulationEngine, seed: Option<u64>) -> Vec<String> {
    match seed {
        Some(seed) => engine.generate_random_topology_with(&mut StdRng::seed_from_u64(seed)),
        None => engine.generate_random_topology(),
    }
    engine.drain_events().iter().filter_map(render_event).collect()
}

fn import_devices(engine: &mut SimulationEngine, path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let devices: Vec<Device> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON device list", path.display()))?;

    engine
        .bulk_update_devices(devices)
        .context("device list rejected")?;

    Ok(engine.drain_events().iter().filter_map(render_event).collect())
}

fn print_outcome(snapshot: &SimulationSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        println!();
        print!("{}", render_summary(snapshot));
    }

    if snapshot.phase != EnginePhase::Complete {
        bail!("simulation stopped before completing");
    }
    Ok(())
}

fn print_devices(devices: &[Device], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(devices)?);
    } else {
        print!("{}", render_devices(devices));
    }
    Ok(())
}
