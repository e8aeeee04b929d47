//! Operator CLI for the hotel central AC scheduler
//!
//! `simulate` boots the plant from configuration, powers every room on,
//! and runs simulated time. The journal persists across runs, so `bill`,
//! `summary`, and `clear` operate on whatever earlier sessions wrote.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hotelac_config::{load_config, AcConfig};
use hotelac_core::{AcSystem, Mode, RoomId};
use hotelac_journal::{Journal, SledJournal};

#[derive(Parser)]
#[command(name = "hotelac", version, about = "Hotel central air-conditioning scheduler")]
struct Cli {
    /// TOML configuration file (defaults to ./hotelac.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Boot the plant, power every room on, and run simulated time
    Simulate {
        /// Simulated seconds to run
        #[arg(long, default_value_t = 600)]
        seconds: u64,

        /// Operating mode for every room: cool | heat
        #[arg(long, default_value = "cool")]
        mode: String,
    },
    /// Print a room's bill from the journal
    Bill {
        #[arg(long)]
        room: u32,
    },
    /// Print plant-wide cost totals, optionally over a time range
    Summary {
        /// Inclusive start, "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        start: Option<String>,

        /// Inclusive end, "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete every journal record
    Clear,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Simulate { seconds, mode } => {
            let mode: Mode = mode.parse().map_err(anyhow::Error::msg)?;
            simulate(&config, seconds, mode)
        }
        Command::Bill { room } => bill(&config, room),
        Command::Summary { start, end } => summary(&config, start.as_deref(), end.as_deref()),
        Command::Clear => clear(&config),
    }
}

fn open_journal(config: &AcConfig) -> anyhow::Result<Arc<SledJournal>> {
    let journal = SledJournal::open(&config.system.journal_path)
        .with_context(|| format!("opening journal at {}", config.system.journal_path))?;
    Ok(Arc::new(journal))
}

fn simulate(config: &AcConfig, seconds: u64, mode: Mode) -> anyhow::Result<()> {
    let journal = open_journal(config)?;
    let system = AcSystem::new(&config.system, journal);

    for id in 1..=config.system.room_count {
        let temp = config.system.initial_temp_for(id);
        let response = system.power_on(RoomId(id), temp, mode);
        info!(room = id, response = %serde_json::to_string(&response)?, "power on");
    }

    info!(seconds, "running simulation");
    system.tick(seconds);

    let statuses = system.all_room_statuses();
    println!("{}", serde_json::to_string_pretty(&statuses)?);
    println!(
        "{}",
        serde_json::to_string_pretty(&system.summary())?
    );
    Ok(())
}

fn bill(config: &AcConfig, room: u32) -> anyhow::Result<()> {
    let journal = open_journal(config)?;
    let records = journal.list_for_room(room)?;
    let total = journal.sum_for_room(room)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "room_id": room,
            "total_cost": (total * 100.0).round() / 100.0,
            "details": records,
        }))?
    );
    Ok(())
}

fn summary(config: &AcConfig, start: Option<&str>, end: Option<&str>) -> anyhow::Result<()> {
    let journal = open_journal(config)?;
    let total = if start.is_some() || end.is_some() {
        journal.sum_range(start, end)?
    } else {
        journal.sum_all()?
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "total_cost": (total * 100.0).round() / 100.0,
        }))?
    );
    Ok(())
}

fn clear(config: &AcConfig) -> anyhow::Result<()> {
    let journal = open_journal(config)?;
    journal.clear_all()?;
    info!("journal cleared");
    Ok(())
}
