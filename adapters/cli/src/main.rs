#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a botcleaner room until it is clean.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use botcleaner_core::{Command, RoomConfig};
use botcleaner_system_reporting::{Reporter, TickReport};
use botcleaner_world::{self as world, query, World};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

/// Headless driver for the robot cleaning simulation.
#[derive(Debug, Parser)]
#[command(name = "botcleaner", about = "Simulate robots cleaning a furnished room")]
struct Cli {
    /// TOML file with room parameters; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: config::Overrides,

    /// Stop after this many ticks even if dirt remains.
    #[arg(long, default_value_t = 1000)]
    max_ticks: u64,

    /// Write every tick report to this file as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

/// Entry point for the botcleaner command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = config::resolve(cli.config.as_deref(), &cli.overrides)?;
    let (world, reporter) = run(&config, cli.max_ticks)?;
    print_summary(&world, &reporter);

    if let Some(path) = cli.report {
        write_report(&path, reporter.history())?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(config: &RoomConfig, max_ticks: u64) -> Result<(World, Reporter)> {
    let mut world = World::new(config).context("failed to initialise the room")?;
    let mut reporter = Reporter::new(&world);
    let (width, height) = query::dimensions(&world);
    info!(
        seed = query::seed(&world),
        width,
        height,
        robots = query::robot_view(&world).len(),
        dirty = query::initial_dirty_cell_count(&world),
        furniture = query::furniture_count(&world),
        "room ready"
    );

    let mut events = Vec::new();
    while !query::is_clean(&world) && query::tick(&world) < max_ticks {
        events.clear();
        world::apply(&mut world, Command::Tick, &mut events);
        reporter.handle(&events, &world);

        if let Some(report) = reporter.latest() {
            info!(
                tick = report.tick,
                dirty = report.dirty_cells,
                dirty_ratio = report.dirty_ratio,
                movements = report.total_movements(),
                "tick completed"
            );
        }
    }

    Ok((world, reporter))
}

fn print_summary(world: &World, reporter: &Reporter) {
    let ratio = reporter
        .latest()
        .map_or(botcleaner_system_reporting::RATIO_WITHOUT_DIRT, |report| {
            report.dirty_ratio
        });
    let outcome = if query::is_clean(world) {
        "clean"
    } else {
        "dirt remaining"
    };

    println!("seed:        {}", query::seed(world));
    println!("ticks:       {} ({outcome})", query::tick(world));
    println!("dirty ratio: {ratio:.3}");
    for robot in query::robot_view(world).iter() {
        println!("{}: {} moves, at {}", robot.id, robot.movements, robot.cell);
    }
}

fn write_report(path: &Path, history: &[TickReport]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, history)
        .with_context(|| format!("failed to write report file {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush report file {}", path.display()))
}
