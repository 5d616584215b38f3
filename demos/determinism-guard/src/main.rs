//! determinism-guard — runs the village scenario twice and compares digests.
//!
//! Every tick summary and every snapshot (agents, enemies, structures,
//! board) is folded into a [`TraceDigest`].  Two runs from the same seed
//! must produce the same digest; any difference is reported and the
//! process exits with status 1.
//!
//! The `channel-mock` advisor answers from a worker thread, so the tick on
//! which a reply lands depends on scheduling.  In that mode the two runs
//! are reported but not required to match.
//!
//! ```text
//! determinism-guard --seed 7 --ticks 3600 --agents 12 --advisor inline-mock
//! RUST_LOG=ka_behavior=debug determinism-guard --csv output/guard
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ka_advisor::{Advisor, ChannelAdvisor, InlineAdvisor, MockProvider};
use ka_core::{EngineConfig, SimConfig};
use ka_output::{CsvWriter, SimOutputObserver, TraceDigest};
use ka_sim::{Scenario, Sim};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum AdvisorMode {
    /// No advisor; every request goes to the fallback table.
    Fallback,
    /// Seeded mock provider answered on the calling thread.
    InlineMock,
    /// Seeded mock provider on a worker thread.
    ChannelMock,
}

#[derive(Parser, Debug)]
#[command(name = "determinism-guard")]
#[command(about = "Run the village scenario twice and compare trace digests", version)]
struct Cli {
    /// Base seed for every random stream
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Ticks per run
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// Ticks per simulated second
    #[arg(long, default_value_t = 60)]
    tick_hz: u32,

    /// Agents spawned south of the castle
    #[arg(long, default_value_t = 8)]
    agents: usize,

    /// Snapshot every N ticks
    #[arg(long, default_value_t = 60)]
    interval: u64,

    #[arg(long, value_enum, default_value_t = AdvisorMode::InlineMock)]
    advisor: AdvisorMode,

    /// Engine tunables as JSON; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the first run's CSV trace into this directory
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

// ── Runs ──────────────────────────────────────────────────────────────────────

fn build_sim(cli: &Cli, engine: &EngineConfig) -> Result<Sim> {
    let config = SimConfig {
        seed:                  cli.seed,
        tick_hz:               cli.tick_hz,
        total_ticks:           cli.ticks,
        output_interval_ticks: cli.interval,
    };
    let mut builder = Scenario::village(cli.agents).into_builder(config, engine.clone());
    let advisor: Option<Box<dyn Advisor>> = match cli.advisor {
        AdvisorMode::Fallback    => None,
        AdvisorMode::InlineMock  => Some(Box::new(InlineAdvisor::new(MockProvider::new(cli.seed)))),
        AdvisorMode::ChannelMock => Some(Box::new(ChannelAdvisor::spawn(MockProvider::new(cli.seed)))),
    };
    if let Some(advisor) = advisor {
        builder = builder.advisor(advisor);
    }
    Ok(builder.build()?)
}

/// One full run; the digest plus the finished sim for the report.
fn run_once(cli: &Cli, engine: &EngineConfig, csv_dir: Option<&Path>) -> Result<(TraceDigest, Sim)> {
    let mut sim = build_sim(cli, engine)?;
    let t0 = Instant::now();
    let digest = match csv_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let writer = CsvWriter::new(dir)?;
            let mut obs = (TraceDigest::new(), SimOutputObserver::new(writer));
            sim.run(&mut obs)?;
            if let Some(e) = obs.1.take_error() {
                warn!(error = %e, "trace output incomplete");
            }
            obs.0
        }
        None => {
            let mut digest = TraceDigest::new();
            sim.run(&mut digest)?;
            digest
        }
    };
    info!(
        digest    = %digest,
        ticks     = digest.ticks(),
        snapshots = digest.snapshots(),
        elapsed_s = t0.elapsed().as_secs_f64(),
        "run complete"
    );
    Ok((digest, sim))
}

fn print_agents(sim: &Sim) {
    println!();
    println!("{:<10} {:<10} {:<12} {:>5} {:>6} {:>6}", "Agent", "Archetype", "State", "HP", "Gold", "Stuck");
    println!("{}", "-".repeat(54));
    for agent in sim.agents.iter() {
        println!(
            "{:<10} {:<10} {:<12} {:>5} {:>6} {:>6}",
            agent.name,
            agent.archetype.as_str(),
            agent.state.as_str(),
            agent.hp,
            agent.gold,
            agent.stuck.stuck_events,
        );
    }
    let stats = &sim.engine.stats;
    println!();
    println!(
        "turns {}  interrupts {}  forced resets {}  path failures {}  bounties paid {}",
        stats.turns,
        stats.interrupts,
        stats.forced_resets,
        sim.engine.mobility.stats.failures,
        sim.board.total_paid,
    );
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    fmt().with_env_filter(filter).with_target(false).init();

    let engine = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    println!("=== determinism-guard ===");
    println!(
        "Seed: {}  |  Ticks: {}  |  Agents: {}  |  Advisor: {:?}",
        cli.seed, cli.ticks, cli.agents, cli.advisor
    );

    let (first, sim) = run_once(&cli, &engine, cli.csv.as_deref())?;
    let (second, _) = run_once(&cli, &engine, None)?;

    print_agents(&sim);
    println!();
    println!("run 1: {first}");
    println!("run 2: {second}");

    if first == second {
        println!("digests match");
        return Ok(ExitCode::SUCCESS);
    }
    if cli.advisor == AdvisorMode::ChannelMock {
        println!("digests differ (expected with a threaded advisor)");
        return Ok(ExitCode::SUCCESS);
    }
    eprintln!("DIVERGENCE: identical inputs produced different traces");
    Ok(ExitCode::FAILURE)
}
