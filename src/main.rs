//! Port fabric demo CLI.
//!
//! Loads the TOML configuration, assembles the demo pipeline, runs it to
//! completion, and reports statistics. Assembly-time configuration errors
//! and run-time protocol violations terminate the process with a non-zero
//! status and a diagnostic naming the offender; the fabric never guesses
//! a fallback.

use clap::Parser;
use std::{fs, process};

use port_fabric::bpu::Bpu;
use port_fabric::config::Config;
use port_fabric::sim::Simulation;

/// Command-line arguments for the demo driver.
#[derive(Parser, Debug)]
#[command(author, version, about = "Cycle-accurate port fabric demo")]
struct Args {
    /// Path to a TOML configuration file; defaults apply if omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Write run statistics as JSON to this path.
    #[arg(long)]
    stats_json: Option<String>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    // The predictor is constructed up front so a bad policy name or
    // geometry fails before any cycle runs, like a broken topology would.
    let bpu = match Bpu::new(
        config.predictor.policy,
        config.predictor.size_in_entries,
        config.predictor.ways,
        config.predictor.address_bits,
    ) {
        Ok(bpu) => bpu,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    println!("Global Configuration");
    println!("--------------------");
    println!("General:");
    println!("  Cycle Limit:      {}", config.general.cycle_limit);
    println!("  Trace Cycles:     {}", config.general.trace_cycles);
    println!("Ports:");
    println!("  Latency:          {}", config.ports.latency);
    println!("  Bandwidth:        {}", config.ports.bandwidth);
    println!("  Fanout:           {}", config.ports.fanout);
    println!("  Data Limit:       {}", config.ports.data_limit);
    println!("Predictor:");
    println!("  Policy:           {}", bpu.policy().name());
    println!("  Entries:          {}", config.predictor.size_in_entries);
    println!("  Ways:             {}", config.predictor.ways);
    println!("  Address Bits:     {}", config.predictor.address_bits);
    println!();

    let mut sim = match Simulation::new(&config) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    match sim.run() {
        Ok(Some(cycle)) => println!("Stop asserted at {cycle}"),
        Ok(None) => println!(
            "Stop never asserted within {} cycles",
            config.general.cycle_limit
        ),
        Err(e) => {
            log::error!("protocol violation: {e}");
            process::exit(1);
        }
    }

    if let Err(e) = sim.finish() {
        log::error!("{e}");
        process::exit(1);
    }

    println!();
    sim.stats.report();

    if let Some(path) = &args.stats_json {
        match sim.stats.to_json() {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::error!("failed to write stats to '{path}': {e}");
                    process::exit(1);
                }
            }
            Err(e) => {
                log::error!("failed to serialize stats: {e}");
                process::exit(1);
            }
        }
    }
}
