//! Simulation statistics collection and reporting.
//!
//! Tracks fabric activity (writes, reads, readiness polls) and run
//! progress for summary output or a JSON dump.

use serde::Serialize;
use std::time::Instant;

/// Counters for one simulation run.
#[derive(Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Cycles the driver advanced.
    pub cycles: u64,
    /// Values accepted by write ports.
    pub writes: u64,
    /// Values consumed from read ports.
    pub reads: u64,
    /// `is_ready` polls issued by components.
    pub readiness_polls: u64,
    /// Starved-reader observations reported by the topology check.
    pub starved_readers: u64,
    /// Cycle at which the stop channel became ready, if it did.
    pub stop_cycle: Option<u64>,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            writes: 0,
            reads: 0,
            readiness_polls: 0,
            starved_readers: 0,
            stop_cycle: None,
        }
    }
}

impl SimStats {
    /// Host wall-clock time since the run started, in milliseconds.
    pub fn host_millis(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Prints a human-readable summary to stdout.
    pub fn report(&self) {
        println!("Simulation Statistics");
        println!("---------------------");
        println!("  Cycles:          {}", self.cycles);
        println!("  Port writes:     {}", self.writes);
        println!("  Port reads:      {}", self.reads);
        println!("  Readiness polls: {}", self.readiness_polls);
        println!("  Starved readers: {}", self.starved_readers);
        match self.stop_cycle {
            Some(cycle) => println!("  Stop asserted:   cycle {cycle}"),
            None => println!("  Stop asserted:   never"),
        }
        println!("  Host time:       {} ms", self.host_millis());
    }

    /// Serializes the counters as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
