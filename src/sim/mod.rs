//! Demo pipeline: two units exchanging an incrementing value.
//!
//! Units A and B are linked by a pair of channels (`a_to_b`, `b_to_a`).
//! A seed channel delivers the initial value to A; A increments whatever
//! it receives and forwards it to B unless the result exceeds the
//! configured limit, in which case it asserts the stop channel instead.
//! B increments and always forwards back. The driver advances cycles
//! until stop becomes ready or the cycle limit is hit.
//!
//! This doubles as the reference workload for the fabric: with the
//! default limit of 5 and single-cycle latencies everywhere, stop becomes
//! ready at exactly cycle 8.

use crate::common::{Bandwidth, ConfigError, Cycle, DrainError, Fanout, Latency, PortError};
use crate::config::Config;
use crate::ports::{ReadPort, Topology, WritePort};
use crate::stats::SimStats;

/// Unit A: seeded by `init_a`, ping-pongs with B, owns the stop signal.
pub struct UnitA {
    to_b: WritePort<i64>,
    from_b: ReadPort<i64>,
    init: ReadPort<i64>,
    stop: WritePort<bool>,
    data_limit: i64,
    trace: bool,
}

impl UnitA {
    fn new(topology: &mut Topology, config: &Config) -> Self {
        let ports = &config.ports;
        Self {
            to_b: topology.make_write_port(
                "a_to_b",
                Bandwidth::new(ports.bandwidth),
                Fanout::new(ports.fanout),
            ),
            from_b: topology.make_read_port("b_to_a", Latency::new(ports.latency)),
            init: topology.make_read_port("init_a", Latency::new(ports.latency)),
            stop: topology.make_write_port(
                "stop",
                Bandwidth::new(ports.bandwidth),
                Fanout::new(ports.fanout),
            ),
            data_limit: ports.data_limit,
            trace: config.general.trace_cycles,
        }
    }

    /// One cycle of unit A: drain everything visible, process each value.
    pub fn clock(&mut self, cycle: Cycle, stats: &mut SimStats) -> Result<(), PortError> {
        loop {
            stats.readiness_polls += 1;
            let data = if self.init.is_ready(cycle) {
                stats.reads += 1;
                self.init.read(cycle)?
            } else {
                stats.readiness_polls += 1;
                if self.from_b.is_ready(cycle) {
                    stats.reads += 1;
                    self.from_b.read(cycle)?
                } else {
                    break;
                }
            };
            if self.trace {
                eprintln!("A   read {data:>3} at {cycle}");
            }
            self.process(data, cycle, stats)?;
        }
        Ok(())
    }

    fn process(&self, data: i64, cycle: Cycle, stats: &mut SimStats) -> Result<(), PortError> {
        let data = data + 1;
        stats.writes += 1;
        if data > self.data_limit {
            self.stop.write(true, cycle)
        } else {
            self.to_b.write(data, cycle)
        }
    }
}

/// Unit B: increments whatever A sends and forwards it back.
pub struct UnitB {
    to_a: WritePort<i64>,
    from_a: ReadPort<i64>,
    trace: bool,
}

impl UnitB {
    fn new(topology: &mut Topology, config: &Config) -> Self {
        let ports = &config.ports;
        Self {
            to_a: topology.make_write_port(
                "b_to_a",
                Bandwidth::new(ports.bandwidth),
                Fanout::new(ports.fanout),
            ),
            from_a: topology.make_read_port("a_to_b", Latency::new(ports.latency)),
            trace: config.general.trace_cycles,
        }
    }

    /// One cycle of unit B.
    pub fn clock(&mut self, cycle: Cycle, stats: &mut SimStats) -> Result<(), PortError> {
        stats.readiness_polls += 1;
        if self.from_a.is_ready(cycle) {
            stats.reads += 1;
            let data = self.from_a.read(cycle)?;
            if self.trace {
                eprintln!("B   read {data:>3} at {cycle}");
            }
            stats.writes += 1;
            self.to_a.write(data + 1, cycle)?;
        }
        Ok(())
    }
}

/// The assembled demo simulation: topology, both units, and the driver's
/// own seed/stop handles.
pub struct Simulation {
    topology: Topology,
    a: UnitA,
    b: UnitB,
    init: WritePort<i64>,
    stop: ReadPort<bool>,
    cycle_limit: u64,
    /// Run counters, readable after the run.
    pub stats: SimStats,
}

impl Simulation {
    /// Assembles and wires the demo pipeline.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut topology = Topology::new();
        let a = UnitA::new(&mut topology, config);
        let b = UnitB::new(&mut topology, config);
        let init = topology.make_write_port(
            "init_a",
            Bandwidth::new(config.ports.bandwidth),
            Fanout::new(config.ports.fanout),
        );
        let stop = topology.make_read_port("stop", Latency::new(config.ports.latency));
        topology.connect_all()?;
        Ok(Self {
            topology,
            a,
            b,
            init,
            stop,
            cycle_limit: config.general.cycle_limit,
            stats: SimStats::default(),
        })
    }

    /// Seeds unit A and advances cycles until the stop channel becomes
    /// ready or the cycle limit is reached.
    ///
    /// Returns the cycle at which stop was observed, if it was.
    pub fn run(&mut self) -> Result<Option<Cycle>, PortError> {
        self.init.write(0, Cycle::ZERO)?;
        self.stats.writes += 1;

        let mut cycle = Cycle::ZERO;
        while cycle.val() < self.cycle_limit {
            self.stats.cycles += 1;
            self.stats.readiness_polls += 1;
            if self.stop.is_ready(cycle) {
                self.stop.read(cycle)?;
                self.stats.reads += 1;
                self.stats.stop_cycle = Some(cycle.val());
                return Ok(Some(cycle));
            }

            self.a.clock(cycle, &mut self.stats)?;
            self.b.clock(cycle, &mut self.stats)?;

            self.stats.starved_readers += self.topology.check(cycle) as u64;
            cycle = cycle.inc();
        }
        Ok(None)
    }

    /// Tears down the topology, verifying every queue was drained.
    pub fn finish(&mut self) -> Result<(), DrainError> {
        self.topology.destroy()
    }
}
