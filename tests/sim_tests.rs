//! End-to-end tests for the two-unit ping-pong pipeline.

use port_fabric::common::{Bandwidth, Cycle, Fanout, Latency};
use port_fabric::config::Config;
use port_fabric::ports::Topology;
use port_fabric::sim::Simulation;

fn cycle(n: u64) -> Cycle {
    Cycle::new(n)
}

/// Drives the ping-pong scenario by hand, asserting readiness and data
/// for every cycle of the expected trace.
///
/// Two bandwidth=1/fanout=1/latency=1 channels link A and B, plus a seed
/// channel delivering 0 and a stop channel. A increments and forwards
/// until the result exceeds 5, then asserts stop instead.
#[test]
fn test_ping_pong_trace() {
    const DATA_LIMIT: i64 = 5;

    let mut topology = Topology::new();
    let bw = Bandwidth::new(1);
    let fo = Fanout::new(1);
    let lat = Latency::new(1);

    let a_out = topology.make_write_port::<i64>("a_to_b", bw, fo);
    let b_in = topology.make_read_port::<i64>("a_to_b", lat);
    let b_out = topology.make_write_port::<i64>("b_to_a", bw, fo);
    let a_in = topology.make_read_port::<i64>("b_to_a", lat);
    let seed = topology.make_write_port::<i64>("init_a", bw, fo);
    let init = topology.make_read_port::<i64>("init_a", lat);
    let stop_out = topology.make_write_port::<bool>("stop", bw, fo);
    let stop = topology.make_read_port::<bool>("stop", lat);
    topology.connect_all().unwrap();

    seed.write(0, cycle(0)).unwrap();

    // Per-cycle expectations: (init ready, A's input ready with value,
    // B's input ready with value).
    let expected: &[(u64, bool, Option<i64>, Option<i64>)] = &[
        (0, false, None, None),
        (1, true, None, None),
        (2, false, None, Some(1)),
        (3, false, Some(2), None),
        (4, false, None, Some(3)),
        (5, false, Some(4), None),
        (6, false, None, Some(5)),
        (7, false, Some(6), None),
        (8, false, None, None),
    ];

    let mut stop_seen_at = None;
    for &(n, init_ready, from_b, from_a) in expected {
        let now = cycle(n);

        if stop.is_ready(now) {
            stop_seen_at = Some(n);
            assert!(stop.read(now).unwrap());
            break;
        }

        // Unit A: consume seed or B's value, increment, forward or stop.
        assert_eq!(init.is_ready(now), init_ready, "init readiness at cycle {n}");
        assert_eq!(
            a_in.is_ready(now),
            from_b.is_some(),
            "A input readiness at cycle {n}"
        );
        let a_data = if init_ready {
            assert_eq!(init.read(now).unwrap(), 0, "seed value at cycle {n}");
            Some(0)
        } else if let Some(value) = from_b {
            assert_eq!(a_in.read(now).unwrap(), value);
            Some(value)
        } else {
            None
        };
        if let Some(data) = a_data {
            let data = data + 1;
            if data > DATA_LIMIT {
                stop_out.write(true, now).unwrap();
            } else {
                a_out.write(data, now).unwrap();
            }
        }

        // Unit B: consume A's value, increment, forward back.
        assert_eq!(
            b_in.is_ready(now),
            from_a.is_some(),
            "B input readiness at cycle {n}"
        );
        if let Some(value) = from_a {
            assert_eq!(b_in.read(now).unwrap(), value);
            b_out.write(value + 1, now).unwrap();
        }

        assert_eq!(topology.check(now), 0, "no starvation during the run");
    }

    assert_eq!(
        stop_seen_at,
        Some(8),
        "stop must become ready at exactly cycle 8"
    );
    assert!(topology.destroy().is_ok(), "all queues drained at teardown");
}

/// Tests the assembled simulation with the default configuration: stop
/// observed at cycle 8 and a clean teardown.
#[test]
fn test_simulation_default_run() {
    let config = Config::default();
    let mut sim = Simulation::new(&config).unwrap();

    let stop = sim.run().unwrap();
    assert_eq!(stop, Some(cycle(8)));
    assert_eq!(sim.stats.stop_cycle, Some(8));
    assert_eq!(sim.stats.starved_readers, 0);

    // Seed plus seven forwards and the stop write; every write has a
    // matching read once stop itself is consumed.
    assert_eq!(sim.stats.writes, 8);
    assert_eq!(sim.stats.reads, 8);
    // One stop poll per cycle (9), one from B per clocked cycle (8), and
    // A's drain loop: two polls per idle pass, one for a seed hit, two
    // extra per ping-pong hit. Each counter bumps exactly where its
    // is_ready call happens, so the total is fixed for this trace.
    assert_eq!(sim.stats.readiness_polls, 40);

    assert!(sim.finish().is_ok());
}

/// Tests that a cycle limit too short to observe stop leaves the stop
/// channel undrained, which teardown reports as lost data.
#[test]
fn test_simulation_truncated_run_leaks() {
    let mut config = Config::default();
    config.ports.data_limit = 7; // stop becomes ready at cycle 10
    config.general.cycle_limit = 10;

    let mut sim = Simulation::new(&config).unwrap();
    assert_eq!(sim.run().unwrap(), None, "stop never observed in time");

    let err = sim.finish().unwrap_err();
    assert_eq!(err.leaks.len(), 1);
    assert_eq!(err.leaks[0].channel, "stop");
}

/// Tests that a longer horizon lets the raised data limit finish cleanly.
#[test]
fn test_simulation_raised_limit() {
    let mut config = Config::default();
    config.ports.data_limit = 7;
    config.general.cycle_limit = 12;

    let mut sim = Simulation::new(&config).unwrap();
    assert_eq!(sim.run().unwrap(), Some(cycle(10)));
    assert!(sim.finish().is_ok());
}

/// Tests that a zero-fanout configuration is rejected at assembly.
#[test]
fn test_simulation_rejects_zero_fanout() {
    let mut config = Config::default();
    config.ports.fanout = 0;

    assert!(Simulation::new(&config).is_err());
}
