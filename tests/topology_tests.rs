//! Integration tests for topology wiring, validation, and teardown.

use port_fabric::common::{
    Bandwidth, ConfigError, Cycle, Fanout, Latency, PortError, TopologyFault,
};
use port_fabric::ports::Topology;

fn cycle(n: u64) -> Cycle {
    Cycle::new(n)
}

fn faults_of(err: ConfigError) -> Vec<TopologyFault> {
    match err {
        ConfigError::Topology(faults) => faults,
        other => panic!("expected a topology error, got {other:?}"),
    }
}

/// Tests that a reader without a writer fails validation by name.
#[test]
fn test_missing_writer() {
    let mut topology = Topology::new();
    let _rp = topology.make_read_port::<u32>("orphan", Latency::new(1));

    let faults = faults_of(topology.connect_all().unwrap_err());
    assert_eq!(
        faults,
        vec![TopologyFault::MissingWriter {
            channel: "orphan".to_owned()
        }]
    );
}

/// Tests that a writer without readers fails validation.
#[test]
fn test_no_readers() {
    let mut topology = Topology::new();
    let _wp = topology.make_write_port::<u32>("deadend", Bandwidth::new(1), Fanout::new(1));

    let faults = faults_of(topology.connect_all().unwrap_err());
    assert!(faults.contains(&TopologyFault::NoReaders {
        channel: "deadend".to_owned()
    }));
}

/// Tests that two writers under one name fail validation.
#[test]
fn test_duplicate_writer() {
    let mut topology = Topology::new();
    let _w1 = topology.make_write_port::<u32>("shared", Bandwidth::new(1), Fanout::new(1));
    let _w2 = topology.make_write_port::<u32>("shared", Bandwidth::new(1), Fanout::new(1));
    let _rp = topology.make_read_port::<u32>("shared", Latency::new(1));

    let faults = faults_of(topology.connect_all().unwrap_err());
    assert!(faults.contains(&TopologyFault::DuplicateWriter {
        channel: "shared".to_owned()
    }));
}

/// Tests that registering more readers than the writer's fanout fails.
#[test]
fn test_fanout_exceeded() {
    let mut topology = Topology::new();
    let _wp = topology.make_write_port::<u32>("narrow", Bandwidth::new(1), Fanout::new(1));
    let _r1 = topology.make_read_port::<u32>("narrow", Latency::new(1));
    let _r2 = topology.make_read_port::<u32>("narrow", Latency::new(1));

    let faults = faults_of(topology.connect_all().unwrap_err());
    assert!(faults.contains(&TopologyFault::FanoutExceeded {
        channel: "narrow".to_owned(),
        readers: 2,
        fanout: 1,
    }));
}

/// Tests that a name reused at a different type fails validation.
#[test]
fn test_type_mismatch() {
    let mut topology = Topology::new();
    let _wp = topology.make_write_port::<u32>("typed", Bandwidth::new(1), Fanout::new(1));
    let _rp = topology.make_read_port::<i64>("typed", Latency::new(1));

    let faults = faults_of(topology.connect_all().unwrap_err());
    assert!(
        faults.iter().any(|fault| matches!(
            fault,
            TopologyFault::TypeMismatch { channel, .. } if channel == "typed"
        )),
        "expected a type mismatch on 'typed', got {faults:?}"
    );
}

/// Tests that zero bandwidth and zero fanout are wiring faults.
#[test]
fn test_zero_capacity() {
    let mut topology = Topology::new();
    let _wp = topology.make_write_port::<u32>("void", Bandwidth::new(0), Fanout::new(0));
    let _rp = topology.make_read_port::<u32>("void", Latency::new(1));

    let faults = faults_of(topology.connect_all().unwrap_err());
    assert!(faults.contains(&TopologyFault::ZeroCapacity {
        channel: "void".to_owned(),
        parameter: "bandwidth",
    }));
    assert!(faults.contains(&TopologyFault::ZeroCapacity {
        channel: "void".to_owned(),
        parameter: "fanout",
    }));
}

/// Tests that validation reports every offending channel, not just the
/// first.
#[test]
fn test_all_faults_reported() {
    let mut topology = Topology::new();
    let _rp = topology.make_read_port::<u32>("first", Latency::new(1));
    let _wp = topology.make_write_port::<u32>("second", Bandwidth::new(1), Fanout::new(1));

    let err = topology.connect_all().unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("first"), "diagnostic must name 'first'");
    assert!(rendered.contains("second"), "diagnostic must name 'second'");
    assert!(faults_of(err).len() >= 2);
}

/// Tests a clean wiring and teardown after a full drain.
#[test]
fn test_destroy_clean() {
    let mut topology = Topology::new();
    let wp = topology.make_write_port::<u8>("loop", Bandwidth::new(1), Fanout::new(1));
    let rp = topology.make_read_port::<u8>("loop", Latency::new(1));
    topology.connect_all().unwrap();

    wp.write(1, cycle(0)).unwrap();
    assert_eq!(rp.read(cycle(1)).unwrap(), 1);

    assert!(topology.destroy().is_ok());
    assert!(topology.is_empty(), "destroy releases all registrations");
}

/// Tests that teardown reports every undrained item as lost data.
#[test]
fn test_destroy_reports_leaks() {
    let mut topology = Topology::new();
    let wp = topology.make_write_port::<u8>("leaky", Bandwidth::new(2), Fanout::new(1));
    let _rp = topology.make_read_port::<u8>("leaky", Latency::new(1));
    topology.connect_all().unwrap();

    wp.write(1, cycle(0)).unwrap();
    wp.write(2, cycle(0)).unwrap();

    let err = topology.destroy().unwrap_err();
    assert_eq!(err.leaks.len(), 1);
    assert_eq!(err.leaks[0].channel, "leaky");
    assert_eq!(err.leaks[0].reader, 0);
    assert_eq!(err.leaks[0].items, 2);
}

/// Tests that a handle registered after wiring is refused: it never joins
/// the validated channel, sees nothing, and every read on it errors, so a
/// late reader cannot slip past the fanout check.
#[test]
fn test_registration_after_connect_is_refused() {
    let mut topology = Topology::new();
    let wp = topology.make_write_port::<u32>("ring", Bandwidth::new(1), Fanout::new(1));
    let rp = topology.make_read_port::<u32>("ring", Latency::new(0));
    topology.connect_all().unwrap();

    let late = topology.make_read_port::<u32>("ring", Latency::new(0));
    wp.write(7, cycle(0)).unwrap();

    assert!(!late.is_ready(cycle(0)), "late reader gets no broadcasts");
    assert!(matches!(
        late.read(cycle(0)).unwrap_err(),
        PortError::ReadNotReady { .. }
    ));
    assert_eq!(rp.read(cycle(0)).unwrap(), 7, "wired reader is unaffected");

    let late_writer = topology.make_write_port::<u32>("ring", Bandwidth::new(1), Fanout::new(1));
    assert!(matches!(
        late_writer.write(9, cycle(0)).unwrap_err(),
        PortError::NotConnected { .. }
    ));

    assert!(topology.destroy().is_ok());
}

/// Tests the starvation diagnostic: a reader that ignores a ready item
/// long enough is flagged, a freshly ready one is not.
#[test]
fn test_check_flags_starved_readers() {
    let mut topology = Topology::new();
    let wp = topology.make_write_port::<u8>("idle", Bandwidth::new(1), Fanout::new(1));
    let rp = topology.make_read_port::<u8>("idle", Latency::new(0));
    topology.connect_all().unwrap();

    wp.write(1, cycle(0)).unwrap();
    assert_eq!(topology.check(cycle(1)), 0, "freshly ready is not starved");
    assert_eq!(topology.check(cycle(100)), 1, "long-ignored reader flagged");

    let _ = rp.read(cycle(100)).unwrap();
    let _ = topology.destroy();
}

/// Tests that the starvation bound can be tightened per registry: with a
/// bound of 2 a reader is flagged well before the 64-cycle default.
#[test]
fn test_check_custom_starvation_bound() {
    let mut topology = Topology::new();
    topology.set_starvation_bound(Latency::new(2));
    let wp = topology.make_write_port::<u8>("idle", Bandwidth::new(1), Fanout::new(1));
    let rp = topology.make_read_port::<u8>("idle", Latency::new(0));
    topology.connect_all().unwrap();

    wp.write(1, cycle(0)).unwrap();
    assert_eq!(topology.check(cycle(1)), 0);
    assert_eq!(topology.check(cycle(2)), 1, "flagged at the custom bound");

    let _ = rp.read(cycle(2)).unwrap();
    let _ = topology.destroy();
}

/// Tests that two registries are fully independent: identical channel
/// names in separate simulations never interfere.
#[test]
fn test_independent_instances() {
    let mut sim1 = Topology::new();
    let wp1 = sim1.make_write_port::<u16>("bus", Bandwidth::new(1), Fanout::new(1));
    let rp1 = sim1.make_read_port::<u16>("bus", Latency::new(0));
    sim1.connect_all().unwrap();

    let mut sim2 = Topology::new();
    let wp2 = sim2.make_write_port::<u16>("bus", Bandwidth::new(1), Fanout::new(1));
    let rp2 = sim2.make_read_port::<u16>("bus", Latency::new(0));
    sim2.connect_all().unwrap();

    wp1.write(11, cycle(0)).unwrap();
    wp2.write(22, cycle(0)).unwrap();

    assert_eq!(rp1.read(cycle(0)).unwrap(), 11);
    assert_eq!(rp2.read(cycle(0)).unwrap(), 22);

    assert!(sim1.destroy().is_ok());
    assert!(sim2.destroy().is_ok());
}
