//! Timed port fabric for a cycle-accurate pipeline simulator.
//!
//! This crate implements the communication backbone of a cycle-stepped
//! hardware simulator: typed, named, directional channels with
//! hardware-realistic transport constraints (propagation latency,
//! per-cycle bandwidth, broadcast fanout), the topology registry that
//! wires and validates them, and the branch prediction unit whose
//! name-keyed factory follows the same fail-fast discipline.
//!
//! # Architecture
//!
//! * **Ports**: one writer broadcasting to up to `fanout` readers, each
//!   with an independent delay queue; readiness is a pure per-cycle
//!   predicate, reads are FIFO per reader.
//! * **Topology**: an explicitly owned channel directory; wiring is
//!   validated once before cycle 0 and drained queues are verified at
//!   teardown.
//! * **BPU**: a closed family of prediction policies over one
//!   set-associative, LRU-replaced tag array with distinct peek and touch
//!   accesses.
//!
//! # Modules
//!
//! * `common`: timing newtypes and the error taxonomy.
//! * `config`: TOML configuration loading.
//! * `ports`: channel engine, handles, and the topology registry.
//! * `bpu`: branch prediction policies, factory, and tag array.
//! * `sim`: the two-unit demo pipeline and its driver.
//! * `stats`: run statistics collection and reporting.

/// Branch prediction unit: policies, factory, and tag array.
pub mod bpu;

/// Timing newtypes, error types.
pub mod common;

/// Configuration system for the demo pipeline and the predictor.
pub mod config;

/// The timed channel fabric and its registry.
pub mod ports;

/// Demo pipeline assembly and driver.
pub mod sim;

/// Run statistics collection and reporting.
pub mod stats;
