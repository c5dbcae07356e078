//! Common types shared across the fabric.
//!
//! Provides the timing newtypes and the error taxonomy used by the port
//! engine, the topology registry, and the branch prediction unit.

/// Error types and the topology fault taxonomy.
pub mod error;

/// Timing newtypes (cycles, latencies, capacities).
pub mod types;

pub use error::{ConfigError, DrainError, DrainLeak, PortError, TopologyFault};
pub use types::{Bandwidth, Cycle, Fanout, Latency};
