//! Timed inter-component communication fabric.
//!
//! Pipeline units talk to each other exclusively through named, typed,
//! directional channels ("ports") that model hardware transport
//! constraints: a propagation delay before a written value becomes
//! visible, a per-cycle write bandwidth, and a bound on broadcast fanout.
//!
//! A channel connects exactly one [`WritePort`] to up to `fanout`
//! [`ReadPort`]s. Each reader has its own latency and its own FIFO queue
//! fed by the same writes, so readers drain independently. The
//! [`Topology`] registry wires and validates the whole channel directory
//! once before the run and verifies a clean drain afterwards.
//!
//! The fabric is logically single-threaded: a global cycle counter is
//! advanced by the external driver, and all operations are immediate:
//! nothing blocks or suspends.

/// Direction-restricted producer/consumer handles.
pub mod handles;

/// The delay/bandwidth/fanout engine behind one channel.
mod port;

/// The owned channel directory and its lifecycle.
pub mod topology;

pub use handles::{ReadPort, WritePort};
pub use topology::Topology;

/// Values transportable through a port.
///
/// Broadcast clones the value into every reader's queue, and type identity
/// is checked at wiring time, hence the bounds.
pub trait PortData: Clone + 'static {}

impl<T: Clone + 'static> PortData for T {}
