//! Fundamental timing types.
//!
//! All port timing is expressed in terms of these newtypes rather than raw
//! integers, so a latency can never be passed where a cycle is expected and
//! the monotonic nature of simulated time is visible in the signatures.

use std::fmt;
use std::ops::Add;

/// One step of simulated time.
///
/// Cycles are totally ordered and only ever advance; the driver owns the
/// single global counter and hands the current value to every component
/// each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cycle(u64);

impl Cycle {
    /// The first cycle of a simulation.
    pub const ZERO: Cycle = Cycle(0);

    /// Creates a cycle from a raw count.
    pub fn new(val: u64) -> Self {
        Cycle(val)
    }

    /// Returns the raw cycle count.
    pub fn val(self) -> u64 {
        self.0
    }

    /// Returns the cycle following this one.
    pub fn inc(self) -> Cycle {
        Cycle(self.0 + 1)
    }
}

impl Add<Latency> for Cycle {
    type Output = Cycle;

    fn add(self, rhs: Latency) -> Cycle {
        Cycle(self.0 + rhs.0)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle {}", self.0)
    }
}

/// Delay, in cycles, between a write and its visibility to a reader.
///
/// Zero is legal: a value written at cycle `c` with zero latency is ready
/// at `c`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Latency(u64);

impl Latency {
    /// Creates a latency from a raw cycle count.
    pub fn new(val: u64) -> Self {
        Latency(val)
    }

    /// Returns the raw cycle count.
    pub fn val(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cycles", self.0)
    }
}

/// Maximum number of writes one channel accepts within a single cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bandwidth(u32);

impl Bandwidth {
    pub fn new(val: u32) -> Self {
        Bandwidth(val)
    }

    pub fn val(self) -> u32 {
        self.0
    }
}

/// Maximum number of distinct readers one channel may serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fanout(u32);

impl Fanout {
    pub fn new(val: u32) -> Self {
        Fanout(val)
    }

    pub fn val(self) -> u32 {
        self.0
    }
}
