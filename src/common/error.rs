//! Error types for the port fabric.
//!
//! Three families of failures exist, matching the three phases of a
//! simulation's life:
//!
//! * [`ConfigError`]: assembly-time mistakes (broken topology, unknown
//!   predictor policy, impossible tag-array geometry). Binaries convert
//!   these into a diagnostic plus a non-zero exit.
//! * [`PortError`]: run-time protocol violations by a calling component
//!   (reading an unready port, exceeding bandwidth, backdating a write).
//!   These indicate a bug in a pipeline unit, not an environmental
//!   condition, and callers are expected to treat them as fatal.
//! * [`DrainError`]: teardown-time report of values that were written
//!   but never consumed.
//!
//! No failure is ever absorbed silently; everything surfaces either as a
//! structured value or as a terminating diagnostic.

use std::error::Error;
use std::fmt;

use super::types::Cycle;

/// A single wiring fault found while validating the topology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyFault {
    /// Readers registered under a name that has no writer.
    MissingWriter { channel: String },
    /// A writer registered under a name that has no readers.
    NoReaders { channel: String },
    /// More than one writer registered under one name.
    DuplicateWriter { channel: String },
    /// More readers registered than the writer's fanout allows.
    FanoutExceeded {
        channel: String,
        readers: usize,
        fanout: u32,
    },
    /// Writer and reader registered the same name at different types.
    TypeMismatch {
        channel: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A writer registered with a zero bandwidth or fanout.
    ZeroCapacity { channel: String, parameter: &'static str },
}

impl fmt::Display for TopologyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyFault::MissingWriter { channel } => {
                write!(f, "channel '{channel}' has readers but no writer")
            }
            TopologyFault::NoReaders { channel } => {
                write!(f, "channel '{channel}' has a writer but no readers")
            }
            TopologyFault::DuplicateWriter { channel } => {
                write!(f, "channel '{channel}' has more than one writer")
            }
            TopologyFault::FanoutExceeded {
                channel,
                readers,
                fanout,
            } => write!(
                f,
                "channel '{channel}' has {readers} readers but fanout {fanout}"
            ),
            TopologyFault::TypeMismatch {
                channel,
                expected,
                found,
            } => write!(
                f,
                "channel '{channel}' was registered as {expected} and again as {found}"
            ),
            TopologyFault::ZeroCapacity { channel, parameter } => {
                write!(f, "channel '{channel}' has zero {parameter}")
            }
        }
    }
}

/// Assembly-time configuration failure.
///
/// Always names the offending identifier so the diagnostic is actionable
/// without a debugger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more wiring faults found by topology validation.
    Topology(Vec<TopologyFault>),
    /// Predictor policy name not in the supported set.
    UnknownPolicy {
        name: String,
        valid: &'static [&'static str],
    },
    /// Tag-array geometry parameter that cannot describe real hardware.
    BadGeometry {
        parameter: &'static str,
        value: u64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Topology(faults) => {
                write!(f, "topology validation failed:")?;
                for fault in faults {
                    write!(f, "\n  {fault}")?;
                }
                Ok(())
            }
            ConfigError::UnknownPolicy { name, valid } => {
                write!(f, "unknown branch prediction policy '{name}', supported policies:")?;
                for policy in *valid {
                    write!(f, "\n  {policy}")?;
                }
                Ok(())
            }
            ConfigError::BadGeometry { parameter, value } => {
                write!(f, "invalid tag array geometry: {parameter} = {value}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Run-time protocol violation by a component using the fabric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortError {
    /// Handle used before the topology was connected.
    NotConnected { channel: String },
    /// Write at a cycle earlier than a previously accepted write.
    BackdatedWrite {
        channel: String,
        cycle: Cycle,
        last: Cycle,
    },
    /// More writes in one cycle than the channel's bandwidth.
    BandwidthExceeded {
        channel: String,
        cycle: Cycle,
        bandwidth: u32,
    },
    /// Read without a same-cycle readiness check that returned true.
    ReadNotReady {
        channel: String,
        reader: usize,
        cycle: Cycle,
    },
}

impl PortError {
    /// Name of the channel the violation occurred on.
    pub fn channel(&self) -> &str {
        match self {
            PortError::NotConnected { channel }
            | PortError::BackdatedWrite { channel, .. }
            | PortError::BandwidthExceeded { channel, .. }
            | PortError::ReadNotReady { channel, .. } => channel,
        }
    }
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortError::NotConnected { channel } => {
                write!(f, "channel '{channel}' used before the topology was connected")
            }
            PortError::BackdatedWrite {
                channel,
                cycle,
                last,
            } => write!(
                f,
                "backdated write on channel '{channel}' at {cycle} (last write at {last})"
            ),
            PortError::BandwidthExceeded {
                channel,
                cycle,
                bandwidth,
            } => write!(
                f,
                "channel '{channel}' exceeded bandwidth {bandwidth} at {cycle}"
            ),
            PortError::ReadNotReady {
                channel,
                reader,
                cycle,
            } => write!(
                f,
                "read of unready channel '{channel}' (reader {reader}) at {cycle}"
            ),
        }
    }
}

impl Error for PortError {}

/// One reader queue found non-empty at teardown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrainLeak {
    /// Channel name.
    pub channel: String,
    /// Index of the reader whose queue still holds items.
    pub reader: usize,
    /// Number of undrained items.
    pub items: usize,
}

impl fmt::Display for DrainLeak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel '{}' reader {} still holds {} item(s)",
            self.channel, self.reader, self.items
        )
    }
}

/// Teardown-time report of values written but never consumed.
///
/// Undrained items indicate lost data somewhere in the surrounding
/// simulation; whether that is fatal is the caller's policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrainError {
    /// Every non-empty reader queue found at teardown.
    pub leaks: Vec<DrainLeak>,
}

impl fmt::Display for DrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "undrained port data at teardown:")?;
        for leak in &self.leaks {
            write!(f, "\n  {leak}")?;
        }
        Ok(())
    }
}

impl Error for DrainError {}
