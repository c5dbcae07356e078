//! Topology registry.
//!
//! The registry owns the mapping from channel name to port core. It is an
//! explicitly constructed object handed to assembly code, never a hidden
//! global, so independent simulations can coexist and be tested in
//! isolation.
//!
//! Lifecycle: handles register themselves at construction (before cycle
//! 0), [`Topology::connect_all`] validates the wiring exactly once, the
//! run uses the handles every cycle, and [`Topology::destroy`] verifies
//! that every reader queue was drained.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::handles::{ReadPort, WritePort};
use super::port::PortCore;
use super::PortData;
use crate::common::error::{DrainLeak, TopologyFault};
use crate::common::{Bandwidth, ConfigError, Cycle, DrainError, Fanout, Latency};

/// Default for [`Topology::set_starvation_bound`]: readers are flagged by
/// [`Topology::check`] once their front item has sat ready and unconsumed
/// for this many cycles.
const STARVATION_BOUND: u64 = 64;

/// Type-erased operations the registry needs from every channel.
trait ChannelOps {
    fn collect_faults(&self, out: &mut Vec<TopologyFault>);
    fn collect_leaks(&self, out: &mut Vec<DrainLeak>);
    fn starved_readers(&self, cycle: Cycle, bound: Latency) -> Vec<usize>;
    fn mark_connected(&self);
}

impl<T: PortData> ChannelOps for RefCell<PortCore<T>> {
    fn collect_faults(&self, out: &mut Vec<TopologyFault>) {
        self.borrow().collect_faults(out);
    }

    fn collect_leaks(&self, out: &mut Vec<DrainLeak>) {
        self.borrow().collect_leaks(out);
    }

    fn starved_readers(&self, cycle: Cycle, bound: Latency) -> Vec<usize> {
        self.borrow().starved_readers(cycle, bound)
    }

    fn mark_connected(&self) {
        self.borrow_mut().mark_connected();
    }
}

/// One registered channel: the typed core plus enough metadata to validate
/// it without knowing `T`.
struct Channel {
    type_id: TypeId,
    type_name: &'static str,
    core: Rc<dyn Any>,
    ops: Rc<dyn ChannelOps>,
    /// Type names of registrations that reused this name at a different
    /// type; non-empty means `connect_all` must fail.
    mismatches: Vec<&'static str>,
}

/// Directory of every channel in one simulation instance.
pub struct Topology {
    channels: BTreeMap<String, Channel>,
    connected: bool,
    starvation_bound: Latency,
}

impl Topology {
    /// Creates an empty registry for one simulation instance.
    pub fn new() -> Self {
        Self {
            channels: BTreeMap::new(),
            connected: false,
            starvation_bound: Latency::new(STARVATION_BOUND),
        }
    }

    /// Overrides the number of cycles a ready item may sit unconsumed
    /// before [`Topology::check`] flags its reader as starved.
    pub fn set_starvation_bound(&mut self, bound: Latency) {
        self.starvation_bound = bound;
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Creates the writer handle for `name`.
    ///
    /// The first writer registration fixes the channel's bandwidth and
    /// fanout contract; a second writer under the same name is a topology
    /// fault reported by [`Topology::connect_all`].
    pub fn make_write_port<T: PortData>(
        &mut self,
        name: &str,
        bandwidth: Bandwidth,
        fanout: Fanout,
    ) -> WritePort<T> {
        let core = self.core_for::<T>(name);
        core.borrow_mut().register_writer(bandwidth, fanout);
        WritePort::new(core)
    }

    /// Creates one reader handle for `name` with its own latency.
    ///
    /// Every reader owns an independent queue; readers under one writer
    /// drain the same writes at their own pace.
    pub fn make_read_port<T: PortData>(&mut self, name: &str, latency: Latency) -> ReadPort<T> {
        let core = self.core_for::<T>(name);
        let reader = core.borrow_mut().register_reader(latency);
        ReadPort::new(core, reader)
    }

    /// Fetches or creates the core registered under `name`.
    ///
    /// A name reused at a different type gets a fresh detached core so the
    /// returned handle is still well-formed; the mismatch is recorded and
    /// fails validation. Registration on an already connected topology is
    /// likewise refused with a detached core, since the fanout and type
    /// checks have already run; every use of such a handle then errors.
    fn core_for<T: PortData>(&mut self, name: &str) -> Rc<RefCell<PortCore<T>>> {
        if self.connected {
            log::error!("[{name}] handle registered after the topology was connected");
            return Rc::new(RefCell::new(PortCore::new(name)));
        }
        if let Some(channel) = self.channels.get_mut(name) {
            if channel.type_id == TypeId::of::<T>() {
                let erased: Rc<dyn Any> = channel.core.clone();
                if let Ok(core) = erased.downcast::<RefCell<PortCore<T>>>() {
                    return core;
                }
            }
            channel.mismatches.push(type_name::<T>());
            return Rc::new(RefCell::new(PortCore::new(name)));
        }

        let core = Rc::new(RefCell::new(PortCore::<T>::new(name)));
        self.channels.insert(
            name.to_owned(),
            Channel {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                core: core.clone(),
                ops: core.clone(),
                mismatches: Vec::new(),
            },
        );
        core
    }

    /// Validates and wires the whole topology. Called exactly once, after
    /// every handle has been constructed and before cycle 0.
    ///
    /// Fails if any channel has a missing partner, a duplicate writer, a
    /// type mismatch, a zero capacity, or more readers than its fanout.
    /// The error lists every offending channel by name.
    pub fn connect_all(&mut self) -> Result<(), ConfigError> {
        let mut faults = Vec::new();
        for (name, channel) in &self.channels {
            channel.ops.collect_faults(&mut faults);
            for found in &channel.mismatches {
                faults.push(TopologyFault::TypeMismatch {
                    channel: name.clone(),
                    expected: channel.type_name,
                    found,
                });
            }
        }
        if !faults.is_empty() {
            return Err(ConfigError::Topology(faults));
        }

        for channel in self.channels.values() {
            channel.ops.mark_connected();
        }
        self.connected = true;
        log::info!("topology connected: {} channel(s)", self.channels.len());
        Ok(())
    }

    /// Per-cycle diagnostic scan, primarily for test harnesses.
    ///
    /// Warns about every reader whose front item has been ready and
    /// unconsumed for at least the starvation bound (64 cycles unless
    /// overridden) and returns how many such readers exist. Not required
    /// for correctness.
    pub fn check(&self, cycle: Cycle) -> usize {
        let bound = self.starvation_bound;
        let mut starved = 0;
        for (name, channel) in &self.channels {
            for reader in channel.ops.starved_readers(cycle, bound) {
                log::warn!("[{name}] reader {reader} starved at {cycle}");
                starved += 1;
            }
        }
        starved
    }

    /// Tears the registry down, verifying that every reader queue is
    /// empty.
    ///
    /// Undrained items mean the surrounding simulation lost data; the
    /// report lists every offender, and whether that is fatal is the
    /// caller's policy. All registrations are released either way.
    pub fn destroy(&mut self) -> Result<(), DrainError> {
        let mut leaks = Vec::new();
        for channel in self.channels.values() {
            channel.ops.collect_leaks(&mut leaks);
        }
        self.channels.clear();
        self.connected = false;
        if leaks.is_empty() {
            Ok(())
        } else {
            Err(DrainError { leaks })
        }
    }

    /// Whether [`Topology::connect_all`] has completed successfully.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}
