//! Port core engine.
//!
//! One `PortCore` is the state behind one named channel: the writer's
//! bandwidth/fanout contract plus one delay queue per bound reader.
//! Broadcast uses independent pacing: every accepted write lands in every
//! reader's queue, and each reader drains its own copy at its own rate
//! without affecting the others.
//!
//! Cores are never handed to components directly; they are reachable only
//! through the direction-restricted handles in [`super::handles`] and the
//! registry in [`super::topology`].

use std::collections::VecDeque;

use crate::common::error::{DrainLeak, TopologyFault};
use crate::common::{Bandwidth, Cycle, Fanout, Latency, PortError};

/// A written value waiting to become visible to one reader.
#[derive(Clone, Debug)]
struct PendingItem<T> {
    value: T,
    /// First cycle at which the value may be read.
    ready_cycle: Cycle,
}

/// One reader's view of the channel: its latency and its private queue.
#[derive(Debug)]
struct ReaderLane<T> {
    latency: Latency,
    queue: VecDeque<PendingItem<T>>,
}

/// State of one named channel.
///
/// Field updates obey a strict ownership discipline: the writer side only
/// appends (via [`PortCore::write`]), a given reader only pops the head of
/// its own lane (via [`PortCore::read`]), and nothing else touches the
/// queues.
#[derive(Debug)]
pub(crate) struct PortCore<T> {
    name: String,
    /// Writer contract; populated when the writer registers.
    bandwidth: Option<Bandwidth>,
    fanout: Option<Fanout>,
    /// Number of writer registrations seen (more than one is a fault).
    writers: u32,
    lanes: Vec<ReaderLane<T>>,
    /// Set by the registry once validation has passed.
    connected: bool,
    last_write: Option<Cycle>,
    writes_this_cycle: u32,
}

impl<T: Clone> PortCore<T> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            bandwidth: None,
            fanout: None,
            writers: 0,
            lanes: Vec::new(),
            connected: false,
            last_write: None,
            writes_this_cycle: 0,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Records a writer registration. Called once per `WritePort`
    /// construction; the first registration fixes the channel's contract.
    pub(crate) fn register_writer(&mut self, bandwidth: Bandwidth, fanout: Fanout) {
        self.writers += 1;
        if self.writers == 1 {
            self.bandwidth = Some(bandwidth);
            self.fanout = Some(fanout);
        }
    }

    /// Records a reader registration and returns the new reader's index.
    pub(crate) fn register_reader(&mut self, latency: Latency) -> usize {
        self.lanes.push(ReaderLane {
            latency,
            queue: VecDeque::new(),
        });
        self.lanes.len() - 1
    }

    pub(crate) fn mark_connected(&mut self) {
        self.connected = true;
    }

    /// Appends wiring faults for this channel to `out`.
    pub(crate) fn collect_faults(&self, out: &mut Vec<TopologyFault>) {
        let channel = self.name.clone();

        if self.writers == 0 {
            out.push(TopologyFault::MissingWriter { channel });
            return;
        }
        if self.writers > 1 {
            out.push(TopologyFault::DuplicateWriter {
                channel: channel.clone(),
            });
        }
        if self.lanes.is_empty() {
            out.push(TopologyFault::NoReaders {
                channel: channel.clone(),
            });
        }

        // Contract values come from the first writer registration.
        let bandwidth = self.bandwidth.map_or(0, Bandwidth::val);
        let fanout = self.fanout.map_or(0, Fanout::val);
        if bandwidth == 0 {
            out.push(TopologyFault::ZeroCapacity {
                channel: channel.clone(),
                parameter: "bandwidth",
            });
        }
        if fanout == 0 {
            out.push(TopologyFault::ZeroCapacity {
                channel: channel.clone(),
                parameter: "fanout",
            });
        }
        if fanout > 0 && self.lanes.len() > fanout as usize {
            out.push(TopologyFault::FanoutExceeded {
                channel,
                readers: self.lanes.len(),
                fanout,
            });
        }
    }

    /// Accepts a value at `cycle` and broadcasts it to every reader lane.
    ///
    /// Rejects writes before the topology is connected, writes that go
    /// backwards in time, and writes beyond the per-cycle bandwidth.
    pub(crate) fn write(&mut self, value: T, cycle: Cycle) -> Result<(), PortError> {
        if !self.connected {
            return Err(PortError::NotConnected {
                channel: self.name.clone(),
            });
        }
        let Some(bandwidth) = self.bandwidth else {
            return Err(PortError::NotConnected {
                channel: self.name.clone(),
            });
        };

        match self.last_write {
            Some(last) if cycle < last => {
                return Err(PortError::BackdatedWrite {
                    channel: self.name.clone(),
                    cycle,
                    last,
                });
            }
            Some(last) if cycle == last => {
                if self.writes_this_cycle >= bandwidth.val() {
                    return Err(PortError::BandwidthExceeded {
                        channel: self.name.clone(),
                        cycle,
                        bandwidth: bandwidth.val(),
                    });
                }
                self.writes_this_cycle += 1;
            }
            _ => {
                self.last_write = Some(cycle);
                self.writes_this_cycle = 1;
            }
        }

        for lane in &mut self.lanes {
            lane.queue.push_back(PendingItem {
                value: value.clone(),
                ready_cycle: cycle + lane.latency,
            });
        }
        log::trace!("[{}] write accepted at {}", self.name, cycle);
        Ok(())
    }

    /// True iff `reader`'s front item exists and has reached its ready
    /// cycle. Pure: never mutates any queue.
    pub(crate) fn is_ready(&self, reader: usize, cycle: Cycle) -> bool {
        self.lanes[reader]
            .queue
            .front()
            .is_some_and(|item| item.ready_cycle <= cycle)
    }

    /// Pops and returns `reader`'s front value.
    ///
    /// Only valid when [`PortCore::is_ready`] holds for the same reader and
    /// cycle; anything else is a protocol violation, never a default value.
    pub(crate) fn read(&mut self, reader: usize, cycle: Cycle) -> Result<T, PortError> {
        if !self.is_ready(reader, cycle) {
            return Err(PortError::ReadNotReady {
                channel: self.name.clone(),
                reader,
                cycle,
            });
        }
        log::trace!("[{}] reader {} consumed at {}", self.name, reader, cycle);
        // is_ready above guarantees the front item exists.
        Ok(self.lanes[reader].queue.pop_front().unwrap().value)
    }

    /// Appends a leak record for every non-empty reader queue.
    pub(crate) fn collect_leaks(&self, out: &mut Vec<DrainLeak>) {
        for (reader, lane) in self.lanes.iter().enumerate() {
            if !lane.queue.is_empty() {
                out.push(DrainLeak {
                    channel: self.name.clone(),
                    reader,
                    items: lane.queue.len(),
                });
            }
        }
    }

    /// Returns the readers whose front item has been ready, unconsumed,
    /// for more than `bound` cycles.
    pub(crate) fn starved_readers(&self, cycle: Cycle, bound: Latency) -> Vec<usize> {
        self.lanes
            .iter()
            .enumerate()
            .filter(|(_, lane)| {
                lane.queue
                    .front()
                    .is_some_and(|item| item.ready_cycle + bound <= cycle)
            })
            .map(|(reader, _)| reader)
            .collect()
    }
}
