//! Direction-restricted port handles.
//!
//! `WritePort<T>` exposes only `write`; `ReadPort<T>` exposes only
//! `is_ready` and `read`. Neither gives access to the other direction or
//! to the underlying queues, which is what lets the topology registry
//! verify direction correctness and fanout counts without inspecting call
//! sites. Handles are created through
//! [`Topology::make_write_port`](super::topology::Topology::make_write_port)
//! and
//! [`Topology::make_read_port`](super::topology::Topology::make_read_port)
//! during simulation assembly.

use std::cell::RefCell;
use std::rc::Rc;

use super::port::PortCore;
use super::PortData;
use crate::common::{Cycle, PortError};

/// Producer-facing handle, bound to exactly one channel.
pub struct WritePort<T: PortData> {
    core: Rc<RefCell<PortCore<T>>>,
}

impl<T: PortData> WritePort<T> {
    pub(crate) fn new(core: Rc<RefCell<PortCore<T>>>) -> Self {
        Self { core }
    }

    /// Name of the channel this handle feeds.
    pub fn channel(&self) -> String {
        self.core.borrow().name().to_owned()
    }

    /// Writes `value` at `cycle`, broadcasting it to every bound reader.
    ///
    /// Fails on backdated cycles and on more than `bandwidth` writes within
    /// one cycle; both indicate a bug in the calling component.
    pub fn write(&self, value: T, cycle: Cycle) -> Result<(), PortError> {
        self.core.borrow_mut().write(value, cycle)
    }
}

/// Consumer-facing handle, one of up to `fanout` independent readers of a
/// channel.
pub struct ReadPort<T: PortData> {
    core: Rc<RefCell<PortCore<T>>>,
    reader: usize,
}

impl<T: PortData> ReadPort<T> {
    pub(crate) fn new(core: Rc<RefCell<PortCore<T>>>, reader: usize) -> Self {
        Self { core, reader }
    }

    /// Name of the channel this handle drains.
    pub fn channel(&self) -> String {
        self.core.borrow().name().to_owned()
    }

    /// True iff a value is visible to this reader at `cycle`.
    ///
    /// Side-effect free; a value stays visible at and after its ready cycle
    /// until consumed.
    pub fn is_ready(&self, cycle: Cycle) -> bool {
        self.core.borrow().is_ready(self.reader, cycle)
    }

    /// Consumes and returns the front value.
    ///
    /// Only valid immediately after [`ReadPort::is_ready`] returned true
    /// for the same cycle; otherwise returns
    /// [`PortError::ReadNotReady`] and never a default value.
    pub fn read(&self, cycle: Cycle) -> Result<T, PortError> {
        self.core.borrow_mut().read(self.reader, cycle)
    }
}
