//! Suspension queues.
//!
//! A queue accepts a task together with the suspension value it just
//! produced, and on demand drains the subset of held tasks now eligible to
//! resume into a caller-supplied list, in a well-defined order.

use std::cell::Cell;
use std::rc::Rc;

use crate::frame::{Suspend, Ticks};
use crate::task::TaskRef;

pub mod pass;
pub mod timed;

pub use pass::PassQueue;
pub use timed::TimedQueue;

#[cfg(test)]
mod tests;

/// Capability shared by all suspension queues.
pub trait SuspendQueue {
    /// Accept a task and the suspension value it yielded.
    fn schedule(
        &mut self,
        task: TaskRef,
        suspend: Suspend,
    );

    /// Move every currently-eligible task into `out`, preserving the
    /// queue's delivery order. Ineligible tasks stay queued.
    fn drain(
        &mut self,
        out: &mut Vec<TaskRef>,
    );

    /// Number of tasks currently held.
    fn len(&self) -> usize;

    /// Check if no tasks are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for dyn SuspendQueue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SuspendQueue").field("len", &self.len()).finish()
    }
}

/// Shared handle to the host-advanced time cursor.
///
/// The cursor is external, host-owned state: the host mutates it between
/// drains and timed queues only compare against it. Clones share the same
/// cursor cell.
#[derive(Debug, Clone, Default)]
pub struct TimeCursor {
    ticks: Rc<Cell<Ticks>>,
}

impl TimeCursor {
    /// Create a cursor at tick zero.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick value.
    #[inline]
    pub fn now(&self) -> Ticks {
        self.ticks.get()
    }

    /// Advance the cursor by `dt` ticks.
    #[inline]
    pub fn advance(
        &self,
        dt: Ticks,
    ) {
        self.ticks.set(self.ticks.get() + dt);
    }

    /// Set the cursor to an absolute tick value.
    #[inline]
    pub fn set(
        &self,
        ticks: Ticks,
    ) {
        self.ticks.set(ticks);
    }
}
