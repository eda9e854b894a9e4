//! Pass-through suspension queue.

use std::collections::VecDeque;

use crate::frame::Suspend;
use crate::queue::SuspendQueue;
use crate::task::TaskRef;

/// One-shot barrier queue: everything scheduled before a drain becomes
/// eligible at that drain, in FIFO order.
///
/// The suspension value is ignored; the queue's identity alone conveys the
/// wait condition (for example "resume on the next generic tick").
#[derive(Debug, Default)]
pub struct PassQueue {
    held: VecDeque<TaskRef>,
}

impl PassQueue {
    /// Create an empty pass-through queue.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task directly, without a suspension value.
    #[inline]
    pub fn push(
        &mut self,
        task: TaskRef,
    ) {
        self.held.push_back(task);
    }
}

impl SuspendQueue for PassQueue {
    fn schedule(
        &mut self,
        task: TaskRef,
        _suspend: Suspend,
    ) {
        self.held.push_back(task);
    }

    fn drain(
        &mut self,
        out: &mut Vec<TaskRef>,
    ) {
        out.extend(self.held.drain(..));
    }

    #[inline]
    fn len(&self) -> usize {
        self.held.len()
    }
}
