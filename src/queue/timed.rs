//! Time-ordered suspension queue.

use std::collections::VecDeque;

use crate::frame::{Suspend, Ticks};
use crate::queue::{SuspendQueue, TimeCursor};
use crate::task::TaskRef;

/// Pending entry: a task plus the absolute tick at which it becomes
/// eligible.
#[derive(Debug)]
struct TimedEntry {
    task: TaskRef,
    deadline: Ticks,
}

/// Queue that holds tasks until a host-advanced time cursor reaches their
/// deadline.
///
/// Entries are kept in non-decreasing deadline order at all times: insertion
/// scans from the head for the first strictly later deadline, so entries
/// with equal deadlines resolve in insertion order. Insertion at the head is
/// O(1), general insertion O(n) in queue depth; acceptable because depth is
/// expected to stay small relative to tick frequency. Draining is O(k) in
/// the number of eligible entries.
#[derive(Debug, Default)]
pub struct TimedQueue {
    /// Sorted pending entries, earliest deadline first.
    entries: VecDeque<TimedEntry>,
    /// Host-owned cursor this queue compares against. Never advanced here.
    cursor: TimeCursor,
}

impl TimedQueue {
    /// Create a timed queue reading the given cursor.
    #[inline]
    pub fn new(cursor: TimeCursor) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor,
        }
    }

    /// The cursor this queue reads.
    #[inline]
    pub fn cursor(&self) -> &TimeCursor {
        &self.cursor
    }

    /// Deadline of the earliest pending entry, if any.
    #[inline]
    pub fn next_deadline(&self) -> Option<Ticks> {
        self.entries.front().map(|e| e.deadline)
    }
}

impl SuspendQueue for TimedQueue {
    fn schedule(
        &mut self,
        task: TaskRef,
        suspend: Suspend,
    ) {
        let deadline = self.cursor.now().saturating_add(suspend.delay());
        // First slot whose deadline is strictly later: equal deadlines keep
        // insertion order.
        let pos = self
            .entries
            .iter()
            .position(|e| e.deadline > deadline)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, TimedEntry { task, deadline });
    }

    fn drain(
        &mut self,
        out: &mut Vec<TaskRef>,
    ) {
        let now = self.cursor.now();
        while let Some(head) = self.entries.front() {
            if head.deadline > now {
                break;
            }
            // Sorted order makes this ascending-deadline delivery.
            if let Some(entry) = self.entries.pop_front() {
                out.push(entry.task);
            }
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}
