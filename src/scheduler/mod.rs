//! Central scheduler: registry, default queue and dispatch loop.
//!
//! The scheduler is the single choke-point where a task's suspension value
//! is translated into "which queue holds it next". The host drives it by
//! draining queues at whatever cadence matches its own timing model;
//! correctness depends only on eventual calls, not their frequency.

use std::mem;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::frame::{Frame, WaitKind};
use crate::queue::{PassQueue, SuspendQueue};
use crate::task::{Advance, Task, TaskHandle, TaskIdGenerator, TaskRef};


/// Scheduler setup errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Two queues were registered for the same wait kind. This is a
    /// programmer error and fails fast at setup time.
    #[error("a queue is already registered for {0}")]
    DuplicateQueue(WaitKind),
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Initial capacity of the reusable dispatch scratch list.
    pub scratch_capacity: usize,
    /// Emit a trace event per drain with the number of dispatched tasks.
    pub trace_dispatch: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scratch_capacity: 32,
            trace_dispatch: false,
        }
    }
}

/// Scheduler statistics.
///
/// Plain counters; the scheduler is single-threaded, so every mutation
/// happens behind `&mut self`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SchedulerStats {
    /// Tasks created via `start`/`start_deferred`.
    pub tasks_started: usize,
    /// Tasks observed finished and dropped.
    pub tasks_finished: usize,
    /// Advance calls issued by dispatch.
    pub tasks_dispatched: usize,
    /// Frame steps that failed and were discarded.
    pub frame_faults: usize,
    /// Yields whose kind had no registered queue.
    pub routing_misses: usize,
    /// Stale finished tasks dropped before being advanced.
    pub stale_dropped: usize,
}

impl SchedulerStats {
    /// Record a started task.
    #[inline]
    fn record_started(&mut self) {
        self.tasks_started += 1;
    }

    /// Record a finished task.
    #[inline]
    fn record_finished(&mut self) {
        self.tasks_finished += 1;
    }

    /// Record one dispatched advance.
    #[inline]
    fn record_dispatched(&mut self) {
        self.tasks_dispatched += 1;
    }
}

/// Cooperative task scheduler.
///
/// Owns the kind-keyed queue registry plus one explicitly constructed
/// default queue for suspensions that carry no value ("resume on the next
/// generic tick"). There is no hidden global state: every queue, including
/// the default one, is a named instance inside this struct.
#[derive(Debug)]
pub struct Scheduler {
    /// Configuration.
    config: SchedulerConfig,
    /// Wait kind → queue. Populated at setup, read-only in steady state.
    registry: IndexMap<WaitKind, Box<dyn SuspendQueue>>,
    /// Queue for value-less suspensions and blocked retries.
    default_queue: PassQueue,
    /// Reusable drain-and-dispatch scratch list.
    scratch: Vec<TaskRef>,
    /// Task ID generator.
    ids: TaskIdGenerator,
    /// Statistics.
    stats: SchedulerStats,
}

impl Scheduler {
    /// Create a scheduler with default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler with custom configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        let scratch = Vec::with_capacity(config.scratch_capacity);
        Self {
            config,
            registry: IndexMap::new(),
            default_queue: PassQueue::new(),
            scratch,
            ids: TaskIdGenerator::new(),
            stats: SchedulerStats::default(),
        }
    }

    /// Bind a queue to a suspension kind.
    ///
    /// Registration normally happens once at setup, before any task that
    /// yields the kind is started; late registration is legal and simply
    /// extends the routing table. Binding an already-bound kind fails.
    pub fn register_queue(
        &mut self,
        kind: WaitKind,
        queue: Box<dyn SuspendQueue>,
    ) -> Result<(), SchedulerError> {
        match self.registry.entry(kind) {
            Entry::Occupied(_) => Err(SchedulerError::DuplicateQueue(kind)),
            Entry::Vacant(slot) => {
                slot.insert(queue);
                Ok(())
            }
        }
    }

    /// Check whether a queue is bound to `kind`.
    #[inline]
    pub fn is_registered(
        &self,
        kind: WaitKind,
    ) -> bool {
        self.registry.contains_key(&kind)
    }

    /// Registered kinds, in registration order.
    pub fn registered_kinds(&self) -> impl Iterator<Item = WaitKind> + '_ {
        self.registry.keys().copied()
    }

    /// Number of tasks pending in the queue bound to `kind`.
    #[inline]
    pub fn pending(
        &self,
        kind: WaitKind,
    ) -> Option<usize> {
        self.registry.get(&kind).map(|q| q.len())
    }

    /// Number of tasks pending in the default queue.
    #[inline]
    pub fn pending_default(&self) -> usize {
        self.default_queue.len()
    }

    /// Get statistics.
    #[inline]
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Get the configuration.
    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Create a task from `frame` and advance it once inline.
    ///
    /// A task that finishes or suspends on its very first step is resolved
    /// synchronously, before this returns.
    pub fn start(
        &mut self,
        frame: Box<dyn Frame>,
    ) -> TaskHandle {
        let task = Task::new(self.ids.next(), frame).into_ref();
        let handle = TaskHandle::new(task.clone());
        self.stats.record_started();
        debug!("started {}", handle.id());
        let outcome = task.borrow_mut().advance();
        self.route(task, outcome);
        handle
    }

    /// Create a task from `frame` without advancing it.
    ///
    /// The task is placed on the default queue and picked up by the next
    /// generic drain.
    pub fn start_deferred(
        &mut self,
        frame: Box<dyn Frame>,
    ) -> TaskHandle {
        let task = Task::new(self.ids.next(), frame).into_ref();
        let handle = TaskHandle::new(task.clone());
        self.stats.record_started();
        debug!("started {} (deferred)", handle.id());
        self.default_queue.push(task);
        handle
    }

    /// Drain the default queue and dispatch every resumed task (the
    /// "every generic tick" path).
    pub fn drain_default(&mut self) {
        let mut scratch = mem::take(&mut self.scratch);
        self.default_queue.drain(&mut scratch);
        self.dispatch(&mut scratch);
        self.scratch = scratch;
    }

    /// Drain the queue bound to `kind` and dispatch every resumed task.
    ///
    /// A no-op if no queue is bound.
    pub fn drain_queue(
        &mut self,
        kind: WaitKind,
    ) {
        let mut scratch = mem::take(&mut self.scratch);
        match self.registry.get_mut(&kind) {
            Some(queue) => queue.drain(&mut scratch),
            None => trace!("no queue bound to {kind}; drain is a no-op"),
        }
        self.dispatch(&mut scratch);
        self.scratch = scratch;
    }

    /// Advance and re-route each drained task.
    ///
    /// The source queue has already released these entries, so a task that
    /// immediately re-enters the very queue that was drained (with a later
    /// deadline) cannot be seen again by this pass.
    fn dispatch(
        &mut self,
        scratch: &mut Vec<TaskRef>,
    ) {
        if self.config.trace_dispatch && !scratch.is_empty() {
            trace!("dispatching {} tasks", scratch.len());
        }
        for task in scratch.drain(..) {
            // Stale entries: stopped or already-finished tasks are dropped
            // here, never advanced again.
            if task.borrow().is_finished() {
                self.stats.stale_dropped += 1;
                self.stats.record_finished();
                continue;
            }
            let outcome = task.borrow_mut().advance();
            self.stats.record_dispatched();
            self.route(task, outcome);
        }
    }

    /// Translate an advance outcome into the task's next queue.
    fn route(
        &mut self,
        task: TaskRef,
        outcome: Advance,
    ) {
        match outcome {
            Advance::Finished => {
                debug!("{} finished", task.borrow().id());
                self.stats.record_finished();
            }
            // Value-less suspension: resume on the next generic drain.
            Advance::Pause => self.default_queue.push(task),
            // Busy-wait: retried by the host's next generic drain.
            Advance::Blocked => self.default_queue.push(task),
            Advance::Yield(suspend) => match self.registry.get_mut(&suspend.kind()) {
                Some(queue) => queue.schedule(task, suspend),
                None => {
                    // Configuration defect, not a runtime fault: the task
                    // becomes permanently unscheduled.
                    warn!(
                        "{} yielded {} with no registered queue; task stranded",
                        task.borrow().id(),
                        suspend.kind()
                    );
                    self.stats.routing_misses += 1;
                }
            },
            Advance::Faulted(err) => {
                warn!("{} frame step failed: {err:#}", task.borrow().id());
                self.stats.frame_faults += 1;
                if task.borrow().is_finished() {
                    self.stats.record_finished();
                } else {
                    // Remaining frames retry via the next generic drain.
                    self.default_queue.push(task);
                }
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
