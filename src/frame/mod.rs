//! Resumable frames and suspension values.
//!
//! A frame is one suspend/resume state machine: a step function plus the
//! local state it captures. Tasks compose frames into a stack, pushing a new
//! frame whenever a step delegates to a nested one.

use serde::{Deserialize, Serialize};


/// Simulated time unit used by timed queues.
///
/// The host decides what a tick means (a frame, a fixed physics step, a
/// millisecond); the core only compares tick counts.
pub type Ticks = u64;

/// Discriminant identifying a kind of suspension value.
///
/// Kinds are assigned by the host when it registers queues; routing uses
/// this tag alone, never open-ended runtime type inspection, so the
/// registry stays closed and inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaitKind(u16);

impl WaitKind {
    /// Create a wait kind from its raw tag.
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Get the raw tag.
    #[inline]
    pub const fn raw(&self) -> u16 {
        self.0
    }
}

impl From<u16> for WaitKind {
    fn from(val: u16) -> Self {
        Self(val)
    }
}

impl std::fmt::Display for WaitKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "WaitKind({})", self.0)
    }
}

/// Typed payload a frame produces when it suspends.
///
/// The kind selects the queue that will hold the task; the delay is the
/// queue-interpreted argument (a tick count for timed queues, ignored by
/// pass-through queues).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspend {
    kind: WaitKind,
    delay: Ticks,
}

impl Suspend {
    /// Create a suspension value.
    #[inline]
    pub const fn new(
        kind: WaitKind,
        delay: Ticks,
    ) -> Self {
        Self { kind, delay }
    }

    /// Create a suspension value with no argument.
    #[inline]
    pub const fn kind_only(kind: WaitKind) -> Self {
        Self { kind, delay: 0 }
    }

    /// The wait kind used for queue routing.
    #[inline]
    pub const fn kind(&self) -> WaitKind {
        self.kind
    }

    /// The queue-interpreted delay argument.
    #[inline]
    pub const fn delay(&self) -> Ticks {
        self.delay
    }
}

impl std::fmt::Display for Suspend {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "Suspend({}, delay={})", self.kind, self.delay)
    }
}

/// Outcome of a single frame step.
#[derive(Debug)]
pub enum FrameStep {
    /// The frame has no more steps; it is popped from its task.
    Done,
    /// Suspend with no value; the task resumes on the next generic drain.
    Pause,
    /// The frame cannot progress yet; the task is retried on the next
    /// generic drain.
    Blocked,
    /// Suspend with a typed wait value; the task is routed to the queue
    /// registered for the value's kind.
    Yield(Suspend),
    /// Delegate to a nested frame. The task pushes it and keeps stepping
    /// within the same advance, so the parent only resumes once the whole
    /// chain has yielded or completed.
    Nested(Box<dyn Frame>),
}

/// One resumable suspend/resume state machine.
///
/// A step may fail; the scheduler recovers by discarding the failing frame
/// only (see [`crate::scheduler::Scheduler`]).
pub trait Frame {
    /// Run the frame one step.
    fn step(&mut self) -> crate::Result<FrameStep>;
}

/// Any `FnMut` step closure is a frame; captured state is the frame's
/// local state.
impl<F> Frame for F
where
    F: FnMut() -> crate::Result<FrameStep>,
{
    #[inline]
    fn step(&mut self) -> crate::Result<FrameStep> {
        self()
    }
}

impl std::fmt::Debug for dyn Frame {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str("Frame")
    }
}
