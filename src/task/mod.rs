//! Task execution engine.
//!
//! A task is a stack of nested frames executed depth-first: a sub-frame
//! fully completes before its parent advances. The whole stack lives on one
//! thread; sharing between the host handle and the queues uses `Rc`.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::frame::{Frame, FrameStep, Suspend};


/// Unique task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub usize);

impl TaskId {
    /// Get the inner value.
    #[inline]
    pub fn inner(&self) -> usize {
        self.0
    }
}

impl From<usize> for TaskId {
    fn from(val: usize) -> Self {
        Self(val)
    }
}

impl From<TaskId> for usize {
    fn from(val: TaskId) -> Self {
        val.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "Task({})", self.0)
    }
}

/// Iterator for generating task IDs.
#[derive(Debug, Default)]
pub struct TaskIdGenerator {
    next_id: usize,
}

impl TaskIdGenerator {
    /// Create a new task ID generator.
    #[inline]
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Generate the next task ID.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        TaskId(id)
    }
}

/// Result of advancing a task by one step.
#[derive(Debug)]
pub enum Advance {
    /// The frame stack is empty; the task is inert.
    Finished,
    /// The active frame suspended with no value.
    Pause,
    /// The active frame cannot progress yet.
    Blocked,
    /// The active frame suspended with a typed wait value.
    Yield(Suspend),
    /// The active frame's step failed and was discarded; remaining frames
    /// are untouched.
    Faulted(anyhow::Error),
}

/// Shared reference to a task.
///
/// Queues hold one of these per pending entry; the strong count is released
/// when the entry is dispatched or the task is found finished.
pub type TaskRef = Rc<RefCell<Task>>;

/// A resumable computation: a stack of frames, topmost active.
pub struct Task {
    /// Unique task ID.
    id: TaskId,
    /// Frame stack, most recently pushed last.
    frames: SmallVec<[Box<dyn Frame>; 4]>,
}

impl std::fmt::Debug for Task {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("depth", &self.frames.len())
            .finish()
    }
}

impl Task {
    /// Create a task with the given ID and initial frame.
    pub fn new(
        id: TaskId,
        initial: Box<dyn Frame>,
    ) -> Self {
        let mut frames = SmallVec::new();
        frames.push(initial);
        Self { id, frames }
    }

    /// Get the task ID.
    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Current frame stack depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// A task is finished iff its frame stack is empty. Finished tasks are
    /// inert; advancing them is a no-op.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.frames.is_empty()
    }

    /// Clear the entire frame stack unconditionally.
    ///
    /// No finalization hook runs: no frame observes another step. `Drop`
    /// impls of captured frame state still execute as the stack is cleared.
    pub fn stop(&mut self) {
        self.frames.clear();
    }

    /// Advance the active frame exactly one logical step.
    ///
    /// Nested delegation and frame completion are transparent: a chain of
    /// immediately-nested frames is unwound to the first real suspension or
    /// completion within this one call, and a parent resumes in the same
    /// call where its child ends.
    pub fn advance(&mut self) -> Advance {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Advance::Finished;
            };
            match frame.step() {
                Ok(FrameStep::Nested(nested)) => {
                    self.frames.push(nested);
                }
                Ok(FrameStep::Done) => {
                    self.frames.pop();
                    if self.frames.is_empty() {
                        return Advance::Finished;
                    }
                }
                Ok(FrameStep::Pause) => return Advance::Pause,
                Ok(FrameStep::Blocked) => return Advance::Blocked,
                Ok(FrameStep::Yield(value)) => return Advance::Yield(value),
                Err(err) => {
                    // Discard only the failing frame; the parent is not
                    // advanced in this call. The scheduler decides whether
                    // the task retries via the default queue.
                    self.frames.pop();
                    return Advance::Faulted(err);
                }
            }
        }
    }

    /// Wrap the task in a shared reference.
    #[inline]
    pub fn into_ref(self) -> TaskRef {
        Rc::new(RefCell::new(self))
    }
}

/// Host-owned handle for a started task.
///
/// The handle is the host's canonical grip on a task: it can stop it or
/// observe whether it has finished. Clones share the same task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    task: TaskRef,
}

impl TaskHandle {
    /// Create a handle from a shared task reference.
    #[inline]
    pub(crate) fn new(task: TaskRef) -> Self {
        Self { task }
    }

    /// Get the task ID.
    #[inline]
    pub fn id(&self) -> TaskId {
        self.task.borrow().id()
    }

    /// Check whether the task has finished.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.task.borrow().is_finished()
    }

    /// Stop the task immediately.
    ///
    /// The frame stack is cleared in place; pending queue entries are not
    /// searched for. A stopped task is dropped the next time a queue tries
    /// to dispatch it.
    pub fn stop(&self) {
        self.task.borrow_mut().stop();
    }
}
