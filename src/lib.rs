//! coflow: host-driven cooperative coroutine scheduler
//!
//! Emulates how a game engine drives coroutines: tasks are stacks of
//! resumable frames, each suspension carries a typed value describing what
//! the task waits for, and the host periodically drains queues (per frame,
//! per fixed-timestep tick) to resume the tasks whose wait has elapsed.
//!
//! # Example
//!
//! ```
//! use coflow::frame::{FrameStep, Suspend, WaitKind};
//! use coflow::queue::{TimeCursor, TimedQueue};
//! use coflow::scheduler::Scheduler;
//!
//! const DELAY: WaitKind = WaitKind::new(1);
//!
//! let cursor = TimeCursor::new();
//! let mut sched = Scheduler::new();
//! sched
//!     .register_queue(DELAY, Box::new(TimedQueue::new(cursor.clone())))
//!     .unwrap();
//!
//! let mut waited = false;
//! let handle = sched.start(Box::new(move || -> coflow::Result<FrameStep> {
//!     if !waited {
//!         waited = true;
//!         return Ok(FrameStep::Yield(Suspend::new(DELAY, 2)));
//!     }
//!     Ok(FrameStep::Done)
//! }));
//!
//! cursor.advance(2);
//! sched.drain_queue(DELAY);
//! assert!(handle.is_finished());
//! ```

#![doc(html_root_url = "https://docs.rs/coflow")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod frame;
pub mod queue;
pub mod scheduler;
pub mod task;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

pub use frame::{Frame, FrameStep, Suspend, Ticks, WaitKind};
pub use queue::{PassQueue, SuspendQueue, TimeCursor, TimedQueue};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerError, SchedulerStats};
pub use task::{Advance, Task, TaskHandle, TaskId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "coflow";
