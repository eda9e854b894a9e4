//! 调度器端到端场景测试
//!
//! 按宿主的视角驱动完整的挂起/恢复周期

use std::cell::RefCell;
use std::rc::Rc;

use coflow::frame::{FrameStep, Suspend, WaitKind};
use coflow::queue::{TimeCursor, TimedQueue};
use coflow::scheduler::Scheduler;

const DELAY: WaitKind = WaitKind::new(1);

fn delay_scheduler() -> (TimeCursor, Scheduler) {
    let cursor = TimeCursor::new();
    let mut sched = Scheduler::new();
    sched
        .register_queue(DELAY, Box::new(TimedQueue::new(cursor.clone())))
        .unwrap();
    (cursor, sched)
}

/// The walkthrough scenario: yield delay=2, then yield nothing, then finish.
#[test]
fn test_delay_then_default_then_finish() {
    let (cursor, mut sched) = delay_scheduler();

    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let events = log.clone();
    let mut stage = 0;
    let handle = sched.start(Box::new(move || -> coflow::Result<FrameStep> {
        stage += 1;
        match stage {
            1 => {
                events.borrow_mut().push("wait 2");
                Ok(FrameStep::Yield(Suspend::new(DELAY, 2)))
            }
            2 => {
                events.borrow_mut().push("pause");
                Ok(FrameStep::Pause)
            }
            _ => {
                events.borrow_mut().push("done");
                Ok(FrameStep::Done)
            }
        }
    }));

    // Parked in the delay queue until the cursor reaches 2.
    assert_eq!(sched.pending(DELAY), Some(1));
    assert_eq!(sched.pending_default(), 0);

    cursor.advance(2);
    sched.drain_queue(DELAY);

    // Resumed, yielded nothing, moved to the default queue.
    assert!(!handle.is_finished());
    assert_eq!(sched.pending(DELAY), Some(0));
    assert_eq!(sched.pending_default(), 1);

    sched.drain_default();
    assert!(handle.is_finished());
    assert_eq!(log.borrow().as_slice(), &["wait 2", "pause", "done"]);

    // Everything drained; further drains of either queue are no-ops.
    sched.drain_queue(DELAY);
    sched.drain_default();
    assert_eq!(sched.pending(DELAY), Some(0));
    assert_eq!(sched.pending_default(), 0);
}

/// Deadlines decide resumption order regardless of start order.
#[test]
fn test_tasks_resume_in_deadline_order() {
    let (cursor, mut sched) = delay_scheduler();

    let order: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    for delay in [3u64, 1, 2] {
        let order = order.clone();
        let mut waited = false;
        sched.start(Box::new(move || -> coflow::Result<FrameStep> {
            if !waited {
                waited = true;
                return Ok(FrameStep::Yield(Suspend::new(DELAY, delay)));
            }
            order.borrow_mut().push(delay);
            Ok(FrameStep::Done)
        }));
    }

    cursor.advance(3);
    sched.drain_queue(DELAY);
    assert_eq!(order.borrow().as_slice(), &[1, 2, 3]);
}

/// A timed task that keeps re-arming itself only runs once per due drain,
/// even when it re-enters the queue being drained.
#[test]
fn test_rearming_task_is_not_double_dispatched() {
    let (cursor, mut sched) = delay_scheduler();

    let runs = Rc::new(RefCell::new(0u32));
    let seen = runs.clone();
    sched.start(Box::new(move || -> coflow::Result<FrameStep> {
        *seen.borrow_mut() += 1;
        Ok(FrameStep::Yield(Suspend::new(DELAY, 1)))
    }));
    assert_eq!(*runs.borrow(), 1);

    cursor.advance(1);
    sched.drain_queue(DELAY);
    // Exactly one more run: the re-armed entry has a future deadline and
    // must not be mistaken for eligible by the same pass.
    assert_eq!(*runs.borrow(), 2);
    assert_eq!(sched.pending(DELAY), Some(1));
}

/// The failing-frame scenario: after the failing pass the task has one
/// fewer frame and shows up in the default queue for the next cycle.
#[test]
fn test_fault_recovery_cycle() {
    let (_cursor, mut sched) = delay_scheduler();

    let mut delegated = false;
    let handle = sched.start_deferred(Box::new(move || -> coflow::Result<FrameStep> {
        if !delegated {
            delegated = true;
            return Ok(FrameStep::Nested(Box::new(
                || -> coflow::Result<FrameStep> { Err(anyhow::anyhow!("physics exploded")) },
            )));
        }
        Ok(FrameStep::Done)
    }));

    sched.drain_default();
    assert_eq!(sched.stats().frame_faults, 1);
    assert!(!handle.is_finished());
    assert_eq!(sched.pending_default(), 1);

    sched.drain_default();
    assert!(handle.is_finished());
}

/// Stopping via the host handle makes any later dispatch a safe no-op.
#[test]
fn test_stop_pending_task() {
    let (cursor, mut sched) = delay_scheduler();

    let mut waited = false;
    let handle = sched.start(Box::new(move || -> coflow::Result<FrameStep> {
        if !waited {
            waited = true;
            return Ok(FrameStep::Yield(Suspend::new(DELAY, 5)));
        }
        Ok(FrameStep::Pause)
    }));
    assert_eq!(sched.pending(DELAY), Some(1));

    handle.stop();
    assert!(handle.is_finished());

    cursor.advance(5);
    sched.drain_queue(DELAY);
    assert_eq!(sched.pending(DELAY), Some(0));
    assert_eq!(sched.pending_default(), 0);
    assert_eq!(sched.stats().stale_dropped, 1);
}
