//! 模拟游戏主循环的综合测试
//!
//! 多队列、多任务的帧循环收敛性

use coflow::frame::{FrameStep, Suspend, WaitKind};
use coflow::queue::{PassQueue, TimeCursor, TimedQueue};
use coflow::scheduler::{Scheduler, SchedulerConfig};
use coflow::task::TaskHandle;

const DELAY: WaitKind = WaitKind::new(1);
const FIXED_STEP: WaitKind = WaitKind::new(2);

/// A task that alternates timed waits, fixed-step waits, generic pauses and
/// one nested delegation before finishing.
fn spawn_actor(
    sched: &mut Scheduler,
    delay: u64,
) -> TaskHandle {
    let mut stage = 0;
    sched.start(Box::new(move || -> coflow::Result<FrameStep> {
        stage += 1;
        match stage {
            1 => Ok(FrameStep::Yield(Suspend::new(DELAY, delay))),
            2 => Ok(FrameStep::Yield(Suspend::kind_only(FIXED_STEP))),
            3 => Ok(FrameStep::Pause),
            4 => {
                let mut left = 2u32;
                Ok(FrameStep::Nested(Box::new(
                    move || -> coflow::Result<FrameStep> {
                        if left == 0 {
                            return Ok(FrameStep::Done);
                        }
                        left -= 1;
                        Ok(FrameStep::Pause)
                    },
                )))
            }
            _ => Ok(FrameStep::Done),
        }
    }))
}

#[test]
fn test_frame_loop_converges() {
    let cursor = TimeCursor::new();
    let mut sched = Scheduler::with_config(SchedulerConfig {
        scratch_capacity: 64,
        trace_dispatch: false,
    });
    sched
        .register_queue(DELAY, Box::new(TimedQueue::new(cursor.clone())))
        .unwrap();
    sched
        .register_queue(FIXED_STEP, Box::new(PassQueue::new()))
        .unwrap();

    let handles: Vec<TaskHandle> =
        (0u64..50).map(|i| spawn_actor(&mut sched, i % 7 + 1)).collect();

    // Host loop: one tick per frame, fixed step every third frame.
    for frame in 0u64..64 {
        cursor.advance(1);
        sched.drain_queue(DELAY);
        if frame % 3 == 0 {
            sched.drain_queue(FIXED_STEP);
        }
        sched.drain_default();
    }

    assert!(handles.iter().all(TaskHandle::is_finished));
    assert_eq!(sched.pending(DELAY), Some(0));
    assert_eq!(sched.pending(FIXED_STEP), Some(0));
    assert_eq!(sched.pending_default(), 0);

    let stats = sched.stats();
    assert_eq!(stats.tasks_started, 50);
    assert_eq!(stats.tasks_finished, 50);
    assert_eq!(stats.frame_faults, 0);
    assert_eq!(stats.routing_misses, 0);
}

#[test]
fn test_stopped_actors_do_not_hold_up_the_loop() {
    let cursor = TimeCursor::new();
    let mut sched = Scheduler::new();
    sched
        .register_queue(DELAY, Box::new(TimedQueue::new(cursor.clone())))
        .unwrap();
    sched
        .register_queue(FIXED_STEP, Box::new(PassQueue::new()))
        .unwrap();

    let handles: Vec<TaskHandle> = (0u64..10).map(|i| spawn_actor(&mut sched, i + 1)).collect();

    // Stop half the actors while they are parked in queues.
    for handle in handles.iter().step_by(2) {
        handle.stop();
    }

    for frame in 0u64..32 {
        cursor.advance(1);
        sched.drain_queue(DELAY);
        if frame % 2 == 0 {
            sched.drain_queue(FIXED_STEP);
        }
        sched.drain_default();
    }

    assert!(handles.iter().all(TaskHandle::is_finished));
    assert_eq!(sched.stats().stale_dropped, 5);
    assert_eq!(sched.pending(DELAY), Some(0));
    assert_eq!(sched.pending_default(), 0);
}
