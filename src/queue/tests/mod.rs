//! Queue 模块单元测试
//!
//! 测试时间有序队列与直通队列的排队、排序与排空行为


use crate::frame::FrameStep;
use crate::task::{Task, TaskId, TaskRef};

/// Build an inert shared task; queue tests only care about identity.
fn make_task(id: usize) -> TaskRef {
    Task::new(
        TaskId(id),
        Box::new(|| -> crate::Result<FrameStep> { Ok(FrameStep::Done) }),
    )
    .into_ref()
}

/// Project drained tasks back to their IDs.
fn ids(tasks: &[TaskRef]) -> Vec<usize> {
    tasks.iter().map(|t| t.borrow().id().inner()).collect()
}

#[cfg(test)]
mod cursor_tests {
    use crate::queue::TimeCursor;

    #[test]
    fn test_cursor_starts_at_zero() {
        assert_eq!(TimeCursor::new().now(), 0);
    }

    #[test]
    fn test_cursor_advance_and_set() {
        let cursor = TimeCursor::new();
        cursor.advance(3);
        assert_eq!(cursor.now(), 3);
        cursor.advance(2);
        assert_eq!(cursor.now(), 5);
        cursor.set(1);
        assert_eq!(cursor.now(), 1);
    }

    #[test]
    fn test_cursor_clones_share_state() {
        let cursor = TimeCursor::new();
        let other = cursor.clone();
        cursor.advance(7);
        assert_eq!(other.now(), 7);
    }
}
