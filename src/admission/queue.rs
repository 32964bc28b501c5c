//! Admission queue
//!
//! FIFO ordering of pending request ids. Queue position is the zero-based
//! index of an id at read time.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Clone, Default)]
pub struct AdmissionQueue {
    inner: Arc<Mutex<VecDeque<Uuid>>>,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an id to the end of the queue.
    ///
    /// When `max_depth` is set, a full queue fails with `QueueFull` and the
    /// queue is left unchanged.
    pub fn enqueue(&self, id: Uuid, max_depth: Option<usize>) -> Result<(), AppError> {
        let mut queue = self.inner.lock();
        if let Some(max) = max_depth {
            if queue.len() >= max {
                return Err(AppError::QueueFull { depth: queue.len() });
            }
        }
        queue.push_back(id);
        Ok(())
    }

    /// Zero-based position of an id, or `None` when it is not queued.
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.inner.lock().iter().position(|queued| *queued == id)
    }

    /// Remove the first occurrence of an id.
    ///
    /// Removing an absent id is a no-op returning `false`.
    pub fn dequeue(&self, id: Uuid) -> bool {
        let mut queue = self.inner.lock();
        match queue.iter().position(|queued| *queued == id) {
            Some(index) => {
                queue.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_upload_order() {
        let queue = AdmissionQueue::new();
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        for id in &ids {
            queue.enqueue(*id, None).unwrap();
        }

        for (expected, id) in ids.iter().enumerate() {
            assert_eq!(queue.position(*id), Some(expected));
        }
    }

    #[test]
    fn dequeue_shifts_later_positions_forward() {
        let queue = AdmissionQueue::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        queue.enqueue(first, None).unwrap();
        queue.enqueue(second, None).unwrap();

        assert!(queue.dequeue(first));
        assert_eq!(queue.position(second), Some(0));
        assert_eq!(queue.position(first), None);
    }

    #[test]
    fn dequeue_of_absent_id_is_a_noop() {
        let queue = AdmissionQueue::new();
        queue.enqueue(Uuid::new_v4(), None).unwrap();

        assert!(!queue.dequeue(Uuid::new_v4()));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn full_queue_rejects_enqueue() {
        let queue = AdmissionQueue::new();
        queue.enqueue(Uuid::new_v4(), Some(1)).unwrap();

        let result = queue.enqueue(Uuid::new_v4(), Some(1));
        assert!(matches!(result, Err(AppError::QueueFull { depth: 1 })));
        assert_eq!(queue.len(), 1);
    }
}
