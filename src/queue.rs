use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Bounded FIFO hand-off between a producer thread and the tick loop.
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct IngestionQueue {
    shared: Arc<QueueShared>,
}

struct QueueShared {
    messages: Mutex<VecDeque<String>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl IngestionQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(QueueShared {
                messages: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
                capacity,
                dropped: AtomicU64::new(0),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.shared
            .messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `message`, or drops it when the queue is full.
    pub fn push(&self, message: impl Into<String>) -> bool {
        let mut messages = self.lock();
        if messages.len() >= self.shared.capacity {
            drop(messages);
            let dropped = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if dropped == 1 || dropped % 1000 == 0 {
                tracing::warn!(
                    dropped,
                    capacity = self.shared.capacity,
                    "ingestion queue full; dropping messages"
                );
            }
            return false;
        }
        messages.push_back(message.into());
        true
    }

    /// Removes up to `max` messages, oldest first. The rest stay queued.
    pub fn drain(&self, max: usize) -> Vec<String> {
        let mut messages = self.lock();
        let take = messages.len().min(max);
        messages.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn drain_is_capped_and_keeps_order() {
        let queue = IngestionQueue::new(100);
        for index in 0..25 {
            assert!(queue.push(format!("m{index}")));
        }

        let first = queue.drain(20);
        assert_eq!(first.len(), 20);
        assert_eq!(first[0], "m0");
        assert_eq!(first[19], "m19");
        assert_eq!(queue.len(), 5);

        let rest = queue.drain(20);
        assert_eq!(rest, ["m20", "m21", "m22", "m23", "m24"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_rejects_and_counts() {
        let queue = IngestionQueue::new(2);
        assert!(queue.push("a"));
        assert!(queue.push("b"));
        assert!(!queue.push("c"));
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.drain(10), ["a", "b"]);
    }

    #[test]
    fn producers_on_other_threads_are_not_lost() {
        let queue = IngestionQueue::new(10_000);
        let handles = (0..4)
            .map(|worker| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for index in 0..250 {
                        queue.push(format!("{worker}:{index}"));
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut total = 0;
        loop {
            let batch = queue.drain(20);
            if batch.is_empty() {
                break;
            }
            assert!(batch.len() <= 20);
            total += batch.len();
        }
        assert_eq!(total, 1000);
    }
}
