//! Deterministic task queue for timer-driven callbacks
//!
//! Tasks are polled from the same single-threaded context that evaluates frames, so a
//! task never runs concurrently with an evaluation pass. Every scheduled task returns a
//! [`TaskHandle`] that acts as its cancellation token.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Cancellation token for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<K> {
    kind: K,
    due: Instant,
    period: Option<Duration>,
}

/// A task that came due during [`TaskQueue::poll`]
#[derive(Debug, Clone, PartialEq)]
pub struct FiredTask<K> {
    pub handle: TaskHandle,
    pub kind: K,
    pub due: Instant,
}

/// One-shot and periodic tasks keyed by handle
#[derive(Debug, Clone)]
pub struct TaskQueue<K> {
    tasks: BTreeMap<TaskHandle, ScheduledTask<K>>,
    next_id: u64,
}

impl<K: Clone> TaskQueue<K> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn insert(&mut self, task: ScheduledTask<K>) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.insert(handle, task);
        handle
    }

    /// Run `kind` once at `due`
    pub fn schedule_once(&mut self, due: Instant, kind: K) -> TaskHandle {
        self.insert(ScheduledTask {
            kind,
            due,
            period: None,
        })
    }

    /// Run `kind` at `first_due` and every `period` after until cancelled
    pub fn schedule_every(&mut self, first_due: Instant, period: Duration, kind: K) -> TaskHandle {
        // A zero period would never let poll() terminate
        let period = period.max(Duration::from_millis(1));
        self.insert(ScheduledTask {
            kind,
            due: first_due,
            period: Some(period),
        })
    }

    /// Cancel a task. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let removed = self.tasks.remove(&handle).is_some();
        if removed {
            debug!("Cancelled task {:?}", handle);
        }
        removed
    }

    /// Whether a task is still pending
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.contains_key(&handle)
    }

    /// Earliest pending due time
    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.values().map(|t| t.due).min()
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Fire every task due at or before `now`, in due order (ties by scheduling order).
    /// Periodic tasks fire once for every elapsed period.
    pub fn poll(&mut self, now: Instant) -> Vec<FiredTask<K>> {
        let mut fired = Vec::new();

        loop {
            let next = self
                .tasks
                .iter()
                .filter(|(_, task)| task.due <= now)
                .min_by_key(|(handle, task)| (task.due, **handle))
                .map(|(handle, _)| *handle);

            let Some(handle) = next else { break };

            let reschedule = match self.tasks.get_mut(&handle) {
                Some(task) => {
                    fired.push(FiredTask {
                        handle,
                        kind: task.kind.clone(),
                        due: task.due,
                    });
                    match task.period {
                        Some(period) => {
                            task.due += period;
                            true
                        }
                        None => false,
                    }
                }
                None => break,
            };

            if !reschedule {
                self.tasks.remove(&handle);
            }
        }

        fired
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

impl<K: Clone> Default for TaskQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
