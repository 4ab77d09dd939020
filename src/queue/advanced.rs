// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`AdvancedQueue`]: a lock-free [`ArrayQueue`] fast path, with a mutex + condvar used
//! only to park a worker when the queue is observed empty.

use super::{DequeueOutcome, EnqueueOutcome, PendingQueue, QueueDrainError};
use crate::{state::ExecutorState, task::Job};
use crossbeam_queue::ArrayQueue;
use std::sync::{Condvar, Mutex};

/// A bounded FIFO whose enqueue/dequeue hot path never takes a lock.
///
/// [`ArrayQueue`] gives wait-free push/pop once a slot is available; the mutex + condvar
/// pair here is reached only to block a worker when [`ArrayQueue::pop`] comes back empty,
/// exactly mirroring [`BasicQueue`](super::BasicQueue)'s parking discipline so the two
/// flavors are interchangeable behind [`PendingQueue`]. Selected once a pool's worker
/// count exceeds `max_workers_for_basic_queue`, where contention on a single mutex starts
/// to dominate.
#[derive(Debug)]
pub struct AdvancedQueue {
    ring: ArrayQueue<Job>,
    park: Mutex<()>,
    not_empty: Condvar,
}

impl AdvancedQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { ring: ArrayQueue::new(capacity.max(1)), park: Mutex::new(()), not_empty: Condvar::new() }
    }
}

impl PendingQueue for AdvancedQueue {
    fn try_enqueue(&self, job: Job) -> EnqueueOutcome {
        match self.ring.push(job) {
            Ok(()) => {
                // Hold `park` around the notify so it cannot race a waiter that has
                // already re-checked `ring.is_empty()` under the same lock (line below)
                // but hasn't yet called `wait` - standard condvar discipline, needed
                // here because the ring itself isn't guarded by `park`.
                let _guard = self.park.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                self.not_empty.notify_all();
                EnqueueOutcome::Accepted
            }
            Err(job) => EnqueueOutcome::RejectedFull(job),
        }
    }

    fn blocking_dequeue(&self, state: &ExecutorState) -> DequeueOutcome {
        loop {
            if state.is_processing() {
                if let Some(job) = self.ring.pop() {
                    return DequeueOutcome::Task(job);
                }
            }
            if state.is_workers_death_requested() && self.ring.is_empty() {
                return DequeueOutcome::Shutdown;
            }
            // Re-check under the park mutex to close the race between the `pop` above
            // observing empty and another thread pushing + notifying before we wait.
            // Only retry the fast path when `processing` is actually on - otherwise
            // (`processing` off, ring non-empty) there is nothing this loop can do but
            // park, and re-`continue`-ing here would busy-spin at 100% CPU until
            // `processing` comes back on.
            let guard = self.park.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            if state.is_processing() && !self.ring.is_empty() {
                continue;
            }
            let _unused = self.not_empty.wait(guard).unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    fn try_dequeue(&self) -> Option<Job> { self.ring.pop() }

    fn cancel_all(&self) -> Result<(), QueueDrainError> {
        loop {
            let Some(job) = self.ring.pop() else { return Ok(()) };
            let remaining = self.len();
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| job.cancel())).is_err() {
                return Err(QueueDrainError::CancelPanicked { remaining });
            }
        }
    }

    fn drain_into(&self, sink: &mut dyn FnMut(Job) -> bool) -> Result<(), QueueDrainError> {
        loop {
            let Some(job) = self.ring.pop() else { return Ok(()) };
            if !sink(job) {
                return Err(QueueDrainError::SinkRejected { remaining: self.len() });
            }
        }
    }

    fn len(&self) -> usize { self.ring.len() }

    fn capacity(&self) -> usize { self.ring.capacity() }

    fn notify_all_waiters(&self) {
        let _guard = self.park.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.not_empty.notify_all();
    }
}
