// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`BasicQueue`]: a single mutex + condvar, the simplest correct [`PendingQueue`].

use super::{DequeueOutcome, EnqueueOutcome, PendingQueue, QueueDrainError};
use crate::{state::ExecutorState, task::Job};
use std::{collections::VecDeque,
          sync::{Condvar, Mutex}};

/// A bounded FIFO backed by `Mutex<VecDeque<Job>>` + `Condvar`.
///
/// Enqueue and dequeue both take the one mutex; a worker blocked in
/// [`blocking_dequeue`](PendingQueue::blocking_dequeue) parks on the condvar and is woken
/// by every enqueue and every call to [`notify_all_waiters`](PendingQueue::notify_all_waiters).
/// Correct at any worker count; [`AdvancedQueue`](super::AdvancedQueue) exists only to cut
/// contention once that count gets large.
#[derive(Debug)]
pub struct BasicQueue {
    capacity: usize,
    inner: Mutex<VecDeque<Job>>,
    not_empty: Condvar,
}

impl BasicQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            not_empty: Condvar::new(),
        }
    }
}

impl PendingQueue for BasicQueue {
    fn try_enqueue(&self, job: Job) -> EnqueueOutcome {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.len() >= self.capacity {
            return EnqueueOutcome::RejectedFull(job);
        }
        guard.push_back(job);
        drop(guard);
        self.not_empty.notify_all();
        EnqueueOutcome::Accepted
    }

    fn blocking_dequeue(&self, state: &ExecutorState) -> DequeueOutcome {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        loop {
            if state.is_processing() {
                if let Some(job) = guard.pop_front() {
                    return DequeueOutcome::Task(job);
                }
            }
            if state.is_workers_death_requested() && guard.is_empty() {
                return DequeueOutcome::Shutdown;
            }
            guard = self.not_empty.wait(guard).unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    fn try_dequeue(&self) -> Option<Job> {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.pop_front()
    }

    fn cancel_all(&self) -> Result<(), QueueDrainError> {
        loop {
            let job = {
                let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                match guard.pop_front() {
                    Some(job) => job,
                    None => return Ok(()),
                }
            };
            let remaining = self.len();
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| job.cancel())).is_err() {
                return Err(QueueDrainError::CancelPanicked { remaining });
            }
        }
    }

    fn drain_into(&self, sink: &mut dyn FnMut(Job) -> bool) -> Result<(), QueueDrainError> {
        loop {
            let job = {
                let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                match guard.pop_front() {
                    Some(job) => job,
                    None => return Ok(()),
                }
            };
            if !sink(job) {
                return Err(QueueDrainError::SinkRejected { remaining: self.len() });
            }
        }
    }

    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    fn capacity(&self) -> usize { self.capacity }

    fn notify_all_waiters(&self) { self.not_empty.notify_all(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ExecutorState;
    use std::{sync::Arc, thread, time::Duration};

    #[test]
    fn enqueue_rejects_once_full() {
        let queue = BasicQueue::new(1);
        assert!(matches!(queue.try_enqueue(Job::from_fn(|| {})), EnqueueOutcome::Accepted));
        assert!(matches!(queue.try_enqueue(Job::from_fn(|| {})), EnqueueOutcome::RejectedFull(_)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn dequeue_is_fifo() {
        let queue = BasicQueue::new(4);
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            queue.try_enqueue(Job::from_fn(move || order.lock().unwrap().push(i)));
        }
        let state = ExecutorState::new();
        for _ in 0..3 {
            match queue.blocking_dequeue(&state) {
                DequeueOutcome::Task(job) => job.run(),
                DequeueOutcome::Shutdown => panic!("unexpected shutdown"),
            }
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn blocking_dequeue_returns_shutdown_once_drained_and_death_requested() {
        let queue = BasicQueue::new(4);
        let state = ExecutorState::new();
        state.request_workers_death();
        match queue.blocking_dequeue(&state) {
            DequeueOutcome::Shutdown => {}
            DequeueOutcome::Task(_) => panic!("queue is empty, expected Shutdown"),
        }
    }

    #[test]
    fn blocking_dequeue_wakes_when_a_job_is_enqueued_from_another_thread() {
        let queue = Arc::new(BasicQueue::new(4));
        let state = Arc::new(ExecutorState::new());
        let q2 = queue.clone();
        let s2 = state.clone();
        let worker = thread::spawn(move || match q2.blocking_dequeue(&s2) {
            DequeueOutcome::Task(job) => job.run(),
            DequeueOutcome::Shutdown => panic!("unexpected shutdown"),
        });
        thread::sleep(Duration::from_millis(20));
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ran2 = ran.clone();
        queue.try_enqueue(Job::from_fn(move || ran2.store(true, std::sync::atomic::Ordering::SeqCst)));
        worker.join().unwrap();
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn cancel_all_invokes_cancel_on_every_remaining_job() {
        struct Counting(Arc<std::sync::atomic::AtomicUsize>);
        impl crate::task::CancellableTask for Counting {
            fn run(self: Box<Self>) { panic!("must not run"); }

            fn cancel(self: Box<Self>) { self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst); }
        }

        let queue = BasicQueue::new(4);
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        for _ in 0..3 {
            queue.try_enqueue(Job::from_cancellable(Counting(count.clone())));
        }
        queue.cancel_all().unwrap();
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 3);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn drain_into_moves_jobs_in_order() {
        let queue = BasicQueue::new(4);
        for i in 0..3 {
            queue.try_enqueue(Job::from_fn(move || { let _ = i; }));
        }
        let mut collected = Vec::new();
        queue.drain_into(&mut |job| { collected.push(job); true }).unwrap();
        assert_eq!(collected.len(), 3);
        assert_eq!(queue.len(), 0);
    }
}
