// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The pending-task queue (C2): a bounded FIFO with three removal modes - dequeue for
//! run, drain-all into a caller collection, and cancel-all. Two flavors exist behind the
//! same [`PendingQueue`] trait, selected by
//! [`ExecutorConfig::max_workers_for_basic_queue`](crate::executor::ExecutorConfig):
//!
//! - [`BasicQueue`](basic::BasicQueue): a single mutex + condvar. Simplest correct
//!   implementation; the right choice below the basic/advanced worker-count threshold.
//! - [`AdvancedQueue`](advanced::AdvancedQueue): a lock-free
//!   [`ArrayQueue`](crossbeam_queue::ArrayQueue) fast path with a mutex + condvar
//!   fallback only for the blocking wait when the queue is observed empty. Reduces
//!   contention at high worker counts; externally observable behavior is identical to
//!   [`BasicQueue`].
//!
//! Both flavors uphold the same invariants (§4.1): size never exceeds capacity,
//! enqueue/dequeue are linearizable, and a single-worker pool sees strict FIFO order.

pub mod advanced;
pub mod basic;

pub use advanced::AdvancedQueue;
pub use basic::BasicQueue;

use crate::{state::ExecutorState, task::Job};
use std::fmt;

/// Outcome of [`PendingQueue::try_enqueue`]. The rejection variants hand the job back so
/// the caller can decide what "rejected" means for it - [`FixedThreadExecutor::execute`](crate::executor::FixedThreadExecutor::execute)
/// invokes `cancel()` on a [`Job::Cancellable`] and raises for a [`Job::Plain`].
pub enum EnqueueOutcome {
    Accepted,
    RejectedFull(Job),
}

impl fmt::Debug for EnqueueOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnqueueOutcome::Accepted => write!(f, "Accepted"),
            EnqueueOutcome::RejectedFull(_) => write!(f, "RejectedFull(..)"),
        }
    }
}

/// Outcome of [`PendingQueue::blocking_dequeue`].
pub enum DequeueOutcome {
    /// A job was dequeued for the worker to run.
    Task(Job),
    /// `workersDeath` was requested and the queue is empty: the worker should exit.
    Shutdown,
}

impl fmt::Debug for DequeueOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DequeueOutcome::Task(_) => write!(f, "Task(..)"),
            DequeueOutcome::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Either [`cancel_all`](PendingQueue::cancel_all) aborted partway through because a
/// task's `cancel()` itself panicked, or [`drain_into`](PendingQueue::drain_into)
/// aborted because the sink rejected a job mid-drain. Both permit partial progress: per
/// §4.1, already-removed jobs stay removed (already cancelled, or already moved into the
/// sink) and the caller may retry for the remainder.
#[derive(Debug, thiserror::Error)]
pub enum QueueDrainError {
    #[error("task.cancel() panicked during cancel_all(); {remaining} job(s) left in the queue")]
    CancelPanicked { remaining: usize },
    #[error("sink rejected a job during drain_into(); {remaining} job(s) left in the queue")]
    SinkRejected { remaining: usize },
}

/// The bounded FIFO task queue shared by the executor and its workers.
///
/// Implementors must uphold (§4.1, §8):
/// 1. `len() <= capacity()` at all times; `try_enqueue` returns
///    [`EnqueueOutcome::RejectedFull`] exactly when `len() == capacity()`.
/// 2. Enqueue/dequeue are linearizable, and FIFO for a single consumer - so with one
///    worker, global processing order equals submission order.
/// 3. Once an element is drained or cancelled it is never observed again.
pub trait PendingQueue: Send + Sync {
    /// Attempts to enqueue `job`, per the capacity/closedness rules above.
    fn try_enqueue(&self, job: Job) -> EnqueueOutcome;

    /// Blocks the calling thread while `(queue empty OR processing off) AND NOT
    /// workersDeath`, then either returns the next job in FIFO order or
    /// [`DequeueOutcome::Shutdown`] once `workersDeath` is requested and the queue has
    /// drained.
    fn blocking_dequeue(&self, state: &ExecutorState) -> DequeueOutcome;

    /// Non-blocking dequeue used by the parallelizer's cooperative wait (§4.5, §9): a
    /// worker that is blocked waiting on a child frame steals and runs other queued work
    /// instead of parking. Returns `None` immediately if the queue is empty, without
    /// regard to the `processing` flag (a stealing worker is, by definition, already
    /// "processing").
    fn try_dequeue(&self) -> Option<Job>;

    /// Repeatedly pops the front and invokes `task.cancel()` (a no-op for
    /// [`Job::Plain`]). If a `cancel()` call panics, the loop stops and the panic is
    /// reported via [`QueueDrainError::CancelPanicked`]; already-cancelled jobs do not
    /// reappear on retry.
    ///
    /// # Errors
    ///
    /// See [`QueueDrainError::CancelPanicked`].
    fn cancel_all(&self) -> Result<(), QueueDrainError>;

    /// Moves all queued jobs into `sink`, in FIFO order. If `sink` rejects a job
    /// mid-drain (returns `false`), already-moved jobs stay in `sink` and the rest stay
    /// queued.
    ///
    /// # Errors
    ///
    /// See [`QueueDrainError::SinkRejected`].
    fn drain_into(&self, sink: &mut dyn FnMut(Job) -> bool) -> Result<(), QueueDrainError>;

    /// Current number of queued jobs (`nbrPending`).
    fn len(&self) -> usize;

    #[must_use]
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Bounded capacity `Q` this queue was constructed with.
    fn capacity(&self) -> usize;

    /// Wakes any thread parked in [`blocking_dequeue`](Self::blocking_dequeue) so it can
    /// re-check `processing`/`workersDeath`, without regard to queue contents. Used when
    /// those flags flip (e.g. `start_processing`, `shutdown`).
    fn notify_all_waiters(&self);
}
