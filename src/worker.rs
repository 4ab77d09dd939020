// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The worker state machine (C3): `NotStarted -> Idle -> Working -> Dying -> Dead`, and
//! the drain loop that moves a worker through it.
//!
//! A worker is either a background thread spawned by
//! [`FixedThreadExecutor::start`](crate::executor::FixedThreadExecutor::start), or - in
//! threadless mode (`N = 0`) - the calling thread itself, driven one iteration at a time
//! by `startAndWorkInCurrentThread`. Both paths share [`Worker::run_loop`]; only who calls
//! it, and on what thread, differs.

use crate::{executor::config::UncaughtExceptionHandler,
            interrupt,
            queue::{DequeueOutcome, PendingQueue},
            state::{Counters, ExecutorState}};
use std::{any::Any, sync::Arc};
use tracing::{debug, trace, warn};

/// A job's `run()` panicked. Carries the raw panic payload so a caller (e.g.
/// [`FixedThreadExecutor::start_and_work_in_current_thread`][threadless]) can format a
/// message the way [`std::panic::catch_unwind`]'s default hook would.
///
/// [threadless]: crate::executor::FixedThreadExecutor::start_and_work_in_current_thread
pub struct WorkerPanic(pub Box<dyn Any + Send + 'static>);

impl WorkerPanic {
    /// Best-effort message extraction, covering the two payload shapes `panic!` actually
    /// produces (`&'static str` and `String`).
    #[must_use]
    pub fn message(&self) -> String {
        if let Some(s) = self.0.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = self.0.downcast_ref::<String>() {
            s.clone()
        } else {
            "worker task panicked with a non-string payload".to_string()
        }
    }
}

/// Where a worker is in its lifecycle. Transitions are driven entirely by
/// [`Worker::run_loop`]; nothing external mutates this directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    NotStarted,
    Idle,
    Working,
    Dying,
    Dead,
}

/// Registration record a worker publishes so the executor's worker-awareness queries
/// (C7: `isWorkerThread`, `checkIsWorkerThread`, `checkIsNotWorkerThread`) can answer
/// without the calling thread needing any special knowledge of its own status.
///
/// Deliberately keyed per-executor (in a side table the executor owns) rather than via a
/// single process-wide thread-local: a thread that is a worker for executor A is *not* a
/// worker for executor B, and a process may have several independent executors alive at
/// once.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    pub index: usize,
    pub interrupt: interrupt::InterruptHandle,
}

/// Drains a [`PendingQueue`] until told to stop, running each job and reporting panics
/// rather than propagating them (a panicking job must not take the worker down with it).
pub struct Worker<Q: PendingQueue> {
    index: usize,
    queue: Arc<Q>,
    state: Arc<ExecutorState>,
    counters: Arc<Counters>,
    uncaught_exception_handler: Option<UncaughtExceptionHandler>,
}

impl<Q: PendingQueue> Worker<Q> {
    #[must_use]
    pub fn new(index: usize, queue: Arc<Q>, state: Arc<ExecutorState>, counters: Arc<Counters>) -> Self {
        Self { index, queue, state, counters, uncaught_exception_handler: None }
    }

    #[must_use]
    pub fn with_uncaught_exception_handler(mut self, handler: Option<UncaughtExceptionHandler>) -> Self {
        self.uncaught_exception_handler = handler;
        self
    }

    /// Reports a job panic to the crate's own log and, if configured, to the injected
    /// [`UncaughtExceptionHandler`]. The handler is itself guarded by `catch_unwind`: per
    /// the exception-handler rethrow robustness design note, a handler that rethrows must
    /// not destabilize this worker.
    fn report_panic(&self, payload: Box<dyn Any + Send + 'static>) {
        warn!(worker = self.index, "job panicked; worker continues draining");
        if let Some(handler) = &self.uncaught_exception_handler {
            let panic = WorkerPanic(payload);
            let thread_id = std::thread::current().id();
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(thread_id, &panic)))
                .is_err()
            {
                warn!(worker = self.index, "uncaught_exception_handler itself panicked; ignoring");
            }
        }
    }

    #[must_use]
    pub fn index(&self) -> usize { self.index }

    /// Runs until [`DequeueOutcome::Shutdown`] is observed, transitioning
    /// `Idle <-> Working` around every job and reporting `Dying`/`Dead` to the caller via
    /// the returned [`WorkerState`] sequence implicitly (the last call made is always
    /// `Dying` followed by the loop's return, which the caller treats as `Dead`).
    ///
    /// A job that panics is caught and logged; the worker reports itself idle again and
    /// continues draining rather than terminating. This mirrors the contract note that
    /// workers survive a misbehaving task - only an explicit `workersDeath` request (or
    /// the process dying) ends a worker's life.
    pub fn run_loop(&self) -> WorkerState {
        self.counters.worker_started();
        debug!(worker = self.index, "worker starting");

        loop {
            match self.queue.blocking_dequeue(&self.state) {
                DequeueOutcome::Task(job) => {
                    self.counters.transition_idle_to_working();
                    trace!(worker = self.index, "worker running a job");
                    if let Err(payload) =
                        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| job.run()))
                    {
                        self.report_panic(payload);
                    }
                    self.counters.transition_working_to_idle();
                }
                DequeueOutcome::Shutdown => break,
            }
        }

        debug!(worker = self.index, "worker dying");
        self.counters.worker_exited();
        WorkerState::Dead
    }

    /// Threadless mode's run loop: unlike [`run_loop`](Self::run_loop), a panicking job
    /// is *not* swallowed - it stops the loop and is handed back to the caller as
    /// [`WorkerPanic`], leaving any still-queued jobs untouched. A later call resumes
    /// draining from where this one stopped, which is what makes the "raise, then call
    /// again to keep going" threadless contract possible.
    ///
    /// # Errors
    ///
    /// Returns the job's panic payload as [`WorkerPanic`] if `run()` panics.
    pub fn run_loop_propagating(&self) -> Result<(), WorkerPanic> {
        loop {
            match self.queue.blocking_dequeue(&self.state) {
                DequeueOutcome::Task(job) => {
                    self.counters.transition_idle_to_working();
                    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| job.run()));
                    self.counters.transition_working_to_idle();
                    if let Err(payload) = outcome {
                        return Err(WorkerPanic(payload));
                    }
                }
                DequeueOutcome::Shutdown => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{queue::BasicQueue, task::Job};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn run_loop_drains_then_exits_on_shutdown() {
        let queue = Arc::new(BasicQueue::new(4));
        let state = Arc::new(ExecutorState::new());
        let counters = Arc::new(Counters::default());
        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let ran = ran.clone();
            queue.try_enqueue(Job::from_fn(move || { ran.fetch_add(1, Ordering::SeqCst); }));
        }
        state.request_workers_death();

        let worker = Worker::new(0, queue, state, counters.clone());
        assert_eq!(worker.run_loop(), WorkerState::Dead);
        assert_eq!(ran.load(Ordering::SeqCst), 3);
        assert_eq!(counters.nbr_running(), 0);
    }

    #[test]
    fn a_panicking_job_does_not_kill_the_worker() {
        let queue = Arc::new(BasicQueue::new(4));
        let state = Arc::new(ExecutorState::new());
        let counters = Arc::new(Counters::default());
        queue.try_enqueue(Job::from_fn(|| panic!("boom")));
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = ran.clone();
        queue.try_enqueue(Job::from_fn(move || { ran2.fetch_add(1, Ordering::SeqCst); }));
        state.request_workers_death();

        let worker = Worker::new(0, queue, state, counters);
        assert_eq!(worker.run_loop(), WorkerState::Dead);
        assert_eq!(ran.load(Ordering::SeqCst), 1, "the job after the panicking one must still run");
    }

    #[test]
    fn run_loop_propagating_stops_on_panic_and_leaves_later_jobs_queued() {
        let queue = Arc::new(BasicQueue::new(4));
        let state = Arc::new(ExecutorState::new());
        let ran_before = Arc::new(AtomicUsize::new(0));
        let ran_before2 = ran_before.clone();
        queue.try_enqueue(Job::from_fn(move || { ran_before2.fetch_add(1, Ordering::SeqCst); }));
        queue.try_enqueue(Job::from_fn(|| panic!("boom")));
        let ran_after = Arc::new(AtomicUsize::new(0));
        let ran_after2 = ran_after.clone();
        queue.try_enqueue(Job::from_fn(move || { ran_after2.fetch_add(1, Ordering::SeqCst); }));

        let worker = Worker::new(0, queue.clone(), state.clone(), Arc::new(Counters::default()));
        let result = worker.run_loop_propagating();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().message(), "boom");
        assert_eq!(ran_before.load(Ordering::SeqCst), 1);
        assert_eq!(ran_after.load(Ordering::SeqCst), 0, "the job after the panic must stay queued");
        assert_eq!(queue.len(), 1);

        state.request_workers_death();
        assert!(worker.run_loop_propagating().is_ok());
        assert_eq!(ran_after.load(Ordering::SeqCst), 1, "resuming must drain the rest");
    }
}
