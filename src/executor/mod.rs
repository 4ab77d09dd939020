// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The public executor facade (C4): [`FixedThreadExecutor`], its [`ExecutorConfig`],
//! [`ExecutorError`], and the [`Executor`] trait the parallelizer is generic over.

pub mod awareness;
pub mod config;
pub mod error;

pub use awareness::{WorkerAwarenessError, WorkerRegistry};
pub use config::ExecutorConfig;
pub use error::{ConfigError, ExecutorError};

use crate::{interrupt,
            queue::{AdvancedQueue, BasicQueue, EnqueueOutcome, PendingQueue, QueueDrainError},
            state::{Counters, ExecutorState},
            task::Job,
            worker::{Worker, WorkerState}};
use awareness::RegistrationGuard;
use std::{sync::{atomic::{AtomicBool, Ordering}, Arc, Mutex},
          time::{Duration, Instant}};
use tracing::{info, instrument, warn};

/// The capability [`Parallelizer`](crate::parallelizer::Parallelizer) is generic over.
///
/// Exists so the parallelizer can be built, and tested, against anything that accepts
/// jobs and can steal queued work without being coupled to
/// [`FixedThreadExecutor`]'s concrete queue flavor or worker bookkeeping.
pub trait Executor: Send + Sync {
    /// Submits `job`. See [`FixedThreadExecutor::execute`] for the exact
    /// accepting/rejection semantics.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::NotAccepting`] or [`ExecutorError::QueueFull`] per the
    /// same rules as [`FixedThreadExecutor::execute`].
    fn execute(&self, job: Job) -> Result<(), ExecutorError>;

    /// Non-blocking steal of one other queued job, used by the parallelizer's
    /// cooperative wait instead of parking when it re-enters a saturated pool.
    fn steal(&self) -> Option<Job>;

    /// True if the calling thread is one of this executor's workers.
    fn is_worker_thread(&self) -> bool;
}

/// A fixed-size worker pool with independently controllable `accepting`, `processing`,
/// and shutdown lifecycle (see [`ExecutorState`]), cancellable tasks, and a threadless
/// mode for `worker_count == 0`.
///
/// Background threads are spawned by [`start`](Self::start) (or, without touching the
/// `accepting`/`processing` flags, by
/// [`start_worker_threads_if_needed`](Self::start_worker_threads_if_needed) directly) and
/// live until `workersDeath` is requested and the queue drains; there is no dynamic
/// resizing.
pub struct FixedThreadExecutor {
    config: ExecutorConfig,
    queue: Arc<dyn PendingQueue>,
    state: Arc<ExecutorState>,
    counters: Arc<Counters>,
    registry: Arc<WorkerRegistry>,
    handles: Mutex<Vec<std::thread::JoinHandle<()>>>,
    interrupts: Mutex<Vec<interrupt::InterruptHandle>>,
    started: AtomicBool,
}

impl std::fmt::Debug for FixedThreadExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedThreadExecutor")
            .field("worker_count", &self.config.worker_count)
            .field("nbr_running", &self.counters.nbr_running())
            .field("nbr_pending", &self.queue.len())
            .finish()
    }
}

impl FixedThreadExecutor {
    /// Constructs the queue (basic or advanced, per
    /// [`ExecutorConfig::use_advanced_queue`]) and shared state, but spawns no threads
    /// yet - call [`start`](Self::start),
    /// [`start_worker_threads_if_needed`](Self::start_worker_threads_if_needed), or
    /// [`start_and_work_in_current_thread`](Self::start_and_work_in_current_thread).
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        let queue: Arc<dyn PendingQueue> = if config.use_advanced_queue() {
            Arc::new(AdvancedQueue::new(config.queue_capacity))
        } else {
            Arc::new(BasicQueue::new(config.queue_capacity))
        };
        Self {
            config,
            queue,
            state: Arc::new(ExecutorState::new()),
            counters: Arc::new(Counters::default()),
            registry: Arc::new(WorkerRegistry::new()),
            handles: Mutex::new(Vec::new()),
            interrupts: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Spawns `worker_count` background threads, each running
    /// [`Worker::run_loop`](crate::worker::Worker::run_loop). A no-op if
    /// `worker_count == 0` (threadless mode: use
    /// [`start_and_work_in_current_thread`](Self::start_and_work_in_current_thread)
    /// instead).
    ///
    /// Idempotent: mirrors spec.md §4.2/§4.3's `startWorkerThreadsIfNeeded`, which must
    /// not spawn a second generation of threads on a pool that is already running. A call
    /// after the first one returns `Ok(())` immediately without touching `handles` or
    /// `interrupts`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::ThreadSpawn`] if any worker thread fails to spawn.
    /// Already-spawned workers from this call are left running; call
    /// [`shutdown_now`](Self::shutdown_now) to tear them down if a partial spawn is
    /// unacceptable.
    #[instrument(skip(self))]
    pub fn start_worker_threads_if_needed(&self) -> Result<(), ExecutorError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut handles = self.handles.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut interrupts =
            self.interrupts.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let factory = self.config.resolve_thread_factory();
        for index in 0..self.config.worker_count {
            let queue = self.queue.clone();
            let state = self.state.clone();
            let counters = self.counters.clone();
            let registry = self.registry.clone();
            let handler = self.config.uncaught_exception_handler.clone();
            let (tx, rx) = std::sync::mpsc::channel();
            let name = format!("{}-{index}", self.config.thread_name_prefix);
            let handle = factory(&name)
                .spawn(move || {
                    let _guard = RegistrationGuard::new(&registry);
                    tx.send(interrupt::current()).ok();
                    let worker = Worker::new(index, queue, state, counters)
                        .with_uncaught_exception_handler(handler);
                    let final_state = worker.run_loop();
                    debug_assert_eq!(final_state, WorkerState::Dead);
                })
                .map_err(|source| ExecutorError::ThreadSpawn { index, source })?;
            if self.config.daemon {
                // The Rust analogue of a daemon thread not blocking process exit: drop
                // the handle instead of keeping it around for `shutdown()` to join,
                // which detaches it - the OS thread keeps running to completion on its
                // own.
                drop(handle);
            } else {
                handles.push(handle);
            }
            if let Ok(handle) = rx.recv() {
                interrupts.push(handle);
            }
        }
        info!(worker_count = self.config.worker_count, daemon = self.config.daemon, "executor started");
        Ok(())
    }

    /// Spec.md §4.3's `start` operation: spawns worker threads if this is the first call,
    /// then turns `accepting` and `processing` on together. Since [`ExecutorState::new`]
    /// already starts with both flags on, the common case is just the thread spawn; this
    /// method also re-enables a pool that previously called [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::ThreadSpawn`] if a worker thread fails to spawn.
    pub fn start(&self) -> Result<(), ExecutorError> {
        self.start_worker_threads_if_needed()?;
        self.start_accepting();
        self.start_processing();
        Ok(())
    }

    /// Spec.md §4.3's `stop` operation: turns `accepting` and `processing` off together,
    /// without requesting worker death or touching already-spawned threads, which stay
    /// parked. Call [`shutdown`](Self::shutdown) instead to actually tear threads down.
    pub fn stop(&self) {
        self.stop_accepting();
        self.stop_processing();
    }

    /// Threadless mode: runs the drain loop on the calling thread instead of spawning
    /// background workers. Intended for `worker_count == 0`; blocks until `workersDeath`
    /// is requested and the queue drains, or a task panics.
    ///
    /// Unlike a background worker, a panicking task here aborts the loop and is
    /// propagated to the caller as [`ExecutorError::TaskPanicked`] rather than swallowed.
    /// The executor is left in a re-enterable state: the panicking task's result is lost,
    /// but everything still queued behind it is untouched, so calling this again resumes
    /// processing where the panic interrupted it.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::TaskPanicked`] if a task panics.
    pub fn start_and_work_in_current_thread(&self) -> Result<(), ExecutorError> {
        let _guard = RegistrationGuard::new(&self.registry);
        let worker =
            Worker::new(0, self.queue.clone(), self.state.clone(), self.counters.clone());
        worker.run_loop_propagating().map_err(|panic| ExecutorError::TaskPanicked { message: panic.message() })
    }

    /// Submits `job`. Enqueues when `accepting` is on and the queue has room. Otherwise —
    /// whether because `accepting` is off or the queue is full — a [`Job::Cancellable`]
    /// has its `cancel()` invoked on the calling thread and `Ok(())` is returned
    /// (rejection is not an error for a task that asked to be told about it); a
    /// [`Job::Plain`] instead raises [`ExecutorError::NotAccepting`] or
    /// [`ExecutorError::QueueFull`].
    ///
    /// # Errors
    ///
    /// See above.
    pub fn execute(&self, job: Job) -> Result<(), ExecutorError> {
        if !self.state.is_accepting() {
            if job.is_cancellable() {
                job.cancel();
                return Ok(());
            }
            return Err(ExecutorError::NotAccepting);
        }
        match self.queue.try_enqueue(job) {
            EnqueueOutcome::Accepted => Ok(()),
            EnqueueOutcome::RejectedFull(rejected) => {
                if rejected.is_cancellable() {
                    rejected.cancel();
                    Ok(())
                } else {
                    Err(ExecutorError::QueueFull { capacity: self.queue.capacity() })
                }
            }
        }
    }

    pub fn stop_accepting(&self) { self.state.stop_accepting(); }

    pub fn start_accepting(&self) { self.state.start_accepting(); }

    pub fn stop_processing(&self) {
        self.state.stop_processing();
        self.queue.notify_all_waiters();
    }

    pub fn start_processing(&self) {
        self.state.start_processing();
        self.queue.notify_all_waiters();
    }

    /// Cancels every currently-queued task (invoking `cancel()` on each) without
    /// affecting running workers or the `accepting`/`processing` flags.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::QueueDrain`] if a task's `cancel()` panics partway
    /// through; already-cancelled tasks stay cancelled.
    pub fn cancel_pending_schedules(&self) -> Result<(), QueueDrainError> { self.queue.cancel_all() }

    /// Stops accepting new work, requests every worker's death, wakes any parked worker,
    /// and blocks until all spawned worker threads have exited. Queued-but-not-yet-run
    /// tasks still get drained and run (or cancelled, if the caller calls
    /// [`cancel_pending_schedules`](Self::cancel_pending_schedules) first) before workers
    /// exit.
    pub fn shutdown(&self) {
        self.state.request_workers_death();
        self.queue.notify_all_waiters();
        let mut handles = self.handles.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for handle in handles.drain(..) {
            if let Err(panic) = handle.join() {
                warn!(?panic, "worker thread panicked during shutdown join");
            }
        }
    }

    /// Like [`shutdown`](Self::shutdown), but also cancels every queued task first so
    /// workers exit without running anything still pending.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::QueueDrain`] if cancellation is interrupted by a panic.
    pub fn shutdown_now(&self) -> Result<(), ExecutorError> {
        self.state.stop_accepting();
        self.cancel_pending_schedules()?;
        self.shutdown();
        Ok(())
    }

    /// Flips every currently-registered worker's interrupt flag (C7's companion to
    /// worker-awareness): cooperative, like [`Thread.interrupt()`][java], not forcible.
    ///
    /// [java]: https://docs.oracle.com/javase/8/docs/api/java/lang/Thread.html#interrupt--
    pub fn interrupt_workers(&self) {
        let interrupts = self.interrupts.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for handle in interrupts.iter() {
            interrupt::set_on(handle, true);
        }
    }

    /// Blocks the calling thread until `nbr_running() == 0` or `timeout_ns` elapses,
    /// whichever comes first. A negative `timeout_ns` is treated as zero (an immediate
    /// probe of the current state, per §5). Polls rather than parking on a condvar tied
    /// to the worker-exit transition, in the same spirit as the parallelizer's
    /// cooperative wait using `yield_now` rather than a dedicated notification channel.
    ///
    /// This is a cancellation point (✱ in §4.3): it is illegal to call this from one of
    /// this executor's own worker threads (that thread is itself among the workers being
    /// waited on, so it would wait on itself forever), and it raises if the calling
    /// thread's interrupt flag becomes set while parked.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::WorkerAwareness`] if called from one of this executor's
    /// own workers, or [`ExecutorError::Interrupted`] if the calling thread's interrupt
    /// flag is observed before the condition is reached.
    pub fn wait_for_no_more_running_worker(&self, timeout_ns: i64) -> Result<bool, ExecutorError> {
        self.check_is_not_worker_thread()?;
        if self.counters.nbr_running() == 0 {
            return Ok(true);
        }
        let timeout = Duration::from_nanos(timeout_ns.max(0).unsigned_abs());
        let deadline = Instant::now() + timeout;
        const POLL_INTERVAL: Duration = Duration::from_millis(1);
        loop {
            if self.counters.nbr_running() == 0 {
                return Ok(true);
            }
            if interrupt::is_current_set() {
                return Err(ExecutorError::Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    #[must_use]
    pub fn nbr_running(&self) -> usize { self.counters.nbr_running() }

    #[must_use]
    pub fn nbr_idle(&self) -> usize { self.counters.nbr_idle() }

    #[must_use]
    pub fn nbr_working(&self) -> usize { self.counters.nbr_working() }

    #[must_use]
    pub fn nbr_pending(&self) -> usize { self.queue.len() }

    #[must_use]
    pub fn is_accepting(&self) -> bool { self.state.is_accepting() }

    #[must_use]
    pub fn is_processing(&self) -> bool { self.state.is_processing() }

    /// C7: is the calling thread one of this executor's workers?
    #[must_use]
    pub fn is_worker_thread(&self) -> bool { self.registry.is_current_thread_member() }

    /// # Errors
    ///
    /// Returns [`WorkerAwarenessError::ExpectedWorkerThread`] if the calling thread is
    /// not one of this executor's workers.
    pub fn check_is_worker_thread(&self) -> Result<(), WorkerAwarenessError> {
        if self.is_worker_thread() { Ok(()) } else { Err(WorkerAwarenessError::ExpectedWorkerThread) }
    }

    /// # Errors
    ///
    /// Returns [`WorkerAwarenessError::ExpectedNonWorkerThread`] if the calling thread is
    /// one of this executor's workers.
    pub fn check_is_not_worker_thread(&self) -> Result<(), WorkerAwarenessError> {
        if self.is_worker_thread() { Err(WorkerAwarenessError::ExpectedNonWorkerThread) } else { Ok(()) }
    }
}

impl Executor for FixedThreadExecutor {
    fn execute(&self, job: Job) -> Result<(), ExecutorError> { FixedThreadExecutor::execute(self, job) }

    fn steal(&self) -> Option<Job> { self.queue.try_dequeue() }

    fn is_worker_thread(&self) -> bool { FixedThreadExecutor::is_worker_thread(self) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::atomic::{AtomicUsize, Ordering}, time::Duration};

    fn tiny_pool(n: usize) -> FixedThreadExecutor {
        let executor = FixedThreadExecutor::new(ExecutorConfig::new(n, 64).unwrap());
        executor.start().unwrap();
        executor
    }

    #[test]
    fn runs_submitted_jobs() {
        let executor = tiny_pool(2);
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let count = count.clone();
            executor.execute(Job::from_fn(move || { count.fetch_add(1, Ordering::SeqCst); })).unwrap();
        }
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while count.load(Ordering::SeqCst) < 10 && std::time::Instant::now() < deadline {
            std::thread::yield_now();
        }
        assert_eq!(count.load(Ordering::SeqCst), 10);
        executor.shutdown();
    }

    #[test]
    fn stop_accepting_rejects_plain_jobs_and_cancels_cancellable_ones() {
        let executor = tiny_pool(1);
        executor.stop_accepting();
        assert!(matches!(executor.execute(Job::from_fn(|| {})), Err(ExecutorError::NotAccepting)));

        let cancelled = Arc::new(AtomicUsize::new(0));
        struct Counting(Arc<AtomicUsize>);
        impl crate::task::CancellableTask for Counting {
            fn run(self: Box<Self>) { panic!("must not run"); }

            fn cancel(self: Box<Self>) { self.0.fetch_add(1, Ordering::SeqCst); }
        }
        executor.execute(Job::from_cancellable(Counting(cancelled.clone()))).unwrap();
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
        executor.shutdown();
    }

    #[test]
    fn queue_full_is_always_an_error_even_for_cancellable_jobs() {
        let executor = FixedThreadExecutor::new(ExecutorConfig::new(0, 1).unwrap());
        executor.stop_processing();
        executor.execute(Job::from_fn(|| {})).unwrap();
        let result = executor.execute(Job::from_fn_cancellable(|| {}));
        assert!(matches!(result, Err(ExecutorError::QueueFull { capacity: 1 })));
    }

    #[test]
    fn threadless_mode_uses_the_calling_thread_as_the_only_worker() {
        let executor = FixedThreadExecutor::new(ExecutorConfig::new(0, 8).unwrap());
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = ran.clone();
        executor.execute(Job::from_fn(move || { ran2.fetch_add(1, Ordering::SeqCst); })).unwrap();
        executor.state.request_workers_death();
        executor.start_and_work_in_current_thread().unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn threadless_mode_resumes_after_a_panic_instead_of_losing_later_jobs() {
        let executor = FixedThreadExecutor::new(ExecutorConfig::new(0, 8).unwrap());
        let log = Arc::new(Mutex::new(Vec::new()));
        let push = |log: Arc<Mutex<Vec<i32>>>, value: i32| Job::from_fn(move || log.lock().unwrap().push(value));

        executor.execute(push(log.clone(), 1)).unwrap();
        executor.execute(Job::from_fn(|| panic!("boom"))).unwrap();
        let first = executor.start_and_work_in_current_thread();
        assert!(matches!(first, Err(ExecutorError::TaskPanicked { .. })));
        assert_eq!(*log.lock().unwrap(), vec![1]);

        executor.execute(push(log.clone(), 3)).unwrap();
        executor.execute(push(log.clone(), 4)).unwrap();
        executor.state.request_workers_death();
        executor.start_and_work_in_current_thread().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1, 3, 4]);
    }

    #[test]
    fn wait_for_no_more_running_worker_returns_true_once_shutdown_drains() {
        let executor = Arc::new(tiny_pool(2));
        std::thread::sleep(Duration::from_millis(20)); // let both workers finish registering.
        assert!(!executor.wait_for_no_more_running_worker(0).unwrap());
        executor.shutdown();
        assert!(executor.wait_for_no_more_running_worker(0).unwrap());
    }

    #[test]
    fn wait_for_no_more_running_worker_times_out_while_a_worker_is_still_running() {
        let executor = tiny_pool(1);
        executor
            .execute(Job::from_fn(|| std::thread::sleep(Duration::from_millis(500))))
            .unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let result = executor.wait_for_no_more_running_worker(10_000_000).unwrap(); // 10ms
        assert!(!result, "the worker is still alive, just idle-vs-working is irrelevant here");
        executor.shutdown();
    }

    #[test]
    fn wait_for_no_more_running_worker_rejects_a_call_from_one_of_its_own_workers() {
        let executor = Arc::new(tiny_pool(1));
        let (tx, rx) = std::sync::mpsc::channel();
        let e2 = executor.clone();
        executor
            .execute(Job::from_fn(move || {
                tx.send(e2.wait_for_no_more_running_worker(0)).ok();
            }))
            .unwrap();
        let result = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(result, Err(ExecutorError::WorkerAwareness(_))));
        executor.shutdown();
    }

    #[test]
    fn a_negative_timeout_is_treated_as_an_immediate_probe() {
        let executor = tiny_pool(1);
        executor.execute(Job::from_fn(|| std::thread::sleep(Duration::from_millis(200)))).unwrap();
        std::thread::sleep(Duration::from_millis(10));
        assert!(!executor.wait_for_no_more_running_worker(-1).unwrap());
        executor.shutdown();
    }

    #[test]
    fn worker_awareness_distinguishes_workers_from_external_threads() {
        let executor = Arc::new(tiny_pool(1));
        assert!(!executor.is_worker_thread());
        assert!(executor.check_is_not_worker_thread().is_ok());

        let (tx, rx) = std::sync::mpsc::channel();
        let e2 = executor.clone();
        executor
            .execute(Job::from_fn(move || {
                tx.send(e2.is_worker_thread()).ok();
            }))
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(1)).unwrap());
        executor.shutdown();
    }

    #[test]
    fn uncaught_exception_handler_fires_without_killing_the_worker() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let handler: config::UncaughtExceptionHandler =
            Arc::new(move |_id, panic| seen2.lock().unwrap().push(panic.message()));
        let executor =
            FixedThreadExecutor::new(ExecutorConfig::new(1, 16).unwrap().with_uncaught_exception_handler(handler));
        executor.start().unwrap();
        executor.execute(Job::from_fn(|| panic!("kaboom"))).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = ran.clone();
        executor.execute(Job::from_fn(move || { ran2.fetch_add(1, Ordering::SeqCst); })).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while ran.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            std::thread::yield_now();
        }
        assert_eq!(ran.load(Ordering::SeqCst), 1, "the worker must keep draining after the panic");
        assert_eq!(*seen.lock().unwrap(), vec!["kaboom".to_string()]);
        executor.shutdown();
    }

    #[test]
    fn start_worker_threads_if_needed_is_idempotent() {
        let executor = FixedThreadExecutor::new(ExecutorConfig::new(3, 16).unwrap());
        executor.start_worker_threads_if_needed().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(executor.nbr_running(), 3);

        executor.start_worker_threads_if_needed().unwrap();
        executor.start_worker_threads_if_needed().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(executor.nbr_running(), 3, "a repeat call must not spawn a second generation of workers");
        executor.shutdown();
    }

    #[test]
    fn start_and_stop_toggle_both_flags_together() {
        let executor = tiny_pool(1);
        assert!(executor.is_accepting());
        assert!(executor.is_processing());

        executor.stop();
        assert!(!executor.is_accepting());
        assert!(!executor.is_processing());

        executor.start().unwrap();
        assert!(executor.is_accepting());
        assert!(executor.is_processing());
        executor.shutdown();
    }

    #[test]
    fn daemon_shutdown_does_not_block_on_joining_worker_threads() {
        let executor =
            FixedThreadExecutor::new(ExecutorConfig::new(1, 16).unwrap().with_daemon(true));
        executor.start().unwrap();
        let started = std::time::Instant::now();
        executor.shutdown();
        assert!(started.elapsed() < Duration::from_secs(1), "daemon shutdown must not wait on worker join");
    }
}
