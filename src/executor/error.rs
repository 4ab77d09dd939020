// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Errors raised by [`FixedThreadExecutor`](super::FixedThreadExecutor) and its
//! configuration. Grounded on the donor crate's `SubscribeError` shape: one
//! [`thiserror`]-derived enum, each variant with a [`miette::Diagnostic`] code and
//! actionable help text, distinguishing recoverable submission-time failures from fatal
//! construction-time ones.

/// Errors from [`FixedThreadExecutor::execute`](super::FixedThreadExecutor::execute) and
/// related submission calls.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ExecutorError {
    /// `accepting` was off (either `stopAccepting()` was called, or `workersDeath` has
    /// been requested) at submission time.
    #[error("executor is not accepting new tasks")]
    #[diagnostic(
        code(r3bl_executor::not_accepting),
        help(
            "The executor's `accepting` flag is off, either because stopAccepting() was \
             called or because shutdown has been requested. Cancellable tasks submitted \
             in this state have their cancel() invoked instead of raising; this error is \
             only raised for plain (non-cancellable) jobs."
        )
    )]
    NotAccepting,

    /// The pending queue was at capacity at submission time.
    #[error("pending queue is full (capacity {capacity})")]
    #[diagnostic(
        code(r3bl_executor::queue_full),
        help(
            "The bounded pending queue has reached its configured capacity. Either the \
             submission rate exceeds what the pool can drain, or the configured queue \
             capacity is too small for this workload."
        )
    )]
    QueueFull { capacity: usize },

    /// A worker's OS thread failed to spawn.
    #[error("failed to spawn worker thread {index}")]
    #[diagnostic(
        code(r3bl_executor::thread_spawn),
        help("Check OS thread limits (`ulimit -u` on Unix) and available memory.")
    )]
    ThreadSpawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    /// Draining the pending queue for cancellation or a shutdown-time sink failed.
    #[error(transparent)]
    #[diagnostic(code(r3bl_executor::queue_drain))]
    QueueDrain(#[from] crate::queue::QueueDrainError),

    /// A task panicked while running on
    /// [`start_and_work_in_current_thread`](super::FixedThreadExecutor::start_and_work_in_current_thread).
    /// Unlike a background worker (which swallows a panicking job and keeps draining),
    /// threadless mode surfaces the panic to the caller immediately; the executor stays
    /// re-enterable and a later call resumes draining the rest of the queue.
    #[error("task panicked: {message}")]
    #[diagnostic(
        code(r3bl_executor::task_panicked),
        help(
            "Fix the panicking task, or call start_and_work_in_current_thread() again to \
             resume draining the remaining queued work."
        )
    )]
    TaskPanicked { message: String },

    /// [`FixedThreadExecutor::wait_for_no_more_running_worker`](super::FixedThreadExecutor::wait_for_no_more_running_worker)
    /// was called from one of this executor's own worker threads - since that thread is
    /// itself among the running workers being waited on, it would wait on itself forever.
    #[error(transparent)]
    #[diagnostic(code(r3bl_executor::wait_misuse))]
    WorkerAwareness(#[from] super::awareness::WorkerAwarenessError),

    /// The calling thread's interrupt flag was observed while parked in
    /// [`wait_for_no_more_running_worker`](super::FixedThreadExecutor::wait_for_no_more_running_worker).
    #[error("interrupted while waiting for no more running workers")]
    #[diagnostic(
        code(r3bl_executor::wait_interrupted),
        help("The calling thread's interrupt flag was set; clear it before retrying the wait.")
    )]
    Interrupted,
}

/// Errors from constructing an [`ExecutorConfig`](super::ExecutorConfig).
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("worker count must be >= 0, got {0}")]
    #[diagnostic(
        code(r3bl_executor::invalid_worker_count),
        help("Pass 0 for threadless mode, or a positive count for a background pool.")
    )]
    InvalidWorkerCount(i64),

    #[error("queue capacity must be > 0, got {0}")]
    #[diagnostic(
        code(r3bl_executor::invalid_queue_capacity),
        help("The pending queue must have room for at least one task.")
    )]
    InvalidQueueCapacity(i64),
}
