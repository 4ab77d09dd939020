// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`ExecutorConfig`]: validated construction parameters for a
//! [`FixedThreadExecutor`](super::FixedThreadExecutor).

use super::error::ConfigError;
use crate::worker::WorkerPanic;
use std::sync::Arc;

/// Injectable thread construction, mirroring the donor source's `newThread(runnable)`
/// hook (§6): given the fully-qualified thread name, returns a [`std::thread::Builder`]
/// ready to `spawn` - the executor supplies the closure, the factory only gets to shape
/// the `Builder` (name override, stack size, and so on).
///
/// A `None` thread factory in [`ExecutorConfig`] falls back to
/// [`default_thread_factory`], which just names the thread and otherwise takes the
/// platform default.
pub type ThreadFactory = Arc<dyn Fn(&str) -> std::thread::Builder + Send + Sync>;

/// Injectable uncaught-exception handler (§6), invoked for every job panic a worker
/// observes, in addition to (never instead of) the crate's own `tracing::warn!` log.
///
/// Per the exception-handler rethrow robustness design note, a handler that itself
/// panics is caught by the worker's outer guard - the handler running amok must not take
/// the worker down with it.
pub type UncaughtExceptionHandler = Arc<dyn Fn(std::thread::ThreadId, &WorkerPanic) + Send + Sync>;

#[must_use]
pub fn default_thread_factory() -> ThreadFactory {
    Arc::new(|name: &str| std::thread::Builder::new().name(name.to_string()))
}

/// Construction parameters for a [`FixedThreadExecutor`](super::FixedThreadExecutor).
///
/// Build via [`ExecutorConfig::new`], which validates `worker_count` and
/// `queue_capacity` up front rather than deferring the error to first use.
#[derive(Clone)]
pub struct ExecutorConfig {
    /// `N`: number of background worker threads. `0` selects threadless mode, where the
    /// calling thread becomes the sole worker via
    /// [`start_and_work_in_current_thread`](super::FixedThreadExecutor::start_and_work_in_current_thread).
    pub worker_count: usize,
    /// `Q`: bounded capacity of the pending-task queue.
    pub queue_capacity: usize,
    /// Worker thread name prefix (e.g. `"r3bl-executor-worker"` produces
    /// `"r3bl-executor-worker-0"`, `"r3bl-executor-worker-1"`, ...).
    pub thread_name_prefix: String,
    /// Worker threads beyond this count switch the pending queue from
    /// [`BasicQueue`](crate::queue::BasicQueue) to
    /// [`AdvancedQueue`](crate::queue::AdvancedQueue). Matched against `worker_count`,
    /// not a live count, since the queue flavor is chosen once at construction.
    pub max_workers_for_basic_queue: usize,
    /// When `true`, [`shutdown`](super::FixedThreadExecutor::shutdown) signals and
    /// forgets worker threads instead of joining them - the Rust analogue of a JVM
    /// daemon thread not blocking process exit. `false` (the default) joins every
    /// worker, so `shutdown()` only returns once they've all actually exited.
    pub daemon: bool,
    /// Overrides how worker `JoinHandle`s are created. `None` (the default) uses
    /// [`default_thread_factory`].
    pub thread_factory: Option<ThreadFactory>,
    /// Invoked (in addition to the crate's own logging) whenever a worker observes a
    /// job panic. `None` (the default) means only the internal log fires.
    pub uncaught_exception_handler: Option<UncaughtExceptionHandler>,
}

impl std::fmt::Debug for ExecutorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorConfig")
            .field("worker_count", &self.worker_count)
            .field("queue_capacity", &self.queue_capacity)
            .field("thread_name_prefix", &self.thread_name_prefix)
            .field("max_workers_for_basic_queue", &self.max_workers_for_basic_queue)
            .field("daemon", &self.daemon)
            .field("thread_factory", &self.thread_factory.is_some())
            .field("uncaught_exception_handler", &self.uncaught_exception_handler.is_some())
            .finish()
    }
}

impl ExecutorConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidQueueCapacity`] if `queue_capacity == 0`. There is
    /// no invalid `worker_count` in the unsigned encoding used here - `0` is threadless
    /// mode, not an error - so [`ConfigError::InvalidWorkerCount`] exists for symmetry
    /// with constructors that accept a signed count from an external boundary (e.g. a
    /// config file or CLI flag) and need to reject negative values before converting.
    pub fn new(worker_count: usize, queue_capacity: usize) -> Result<Self, ConfigError> {
        if queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity(0));
        }
        Ok(Self {
            worker_count,
            queue_capacity,
            thread_name_prefix: "r3bl-executor-worker".to_string(),
            max_workers_for_basic_queue: 8,
            daemon: false,
            thread_factory: None,
            uncaught_exception_handler: None,
        })
    }

    /// Validates a signed worker count from an external boundary (config file, CLI flag)
    /// before handing it to [`ExecutorConfig::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWorkerCount`] if `worker_count < 0`, or
    /// [`ConfigError::InvalidQueueCapacity`] if `queue_capacity <= 0`.
    pub fn from_signed(worker_count: i64, queue_capacity: i64) -> Result<Self, ConfigError> {
        if worker_count < 0 {
            return Err(ConfigError::InvalidWorkerCount(worker_count));
        }
        if queue_capacity <= 0 {
            return Err(ConfigError::InvalidQueueCapacity(queue_capacity));
        }
        #[allow(clippy::cast_sign_loss)]
        Self::new(worker_count as usize, queue_capacity as usize)
    }

    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_max_workers_for_basic_queue(mut self, threshold: usize) -> Self {
        self.max_workers_for_basic_queue = threshold;
        self
    }

    #[must_use]
    pub fn with_daemon(mut self, daemon: bool) -> Self {
        self.daemon = daemon;
        self
    }

    #[must_use]
    pub fn with_thread_factory(mut self, factory: ThreadFactory) -> Self {
        self.thread_factory = Some(factory);
        self
    }

    #[must_use]
    pub fn with_uncaught_exception_handler(mut self, handler: UncaughtExceptionHandler) -> Self {
        self.uncaught_exception_handler = Some(handler);
        self
    }

    /// Resolves the effective thread factory: the configured one, or
    /// [`default_thread_factory`] if none was set.
    #[must_use]
    pub(super) fn resolve_thread_factory(&self) -> ThreadFactory {
        self.thread_factory.clone().unwrap_or_else(default_thread_factory)
    }

    #[must_use]
    pub(super) fn use_advanced_queue(&self) -> bool {
        self.worker_count > self.max_workers_for_basic_queue
    }
}
