// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The task contract (C1): a unit of deferred work with two terminal operations,
//! [`CancellableTask::run`] and [`CancellableTask::cancel`]. Exactly one is invoked per
//! accepted submission. See [`Job`] for how plain runnables and cancellable tasks are
//! unified into the one shape the queue and workers deal with.

/// A task that can be told to stand down instead of running, if the executor can't (or
/// won't) run it.
///
/// Implement this directly when your work needs to observe rejection (e.g. to release a
/// resource, or notify a caller that their request was dropped). For fire-and-forget
/// work that has nothing meaningful to do on cancellation, wrap a plain closure with
/// [`Job::from_fn`] instead - rejection of those surfaces as
/// [`ExecutorError::NotAccepting`](crate::executor::ExecutorError::NotAccepting) or
/// [`ExecutorError::QueueFull`](crate::executor::ExecutorError::QueueFull) to the
/// submitter rather than a silent `cancel()`.
pub trait CancellableTask: Send + 'static {
    /// Runs the task to completion. Invoked by exactly one worker (or, in threadless
    /// mode, the calling thread) after a successful dequeue.
    fn run(self: Box<Self>);

    /// Invoked instead of [`run`](Self::run) when the task is discarded without ever
    /// running: the queue was full or closed at submission time, or the executor drained
    /// its pending queue via `cancelPendingSchedules`/`shutdownNow`.
    fn cancel(self: Box<Self>);
}

/// Adapts any `Fn`-free closure into a [`CancellableTask`] whose `cancel` is a no-op,
/// for callers that want the cancellable-task ergonomics (e.g. to pass into
/// [`Job::Cancellable`] directly) without writing out a struct.
struct NoCancel<F>(F);

impl<F> CancellableTask for NoCancel<F>
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) { (self.0)(); }

    fn cancel(self: Box<Self>) {}
}

/// The one shape the pending queue and workers move around: either a plain runnable (no
/// cancellation hook - rejection is reported to the submitter as an error) or a
/// [`CancellableTask`] (rejection invokes `cancel()` instead of raising).
///
/// This is the sum-type encoding of §4's "dynamic dispatch over task shapes" design
/// note: rather than give plain runnables a fake `cancel()` that callers might
/// accidentally rely on, the two shapes are distinguished in the type itself, and
/// [`PendingQueue`](crate::queue::PendingQueue) and
/// [`Worker`](crate::worker::Worker) branch on it explicitly.
pub enum Job {
    /// A runnable with no cancellation hook. If this can't be enqueued, the submitter
    /// gets an error rather than a silent drop.
    Plain(Box<dyn FnOnce() + Send + 'static>),
    /// A task that wants to know if it was dropped instead of run.
    Cancellable(Box<dyn CancellableTask>),
}

impl Job {
    /// Wraps a plain closure as a [`Job::Plain`].
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Job::Plain(Box::new(f))
    }

    /// Wraps a [`CancellableTask`] as a [`Job::Cancellable`].
    pub fn from_cancellable<T>(task: T) -> Self
    where
        T: CancellableTask,
    {
        Job::Cancellable(Box::new(task))
    }

    /// Wraps a closure as a [`Job::Cancellable`] whose `cancel` does nothing. Useful
    /// when a caller wants rejected submissions to be silently dropped rather than
    /// raised as an error, without writing out a [`CancellableTask`] impl.
    pub fn from_fn_cancellable<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Job::Cancellable(Box::new(NoCancel(f)))
    }

    /// True for [`Job::Cancellable`]. Drives the rejection policy in
    /// [`FixedThreadExecutor::execute`](crate::executor::FixedThreadExecutor::execute):
    /// cancellable jobs are cancelled on rejection, plain ones raise.
    #[must_use]
    pub fn is_cancellable(&self) -> bool { matches!(self, Job::Cancellable(_)) }

    /// Invokes the task's normal execution path.
    pub fn run(self) {
        match self {
            Job::Plain(f) => f(),
            Job::Cancellable(t) => t.run(),
        }
    }

    /// Invokes the task's cancellation path. A no-op for [`Job::Plain`] - callers that
    /// need to know about rejection should use [`Job::Cancellable`] instead.
    pub fn cancel(self) {
        if let Job::Cancellable(t) = self {
            t.cancel();
        }
    }
}
