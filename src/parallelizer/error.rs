// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Errors from [`Parallelizer::execute`](super::Parallelizer::execute).

/// The first error observed anywhere in a split tree, propagated to the root once every
/// dispatched sibling has finished (successfully or not). Later errors in the same tree
/// are logged and suppressed; only the first reaches the caller.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ParallelizerError {
    /// A task's `split()`, `run()`, or `merge()` panicked.
    #[error("a split/run/merge call panicked")]
    #[diagnostic(
        code(r3bl_executor::parallelizer_panic),
        help("Check the task's split/run/merge implementation for a panicking path.")
    )]
    TaskPanicked,

    /// Submitting the right half to the underlying executor failed (queue full, or not
    /// accepting).
    #[error("failed to submit the right half of a split to the executor")]
    #[diagnostic(code(r3bl_executor::parallelizer_submit_failed))]
    SubmitFailed(#[from] crate::executor::ExecutorError),
}
