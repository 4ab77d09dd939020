// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The reentrant divide-and-conquer parallelizer (C6): [`Parallelizer`], built on top of
//! any [`Executor`](crate::executor::Executor).
//!
//! `execute()` recurses: while a task is worth splitting, the right half is submitted to
//! the pool and the left half is recursed on in the calling thread, then the two results
//! are merged. The one piece that isn't a standard fork-join is the wait for the right
//! half: a worker thread of the *same* pool that re-enters `execute()` (directly, or
//! because the task it's running itself calls back in) does not park and wait - it
//! steals and runs other queued jobs from the pool until the thing it's waiting on
//! completes. That's what keeps a saturated pool from deadlocking against itself when a
//! task recursively calls back into the parallelizer.

pub mod error;
pub mod task;

pub use error::ParallelizerError;
pub use task::SplittableTask;

use crate::{executor::Executor, task::Job};
use std::{panic::AssertUnwindSafe,
          sync::{Arc, Condvar, Mutex}};
use tracing::trace;

struct Slot<T> {
    result: Mutex<Option<Result<T, ParallelizerError>>>,
    cv: Condvar,
}

impl<T> Slot<T> {
    fn new() -> Self { Self { result: Mutex::new(None), cv: Condvar::new() } }

    fn complete(&self, value: Result<T, ParallelizerError>) {
        let mut guard = self.result.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(value);
        self.cv.notify_all();
    }

    fn is_done(&self) -> bool {
        self.result.lock().unwrap_or_else(std::sync::PoisonError::into_inner).is_some()
    }

    /// Non-blocking: returns the result only if it's already there.
    fn try_take(&self) -> Option<Result<T, ParallelizerError>> {
        self.result.lock().unwrap_or_else(std::sync::PoisonError::into_inner).take()
    }

    fn wait(&self) -> Result<T, ParallelizerError> {
        let mut guard = self.result.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            guard = self.cv.wait(guard).unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }
}

/// Constant added on top of `ceil(log2(parallelism))` when deriving a depth cap from
/// `parallelism` alone (`max_depth == 0`). A couple of extra levels lets the split tree
/// somewhat outgrow the worker count - useful when leaves are uneven in cost - without
/// being unbounded.
const DERIVED_MAX_DEPTH_SLACK: u32 = 2;

#[must_use]
fn derive_max_depth(parallelism: usize) -> u32 {
    let parallelism = parallelism.max(1);
    parallelism.next_power_of_two().trailing_zeros() + DERIVED_MAX_DEPTH_SLACK
}

/// Drives [`SplittableTask`] execution over an [`Executor`]. Cheap to clone - internally
/// just an `Arc` to the executor plus two `Copy` fields - so a task's `split()` half can
/// carry its own `Parallelizer` handle to recurse with (see [`Parallelizer::execute`]'s
/// `job` closure).
pub struct Parallelizer<E: Executor + ?Sized> {
    executor: Arc<E>,
    parallelism: usize,
    max_depth: u32,
}

impl<E: Executor + ?Sized> Clone for Parallelizer<E> {
    fn clone(&self) -> Self {
        Self { executor: self.executor.clone(), parallelism: self.parallelism, max_depth: self.max_depth }
    }
}

impl<E: Executor + ?Sized> Parallelizer<E> {
    /// `parallelism` is the target fan-out the split tree is shaped for (independent of
    /// the underlying executor's worker count - a caller may run a parallelism-8
    /// parallelizer over a 2-worker executor, accepting more queueing). `max_depth` caps
    /// how many split levels are taken regardless of what
    /// [`SplittableTask::worth_to_split`] says; pass `0` to derive it from `parallelism`
    /// as `ceil(log2(parallelism)) + 2`.
    #[must_use]
    pub fn new(executor: Arc<E>, parallelism: usize, max_depth: u32) -> Self {
        let max_depth = if max_depth == 0 { derive_max_depth(parallelism) } else { max_depth };
        Self { executor, parallelism: parallelism.max(1), max_depth }
    }

    #[must_use]
    pub fn parallelism(&self) -> usize { self.parallelism }

    #[must_use]
    pub fn max_depth(&self) -> u32 { self.max_depth }

    /// Runs `task` to completion, recursively splitting while
    /// [`SplittableTask::worth_to_split`] says to (and the depth cap hasn't been
    /// reached), and returns the fully merged task once it would run no differently if
    /// called again (i.e. its base case has completed and every split half has been
    /// merged back in).
    ///
    /// # Errors
    ///
    /// Returns [`ParallelizerError::TaskPanicked`] if any `split`/`run`/`merge` call
    /// panics, or [`ParallelizerError::SubmitFailed`] if the right half of a split
    /// couldn't be submitted to the executor. Per the first-error-wins rule, only the
    /// first error observed anywhere in the split tree is returned; the right half is
    /// always waited on to completion (successful or not) before this returns, so a
    /// failure never leaves orphaned work running against a task the caller believes has
    /// finished.
    pub fn execute<T>(&self, task: T) -> Result<T, ParallelizerError>
    where
        T: SplittableTask,
    {
        self.execute_inner(task, 0)
    }

    fn execute_inner<T>(&self, mut task: T, depth: u32) -> Result<T, ParallelizerError>
    where
        T: SplittableTask,
    {
        let worth_splitting = depth < self.max_depth && catch(AssertUnwindSafe(|| task.worth_to_split()))?;
        if !worth_splitting {
            catch(AssertUnwindSafe(|| task.run()))?;
            return Ok(task);
        }

        let right = catch(AssertUnwindSafe(|| task.split()))?;

        let slot = Arc::new(Slot::new());
        let slot_for_job = slot.clone();
        let this = self.clone();
        let job = Job::from_fn(move || {
            let result = this.execute_inner(right, depth + 1);
            slot_for_job.complete(result);
        });
        if let Err(source) = self.executor.execute(job) {
            return Err(ParallelizerError::SubmitFailed(source));
        }

        let left_result = self.execute_inner(task, depth + 1);
        let right_result = self.wait_for(&slot);

        match (left_result, right_result) {
            (Ok(mut left), Ok(right)) => {
                catch(AssertUnwindSafe(|| left.merge(right)))?;
                Ok(left)
            }
            (Err(first), _) | (_, Err(first)) => Err(first),
        }
    }

    /// Waits for `slot` to be filled. If the calling thread is one of this executor's
    /// workers, waiting cooperatively steals and runs other queued jobs instead of
    /// parking - the mechanism that prevents a reentrant split from deadlocking a
    /// saturated pool. An external (non-worker) caller just blocks on the slot's condvar.
    fn wait_for<T>(&self, slot: &Slot<T>) -> Result<T, ParallelizerError> {
        if !self.executor.is_worker_thread() {
            return slot.wait();
        }
        loop {
            if let Some(value) = slot.try_take() {
                return value;
            }
            match self.executor.steal() {
                Some(job) => {
                    trace!("cooperative wait: stealing a queued job instead of parking");
                    job.run();
                }
                None => std::thread::yield_now(),
            }
        }
    }
}

fn catch<F, R>(f: F) -> Result<R, ParallelizerError>
where
    F: FnOnce() -> R + std::panic::UnwindSafe,
{
    std::panic::catch_unwind(f).map_err(|_| ParallelizerError::TaskPanicked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutorConfig, FixedThreadExecutor};

    /// Splits a `[lo, hi)` range in half down to single elements, summing via `merge`.
    struct SumRange {
        lo: u64,
        hi: u64,
        result: u64,
    }

    impl SplittableTask for SumRange {
        fn worth_to_split(&self) -> bool { self.hi - self.lo > 1 }

        fn split(&mut self) -> Self {
            let mid = self.lo + (self.hi - self.lo) / 2;
            let right = SumRange { lo: mid, hi: self.hi, result: 0 };
            self.hi = mid;
            right
        }

        fn run(&mut self) { self.result = self.lo; }

        fn merge(&mut self, right: Self) { self.result += right.result; }
    }

    #[test]
    fn splits_and_merges_a_range_sum() {
        let executor = Arc::new(FixedThreadExecutor::new(ExecutorConfig::new(4, 256).unwrap()));
        executor.start().unwrap();
        let parallelizer = Parallelizer::new(executor.clone(), 4, 16);

        let result = parallelizer.execute(SumRange { lo: 0, hi: 100, result: 0 }).unwrap();
        assert_eq!(result.result, (0..100).sum::<u64>());
        executor.shutdown();
    }

    #[test]
    fn reentrant_split_from_inside_a_worker_does_not_deadlock_a_saturated_pool() {
        // One worker, saturated: the only way a right half ever runs is if the
        // calling-thread-is-worker wait steals it rather than parking forever.
        let executor = Arc::new(FixedThreadExecutor::new(ExecutorConfig::new(1, 256).unwrap()));
        executor.start().unwrap();
        let parallelizer = Parallelizer::new(executor.clone(), 4, 8);

        struct Reentrant<E: Executor + ?Sized> {
            depth: u32,
            parallelizer: Parallelizer<E>,
            result: u32,
        }
        impl<E: Executor + ?Sized + 'static> SplittableTask for Reentrant<E> {
            fn worth_to_split(&self) -> bool { self.depth > 0 }

            fn split(&mut self) -> Self {
                self.depth -= 1;
                Reentrant { depth: self.depth, parallelizer: self.parallelizer.clone(), result: 0 }
            }

            fn run(&mut self) { self.result = 1; }

            fn merge(&mut self, right: Self) { self.result += right.result; }
        }

        // Each level of depth calls back into the same parallelizer/executor, forcing
        // the single worker to re-enter execute() from inside itself.
        let task = Reentrant { depth: 5, parallelizer: parallelizer.clone(), result: 0 };
        let outer = Job::from_fn(move || {
            let result = parallelizer.execute(task).unwrap();
            assert_eq!(result.result, 32, "a full depth-5 split tree has 2^5 leaves");
        });
        executor.execute(outer).unwrap();

        // give the single worker time to finish; if it deadlocked this test would hang.
        std::thread::sleep(std::time::Duration::from_millis(200));
        executor.shutdown();
    }

    #[test]
    fn a_panic_in_run_is_reported_as_task_panicked() {
        struct Boom;
        impl SplittableTask for Boom {
            fn worth_to_split(&self) -> bool { false }

            fn split(&mut self) -> Self { unreachable!() }

            fn run(&mut self) { panic!("boom"); }
        }
        let executor = Arc::new(FixedThreadExecutor::new(ExecutorConfig::new(0, 8).unwrap()));
        let parallelizer = Parallelizer::new(executor, 4, 0);
        assert!(matches!(parallelizer.execute(Boom), Err(ParallelizerError::TaskPanicked)));
    }
}
