// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The splittable task contract (C5): [`SplittableTask`].

/// A unit of divide-and-conquer work: tells the [`Parallelizer`](super::Parallelizer)
/// whether it's worth splitting further, can split itself into two independent halves,
/// and knows how to run its own (unsplit) base case.
///
/// [`merge`](Self::merge) has a no-op default so a task that only needs the
/// split/recurse/run shape (e.g. "apply this closure to every leaf") doesn't have to
/// write an empty body; override it for anything that combines two partial results (sums,
/// sorted merges, tree assembly).
pub trait SplittableTask: Send + 'static {
    /// Whether this task is large enough to be worth the overhead of splitting and
    /// dispatching half of it to the pool, versus just running it in place. Called once
    /// per frame, before [`split`](Self::split).
    #[must_use]
    fn worth_to_split(&self) -> bool;

    /// Splits `self` in place into two independent halves, returning the "right" half
    /// (which the parallelizer submits to the pool) and leaving `self` holding the "left"
    /// half (which the parallelizer recurses on locally, in the calling thread).
    ///
    /// Must only be called when [`worth_to_split`](Self::worth_to_split) returned `true`.
    fn split(&mut self) -> Self
    where
        Self: Sized;

    /// Runs this task's base case (`self` is not split any further). Called when
    /// [`worth_to_split`](Self::worth_to_split) returns `false`.
    fn run(&mut self);

    /// Combines `self` (the left half's now-completed result, held in place) with
    /// `right` (the right half's completed result, submitted to the pool and recursed
    /// back). The default no-op is correct for tasks whose only effect is a side effect
    /// performed during [`run`](Self::run) (e.g. writing into a shared output buffer by
    /// index) rather than a value that needs combining.
    fn merge(&mut self, right: Self)
    where
        Self: Sized,
    {
        let _ = right;
    }
}
