// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Worker-awareness (C7): `is_worker_thread`, `check_is_worker_thread`,
//! `check_is_not_worker_thread`.
//!
//! Keyed by [`ThreadId`] in a side table owned by each
//! [`FixedThreadExecutor`](super::FixedThreadExecutor) instance - deliberately *not* a
//! process-wide thread-local singleton, since a thread can be a worker of executor A and
//! simultaneously not a worker of executor B, and a process may run several independent
//! executors. See the crate's design notes on why per-executor beats per-process here.

use std::{collections::HashSet, sync::RwLock, thread::ThreadId};

/// The set of `ThreadId`s currently running as workers for one executor instance.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    members: RwLock<HashSet<ThreadId>>,
}

impl WorkerRegistry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub(super) fn register(&self, id: ThreadId) {
        self.members.write().unwrap_or_else(std::sync::PoisonError::into_inner).insert(id);
    }

    pub(super) fn deregister(&self, id: ThreadId) {
        self.members.write().unwrap_or_else(std::sync::PoisonError::into_inner).remove(&id);
    }

    #[must_use]
    pub fn contains(&self, id: ThreadId) -> bool {
        self.members.read().unwrap_or_else(std::sync::PoisonError::into_inner).contains(&id)
    }

    #[must_use]
    pub fn is_current_thread_member(&self) -> bool { self.contains(std::thread::current().id()) }
}

/// RAII guard that deregisters a thread from a [`WorkerRegistry`] on drop, so an early
/// return or panic inside a worker's run loop can't leave a stale registration behind.
pub struct RegistrationGuard<'a> {
    registry: &'a WorkerRegistry,
    id: ThreadId,
}

impl<'a> RegistrationGuard<'a> {
    #[must_use]
    pub fn new(registry: &'a WorkerRegistry) -> Self {
        let id = std::thread::current().id();
        registry.register(id);
        Self { registry, id }
    }
}

impl Drop for RegistrationGuard<'_> {
    fn drop(&mut self) { self.registry.deregister(self.id); }
}

/// Raised by `check_is_worker_thread` / `check_is_not_worker_thread` when the calling
/// thread fails the check - used by code with invariants like "must be called from a
/// worker" (e.g. the parallelizer's cooperative steal path) or "must never be called from
/// a worker" (e.g. a blocking `shutdown()` that would deadlock a pool against itself).
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum WorkerAwarenessError {
    #[error("this call requires the current thread to be a worker of this executor")]
    #[diagnostic(
        code(r3bl_executor::expected_worker_thread),
        help("Call this from inside a submitted task, or use the non-checked variant.")
    )]
    ExpectedWorkerThread,

    #[error("this call must not be made from a worker thread of this executor")]
    #[diagnostic(
        code(r3bl_executor::expected_non_worker_thread),
        help(
            "Calling this from a worker thread of the same pool it targets can deadlock \
             the pool against itself; call it from an external thread instead."
        )
    )]
    ExpectedNonWorkerThread,
}
