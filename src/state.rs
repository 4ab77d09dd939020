// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Shared executor state: the three orthogonal lifecycle flags from §3 (`accepting`,
//! `processing`, `workersDeath`) plus the read-mostly worker counters. See
//! [`ExecutorState`] and [`Counters`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// The three lifecycle flags that gate submission and dequeue, plus the shutdown latch.
///
/// Modeled as independent [`AtomicBool`]s rather than one `Mutex<Flags>` struct: these
/// flags are read on every `execute()` and every worker dequeue iteration, often while
/// some other lock (the pending queue's mutex) is already held, and a second lock here
/// would be an unnecessary contention point with no corresponding benefit - none of the
/// three flags need to change atomically *together*.
#[derive(Debug, Default)]
pub struct ExecutorState {
    accepting: AtomicBool,
    processing: AtomicBool,
    workers_death_requested: AtomicBool,
}

impl ExecutorState {
    /// Starts with both `accepting` and `processing` on, matching [`start()`][Self] being
    /// implicit at construction in the common case.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accepting: AtomicBool::new(true),
            processing: AtomicBool::new(true),
            workers_death_requested: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_accepting(&self) -> bool { self.accepting.load(Ordering::SeqCst) }

    #[must_use]
    pub fn is_processing(&self) -> bool { self.processing.load(Ordering::SeqCst) }

    #[must_use]
    pub fn is_workers_death_requested(&self) -> bool {
        self.workers_death_requested.load(Ordering::SeqCst)
    }

    pub fn start_accepting(&self) {
        // `workersDeath=requested ⇒ accepting=off permanently` (§3): once shutdown has
        // been requested there is no path back to accepting new work.
        if !self.is_workers_death_requested() {
            self.accepting.store(true, Ordering::SeqCst);
        }
    }

    pub fn stop_accepting(&self) { self.accepting.store(false, Ordering::SeqCst); }

    pub fn start_processing(&self) { self.processing.store(true, Ordering::SeqCst); }

    pub fn stop_processing(&self) { self.processing.store(false, Ordering::SeqCst); }

    /// Sets `workersDeath = requested` and, per the §3 invariant, turns `accepting` off
    /// permanently. Idempotent.
    pub fn request_workers_death(&self) {
        self.workers_death_requested.store(true, Ordering::SeqCst);
        self.accepting.store(false, Ordering::SeqCst);
    }
}

/// Read-mostly snapshot counters (§4.3's `nbrRunning`, `nbrIdle`, `nbrWorking`). Backed
/// by [`AtomicUsize`] since every worker transition updates exactly one of these and
/// callers only ever want an eventually-consistent point-in-time read, never a value
/// observed under the same lock as some other field.
#[derive(Debug, Default)]
pub struct Counters {
    running: AtomicUsize,
    idle: AtomicUsize,
    working: AtomicUsize,
}

impl Counters {
    #[must_use]
    pub fn nbr_running(&self) -> usize { self.running.load(Ordering::SeqCst) }

    #[must_use]
    pub fn nbr_idle(&self) -> usize { self.idle.load(Ordering::SeqCst) }

    #[must_use]
    pub fn nbr_working(&self) -> usize { self.working.load(Ordering::SeqCst) }

    pub(crate) fn worker_started(&self) {
        self.running.fetch_add(1, Ordering::SeqCst);
        self.idle.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn worker_exited(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.idle.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn transition_idle_to_working(&self) {
        self.idle.fetch_sub(1, Ordering::SeqCst);
        self.working.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn transition_working_to_idle(&self) {
        self.working.fetch_sub(1, Ordering::SeqCst);
        self.idle.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_starts_accepting_and_processing_with_no_shutdown_requested() {
        let state = ExecutorState::new();
        assert!(state.is_accepting());
        assert!(state.is_processing());
        assert!(!state.is_workers_death_requested());
    }

    #[test]
    fn request_workers_death_turns_accepting_off_permanently() {
        let state = ExecutorState::new();
        state.request_workers_death();
        assert!(state.is_workers_death_requested());
        assert!(!state.is_accepting());
        state.start_accepting();
        assert!(!state.is_accepting(), "accepting must stay off after shutdown is requested");
    }

    #[test]
    fn counters_track_worker_lifecycle_transitions() {
        let counters = Counters::default();
        counters.worker_started();
        counters.worker_started();
        assert_eq!(counters.nbr_running(), 2);
        assert_eq!(counters.nbr_idle(), 2);
        assert_eq!(counters.nbr_working(), 0);

        counters.transition_idle_to_working();
        assert_eq!(counters.nbr_idle(), 1);
        assert_eq!(counters.nbr_working(), 1);

        counters.transition_working_to_idle();
        assert_eq!(counters.nbr_idle(), 2);
        assert_eq!(counters.nbr_working(), 0);

        counters.worker_exited();
        assert_eq!(counters.nbr_running(), 1);
    }
}
