// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Cooperative interrupt flags for the current thread.
//!
//! The source this crate's behavior is modeled on expresses "interrupt a worker" in
//! terms of a native OS thread interrupt flag, and expects [`Thread::isInterrupted`]-like
//! semantics: any thread can flip another thread's flag, the target observes it at its
//! next cancellation point, and a caller's own flag survives calls it makes into the
//! executor.
//!
//! Rust's standard library has no equivalent to a native thread interrupt flag, so this
//! module reimplements the same observable contract with a thread-local
//! [`AtomicBool`] per thread, registered so that *other* threads can flip it:
//!
//! - Every thread lazily owns one [`Arc<AtomicBool>`] the first time it touches this
//!   module (via [`current()`]).
//! - [`set_on(handle, true)`] lets a caller (e.g. [`interrupt_workers`](crate::executor))
//!   flip a *different* thread's flag, given a handle obtained from that thread's
//!   [`current()`].
//! - [`is_current_set()`] / [`clear_current()`] are the self-service calls a task makes
//!   at its own cancellation points, mirroring `Thread.currentThread().isInterrupted()`.
//!
//! [`Thread::isInterrupted`]: https://docs.oracle.com/javase/8/docs/api/java/lang/Thread.html#isInterrupted--

use std::{cell::RefCell,
          rc::Rc,
          sync::{Arc, atomic::{AtomicBool, Ordering}}};

/// A cloneable, externally-settable handle to one thread's interrupt flag.
///
/// Obtained via [`current()`]. Cloning and sending a [`InterruptHandle`] to another
/// thread (e.g. storing it in a worker registry) is how that other thread is later able
/// to flip the flag with [`set_on`].
#[derive(Debug, Clone)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    #[must_use]
    pub fn is_set(&self) -> bool { self.0.load(Ordering::SeqCst) }

    pub fn set(&self, value: bool) { self.0.store(value, Ordering::SeqCst); }
}

thread_local! {
    static CURRENT: RefCell<Rc<InterruptHandle>> =
        RefCell::new(Rc::new(InterruptHandle(Arc::new(AtomicBool::new(false)))));
}

/// Returns a handle to the calling thread's interrupt flag, creating it on first use.
///
/// Clone this and hand it to another thread (e.g. register it in the worker table) so
/// that thread can later call [`set_on`] to interrupt you.
#[must_use]
pub fn current() -> InterruptHandle {
    CURRENT.with(|cell| (*cell.borrow()).as_ref().clone())
}

/// Sets (or clears) a handle obtained from some thread's [`current()`] - possibly the
/// calling thread's own, possibly another thread's.
pub fn set_on(handle: &InterruptHandle, value: bool) { handle.set(value); }

/// Self-check: is the *calling* thread's interrupt flag currently set?
#[must_use]
pub fn is_current_set() -> bool { current().is_set() }

/// Self-service: sets the calling thread's own interrupt flag.
pub fn set_current(value: bool) { current().set(value); }

/// Clears the calling thread's own interrupt flag and returns the previous value.
///
/// Mirrors `Thread.interrupted()` (the static, self-clearing variant), used by code
/// that wants to consume a pending interrupt rather than merely observe it.
pub fn clear_current() -> bool {
    let handle = current();
    let was_set = handle.is_set();
    handle.set(false);
    was_set
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn current_thread_starts_uninterrupted() {
        assert!(!is_current_set());
    }

    #[test]
    fn set_and_clear_current_round_trips() {
        assert!(!is_current_set());
        set_current(true);
        assert!(is_current_set());
        assert!(clear_current());
        assert!(!is_current_set());
        assert!(!clear_current());
    }

    #[test]
    fn handles_are_thread_local_by_default() {
        set_current(true);
        let handle = thread::spawn(|| is_current_set()).join().unwrap();
        assert!(!handle, "a fresh thread must not inherit another thread's flag");
    }

    #[test]
    fn external_thread_can_flip_a_registered_handle() {
        let (tx, rx) = std::sync::mpsc::channel();
        let worker = thread::spawn(move || {
            tx.send(current()).unwrap();
            // Park until the main thread has had a chance to interrupt us.
            while !is_current_set() {
                thread::yield_now();
            }
        });
        let handle = rx.recv().unwrap();
        set_on(&handle, true);
        worker.join().unwrap();
    }
}
