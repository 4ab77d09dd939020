// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # r3bl_executor
//!
//! The fixed-thread task executor and reentrant divide-and-conquer parallelizer that
//! sit underneath a desktop windowing toolkit's GUI layer (native SDL2 bindings, font
//! handling, pixel format conversion, event dispatch - all of which are thin adapters
//! over platform libraries and live outside this crate). This crate provides only the
//! two pieces that are hard to get right:
//!
//! 1. A fixed-size worker pool ([`executor`]) whose `accepting`, `processing`, and
//!    shutdown lifecycle are each independently controllable, whose tasks are
//!    cancellable, and which can also run with zero background threads (the caller
//!    becomes the sole worker).
//! 2. A recursive split/merge parallelizer ([`parallelizer`]) built on top of any
//!    [`Executor`](executor::Executor), which may be re-entered from inside a worker
//!    thread of the same pool - and which cooperates instead of blocking in that case,
//!    by stealing and running other queued work until the thing it's waiting on
//!    completes. That's the mechanism that keeps reentrant splits from deadlocking a
//!    saturated pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  caller                                                             │
//! │    │                                                                │
//! │    ▼                                                                │
//! │  Parallelizer::execute(task) ──splits──► left (local) + right (pool)│
//! │    │                                          │            │        │
//! │    │                                          ▼            ▼        │
//! │    │                                  runs on caller   Worker N    │
//! │    │                                          │            │        │
//! │    └──────────────── merge(left, right) ◄─────┴────────────┘        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Layout
//!
//! - [`task`]: the task contract (C1) - plain runnables and cancellable tasks.
//! - [`queue`]: the bounded pending-task queue (C2), in a basic (mutex + condvar) and
//!   advanced (lock-free fast path, blocking backpressure path) flavor.
//! - [`worker`]: the worker state machine (C3) that drains the queue.
//! - [`executor`]: the public [`FixedThreadExecutor`](executor::FixedThreadExecutor)
//!   facade (C4), its configuration, counters, errors, and worker-awareness queries
//!   (C7).
//! - [`parallelizer`]: the splittable task contract (C5) and the
//!   [`Parallelizer`](parallelizer::Parallelizer) driver (C6).
//! - [`core`]: ambient logging ([`core::log::TracingConfig`]) and the global
//!   [`miette`] report handler ([`core::common::setup_default_miette_global_report_handler`]),
//!   shared by the executor and parallelizer rather than duplicated per subsystem.
//!
//! ## Non-goals
//!
//! GUI rendering, font metrics, image decoding, input event translation, pixel-format
//! conversion, and screen/window management are out of scope for this crate; they are
//! external consumers of [`Executor`](executor::Executor) that live in the toolkit's GUI
//! layer.

pub mod core;
pub mod executor;
pub mod interrupt;
pub mod parallelizer;
pub mod queue;
pub mod state;
pub mod task;
pub mod worker;

pub use executor::{ConfigError, Executor, ExecutorConfig, ExecutorError, FixedThreadExecutor,
                    config::{ThreadFactory, UncaughtExceptionHandler, default_thread_factory}};
pub use interrupt::InterruptHandle;
pub use parallelizer::{Parallelizer, ParallelizerError, SplittableTask};
pub use queue::{AdvancedQueue, BasicQueue, PendingQueue};
pub use task::{CancellableTask, Job};
