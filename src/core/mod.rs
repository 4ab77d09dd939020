// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Small, dependency-light utilities shared by the executor and parallelizer: the
//! ambient logging setup ([`log`]) and the global [`miette`] report handler
//! ([`common`]) the donor crate wires up the same way regardless of which subsystem is
//! in scope.

pub mod common;
pub mod log;
