// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Cooperatively polled software timers for single-threaded control loops.
//!
//! This crate provides non-blocking deferred-action timers for
//! environments with no threads, interrupts, or blocking waits: a
//! [`TimerSet`] owns an intrusive list of [`Timer`]s sharing one wrapping
//! tick source, and a periodic [`TimerSet::poll`] from the control loop
//! surfaces timers that have newly expired. Expiry is evaluated lazily,
//! only when a timer is queried; completion clients run synchronously and
//! repeating timers catch up on missed intervals before going live again.
//!
//! Everything is `Cell`-based and `!Sync`: the crate assumes a single
//! logical thread of control and provides no locking.

#![no_std]

pub mod collections;
pub mod time;
pub mod timer;

pub use crate::time::{Ticks, Ticks32, Time};
pub use crate::timer::{State, Timer, TimerClient, TimerSet};
