// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Cooperatively polled deferred-action timers.
//!
//! A [`Timer`] tracks one deferred or periodic action against a wrapping
//! tick source. Nothing happens in the background: expiry is only ever
//! detected when a timer is queried, either directly (`is_stopped()` and
//! friends) or by scanning the owning [`TimerSet`] with
//! [`TimerSet::poll`]. Queries are therefore side-effecting: asking an
//! overdue timer for its state transitions it to stopped (and, for
//! repeating timers, re-arms it) before answering.
//!
//! Timers are nodes in an intrusive list owned by their `TimerSet`,
//! mirroring the virtual-timer multiplexer pattern. A timer links itself
//! into the set the first time it is armed and stays linked for its
//! lifetime; whether it participates in polling is governed purely by its
//! state. In particular a paused timer remains linked but inert, so
//! resuming never pays a relink cost.
//!
//! Completion clients run synchronously on the caller's stack and may
//! re-enter the timer API, including arming a timer that has never been
//! linked: insertion only touches the list head, so an in-progress scan
//! is unaffected.
//!
//! Every operation is total. Calls that are invalid for the current state
//! (resuming a running timer, stopping a stopped one) are silent no-ops.

use core::cell::Cell;

use crate::collections::list::{List, ListLink, ListNode};
use crate::time::{Ticks, Time};

/// Externally visible state of a [`Timer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Running,
    Paused,
    Stopped,
}

/// Internal state. `Uninserted` is a timer that has never been armed and
/// so was never linked into its set's list; externally it reads as
/// `Stopped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Uninserted,
    Running,
    Paused,
    Stopped,
}

/// Client notified when a timer expires.
///
/// Invoked synchronously from whichever query or poll detected the
/// expiry. Must not block; may call back into the timer API.
pub trait TimerClient {
    fn fired(&self);
}

/// One deferred or periodic action.
pub struct Timer<'a, T: Time> {
    /// Owning set; also the route to the tick source, which is bound at
    /// construction and never changes.
    set: &'a TimerSet<'a, T>,
    /// Configured delay. May be zero, meaning "always already expired".
    interval: Cell<T::Ticks>,
    /// Tick at which the current interval began.
    reference: Cell<T::Ticks>,
    /// Elapsed time captured at pause; meaningful only while paused.
    banked: Cell<T::Ticks>,
    mode: Cell<Mode>,
    /// Whether expiry automatically re-arms, fixed at construction.
    repeat: bool,
    client: Cell<Option<&'a dyn TimerClient>>,
    /// Next timer in the set's list.
    next: ListLink<'a, Timer<'a, T>>,
}

impl<'a, T: Time> ListNode<'a, Timer<'a, T>> for Timer<'a, T> {
    fn next(&'a self) -> &'a ListLink<'a, Timer<'a, T>> {
        &self.next
    }
}

impl<'a, T: Time> Time for Timer<'a, T> {
    type Ticks = T::Ticks;

    fn now(&self) -> T::Ticks {
        self.set.clock.now()
    }
}

impl<'a, T: Time> Timer<'a, T> {
    /// Create a timer attached to `set`, initially stopped. Construction
    /// never links: a node has to be pinned by its final reference before
    /// it can enter the list, so arming is a separate call to
    /// [`Timer::start`].
    pub fn new(set: &'a TimerSet<'a, T>, interval: T::Ticks, repeat: bool) -> Timer<'a, T> {
        Timer {
            set,
            interval: Cell::new(interval),
            reference: Cell::new(set.clock.now()),
            banked: Cell::new(T::Ticks::from(0u32)),
            mode: Cell::new(Mode::Uninserted),
            repeat,
            client: Cell::new(None),
            next: ListLink::empty(),
        }
    }

    /// Arm the timer for a fresh interval starting now. `Some(interval)`
    /// replaces the configured delay first. Re-arming a timer that is
    /// already running just restarts its interval; it never double-links.
    pub fn start(&'a self, interval: Option<T::Ticks>) {
        if let Some(interval) = interval {
            self.interval.set(interval);
        }
        self.reference.set(self.now());
        self.arm();
    }

    /// Cancel the timer. No-op unless running or paused. If `notify` is
    /// set and a client is attached, the client fires synchronously.
    /// Cancellation never auto-repeats; only expiry does.
    pub fn stop(&'a self, notify: bool) {
        self.finish(notify, false);
    }

    /// Pause a running timer, banking the time elapsed so far. The timer
    /// stays linked in its set but is skipped by polling until resumed.
    /// Applies the lazy-expiry check first, so pausing an overdue timer
    /// expires it instead.
    pub fn pause(&'a self) {
        self.update();
        if self.mode.get() == Mode::Running {
            let now = self.now();
            self.banked.set(now.wrapping_sub(self.reference.get()));
            self.mode.set(Mode::Paused);
        }
    }

    /// Resume a paused timer with the banked elapsed time intact. No-op
    /// in any other state.
    pub fn resume(&self) {
        if self.mode.get() == Mode::Paused {
            let now = self.now();
            self.reference.set(now.wrapping_sub(self.banked.get()));
            self.mode.set(Mode::Running);
        }
    }

    /// Re-arm a stopped timer as if it had restarted itself the instant
    /// it last completed. No-op unless stopped.
    ///
    /// If the back-dated deadline is already in the past, each fully
    /// elapsed missed interval fires the client once (when `notify` is
    /// set) before the timer goes live again. A non-repeating timer gives
    /// up after the first missed interval: it fires once and stays
    /// stopped. `Some(interval)` applies a new delay to the re-armed
    /// intervals; the back-dating in step one uses the old one.
    ///
    /// Back-dating assumes the previous interval actually ran to
    /// completion. On a timer whose interval had not elapsed when it was
    /// stopped (or that was never armed at all), the moved reference
    /// lands beyond `now`; the wrapping elapsed-time check then reads
    /// the timer as overdue, so it arms but expires on its first query.
    pub fn again(&'a self, interval: Option<T::Ticks>, notify: bool) {
        match self.mode.get() {
            Mode::Running | Mode::Paused => return,
            Mode::Uninserted | Mode::Stopped => {}
        }
        let now = self.now();
        let next_interval = interval.unwrap_or_else(|| self.interval.get());
        // Move the reference to where it would be had the timer re-armed
        // itself the moment the previous interval completed.
        self.reference
            .set(self.reference.get().wrapping_add(self.interval.get()));
        self.interval.set(next_interval);
        // A zero interval would never close the gap; arm immediately and
        // let the next query observe the (permanent) expiry.
        if next_interval.into_u32() != 0 {
            while self
                .reference
                .get()
                .wrapping_add(next_interval)
                .before(now)
            {
                // Re-arming still leaves the deadline in the past.
                if notify {
                    self.client.get().map(|client| client.fired());
                }
                if !self.repeat {
                    return;
                }
                self.reference
                    .set(self.reference.get().wrapping_add(next_interval));
            }
        }
        self.arm();
    }

    /// Ticks left until expiry, negative once the deadline has passed
    /// without the timer being re-armed.
    pub fn remaining(&self) -> i32 {
        let elapsed = self.now().wrapping_sub(self.reference.get());
        self.interval.get().wrapping_sub(elapsed).into_u32() as i32
    }

    /// Current state, after applying the lazy-expiry check. This query
    /// (and the `is_*` predicates built on it) is how an overdue timer
    /// expires: a running timer past its deadline transitions to stopped,
    /// fires its client, and if repeating re-arms, all before answering.
    pub fn state(&'a self) -> State {
        self.update();
        match self.mode.get() {
            Mode::Running => State::Running,
            Mode::Paused => State::Paused,
            Mode::Uninserted | Mode::Stopped => State::Stopped,
        }
    }

    pub fn is_running(&'a self) -> bool {
        self.state() == State::Running
    }

    pub fn is_paused(&'a self) -> bool {
        self.state() == State::Paused
    }

    pub fn is_stopped(&'a self) -> bool {
        self.state() == State::Stopped
    }

    pub fn set_client(&self, client: &'a dyn TimerClient) {
        self.client.set(Some(client));
    }

    pub fn clear_client(&self) {
        self.client.set(None);
    }

    /// Replace the configured delay without touching the running
    /// interval; takes effect from the next arm or lazy-expiry check.
    pub fn set_interval(&self, interval: T::Ticks) {
        self.interval.set(interval);
    }

    pub fn interval(&self) -> T::Ticks {
        self.interval.get()
    }

    /// Lazy-expiry check: the sole expiry-detection mechanism. The
    /// elapsed-time test is wrapping subtraction, so it stays correct
    /// across the tick source's wrap point.
    fn update(&'a self) {
        if self.mode.get() == Mode::Running {
            let reference = self.reference.get();
            let deadline = reference.wrapping_add(self.interval.get());
            if !self.now().within_range(reference, deadline) {
                self.finish(true, true);
            }
        }
    }

    /// Shared stop/expiry transition. `reschedule` is set only on the
    /// expiry path, where a repeating timer immediately attempts the
    /// catch-up re-arm.
    fn finish(&'a self, notify: bool, reschedule: bool) {
        match self.mode.get() {
            Mode::Uninserted | Mode::Stopped => {}
            Mode::Running | Mode::Paused => {
                self.mode.set(Mode::Stopped);
                if notify {
                    self.client.get().map(|client| client.fired());
                }
                if reschedule && self.repeat {
                    self.again(None, true);
                }
            }
        }
    }

    /// Go live, linking into the set's list on first arming only.
    fn arm(&'a self) {
        if self.mode.get() == Mode::Uninserted {
            self.set.timers.push_head(self);
        }
        self.mode.set(Mode::Running);
    }
}

/// An owned set of timers sharing one tick source, scanned by
/// [`TimerSet::poll`]. Plays the role a global registry would otherwise:
/// every timer holds a reference to its set, and the set holds the head
/// of the intrusive timer list.
pub struct TimerSet<'a, T: Time> {
    timers: List<'a, Timer<'a, T>>,
    clock: &'a T,
}

impl<'a, T: Time> TimerSet<'a, T> {
    pub const fn new(clock: &'a T) -> TimerSet<'a, T> {
        TimerSet {
            timers: List::new(),
            clock,
        }
    }

    /// Report at most one freshly expired timer.
    ///
    /// Scans head to tail (reverse registration order), applying the
    /// lazy-expiry check to each running timer. The first timer the check
    /// leaves stopped — freshly expired and not re-armed — is returned
    /// immediately; repeating timers re-arm inside the check, fire their
    /// clients, and are never reported. With several timers expired at
    /// once, consecutive calls drain them one per call, then return
    /// `None`.
    pub fn poll(&self) -> Option<&'a Timer<'a, T>> {
        for timer in self.timers.iter() {
            if timer.mode.get() == Mode::Running {
                timer.update();
                if timer.mode.get() == Mode::Stopped {
                    return Some(timer);
                }
            }
        }
        None
    }
}

impl<'a, T: Time> Time for TimerSet<'a, T> {
    type Ticks = T::Ticks;

    fn now(&self) -> T::Ticks {
        self.clock.now()
    }
}
