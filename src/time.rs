// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Traits for tick sources and wrapping tick arithmetic.
//!
//! A tick source is any monotonically non-decreasing counter that wraps
//! around at the maximum value of its width. All arithmetic on ticks is
//! therefore modular; comparisons between two tick values infer sign from
//! the wrapping difference and are only meaningful when the real distance
//! between the two values is less than half the tick range.

use core::cmp::Ordering;

/// A fixed-width tick count with wrapping arithmetic.
pub trait Ticks: Clone + Copy + PartialEq + Eq + From<u32> {
    /// Widen to `u32`, zero-extending if the tick width is narrower.
    fn into_u32(self) -> u32;

    /// The value at which the tick source wraps back to zero.
    fn max_value() -> Self;

    fn wrapping_add(self, other: Self) -> Self;

    fn wrapping_sub(self, other: Self) -> Self;

    /// Whether `self` lies in the half-open wrapping interval
    /// `[start, end)`.
    ///
    /// The interval is interpreted as starting at `start` and extending
    /// `end - start` ticks, so `start == end` denotes the empty interval,
    /// not the full range.
    fn within_range(self, start: Self, end: Self) -> bool {
        self.wrapping_sub(start).into_u32() < end.wrapping_sub(start).into_u32()
    }

    /// Order `self` relative to `other` on the wrapping tick circle.
    ///
    /// Computes the wrapping difference and tests it against half the
    /// representable range to infer its sign; the result is meaningful
    /// only when the two values are less than half the range apart.
    fn wrapping_cmp(self, other: Self) -> Ordering {
        let diff = self.wrapping_sub(other).into_u32();
        if diff == 0 {
            Ordering::Equal
        } else if diff > Self::max_value().into_u32() >> 1 {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    /// True if `self` is strictly before `other`, under the same
    /// half-range interpretation as [`Ticks::wrapping_cmp`].
    fn before(self, other: Self) -> bool {
        self.wrapping_cmp(other) == Ordering::Less
    }
}

/// 32-bit tick value, wrapping at `u32::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticks32(u32);

impl From<u32> for Ticks32 {
    fn from(val: u32) -> Self {
        Ticks32(val)
    }
}

impl Ticks for Ticks32 {
    fn into_u32(self) -> u32 {
        self.0
    }

    fn max_value() -> Self {
        Ticks32(u32::MAX)
    }

    fn wrapping_add(self, other: Self) -> Self {
        Ticks32(self.0.wrapping_add(other.0))
    }

    fn wrapping_sub(self, other: Self) -> Self {
        Ticks32(self.0.wrapping_sub(other.0))
    }
}

/// A source of the current time in ticks.
///
/// Implementations are expected to be monotonically non-decreasing except
/// for wraparound at `Ticks::max_value()`. Units are implementation
/// defined; milliseconds are conventional.
pub trait Time {
    type Ticks: Ticks;

    /// Returns the current tick count.
    fn now(&self) -> Self::Ticks;
}
