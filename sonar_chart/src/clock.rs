// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time sources.

use core::cell::Cell;

use crate::types::Tick;

/// Source of the current [`Tick`].
///
/// Any `Fn() -> Tick` closure is a clock, so a host can pass its platform
/// millisecond counter directly.
pub trait Clock {
    /// Returns the current tick.
    fn now(&self) -> Tick;
}

impl<F> Clock for F
where
    F: Fn() -> Tick,
{
    fn now(&self) -> Tick {
        self()
    }
}

/// A clock that only moves when told to.
///
/// ```
/// use sonar_chart::{Clock, ManualClock};
///
/// let clock = ManualClock::new(100);
/// clock.advance(50);
/// assert_eq!(clock.now(), 150);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Cell<Tick>,
}

impl ManualClock {
    /// Creates a clock reading `now`.
    #[must_use]
    pub const fn new(now: Tick) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: Tick) {
        self.now.set(now);
    }

    /// Moves the clock forward by `ticks`, wrapping like the hardware counter.
    pub fn advance(&self, ticks: Tick) {
        self.now.set(self.now.get().wrapping_add(ticks));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Tick {
        self.now.get()
    }
}
