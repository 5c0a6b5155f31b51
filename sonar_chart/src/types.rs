// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value types: ticks, bounds, fade stages and discovered points.

use crate::arena::Handle;

/// Monotonic millisecond tick counter.
///
/// Ages are computed with wrapping subtraction, so the counter may wrap.
pub type Tick = u32;

/// Handle of a [`DiscoveredPoint`] in a chart's point store.
pub type PointId = Handle<DiscoveredPoint>;

/// Inclusive axis-aligned rectangle in world units.
///
/// A rectangle with `min > max` on either axis is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    /// Smallest x coordinate inside the rectangle.
    pub min_x: i16,
    /// Smallest y coordinate inside the rectangle.
    pub min_y: i16,
    /// Largest x coordinate inside the rectangle.
    pub max_x: i16,
    /// Largest y coordinate inside the rectangle.
    pub max_y: i16,
}

impl Bounds {
    /// The whole representable plane.
    pub const FULL: Self = Self::new(i16::MIN, i16::MIN, i16::MAX, i16::MAX);

    /// Creates bounds from inclusive corners.
    #[must_use]
    pub const fn new(min_x: i16, min_y: i16, max_x: i16, max_y: i16) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates bounds covering the single cell `(x, y)`.
    #[must_use]
    pub const fn point(x: i16, y: i16) -> Self {
        Self::new(x, y, x, y)
    }

    /// Returns `true` if the rectangle contains no cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Number of columns covered (0 when empty).
    #[must_use]
    pub const fn width(&self) -> u32 {
        extent(self.min_x, self.max_x)
    }

    /// Number of rows covered (0 when empty).
    #[must_use]
    pub const fn height(&self) -> u32 {
        extent(self.min_y, self.max_y)
    }

    /// Returns `true` if `(x, y)` lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, x: i16, y: i16) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns `true` if the two rectangles share at least one cell.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Returns the split point `(mid_x, mid_y)` if both axes span at least two cells.
    ///
    /// The upper half of each axis starts at the midpoint, so the lower half is
    /// `min..=mid - 1` and the upper half `mid..=max`.
    #[must_use]
    pub fn midpoint(&self) -> Option<(i16, i16)> {
        Some((split(self.min_x, self.max_x)?, split(self.min_y, self.max_y)?))
    }

    /// Splits the rectangle into NW, NE, SW and SE quadrants that tile it exactly.
    ///
    /// Returns `None` when either axis is a single cell wide.
    #[must_use]
    pub fn quadrants(&self) -> Option<[Self; 4]> {
        let (mid_x, mid_y) = self.midpoint()?;
        Some([
            Self::new(self.min_x, self.min_y, mid_x - 1, mid_y - 1),
            Self::new(mid_x, self.min_y, self.max_x, mid_y - 1),
            Self::new(self.min_x, mid_y, mid_x - 1, self.max_y),
            Self::new(mid_x, mid_y, self.max_x, self.max_y),
        ])
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::FULL
    }
}

const fn extent(min: i16, max: i16) -> u32 {
    let span = max as i32 - min as i32;
    if span < 0 { 0 } else { span as u32 + 1 }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the midpoint lies between two i16 values"
)]
fn split(min: i16, max: i16) -> Option<i16> {
    let span = i32::from(max) - i32::from(min) + 1;
    (span >= 2).then(|| (i32::from(min) + span / 2) as i16)
}

/// Discrete aging bucket of a discovered point.
///
/// Stages are ordered: a point only ever moves towards [`FadeStage::Gone`]
/// until it is rediscovered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FadeStage {
    /// Freshly discovered.
    #[default]
    Full,
    /// First fade step.
    Bright,
    /// Second fade step.
    Dim,
    /// Last visible step.
    Faint,
    /// Fully faded; the point is evicted by the next sweep.
    Gone,
}

impl FadeStage {
    /// Number of visible stages before [`FadeStage::Gone`].
    pub const VISIBLE_STAGES: u32 = 4;

    /// Computes the stage of a point of the given `age`.
    ///
    /// Every visible stage lasts `stage_duration` ticks. A zero duration means
    /// points are gone as soon as they are swept.
    #[must_use]
    pub const fn from_age(age: Tick, stage_duration: Tick) -> Self {
        let stage = match age.checked_div(stage_duration) {
            Some(stage) => stage,
            None => Self::VISIBLE_STAGES,
        };
        match stage {
            0 => Self::Full,
            1 => Self::Bright,
            2 => Self::Dim,
            3 => Self::Faint,
            _ => Self::Gone,
        }
    }

    /// Drawing intensity for this stage, from 255 (`Full`) down to 0 (`Gone`).
    ///
    /// Non-increasing in the stage order.
    #[must_use]
    pub const fn opacity(self) -> u8 {
        match self {
            Self::Full => 255,
            Self::Bright => 192,
            Self::Dim => 128,
            Self::Faint => 64,
            Self::Gone => 0,
        }
    }
}

/// A discovered world cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiscoveredPoint {
    /// World x coordinate.
    pub x: i16,
    /// World y coordinate.
    pub y: i16,
    /// Tick of the most recent discovery.
    pub discovery_time: Tick,
    /// Stage recorded by the most recent fade sweep.
    pub fade_stage: FadeStage,
    /// Whether the cell was ever observed as terrain.
    pub is_terrain: bool,
}

impl DiscoveredPoint {
    /// Creates a freshly discovered point.
    #[must_use]
    pub const fn new(x: i16, y: i16, is_terrain: bool, now: Tick) -> Self {
        Self {
            x,
            y,
            discovery_time: now,
            fade_stage: FadeStage::Full,
            is_terrain,
        }
    }

    /// Computes the live fade stage at `now` without waiting for a sweep.
    #[must_use]
    pub const fn fade_stage_at(&self, now: Tick, stage_duration: Tick) -> FadeStage {
        FadeStage::from_age(age(now, self.discovery_time), stage_duration)
    }

    /// Records a rediscovery: refreshes the time, resets the fade and merges
    /// the terrain flag. Terrain is sticky: water never overrides it.
    pub fn rediscover(&mut self, is_terrain: bool, now: Tick) {
        self.discovery_time = now;
        self.fade_stage = FadeStage::Full;
        self.is_terrain |= is_terrain;
    }
}

/// Ticks elapsed from `since` to `now` across counter wrap.
///
/// A `now` up to half the counter range before `since` counts as age zero.
const fn age(now: Tick, since: Tick) -> Tick {
    let ticks = now.wrapping_sub(since);
    if ticks > Tick::MAX / 2 { 0 } else { ticks }
}
