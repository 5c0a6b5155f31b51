// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sonar ray patterns: fixed sets of directions cast together.

use core::f32::consts::{FRAC_PI_2, TAU};

use crate::direction::{ANGLE_RESOLUTION, Direction, DirectionCache};

/// Maximum number of directions in a [`RayPattern`].
pub const MAX_PATTERN_DIRECTIONS: usize = 64;

/// Default reach of the full and forward patterns, in cells.
pub const DEFAULT_MAX_RADIUS: u16 = 48;

/// Angles within this many cache steps of an entry use the cached direction.
const CACHE_SNAP: f32 = 1.0e-3;

/// Tolerance for treating an angular span as a full turn.
const FULL_TURN_EPSILON: f32 = 1.0e-4;

/// An ordered set of at most [`MAX_PATTERN_DIRECTIONS`] directions sharing a
/// maximum radius.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RayPattern {
    directions: [Direction; MAX_PATTERN_DIRECTIONS],
    len: usize,
    max_radius: u16,
}

impl RayPattern {
    /// Spreads `count` directions over the arc from `start` to `end` radians.
    ///
    /// `count` is clamped to [`MAX_PATTERN_DIRECTIONS`]. The arc runs
    /// counterclockwise; an `end` before `start` wraps through zero. A full
    /// turn (or an empty arc with more than one direction) is divided into
    /// `count` equal steps so no direction repeats; a partial arc includes
    /// both endpoints.
    ///
    /// ```
    /// use core::f32::consts::PI;
    /// use sonar_raycast::{DirectionCache, RayPattern};
    ///
    /// let cache = DirectionCache::new();
    /// let arc = RayPattern::arc(&cache, 0.0, PI, 3, 10);
    /// let ids: Vec<_> = arc.directions().iter().map(|d| d.angle_id).collect();
    /// assert_eq!(ids, [0, 64, 128]);
    /// ```
    #[must_use]
    pub fn arc(
        cache: &DirectionCache,
        start: f32,
        end: f32,
        count: usize,
        max_radius: u16,
    ) -> Self {
        let count = count.min(MAX_PATTERN_DIRECTIONS);
        let mut span = end - start;
        if span < 0.0 {
            span += TAU;
        }
        let full_turn = span >= TAU - FULL_TURN_EPSILON || (span <= FULL_TURN_EPSILON && count > 1);
        let step = if full_turn {
            TAU / count as f32
        } else if count > 1 {
            span / (count - 1) as f32
        } else {
            0.0
        };

        let mut pattern = Self::empty(max_radius);
        for i in 0..count {
            pattern.push(direction_for(cache, normalize(start + step * i as f32)));
        }
        pattern
    }

    /// Full circle: 32 directions reaching [`DEFAULT_MAX_RADIUS`].
    #[must_use]
    pub fn full(cache: &DirectionCache) -> Self {
        Self::arc(cache, 0.0, TAU, 32, DEFAULT_MAX_RADIUS)
    }

    /// Forward half circle, centred on +x: 16 directions reaching
    /// [`DEFAULT_MAX_RADIUS`].
    #[must_use]
    pub fn forward(cache: &DirectionCache) -> Self {
        Self::arc(cache, -FRAC_PI_2, FRAC_PI_2, 16, DEFAULT_MAX_RADIUS)
    }

    /// Full circle at low density: 8 directions reaching half the default radius.
    #[must_use]
    pub fn sparse(cache: &DirectionCache) -> Self {
        Self::arc(cache, 0.0, TAU, 8, DEFAULT_MAX_RADIUS / 2)
    }

    fn empty(max_radius: u16) -> Self {
        Self {
            directions: [Direction::default(); MAX_PATTERN_DIRECTIONS],
            len: 0,
            max_radius,
        }
    }

    fn push(&mut self, direction: Direction) {
        if let Some(slot) = self.directions.get_mut(self.len) {
            *slot = direction;
            self.len += 1;
        }
    }

    /// Returns the same directions with a different reach.
    #[must_use]
    pub fn with_max_radius(mut self, max_radius: u16) -> Self {
        self.max_radius = max_radius;
        self
    }

    /// Returns the pattern turned counterclockwise by `heading` radians.
    #[must_use]
    pub fn rotated(&self, cache: &DirectionCache, heading: f32) -> Self {
        let mut pattern = Self::empty(self.max_radius);
        for direction in self.directions() {
            pattern.push(direction_for(cache, normalize(direction.angle() + heading)));
        }
        pattern
    }

    /// The directions, in casting order.
    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.directions[..self.len]
    }

    /// Number of directions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the pattern has no directions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of cells each ray walks.
    #[must_use]
    pub fn max_radius(&self) -> u16 {
        self.max_radius
    }
}

fn normalize(angle: f32) -> f32 {
    let mut angle = libm::fmodf(angle, TAU);
    if angle < 0.0 {
        angle += TAU;
    }
    if angle >= TAU { angle - TAU } else { angle }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "snapped steps lie in 0..=ANGLE_RESOLUTION"
)]
fn direction_for(cache: &DirectionCache, angle: f32) -> Direction {
    let steps = angle / TAU * ANGLE_RESOLUTION as f32;
    let nearest = libm::roundf(steps);
    if libm::fabsf(steps - nearest) < CACHE_SNAP {
        cache.get(nearest as u16)
    } else {
        Direction::from_angle(angle)
    }
}

/// The three canonical patterns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// 32 directions around the full circle.
    Full,
    /// 16 directions over the forward half circle.
    Forward,
    /// 8 directions around the full circle at half reach.
    Sparse,
}

/// Storage for one pattern of each [`PatternKind`].
#[derive(Clone, Debug)]
pub struct Patterns {
    full: RayPattern,
    forward: RayPattern,
    sparse: RayPattern,
}

impl Patterns {
    /// Builds the canonical patterns with `max_radius` for the full and forward
    /// patterns and half of it for the sparse one.
    #[must_use]
    pub fn new(cache: &DirectionCache, max_radius: u16) -> Self {
        Self {
            full: RayPattern::full(cache).with_max_radius(max_radius),
            forward: RayPattern::forward(cache).with_max_radius(max_radius),
            sparse: RayPattern::sparse(cache).with_max_radius(max_radius / 2),
        }
    }

    /// Returns the pattern of the given kind.
    #[must_use]
    pub fn get(&self, kind: PatternKind) -> &RayPattern {
        match kind {
            PatternKind::Full => &self.full,
            PatternKind::Forward => &self.forward,
            PatternKind::Sparse => &self.sparse,
        }
    }
}
