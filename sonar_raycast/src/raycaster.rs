// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The raycaster: casting rays and patterns with adaptive quality.

use core::fmt;

use tracing::{debug, trace};

use crate::direction::{Direction, DirectionCache, FIXED_POINT_SCALE};
use crate::pattern::{DEFAULT_MAX_RADIUS, MAX_PATTERN_DIRECTIONS, PatternKind, Patterns, RayPattern};
use crate::stepper::LineStepper;

/// Monotonic millisecond tick counter, compared with wrapping subtraction.
pub type Tick = u32;

/// Coarsest quality level.
pub const MAX_QUALITY_LEVEL: u8 = 3;

/// Decides whether a world cell blocks a ray.
///
/// Implemented for every `Fn(i16, i16) -> bool`.
pub trait CollisionPredicate {
    /// Returns `true` if `(x, y)` is terrain.
    fn is_blocked(&self, x: i16, y: i16) -> bool;
}

impl<F> CollisionPredicate for F
where
    F: Fn(i16, i16) -> bool,
{
    fn is_blocked(&self, x: i16, y: i16) -> bool {
        self(x, y)
    }
}

/// Outcome of one ray.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RayResult {
    /// X of the terrain cell hit, or of the last cell reached.
    pub hit_x: i16,
    /// Y of the terrain cell hit, or of the last cell reached.
    pub hit_y: i16,
    /// Cells walked from the origin, the origin itself excluded.
    pub distance: u16,
    /// Whether the ray stopped on terrain.
    pub hit_terrain: bool,
    /// Whether the ray was cast at all. Rays skipped by the adaptive stride
    /// are incomplete and sit at the origin.
    pub complete: bool,
}

impl RayResult {
    fn skipped(origin: (i16, i16)) -> Self {
        Self {
            hit_x: origin.0,
            hit_y: origin.1,
            ..Self::default()
        }
    }
}

/// One [`RayResult`] per direction of a pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PatternScan {
    results: [RayResult; MAX_PATTERN_DIRECTIONS],
    len: usize,
    hits: usize,
}

impl PatternScan {
    fn push(&mut self, result: RayResult) {
        if let Some(slot) = self.results.get_mut(self.len) {
            *slot = result;
            self.len += 1;
            self.hits += usize::from(result.hit_terrain);
        }
    }

    /// Results in pattern order, skipped rays included.
    #[must_use]
    pub fn results(&self) -> &[RayResult] {
        &self.results[..self.len]
    }

    /// Results of the rays actually cast.
    pub fn completed(&self) -> impl Iterator<Item = &RayResult> + '_ {
        self.results().iter().filter(|result| result.complete)
    }

    /// Number of rays that stopped on terrain.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of results, skipped rays included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the pattern had no directions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for PatternScan {
    fn default() -> Self {
        Self {
            results: [RayResult::default(); MAX_PATTERN_DIRECTIONS],
            len: 0,
            hits: 0,
        }
    }
}

/// Raycaster parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RaycasterConfig {
    /// Reach of the full and forward patterns; the sparse pattern gets half.
    pub max_distance: u16,
    /// Frame budget in milliseconds at quality level 0. Each coarser level
    /// halves it, down to 1.
    pub base_budget: u32,
    /// Quality level after construction.
    pub initial_quality: u8,
    /// Minimum ticks between two performance checks.
    pub check_interval: Tick,
}

impl RaycasterConfig {
    /// Sets [`max_distance`](Self::max_distance).
    #[must_use]
    pub const fn with_max_distance(mut self, max_distance: u16) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Sets [`base_budget`](Self::base_budget).
    #[must_use]
    pub const fn with_base_budget(mut self, budget: u32) -> Self {
        self.base_budget = budget;
        self
    }

    /// Sets [`initial_quality`](Self::initial_quality).
    #[must_use]
    pub const fn with_initial_quality(mut self, level: u8) -> Self {
        self.initial_quality = level;
        self
    }

    /// Sets [`check_interval`](Self::check_interval).
    #[must_use]
    pub const fn with_check_interval(mut self, interval: Tick) -> Self {
        self.check_interval = interval;
        self
    }
}

impl Default for RaycasterConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_RADIUS,
            base_budget: 5,
            initial_quality: 1,
            check_interval: 1_000,
        }
    }
}

/// Counters accumulated by a [`Raycaster`] since the last reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RayStats {
    /// Rays cast to completion.
    pub rays_cast: usize,
    /// Cells handed to the collision predicate.
    pub cells_visited: usize,
    /// Rays that stopped on terrain.
    pub terrain_hits: usize,
    /// Patterns cast.
    pub patterns_cast: usize,
    /// Pattern directions skipped by the adaptive stride.
    pub rays_skipped: usize,
}

/// Casts rays from an origin against a [`CollisionPredicate`].
///
/// Owns the direction table and the canonical patterns, and trades pattern
/// density for time through a quality level from 0 (finest) to
/// [`MAX_QUALITY_LEVEL`] (coarsest).
pub struct Raycaster {
    config: RaycasterConfig,
    cache: DirectionCache,
    patterns: Patterns,
    quality: u8,
    budget: u32,
    last_check: Option<Tick>,
    stats: RayStats,
}

impl Raycaster {
    /// Creates a raycaster, building the direction table and patterns.
    #[must_use]
    pub fn new(config: RaycasterConfig) -> Self {
        let cache = DirectionCache::new();
        let patterns = Patterns::new(&cache, config.max_distance);
        let mut raycaster = Self {
            config,
            cache,
            patterns,
            quality: 0,
            budget: config.base_budget,
            last_check: None,
            stats: RayStats::default(),
        };
        raycaster.set_quality_level(config.initial_quality);
        raycaster
    }

    /// The direction table.
    #[must_use]
    pub fn cache(&self) -> &DirectionCache {
        &self.cache
    }

    /// The configuration the raycaster was built with.
    #[must_use]
    pub fn config(&self) -> &RaycasterConfig {
        &self.config
    }

    /// Returns the canonical pattern of the given kind.
    #[must_use]
    pub fn pattern(&self, kind: PatternKind) -> &RayPattern {
        self.patterns.get(kind)
    }

    /// Casts one ray from `origin` towards `direction`, walking at most
    /// `max_distance` cells.
    ///
    /// The origin cell itself is never tested. The ray stops at the first cell
    /// the predicate reports as terrain; otherwise the result is the last cell
    /// reached, as open water.
    pub fn cast_ray<P>(
        &mut self,
        origin: (i16, i16),
        direction: Direction,
        max_distance: u16,
        predicate: &P,
    ) -> RayResult
    where
        P: CollisionPredicate + ?Sized,
    {
        cast_ray(&mut self.stats, origin, direction, max_distance, predicate)
    }

    /// Casts every direction of `pattern`, honouring the current stride.
    pub fn cast_pattern<P>(
        &mut self,
        pattern: &RayPattern,
        origin: (i16, i16),
        predicate: &P,
    ) -> PatternScan
    where
        P: CollisionPredicate + ?Sized,
    {
        let stride = self.stride();
        cast_pattern(&mut self.stats, stride, pattern, origin, predicate)
    }

    /// Casts the pattern chosen by [`adaptive_pattern`](Self::adaptive_pattern).
    pub fn cast_adaptive<P>(
        &mut self,
        origin: (i16, i16),
        prefer_performance: bool,
        predicate: &P,
    ) -> PatternScan
    where
        P: CollisionPredicate + ?Sized,
    {
        let stride = self.stride();
        let pattern = self.patterns.get(self.adaptive_pattern_kind(prefer_performance));
        cast_pattern(&mut self.stats, stride, pattern, origin, predicate)
    }

    /// Current quality level, 0 (finest) to [`MAX_QUALITY_LEVEL`].
    #[must_use]
    pub fn quality_level(&self) -> u8 {
        self.quality
    }

    /// Frame budget in milliseconds for the current quality level.
    #[must_use]
    pub fn frame_budget(&self) -> u32 {
        self.budget
    }

    /// Sets the quality level, clamped to [`MAX_QUALITY_LEVEL`], and halves the
    /// base budget once per level.
    pub fn set_quality_level(&mut self, level: u8) {
        self.quality = level.min(MAX_QUALITY_LEVEL);
        self.budget = self
            .config
            .base_budget
            .checked_shr(u32::from(self.quality))
            .unwrap_or(0)
            .max(1);
    }

    /// Pattern kind for the current quality level.
    ///
    /// Level 0 uses the full circle, or the forward arc when
    /// `prefer_performance` is set. Level 1 uses the forward arc and the
    /// coarser levels the sparse circle.
    #[must_use]
    pub fn adaptive_pattern_kind(&self, prefer_performance: bool) -> PatternKind {
        match self.quality {
            0 if prefer_performance => PatternKind::Forward,
            0 => PatternKind::Full,
            1 => PatternKind::Forward,
            _ => PatternKind::Sparse,
        }
    }

    /// Pattern for the current quality level.
    #[must_use]
    pub fn adaptive_pattern(&self, prefer_performance: bool) -> &RayPattern {
        self.patterns.get(self.adaptive_pattern_kind(prefer_performance))
    }

    /// Step between cast directions: 2 at the coarsest level, otherwise 1.
    #[must_use]
    pub fn stride(&self) -> usize {
        if self.quality >= MAX_QUALITY_LEVEL { 2 } else { 1 }
    }

    /// Adjusts the quality level from the duration of the frame that started
    /// at `frame_start` and ends at `now`.
    ///
    /// Checks run at most once per [`RaycasterConfig::check_interval`]; the
    /// first call always checks. A frame longer than twice the budget makes
    /// quality one level coarser; one shorter than half the budget makes it
    /// one level finer. Returns the new level when it changed.
    pub fn update_performance(&mut self, frame_start: Tick, now: Tick) -> Option<u8> {
        if let Some(last) = self.last_check
            && now.wrapping_sub(last) < self.config.check_interval
        {
            return None;
        }
        self.last_check = Some(now);

        // A frame start after `now` is a zero-length frame, not a wrapped one.
        let elapsed = match now.wrapping_sub(frame_start) {
            wrapped if wrapped > Tick::MAX / 2 => 0,
            elapsed => elapsed,
        };
        let level = if elapsed > self.budget.saturating_mul(2) && self.quality < MAX_QUALITY_LEVEL {
            self.quality + 1
        } else if elapsed.saturating_mul(2) < self.budget && self.quality > 0 {
            self.quality - 1
        } else {
            return None;
        };
        let budget = self.budget;
        self.set_quality_level(level);
        debug!(level, elapsed, budget, "raycast quality changed");
        Some(level)
    }

    /// Counters accumulated since the last reset.
    #[must_use]
    pub fn stats(&self) -> RayStats {
        self.stats
    }

    /// Resets the counters, returning their previous values.
    pub fn take_stats(&mut self) -> RayStats {
        core::mem::take(&mut self.stats)
    }

    /// Emits the counters at debug level and resets them.
    pub fn log_stats(&mut self) -> RayStats {
        let stats = self.take_stats();
        debug!(
            rays_cast = stats.rays_cast,
            cells_visited = stats.cells_visited,
            terrain_hits = stats.terrain_hits,
            patterns_cast = stats.patterns_cast,
            rays_skipped = stats.rays_skipped,
            quality = self.quality,
            "raycast stats"
        );
        stats
    }
}

impl Default for Raycaster {
    fn default() -> Self {
        Self::new(RaycasterConfig::default())
    }
}

impl fmt::Debug for Raycaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raycaster")
            .field("config", &self.config)
            .field("quality", &self.quality)
            .field("budget", &self.budget)
            .field("last_check", &self.last_check)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the end point is clamped to the i16 range first"
)]
fn ray_end(origin: i16, component: i16, max_distance: u16) -> i16 {
    let offset = i32::from(component) * i32::from(max_distance) / FIXED_POINT_SCALE;
    (i32::from(origin) + offset).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn cast_ray<P>(
    stats: &mut RayStats,
    origin: (i16, i16),
    direction: Direction,
    max_distance: u16,
    predicate: &P,
) -> RayResult
where
    P: CollisionPredicate + ?Sized,
{
    let end = (
        ray_end(origin.0, direction.dx, max_distance),
        ray_end(origin.1, direction.dy, max_distance),
    );
    let mut result = RayResult {
        hit_x: origin.0,
        hit_y: origin.1,
        distance: 0,
        hit_terrain: false,
        complete: true,
    };
    stats.rays_cast += 1;

    for (x, y) in LineStepper::new(origin, end)
        .skip(1)
        .take(usize::from(max_distance))
    {
        stats.cells_visited += 1;
        result.hit_x = x;
        result.hit_y = y;
        result.distance += 1;
        if predicate.is_blocked(x, y) {
            result.hit_terrain = true;
            stats.terrain_hits += 1;
            break;
        }
    }
    trace!(
        x = result.hit_x,
        y = result.hit_y,
        distance = result.distance,
        terrain = result.hit_terrain,
        "ray complete"
    );
    result
}

fn cast_pattern<P>(
    stats: &mut RayStats,
    stride: usize,
    pattern: &RayPattern,
    origin: (i16, i16),
    predicate: &P,
) -> PatternScan
where
    P: CollisionPredicate + ?Sized,
{
    let mut scan = PatternScan::default();
    for (i, &direction) in pattern.directions().iter().enumerate() {
        let result = if i % stride == 0 {
            cast_ray(stats, origin, direction, pattern.max_radius(), predicate)
        } else {
            stats.rays_skipped += 1;
            RayResult::skipped(origin)
        };
        scan.push(result);
    }
    stats.patterns_cast += 1;
    trace!(directions = scan.len(), hits = scan.hits(), stride, "pattern cast");
    scan
}
