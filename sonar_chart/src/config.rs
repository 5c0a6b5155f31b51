// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart configuration.

use crate::types::{Bounds, Tick};

/// Sizing and timing parameters of a [`Chart`](crate::Chart).
///
/// The defaults match a small handheld device: 512 points, 128 quadtree nodes,
/// and points that take a minute to fade out completely.
///
/// ```
/// use sonar_chart::{Bounds, ChartConfig};
///
/// let config = ChartConfig::default()
///     .with_root_bounds(Bounds::new(-512, -512, 511, 511))
///     .with_point_capacity(1024);
/// assert_eq!(config.point_capacity, 1024);
/// assert_eq!(config.max_depth, 6);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChartConfig {
    /// Region covered by the chart. Discoveries outside it are rejected.
    pub root_bounds: Bounds,
    /// Deepest quadtree level; leaves at this depth never split.
    pub max_depth: u8,
    /// Fixed size of the quadtree node arena, root included.
    pub node_capacity: u16,
    /// Fixed size of the point store.
    pub point_capacity: u16,
    /// Ticks spent in each visible fade stage.
    pub fade_stage_duration: Tick,
    /// Minimum ticks between two fade sweeps.
    pub fade_interval: Tick,
}

impl ChartConfig {
    /// Sets [`root_bounds`](Self::root_bounds).
    #[must_use]
    pub const fn with_root_bounds(mut self, bounds: Bounds) -> Self {
        self.root_bounds = bounds;
        self
    }

    /// Sets [`max_depth`](Self::max_depth).
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets [`node_capacity`](Self::node_capacity).
    #[must_use]
    pub const fn with_node_capacity(mut self, capacity: u16) -> Self {
        self.node_capacity = capacity;
        self
    }

    /// Sets [`point_capacity`](Self::point_capacity).
    #[must_use]
    pub const fn with_point_capacity(mut self, capacity: u16) -> Self {
        self.point_capacity = capacity;
        self
    }

    /// Sets [`fade_stage_duration`](Self::fade_stage_duration).
    #[must_use]
    pub const fn with_fade_stage_duration(mut self, duration: Tick) -> Self {
        self.fade_stage_duration = duration;
        self
    }

    /// Sets [`fade_interval`](Self::fade_interval).
    #[must_use]
    pub const fn with_fade_interval(mut self, interval: Tick) -> Self {
        self.fade_interval = interval;
        self
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            root_bounds: Bounds::FULL,
            max_depth: 6,
            node_capacity: 128,
            point_capacity: 512,
            fade_stage_duration: 15_000,
            fade_interval: 1_000,
        }
    }
}
