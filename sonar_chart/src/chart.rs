// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart facade: deduplicating discovery, queries and fading.

use core::fmt;
use core::ops::ControlFlow;

use tracing::{debug, trace, warn};

use crate::arena::{Arena, Exhausted};
use crate::clock::Clock;
use crate::config::ChartConfig;
use crate::error::{ChartError, Pool, SubdivideError};
use crate::quadtree::{Placement, QuadTree, QueryReport};
use crate::types::{Bounds, DiscoveredPoint, FadeStage, PointId, Tick};

/// Result of a successful [`Chart::add_point`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Discovery {
    /// The cell was not charted before and now is.
    New,
    /// The cell was already charted; its time and fade were reset.
    Refreshed,
}

/// Outcome of a fade sweep that actually ran.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FadeSweep {
    /// Points whose stored stage changed.
    pub faded: usize,
    /// Points that reached [`FadeStage::Gone`] and were evicted.
    pub removed: usize,
}

/// Counters accumulated by a [`Chart`] since the last reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChartStats {
    /// New points stored.
    pub added: usize,
    /// Rediscoveries of already charted cells.
    pub refreshed: usize,
    /// Points evicted by fade sweeps.
    pub removed: usize,
    /// Stage changes applied by fade sweeps.
    pub faded: usize,
    /// Area queries and visits served.
    pub queries: usize,
    /// Discoveries that returned an error.
    pub rejected: usize,
    /// Leaves split into four children.
    pub subdivisions: usize,
    /// Splits abandoned because the node arena ran out.
    pub subdivision_failures: usize,
    /// Points parked in an overflow bucket.
    pub overflowed: usize,
}

/// A fixed-capacity chart of discovered cells.
///
/// Every coordinate is charted at most once: rediscovering a cell refreshes
/// it in place. Points age through the [`FadeStage`]s and are evicted by
/// [`update_fade`](Self::update_fade) once gone, returning their storage to
/// the point store.
///
/// ```
/// use sonar_chart::{Bounds, Chart, ChartConfig, Discovery, ManualClock};
///
/// let mut chart = Chart::new(ChartConfig::default(), ManualClock::new(0)).unwrap();
/// assert_eq!(chart.add_point(3, 4, true), Ok(Discovery::New));
/// assert_eq!(chart.add_point(3, 4, false), Ok(Discovery::Refreshed));
/// assert!(chart.query_point(3, 4).unwrap().is_terrain);
///
/// let mut out = [sonar_chart::DiscoveredPoint::new(0, 0, false, 0); 16];
/// let report = chart.query_area(Bounds::new(0, 0, 10, 10), &mut out);
/// assert_eq!(report.count, 1);
/// ```
pub struct Chart<C> {
    config: ChartConfig,
    clock: C,
    points: Arena<DiscoveredPoint>,
    tree: QuadTree,
    last_fade_sweep: Option<Tick>,
    stats: ChartStats,
}

impl<C: Clock> Chart<C> {
    /// Creates an empty chart, allocating both fixed-capacity pools.
    ///
    /// Fails with [`ChartError::MemoryExhausted`] if the node arena cannot
    /// even hold the root.
    pub fn new(config: ChartConfig, clock: C) -> Result<Self, ChartError> {
        let tree = QuadTree::new(config.root_bounds, config.max_depth, config.node_capacity)
            .map_err(|Exhausted| ChartError::MemoryExhausted(Pool::Nodes))?;
        Ok(Self {
            points: Arena::with_capacity(config.point_capacity),
            tree,
            config,
            clock,
            last_fade_sweep: None,
            stats: ChartStats::default(),
        })
    }

    /// Records a discovery of `(x, y)` at the clock's current tick.
    ///
    /// If the cell is already charted it is refreshed: its discovery time is
    /// reset, its fade returns to [`FadeStage::Full`] and its terrain flag is
    /// merged (terrain is never downgraded to water). Otherwise a new point is
    /// stored. On error nothing in the chart changes.
    pub fn add_point(&mut self, x: i16, y: i16, is_terrain: bool) -> Result<Discovery, ChartError> {
        if !self.config.root_bounds.contains(x, y) {
            self.stats.rejected += 1;
            return Err(ChartError::OutOfBounds { x, y });
        }
        let now = self.clock.now();

        if let Some(id) = self.tree.find(&self.points, x, y)
            && let Some(point) = self.points.get_mut(id)
        {
            point.rediscover(is_terrain, now);
            self.stats.refreshed += 1;
            trace!(x, y, is_terrain = point.is_terrain, "refreshed point");
            return Ok(Discovery::Refreshed);
        }

        let Ok(id) = self.points.allocate(DiscoveredPoint::new(x, y, is_terrain, now)) else {
            self.stats.rejected += 1;
            warn!(x, y, "point store exhausted, discovery dropped");
            return Err(ChartError::MemoryExhausted(Pool::Points));
        };

        let nodes_before = self.tree.node_count();
        let placed = self.tree.insert(&self.points, id);
        self.stats.subdivisions += self.tree.node_count().saturating_sub(nodes_before) / 4;
        match placed {
            Ok(placement) => {
                self.stats.added += 1;
                if let Placement::Overflow { reason } = placement {
                    self.stats.overflowed += 1;
                    if reason == SubdivideError::NodesExhausted {
                        self.stats.subdivision_failures += 1;
                    }
                }
                trace!(x, y, is_terrain, ?placement, "added point");
                Ok(Discovery::New)
            }
            Err(err) => {
                self.points.release(id);
                self.stats.rejected += 1;
                warn!(x, y, %err, "discovery dropped");
                Err(err.into())
            }
        }
    }

    /// Returns the point charted at exactly `(x, y)`.
    #[must_use]
    pub fn query_point(&self, x: i16, y: i16) -> Option<&DiscoveredPoint> {
        self.tree
            .find(&self.points, x, y)
            .and_then(|id| self.points.get(id))
    }

    /// Copies every charted point inside `area` into `out`.
    ///
    /// At most `out.len()` points are written; the report says how many and
    /// whether more matched.
    pub fn query_area(&mut self, area: Bounds, out: &mut [DiscoveredPoint]) -> QueryReport {
        self.stats.queries += 1;
        self.tree.query(&self.points, area, out)
    }

    /// Calls `f` for every charted point inside `area` until it breaks.
    pub fn visit_area<F>(&mut self, area: Bounds, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(&DiscoveredPoint) -> ControlFlow<()>,
    {
        self.stats.queries += 1;
        self.tree.visit(&self.points, area, |_, point| f(point))
    }

    /// Advances every point's fade stage to its age at `now` and evicts the
    /// points that are gone.
    ///
    /// Sweeps run at most once per [`ChartConfig::fade_interval`]; the first
    /// call always runs. Returns `None` when throttled.
    pub fn update_fade(&mut self, now: Tick) -> Option<FadeSweep> {
        if let Some(last) = self.last_fade_sweep
            && now.wrapping_sub(last) < self.config.fade_interval
        {
            return None;
        }
        self.last_fade_sweep = Some(now);

        let duration = self.config.fade_stage_duration;
        let points = &mut self.points;
        let mut sweep = FadeSweep::default();
        self.tree.retain(|id| {
            let Some(point) = points.get_mut(id) else {
                return false;
            };
            let stage = point.fade_stage_at(now, duration);
            if stage == FadeStage::Gone {
                points.release(id);
                sweep.removed += 1;
                return false;
            }
            if stage != point.fade_stage {
                point.fade_stage = stage;
                sweep.faded += 1;
            }
            true
        });

        self.stats.faded += sweep.faded;
        self.stats.removed += sweep.removed;
        debug!(
            now,
            faded = sweep.faded,
            removed = sweep.removed,
            remaining = self.points.len(),
            nodes = self.tree.node_count(),
            "fade sweep"
        );
        Some(sweep)
    }

    /// Drops every point and shrinks the tree back to its root.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.points.clear();
    }

    /// Resets the counters, returning their previous values.
    pub fn take_stats(&mut self) -> ChartStats {
        core::mem::take(&mut self.stats)
    }

    /// Emits the counters at debug level and resets them.
    pub fn log_stats(&mut self) -> ChartStats {
        let stats = self.take_stats();
        debug!(
            added = stats.added,
            refreshed = stats.refreshed,
            removed = stats.removed,
            faded = stats.faded,
            queries = stats.queries,
            rejected = stats.rejected,
            subdivisions = stats.subdivisions,
            subdivision_failures = stats.subdivision_failures,
            overflowed = stats.overflowed,
            points = self.points.len(),
            nodes = self.tree.node_count(),
            "chart stats"
        );
        stats
    }
}

impl<C> Chart<C> {
    /// Number of charted points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if nothing is charted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fixed size of the point store.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    /// The point store.
    #[must_use]
    pub fn points(&self) -> &Arena<DiscoveredPoint> {
        &self.points
    }

    /// Iterates over every charted point in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (PointId, &DiscoveredPoint)> + '_ {
        self.points.iter()
    }

    /// The spatial index.
    #[must_use]
    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    /// The configuration the chart was built with.
    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// The chart's time source.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Counters accumulated since the last reset.
    #[must_use]
    pub fn stats(&self) -> ChartStats {
        self.stats
    }
}

impl<C> fmt::Debug for Chart<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("config", &self.config)
            .field("points", &self.points)
            .field("tree", &self.tree)
            .field("last_fade_sweep", &self.last_fade_sweep)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
