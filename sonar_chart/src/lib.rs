// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sonar Chart: a fixed-capacity spatial memory of discovered world cells.
//!
//! A [`Chart`] remembers every cell a sonar ping has touched, whether it was
//! terrain or open water, and when it was last seen. Points fade through the
//! [`FadeStage`]s as they age and are evicted once gone, so the chart holds a
//! bounded, recent picture of the surroundings.
//!
//! The crate is built for devices without a general-purpose heap budget:
//!
//! - **Arena** ([`Arena`], [`Handle`]): fixed-capacity slot storage with
//!   generational handles. All memory is reserved at construction; running out
//!   is an ordinary [`Exhausted`] result.
//! - **Quadtree** ([`QuadTree`]): a point quadtree over a node arena. Leaves
//!   hold up to [`LEAF_CAPACITY`] points and split on demand; leaves that
//!   cannot split park extra points in a bounded overflow bucket.
//! - **Chart** ([`Chart`]): deduplicating discovery, exact and area queries,
//!   and throttled fade sweeps that return evicted storage to the arena.
//!
//! ## Quick Start
//!
//! ```rust
//! use sonar_chart::{Bounds, Chart, ChartConfig, DiscoveredPoint, FadeStage, ManualClock};
//!
//! let config = ChartConfig::default().with_root_bounds(Bounds::new(-256, -256, 255, 255));
//! let mut chart = Chart::new(config, ManualClock::new(0)).unwrap();
//!
//! chart.add_point(10, -4, true).unwrap();
//! chart.add_point(11, -4, false).unwrap();
//!
//! // Thirty seconds later the points have faded two stages.
//! chart.clock().set(30_000);
//! chart.update_fade(30_000);
//! assert_eq!(chart.query_point(10, -4).unwrap().fade_stage, FadeStage::Dim);
//!
//! // Renderers read an area into a caller-owned buffer.
//! let mut visible = [DiscoveredPoint::new(0, 0, false, 0); 64];
//! let report = chart.query_area(Bounds::new(0, -10, 20, 0), &mut visible);
//! assert_eq!(report.count, 2);
//! assert!(!report.truncated);
//! ```
//!
//! ## Time
//!
//! Time is a wrapping millisecond [`Tick`]. The chart reads discovery times
//! from its [`Clock`], which is any `Fn() -> Tick` or a [`ManualClock`].
//!
//! ## Logging
//!
//! Diagnostics go through [`tracing`]. The crate never installs a subscriber.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc` only when a chart is created.

#![no_std]

extern crate alloc;

mod arena;
mod chart;
mod clock;
mod config;
mod error;
pub mod quadtree;
mod types;

pub use arena::{Arena, Exhausted, Handle};
pub use chart::{Chart, ChartStats, Discovery, FadeSweep};
pub use clock::{Clock, ManualClock};
pub use config::ChartConfig;
pub use error::{ChartError, InsertError, Pool, SubdivideError};
pub use quadtree::{
    LEAF_CAPACITY, NodeId, OVERFLOW_CAPACITY, Placement, QuadNode, QuadTree, QueryReport,
};
pub use types::{Bounds, DiscoveredPoint, FadeStage, PointId, Tick};
