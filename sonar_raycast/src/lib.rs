// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sonar Raycast: deterministic integer raycasting for sonar sweeps.
//!
//! Rays walk the integer grid outward from an origin and stop at the first
//! cell a [`CollisionPredicate`] reports as terrain. The crate is `no_std`,
//! allocation-free after construction, and deterministic: the same origin,
//! pattern and predicate always visit the same cells.
//!
//! - **Directions** ([`Direction`], [`DirectionCache`]): fixed-point unit
//!   vectors scaled by [`FIXED_POINT_SCALE`], with a table of
//!   [`ANGLE_RESOLUTION`] evenly spaced entries.
//! - **Patterns** ([`RayPattern`], [`PatternKind`]): fixed sets of up to
//!   [`MAX_PATTERN_DIRECTIONS`] directions, with full, forward and sparse
//!   canonical sweeps.
//! - **Line stepping** ([`LineStepper`]): Bresenham's algorithm as an
//!   iterator of cells.
//! - **Raycaster** ([`Raycaster`]): casts rays and patterns and adapts
//!   pattern density to a frame-time budget.
//!
//! ## Quick Start
//!
//! ```rust
//! use sonar_raycast::{Raycaster, RaycasterConfig};
//!
//! let mut raycaster = Raycaster::new(RaycasterConfig::default().with_initial_quality(0));
//!
//! // A circular island of radius 10 around (20, 0).
//! let island = |x: i16, y: i16| {
//!     let (dx, dy) = (i32::from(x) - 20, i32::from(y));
//!     dx * dx + dy * dy <= 100
//! };
//!
//! let scan = raycaster.cast_adaptive((0, 0), false, &island);
//! assert_eq!(scan.len(), 32);
//! assert!(scan.hits() > 0);
//! let first = scan.results()[0];
//! assert!(first.hit_terrain);
//! assert_eq!((first.hit_x, first.hit_y, first.distance), (10, 0, 10));
//! ```
//!
//! Completed results are usually fed straight into a chart, terrain hits as
//! terrain and ray ends as open water.
//!
//! ## Adaptive Quality
//!
//! The raycaster keeps a quality level from 0 (finest) to
//! [`MAX_QUALITY_LEVEL`]. Each level picks a canonical pattern and halves the
//! frame budget; [`Raycaster::update_performance`] moves one level at a time
//! when frames run far over or under budget.
//!
//! ## Logging
//!
//! Diagnostics go through [`tracing`]. The crate never installs a subscriber.

#![no_std]

#[cfg(test)]
extern crate alloc;

mod direction;
mod pattern;
mod raycaster;
mod stepper;

pub use direction::{ANGLE_RESOLUTION, Direction, DirectionCache, FIXED_POINT_SCALE};
pub use pattern::{DEFAULT_MAX_RADIUS, MAX_PATTERN_DIRECTIONS, PatternKind, Patterns, RayPattern};
pub use raycaster::{
    CollisionPredicate, MAX_QUALITY_LEVEL, PatternScan, RayResult, RayStats, Raycaster,
    RaycasterConfig, Tick,
};
pub use stepper::LineStepper;
