// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-point ray directions and the precomputed direction table.

use core::f32::consts::TAU;
use core::fmt;

/// Scale of the fixed-point direction components: a unit vector has length
/// `FIXED_POINT_SCALE`.
pub const FIXED_POINT_SCALE: i32 = 1000;

/// Number of entries in a [`DirectionCache`], one per `2π / ANGLE_RESOLUTION`.
pub const ANGLE_RESOLUTION: usize = 256;

/// A unit direction in fixed point.
///
/// `dx` and `dy` are the cosine and sine of the angle scaled by
/// [`FIXED_POINT_SCALE`] and truncated towards zero. `angle_id` is the index
/// of the nearest [`DirectionCache`] entry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Direction {
    /// Scaled x component.
    pub dx: i16,
    /// Scaled y component.
    pub dy: i16,
    /// Index of the nearest cache entry, in `0..ANGLE_RESOLUTION`.
    pub angle_id: u16,
}

impl Direction {
    /// Computes the direction of `radians`, measured counterclockwise from +x.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "components are bounded by FIXED_POINT_SCALE and the id by ANGLE_RESOLUTION"
    )]
    pub fn from_angle(radians: f32) -> Self {
        let scale = FIXED_POINT_SCALE as f32;
        let steps = libm::roundf(radians / TAU * ANGLE_RESOLUTION as f32) as i32;
        Self {
            dx: (libm::cosf(radians) * scale) as i16,
            dy: (libm::sinf(radians) * scale) as i16,
            angle_id: steps.rem_euclid(ANGLE_RESOLUTION as i32) as u16,
        }
    }

    /// Recovers the angle of this direction in `(-π, π]`.
    #[must_use]
    pub fn angle(self) -> f32 {
        libm::atan2f(f32::from(self.dy), f32::from(self.dx))
    }
}

/// Table of [`ANGLE_RESOLUTION`] directions evenly spaced around the circle.
///
/// Entry `i` points at `i · 2π / ANGLE_RESOLUTION` and has `angle_id == i`.
#[derive(Clone)]
pub struct DirectionCache {
    entries: [Direction; ANGLE_RESOLUTION],
}

impl DirectionCache {
    /// Builds the table.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "indices are below ANGLE_RESOLUTION"
    )]
    pub fn new() -> Self {
        let mut entries = [Direction::default(); ANGLE_RESOLUTION];
        for (i, entry) in entries.iter_mut().enumerate() {
            let angle = i as f32 * TAU / ANGLE_RESOLUTION as f32;
            *entry = Direction {
                angle_id: i as u16,
                ..Direction::from_angle(angle)
            };
        }
        Self { entries }
    }

    /// Returns entry `angle_id`, wrapping modulo [`ANGLE_RESOLUTION`].
    #[must_use]
    pub fn get(&self, angle_id: u16) -> Direction {
        self.entries[usize::from(angle_id) % ANGLE_RESOLUTION]
    }

    /// Returns the entry closest to `radians`.
    #[must_use]
    pub fn nearest(&self, radians: f32) -> Direction {
        self.get(Direction::from_angle(radians).angle_id)
    }

    /// All entries in angle order.
    #[must_use]
    pub fn entries(&self) -> &[Direction] {
        &self.entries
    }
}

impl Default for DirectionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DirectionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectionCache")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn cardinal_directions() {
        assert_eq!(
            Direction::from_angle(0.0),
            Direction {
                dx: 1000,
                dy: 0,
                angle_id: 0
            }
        );
        let north = Direction::from_angle(FRAC_PI_2);
        assert_eq!((north.dx, north.dy, north.angle_id), (0, 1000, 64));
        let west = Direction::from_angle(PI);
        assert_eq!((west.dx, west.dy, west.angle_id), (-1000, 0, 128));
    }

    #[test]
    fn angle_ids_wrap() {
        assert_eq!(Direction::from_angle(TAU).angle_id, 0);
        assert_eq!(Direction::from_angle(-FRAC_PI_2).angle_id, 192);
    }

    #[test]
    fn components_truncate_towards_zero() {
        // cos(1 rad) = 0.5403..., sin(1 rad) = 0.8414...
        let d = Direction::from_angle(1.0);
        assert_eq!((d.dx, d.dy), (540, 841));
        let d = Direction::from_angle(-1.0);
        assert_eq!((d.dx, d.dy), (540, -841));
    }

    #[test]
    fn cache_entries_match_their_index() {
        let cache = DirectionCache::new();
        for (i, entry) in cache.entries().iter().enumerate() {
            assert_eq!(usize::from(entry.angle_id), i, "entry {i} mislabelled");
            let expected = i as f32 * TAU / ANGLE_RESOLUTION as f32;
            let mut error = libm::fabsf(entry.angle() - expected);
            if error > PI {
                error = TAU - error;
            }
            assert!(error < 0.005, "entry {i} points the wrong way");
        }
    }

    #[test]
    fn cache_lookup_wraps() {
        let cache = DirectionCache::new();
        assert_eq!(cache.get(259), cache.get(3));
        assert_eq!(cache.nearest(FRAC_PI_2 + 0.001), cache.get(64));
    }
}
