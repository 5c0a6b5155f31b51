// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer line stepping.

use core::iter::FusedIterator;

/// Walks the grid cells of a line segment with Bresenham's algorithm.
///
/// Works in every octant. The start cell comes first and the end cell last;
/// consecutive cells are 8-connected. A segment of length zero yields its
/// single cell.
///
/// ```
/// use sonar_raycast::LineStepper;
///
/// let cells: Vec<_> = LineStepper::new((0, 0), (3, -1)).collect();
/// assert_eq!(cells, [(0, 0), (1, 0), (2, -1), (3, -1)]);
/// ```
#[derive(Clone, Debug)]
pub struct LineStepper {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    step_x: i32,
    step_y: i32,
    err: i32,
    remaining: u32,
}

impl LineStepper {
    /// Creates a stepper from `start` to `end`, both inclusive.
    #[must_use]
    pub fn new(start: (i16, i16), end: (i16, i16)) -> Self {
        let (x0, y0) = (i32::from(start.0), i32::from(start.1));
        let (x1, y1) = (i32::from(end.0), i32::from(end.1));
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            dx,
            dy,
            step_x: if x0 < x1 { 1 } else { -1 },
            step_y: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            remaining: dx.max(-dy).unsigned_abs() + 1,
        }
    }

    /// Returns `true` once every cell has been yielded.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }
}

impl Iterator for LineStepper {
    type Item = (i16, i16);

    #[expect(
        clippy::cast_possible_truncation,
        reason = "cells stay between the two i16 endpoints"
    )]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let cell = (self.x as i16, self.y as i16);
        self.remaining -= 1;
        if self.remaining > 0 {
            let e2 = 2 * self.err;
            if e2 >= self.dy {
                self.err += self.dy;
                self.x += self.step_x;
            }
            if e2 <= self.dx {
                self.err += self.dx;
                self.y += self.step_y;
            }
        }
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (len, Some(len))
    }
}

impl ExactSizeIterator for LineStepper {}

impl FusedIterator for LineStepper {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn horizontal_segment_visits_every_cell() {
        let cells: Vec<_> = LineStepper::new((0, 0), (5, 0)).collect();
        assert_eq!(cells, [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]);
    }

    #[test]
    fn zero_length_segment_yields_one_cell() {
        let mut stepper = LineStepper::new((7, -3), (7, -3));
        assert_eq!(stepper.len(), 1);
        assert_eq!(stepper.next(), Some((7, -3)));
        assert!(stepper.is_done());
        assert_eq!(stepper.next(), None);
        assert_eq!(stepper.next(), None);
    }

    #[test]
    fn diagonal_moves_both_axes() {
        let cells: Vec<_> = LineStepper::new((0, 0), (-3, 3)).collect();
        assert_eq!(cells, [(0, 0), (-1, 1), (-2, 2), (-3, 3)]);
    }

    #[test]
    fn every_octant_ends_on_target() {
        for (ex, ey) in [
            (7, 2),
            (2, 7),
            (-2, 7),
            (-7, 2),
            (-7, -2),
            (-2, -7),
            (2, -7),
            (7, -2),
            (0, -9),
            (9, 0),
        ] {
            let stepper = LineStepper::new((0, 0), (ex, ey));
            let expected_len = usize::from(ex.unsigned_abs().max(ey.unsigned_abs())) + 1;
            assert_eq!(stepper.len(), expected_len);
            let cells: Vec<_> = stepper.collect();
            assert_eq!(cells.len(), expected_len);
            assert_eq!(cells.first(), Some(&(0, 0)));
            assert_eq!(cells.last(), Some(&(ex, ey)), "line to ({ex}, {ey}) missed");
            for pair in cells.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                assert!(
                    (a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1 && a != b,
                    "cells {a:?} and {b:?} are not adjacent"
                );
            }
        }
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let stepper = LineStepper::new((i16::MIN, i16::MIN), (i16::MAX, i16::MAX));
        assert_eq!(stepper.len(), 65_536);
        assert_eq!(stepper.last(), Some((i16::MAX, i16::MAX)));
    }

    #[test]
    fn len_counts_down() {
        let mut stepper = LineStepper::new((0, 0), (4, 1));
        assert_eq!(stepper.len(), 5);
        stepper.next();
        stepper.next();
        assert_eq!(stepper.len(), 3);
        assert!(!stepper.is_done());
    }
}
