// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error values reported by the quadtree and the chart.
//!
//! None of these are fatal. Exhaustion and full leaves mean a discovery was
//! dropped; the caller may retry on a later tick once fading frees capacity.

use core::fmt;

/// Which fixed-capacity pool ran out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pool {
    /// The point store.
    Points,
    /// The quadtree node arena.
    Nodes,
}

/// Why a point could not be placed in the quadtree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InsertError {
    /// The coordinate lies outside the tree's root bounds.
    OutOfBounds {
        /// Rejected x coordinate.
        x: i16,
        /// Rejected y coordinate.
        y: i16,
    },
    /// The holding leaf could not split and its overflow bucket is full.
    Full {
        /// Rejected x coordinate.
        x: i16,
        /// Rejected y coordinate.
        y: i16,
    },
    /// The point handle does not refer to a live point.
    StalePoint,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { x, y } => write!(f, "({x}, {y}) lies outside the tree bounds"),
            Self::Full { x, y } => write!(f, "no room left in the leaf holding ({x}, {y})"),
            Self::StalePoint => f.write_str("point handle is not live"),
        }
    }
}

impl core::error::Error for InsertError {}

/// Why a leaf could not be split.
///
/// Whatever the reason, the node is left exactly as it was.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubdivideError {
    /// The node already has children (or does not exist).
    NotLeaf,
    /// The node is at the configured maximum depth.
    MaxDepth,
    /// The node is a single cell wide or tall.
    Unsplittable,
    /// The node arena could not supply four children.
    NodesExhausted,
}

impl fmt::Display for SubdivideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotLeaf => "node is not a live leaf",
            Self::MaxDepth => "node is at maximum depth",
            Self::Unsplittable => "node bounds are too narrow to split",
            Self::NodesExhausted => "node arena exhausted",
        })
    }
}

impl core::error::Error for SubdivideError {}

/// Error returned by [`Chart`](crate::Chart) operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChartError {
    /// A fixed-capacity pool is full. Existing data is untouched.
    MemoryExhausted(Pool),
    /// The coordinate lies outside the chart's root bounds.
    OutOfBounds {
        /// Rejected x coordinate.
        x: i16,
        /// Rejected y coordinate.
        y: i16,
    },
    /// The leaf holding the coordinate is full and could not split.
    LeafFull {
        /// Rejected x coordinate.
        x: i16,
        /// Rejected y coordinate.
        y: i16,
    },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MemoryExhausted(Pool::Points) => f.write_str("point store exhausted"),
            Self::MemoryExhausted(Pool::Nodes) => f.write_str("node arena exhausted"),
            Self::OutOfBounds { x, y } => write!(f, "({x}, {y}) lies outside the chart bounds"),
            Self::LeafFull { x, y } => write!(f, "no room left in the leaf holding ({x}, {y})"),
        }
    }
}

impl core::error::Error for ChartError {}

impl From<InsertError> for ChartError {
    fn from(err: InsertError) -> Self {
        match err {
            InsertError::OutOfBounds { x, y } => Self::OutOfBounds { x, y },
            InsertError::Full { x, y } => Self::LeafFull { x, y },
            // A freshly allocated point is always live; treat a stale handle as
            // the point store having lost it.
            InsertError::StalePoint => Self::MemoryExhausted(Pool::Points),
        }
    }
}
