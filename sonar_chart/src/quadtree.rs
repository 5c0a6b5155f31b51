// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-backed point quadtree.
//!
//! Nodes live in a fixed-capacity [`Arena`] and refer to points by
//! [`PointId`]; the points themselves live in a separate point store that is
//! passed to every operation needing coordinates.
//!
//! Leaves hold up to [`LEAF_CAPACITY`] points directly. A full leaf splits into
//! four children whose bounds tile it exactly, the upper half of each axis
//! owning the midpoint. When a full leaf cannot split (maximum depth, bounds
//! one cell wide, or no free nodes) the point goes into the node's overflow
//! bucket, which holds at most [`OVERFLOW_CAPACITY`] points. Past that,
//! insertion fails with [`InsertError::Full`]. No list ever grows past its cap.

use core::ops::ControlFlow;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::arena::{Arena, Exhausted, Handle};
use crate::error::{InsertError, SubdivideError};
use crate::types::{Bounds, DiscoveredPoint, PointId};

/// Maximum number of points stored directly in a leaf.
pub const LEAF_CAPACITY: usize = 8;

/// Maximum number of points in a node's overflow bucket.
pub const OVERFLOW_CAPACITY: usize = 8;

/// Handle of a node in a [`QuadTree`].
pub type NodeId = Handle<QuadNode>;

#[derive(Copy, Clone, Debug)]
struct Split {
    children: [NodeId; 4],
    mid_x: i16,
    mid_y: i16,
}

impl Split {
    fn child_for(&self, x: i16, y: i16) -> NodeId {
        self.children[usize::from(x >= self.mid_x) | (usize::from(y >= self.mid_y) << 1)]
    }
}

/// A quadtree node.
#[derive(Clone, Debug)]
pub struct QuadNode {
    bounds: Bounds,
    depth: u8,
    split: Option<Split>,
    points: SmallVec<[PointId; LEAF_CAPACITY]>,
    overflow: SmallVec<[PointId; OVERFLOW_CAPACITY]>,
}

impl QuadNode {
    fn leaf(bounds: Bounds, depth: u8) -> Self {
        Self {
            bounds,
            depth,
            split: None,
            points: SmallVec::new(),
            overflow: SmallVec::new(),
        }
    }

    /// Region covered by this node.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Distance from the root (the root has depth 0).
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }

    /// Children in NW, NE, SW, SE order, if the node has been split.
    #[must_use]
    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.split.map(|split| split.children)
    }

    /// Points stored directly on this node. Always empty for internal nodes.
    #[must_use]
    pub fn points(&self) -> &[PointId] {
        &self.points
    }

    /// Points parked in this node's overflow bucket.
    #[must_use]
    pub fn overflow(&self) -> &[PointId] {
        &self.overflow
    }
}

/// Where [`QuadTree::insert`] stored a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// In the direct storage of a leaf.
    Direct,
    /// In the overflow bucket of a leaf that could not split.
    Overflow {
        /// Why the leaf could not split.
        reason: SubdivideError,
    },
}

/// Outcome of a bounded area query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryReport {
    /// Number of points written to the output buffer.
    pub count: usize,
    /// `true` if at least one more point matched than the buffer could hold.
    pub truncated: bool,
}

/// Point quadtree over a fixed-capacity node arena.
#[derive(Debug)]
pub struct QuadTree {
    nodes: Arena<QuadNode>,
    root: NodeId,
    bounds: Bounds,
    max_depth: u8,
}

impl QuadTree {
    /// Creates a tree covering `bounds` with a single root leaf.
    ///
    /// `node_capacity` is the fixed size of the node arena, root included.
    pub fn new(bounds: Bounds, max_depth: u8, node_capacity: u16) -> Result<Self, Exhausted> {
        let mut nodes = Arena::with_capacity(node_capacity);
        let root = nodes.allocate(QuadNode::leaf(bounds, 0))?;
        Ok(Self {
            nodes,
            root,
            bounds,
            max_depth,
        })
    }

    /// Handle of the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Region covered by the whole tree.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Deepest level at which nodes may still be created.
    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Returns the node behind `id`, if it is live.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&QuadNode> {
        self.nodes.get(id)
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Fixed size of the node arena.
    #[must_use]
    pub fn node_capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the deepest node whose bounds contain `(x, y)`.
    #[must_use]
    pub fn leaf_for(&self, x: i16, y: i16) -> Option<NodeId> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let mut current = self.root;
        while let Some(split) = self.nodes.get(current)?.split {
            current = split.child_for(x, y);
        }
        Some(current)
    }

    /// Inserts a point from `points` into the tree.
    ///
    /// Descends to the leaf containing the point, splitting it first if it is
    /// full. If the leaf cannot split the point is parked in its overflow
    /// bucket. Returns [`InsertError::Full`] if that bucket is full too.
    pub fn insert(
        &mut self,
        points: &Arena<DiscoveredPoint>,
        id: PointId,
    ) -> Result<Placement, InsertError> {
        let point = points.get(id).ok_or(InsertError::StalePoint)?;
        let (x, y) = (point.x, point.y);
        if !self.bounds.contains(x, y) {
            return Err(InsertError::OutOfBounds { x, y });
        }

        let mut current = self.root;
        loop {
            let Some(node) = self.nodes.get_mut(current) else {
                debug_assert!(false, "quadtree path reached a dead node");
                return Err(InsertError::Full { x, y });
            };
            if let Some(split) = node.split {
                current = split.child_for(x, y);
                continue;
            }
            if node.points.len() < LEAF_CAPACITY {
                node.points.push(id);
                return Ok(Placement::Direct);
            }

            // Full leaf: a successful split turns it into an internal node and
            // the next iteration descends into the right child.
            let reason = match self.subdivide(points, current) {
                Ok(()) => continue,
                Err(reason) => reason,
            };
            let Some(node) = self.nodes.get_mut(current) else {
                return Err(InsertError::Full { x, y });
            };
            if node.overflow.len() < OVERFLOW_CAPACITY {
                node.overflow.push(id);
                trace!(x, y, depth = node.depth, ?reason, "point parked in overflow");
                return Ok(Placement::Overflow { reason });
            }
            return Err(InsertError::Full { x, y });
        }
    }

    /// Splits the leaf `id` into four children.
    ///
    /// Either the split completes, moving every direct point into the child
    /// containing it, or the node is left exactly as it was. The overflow
    /// bucket stays on the node.
    pub fn subdivide(
        &mut self,
        points: &Arena<DiscoveredPoint>,
        id: NodeId,
    ) -> Result<(), SubdivideError> {
        let (bounds, depth) = match self.nodes.get(id) {
            Some(node) if node.is_leaf() => (node.bounds, node.depth),
            _ => return Err(SubdivideError::NotLeaf),
        };
        if depth >= self.max_depth {
            return Err(SubdivideError::MaxDepth);
        }
        let (Some((mid_x, mid_y)), Some(quadrants)) = (bounds.midpoint(), bounds.quadrants())
        else {
            return Err(SubdivideError::Unsplittable);
        };

        let mut children = [self.root; 4];
        for (i, quadrant) in quadrants.into_iter().enumerate() {
            match self.nodes.allocate(QuadNode::leaf(quadrant, depth + 1)) {
                Ok(child) => children[i] = child,
                Err(Exhausted) => {
                    self.release_all(&children[..i]);
                    warn!(depth, allocated = i, "subdivision rolled back, node arena exhausted");
                    return Err(SubdivideError::NodesExhausted);
                }
            }
        }

        let split = Split {
            children,
            mid_x,
            mid_y,
        };
        let moved = match self.nodes.get_mut(id) {
            Some(node) => {
                node.split = Some(split);
                core::mem::take(&mut node.points)
            }
            None => {
                self.release_all(&children);
                return Err(SubdivideError::NotLeaf);
            }
        };
        for pid in moved {
            let Some(point) = points.get(pid) else {
                debug_assert!(false, "quadtree held a released point");
                continue;
            };
            if let Some(child) = self.nodes.get_mut(split.child_for(point.x, point.y)) {
                debug_assert!(child.points.len() < LEAF_CAPACITY, "child overfilled");
                child.points.push(pid);
            }
        }
        debug!(depth, mid_x, mid_y, "subdivided quadtree node");
        Ok(())
    }

    fn release_all(&mut self, ids: &[NodeId]) {
        for &id in ids {
            self.nodes.release(id);
        }
    }

    /// Frees the subtree rooted at `id`, children first.
    ///
    /// The points referenced by the subtree are not touched.
    fn free(&mut self, id: NodeId) {
        if let Some(children) = self.nodes.get(id).and_then(QuadNode::children) {
            for child in children {
                self.free(child);
            }
        }
        self.nodes.release(id);
    }

    /// Calls `f` for every point inside `area`, stopping early on
    /// [`ControlFlow::Break`].
    ///
    /// Subtrees whose bounds miss `area` are skipped. Each node's overflow
    /// bucket is visited before its own points and children.
    pub fn visit<F>(
        &self,
        points: &Arena<DiscoveredPoint>,
        area: Bounds,
        mut f: F,
    ) -> ControlFlow<()>
    where
        F: FnMut(PointId, &DiscoveredPoint) -> ControlFlow<()>,
    {
        self.visit_node(points, self.root, &area, &mut f)
    }

    fn visit_node<F>(
        &self,
        points: &Arena<DiscoveredPoint>,
        id: NodeId,
        area: &Bounds,
        f: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(PointId, &DiscoveredPoint) -> ControlFlow<()>,
    {
        let Some(node) = self.nodes.get(id) else {
            return ControlFlow::Continue(());
        };
        if !node.bounds.intersects(area) {
            return ControlFlow::Continue(());
        }
        for &pid in node.overflow.iter().chain(&node.points) {
            if let Some(point) = points.get(pid)
                && area.contains(point.x, point.y)
            {
                f(pid, point)?;
            }
        }
        if let Some(split) = node.split {
            for child in split.children {
                self.visit_node(points, child, area, f)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Copies every point inside `area` into `out`, up to `out.len()` points.
    ///
    /// The report flags truncation when more points matched than fit.
    pub fn query(
        &self,
        points: &Arena<DiscoveredPoint>,
        area: Bounds,
        out: &mut [DiscoveredPoint],
    ) -> QueryReport {
        let mut report = QueryReport::default();
        let _ = self.visit(points, area, |_, point| match out.get_mut(report.count) {
            Some(slot) => {
                *slot = *point;
                report.count += 1;
                ControlFlow::Continue(())
            }
            None => {
                report.truncated = true;
                ControlFlow::Break(())
            }
        });
        report
    }

    /// Finds the point stored at exactly `(x, y)`.
    ///
    /// Only the nodes on the single root-to-leaf path for the coordinate are
    /// inspected.
    #[must_use]
    pub fn find(&self, points: &Arena<DiscoveredPoint>, x: i16, y: i16) -> Option<PointId> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current)?;
            for &pid in node.overflow.iter().chain(&node.points) {
                if let Some(point) = points.get(pid)
                    && point.x == x
                    && point.y == y
                {
                    return Some(pid);
                }
            }
            current = node.split?.child_for(x, y);
        }
    }

    /// Drops every stored point for which `keep` returns `false`.
    ///
    /// Lists are compacted in place. Afterwards, any internal node whose four
    /// children are leaves holding at most [`LEAF_CAPACITY`] points in total is
    /// collapsed back into a leaf. Returns the number of points dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(PointId) -> bool,
    {
        self.retain_node(self.root, &mut keep)
    }

    fn retain_node<F>(&mut self, id: NodeId, keep: &mut F) -> usize
    where
        F: FnMut(PointId) -> bool,
    {
        let Some(node) = self.nodes.get_mut(id) else {
            return 0;
        };
        let before = node.points.len() + node.overflow.len();
        node.points.retain(|pid| keep(*pid));
        node.overflow.retain(|pid| keep(*pid));
        let mut dropped = before - node.points.len() - node.overflow.len();

        if let Some(split) = node.split {
            for child in split.children {
                dropped += self.retain_node(child, keep);
            }
            self.try_collapse(id, split);
        }
        dropped
    }

    fn try_collapse(&mut self, id: NodeId, split: Split) -> bool {
        let mut total = 0;
        for child in split.children {
            match self.nodes.get(child) {
                Some(node) if node.is_leaf() => total += node.points.len() + node.overflow.len(),
                _ => return false,
            }
        }
        if total > LEAF_CAPACITY {
            return false;
        }

        let mut gathered = SmallVec::<[PointId; LEAF_CAPACITY]>::new();
        for child in split.children {
            if let Some(node) = self.nodes.release(child) {
                gathered.extend(node.overflow);
                gathered.extend(node.points);
            }
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.split = None;
            node.points = gathered;
            debug!(depth = node.depth, points = node.points.len(), "collapsed quadtree node");
        }
        true
    }

    /// Removes every point reference and frees every node except the root.
    pub fn clear(&mut self) {
        let split = self.nodes.get_mut(self.root).and_then(|root| {
            root.points.clear();
            root.overflow.clear();
            root.split.take()
        });
        if let Some(split) = split {
            for child in split.children {
                self.free(child);
            }
        }
    }
}
