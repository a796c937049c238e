// ABOUTME: Binary partition tree stored as an arena of id-linked nodes.
// ABOUTME: Supports creating, splitting, removing with merge-up, and resizing partitions.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tiler_core::{Config, Hsl, ResizeSettings};

use crate::allocator::ColorAllocator;
use crate::error::{ChangeSet, LayoutError};
use crate::geometry::Rect;
use crate::sizing::{self, FULL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionId(pub u64);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis a partition is split along.
///
/// `Vertical` places the children side by side, `Horizontal` stacks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub id: PartitionId,
    pub color: Hsl,
    /// `None` for a leaf
    pub split: Option<Direction>,
    /// Share of the parent's extent along the parent's split axis, in percent
    pub size: f64,
    pub children: Vec<PartitionId>,
    pub parent: Option<PartitionId>,
}

impl Partition {
    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }
}

/// Plain-data view of the tree, ordered by id
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub root: Option<PartitionId>,
    pub partitions: Vec<&'a Partition>,
}

#[derive(Debug)]
pub struct PartitionTree {
    partitions: HashMap<PartitionId, Partition>,
    root: Option<PartitionId>,
    next_id: u64,
    colors: ColorAllocator,
    bounds: ResizeSettings,
}

impl PartitionTree {
    /// A tree holding a single root leaf
    pub fn new(config: &Config) -> Self {
        let mut tree = Self::empty(config);
        let root = tree.insert(None, false);
        tree.root = Some(root);
        tree
    }

    /// A tree without a root; the first `create_partition(None, _)` makes one
    pub fn empty(config: &Config) -> Self {
        Self {
            partitions: HashMap::new(),
            root: None,
            next_id: 0,
            colors: ColorAllocator::new(config.palette.clone(), config.seed),
            bounds: config.resize,
        }
    }

    pub fn root(&self) -> Option<PartitionId> {
        self.root
    }

    pub fn get(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.get(&id)
    }

    pub fn partitions(&self) -> &HashMap<PartitionId, Partition> {
        &self.partitions
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn colors(&self) -> &ColorAllocator {
        &self.colors
    }

    pub fn bounds(&self) -> &ResizeSettings {
        &self.bounds
    }

    pub fn is_root(&self, id: PartitionId) -> bool {
        self.root == Some(id)
    }

    /// Split controls belong on leaves only
    pub fn can_split(&self, id: PartitionId) -> bool {
        self.get(id).is_some_and(Partition::is_leaf)
    }

    /// Resize handles belong on non-root partitions whose parent has children
    pub fn is_resizable(&self, id: PartitionId) -> bool {
        self.get(id)
            .and_then(|p| p.parent)
            .and_then(|parent| self.get(parent))
            .is_some_and(|parent| !parent.children.is_empty())
    }

    /// Leaves in left-to-right, top-to-bottom order
    pub fn leaves(&self) -> Vec<PartitionId> {
        let mut result = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut result);
        }
        result
    }

    /// Layout rectangle of every partition, root filling `Rect::full()`
    pub fn rects(&self) -> HashMap<PartitionId, Rect> {
        let mut result = HashMap::new();
        if let Some(root) = self.root {
            self.collect_rects(root, Rect::full(), &mut result);
        }
        result
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let mut partitions: Vec<&Partition> = self.partitions.values().collect();
        partitions.sort_by_key(|p| p.id);
        Snapshot {
            root: self.root,
            partitions,
        }
    }

    /// Create a partition, either the root (no parent) or a child of a split
    /// parent that still has room for one.
    pub fn create_partition(
        &mut self,
        parent: Option<PartitionId>,
        inherit_color: bool,
    ) -> Result<PartitionId, LayoutError> {
        match parent {
            None => {
                if self.root.is_some() {
                    return Err(LayoutError::Rejected("tree already has a root"));
                }
                let id = self.insert(None, false);
                self.root = Some(id);
                Ok(id)
            }
            Some(parent_id) => {
                let parent = self
                    .partitions
                    .get(&parent_id)
                    .ok_or(LayoutError::NotFound(parent_id))?;
                if parent.is_leaf() {
                    return Err(LayoutError::Rejected("parent is not split"));
                }
                if parent.children.len() >= 2 {
                    return Err(LayoutError::Rejected("parent already has two children"));
                }
                Ok(self.insert(Some(parent_id), inherit_color))
            }
        }
    }

    /// Split a leaf into two children; the first keeps the leaf's color.
    pub fn split_partition(
        &mut self,
        id: PartitionId,
        direction: Direction,
    ) -> Result<ChangeSet, LayoutError> {
        let partition = self.partitions.get_mut(&id).ok_or(LayoutError::NotFound(id))?;
        if partition.split.is_some() {
            tracing::debug!(%id, "split rejected, partition already split");
            return Err(LayoutError::AlreadySplit(id));
        }
        partition.split = Some(direction);

        let first = self.insert(Some(id), true);
        let second = self.insert(Some(id), false);
        if let Some(partition) = self.partitions.get_mut(&id) {
            partition.children = vec![first, second];
        }
        self.redistribute_children(id);

        Ok(ChangeSet {
            created: vec![first, second],
            updated: vec![id],
            ..ChangeSet::default()
        })
    }

    /// Remove a partition and its subtree, then clean up the parent chain:
    /// an emptied parent is removed in turn, a parent left with one child is
    /// collapsed into that child.
    pub fn remove_partition(&mut self, id: PartitionId) -> Result<ChangeSet, LayoutError> {
        let partition = self.partitions.get(&id).ok_or(LayoutError::NotFound(id))?;
        if self.root == Some(id) {
            return Err(LayoutError::RootRemovalForbidden);
        }
        let parent_id = partition
            .parent
            .ok_or(LayoutError::Rejected("partition is detached from the tree"))?;

        let mut changes = ChangeSet::default();
        self.detach(parent_id, id);
        self.delete_subtree(id, &mut changes);

        // each pass deletes a partition or stops, so this ends at the root at the latest
        let mut current = parent_id;
        loop {
            let Some((remaining, up)) = self
                .partitions
                .get(&current)
                .map(|n| (n.children.len(), n.parent))
            else {
                break;
            };
            match remaining {
                0 => match up {
                    Some(grandparent) => {
                        tracing::debug!(id = %current, "removing emptied parent");
                        self.detach(grandparent, current);
                        self.delete_node(current, &mut changes);
                        current = grandparent;
                    }
                    None => {
                        if let Some(root) = self.partitions.get_mut(&current) {
                            root.split = None;
                        }
                        changes.touch(current);
                        break;
                    }
                },
                1 => {
                    self.merge_up(current, &mut changes);
                    break;
                }
                _ => {
                    self.redistribute_children(current);
                    changes.touch(current);
                    break;
                }
            }
        }

        Ok(changes)
    }

    /// Move the boundary between `id` and its siblings so `id` covers
    /// `new_size` percent of its parent.
    pub fn resize_partitions(
        &mut self,
        id: PartitionId,
        new_size: f64,
    ) -> Result<ChangeSet, LayoutError> {
        let partition = self.partitions.get(&id).ok_or(LayoutError::NotFound(id))?;
        let parent_id = partition
            .parent
            .ok_or(LayoutError::Rejected("root partition has no siblings"))?;
        let children = self
            .partitions
            .get(&parent_id)
            .map(|p| p.children.clone())
            .ok_or(LayoutError::NotFound(parent_id))?;
        if children.is_empty() {
            return Err(LayoutError::Rejected("parent has no children"));
        }
        let index = children
            .iter()
            .position(|c| *c == id)
            .ok_or(LayoutError::Rejected("partition is not among its parent's children"))?;

        let mut sizes = self.child_sizes(&children);
        if let Err(e) = sizing::resize(&mut sizes, index, new_size, &self.bounds) {
            tracing::debug!(%id, new_size, "resize rejected: {}", e);
            return Err(e);
        }
        self.apply_sizes(&children, &sizes);

        Ok(ChangeSet {
            updated: children,
            ..ChangeSet::default()
        })
    }

    /// Rescale the children of `parent` so their sizes sum to 100.
    pub fn redistribute_sizes(&mut self, parent: PartitionId) -> Result<ChangeSet, LayoutError> {
        let children = self
            .partitions
            .get(&parent)
            .map(|p| p.children.clone())
            .ok_or(LayoutError::NotFound(parent))?;
        self.redistribute_children(parent);
        Ok(ChangeSet {
            updated: children,
            ..ChangeSet::default()
        })
    }

    fn insert(&mut self, parent: Option<PartitionId>, inherit_color: bool) -> PartitionId {
        let id = PartitionId(self.next_id);
        self.next_id += 1;

        let parent_color = parent.and_then(|p| self.partitions.get(&p)).map(|p| p.color);
        let color = match parent_color {
            Some(color) if inherit_color => {
                self.colors.hold(color);
                color
            }
            _ => self.colors.allocate(parent_color),
        };

        self.partitions.insert(
            id,
            Partition {
                id,
                color,
                split: None,
                size: FULL,
                children: Vec::new(),
                parent,
            },
        );

        if let Some(parent) = parent {
            if let Some(p) = self.partitions.get_mut(&parent) {
                p.children.push(id);
            }
            self.redistribute_children(parent);
        }
        id
    }

    fn detach(&mut self, parent: PartitionId, child: PartitionId) {
        if let Some(p) = self.partitions.get_mut(&parent) {
            p.children.retain(|c| *c != child);
        }
    }

    /// Delete `id` and every descendant, releasing their colors
    fn delete_subtree(&mut self, id: PartitionId, changes: &mut ChangeSet) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.partitions.get(&next) {
                stack.extend(node.children.iter().copied());
            }
            self.delete_node(next, changes);
        }
    }

    fn delete_node(&mut self, id: PartitionId, changes: &mut ChangeSet) {
        if let Some(node) = self.partitions.remove(&id) {
            self.colors.release(node.color);
            changes.updated.retain(|u| *u != id);
            changes.removed.push(id);
        }
    }

    /// Replace `parent` with its only child in the grandparent, or make the
    /// child the new root.
    fn merge_up(&mut self, parent: PartitionId, changes: &mut ChangeSet) {
        let Some(node) = self.partitions.get(&parent) else {
            return;
        };
        let child = node.children[0];
        let grandparent = node.parent;
        let size = node.size;

        match grandparent {
            Some(g) => {
                if let Some(gp) = self.partitions.get_mut(&g) {
                    for slot in gp.children.iter_mut().filter(|c| **c == parent) {
                        *slot = child;
                    }
                }
                if let Some(c) = self.partitions.get_mut(&child) {
                    c.parent = Some(g);
                    c.size = size;
                }
                self.redistribute_children(g);
            }
            None => {
                if let Some(c) = self.partitions.get_mut(&child) {
                    c.parent = None;
                    c.size = FULL;
                }
                self.root = Some(child);
                changes.root_changed = true;
                tracing::debug!(id = %child, "promoted to root");
            }
        }

        changes.touch(child);
        self.delete_node(parent, changes);
    }

    fn redistribute_children(&mut self, parent: PartitionId) {
        let Some(children) = self.partitions.get(&parent).map(|p| p.children.clone()) else {
            return;
        };
        let mut sizes = self.child_sizes(&children);
        sizing::redistribute(&mut sizes);
        self.apply_sizes(&children, &sizes);
    }

    fn child_sizes(&self, children: &[PartitionId]) -> Vec<f64> {
        children
            .iter()
            .map(|c| self.partitions.get(c).map_or(0.0, |p| p.size))
            .collect()
    }

    fn apply_sizes(&mut self, children: &[PartitionId], sizes: &[f64]) {
        for (child, size) in children.iter().zip(sizes) {
            if let Some(p) = self.partitions.get_mut(child) {
                p.size = *size;
            }
        }
    }

    fn collect_leaves(&self, id: PartitionId, out: &mut Vec<PartitionId>) {
        let Some(node) = self.partitions.get(&id) else {
            return;
        };
        if node.is_leaf() {
            out.push(id);
        }
        for child in &node.children {
            self.collect_leaves(*child, out);
        }
    }

    fn collect_rects(&self, id: PartitionId, rect: Rect, out: &mut HashMap<PartitionId, Rect>) {
        let Some(node) = self.partitions.get(&id) else {
            return;
        };
        out.insert(id, rect);
        let Some(direction) = node.split else {
            return;
        };
        let mut offset = 0.0;
        for child in &node.children {
            let size = self.partitions.get(child).map_or(0.0, |c| c.size);
            self.collect_rects(*child, rect.child(direction, offset, size), out);
            offset += size;
        }
    }
}
