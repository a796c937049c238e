// ABOUTME: Error and change-notification types for partition tree operations.
// ABOUTME: A rejected operation returns an error and leaves the tree unchanged.

use crate::tree::PartitionId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("Partition {0} does not exist")]
    NotFound(PartitionId),

    #[error("Partition {0} is already split")]
    AlreadySplit(PartitionId),

    #[error("The root partition cannot be removed")]
    RootRemovalForbidden,

    #[error("Size {size:.2} is outside {min}..={max}")]
    OutOfBounds { size: f64, min: f64, max: f64 },

    #[error("Rejected: {0}")]
    Rejected(&'static str),
}

/// Partitions touched by a completed mutation.
///
/// Renderers use this to decide what to redraw instead of observing the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub created: Vec<PartitionId>,
    pub removed: Vec<PartitionId>,
    pub updated: Vec<PartitionId>,
    pub root_changed: bool,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.removed.is_empty()
            && self.updated.is_empty()
            && !self.root_changed
    }

    pub(crate) fn touch(&mut self, id: PartitionId) {
        if !self.updated.contains(&id) && !self.created.contains(&id) {
            self.updated.push(id);
        }
    }

    /// Fold another change into this one; ids removed later drop out of `updated`.
    pub fn merge(&mut self, other: ChangeSet) {
        for id in other.created {
            if !self.created.contains(&id) {
                self.created.push(id);
            }
        }
        for id in other.updated {
            self.touch(id);
        }
        for id in other.removed {
            self.updated.retain(|u| *u != id);
            self.created.retain(|c| *c != id);
            if !self.removed.contains(&id) {
                self.removed.push(id);
            }
        }
        self.root_changed |= other.root_changed;
    }
}
