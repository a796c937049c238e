// ABOUTME: Structural invariant checks for the partition tree.
// ABOUTME: Used by tests and by the driver's `check` command.

use std::collections::{HashMap, HashSet};

use tiler_core::ColorKey;

use crate::sizing::FULL;
use crate::tree::{PartitionId, PartitionTree};

/// Tolerance for sibling size sums
pub const SIZE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Tree has partitions but no root")]
    MissingRoot,

    #[error("Root {0} is not in the partition map")]
    DanglingRoot(PartitionId),

    #[error("Expected exactly one parentless partition, found {0}")]
    ParentlessCount(usize),

    #[error("Partition {parent} lists missing child {child}")]
    DanglingChild {
        parent: PartitionId,
        child: PartitionId,
    },

    #[error("Partition {child} does not point back to parent {parent}")]
    BrokenBackLink {
        parent: PartitionId,
        child: PartitionId,
    },

    #[error("Partition {0} is reachable more than once")]
    Revisited(PartitionId),

    #[error("{0} partitions are unreachable from the root")]
    Orphans(usize),

    #[error("Partition {0} has a split flag that disagrees with its children")]
    SplitMismatch(PartitionId),

    #[error("Partition {id} has {count} children, expected 2")]
    NotBinary { id: PartitionId, count: usize },

    #[error("Children of {id} sum to {sum}")]
    SizeSum { id: PartitionId, sum: f64 },

    #[error("Partition {id} shares a color it did not inherit")]
    SharedColor { id: PartitionId },

    #[error("Allocator holds {held} colors but {live} are live")]
    ColorLedger { held: usize, live: usize },
}

impl PartitionTree {
    /// Verify every structural invariant, reporting the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root() else {
            return if self.is_empty() {
                Ok(())
            } else {
                Err(InvariantViolation::MissingRoot)
            };
        };
        if self.get(root).is_none() {
            return Err(InvariantViolation::DanglingRoot(root));
        }

        let parentless = self
            .partitions()
            .values()
            .filter(|p| p.parent.is_none())
            .count();
        if parentless != 1 || self.get(root).is_some_and(|r| r.parent.is_some()) {
            return Err(InvariantViolation::ParentlessCount(parentless));
        }

        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(InvariantViolation::Revisited(id));
            }
            let Some(node) = self.get(id) else {
                continue;
            };

            match (node.split.is_some(), node.children.len()) {
                (false, 0) => {}
                (false, _) | (true, 0) => return Err(InvariantViolation::SplitMismatch(id)),
                (true, 2) => {}
                (true, count) => return Err(InvariantViolation::NotBinary { id, count }),
            }

            let mut sum = 0.0;
            for &child in &node.children {
                let Some(c) = self.get(child) else {
                    return Err(InvariantViolation::DanglingChild { parent: id, child });
                };
                if c.parent != Some(id) {
                    return Err(InvariantViolation::BrokenBackLink { parent: id, child });
                }
                sum += c.size;
                stack.push(child);
            }
            if !node.children.is_empty() && (sum - FULL).abs() > SIZE_EPSILON {
                return Err(InvariantViolation::SizeSum { id, sum });
            }
        }
        if visited.len() != self.len() {
            return Err(InvariantViolation::Orphans(self.len() - visited.len()));
        }

        self.check_colors()
    }

    /// A color may only be shared along a first-child inheritance chain, so
    /// the nodes that introduced a color (chain heads) must all differ.
    fn check_colors(&self) -> Result<(), InvariantViolation> {
        let mut heads: HashMap<ColorKey, PartitionId> = HashMap::new();
        for node in self.partitions().values() {
            let parent = node.parent.and_then(|p| self.get(p));
            let inherited = parent.is_some_and(|p| {
                p.color.key() == node.color.key() && p.children.first() == Some(&node.id)
            });
            if inherited {
                continue;
            }
            if heads.insert(node.color.key(), node.id).is_some() {
                return Err(InvariantViolation::SharedColor { id: node.id });
            }
        }

        let held = self.colors().len();
        if held != heads.len() {
            return Err(InvariantViolation::ColorLedger {
                held,
                live: heads.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tiler_core::Config;

    use crate::tree::Direction;

    use super::*;

    fn tree() -> PartitionTree {
        PartitionTree::new(&Config {
            seed: Some(3),
            ..Config::default()
        })
    }

    #[test]
    fn fresh_and_empty_trees_are_valid() {
        assert_eq!(tree().check_invariants(), Ok(()));
        assert_eq!(PartitionTree::empty(&Config::default()).check_invariants(), Ok(()));
    }

    #[test]
    fn valid_after_mixed_operations() {
        let mut t = tree();
        let root = t.root().unwrap();
        let c = t.split_partition(root, Direction::Vertical).unwrap().created;
        t.check_invariants().unwrap();
        let d = t.split_partition(c[1], Direction::Horizontal).unwrap().created;
        t.check_invariants().unwrap();
        t.resize_partitions(d[0], 35.0).unwrap();
        t.check_invariants().unwrap();
        t.remove_partition(c[0]).unwrap();
        t.check_invariants().unwrap();
        t.remove_partition(d[1]).unwrap();
        t.check_invariants().unwrap();
        assert_eq!(t.len(), 1);
    }
}
