//! Property-based tests for the partition tree.
//!
//! Drives random split/remove/resize sequences and checks the structural
//! invariants after every step.

use std::collections::HashSet;

use proptest::prelude::*;
use tiler_core::Config;
use tiler_layout::{Direction, LayoutError, PartitionId, PartitionTree, SIZE_EPSILON};

#[derive(Debug, Clone)]
enum Op {
    Split(usize, Direction),
    Remove(usize),
    Resize(usize, f64),
    Redistribute(usize),
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Vertical), Just(Direction::Horizontal)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<usize>(), direction()).prop_map(|(i, d)| Op::Split(i, d)),
        2 => any::<usize>().prop_map(Op::Remove),
        2 => (any::<usize>(), -20.0..120.0f64).prop_map(|(i, s)| Op::Resize(i, s)),
        1 => any::<usize>().prop_map(Op::Redistribute),
    ]
}

fn pick(tree: &PartitionTree, index: usize) -> PartitionId {
    let mut ids: Vec<PartitionId> = tree.partitions().keys().copied().collect();
    ids.sort();
    ids[index % ids.len()]
}

fn apply(tree: &mut PartitionTree, op: &Op) -> Result<(), LayoutError> {
    match *op {
        Op::Split(i, d) => tree.split_partition(pick(tree, i), d).map(|_| ()),
        Op::Remove(i) => tree.remove_partition(pick(tree, i)).map(|_| ()),
        Op::Resize(i, s) => tree.resize_partitions(pick(tree, i), s).map(|_| ()),
        Op::Redistribute(i) => tree.redistribute_sizes(pick(tree, i)).map(|_| ()),
    }
}

fn seeded(seed: u64) -> PartitionTree {
    PartitionTree::new(&Config {
        seed: Some(seed),
        ..Config::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every completed or rejected operation leaves a well-formed tree.
    #[test]
    fn invariants_hold_after_every_step(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..60)) {
        let mut tree = seeded(seed);
        for op in &ops {
            let _ = apply(&mut tree, op);
            prop_assert_eq!(tree.check_invariants(), Ok(()), "after {:?}", op);
            prop_assert!(!tree.is_empty());
        }
    }

    /// A rejected operation changes nothing.
    #[test]
    fn rejection_leaves_state_untouched(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..40)) {
        let mut tree = seeded(seed);
        for op in &ops {
            let before = tree.partitions().clone();
            let root_before = tree.root();
            let held_before = tree.colors().len();
            if apply(&mut tree, op).is_err() {
                prop_assert_eq!(tree.partitions(), &before, "rejected {:?} mutated the tree", op);
                prop_assert_eq!(tree.root(), root_before);
                prop_assert_eq!(tree.colors().len(), held_before);
            }
        }
    }

    /// Live leaves never share a color.
    #[test]
    fn leaf_colors_are_unique(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..60)) {
        let mut tree = seeded(seed);
        for op in &ops {
            let _ = apply(&mut tree, op);
        }
        let leaves = tree.leaves();
        let keys: HashSet<_> = leaves
            .iter()
            .map(|id| tree.get(*id).unwrap().color.key())
            .collect();
        prop_assert_eq!(keys.len(), leaves.len());
    }

    /// Binary resize either lands exactly on the complement pair or is rejected.
    #[test]
    fn binary_resize_is_exact_or_rejected(seed in any::<u64>(), size in 0.0..100.0f64) {
        let mut tree = seeded(seed);
        let root = tree.root().unwrap();
        let children = tree.split_partition(root, Direction::Vertical).unwrap().created;

        match tree.resize_partitions(children[0], size) {
            Ok(_) => {
                prop_assert!((10.0..=90.0).contains(&(100.0 - size)));
                prop_assert!((tree.get(children[0]).unwrap().size - size).abs() < SIZE_EPSILON);
                prop_assert!((tree.get(children[1]).unwrap().size - (100.0 - size)).abs() < SIZE_EPSILON);
            }
            Err(LayoutError::OutOfBounds { .. }) => {
                prop_assert!(!(10.0..=90.0).contains(&(100.0 - size)));
                prop_assert!((tree.get(children[0]).unwrap().size - 50.0).abs() < SIZE_EPSILON);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    /// Leaf rectangles tile the viewport.
    #[test]
    fn leaf_areas_cover_viewport(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..40)) {
        let mut tree = seeded(seed);
        for op in &ops {
            let _ = apply(&mut tree, op);
        }
        let rects = tree.rects();
        let area: f64 = tree
            .leaves()
            .iter()
            .map(|id| (rects[id].width * rects[id].height) as f64)
            .sum();
        prop_assert!((area - 1.0).abs() < 1e-3, "leaf area {}", area);
    }
}

#[test]
fn split_then_remove_returns_to_single_leaf() {
    let mut tree = seeded(5);
    let root = tree.root().unwrap();
    let color = tree.get(root).unwrap().color;
    let children = tree.split_partition(root, Direction::Horizontal).unwrap().created;

    tree.remove_partition(children[1]).unwrap();

    assert_eq!(tree.len(), 1);
    let survivor = tree.root().unwrap();
    assert_eq!(survivor, children[0]);
    assert_eq!(tree.get(survivor).unwrap().color, color);
    assert!(tree.get(survivor).unwrap().is_leaf());
    assert_eq!(tree.colors().len(), 1);
}
