// ABOUTME: Partition layout management for tiler.
// ABOUTME: A binary partition tree with split, merge-up removal and proportional resize.

pub mod allocator;
mod error;
pub mod geometry;
pub mod sizing;
mod tree;
mod validate;

pub use allocator::ColorAllocator;
pub use error::{ChangeSet, LayoutError};
pub use geometry::{drag_size, Rect};
pub use tree::{Direction, Partition, PartitionId, PartitionTree, Snapshot};
pub use validate::{InvariantViolation, SIZE_EPSILON};
