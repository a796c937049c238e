// ABOUTME: Normalized rectangles for laying out nested partitions.
// ABOUTME: Also converts pointer positions into sibling size percentages.

use tiler_core::ResizeSettings;

use crate::sizing::FULL;
use crate::tree::Direction;

/// Rectangle in normalized coordinates (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Extent along the axis children of a `direction` split are laid out on
    pub fn extent(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Vertical => self.width,
            Direction::Horizontal => self.height,
        }
    }

    /// Child box starting `offset` percent into this one and spanning `size`
    /// percent along the split axis; the cross axis is taken whole.
    pub fn child(&self, direction: Direction, offset: f64, size: f64) -> Rect {
        let start = (offset / FULL) as f32;
        let span = (size / FULL) as f32;
        match direction {
            Direction::Vertical => Rect {
                x: self.x + self.width * start,
                y: self.y,
                width: self.width * span,
                height: self.height,
            },
            Direction::Horizontal => Rect {
                x: self.x,
                y: self.y + self.height * start,
                width: self.width,
                height: self.height * span,
            },
        }
    }
}

/// Percentage of `parent` covered up to the pointer at `(x, y)` along the
/// parent's split axis, clamped to `bounds`.
pub fn drag_size(
    parent: Rect,
    direction: Direction,
    x: f32,
    y: f32,
    bounds: &ResizeSettings,
) -> f64 {
    let (cursor, origin) = match direction {
        Direction::Vertical => (x, parent.x),
        Direction::Horizontal => (y, parent.y),
    };
    let extent = parent.extent(direction);
    if extent <= 0.0 || !extent.is_finite() {
        return bounds.clamp(FULL / 2.0);
    }
    let size = ((cursor - origin) / extent) as f64 * FULL;
    if size.is_nan() {
        return bounds.clamp(FULL / 2.0);
    }
    bounds.clamp(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    #[test]
    fn vertical_child_splits_width() {
        let r = Rect::full().child(Direction::Vertical, 30.0, 70.0);
        assert!(approx_eq(r.x, 0.3));
        assert!(approx_eq(r.width, 0.7));
        assert!(approx_eq(r.height, 1.0));
    }

    #[test]
    fn horizontal_child_splits_height() {
        let parent = Rect {
            x: 0.5,
            y: 0.0,
            width: 0.5,
            height: 1.0,
        };
        let r = parent.child(Direction::Horizontal, 50.0, 50.0);
        assert!(approx_eq(r.x, 0.5));
        assert!(approx_eq(r.y, 0.5));
        assert!(approx_eq(r.width, 0.5));
        assert!(approx_eq(r.height, 0.5));
    }

    #[test]
    fn drag_uses_parent_axis() {
        let parent = Rect {
            x: 0.2,
            y: 0.0,
            width: 0.4,
            height: 1.0,
        };
        let bounds = ResizeSettings::default();
        let size = drag_size(parent, Direction::Vertical, 0.3, 0.9, &bounds);
        assert!((size - 25.0).abs() < 1e-4);
        let size = drag_size(parent, Direction::Horizontal, 0.3, 0.6, &bounds);
        assert!((size - 60.0).abs() < 1e-4);
    }

    #[test]
    fn drag_clamps_to_bounds() {
        let bounds = ResizeSettings::default();
        assert_eq!(drag_size(Rect::full(), Direction::Vertical, 0.99, 0.0, &bounds), 90.0);
        assert_eq!(drag_size(Rect::full(), Direction::Vertical, -1.0, 0.0, &bounds), 10.0);
    }

    #[test]
    fn drag_on_degenerate_parent_is_centered() {
        let flat = Rect {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 1.0,
        };
        let bounds = ResizeSettings::default();
        assert_eq!(drag_size(flat, Direction::Vertical, 0.5, 0.5, &bounds), 50.0);
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::full().child(Direction::Vertical, 0.0, 50.0);
        assert!(r.contains(0.0, 0.0));
        assert!(!r.contains(0.5, 0.5));
    }
}
