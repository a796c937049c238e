// ABOUTME: Sibling size arithmetic along a split axis.
// ABOUTME: Normalizes sizes to 100 percent and moves the boundary between siblings.

use tiler_core::ResizeSettings;

use crate::error::LayoutError;

/// Total extent every set of siblings shares, in percent
pub const FULL: f64 = 100.0;

/// Scale `sizes` so they sum to [`FULL`].
///
/// Idempotent: a second call scales by one. A set whose total is zero or not
/// finite cannot be scaled and is reset to equal shares instead.
pub fn redistribute(sizes: &mut [f64]) {
    if sizes.is_empty() {
        return;
    }
    let total: f64 = sizes.iter().sum();
    if total > 0.0 && total.is_finite() {
        let scale = FULL / total;
        for size in sizes.iter_mut() {
            *size *= scale;
        }
    } else {
        let share = FULL / sizes.len() as f64;
        sizes.fill(share);
    }
}

/// Give `sizes[index]` the share `new_size` and take the difference out of
/// its siblings, then renormalize.
///
/// With exactly one sibling the pair is set to `new_size` and its complement,
/// and the call is rejected when the complement falls outside `bounds`.
/// With more siblings each one absorbs the delta in proportion to its current
/// share of the sibling total; individual siblings are not bounded there.
/// On error `sizes` is untouched.
pub fn resize(
    sizes: &mut [f64],
    index: usize,
    new_size: f64,
    bounds: &ResizeSettings,
) -> Result<(), LayoutError> {
    if index >= sizes.len() {
        return Err(LayoutError::Rejected("resize index outside sibling set"));
    }
    if !new_size.is_finite() {
        return Err(LayoutError::OutOfBounds {
            size: new_size,
            min: bounds.min_size,
            max: bounds.max_size,
        });
    }

    if sizes.len() == 2 {
        let complement = FULL - new_size;
        if !bounds.contains(complement) {
            return Err(LayoutError::OutOfBounds {
                size: complement,
                min: bounds.min_size,
                max: bounds.max_size,
            });
        }
        sizes[index] = new_size;
        sizes[1 - index] = complement;
    } else {
        let delta = new_size - sizes[index];
        sizes[index] = new_size;

        let sibling_total: f64 = sizes
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, s)| *s)
            .sum();
        let siblings = sizes.len() - 1;
        for (i, size) in sizes.iter_mut().enumerate() {
            if i == index {
                continue;
            }
            let proportion = if sibling_total != 0.0 {
                *size / sibling_total
            } else {
                1.0 / siblings as f64
            };
            *size -= delta * proportion;
        }
    }

    redistribute(sizes);
    Ok(())
}
