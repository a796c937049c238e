// ABOUTME: Unique color allocation for partitions.
// ABOUTME: Rejection-samples HSL colors and tracks which ones are held by live partitions.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tiler_core::{ColorKey, Hsl, PaletteSettings};

/// Hue step used once random sampling gives up
const PERTURB_STEP: f32 = 0.01;

/// Pool of colors currently held by live partitions.
///
/// A color inherited by a first child is held by both the child and its
/// parent, so colors are reference counted and only become available again
/// when the last holder releases them.
#[derive(Debug)]
pub struct ColorAllocator {
    held: HashMap<ColorKey, usize>,
    palette: PaletteSettings,
    rng: SmallRng,
}

impl ColorAllocator {
    pub fn new(palette: PaletteSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            held: HashMap::new(),
            palette,
            rng,
        }
    }

    /// Draw a color nobody holds, distinct from `avoid`, and hold it once.
    pub fn allocate(&mut self, avoid: Option<Hsl>) -> Hsl {
        let avoid = avoid.map(|c| c.key());
        let is_free = |held: &HashMap<ColorKey, usize>, c: &Hsl| {
            let key = c.key();
            !held.contains_key(&key) && Some(key) != avoid
        };

        let mut color = self.sample();
        let mut attempts = 1;
        while !is_free(&self.held, &color) {
            if attempts >= self.palette.max_attempts {
                tracing::debug!(attempts, "color sampling exhausted, perturbing hue");
                let base = color;
                // the held set is finite, so some step lands on a free hue
                let mut step = 1u32;
                while !is_free(&self.held, &color) {
                    color = base.rotate_hue(step as f32 * PERTURB_STEP);
                    step += 1;
                }
                break;
            }
            color = self.sample();
            attempts += 1;
        }

        self.hold(color);
        color
    }

    /// Register one more holder of an existing color.
    pub fn hold(&mut self, color: Hsl) {
        *self.held.entry(color.key()).or_insert(0) += 1;
    }

    /// Drop one holder. Returns true when the color became available again.
    pub fn release(&mut self, color: Hsl) -> bool {
        let key = color.key();
        match self.held.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.held.remove(&key);
                true
            }
            None => false,
        }
    }

    pub fn is_held(&self, color: Hsl) -> bool {
        self.held.contains_key(&color.key())
    }

    pub fn holders(&self, color: Hsl) -> usize {
        self.held.get(&color.key()).copied().unwrap_or(0)
    }

    /// Number of distinct colors in use
    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    fn sample(&mut self) -> Hsl {
        let [s_lo, s_hi] = self.palette.saturation;
        let [l_lo, l_hi] = self.palette.lightness;
        Hsl::new(
            self.rng.random_range(0.0..360.0),
            self.rng.random_range(s_lo..s_hi),
            self.rng.random_range(l_lo..l_hi),
        )
    }
}
