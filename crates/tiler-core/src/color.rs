// ABOUTME: Color representation and conversion utilities.
// ABOUTME: Partition fills are HSL colors; renderers convert them to RGB.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// 8-bit channels, alpha dropped
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Relative luminance, used to pick a readable label color
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A color in HSL space.
///
/// `hue` is in degrees `[0, 360)`, `saturation` and `lightness` are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

/// Bit-exact identity of an [`Hsl`] value, usable as a hash key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorKey(u32, u32, u32);

impl Hsl {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    pub fn key(&self) -> ColorKey {
        // -0.0 and 0.0 must collide
        let bits = |v: f32| (v + 0.0).to_bits();
        ColorKey(bits(self.hue), bits(self.saturation), bits(self.lightness))
    }

    /// Same color with the hue rotated by `degrees`, wrapped into `[0, 360)`
    pub fn rotate_hue(&self, degrees: f32) -> Self {
        Self {
            hue: (self.hue + degrees).rem_euclid(360.0),
            ..*self
        }
    }

    pub fn to_rgb(&self) -> Color {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = self.hue.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Color::rgb(r + m, g + m, b + m)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({:.1}, {:.1}%, {:.1}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}
