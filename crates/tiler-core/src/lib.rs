// ABOUTME: Shared types and configuration for tiler.
// ABOUTME: Defines colors, palette and resize settings, and config file handling.

pub mod color;
pub mod config;

pub use color::{Color, ColorKey, Hsl};
pub use config::{Config, ConfigError, PaletteSettings, ResizeSettings};
