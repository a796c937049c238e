// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves palette, resize and canvas settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sampling ranges for freshly allocated partition colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    /// Saturation range in percent, upper bound exclusive
    pub saturation: [f32; 2],
    /// Lightness range in percent, upper bound exclusive
    pub lightness: [f32; 2],
    /// Random draws before falling back to hue perturbation
    pub max_attempts: u32,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            saturation: [70.0, 100.0],
            lightness: [40.0, 60.0],
            max_attempts: 1024,
        }
    }
}

/// Bounds a sibling may be resized to, in percent of the parent's extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeSettings {
    pub min_size: f64,
    pub max_size: f64,
}

impl ResizeSettings {
    pub fn contains(&self, size: f64) -> bool {
        size >= self.min_size && size <= self.max_size
    }

    pub fn clamp(&self, size: f64) -> f64 {
        size.clamp(self.min_size, self.max_size)
    }
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            min_size: 10.0,
            max_size: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Color sampling
    pub palette: PaletteSettings,

    /// Interactive resize bounds
    pub resize: ResizeSettings,

    /// Fixed RNG seed for reproducible colors
    pub seed: Option<u64>,

    /// Drawing surface in terminal cells
    pub canvas_width: u16,
    pub canvas_height: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palette: PaletteSettings::default(),
            resize: ResizeSettings::default(),
            seed: None,
            canvas_width: 80,
            canvas_height: 24,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid range for {field}: {low}..{high}")]
    InvalidRange {
        field: &'static str,
        low: f64,
        high: f64,
    },
}

impl Config {
    /// Get the default config file path (~/.config/tiler/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tiler").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject ranges the color sampler or resize logic cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("palette.saturation", self.palette.saturation, 100.0)?;
        check_range("palette.lightness", self.palette.lightness, 100.0)?;

        let ResizeSettings { min_size, max_size } = self.resize;
        if !(min_size > 0.0 && min_size <= max_size && max_size < 100.0) {
            return Err(ConfigError::InvalidRange {
                field: "resize",
                low: min_size,
                high: max_size,
            });
        }
        Ok(())
    }
}

fn check_range(field: &'static str, [low, high]: [f32; 2], limit: f32) -> Result<(), ConfigError> {
    if low >= 0.0 && low < high && high <= limit {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange {
            field,
            low: low as f64,
            high: high as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            seed: Some(42),
            canvas_width: 120,
            resize: ResizeSettings {
                min_size: 20.0,
                max_size: 80.0,
            },
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "seed = 7\n\n[resize]\nmin_size = 15.0\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.seed, Some(7));
        assert_eq!(loaded.resize.min_size, 15.0);
        assert_eq!(loaded.resize.max_size, 90.0);
        assert_eq!(loaded.palette, PaletteSettings::default());
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let mut config = Config::default();
        config.palette.lightness = [60.0, 40.0];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { field: "palette.lightness", .. })
        ));

        let mut config = Config::default();
        config.resize.max_size = 100.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resize_clamp() {
        let bounds = ResizeSettings::default();
        assert_eq!(bounds.clamp(95.0), 90.0);
        assert_eq!(bounds.clamp(3.0), 10.0);
        assert!(bounds.contains(10.0));
        assert!(!bounds.contains(90.5));
    }

    #[test]
    fn test_default_path() {
        if let Some(p) = Config::default_path() {
            assert!(p.ends_with("tiler/config.toml"));
        }
    }
}
