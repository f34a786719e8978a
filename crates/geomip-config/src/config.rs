//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the config inside its directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Patch layout and LOD settings.
    pub terrain: TerrainConfig,
    /// Where heights come from.
    pub heightfield: HeightfieldConfig,
    /// Scripted viewer path for the headless demo.
    pub viewer: ViewerConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Patch layout and LOD configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Height field side length in cells; the field holds one more sample.
    pub grid_size: u32,
    /// Vertices per patch side, `2^n + 1`.
    pub patch_size: u32,
    /// World units per LOD step for the linear policy.
    pub distance_unit: f32,
    /// Explicit LOD distance boundaries. Overrides `distance_unit` when set.
    pub lod_thresholds: Vec<f32>,
    /// Multiplier applied to normalized heights.
    pub height_scale: f32,
}

/// Height source for the terrain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum HeightSource {
    /// Generate heights by fault formation.
    #[default]
    Fault,
    /// Load a grayscale image.
    Image(PathBuf),
}

/// Height field configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeightfieldConfig {
    /// Where heights come from.
    pub source: HeightSource,
    /// Fault lines to cut.
    pub iterations: u32,
    /// Raise amount of the last fault.
    pub min_delta: f32,
    /// Raise amount of the first fault.
    pub max_delta: f32,
    /// Erosion filter strength in `[0, 1]`.
    pub filter: f32,
    /// Seed for fault generation.
    pub seed: u64,
    /// Write a grayscale preview of the field here after loading.
    pub preview_path: Option<PathBuf>,
}

/// Viewer path: a start point moved by a fixed velocity each frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Start position `[x, y, z]`; z is height above the ground plane.
    pub start: [f32; 3],
    /// Displacement per frame.
    pub velocity: [f32; 3],
    /// Frames to run.
    pub frames: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for JSON log files in debug builds. Defaults to `logs`
    /// under the config directory.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid_size: 256,
            patch_size: 17,
            distance_unit: 300.0,
            lod_thresholds: Vec::new(),
            height_scale: 40.0,
        }
    }
}

impl Default for HeightfieldConfig {
    fn default() -> Self {
        Self {
            source: HeightSource::Fault,
            iterations: 64,
            min_delta: 0.0,
            max_delta: 255.0,
            filter: 0.3,
            seed: 42,
            preview_path: None,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            start: [0.0, 0.0, 50.0],
            velocity: [2.0, 2.0, 0.0],
            frames: 128,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE_NAME), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values no terrain could be built from.
    ///
    /// Layout rules that depend on several fields together (an exact patch
    /// tiling) are left to the terrain itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let terrain = &self.terrain;
        if terrain.lod_thresholds.is_empty()
            && !(terrain.distance_unit.is_finite() && terrain.distance_unit > 0.0)
        {
            return Err(invalid(
                "terrain.distance_unit",
                format!("{} is not a positive distance", terrain.distance_unit),
            ));
        }
        if terrain.lod_thresholds.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid(
                "terrain.lod_thresholds",
                "thresholds must be strictly increasing".to_string(),
            ));
        }
        if !terrain.height_scale.is_finite() {
            return Err(invalid(
                "terrain.height_scale",
                format!("{} is not finite", terrain.height_scale),
            ));
        }
        if !(0.0..=1.0).contains(&self.heightfield.filter) {
            return Err(invalid(
                "heightfield.filter",
                format!("{} is outside [0, 1]", self.heightfield.filter),
            ));
        }
        Ok(())
    }

    fn read(config_path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(config_path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("grid_size: 256"));
        assert!(ron_str.contains("patch_size: 17"));
        assert!(ron_str.contains("source: Fault"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(terrain: (patch_size: 33))").unwrap();
        assert_eq!(config.terrain.patch_size, 33);
        assert_eq!(config.terrain.grid_size, 256);
        assert_eq!(config.heightfield, HeightfieldConfig::default());
        assert_eq!(config.viewer, ViewerConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_image_source_parses() {
        let config: Config =
            ron::from_str(r#"(heightfield: (source: Image("maps/height.png")))"#).unwrap();
        assert_eq!(
            config.heightfield.source,
            HeightSource::Image(PathBuf::from("maps/height.png"))
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.terrain.patch_size = 65;
        config.heightfield.source = HeightSource::Image(PathBuf::from("height.png"));
        config.viewer.frames = 7;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("geomip");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.terrain.distance_unit = 120.0;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.terrain.distance_unit), Some(120.0));
        assert!(modified.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_reload_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::default().reload(dir.path());
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_invalid_ron_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.terrain.distance_unit = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "terrain.distance_unit",
                ..
            })
        ));
        // Thresholds take over from the distance unit.
        config.terrain.lod_thresholds = vec![50.0, 150.0];
        assert!(config.validate().is_ok());
        config.terrain.lod_thresholds = vec![150.0, 50.0];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.heightfield.filter = 1.5;
        assert!(config.validate().is_err());
    }
}
