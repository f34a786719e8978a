//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::config::HeightSource;

/// Geomipmapping demo command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "geomip", about = "Geomipmapped terrain LOD demo")]
pub struct CliArgs {
    /// Height field side length in cells.
    #[arg(long)]
    pub grid_size: Option<u32>,

    /// Vertices per patch side (2^n + 1).
    #[arg(long)]
    pub patch_size: Option<u32>,

    /// World units per LOD step.
    #[arg(long)]
    pub distance_unit: Option<f32>,

    /// Grayscale height map image; replaces fault generation.
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Seed for fault generation.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(size) = args.grid_size {
            self.terrain.grid_size = size;
        }
        if let Some(size) = args.patch_size {
            self.terrain.patch_size = size;
        }
        if let Some(unit) = args.distance_unit {
            self.terrain.distance_unit = unit;
            self.terrain.lod_thresholds.clear();
        }
        if let Some(ref path) = args.heightmap {
            self.heightfield.source = HeightSource::Image(path.clone());
        }
        if let Some(frames) = args.frames {
            self.viewer.frames = frames;
        }
        if let Some(seed) = args.seed {
            self.heightfield.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
