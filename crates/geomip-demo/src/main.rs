//! Headless geomipmapping demo: builds a terrain from config, flies a viewer
//! across it, and logs per-frame LOD statistics.

use std::error::Error;

use clap::Parser;
use geomip_config::{CliArgs, Config, HeightSource, HeightfieldConfig, TerrainConfig};
use geomip_heightfield::{FaultParams, HeightFieldError, HeightGrid, fault};
use geomip_lod::LodPolicy;
use geomip_mesh::{FrameStats, GeomipTerrain, TerrainSettings};
use glam::Vec3;

/// Totals over a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct RunSummary {
    frames: u32,
    triangles: usize,
    peak_patches: usize,
    peak_culled: usize,
}

impl RunSummary {
    fn record(&mut self, stats: &FrameStats) {
        self.frames += 1;
        self.triangles += stats.triangles;
        self.peak_patches = self.peak_patches.max(stats.patches);
        self.peak_culled = self.peak_culled.max(stats.culled);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone() {
        Some(dir) => dir,
        None => dirs::config_dir()
            .ok_or("could not resolve a config directory")?
            .join("geomip"),
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config
        .debug
        .log_dir
        .clone()
        .unwrap_or_else(|| config_dir.join("logs"));
    geomip_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(summary) => {
            tracing::info!(
                frames = summary.frames,
                triangles = summary.triangles,
                peak_patches = summary.peak_patches,
                peak_culled = summary.peak_culled,
                "run complete"
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(%err, "terrain demo failed");
            Err(err)
        }
    }
}

/// Build the terrain described by `config` and fly the configured viewer path.
fn run(config: &Config) -> Result<RunSummary, Box<dyn Error>> {
    config.validate()?;

    let field = build_height_field(&config.heightfield, config.terrain.grid_size)?;
    if let Some(path) = &config.heightfield.preview_path {
        field.save_image(path)?;
        tracing::info!(path = %path.display(), "saved height field preview");
    }

    let mut terrain = GeomipTerrain::new(field, terrain_settings(&config.terrain))?;

    let start = Vec3::from_array(config.viewer.start);
    let velocity = Vec3::from_array(config.viewer.velocity);
    let mut summary = RunSummary::default();
    for index in 0..config.viewer.frames {
        let viewer = start + velocity * index as f32;
        let frame = terrain.frame(viewer)?;
        let stats = frame.stats;
        tracing::debug!(
            frame = index,
            viewer = ?viewer,
            patches = stats.patches,
            culled = stats.culled,
            fans = stats.fans,
            vertices = stats.vertices,
            triangles = stats.triangles,
            "frame stats"
        );
        summary.record(&stats);
    }
    Ok(summary)
}

/// Load or generate heights for a terrain of `grid_size` cells per side.
///
/// The field needs `grid_size + 1` samples per side so the last patch row
/// has its far edge.
fn build_height_field(
    config: &HeightfieldConfig,
    grid_size: u32,
) -> Result<HeightGrid, HeightFieldError> {
    let samples = grid_size + 1;
    match &config.source {
        HeightSource::Fault => {
            let params = FaultParams {
                iterations: config.iterations,
                min_delta: config.min_delta,
                max_delta: config.max_delta,
                filter: config.filter,
                seed: config.seed,
            };
            fault::generate(samples, &params)
        }
        HeightSource::Image(path) => {
            let grid = HeightGrid::from_image(path)?;
            if grid.width() < samples || grid.length() < samples {
                tracing::warn!(
                    path = %path.display(),
                    width = grid.width(),
                    length = grid.length(),
                    needed = samples,
                    "height map is smaller than the terrain; missing samples read as 0"
                );
            }
            Ok(grid)
        }
    }
}

fn terrain_settings(config: &TerrainConfig) -> TerrainSettings {
    let lod_policy = if config.lod_thresholds.is_empty() {
        LodPolicy::Linear {
            distance_unit: config.distance_unit,
        }
    } else {
        LodPolicy::Thresholds(config.lod_thresholds.clone())
    };
    TerrainSettings {
        grid_size: config.grid_size,
        patch_size: config.patch_size,
        lod_policy,
        height_scale: config.height_scale,
    }
}
