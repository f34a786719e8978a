//! Geomipmapping level-of-detail: the patch grid, distance-based LOD
//! selection, and neighbor stitching rules that keep adjacent patches crack-free.

mod error;
mod grid;
mod patch;
mod selector;
mod stitch;

pub use error::GeomipError;
pub use grid::{LodPassStats, MAX_GRID_SIZE, PatchGrid, validate_layout, validate_patch_size};
pub use patch::{Patch, PatchBounds, PatchCoord, Side, max_lod_for_patch_size};
pub use selector::{LodPolicy, LodSelection, LodSelector, planar_distance};
pub use stitch::{EdgeFlags, FanCoord, NeighborLods, resolve_fan_edges, resolve_patch_edges};
