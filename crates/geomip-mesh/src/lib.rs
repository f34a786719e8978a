//! Patch meshing for geomipmapped terrain: triangle fans with edge
//! stitching, precomputed index tables, vertex buffers, and the per-frame
//! terrain driver.

mod fan;
mod index_table;
mod terrain;
mod vertex;

pub use fan::{
    MAX_FAN_INDICES, MIN_FAN_INDICES, TriangleFan, emit_fan, fan_center, fan_half_step,
    fan_spacing, fan_to_triangles, fans_per_side, mesh_patch,
};
pub use index_table::PatchIndexTable;
pub use terrain::{FrameStats, GeomipTerrain, TerrainFrame, TerrainSettings, VisiblePatch};
pub use vertex::{TerrainVertex, build_patch_vertices};
