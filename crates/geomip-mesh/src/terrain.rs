//! The per-frame terrain driver: LOD pass, stitching, and fan emission.

use std::sync::Arc;

use geomip_heightfield::HeightField;
use geomip_lod::{EdgeFlags, GeomipError, LodPolicy, LodSelector, PatchCoord, PatchGrid};
use glam::Vec3;

use crate::fan::TriangleFan;
use crate::index_table::PatchIndexTable;
use crate::vertex::{TerrainVertex, build_patch_vertices};

/// Layout and LOD parameters fixed for the lifetime of a terrain.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    /// Height field side length in cells.
    pub grid_size: u32,
    /// Vertices per patch side.
    pub patch_size: u32,
    /// How viewer distance maps to LOD.
    pub lod_policy: LodPolicy,
    /// Multiplier applied to height samples.
    pub height_scale: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            grid_size: 256,
            patch_size: 17,
            lod_policy: LodPolicy::Linear {
                distance_unit: 300.0,
            },
            height_scale: 40.0,
        }
    }
}

/// A patch that survived the LOD pass, with its stitched fans.
#[derive(Clone, Debug, PartialEq)]
pub struct VisiblePatch {
    /// Position in the patch grid.
    pub coord: PatchCoord,
    /// Level the patch renders at.
    pub lod: u8,
    /// Planar viewer distance that chose `lod`.
    pub distance: f32,
    /// Resolved patch edge flags.
    pub edges: EdgeFlags,
    /// Fans in row-major fan-grid order, shared with the index table.
    pub fans: Arc<[TriangleFan]>,
}

/// Counters for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Patches rendered.
    pub patches: usize,
    /// Patches dropped beyond the coarsest LOD.
    pub culled: usize,
    /// Fans emitted.
    pub fans: usize,
    /// Vertices referenced, counted once per fan.
    pub vertices: usize,
    /// Triangles emitted.
    pub triangles: usize,
}

/// Output of [`GeomipTerrain::frame`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainFrame {
    /// Visible patches in row-major grid order.
    pub patches: Vec<VisiblePatch>,
    /// Frame counters.
    pub stats: FrameStats,
}

/// Geomipmapped terrain over a height field.
///
/// Owns the patch grid, the LOD selector, one vertex buffer per patch, and
/// the shared index table.
pub struct GeomipTerrain<H: HeightField> {
    settings: TerrainSettings,
    field: H,
    grid: PatchGrid,
    selector: LodSelector,
    index_table: PatchIndexTable,
    vertices: Vec<Vec<TerrainVertex>>,
    frame_count: u64,
}

impl<H: HeightField> GeomipTerrain<H> {
    /// Validate `settings`, lay out the patch grid, and sample vertex buffers.
    pub fn new(field: H, settings: TerrainSettings) -> Result<Self, GeomipError> {
        let selector = LodSelector::try_from_policy(settings.lod_policy.clone())?;
        let grid = PatchGrid::new(settings.grid_size, settings.patch_size)?;
        let index_table = PatchIndexTable::build(settings.patch_size)?;

        let vertices = grid
            .patches()
            .iter()
            .map(|patch| {
                let origin = [patch.bounds.min.x as u32, patch.bounds.min.y as u32];
                build_patch_vertices(&field, origin, settings.patch_size, settings.height_scale)
            })
            .collect();

        tracing::info!(
            grid_size = settings.grid_size,
            patch_size = settings.patch_size,
            patches_per_side = grid.patches_per_side(),
            max_lod = grid.max_lod(),
            "terrain ready"
        );

        Ok(Self {
            settings,
            field,
            grid,
            selector,
            index_table,
            vertices,
            frame_count: 0,
        })
    }

    /// Run one frame for `viewer`.
    ///
    /// Every patch gets its LOD before any patch reads a neighbor, so edge
    /// resolution never sees a half-updated grid. Fans come from the index
    /// table; call [`mesh_patch`](crate::mesh_patch) to emit them afresh.
    pub fn frame(&mut self, viewer: Vec3) -> Result<TerrainFrame, GeomipError> {
        let lod_pass = self.grid.select_lods(viewer, &self.selector);

        let mut stats = FrameStats {
            culled: lod_pass.culled,
            ..FrameStats::default()
        };
        let mut patches = Vec::with_capacity(lod_pass.visible);
        for patch in self.grid.patches().iter().filter(|p| p.visible) {
            let edges = self.grid.resolve_edges(patch.coord)?;
            let fans = self
                .index_table
                .fans(patch.lod, edges)
                .cloned()
                .ok_or(GeomipError::InvalidLod {
                    lod: patch.lod,
                    max_lod: self.index_table.max_lod(),
                })?;
            stats.fans += fans.len();
            stats.vertices += fans.iter().map(TriangleFan::vertex_count).sum::<usize>();
            stats.triangles += fans.iter().map(TriangleFan::triangle_count).sum::<usize>();
            patches.push(VisiblePatch {
                coord: patch.coord,
                lod: patch.lod,
                distance: patch.distance,
                edges,
                fans,
            });
        }
        stats.patches = patches.len();
        self.frame_count += 1;

        tracing::debug!(
            frame = self.frame_count,
            patches = stats.patches,
            culled = stats.culled,
            fans = stats.fans,
            triangles = stats.triangles,
            "terrain frame"
        );
        Ok(TerrainFrame { patches, stats })
    }

    /// Vertex buffer of the patch at `coord`.
    pub fn vertices(&self, coord: PatchCoord) -> Result<&[TerrainVertex], GeomipError> {
        let index = self.grid.index_of(coord)?;
        Ok(&self.vertices[index])
    }

    /// Precomputed triangle-list indices for a visible patch.
    pub fn patch_indices(&self, patch: &VisiblePatch) -> Option<&[u32]> {
        self.index_table.get(patch.lod, patch.edges)
    }

    /// The patch grid as left by the last frame.
    pub fn grid(&self) -> &PatchGrid {
        &self.grid
    }

    /// Shared index table.
    pub fn index_table(&self) -> &PatchIndexTable {
        &self.index_table
    }

    /// Settings the terrain was built with.
    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// The underlying height field.
    pub fn field(&self) -> &H {
        &self.field
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
