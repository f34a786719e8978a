//! Terrain vertex format and per-patch vertex buffers.

use geomip_heightfield::HeightField;

/// A terrain vertex: world-space position with the height on `z`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    /// `[x, y, height * height_scale]`.
    pub position: [f32; 3],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 12]);

impl TerrainVertex {
    /// Construct a vertex from its components.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

/// Sample `field` over a `patch_size x patch_size` block whose low corner is
/// at grid coordinate `origin`.
///
/// Vertices are row-major, matching the indices the fan mesher emits.
/// Samples outside the field read the field's default height.
pub fn build_patch_vertices<H: HeightField + ?Sized>(
    field: &H,
    origin: [u32; 2],
    patch_size: u32,
    height_scale: f32,
) -> Vec<TerrainVertex> {
    let n = patch_size as usize;
    let mut vertices = Vec::with_capacity(n * n);
    for row in 0..patch_size {
        let y = origin[1] + row;
        for col in 0..patch_size {
            let x = origin[0] + col;
            let height = field.height(i64::from(x), i64::from(y));
            vertices.push(TerrainVertex::new(x as f32, y as f32, height * height_scale));
        }
    }
    vertices
}
