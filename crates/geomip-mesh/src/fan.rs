//! Triangle fans: the unit of geometry a geomipmapped patch is drawn with.
//!
//! At LOD `l` a patch is covered by a square grid of fans, each spanning
//! `2 * 2^l` vertices per side. A fan is its center vertex plus a ring of up
//! to eight vertices: four corners and four edge midpoints. Dropping an edge
//! midpoint collapses that side to a single long edge, which is how a finer
//! patch matches the vertex spacing of a coarser neighbor.
//!
//! Indices address the patch's row-major `patch_size x patch_size` vertex
//! buffer, `index = y * patch_size + x` in patch-local vertex coordinates.

use geomip_lod::{
    EdgeFlags, FanCoord, GeomipError, max_lod_for_patch_size, resolve_fan_edges,
    validate_patch_size,
};

/// Index count of a fan with every edge at full resolution.
pub const MAX_FAN_INDICES: usize = 10;

/// Index count of a fan with every edge collapsed.
pub const MIN_FAN_INDICES: usize = 6;

/// Fans per patch side at `lod`.
///
/// Returns 0 when the patch is too small to hold a fan at that level.
pub fn fans_per_side(lod: u8, patch_size: u32) -> u32 {
    patch_size
        .saturating_sub(1)
        .checked_shr(u32::from(lod) + 1)
        .unwrap_or(0)
}

/// Distance between adjacent fan centers at `lod`, in grid units.
///
/// Equals `2^(lod + 1)` whenever `patch_size - 1` is a power of two.
pub fn fan_spacing(lod: u8, patch_size: u32) -> f32 {
    let fans = fans_per_side(lod, patch_size);
    if fans == 0 {
        return 0.0;
    }
    patch_size.saturating_sub(1) as f32 / fans as f32
}

/// Vertex step from a fan center to its edges at `lod`.
pub fn fan_half_step(lod: u8) -> u32 {
    1 << lod
}

/// Patch-local vertex coordinate `[x, y]` of the center of `fan` at `lod`.
pub fn fan_center(fan: FanCoord, lod: u8) -> [u32; 2] {
    let s = fan_half_step(lod);
    [fan.col * 2 * s + s, fan.row * 2 * s + s]
}

/// Index list of one triangle fan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriangleFan {
    /// Patch-local vertex coordinate of the fan center.
    pub center: [u32; 2],
    /// Which sides were emitted at full resolution.
    pub edges: EdgeFlags,
    /// Center first, then the ring counter-clockwise from the top-left
    /// corner, closed by repeating the top-left corner.
    pub indices: Vec<u32>,
}

impl TriangleFan {
    /// Number of triangles the fan draws.
    pub fn triangle_count(&self) -> usize {
        self.indices.len().saturating_sub(2)
    }

    /// Number of distinct vertices the fan references.
    pub fn vertex_count(&self) -> usize {
        self.indices.len().saturating_sub(1)
    }

    /// Expand into a triangle list.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        fan_to_triangles(&self.indices)
    }
}

/// Emit the fan centered at `center` with the given edge flags.
///
/// Ring order, viewed from above with y growing upward: top-left,
/// left-mid, bottom-left, bottom-mid, bottom-right, right-mid, top-right,
/// top-mid, and top-left again. A `false` flag omits that side's midpoint.
pub fn emit_fan(
    center: [u32; 2],
    half_step: u32,
    patch_size: u32,
    edges: EdgeFlags,
) -> Result<TriangleFan, GeomipError> {
    let [x, y] = center;
    let fits = |c: u32| {
        c >= half_step && c.checked_add(half_step).is_some_and(|hi| hi < patch_size)
    };
    if half_step == 0 || !fits(x) || !fits(y) {
        return Err(GeomipError::FanOutsidePatch {
            x,
            y,
            half_step,
            patch_size,
        });
    }

    let index = |vx: u32, vy: u32| vy * patch_size + vx;
    let (left, right) = (x - half_step, x + half_step);
    let (bottom, top) = (y - half_step, y + half_step);

    let mut indices = Vec::with_capacity(MAX_FAN_INDICES);
    indices.push(index(x, y));
    indices.push(index(left, top));
    if edges.left {
        indices.push(index(left, y));
    }
    indices.push(index(left, bottom));
    if edges.down {
        indices.push(index(x, bottom));
    }
    indices.push(index(right, bottom));
    if edges.right {
        indices.push(index(right, y));
    }
    indices.push(index(right, top));
    if edges.up {
        indices.push(index(x, top));
    }
    indices.push(index(left, top));

    Ok(TriangleFan {
        center,
        edges,
        indices,
    })
}

/// Expand a fan index list into independent triangles sharing its center.
pub fn fan_to_triangles(indices: &[u32]) -> Vec<[u32; 3]> {
    let Some((&center, ring)) = indices.split_first() else {
        return Vec::new();
    };
    ring.windows(2).map(|w| [center, w[0], w[1]]).collect()
}

/// Mesh a whole patch at `lod`, fans in row-major order.
///
/// Only fans on the patch border see `patch_edges`; interior fan sides are
/// always full.
pub fn mesh_patch(
    patch_size: u32,
    lod: u8,
    patch_edges: EdgeFlags,
) -> Result<Vec<TriangleFan>, GeomipError> {
    validate_patch_size(patch_size)?;
    let max_lod = max_lod_for_patch_size(patch_size);
    if lod > max_lod {
        return Err(GeomipError::InvalidLod { lod, max_lod });
    }

    let fans = fans_per_side(lod, patch_size);
    let half_step = fan_half_step(lod);
    let mut out = Vec::with_capacity((fans * fans) as usize);
    for row in 0..fans {
        for col in 0..fans {
            let fan = FanCoord::new(col, row);
            let edges = resolve_fan_edges(fan, fans, patch_edges)?;
            out.push(emit_fan(fan_center(fan, lod), half_step, patch_size, edges)?);
        }
    }
    tracing::trace!(
        patch_size,
        lod,
        fans = out.len(),
        collapsed = patch_edges.collapsed_count(),
        "meshed patch"
    );
    Ok(out)
}
