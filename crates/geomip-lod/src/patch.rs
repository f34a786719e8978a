//! Patch records, grid coordinates, and the four patch sides.

use glam::Vec2;

/// Integer coordinate of a patch in the patch grid.
///
/// `px` selects the column (world x), `pz` the row (world y).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchCoord {
    /// Column, `0..patches_per_side`.
    pub px: u32,
    /// Row, `0..patches_per_side`.
    pub pz: u32,
}

impl PatchCoord {
    /// Create a coordinate.
    pub const fn new(px: u32, pz: u32) -> Self {
        Self { px, pz }
    }

    /// The adjacent coordinate on `side`, or `None` when it would be negative.
    ///
    /// The upper bound is not checked here; the grid owns that.
    pub fn step(self, side: Side) -> Option<Self> {
        let (px, pz) = match side {
            Side::Left => (self.px.checked_sub(1)?, self.pz),
            Side::Right => (self.px.checked_add(1)?, self.pz),
            Side::Down => (self.px, self.pz.checked_sub(1)?),
            Side::Up => (self.px, self.pz.checked_add(1)?),
        };
        Some(Self { px, pz })
    }
}

/// One of the four sides of a patch or fan.
///
/// `Down` faces decreasing rows (`pz - 1`), `Up` faces increasing rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Decreasing x.
    Left = 0,
    /// Increasing y.
    Up = 1,
    /// Increasing x.
    Right = 2,
    /// Decreasing y.
    Down = 3,
}

impl Side {
    /// All four sides in `left, up, right, down` order.
    pub const ALL: [Side; 4] = [Side::Left, Side::Up, Side::Right, Side::Down];

    /// The side facing the other way.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Axis-aligned world-space extent of a patch on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchBounds {
    /// Lowest x/y corner.
    pub min: Vec2,
    /// Highest x/y corner.
    pub max: Vec2,
}

impl PatchBounds {
    /// Returns true if the point lies inside or on the boundary.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Width and length of the patch.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Per-patch LOD state, owned by [`crate::PatchGrid`].
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    /// Position in the patch grid.
    pub coord: PatchCoord,
    /// Current level of detail; 0 is the finest.
    pub lod: u8,
    /// Whether the patch rendered in the last LOD pass.
    pub visible: bool,
    /// Planar viewer distance cached by the last LOD pass.
    pub distance: f32,
    /// Ground-plane extent.
    pub bounds: PatchBounds,
    /// Middle vertex of the patch; distances are measured from here.
    pub center: Vec2,
}

impl Patch {
    /// Build the patch at `coord` for a grid of `patch_size`-vertex patches.
    ///
    /// Adjacent patches share their boundary vertices, so a patch spans
    /// `patch_size - 1` cells.
    pub(crate) fn new(coord: PatchCoord, patch_size: u32, lod: u8) -> Self {
        let span = (patch_size - 1) as f32;
        let min = Vec2::new(coord.px as f32 * span, coord.pz as f32 * span);
        let half = (patch_size / 2) as f32;
        Self {
            coord,
            lod,
            visible: false,
            distance: 0.0,
            bounds: PatchBounds {
                min,
                max: min + Vec2::splat(span),
            },
            center: min + Vec2::splat(half),
        }
    }
}

/// Coarsest LOD a patch of `patch_size` vertices supports.
///
/// This is the largest `k` for which halving `patch_size - 1` `k` times
/// still leaves more than 2, so the coarsest level always holds at least one
/// fan per side. Returns 0 when no halving is possible.
pub fn max_lod_for_patch_size(patch_size: u32) -> u8 {
    let mut divisor = patch_size.saturating_sub(1);
    let mut lod = 0u8;
    while divisor >> 1 > 2 {
        divisor >>= 1;
        lod += 1;
    }
    lod
}
