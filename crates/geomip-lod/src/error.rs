//! Error types for patch grid setup and per-frame LOD evaluation.

/// Errors produced by the geomipmapping core.
///
/// Configuration errors are fatal at setup. Bounds and LOD errors are
/// precondition violations during per-frame evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeomipError {
    /// The height field side length is zero.
    #[error("grid size must be greater than zero")]
    ZeroGridSize,

    /// Patches need at least three vertices per side to hold one fan.
    #[error("patch size {patch_size} is too small; patches need at least 3 vertices per side")]
    PatchTooSmall {
        /// Requested vertices per patch side.
        patch_size: u32,
    },

    /// Coarser LODs halve the patch span, so `patch_size - 1` must be a
    /// power of two for every level to cover the whole patch.
    #[error("patch size {patch_size} is not 2^n + 1")]
    PatchNotDyadic {
        /// Requested vertices per patch side.
        patch_size: u32,
    },

    /// The grid is larger than a patch grid may be.
    #[error("grid size {grid_size} exceeds the maximum of {max}")]
    GridTooLarge {
        /// Requested height field side length in cells.
        grid_size: u32,
        /// Largest accepted side length.
        max: u32,
    },

    /// The grid cannot be tiled exactly by patches.
    #[error("grid size {grid_size} is not a multiple of the patch span {span}")]
    UnevenGrid {
        /// Height field side length in cells.
        grid_size: u32,
        /// Cells covered by one patch (`patch_size - 1`).
        span: u32,
    },

    /// A patch coordinate lies outside the grid.
    #[error("patch ({px}, {pz}) is outside the {patches_per_side}x{patches_per_side} patch grid")]
    PatchOutOfBounds {
        /// Requested column.
        px: u32,
        /// Requested row.
        pz: u32,
        /// Patches per grid side.
        patches_per_side: u32,
    },

    /// A fan coordinate lies outside its patch's fan grid.
    #[error("fan ({col}, {row}) is outside the {fans_per_side}x{fans_per_side} fan grid")]
    FanOutOfBounds {
        /// Requested fan column.
        col: u32,
        /// Requested fan row.
        row: u32,
        /// Fans per patch side at the current LOD.
        fans_per_side: u32,
    },

    /// A fan centered at `(x, y)` would reach past the patch's vertex grid.
    #[error("fan at ({x}, {y}) with half step {half_step} does not fit a {patch_size}-vertex patch")]
    FanOutsidePatch {
        /// Local vertex column of the fan center.
        x: u32,
        /// Local vertex row of the fan center.
        y: u32,
        /// Distance from the center to the fan's edges, in vertices.
        half_step: u32,
        /// Vertices per patch side.
        patch_size: u32,
    },

    /// A LOD policy with unusable parameters.
    #[error("invalid LOD policy: {reason}")]
    InvalidPolicy {
        /// What is wrong with the policy.
        reason: &'static str,
    },

    /// A LOD value outside `[0, max_lod]` reached the stitcher or mesher.
    #[error("LOD {lod} exceeds the maximum LOD {max_lod}")]
    InvalidLod {
        /// Offending LOD.
        lod: u8,
        /// Coarsest valid LOD.
        max_lod: u8,
    },
}

impl GeomipError {
    /// Returns `true` for errors that can only arise while initializing a grid.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ZeroGridSize
                | Self::PatchTooSmall { .. }
                | Self::PatchNotDyadic { .. }
                | Self::GridTooLarge { .. }
                | Self::UnevenGrid { .. }
                | Self::InvalidPolicy { .. }
        )
    }
}
