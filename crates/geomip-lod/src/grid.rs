//! The patch grid: a fixed square arena of [`Patch`] records.

use glam::Vec3;

use crate::error::GeomipError;
use crate::patch::{Patch, PatchCoord, Side, max_lod_for_patch_size};
use crate::selector::LodSelector;
use crate::stitch::{EdgeFlags, NeighborLods, resolve_patch_edges};

/// Counts from one LOD pass over the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LodPassStats {
    /// Patches that will render this frame.
    pub visible: usize,
    /// Patches dropped for being beyond the coarsest LOD.
    pub culled: usize,
    /// Visible patches refined to stay within one LOD of their neighbors.
    pub refined: usize,
}

/// Largest accepted height field side length, in cells.
pub const MAX_GRID_SIZE: u32 = 1 << 15;

/// Check that patches of `patch_size` vertices per side can be meshed at
/// every LOD: at least one fan, and a span of `2^n` cells.
pub fn validate_patch_size(patch_size: u32) -> Result<(), GeomipError> {
    if patch_size <= 2 {
        return Err(GeomipError::PatchTooSmall { patch_size });
    }
    if !(patch_size - 1).is_power_of_two() {
        return Err(GeomipError::PatchNotDyadic { patch_size });
    }
    Ok(())
}

/// Check a `(grid_size, patch_size)` pair and return the patches per side.
///
/// Neighboring patches share a vertex row, so each patch covers
/// `patch_size - 1` cells and that span must tile `grid_size` exactly.
pub fn validate_layout(grid_size: u32, patch_size: u32) -> Result<u32, GeomipError> {
    if grid_size == 0 {
        return Err(GeomipError::ZeroGridSize);
    }
    if grid_size > MAX_GRID_SIZE {
        return Err(GeomipError::GridTooLarge {
            grid_size,
            max: MAX_GRID_SIZE,
        });
    }
    validate_patch_size(patch_size)?;
    let span = patch_size - 1;
    if grid_size % span != 0 {
        return Err(GeomipError::UnevenGrid { grid_size, span });
    }
    Ok(grid_size / span)
}

/// Owns every patch of the terrain in a row-major arena indexed by
/// `pz * patches_per_side + px`.
///
/// A default grid is shut down: it holds no patches and every lookup fails
/// with [`GeomipError::PatchOutOfBounds`].
#[derive(Clone, Debug, Default)]
pub struct PatchGrid {
    grid_size: u32,
    patch_size: u32,
    patches_per_side: u32,
    max_lod: u8,
    patches: Vec<Patch>,
}

impl PatchGrid {
    /// Create and initialize a grid.
    pub fn new(grid_size: u32, patch_size: u32) -> Result<Self, GeomipError> {
        let mut grid = Self::default();
        grid.initialize(grid_size, patch_size)?;
        Ok(grid)
    }

    /// (Re)build the grid for a height field of `grid_size` cells per side.
    ///
    /// Any previous state is released first. On error the grid is left shut
    /// down. Every patch starts at the coarsest LOD and not visible.
    pub fn initialize(&mut self, grid_size: u32, patch_size: u32) -> Result<(), GeomipError> {
        self.shutdown();
        let patches_per_side = validate_layout(grid_size, patch_size)?;
        let max_lod = max_lod_for_patch_size(patch_size);

        let count = patches_per_side as usize * patches_per_side as usize;
        let mut patches = Vec::with_capacity(count);
        for pz in 0..patches_per_side {
            for px in 0..patches_per_side {
                patches.push(Patch::new(PatchCoord::new(px, pz), patch_size, max_lod));
            }
        }

        self.grid_size = grid_size;
        self.patch_size = patch_size;
        self.patches_per_side = patches_per_side;
        self.max_lod = max_lod;
        self.patches = patches;

        tracing::info!(
            grid_size,
            patch_size,
            patches_per_side,
            max_lod,
            "initialized patch grid"
        );
        Ok(())
    }

    /// Release all patch storage. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.is_initialized() {
            tracing::debug!(patches = self.patches.len(), "shutting down patch grid");
        }
        *self = Self::default();
    }

    /// Whether the grid currently holds patches.
    pub fn is_initialized(&self) -> bool {
        !self.patches.is_empty()
    }

    /// Height field side length in cells.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Vertices per patch side.
    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    /// Patches per grid side.
    pub fn patches_per_side(&self) -> u32 {
        self.patches_per_side
    }

    /// Coarsest LOD any patch may use.
    pub fn max_lod(&self) -> u8 {
        self.max_lod
    }

    /// Total number of patches.
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// All patches in row-major order.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = PatchCoord> + use<> {
        let n = self.patches_per_side;
        (0..n).flat_map(move |pz| (0..n).map(move |px| PatchCoord::new(px, pz)))
    }

    /// Arena index of `coord`.
    pub fn index_of(&self, coord: PatchCoord) -> Result<usize, GeomipError> {
        if coord.px >= self.patches_per_side || coord.pz >= self.patches_per_side {
            return Err(GeomipError::PatchOutOfBounds {
                px: coord.px,
                pz: coord.pz,
                patches_per_side: self.patches_per_side,
            });
        }
        Ok(coord.pz as usize * self.patches_per_side as usize + coord.px as usize)
    }

    /// The patch at `coord`.
    pub fn patch(&self, coord: PatchCoord) -> Result<&Patch, GeomipError> {
        let idx = self.index_of(coord)?;
        Ok(&self.patches[idx])
    }

    /// Mutable access to the patch at `coord`.
    pub fn patch_mut(&mut self, coord: PatchCoord) -> Result<&mut Patch, GeomipError> {
        let idx = self.index_of(coord)?;
        Ok(&mut self.patches[idx])
    }

    /// The patch adjacent to `coord` on `side`.
    ///
    /// Returns `None` past any grid edge; that is what "no neighbor" means
    /// to the stitcher.
    pub fn neighbor(&self, coord: PatchCoord, side: Side) -> Option<&Patch> {
        let next = coord.step(side)?;
        self.patch(next).ok()
    }

    /// Run the LOD pass: evaluate every patch against `viewer`, then
    /// [`restrict_lods`](Self::restrict_lods).
    ///
    /// Must complete for the whole grid before any edges are resolved.
    pub fn select_lods(&mut self, viewer: Vec3, selector: &LodSelector) -> LodPassStats {
        let max_lod = self.max_lod;
        let mut stats = LodPassStats::default();
        for patch in &mut self.patches {
            if selector.apply(patch, viewer, max_lod).visible {
                stats.visible += 1;
            } else {
                stats.culled += 1;
            }
        }
        stats.refined = self.restrict_lods();
        tracing::trace!(
            visible = stats.visible,
            culled = stats.culled,
            refined = stats.refined,
            "LOD pass complete"
        );
        stats
    }

    /// Refine visible patches until no two visible neighbors differ by more
    /// than one LOD. Returns how many patches were refined.
    ///
    /// A collapsed edge drops every other vertex, which only lines up with a
    /// neighbor exactly one level coarser. LODs only decrease, so the sweeps
    /// terminate. Culled patches are untouched.
    pub fn restrict_lods(&mut self) -> usize {
        let mut refined = vec![false; self.patches.len()];
        loop {
            let mut changed = false;
            for index in 0..self.patches.len() {
                let patch = &self.patches[index];
                if !patch.visible {
                    continue;
                }
                let finest_neighbor = Side::ALL
                    .into_iter()
                    .filter_map(|side| self.neighbor(patch.coord, side))
                    .filter(|n| n.visible)
                    .map(|n| n.lod)
                    .min();
                let Some(limit) = finest_neighbor.map(|lod| lod.saturating_add(1)) else {
                    continue;
                };
                if patch.lod > limit {
                    self.patches[index].lod = limit;
                    refined[index] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        refined.into_iter().filter(|&r| r).count()
    }

    /// LODs of the four neighbors of `coord`.
    ///
    /// Neighbors outside the grid and neighbors culled in the last LOD pass
    /// report `None`: there is no rendered edge to match.
    pub fn neighbor_lods(&self, coord: PatchCoord) -> Result<NeighborLods, GeomipError> {
        self.index_of(coord)?;
        let mut lods = NeighborLods::default();
        for side in Side::ALL {
            let lod = self
                .neighbor(coord, side)
                .filter(|n| n.visible)
                .map(|n| n.lod);
            lods.set(side, lod);
        }
        Ok(lods)
    }

    /// Resolve the edge flags of the patch at `coord` against its neighbors.
    pub fn resolve_edges(&self, coord: PatchCoord) -> Result<EdgeFlags, GeomipError> {
        let patch = self.patch(coord)?;
        let neighbors = self.neighbor_lods(coord)?;
        resolve_patch_edges(patch.lod, &neighbors, self.max_lod)
    }
}
