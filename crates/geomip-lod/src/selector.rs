//! Distance-based LOD selection with culling beyond the coarsest level.

use glam::{Vec2, Vec3};

use crate::error::GeomipError;
use crate::patch::Patch;

/// How viewer distance maps to a detail level.
///
/// Every policy is monotonically non-decreasing in distance.
#[derive(Clone, Debug, PartialEq)]
pub enum LodPolicy {
    /// `level = floor(distance / distance_unit)`.
    Linear {
        /// World units per LOD step.
        distance_unit: f32,
    },
    /// `thresholds[i]` is the exclusive upper distance for level `i`;
    /// distances past the last threshold map to `thresholds.len()`.
    Thresholds(Vec<f32>),
}

impl LodPolicy {
    /// Check the policy parameters.
    pub fn validate(&self) -> Result<(), GeomipError> {
        let reason = match self {
            Self::Linear { distance_unit } if !(distance_unit.is_finite() && *distance_unit > 0.0) => {
                "distance unit must be positive and finite"
            }
            Self::Thresholds(thresholds) if thresholds.is_empty() => {
                "must have at least one threshold"
            }
            Self::Thresholds(thresholds) if thresholds.iter().any(|&t| t.is_nan() || t <= 0.0) => {
                "thresholds must be positive"
            }
            Self::Thresholds(thresholds) if thresholds.windows(2).any(|w| w[1] <= w[0]) => {
                "thresholds must be strictly increasing"
            }
            _ => return Ok(()),
        };
        Err(GeomipError::InvalidPolicy { reason })
    }
}

/// Result of evaluating one patch against the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodSelection {
    /// Detail level the distance maps to, before culling.
    pub level: u32,
    /// `false` when `level` is coarser than the patch supports.
    pub visible: bool,
    /// Planar distance from the viewer to the patch center.
    pub distance: f32,
}

impl LodSelection {
    /// The level to render at, or `None` for a culled patch.
    pub fn lod(&self) -> Option<u8> {
        if self.visible {
            u8::try_from(self.level).ok()
        } else {
            None
        }
    }
}

/// Selects a detail level for each patch from its distance to the viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct LodSelector {
    policy: LodPolicy,
}

impl LodSelector {
    /// Linear policy: one LOD step per `distance_unit` world units.
    ///
    /// # Panics
    ///
    /// Panics if `distance_unit` is not a positive finite number.
    pub fn linear(distance_unit: f32) -> Self {
        Self::from_policy(LodPolicy::Linear { distance_unit })
    }

    /// Threshold policy from a list of distance boundaries.
    ///
    /// # Panics
    ///
    /// Panics if thresholds are empty, not strictly increasing, or contain
    /// non-positive values.
    pub fn with_thresholds(thresholds: Vec<f32>) -> Self {
        Self::from_policy(LodPolicy::Thresholds(thresholds))
    }

    /// Build a selector from a policy.
    ///
    /// # Panics
    ///
    /// Panics if the policy fails [`LodPolicy::validate`].
    pub fn from_policy(policy: LodPolicy) -> Self {
        match Self::try_from_policy(policy) {
            Ok(selector) => selector,
            Err(err) => panic!("{err}"),
        }
    }

    /// Build a selector, rejecting an unusable policy instead of panicking.
    pub fn try_from_policy(policy: LodPolicy) -> Result<Self, GeomipError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The active policy.
    pub fn policy(&self) -> &LodPolicy {
        &self.policy
    }

    /// Detail level for a distance, before clamping or culling.
    pub fn level_for_distance(&self, distance: f32) -> u32 {
        debug_assert!(distance >= 0.0, "distance must be non-negative");
        match &self.policy {
            // `as` saturates, so an infinite distance lands on u32::MAX.
            LodPolicy::Linear { distance_unit } => (distance / distance_unit).floor() as u32,
            LodPolicy::Thresholds(thresholds) => thresholds
                .iter()
                .position(|&t| distance < t)
                .unwrap_or(thresholds.len()) as u32,
        }
    }

    /// Evaluate a patch against the viewer without touching it.
    ///
    /// Patches whose level would exceed `max_lod` are culled rather than
    /// clamped to the coarsest level.
    pub fn select_lod(&self, patch: &Patch, viewer: Vec3, max_lod: u8) -> LodSelection {
        let distance = planar_distance(patch.center, viewer);
        let level = self.level_for_distance(distance);
        LodSelection {
            level,
            visible: level <= u32::from(max_lod),
            distance,
        }
    }

    /// Evaluate a patch and store the result on it.
    ///
    /// A culled patch keeps the LOD it had; only visible patches take the new
    /// level.
    pub fn apply(&self, patch: &mut Patch, viewer: Vec3, max_lod: u8) -> LodSelection {
        let selection = self.select_lod(patch, viewer, max_lod);
        patch.distance = selection.distance;
        patch.visible = selection.visible;
        if let Some(lod) = selection.lod() {
            patch.lod = lod;
        }
        selection
    }
}

/// Distance from the viewer to a ground-plane point, ignoring viewer height.
pub fn planar_distance(point: Vec2, viewer: Vec3) -> f32 {
    point.distance(viewer.truncate())
}
