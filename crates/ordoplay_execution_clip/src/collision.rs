// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collision volumes carried by item-execute clips.
//!
//! A volume has one shape and one movement type. Movement decides where the
//! volume sits at a given elapsed time:
//!
//! - `FixedPosition` stays at the authored point
//! - `SelectedPosition` / `SelectedDirection` defer to the host's targeting
//! - `Normal` travels in a straight line from the origin
//! - `PathFly` / `SelectedDirectionPathFly` follow the authored bezier path

use crate::clip::AssetHandle;
use crate::error::ClipError;
use crate::path::{BezierCurve, BezierPathSampler, Interpolation};
use crate::settings::{ClipSettings, PathParametrization};
use crate::trigger::TriggerRule;
use serde::{Deserialize, Serialize};

/// Below this length a direction is treated as unset
const MIN_DIRECTION_LENGTH: f32 = 1.0e-6;

/// World up axis used to orient paths
const WORLD_UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Whether the volume leaves the caster's hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExecuteTiming {
    /// Released into the world
    #[default]
    OutOfHand,
    /// Held by the caster
    InHand,
}

/// Collision shape of a volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    /// Sphere around the volume position
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Axis-aligned box
    Box {
        /// Center offset from the volume position
        center: [f32; 3],
        /// Full size (width, height, depth)
        size: [f32; 3],
    },
}

impl Default for CollisionShape {
    fn default() -> Self {
        Self::Sphere { radius: 0.5 }
    }
}

impl CollisionShape {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "Sphere",
            Self::Box { .. } => "Box",
        }
    }
}

/// How a volume moves over the clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovementType {
    /// Stays at the authored fixed point
    #[default]
    FixedPosition,
    /// Placed at a position picked by targeting
    SelectedPosition,
    /// Placed along a direction picked by targeting
    SelectedDirection,
    /// Straight-line travel from the origin
    Normal,
    /// Follows the authored path
    PathFly,
    /// Follows the authored path, turned to face the selected direction
    SelectedDirectionPathFly,
}

impl MovementType {
    /// Whether `speed` has any meaning for this movement
    pub fn uses_speed(&self) -> bool {
        !matches!(
            self,
            Self::FixedPosition | Self::SelectedPosition | Self::SelectedDirection
        )
    }

    /// Whether this movement samples the path
    pub fn uses_path(&self) -> bool {
        matches!(self, Self::PathFly | Self::SelectedDirectionPathFly)
    }

    /// Targeting needed before the position is known, if any
    pub fn targeting(&self) -> Option<TargetingKind> {
        match self {
            Self::SelectedPosition => Some(TargetingKind::Position),
            Self::SelectedDirection => Some(TargetingKind::Direction),
            _ => None,
        }
    }
}

/// Kind of targeting the host must resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingKind {
    /// A point in the world
    Position,
    /// A direction from the caster
    Direction,
}

/// Runtime inputs supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionInput {
    /// Where the volume was released
    pub origin: [f32; 3],
    /// Travel or facing direction; need not be normalized
    pub direction: [f32; 3],
}

impl MotionInput {
    /// Create motion input
    pub fn new(origin: [f32; 3], direction: [f32; 3]) -> Self {
        Self { origin, direction }
    }
}

/// Where a volume sits at some elapsed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumePosition {
    /// Fully determined position
    Resolved([f32; 3]),
    /// Position must come from the host's targeting
    Deferred(TargetingKind),
}

impl VolumePosition {
    /// Get the resolved position, if any
    pub fn resolved(&self) -> Option<[f32; 3]> {
        match self {
            Self::Resolved(p) => Some(*p),
            Self::Deferred(_) => None,
        }
    }
}

/// Collision volume and its movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionVolume {
    /// Whether the volume leaves the caster's hand
    pub execute_timing: ExecuteTiming,
    /// Trigger rule evaluated against this volume
    pub trigger: TriggerRule,
    /// Collision shape
    pub shape: CollisionShape,
    /// Movement type
    pub movement: MovementType,
    /// Travel speed; see [`MovementType::uses_speed`]
    pub speed: f32,
    /// Position for `FixedPosition` movement
    pub fixed_point: [f32; 3],
    /// Path for path-fly movement, local to the motion origin
    pub path: Option<BezierCurve>,
    /// Visual object spawned with the volume
    #[serde(default)]
    pub obj_asset: Option<AssetHandle>,
}

impl Default for CollisionVolume {
    fn default() -> Self {
        Self {
            execute_timing: ExecuteTiming::OutOfHand,
            trigger: TriggerRule::disabled(),
            shape: CollisionShape::default(),
            movement: MovementType::FixedPosition,
            speed: 1.0,
            fixed_point: [0.0; 3],
            path: None,
            obj_asset: None,
        }
    }
}

impl CollisionVolume {
    /// Create a volume with the given shape and movement
    pub fn new(shape: CollisionShape, movement: MovementType) -> Self {
        Self {
            shape,
            movement,
            ..Self::default()
        }
    }

    /// Set the trigger rule
    pub fn with_trigger(mut self, trigger: TriggerRule) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the speed
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the fixed point
    pub fn with_fixed_point(mut self, point: [f32; 3]) -> Self {
        self.fixed_point = point;
        self
    }

    /// Set the path
    pub fn with_path(mut self, path: BezierCurve) -> Self {
        self.path = Some(path);
        self
    }

    /// Set the visual object
    pub fn with_obj_asset(mut self, asset: AssetHandle) -> Self {
        self.obj_asset = Some(asset);
        self
    }

    /// Set the execute timing
    pub fn with_execute_timing(mut self, timing: ExecuteTiming) -> Self {
        self.execute_timing = timing;
        self
    }

    /// Get the active shape
    pub fn shape(&self) -> &CollisionShape {
        &self.shape
    }

    /// Whether `speed` is meaningful for the current movement
    pub fn shows_speed(&self) -> bool {
        self.movement.uses_speed()
    }

    /// Whether the path is meaningful for the current movement
    pub fn uses_path(&self) -> bool {
        self.movement.uses_path()
    }

    /// Sampler over the configured path
    pub fn path_sampler(&self) -> BezierPathSampler<'_> {
        BezierPathSampler::new(self.path.as_ref())
    }

    /// Check that path-based movement has a path to follow
    pub fn validate(&self) -> Result<(), ClipError> {
        let has_path = self.path.as_ref().is_some_and(|p| !p.is_empty());
        if self.uses_path() && !has_path {
            return Err(ClipError::MissingPath);
        }
        Ok(())
    }

    /// Position at `elapsed` into a clip of length `duration`, sampling paths uniformly
    pub fn current_position(
        &self,
        elapsed: f64,
        duration: f64,
        input: &MotionInput,
    ) -> Result<VolumePosition, ClipError> {
        self.current_position_with(elapsed, duration, input, &ClipSettings::default())
    }

    /// Position at `elapsed` into a clip of length `duration`
    pub fn current_position_with(
        &self,
        elapsed: f64,
        duration: f64,
        input: &MotionInput,
        settings: &ClipSettings,
    ) -> Result<VolumePosition, ClipError> {
        let position = match self.movement {
            MovementType::FixedPosition => self.fixed_point,
            movement @ (MovementType::SelectedPosition | MovementType::SelectedDirection) => {
                match movement.targeting() {
                    Some(kind) => return Ok(VolumePosition::Deferred(kind)),
                    None => input.origin,
                }
            }
            MovementType::Normal => {
                let travelled = self.speed * elapsed.max(0.0) as f32;
                let step = match normalize(input.direction) {
                    Some(direction) => Interpolation::scale_vec3(direction, travelled),
                    None => [0.0; 3],
                };
                Interpolation::add_vec3(input.origin, step)
            }
            MovementType::PathFly | MovementType::SelectedDirectionPathFly => {
                self.validate()?;
                let t = self.path_progress(elapsed, duration);
                let sampler = self.path_sampler();
                let local = match settings.path_parametrization {
                    PathParametrization::Uniform => sampler.sample(t),
                    PathParametrization::ArcLength => sampler
                        .with_arc_length(settings.arc_length_samples)
                        .sample_by_distance(t),
                }
                .ok_or(ClipError::MissingPath)?;

                let local = if self.movement == MovementType::SelectedDirectionPathFly {
                    orient(local, input.direction)
                } else {
                    local
                };
                Interpolation::add_vec3(input.origin, local)
            }
        };
        Ok(VolumePosition::Resolved(position))
    }

    /// Normalized path parameter, scaled by speed
    fn path_progress(&self, elapsed: f64, duration: f64) -> f32 {
        let progress = if duration > 0.0 {
            (elapsed / duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let scaled = progress as f32 * self.speed;
        if scaled.is_nan() {
            0.0
        } else {
            scaled.clamp(0.0, 1.0)
        }
    }
}

fn normalize(v: [f32; 3]) -> Option<[f32; 3]> {
    let length = Interpolation::distance_vec3([0.0; 3], v);
    if length < MIN_DIRECTION_LENGTH || !length.is_finite() {
        None
    } else {
        Some(Interpolation::scale_vec3(v, 1.0 / length))
    }
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Rotate a path-local point so local +Z faces `direction`
fn orient(local: [f32; 3], direction: [f32; 3]) -> [f32; 3] {
    let Some(forward) = normalize(direction) else {
        return local;
    };
    let right = normalize(cross(WORLD_UP, forward)).unwrap_or([1.0, 0.0, 0.0]);
    let up = cross(forward, right);

    let x = Interpolation::scale_vec3(right, local[0]);
    let y = Interpolation::scale_vec3(up, local[1]);
    let z = Interpolation::scale_vec3(forward, local[2]);
    Interpolation::add_vec3(Interpolation::add_vec3(x, y), z)
}
