// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution clips for `OrdoPlay` abilities.
//!
//! This crate models the timed clips that script an ability execution:
//! - Clip windows with a typed payload (collision, trigger, asset playback)
//! - Trigger rules with combinable fire flags
//! - Collision volumes with fixed, linear and path-fly movement
//! - Bezier path sampling
//! - Effect lists filled from an explicit effect registry
//!
//! ## Architecture
//!
//! Definitions are authored once and shared read-only. Everything that changes
//! while an execution runs lives in per-instance state:
//! - [`ClipTimeline`] and [`ExecutionDefinition`] are the shared definitions
//! - [`ExecutionState`] and [`ExecutionInstance`] track what has fired
//! - [`ExecutionCatalog`] resolves spawn references by name

pub mod catalog;
pub mod clip;
pub mod collision;
pub mod effect;
pub mod error;
pub mod execution;
pub mod path;
pub mod settings;
pub mod trigger;

pub use catalog::{ExecutionCatalog, ExecutionDefinition, ExecutionId};
pub use clip::{AssetHandle, ClipId, ClipPayload, ClipTimeline, ClipType};
pub use collision::{
    CollisionShape, CollisionVolume, ExecuteTiming, MotionInput, MovementType, TargetingKind,
    VolumePosition,
};
pub use effect::{ClipEffect, EffectInfo, EffectList, EffectRegistry, EffectTarget};
pub use error::{ClipError, SettingsError};
pub use execution::{ContactId, ExecutionInstance, ExecutionState, Firing};
pub use path::{BezierCurve, BezierPathSampler, BezierPoint, HandleStyle, Interpolation};
pub use settings::{ClipSettings, PathParametrization};
pub use trigger::{
    EffectApplyKind, EffectApplyTarget, ExecutionLookup, FireEvent, FireFlags, TriggerRule,
};
