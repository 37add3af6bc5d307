// SPDX-License-Identifier: MIT OR Apache-2.0
//! Trigger rules deciding when a clip fires.
//!
//! A rule combines any number of fire flags with a single fire event. The
//! flags say *when* the clip fires; the event says *what* happens:
//!
//! - `START_TRIGGER` fires once when elapsed time reaches the clip start
//! - `END_TRIGGER` fires once when elapsed time reaches the clip end
//! - `COLLISION_TRIGGER` fires on the first collision contact of an activation
//! - `COLLISION_TRIGGER_MULTIPLE` fires once per distinct contact inside the window
//!
//! An empty flag set disables the rule. Firing bookkeeping is per execution and
//! lives in [`crate::execution::ExecutionState`].

use crate::error::ClipError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Conditions under which a clip fires
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FireFlags: u32 {
        /// Fire when elapsed time reaches the clip start
        const START_TRIGGER = 1 << 1;
        /// Fire on the first collision contact
        const COLLISION_TRIGGER = 1 << 2;
        /// Fire when elapsed time reaches the clip end
        const END_TRIGGER = 1 << 3;
        /// Fire on every distinct collision contact
        const COLLISION_TRIGGER_MULTIPLE = 1 << 4;
    }
}

impl FireFlags {
    /// Whether any collision flag is set
    pub fn fires_on_collision(&self) -> bool {
        self.intersects(Self::COLLISION_TRIGGER | Self::COLLISION_TRIGGER_MULTIPLE)
    }
}

/// Which of the clip's effects an assign event hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EffectApplyKind {
    /// Every enabled effect, in list order
    #[default]
    AllEffects,
    /// A single effect by list index
    Single(usize),
}

/// Who receives assigned effects; resolved by the host's targeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EffectApplyTarget {
    /// The execution's input target
    #[default]
    Target,
    /// The caster of the ability
    Caster,
    /// Whatever the collision volume touched
    CollidedUnit,
}

/// What happens when a rule fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FireEvent {
    /// Hand the clip's effects to a target
    AssignEffect {
        /// Effects to assign
        apply: EffectApplyKind,
        /// Receiver of the effects
        target: EffectApplyTarget,
    },
    /// Start another execution, looked up by name
    TriggerNewExecution {
        /// Execution name resolved through an [`ExecutionLookup`]
        execution: String,
    },
}

impl Default for FireEvent {
    fn default() -> Self {
        Self::AssignEffect {
            apply: EffectApplyKind::AllEffects,
            target: EffectApplyTarget::Target,
        }
    }
}

/// Name-based lookup of executions that a spawn event may start
pub trait ExecutionLookup {
    /// Whether an execution with this name exists
    fn contains_execution(&self, name: &str) -> bool;
}

/// Fire flags plus the event they raise
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    /// When the rule fires
    pub fire_flags: FireFlags,
    /// What firing does; ignored while `fire_flags` is empty
    pub fire_event: FireEvent,
}

impl TriggerRule {
    /// Create a rule
    pub fn new(fire_flags: FireFlags, fire_event: FireEvent) -> Self {
        Self {
            fire_flags,
            fire_event,
        }
    }

    /// A rule that never fires
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Rule that assigns effects
    pub fn assign(fire_flags: FireFlags, apply: EffectApplyKind, target: EffectApplyTarget) -> Self {
        Self::new(fire_flags, FireEvent::AssignEffect { apply, target })
    }

    /// Rule that spawns a named execution
    pub fn spawn(fire_flags: FireFlags, execution: impl Into<String>) -> Self {
        Self::new(
            fire_flags,
            FireEvent::TriggerNewExecution {
                execution: execution.into(),
            },
        )
    }

    /// Whether the rule can fire at all
    pub fn is_enabled(&self) -> bool {
        !self.fire_flags.is_empty()
    }

    /// Whether firing assigns effects
    pub fn is_assign_trigger(&self) -> bool {
        self.is_enabled() && matches!(self.fire_event, FireEvent::AssignEffect { .. })
    }

    /// Whether firing spawns a new execution
    pub fn is_spawn_trigger(&self) -> bool {
        self.is_enabled() && matches!(self.fire_event, FireEvent::TriggerNewExecution { .. })
    }

    /// Apply kind and target, for enabled assign rules
    pub fn assignment(&self) -> Option<(EffectApplyKind, EffectApplyTarget)> {
        match &self.fire_event {
            FireEvent::AssignEffect { apply, target } if self.is_enabled() => Some((*apply, *target)),
            _ => None,
        }
    }

    /// Execution name, for enabled spawn rules
    pub fn spawn_target(&self) -> Option<&str> {
        match &self.fire_event {
            FireEvent::TriggerNewExecution { execution } if self.is_enabled() => Some(execution.as_str()),
            _ => None,
        }
    }

    /// Resolve the spawn target against a lookup
    ///
    /// Returns `Ok(None)` for rules that do not spawn.
    pub fn resolve_spawn<'a>(&'a self, lookup: &dyn ExecutionLookup) -> Result<Option<&'a str>, ClipError> {
        let Some(name) = self.spawn_target() else {
            return Ok(None);
        };
        if lookup.contains_execution(name) {
            Ok(Some(name))
        } else {
            tracing::warn!("Spawn target not found: {}", name);
            Err(ClipError::UnresolvedSpawnReference(name.to_string()))
        }
    }
}
