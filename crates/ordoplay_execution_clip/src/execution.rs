// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-instance firing state.
//!
//! Clip definitions are shared and read-only; each running use of a clip owns
//! an [`ExecutionState`] that remembers what has already fired. Many states can
//! run against one definition at the same time.

use crate::catalog::ExecutionDefinition;
use crate::clip::{ClipId, ClipTimeline};
use crate::trigger::FireFlags;
use std::collections::HashSet;
use std::sync::Arc;

/// Host-assigned identity of a collision contact (for example, the touched entity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactId(pub u64);

/// One firing of a clip's trigger rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Firing {
    /// Flag that caused the firing
    pub cause: FireFlags,
    /// Execution time of the firing
    pub elapsed: f64,
    /// Contact for collision firings
    pub contact: Option<ContactId>,
}

/// Firing bookkeeping for one running instance of a clip
#[derive(Debug, Clone)]
pub struct ExecutionState {
    start_time: f64,
    end_time: f64,
    flags: FireFlags,
    /// Latest elapsed time seen
    elapsed: Option<f64>,
    start_fired: bool,
    end_fired: bool,
    collision_fired: bool,
    contacts: HashSet<ContactId>,
    /// Firings not yet taken by the host
    pending: Vec<Firing>,
}

impl ExecutionState {
    /// Create state for a clip; clips without a trigger rule never fire
    pub fn new(clip: &ClipTimeline) -> Self {
        let flags = clip
            .trigger_rule()
            .map(|rule| rule.fire_flags)
            .unwrap_or_else(FireFlags::empty);
        Self {
            start_time: clip.start_time(),
            end_time: clip.end_time(),
            flags,
            elapsed: None,
            start_fired: false,
            end_fired: false,
            collision_fired: false,
            contacts: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Advance to execution time `elapsed`, collecting boundary firings
    ///
    /// Times earlier than the last seen time are ignored.
    pub fn update(&mut self, elapsed: f64) {
        if elapsed.is_nan() || self.elapsed.is_some_and(|last| elapsed < last) {
            return;
        }
        self.elapsed = Some(elapsed);

        if self.flags.contains(FireFlags::START_TRIGGER) && !self.start_fired && elapsed >= self.start_time {
            self.start_fired = true;
            self.pending.push(Firing {
                cause: FireFlags::START_TRIGGER,
                elapsed: self.start_time,
                contact: None,
            });
        }

        if self.flags.contains(FireFlags::END_TRIGGER) && !self.end_fired && elapsed >= self.end_time {
            self.end_fired = true;
            self.pending.push(Firing {
                cause: FireFlags::END_TRIGGER,
                elapsed: self.end_time,
                contact: None,
            });
        }
    }

    /// Report a collision contact at the current time
    ///
    /// Returns whether the contact fired the rule.
    pub fn on_collision(&mut self, contact: ContactId) -> bool {
        if !self.is_active() {
            return false;
        }

        let cause = if self.flags.contains(FireFlags::COLLISION_TRIGGER_MULTIPLE) {
            if !self.contacts.insert(contact) {
                return false;
            }
            FireFlags::COLLISION_TRIGGER_MULTIPLE
        } else if self.flags.contains(FireFlags::COLLISION_TRIGGER) {
            if self.collision_fired {
                return false;
            }
            FireFlags::COLLISION_TRIGGER
        } else {
            return false;
        };

        self.collision_fired = true;
        self.pending.push(Firing {
            cause,
            elapsed: self.elapsed.unwrap_or(self.start_time),
            contact: Some(contact),
        });
        true
    }

    /// Take firings collected since the last call
    pub fn take_firings(&mut self) -> Vec<Firing> {
        std::mem::take(&mut self.pending)
    }

    /// Re-arm for a new activation
    pub fn reset(&mut self) {
        self.elapsed = None;
        self.start_fired = false;
        self.end_fired = false;
        self.collision_fired = false;
        self.contacts.clear();
        self.pending.clear();
    }

    /// Latest elapsed time seen
    pub fn elapsed(&self) -> Option<f64> {
        self.elapsed
    }

    /// Whether the last seen time is inside the clip window
    pub fn is_active(&self) -> bool {
        self.elapsed
            .is_some_and(|t| t >= self.start_time && t <= self.end_time)
    }

    /// Whether the last seen time is past the clip window
    pub fn is_finished(&self) -> bool {
        self.elapsed.is_some_and(|t| t > self.end_time)
    }
}

/// A running instance of a shared execution definition
#[derive(Debug, Clone)]
pub struct ExecutionInstance {
    definition: Arc<ExecutionDefinition>,
    states: Vec<(ClipId, ExecutionState)>,
}

impl ExecutionInstance {
    /// Start an instance with fresh state for every clip
    pub fn new(definition: Arc<ExecutionDefinition>) -> Self {
        let states = definition
            .clips()
            .map(|clip| (clip.id, ExecutionState::new(clip)))
            .collect();
        Self { definition, states }
    }

    /// The shared definition
    pub fn definition(&self) -> &Arc<ExecutionDefinition> {
        &self.definition
    }

    /// Advance every clip and collect their firings in clip order
    pub fn update(&mut self, elapsed: f64) -> Vec<(ClipId, Firing)> {
        let mut firings = Vec::new();
        for (clip_id, state) in &mut self.states {
            state.update(elapsed);
            firings.extend(state.take_firings().into_iter().map(|f| (*clip_id, f)));
        }
        firings
    }

    /// Report a contact against one clip's volume
    pub fn on_collision(&mut self, clip_id: ClipId, contact: ContactId) -> Option<Firing> {
        let (_, state) = self.states.iter_mut().find(|(id, _)| *id == clip_id)?;
        if state.on_collision(contact) {
            state.take_firings().pop()
        } else {
            None
        }
    }

    /// Get state for a clip
    pub fn state(&self, clip_id: ClipId) -> Option<&ExecutionState> {
        self.states.iter().find(|(id, _)| *id == clip_id).map(|(_, s)| s)
    }

    /// Whether every clip window has passed
    pub fn is_finished(&self) -> bool {
        self.states.iter().all(|(_, s)| s.is_finished())
    }

    /// Re-arm all clips
    pub fn reset(&mut self) {
        for (_, state) in &mut self.states {
            state.reset();
        }
    }
}
