// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution definitions and the catalog that names them.
//!
//! An execution groups the clips of one ability use on a shared timeline. The
//! catalog maps execution names to shared definitions, which is how spawn
//! events find the execution they start.

use crate::clip::{ClipId, ClipTimeline, ClipType};
use crate::error::ClipError;
use crate::trigger::ExecutionLookup;
use indexmap::IndexMap;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for an execution definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionId(pub Uuid);

impl ExecutionId {
    /// Create a new random execution ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Clips of one execution, in authoring order
#[derive(Debug, Clone)]
pub struct ExecutionDefinition {
    /// Unique execution ID
    pub id: ExecutionId,
    /// Execution name, used by spawn references
    pub name: String,
    /// Length of the execution timeline
    pub total_time: f64,
    clips: IndexMap<ClipId, ClipTimeline>,
}

impl ExecutionDefinition {
    /// Create an empty execution
    pub fn new(name: impl Into<String>, total_time: f64) -> Self {
        Self {
            id: ExecutionId::new(),
            name: name.into(),
            total_time,
            clips: IndexMap::new(),
        }
    }

    /// Add a clip, returning the ID it is stored under
    ///
    /// A clip whose ID is already taken (for example a clone of a clip in this
    /// execution) is given a fresh ID instead of replacing the existing clip.
    pub fn add_clip(&mut self, mut clip: ClipTimeline) -> ClipId {
        if self.clips.contains_key(&clip.id) {
            clip.id = ClipId::new();
            tracing::debug!("Clip '{}' reuses an existing ID, assigned {:?}", clip.name, clip.id);
        }
        let id = clip.id;
        self.clips.insert(id, clip);
        id
    }

    /// Builder-style clip insertion
    pub fn with_clip(mut self, clip: ClipTimeline) -> Self {
        self.add_clip(clip);
        self
    }

    /// Remove a clip, keeping the order of the rest
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Option<ClipTimeline> {
        self.clips.shift_remove(&clip_id)
    }

    /// Get a clip
    pub fn clip(&self, clip_id: ClipId) -> Option<&ClipTimeline> {
        self.clips.get(&clip_id)
    }

    /// Get a mutable clip
    pub fn clip_mut(&mut self, clip_id: ClipId) -> Option<&mut ClipTimeline> {
        self.clips.get_mut(&clip_id)
    }

    /// Get the first clip with a name
    pub fn clip_by_name(&self, name: &str) -> Option<&ClipTimeline> {
        self.clips.values().find(|c| c.name == name)
    }

    /// Get all clips
    pub fn clips(&self) -> impl Iterator<Item = &ClipTimeline> {
        self.clips.values()
    }

    /// Get clips of one type
    pub fn clips_of_type(&self, clip_type: ClipType) -> impl Iterator<Item = &ClipTimeline> {
        self.clips.values().filter(move |c| c.clip_type() == clip_type)
    }

    /// Get clips whose window contains `elapsed`
    pub fn active_clips_at(&self, elapsed: f64) -> impl Iterator<Item = &ClipTimeline> {
        self.clips.values().filter(move |c| c.contains(elapsed))
    }

    /// Get clip count
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Latest clip end time
    pub fn content_duration(&self) -> f64 {
        self.clips.values().map(ClipTimeline::end_time).fold(0.0, f64::max)
    }

    /// Check every clip and that all clips fit the timeline
    pub fn validate(&self) -> Result<(), ClipError> {
        if self.total_time.is_nan() || self.total_time < 0.0 {
            return Err(ClipError::InvalidRange {
                start: 0.0,
                end: self.total_time,
            });
        }

        for clip in self.clips.values() {
            clip.validate()?;
            if clip.end_time() > self.total_time {
                return Err(ClipError::ClipOutOfBounds {
                    clip: clip.name.clone(),
                    end: clip.end_time(),
                    total_time: self.total_time,
                });
            }
        }
        Ok(())
    }

    /// Check that every spawn reference resolves
    pub fn resolve_spawns(&self, lookup: &dyn ExecutionLookup) -> Result<(), ClipError> {
        for clip in self.clips.values() {
            if let Some(rule) = clip.trigger_rule() {
                rule.resolve_spawn(lookup)?;
            }
        }
        Ok(())
    }
}

/// Shared execution definitions by name
#[derive(Debug, Clone, Default)]
pub struct ExecutionCatalog {
    executions: IndexMap<String, Arc<ExecutionDefinition>>,
}

impl ExecutionCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, returning any definition it replaced
    pub fn insert(&mut self, definition: ExecutionDefinition) -> Option<Arc<ExecutionDefinition>> {
        let replaced = self.executions.insert(definition.name.clone(), Arc::new(definition));
        if let Some(old) = &replaced {
            tracing::debug!("Replaced execution '{}'", old.name);
        }
        replaced
    }

    /// Get a shared definition by name
    pub fn get(&self, name: &str) -> Option<Arc<ExecutionDefinition>> {
        self.executions.get(name).cloned()
    }

    /// Resolve a spawn reference
    pub fn resolve(&self, name: &str) -> Result<Arc<ExecutionDefinition>, ClipError> {
        self.get(name)
            .ok_or_else(|| ClipError::UnresolvedSpawnReference(name.to_string()))
    }

    /// Get all execution names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.executions.keys().map(String::as_str)
    }

    /// Get all definitions in insertion order
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<ExecutionDefinition>> {
        self.executions.values()
    }

    /// Get execution count
    pub fn len(&self) -> usize {
        self.executions.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }

    /// Validate every definition and resolve spawn references against this catalog
    pub fn validate(&self) -> Result<(), ClipError> {
        for definition in self.executions.values() {
            definition.validate()?;
            definition.resolve_spawns(self)?;
        }
        Ok(())
    }
}

impl ExecutionLookup for ExecutionCatalog {
    fn contains_execution(&self, name: &str) -> bool {
        self.executions.contains_key(name)
    }
}
