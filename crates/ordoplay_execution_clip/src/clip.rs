// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution clips: a time window, one typed payload and an effect list.

use crate::collision::{CollisionVolume, MotionInput, VolumePosition};
use crate::effect::{EffectList, EffectRegistry};
use crate::error::ClipError;
use crate::settings::ClipSettings;
use crate::trigger::TriggerRule;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque reference to a host-owned asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AssetHandle(pub String);

impl AssetHandle {
    /// Create a handle from an asset key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the asset key
    pub fn key(&self) -> &str {
        &self.0
    }
}

/// Type of clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipType {
    /// Collision volume with its own trigger rule
    ItemExecute,
    /// Trigger rule on the timeline
    ActionEvent,
    /// Animation playback
    Animation,
    /// Audio playback
    Audio,
    /// Particle effect playback
    ParticleEffect,
}

impl ClipType {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ItemExecute => "Item Execute",
            Self::ActionEvent => "Action Event",
            Self::Animation => "Animation",
            Self::Audio => "Audio",
            Self::ParticleEffect => "Particle Effect",
        }
    }
}

/// Payload of a clip; the variant decides the clip type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipPayload {
    /// Collision volume
    ItemExecute(CollisionVolume),
    /// Timed trigger rule
    ActionEvent(TriggerRule),
    /// Animation clip played by the host
    Animation(AssetHandle),
    /// Audio clip played by the host
    Audio(AssetHandle),
    /// Particle effect spawned by the host
    ParticleEffect(AssetHandle),
}

impl ClipPayload {
    /// Get the clip type of this payload
    pub fn clip_type(&self) -> ClipType {
        match self {
            Self::ItemExecute(_) => ClipType::ItemExecute,
            Self::ActionEvent(_) => ClipType::ActionEvent,
            Self::Animation(_) => ClipType::Animation,
            Self::Audio(_) => ClipType::Audio,
            Self::ParticleEffect(_) => ClipType::ParticleEffect,
        }
    }

    /// Asset handle of playback payloads
    pub fn asset(&self) -> Option<&AssetHandle> {
        match self {
            Self::Animation(asset) | Self::Audio(asset) | Self::ParticleEffect(asset) => Some(asset),
            Self::ItemExecute(_) | Self::ActionEvent(_) => None,
        }
    }

    fn validate(&self) -> Result<(), ClipError> {
        match self {
            Self::ItemExecute(volume) => volume.validate(),
            _ => Ok(()),
        }
    }
}

/// A time-bounded segment of an execution
#[derive(Debug, Clone)]
pub struct ClipTimeline {
    /// Unique clip ID
    pub id: ClipId,
    /// Clip name
    pub name: String,
    start_time: f64,
    end_time: f64,
    payload: ClipPayload,
    effects: EffectList,
}

impl ClipTimeline {
    /// Create a validated clip
    pub fn new(
        name: impl Into<String>,
        start_time: f64,
        end_time: f64,
        payload: ClipPayload,
    ) -> Result<Self, ClipError> {
        let clip = Self {
            id: ClipId::new(),
            name: name.into(),
            start_time,
            end_time,
            payload,
            effects: EffectList::new(),
        };
        clip.validate()?;
        tracing::debug!(
            "Created {} clip '{}' [{}, {}]",
            clip.clip_type().name(),
            clip.name,
            start_time,
            end_time
        );
        Ok(clip)
    }

    /// Check the time range and payload
    pub fn validate(&self) -> Result<(), ClipError> {
        self.duration()?;
        self.payload.validate()
    }

    /// Start time
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// End time
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Move the clip window
    pub fn set_range(&mut self, start_time: f64, end_time: f64) -> Result<(), ClipError> {
        check_range(start_time, end_time)?;
        self.start_time = start_time;
        self.end_time = end_time;
        Ok(())
    }

    /// Clip length
    pub fn duration(&self) -> Result<f64, ClipError> {
        check_range(self.start_time, self.end_time)?;
        Ok(self.end_time - self.start_time)
    }

    /// Whether `elapsed` falls inside the window (inclusive)
    pub fn contains(&self, elapsed: f64) -> bool {
        elapsed >= self.start_time && elapsed <= self.end_time
    }

    /// Elapsed time mapped into `[0, 1]` over the window
    pub fn normalized_time(&self, elapsed: f64) -> f64 {
        let length = self.end_time - self.start_time;
        if length > 0.0 {
            ((elapsed - self.start_time) / length).clamp(0.0, 1.0)
        } else if elapsed >= self.start_time {
            1.0
        } else {
            0.0
        }
    }

    /// Clip type
    pub fn clip_type(&self) -> ClipType {
        self.payload.clip_type()
    }

    /// Active payload
    pub fn payload(&self) -> &ClipPayload {
        &self.payload
    }

    /// Replace the payload
    pub fn set_payload(&mut self, payload: ClipPayload) -> Result<(), ClipError> {
        payload.validate()?;
        self.payload = payload;
        Ok(())
    }

    /// Collision volume of item-execute clips
    pub fn collision(&self) -> Option<&CollisionVolume> {
        match &self.payload {
            ClipPayload::ItemExecute(volume) => Some(volume),
            _ => None,
        }
    }

    /// Trigger rule of action-event clips, or the volume's rule for item-execute clips
    pub fn trigger_rule(&self) -> Option<&TriggerRule> {
        match &self.payload {
            ClipPayload::ActionEvent(rule) => Some(rule),
            ClipPayload::ItemExecute(volume) => Some(&volume.trigger),
            _ => None,
        }
    }

    /// Volume position at execution time `elapsed`; `None` for clips without a volume
    pub fn volume_position(
        &self,
        elapsed: f64,
        input: &MotionInput,
        settings: &ClipSettings,
    ) -> Option<Result<VolumePosition, ClipError>> {
        let volume = self.collision()?;
        let local = (elapsed - self.start_time).max(0.0);
        Some(
            self.duration()
                .and_then(|duration| volume.current_position_with(local, duration, input, settings)),
        )
    }

    /// Effects in application order
    pub fn effects(&self) -> &EffectList {
        &self.effects
    }

    /// Mutable effects, for authoring
    pub fn effects_mut(&mut self) -> &mut EffectList {
        &mut self.effects
    }

    /// Add a default instance of a registered effect
    ///
    /// Unknown tags are ignored. A tag already on the clip adds another
    /// independent instance. Returns the new effect's index.
    pub fn add_effect(&mut self, registry: &EffectRegistry, type_tag: &str) -> Option<usize> {
        let Some(effect) = registry.create(type_tag) else {
            tracing::debug!("Ignoring unknown effect type '{}' on clip '{}'", type_tag, self.name);
            return None;
        };
        Some(self.effects.push(effect))
    }

    /// Add a default instance of a registered effect, rejecting unknown tags
    pub fn try_add_effect(&mut self, registry: &EffectRegistry, type_tag: &str) -> Result<usize, ClipError> {
        let effect = registry.create(type_tag).ok_or_else(|| {
            tracing::warn!("Unknown effect type '{}' on clip '{}'", type_tag, self.name);
            ClipError::UnknownEffectType(type_tag.to_string())
        })?;
        Ok(self.effects.push(effect))
    }

    /// Add an effect, strict or forgiving per settings
    pub fn add_effect_with(
        &mut self,
        registry: &EffectRegistry,
        type_tag: &str,
        settings: &ClipSettings,
    ) -> Result<Option<usize>, ClipError> {
        if settings.strict_effect_registry {
            self.try_add_effect(registry, type_tag).map(Some)
        } else {
            Ok(self.add_effect(registry, type_tag))
        }
    }
}

fn check_range(start_time: f64, end_time: f64) -> Result<(), ClipError> {
    if start_time.is_nan() || end_time.is_nan() || end_time < start_time {
        return Err(ClipError::InvalidRange {
            start: start_time,
            end: end_time,
        });
    }
    Ok(())
}
