// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed-step preview of executions.
//!
//! The preview plays the host's part: it advances instances, places dummy
//! targets, detects contacts, applies assigned effects and starts spawned
//! executions.

use crate::demo::{DamageEffect, StatusEffect};
use ordoplay_execution_clip::{
    ClipEffect, ClipError, ClipId, ClipSettings, ClipTimeline, CollisionShape, ContactId,
    EffectTarget, ExecutionCatalog, ExecutionInstance, Firing, Interpolation, MotionInput,
    VolumePosition,
};
use serde::Serialize;
use std::collections::VecDeque;

/// Preview step rate
const STEPS_PER_SECOND: f64 = 30.0;

/// Upper bound on executions started by one preview, spawns included
const MAX_RUNS: usize = 16;

/// Radius of dummy targets
const DUMMY_RADIUS: f32 = 0.5;

/// A stationary target the preview collides against
#[derive(Debug, Clone, Copy)]
pub struct Dummy {
    pub contact: ContactId,
    pub position: [f32; 3],
}

/// One recorded firing
#[derive(Debug, Clone, Serialize)]
pub struct FiringRecord {
    pub execution: String,
    pub clip: String,
    pub cause: String,
    pub elapsed: f64,
    pub contact: Option<u64>,
}

/// Everything that happened during a preview
#[derive(Debug, Default, Serialize)]
pub struct PreviewReport {
    pub runs: Vec<String>,
    pub firings: Vec<FiringRecord>,
    pub applied_effects: Vec<String>,
    pub unresolved_spawns: Vec<String>,
}

/// Collects applied effects as readable lines
#[derive(Default)]
struct EffectLog(Vec<String>);

impl EffectTarget for EffectLog {
    fn receive(&mut self, effect: &dyn ClipEffect) {
        let any = effect.as_any();
        let line = if let Some(damage) = any.downcast_ref::<DamageEffect>() {
            format!("Damage {}", damage.amount)
        } else if let Some(status) = any.downcast_ref::<StatusEffect>() {
            format!("Status {} for {}s", status.status, status.duration)
        } else {
            effect.type_tag().to_string()
        };
        tracing::info!("  applied {}", line);
        self.0.push(line);
    }
}

/// Preview driver
pub struct Preview<'a> {
    catalog: &'a ExecutionCatalog,
    settings: &'a ClipSettings,
    dummies: Vec<Dummy>,
    input: MotionInput,
}

impl<'a> Preview<'a> {
    /// Create a preview over a catalog
    pub fn new(catalog: &'a ExecutionCatalog, settings: &'a ClipSettings, dummies: Vec<Dummy>) -> Self {
        Self {
            catalog,
            settings,
            dummies,
            input: MotionInput::new([0.0; 3], [0.0, 0.0, 1.0]),
        }
    }

    /// Play an execution and everything it spawns
    pub fn run(&self, name: &str) -> Result<PreviewReport, ClipError> {
        let mut report = PreviewReport::default();
        let mut effects = EffectLog::default();
        let mut queue = VecDeque::from([name.to_string()]);

        while let Some(next) = queue.pop_front() {
            if report.runs.len() >= MAX_RUNS {
                tracing::warn!("Stopping preview after {} executions", MAX_RUNS);
                break;
            }
            let definition = self.catalog.resolve(&next)?;
            tracing::info!("Running execution '{}' ({}s)", definition.name, definition.total_time);
            report.runs.push(definition.name.clone());

            let mut instance = ExecutionInstance::new(definition);
            let steps = (instance.definition().total_time * STEPS_PER_SECOND).ceil() as usize;
            for step in 0..=steps {
                let elapsed = (step as f64 / STEPS_PER_SECOND).min(instance.definition().total_time);
                let mut firings = instance.update(elapsed);
                firings.extend(self.detect_contacts(&mut instance, elapsed)?);

                for (clip_id, firing) in firings {
                    self.handle_firing(&instance, clip_id, firing, &mut report, &mut effects, &mut queue);
                }
            }
        }

        report.applied_effects = effects.0;
        Ok(report)
    }

    /// Report contacts between active volumes and dummies
    fn detect_contacts(
        &self,
        instance: &mut ExecutionInstance,
        elapsed: f64,
    ) -> Result<Vec<(ClipId, Firing)>, ClipError> {
        let mut contacts = Vec::new();
        let definition = std::sync::Arc::clone(instance.definition());

        for clip in definition.active_clips_at(elapsed) {
            let Some(volume) = clip.collision() else {
                continue;
            };
            let Some(position) = clip.volume_position(elapsed, &self.input, self.settings) else {
                continue;
            };
            let position = match position? {
                VolumePosition::Resolved(position) => position,
                VolumePosition::Deferred(kind) => {
                    tracing::debug!("'{}' waits on {:?} targeting", clip.name, kind);
                    continue;
                }
            };
            tracing::trace!("'{}' at {:?} (t = {:.3})", clip.name, position, elapsed);

            for dummy in &self.dummies {
                if touches(&volume.shape, position, dummy.position) {
                    if let Some(firing) = instance.on_collision(clip.id, dummy.contact) {
                        contacts.push((clip.id, firing));
                    }
                }
            }
        }
        Ok(contacts)
    }

    fn handle_firing(
        &self,
        instance: &ExecutionInstance,
        clip_id: ClipId,
        firing: Firing,
        report: &mut PreviewReport,
        effects: &mut EffectLog,
        queue: &mut VecDeque<String>,
    ) {
        let definition = instance.definition();
        let Some(clip) = definition.clip(clip_id) else {
            return;
        };
        tracing::info!("'{}' fired {:?} at {:.3}", clip.name, firing.cause, firing.elapsed);
        report.firings.push(FiringRecord {
            execution: definition.name.clone(),
            clip: clip.name.clone(),
            cause: format!("{:?}", firing.cause),
            elapsed: firing.elapsed,
            contact: firing.contact.map(|c| c.0),
        });

        let Some(rule) = clip.trigger_rule() else {
            return;
        };
        if let Some((apply, target)) = rule.assignment() {
            tracing::info!("  assigning {:?} to {:?}", apply, target);
            clip.effects().apply_selected(apply, effects);
        }
        match rule.resolve_spawn(self.catalog) {
            Ok(Some(name)) => queue.push_back(name.to_string()),
            Ok(None) => {}
            Err(err) => {
                tracing::error!("{} in clip '{}'", err, clip.name);
                report.unresolved_spawns.push(err.to_string());
            }
        }
    }
}

/// Whether a dummy overlaps a shape placed at `position`
fn touches(shape: &CollisionShape, position: [f32; 3], dummy: [f32; 3]) -> bool {
    match shape {
        CollisionShape::Sphere { radius } => {
            Interpolation::distance_vec3(position, dummy) <= radius + DUMMY_RADIUS
        }
        CollisionShape::Box { center, size } => {
            let center = Interpolation::add_vec3(position, *center);
            (0..3).all(|axis| (dummy[axis] - center[axis]).abs() <= size[axis] * 0.5 + DUMMY_RADIUS)
        }
    }
}

/// Summary line for a clip
pub fn describe_clip(clip: &ClipTimeline) -> String {
    format!(
        "{:<12} {:<16} [{:.2}, {:.2}] effects: {}",
        clip.name,
        clip.clip_type().name(),
        clip.start_time(),
        clip.end_time(),
        clip.effects().len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{create_demo_catalog, create_effect_registry};

    fn dummies() -> Vec<Dummy> {
        vec![
            Dummy {
                contact: ContactId(1),
                position: [0.0, 1.0, 7.5],
            },
            Dummy {
                contact: ContactId(2),
                position: [1.5, 0.5, 0.0],
            },
        ]
    }

    #[test]
    fn test_touches_sphere_and_box() {
        let sphere = CollisionShape::Sphere { radius: 0.5 };
        assert!(touches(&sphere, [0.0; 3], [0.9, 0.0, 0.0]));
        assert!(!touches(&sphere, [0.0; 3], [1.1, 0.0, 0.0]));

        let cube = CollisionShape::Box {
            center: [0.0, 1.0, 0.0],
            size: [2.0, 2.0, 2.0],
        };
        assert!(touches(&cube, [0.0; 3], [1.4, 1.0, 0.0]));
        assert!(!touches(&cube, [0.0; 3], [0.0, 2.6, 0.0]));
    }

    #[test]
    fn test_fireball_spawns_explosion() {
        let settings = ClipSettings::default();
        let catalog = create_demo_catalog(&create_effect_registry(), &settings).unwrap();
        let report = Preview::new(&catalog, &settings, dummies()).run("Fireball").unwrap();

        assert_eq!(report.runs, vec!["Fireball".to_string(), "Explosion".to_string()]);
        assert!(report.unresolved_spawns.is_empty());
        assert!(report
            .firings
            .iter()
            .any(|f| f.clip == "Projectile" && f.contact == Some(1)));
        assert!(report.applied_effects.contains(&"Damage 25".to_string()));
    }

    #[test]
    fn test_strict_settings_reject_unknown_effect() {
        let settings = ClipSettings {
            strict_effect_registry: true,
            ..ClipSettings::default()
        };
        assert!(create_demo_catalog(&create_effect_registry(), &settings).is_err());
    }

    #[test]
    fn test_unknown_execution_fails() {
        let settings = ClipSettings::default();
        let catalog = create_demo_catalog(&create_effect_registry(), &settings).unwrap();
        assert!(Preview::new(&catalog, &settings, dummies()).run("Meteor").is_err());
    }
}
