// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo effects and executions used by the preview.

use ordoplay_execution_clip::{
    AssetHandle, BezierCurve, BezierPoint, ClipEffect, ClipError, ClipPayload, ClipSettings,
    ClipTimeline, CollisionShape, CollisionVolume, EffectApplyKind, EffectApplyTarget, EffectInfo,
    EffectRegistry, EffectTarget, ExecutionCatalog, ExecutionDefinition, FireFlags, HandleStyle,
    MovementType, TriggerRule,
};
use std::any::Any;

/// Flat damage
#[derive(Debug, Clone)]
pub struct DamageEffect {
    pub enabled: bool,
    pub amount: f32,
}

impl ClipEffect for DamageEffect {
    fn type_tag(&self) -> &str {
        "Damage"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn apply(&self, target: &mut dyn EffectTarget) {
        target.receive(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_effect(&self) -> Box<dyn ClipEffect> {
        Box::new(self.clone())
    }
}

/// Named status applied for a duration
#[derive(Debug, Clone)]
pub struct StatusEffect {
    pub enabled: bool,
    pub status: String,
    pub duration: f32,
}

impl ClipEffect for StatusEffect {
    fn type_tag(&self) -> &str {
        "Status"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn apply(&self, target: &mut dyn EffectTarget) {
        target.receive(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_effect(&self) -> Box<dyn ClipEffect> {
        Box::new(self.clone())
    }
}

/// Effect registry populated at startup
pub fn create_effect_registry() -> EffectRegistry {
    EffectRegistry::new()
        .with(EffectInfo {
            type_tag: "Damage",
            display_name: "Damage",
            order: 0,
            create_default: || Box::new(DamageEffect { enabled: true, amount: 25.0 }),
        })
        .with(EffectInfo {
            type_tag: "Status",
            display_name: "Apply Status",
            order: 1,
            create_default: || {
                Box::new(StatusEffect {
                    enabled: true,
                    status: "Burning".to_string(),
                    duration: 3.0,
                })
            },
        })
}

/// Build the demo executions
///
/// "Fireball" casts, flies along an arc, and spawns "Explosion" on impact.
pub fn create_demo_catalog(
    registry: &EffectRegistry,
    settings: &ClipSettings,
) -> Result<ExecutionCatalog, ClipError> {
    let arc = BezierCurve::from_points([
        BezierPoint::new([0.0, 1.0, 0.0]).with_handles([0.0; 3], [0.0, 2.0, 2.0]),
        BezierPoint::new([0.0, 1.0, 8.0])
            .with_handle_style(HandleStyle::Broken)
            .with_handles([0.0, 2.0, -2.0], [0.0; 3]),
    ]);
    let projectile = CollisionVolume::new(CollisionShape::Sphere { radius: 0.5 }, MovementType::SelectedDirectionPathFly)
        .with_path(arc)
        .with_obj_asset(AssetHandle::new("prefab/fireball"))
        .with_speed(1.0)
        .with_trigger(TriggerRule::spawn(FireFlags::COLLISION_TRIGGER, "Explosion"));

    let mut fireball = ExecutionDefinition::new("Fireball", 1.5);
    fireball.add_clip(ClipTimeline::new(
        "Cast",
        0.0,
        0.4,
        ClipPayload::Animation(AssetHandle::new("anim/cast_fireball")),
    )?);
    let mut launch = ClipTimeline::new(
        "Launch",
        0.3,
        0.3,
        ClipPayload::ActionEvent(TriggerRule::assign(
            FireFlags::START_TRIGGER,
            EffectApplyKind::Single(0),
            EffectApplyTarget::Caster,
        )),
    )?;
    launch.add_effect_with(registry, "Status", settings)?;
    fireball.add_clip(launch);
    fireball.add_clip(ClipTimeline::new("Projectile", 0.3, 1.3, ClipPayload::ItemExecute(projectile))?);

    let blast = CollisionVolume::new(
        CollisionShape::Box {
            center: [0.0, 0.5, 0.0],
            size: [3.0, 1.0, 3.0],
        },
        MovementType::FixedPosition,
    )
    .with_trigger(TriggerRule::assign(
        FireFlags::COLLISION_TRIGGER_MULTIPLE | FireFlags::END_TRIGGER,
        EffectApplyKind::AllEffects,
        EffectApplyTarget::CollidedUnit,
    ));
    let mut explosion_clip = ClipTimeline::new("Blast", 0.0, 0.5, ClipPayload::ItemExecute(blast))?;
    for tag in ["Damage", "Status", "Freeze"] {
        explosion_clip.add_effect_with(registry, tag, settings)?;
    }

    let explosion = ExecutionDefinition::new("Explosion", 0.5)
        .with_clip(explosion_clip)
        .with_clip(ClipTimeline::new(
            "Boom",
            0.0,
            0.5,
            ClipPayload::Audio(AssetHandle::new("sfx/explosion")),
        )?)
        .with_clip(ClipTimeline::new(
            "Smoke",
            0.0,
            0.5,
            ClipPayload::ParticleEffect(AssetHandle::new("vfx/smoke")),
        )?);

    let mut catalog = ExecutionCatalog::new();
    catalog.insert(fireball);
    catalog.insert(explosion);
    catalog.validate()?;
    Ok(catalog)
}
