// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end behavior of clips through the public API.

use ordoplay_execution_clip::{
    BezierCurve, BezierPoint, ClipEffect, ClipError, ClipPayload, ClipTimeline, CollisionShape,
    CollisionVolume, ContactId, EffectApplyKind, EffectApplyTarget, EffectInfo, EffectRegistry,
    EffectTarget, ExecutionCatalog, ExecutionDefinition, ExecutionInstance, ExecutionState,
    FireEvent, FireFlags, HandleStyle, MotionInput, MovementType, TriggerRule, VolumePosition,
};
use std::any::Any;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct KnockbackEffect {
    enabled: bool,
    force: f32,
}

impl ClipEffect for KnockbackEffect {
    fn type_tag(&self) -> &str {
        "Knockback"
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

#[derive(Default)]
struct ForceTally(f32);

impl EffectTarget for ForceTally {
    fn receive(&mut self, effect: &dyn ClipEffect) {
        if let Some(knockback) = effect.as_any().downcast_ref::<KnockbackEffect>() {
            self.0 += knockback.force;
        }
    }
}

fn registry() -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    registry.register(EffectInfo {
        type_tag: "Knockback",
        display_name: "Knockback",
        order: 0,
        create_default: || Box::new(KnockbackEffect { enabled: false, force: 3.0 }),
    });
    registry
}

fn straight_path() -> BezierCurve {
    BezierCurve::from_points([
        BezierPoint::new([0.0, 0.0, 0.0]),
        BezierPoint::new([4.0, 0.0, 0.0]),
    ])
}

#[test]
fn test_duration_matches_window_and_rejects_inverted_range() {
    let rule = TriggerRule::disabled();
    let clip = ClipTimeline::new("Window", 0.5, 2.0, ClipPayload::ActionEvent(rule.clone())).unwrap();
    assert_eq!(clip.duration(), Ok(clip.end_time() - clip.start_time()));

    let inverted = ClipTimeline::new("Inverted", 2.0, 0.5, ClipPayload::ActionEvent(rule));
    assert!(matches!(inverted, Err(ClipError::InvalidRange { .. })));
}

#[test]
fn test_control_points_round_trip_field_by_field() {
    let curve = BezierCurve::from_points([
        BezierPoint::new([0.0, 1.0, 2.0]).with_handles([-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
        BezierPoint::new([3.0, 4.0, 5.0])
            .with_handle_style(HandleStyle::Broken)
            .with_handles([0.0, -2.0, 0.0], [0.0, 0.5, 0.5]),
        BezierPoint::new([6.0, 7.0, 8.0]).with_handle_style(HandleStyle::NoHandles),
    ]);
    let volume = CollisionVolume::new(CollisionShape::default(), MovementType::PathFly).with_path(curve.clone());

    let copied = volume.path_sampler().control_points();
    assert_eq!(copied, curve.key_points);
}

#[test]
fn test_sample_hits_first_and_last_points() {
    let curve = BezierCurve::from_points([
        BezierPoint::new([1.0, 0.0, 0.0]).with_handles([0.0; 3], [0.0, 2.0, 0.0]),
        BezierPoint::new([2.0, 3.0, 0.0]),
        BezierPoint::new([5.0, 1.0, -1.0]).with_handles([0.0, 1.0, 0.0], [0.0; 3]),
    ]);
    let volume = CollisionVolume::new(CollisionShape::default(), MovementType::PathFly).with_path(curve);
    let sampler = volume.path_sampler();

    assert_eq!(sampler.sample(0.0), Some([1.0, 0.0, 0.0]));
    assert_eq!(sampler.sample(1.0), Some([5.0, 1.0, -1.0]));
}

#[test]
fn test_empty_flags_are_never_assign_or_spawn() {
    for event in [
        FireEvent::AssignEffect {
            apply: EffectApplyKind::AllEffects,
            target: EffectApplyTarget::Caster,
        },
        FireEvent::TriggerNewExecution {
            execution: "Meteor".to_string(),
        },
    ] {
        let rule = TriggerRule::new(FireFlags::empty(), event);
        assert!(!rule.is_assign_trigger());
        assert!(!rule.is_spawn_trigger());
    }
}

#[test]
fn test_start_and_end_assign_fires_twice() {
    let rule = TriggerRule::assign(
        FireFlags::START_TRIGGER | FireFlags::END_TRIGGER,
        EffectApplyKind::AllEffects,
        EffectApplyTarget::Target,
    );
    assert!(rule.is_assign_trigger());

    let mut clip = ClipTimeline::new("Pulse", 0.2, 0.8, ClipPayload::ActionEvent(rule)).unwrap();
    let registry = registry();
    clip.add_effect(&registry, "Knockback");

    let mut state = ExecutionState::new(&clip);
    let mut tally = ForceTally::default();
    let mut firings = Vec::new();
    for frame in 0..=60 {
        state.update(frame as f64 / 60.0);
        for firing in state.take_firings() {
            let (apply, _) = clip.trigger_rule().and_then(TriggerRule::assignment).unwrap();
            clip.effects().apply_selected(apply, &mut tally);
            firings.push(firing);
        }
    }

    assert_eq!(firings.len(), 2);
    assert_eq!(firings[0].cause, FireFlags::START_TRIGGER);
    assert_eq!(firings[0].elapsed, 0.2);
    assert_eq!(firings[1].cause, FireFlags::END_TRIGGER);
    assert_eq!(firings[1].elapsed, 0.8);
    assert_eq!(tally.0, 6.0);
}

#[test]
fn test_path_fly_requires_path_and_reaches_midpoint() {
    let bare = CollisionVolume::new(CollisionShape::Sphere { radius: 0.5 }, MovementType::PathFly);
    assert_eq!(
        ClipTimeline::new("Orb", 0.0, 2.0, ClipPayload::ItemExecute(bare.clone())).unwrap_err(),
        ClipError::MissingPath
    );

    let volume = bare.with_path(straight_path()).with_speed(1.0);
    let clip = ClipTimeline::new("Orb", 0.0, 2.0, ClipPayload::ItemExecute(volume)).unwrap();
    let duration = clip.duration().unwrap();

    let position = clip
        .collision()
        .unwrap()
        .current_position(duration / 2.0, duration, &MotionInput::default())
        .unwrap();
    match position {
        VolumePosition::Resolved(p) => {
            assert!((p[0] - 2.0).abs() < 1.0e-5);
            assert!(p[1].abs() < 1.0e-5 && p[2].abs() < 1.0e-5);
        }
        VolumePosition::Deferred(kind) => panic!("unexpected deferred position: {kind:?}"),
    }
}

#[test]
fn test_add_effect_ignores_unknown_and_enables_known() {
    let registry = registry();
    let mut clip = ClipTimeline::new("Hit", 0.0, 1.0, ClipPayload::ActionEvent(TriggerRule::disabled())).unwrap();

    clip.add_effect(&registry, "Unknown");
    assert_eq!(clip.effects().len(), 0);

    clip.add_effect(&registry, "Knockback");
    assert_eq!(clip.effects().len(), 1);
    assert!(clip.effects().get(0).unwrap().is_enabled());
}

#[test]
fn test_shared_definition_backs_independent_instances() {
    let volume = CollisionVolume::new(CollisionShape::Sphere { radius: 1.0 }, MovementType::Normal)
        .with_trigger(TriggerRule::spawn(FireFlags::COLLISION_TRIGGER, "Explosion"));
    let clip = ClipTimeline::new("Bolt", 0.0, 1.0, ClipPayload::ItemExecute(volume)).unwrap();
    let clip_id = clip.id;

    let mut catalog = ExecutionCatalog::new();
    catalog.insert(ExecutionDefinition::new("Bolt", 1.0).with_clip(clip));
    catalog.insert(ExecutionDefinition::new("Explosion", 0.5));
    catalog.validate().unwrap();

    let definition = catalog.get("Bolt").unwrap();
    let mut left = ExecutionInstance::new(Arc::clone(&definition));
    let mut right = ExecutionInstance::new(definition);

    left.update(0.3);
    right.update(0.3);
    assert!(left.on_collision(clip_id, ContactId(1)).is_some());
    assert!(left.on_collision(clip_id, ContactId(2)).is_none());
    assert!(right.on_collision(clip_id, ContactId(2)).is_some());

    let rule = left.definition().clip(clip_id).unwrap().trigger_rule().unwrap();
    assert_eq!(rule.resolve_spawn(&catalog), Ok(Some("Explosion")));
    assert_eq!(catalog.resolve("Explosion").unwrap().name, "Explosion");
}
