// SPDX-License-Identifier: MIT OR Apache-2.0
//! Effects and the effect registry.
//!
//! Concrete effects live outside this crate. The host registers a factory per
//! effect type tag at startup; clips then create default instances by tag.

use crate::trigger::EffectApplyKind;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;

/// Receiver of applied effects, implemented by the host
pub trait EffectTarget {
    /// Receive one effect; downcast through [`ClipEffect::as_any`] for its data
    fn receive(&mut self, effect: &dyn ClipEffect);
}

/// A unit of gameplay consequence attached to a clip
pub trait ClipEffect: fmt::Debug + Send + Sync + 'static {
    /// Registry type tag
    fn type_tag(&self) -> &str;

    /// Whether the effect is applied when the clip fires
    fn is_enabled(&self) -> bool;

    /// Enable or disable the effect
    fn set_enabled(&mut self, enabled: bool);

    /// Apply the effect to a target
    fn apply(&self, target: &mut dyn EffectTarget);

    /// Access the concrete effect
    fn as_any(&self) -> &dyn Any;

    /// Clone into a new box
    fn clone_effect(&self) -> Box<dyn ClipEffect>;
}

impl Clone for Box<dyn ClipEffect> {
    fn clone(&self) -> Self {
        self.clone_effect()
    }
}

/// Registration entry for an effect type
#[derive(Debug, Clone)]
pub struct EffectInfo {
    /// Unique type tag
    pub type_tag: &'static str,
    /// Name shown by authoring tools
    pub display_name: &'static str,
    /// Sort key for listings
    pub order: i32,
    /// Factory for a default instance
    pub create_default: fn() -> Box<dyn ClipEffect>,
}

/// Explicit table of effect factories, keyed by type tag
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    types: IndexMap<&'static str, EffectInfo>,
}

impl EffectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect type, replacing any entry with the same tag
    pub fn register(&mut self, info: EffectInfo) {
        if self.types.insert(info.type_tag, info).is_some() {
            tracing::debug!("Replaced effect registration");
        }
    }

    /// Builder-style registration
    pub fn with(mut self, info: EffectInfo) -> Self {
        self.register(info);
        self
    }

    /// Get an entry by tag
    pub fn get(&self, type_tag: &str) -> Option<&EffectInfo> {
        self.types.get(type_tag)
    }

    /// Whether a tag is registered
    pub fn contains(&self, type_tag: &str) -> bool {
        self.types.contains_key(type_tag)
    }

    /// Available `(type tag, order)` pairs, sorted by order then registration
    pub fn list_available(&self) -> Vec<(&'static str, i32)> {
        let mut available: Vec<_> = self.types.values().map(|info| (info.type_tag, info.order)).collect();
        available.sort_by_key(|(_, order)| *order);
        available
    }

    /// Create a default, enabled instance of a registered effect
    pub fn create(&self, type_tag: &str) -> Option<Box<dyn ClipEffect>> {
        let info = self.get(type_tag)?;
        let mut effect = (info.create_default)();
        effect.set_enabled(true);
        Some(effect)
    }

    /// Get registered type count
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Ordered effects of a clip; order is application order
#[derive(Debug, Clone, Default)]
pub struct EffectList {
    effects: Vec<Box<dyn ClipEffect>>,
}

impl EffectList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an effect, returning its index
    pub fn push(&mut self, effect: Box<dyn ClipEffect>) -> usize {
        self.effects.push(effect);
        self.effects.len() - 1
    }

    /// Remove an effect by index
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn ClipEffect>> {
        (index < self.effects.len()).then(|| self.effects.remove(index))
    }

    /// Get an effect by index
    pub fn get(&self, index: usize) -> Option<&dyn ClipEffect> {
        self.effects.get(index).map(Box::as_ref)
    }

    /// Get a mutable effect by index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn ClipEffect>> {
        self.effects.get_mut(index)
    }

    /// Iterate in application order
    pub fn iter(&self) -> impl Iterator<Item = &dyn ClipEffect> {
        self.effects.iter().map(Box::as_ref)
    }

    /// Iterate enabled effects in application order
    pub fn enabled(&self) -> impl Iterator<Item = &dyn ClipEffect> {
        self.iter().filter(|e| e.is_enabled())
    }

    /// Get effect count
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Apply every enabled effect in order, returning how many were applied
    pub fn apply_enabled(&self, target: &mut dyn EffectTarget) -> usize {
        let mut applied = 0;
        for effect in self.enabled() {
            effect.apply(target);
            applied += 1;
        }
        applied
    }

    /// Apply the effects selected by an assign rule
    pub fn apply_selected(&self, kind: EffectApplyKind, target: &mut dyn EffectTarget) -> usize {
        match kind {
            EffectApplyKind::AllEffects => self.apply_enabled(target),
            EffectApplyKind::Single(index) => match self.get(index) {
                Some(effect) if effect.is_enabled() => {
                    effect.apply(target);
                    1
                }
                _ => 0,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod test_effects {
    //! Effects shared by unit tests.

    use super::*;

    #[derive(Debug, Clone, Default)]
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

    #[derive(Debug, Clone, Default)]
    pub struct StunEffect {
        pub enabled: bool,
    }

    impl ClipEffect for StunEffect {
        fn type_tag(&self) -> &str {
            "Stun"
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

    /// Records received tags in order
    #[derive(Debug, Default)]
    pub struct Recorder(pub Vec<String>);

    impl EffectTarget for Recorder {
        fn receive(&mut self, effect: &dyn ClipEffect) {
            self.0.push(effect.type_tag().to_string());
        }
    }

    pub fn registry() -> EffectRegistry {
        EffectRegistry::new()
            .with(EffectInfo {
                type_tag: "Stun",
                display_name: "Stun",
                order: 2,
                create_default: || Box::new(StunEffect::default()),
            })
            .with(EffectInfo {
                type_tag: "Damage",
                display_name: "Damage",
                order: 1,
                create_default: || Box::new(DamageEffect { enabled: false, amount: 10.0 }),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::test_effects::*;
    use super::*;

    #[test]
    fn test_list_available_sorted_by_order() {
        let registry = registry();
        assert_eq!(registry.list_available(), vec![("Damage", 1), ("Stun", 2)]);
    }

    #[test]
    fn test_create_enables_instance() {
        let registry = registry();
        let effect = registry.create("Damage").unwrap();
        assert!(effect.is_enabled());
        let damage = effect.as_any().downcast_ref::<DamageEffect>().unwrap();
        assert_eq!(damage.amount, 10.0);

        assert!(registry.create("Heal").is_none());
    }

    #[test]
    fn test_apply_in_order_skips_disabled() {
        let registry = registry();
        let mut list = EffectList::new();
        list.push(registry.create("Stun").unwrap());
        list.push(registry.create("Damage").unwrap());
        list.push(registry.create("Stun").unwrap());
        list.get_mut(2).unwrap().set_enabled(false);

        let mut recorder = Recorder::default();
        assert_eq!(list.apply_enabled(&mut recorder), 2);
        assert_eq!(recorder.0, vec!["Stun", "Damage"]);
    }

    #[test]
    fn test_apply_selected_single() {
        let registry = registry();
        let mut list = EffectList::new();
        list.push(registry.create("Stun").unwrap());
        list.push(registry.create("Damage").unwrap());

        let mut recorder = Recorder::default();
        assert_eq!(list.apply_selected(EffectApplyKind::Single(1), &mut recorder), 1);
        assert_eq!(list.apply_selected(EffectApplyKind::Single(9), &mut recorder), 0);
        assert_eq!(recorder.0, vec!["Damage"]);
    }

    #[test]
    fn test_remove_and_clone() {
        let registry = registry();
        let mut list = EffectList::new();
        list.push(registry.create("Stun").unwrap());
        list.push(registry.create("Damage").unwrap());

        let copy = list.clone();
        assert_eq!(list.remove(0).unwrap().type_tag(), "Stun");
        assert!(list.remove(5).is_none());
        assert_eq!(list.len(), 1);
        assert_eq!(copy.len(), 2);
    }
}
