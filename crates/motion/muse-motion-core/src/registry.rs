//! Effect registry: name -> effect, read-only once the page is initialised.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::effect::{Effect, EffectSpec, NoopEffect};
use crate::error::MotionError;
use crate::presets;

pub struct EffectRegistry {
    effects: HashMap<String, Arc<dyn Effect>>,
    noop: Arc<dyn Effect>,
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("effects", &self.names())
            .finish()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            effects: HashMap::new(),
            noop: Arc::new(NoopEffect),
        }
    }

    /// Registry preloaded with the card hover effects (`fadeUp`, `glow`, `rotate3D`).
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for spec in presets::card_effects() {
            // Preset names are distinct; a clash here would be a preset bug.
            if let Err(err) = registry.register_spec(spec) {
                log::error!("builtin effect rejected: {err}");
            }
        }
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        effect: Arc<dyn Effect>,
    ) -> Result<(), MotionError> {
        let name = name.into();
        if self.effects.contains_key(&name) {
            return Err(MotionError::DuplicateEffect { name });
        }
        log::debug!("registered effect '{name}'");
        self.effects.insert(name, effect);
        Ok(())
    }

    /// Register a declarative effect under its own name.
    pub fn register_spec(&mut self, spec: EffectSpec) -> Result<(), MotionError> {
        let name = spec.name.clone();
        self.register(name, Arc::new(spec))
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Effect>, MotionError> {
        self.effects
            .get(name)
            .cloned()
            .ok_or_else(|| MotionError::UnknownEffect {
                name: name.to_string(),
            })
    }

    /// Resolve, degrading unknown names to the no-op effect.
    pub fn resolve_or_noop(&self, name: &str) -> Arc<dyn Effect> {
        match self.resolve(name) {
            Ok(effect) => effect,
            Err(err) => {
                log::warn!("{err}; falling back to no-op effect");
                self.noop()
            }
        }
    }

    #[inline]
    pub fn noop(&self) -> Arc<dyn Effect> {
        Arc::clone(&self.noop)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.effects.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_effects_are_registered() {
        let registry = EffectRegistry::with_builtin();
        assert_eq!(registry.names(), vec!["fadeUp", "glow", "rotate3D"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = EffectRegistry::with_builtin();
        let err = registry
            .register("glow", Arc::new(NoopEffect))
            .unwrap_err();
        assert_eq!(
            err,
            MotionError::DuplicateEffect {
                name: "glow".into()
            }
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn unknown_names_fail_resolve_and_degrade() {
        let registry = EffectRegistry::with_builtin();
        assert!(matches!(
            registry.resolve("sparkle"),
            Err(MotionError::UnknownEffect { .. })
        ));
        assert_eq!(registry.resolve_or_noop("sparkle").name(), "noop");
        assert_eq!(registry.resolve_or_noop("glow").name(), "glow");
    }
}
