//! Status and behavior registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::behavior::{StatusBehavior, builtin_behaviors};
use super::definition::StatusDefinition;
use super::{BehaviorId, StatusId, StatusRuntime};

/// Table of status definitions and the behaviors they delegate to.
///
/// Built once at startup and then shared read-only (typically behind an
/// `Arc`) for the lifetime of a session. Definitions keep their registration
/// position even when overwritten, which is what passive modifiers fall back
/// to when two priorities tie.
pub struct StatusRegistry {
    definitions: Vec<Arc<StatusDefinition>>,
    index: HashMap<StatusId, usize>,
    behaviors: HashMap<BehaviorId, Arc<dyn StatusBehavior>>,
}

impl StatusRegistry {
    /// Creates a registry with the built-in behaviors and no statuses.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for behavior in builtin_behaviors() {
            registry.register_behavior(behavior);
        }
        registry
    }

    /// Creates a registry with no behaviors and no statuses.
    pub fn empty() -> Self {
        Self {
            definitions: Vec::new(),
            index: HashMap::new(),
            behaviors: HashMap::new(),
        }
    }

    /// Registers `definition`, replacing any previous one with the same id.
    ///
    /// A replaced definition keeps its original registration position.
    pub fn define_status(&mut self, definition: StatusDefinition) -> Arc<StatusDefinition> {
        let definition = Arc::new(definition);
        match self.index.get(&definition.id) {
            Some(&position) => self.definitions[position] = Arc::clone(&definition),
            None => {
                self.index
                    .insert(definition.id.clone(), self.definitions.len());
                self.definitions.push(Arc::clone(&definition));
            }
        }
        definition
    }

    /// Looks up a definition by id.
    pub fn get_status(&self, id: &str) -> Option<&Arc<StatusDefinition>> {
        self.index.get(id).map(|&position| &self.definitions[position])
    }

    /// All definitions in registration order.
    pub fn list_statuses(&self) -> &[Arc<StatusDefinition>] {
        &self.definitions
    }

    /// Registration position of `id`, used for stable tie-breaking.
    pub fn registration_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Registers a behavior under its own id, replacing any previous one.
    pub fn register_behavior(&mut self, behavior: Arc<dyn StatusBehavior>) {
        self.behaviors.insert(behavior.id(), behavior);
    }

    pub fn behavior(&self, id: &str) -> Option<&Arc<dyn StatusBehavior>> {
        self.behaviors.get(id)
    }

    /// Behavior attached to `definition`, if it names a registered one.
    pub fn behavior_for(&self, definition: &StatusDefinition) -> Option<&Arc<dyn StatusBehavior>> {
        definition
            .behavior
            .as_ref()
            .and_then(|id| self.behaviors.get(id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Drops every definition and restores the built-in behaviors.
    ///
    /// Test isolation only.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Runtime view over this registry.
    pub fn runtime(&self) -> StatusRuntime<'_> {
        StatusRuntime::new(self)
    }
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for StatusRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut behaviors: Vec<_> = self.behaviors.keys().map(BehaviorId::as_str).collect();
        behaviors.sort_unstable();
        f.debug_struct("StatusRegistry")
            .field(
                "statuses",
                &self
                    .definitions
                    .iter()
                    .map(|d| d.id.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("behaviors", &behaviors)
            .finish()
    }
}
