//! Event registry: alias to implementation, built once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use scenariobot_domain::error::{BotError, ValidationError};

use crate::ports::ChatEvent;

/// Registered [`ChatEvent`]s keyed by alias.
#[derive(Clone, Default)]
pub struct EventRegistry {
    events: HashMap<String, Arc<dyn ChatEvent>>,
}

impl EventRegistry {
    /// Register `event` under its alias.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Validation`] when the alias is blank or already
    /// registered.
    pub fn register(&mut self, event: Arc<dyn ChatEvent>) -> Result<(), BotError> {
        let alias = event.alias().trim().to_string();
        if alias.is_empty() {
            return Err(ValidationError::EmptyAlias.into());
        }
        if self.events.contains_key(&alias) {
            return Err(ValidationError::DuplicateAlias(alias).into());
        }
        tracing::debug!(%alias, "event registered");
        self.events.insert(alias, event);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, alias: &str) -> Option<Arc<dyn ChatEvent>> {
        self.events.get(alias).cloned()
    }

    /// Registered aliases, sorted.
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<_> = self.events.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    /// Registered events, sorted by alias.
    pub fn events(&self) -> impl Iterator<Item = &Arc<dyn ChatEvent>> {
        let mut events: Vec<_> = self.events.iter().collect();
        events.sort_unstable_by(|a, b| a.0.cmp(b.0));
        events.into_iter().map(|(_, event)| event)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("aliases", &self.aliases())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubEvent;

    #[test]
    fn should_look_up_registered_event_by_alias() {
        let mut registry = EventRegistry::default();
        registry
            .register(Arc::new(StubEvent::new("hello", Vec::new())))
            .unwrap();

        assert_eq!(registry.get("hello").unwrap().alias(), "hello");
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_reject_duplicate_alias() {
        let mut registry = EventRegistry::default();
        registry
            .register(Arc::new(StubEvent::new("hello", Vec::new())))
            .unwrap();
        let err = registry
            .register(Arc::new(StubEvent::new("hello", Vec::new())))
            .unwrap_err();
        assert!(matches!(
            err,
            BotError::Validation(ValidationError::DuplicateAlias(alias)) if alias == "hello"
        ));
    }

    #[test]
    fn should_reject_blank_alias() {
        let mut registry = EventRegistry::default();
        let err = registry
            .register(Arc::new(StubEvent::new("  ", Vec::new())))
            .unwrap_err();
        assert!(matches!(
            err,
            BotError::Validation(ValidationError::EmptyAlias)
        ));
    }

    #[test]
    fn should_list_aliases_sorted() {
        let mut registry = EventRegistry::default();
        for alias in ["schedule", "repeat", "write_message"] {
            registry
                .register(Arc::new(StubEvent::new(alias, Vec::new())))
                .unwrap();
        }
        assert_eq!(registry.aliases(), ["repeat", "schedule", "write_message"]);
        let ordered: Vec<_> = registry.events().map(|e| e.alias().to_string()).collect();
        assert_eq!(ordered, ["repeat", "schedule", "write_message"]);
    }
}
