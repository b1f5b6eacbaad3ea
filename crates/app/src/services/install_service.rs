//! Install service: provisions registered events into the dictionary.

use std::fmt;

use scenariobot_domain::error::BotError;
use scenariobot_domain::event::Event;
use scenariobot_domain::id::EventId;
use scenariobot_domain::scenario::Scenario;

use crate::ports::{ChatEvent, DictionaryRepository};
use crate::registry::EventRegistry;

/// What provisioning did for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// First install: event row, scenarios and questions inserted.
    Installed,
    /// Version changed: missing scenarios and questions added.
    Updated,
    /// Installed version matches; nothing written.
    UpToDate,
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Installed => "installed",
            Self::Updated => "updated",
            Self::UpToDate => "up to date",
        })
    }
}

/// Writes each event's scenarios into the dictionary.
pub struct InstallService<D> {
    dictionary: D,
}

impl<D: DictionaryRepository> InstallService<D> {
    pub fn new(dictionary: D) -> Self {
        Self { dictionary }
    }

    /// Provision every registered event, in alias order.
    ///
    /// # Errors
    ///
    /// Stops at the first event failing validation or storage.
    pub async fn install_all(
        &self,
        registry: &EventRegistry,
    ) -> Result<Vec<(String, InstallOutcome)>, BotError> {
        let mut outcomes = Vec::with_capacity(registry.len());
        for event in registry.events() {
            let outcome = self.install(event.as_ref()).await?;
            outcomes.push((event.alias().to_string(), outcome));
        }
        Ok(outcomes)
    }

    /// Install `event`, or update it when its version changed.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Validation`] when the event or one of its scenarios
    /// is invalid, or a storage error from the dictionary.
    #[tracing::instrument(skip(self, event), fields(alias = event.alias(), version = event.version()))]
    pub async fn install(&self, event: &dyn ChatEvent) -> Result<InstallOutcome, BotError> {
        Event::new(event.alias(), event.version()).validate()?;
        let scenarios = event.scenarios();
        scenarios.iter().try_for_each(Scenario::validate)?;

        let outcome = match self.dictionary.find_event(event.alias()).await? {
            None => {
                let event_id = self
                    .dictionary
                    .install_event(event.alias(), event.version())
                    .await?;
                for scenario in &scenarios {
                    self.add_scenario(event_id, scenario).await?;
                }
                InstallOutcome::Installed
            }
            Some(installed) if installed.needs_update(event.version()) => {
                for scenario in &scenarios {
                    self.add_scenario(installed.id, scenario).await?;
                }
                self.dictionary
                    .update_event_version(installed.id, event.version())
                    .await?;
                InstallOutcome::Updated
            }
            Some(_) => InstallOutcome::UpToDate,
        };
        tracing::info!(%outcome, "event provisioned");
        Ok(outcome)
    }

    /// Insert `scenario` (if missing) and every question it does not have yet.
    async fn add_scenario(&self, event_id: EventId, scenario: &Scenario) -> Result<(), BotError> {
        let scenario_id = match self
            .dictionary
            .find_scenario(event_id, &scenario.name)
            .await?
        {
            Some(id) => id,
            None => {
                self.dictionary
                    .insert_scenario(&scenario.name, event_id)
                    .await?
            }
        };
        let existing = self
            .dictionary
            .questions_by_scenario(scenario_id, false)
            .await?;
        for question in &scenario.questions {
            let present = existing
                .iter()
                .any(|row| row.question == question.text && row.is_variable == question.is_variable);
            if !present {
                self.dictionary
                    .insert_question(scenario_id, question)
                    .await?;
            }
        }
        Ok(())
    }
}
