//! Schedule queue: commands waiting for their fire time.
//!
//! Items are pushed by the `schedule` event and drained by a periodic tick in
//! the binary. Due repeatable items are re-armed for their following run,
//! one-shot items are removed.

use std::sync::{Mutex, MutexGuard, PoisonError};

use scenariobot_domain::id::ScheduleId;
use scenariobot_domain::schedule::ScheduledItem;
use scenariobot_domain::time::Timestamp;

/// In-process queue of [`ScheduledItem`]s.
#[derive(Debug, Default)]
pub struct ScheduleQueue {
    items: Mutex<Vec<ScheduledItem>>,
}

impl ScheduleQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ScheduledItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue `item` and return its id.
    pub fn push(&self, item: ScheduledItem) -> ScheduleId {
        let id = item.id;
        tracing::info!(%id, command = %item.command, next_run = %item.next_run, "command scheduled");
        self.lock().push(item);
        id
    }

    /// Remove an item; `false` when it was not queued.
    pub fn cancel(&self, id: ScheduleId) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|item| item.id != id);
        items.len() != before
    }

    /// Queued items ordered by next run.
    #[must_use]
    pub fn pending(&self) -> Vec<ScheduledItem> {
        let mut items = self.lock().clone();
        items.sort_by_key(|item| item.next_run);
        items
    }

    /// Take every item due at `now`, ordered by next run.
    pub fn take_due(&self, now: Timestamp) -> Vec<ScheduledItem> {
        let mut items = self.lock();
        let mut due = Vec::new();
        items.retain_mut(|item| {
            if !item.is_due(now) {
                return true;
            }
            due.push(item.clone());
            match item.following_run() {
                Some(next_run) => {
                    item.next_run = next_run;
                    true
                }
                None => false,
            }
        });
        due.sort_by_key(|item| item.next_run);
        due
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
