use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::models::{Event, EventId};
use crate::reminder::{NextReminderResolver, Resolution};
use crate::scheduler::{AlarmScheduler, Clock, TimerService};

/// Where events are looked up when a reminder is (re)computed.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, CoreError>;
    async fn event_ids(&self) -> Result<Vec<EventId>, CoreError>;
}

#[async_trait]
impl<S: EventStore + ?Sized> EventStore for Arc<S> {
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, CoreError> {
        (**self).find_event(id).await
    }

    async fn event_ids(&self) -> Result<Vec<EventId>, CoreError> {
        (**self).event_ids().await
    }
}

/// Presents a fired reminder to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &Event, fired_at_millis: i64);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, event: &Event, fired_at_millis: i64) {
        (**self).notify(event, fired_at_millis)
    }
}

/// In-process event store.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<EventId, Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `events`, rejecting duplicate ids.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Result<Self, CoreError> {
        let store = Self::new();
        {
            let mut map = store.write();
            for event in events {
                let id = event.id;
                if map.insert(id, event).is_some() {
                    return Err(CoreError::InvalidInput(format!("Duplicate event id {}", id)));
                }
            }
        }
        Ok(store)
    }

    /// Loads a JSON array of events.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let events: Vec<Event> = serde_json::from_str(&contents)?;
        debug!(path = %path.as_ref().display(), count = events.len(), "loaded events");
        Self::from_events(events)
    }

    /// Inserts or replaces an event, returning the previous version.
    pub fn insert(&self, event: Event) -> Option<Event> {
        self.write().insert(event.id, event)
    }

    pub fn remove(&self, id: EventId) -> Option<Event> {
        self.write().remove(&id)
    }

    pub fn get(&self, id: EventId) -> Option<Event> {
        self.read().get(&id).cloned()
    }

    /// All events ordered by id.
    pub fn all(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self.read().values().cloned().collect();
        events.sort_by_key(|e| e.id);
        events
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<EventId, Event>> {
        self.events.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<EventId, Event>> {
        self.events.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, CoreError> {
        Ok(self.get(id))
    }

    async fn event_ids(&self) -> Result<Vec<EventId>, CoreError> {
        let mut ids: Vec<EventId> = self.read().keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// ReminderService: the receiver side of the one-shot chain.
///
/// Responsibilities:
/// 1. Keep at most one pending wake-up per event
/// 2. On a wake-up, notify and compute the following reminder
/// 3. Absorb scheduling refusals instead of failing the pass
///
/// Callers must serialize edits of one event with its `reschedule` call.
pub struct ReminderService<S, T, C, N> {
    store: S,
    resolver: NextReminderResolver,
    scheduler: AlarmScheduler<T, C>,
    notifier: N,
    /// Fire time, epoch seconds, of the wake-up currently registered per event.
    armed: Mutex<HashMap<EventId, i64>>,
}

impl<S, T, C, N> ReminderService<S, T, C, N>
where
    S: EventStore,
    T: TimerService,
    C: Clock,
    N: Notifier,
{
    pub fn new(
        store: S,
        resolver: NextReminderResolver,
        scheduler: AlarmScheduler<T, C>,
        notifier: N,
    ) -> Self {
        Self {
            store,
            resolver,
            scheduler,
            notifier,
            armed: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces whatever wake-up `event_id` had with one for its next reminder.
    ///
    /// # Returns
    /// * `Ok(Resolution)` - What the resolver decided, even if the timer declined
    /// * `Err(CoreError::NotFound)` - The event does not exist
    pub async fn reschedule(&self, event_id: EventId) -> Result<Resolution, CoreError> {
        self.cancel(event_id);

        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(CoreError::NotFound(event_id))?;

        let resolution = self.resolver.resolve(&event, self.scheduler.clock());
        match resolution {
            Resolution::Due(request) => {
                match self.scheduler.schedule(request) {
                    Ok(true) => {
                        self.armed().insert(event_id, request.fire_at);
                    }
                    Ok(false) => {}
                    Err(declined) => {
                        warn!(event_id, error = %declined, "timer service declined reminder");
                    }
                }
            }
            Resolution::NoReminderDue(reason) => {
                debug!(event_id, %reason, "nothing to schedule");
            }
        }
        Ok(resolution)
    }

    /// Drops the pending wake-up of a deleted or replaced event.
    pub fn cancel(&self, event_id: EventId) -> bool {
        self.armed().remove(&event_id);
        self.scheduler.cancel(event_id)
    }

    /// Handles a wake-up: notify, then schedule the following reminder.
    ///
    /// Returns `Ok(None)` when the event disappeared in the meantime or the
    /// wake-up belongs to a timer that has since been replaced.
    pub async fn handle_fire(&self, event_id: EventId) -> Result<Option<Resolution>, CoreError> {
        let Some(event) = self.store.find_event(event_id).await? else {
            warn!(event_id, "reminder fired for an unknown event");
            self.cancel(event_id);
            return Ok(None);
        };

        let now_millis = self.scheduler.clock().now_millis();
        if !self.is_due(event_id, now_millis) {
            debug!(event_id, now_millis, "ignoring wake-up of a replaced timer");
            return Ok(None);
        }

        info!(event_id, title = %event.title, "reminder fired");
        self.notifier.notify(&event, now_millis);
        self.reschedule(event_id).await.map(Some)
    }

    /// Whether the registered fire time of `event_id` has been reached,
    /// allowing for the resolver's guard window.
    fn is_due(&self, event_id: EventId, now_millis: i64) -> bool {
        let guard_millis = self.resolver.config().guard_seconds.saturating_mul(1000);
        self.armed().get(&event_id).is_some_and(|fire_at| {
            fire_at.saturating_mul(1000) <= now_millis.saturating_add(guard_millis)
        })
    }

    fn armed(&self) -> MutexGuard<'_, HashMap<EventId, i64>> {
        self.armed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reschedules every known event.
    pub async fn schedule_all(&self) -> Result<Vec<(EventId, Resolution)>, CoreError> {
        let ids = self.store.event_ids().await?;
        let mut resolutions = Vec::with_capacity(ids.len());
        for id in ids {
            let resolution = self.reschedule(id).await?;
            resolutions.push((id, resolution));
        }
        Ok(resolutions)
    }

    /// Consumes wake-ups until none are pending or the channel closes.
    /// Returns the number of reminders delivered.
    pub async fn run(&self, fired: &mut mpsc::UnboundedReceiver<EventId>) -> usize {
        let mut delivered = 0;
        while self.pending() > 0 {
            let Some(event_id) = fired.recv().await else {
                break;
            };
            match self.handle_fire(event_id).await {
                Ok(Some(_)) => delivered += 1,
                Ok(None) => {}
                Err(e) => warn!(event_id, error = %e, "failed to handle reminder"),
            }
        }
        delivered
    }

    pub fn pending(&self) -> usize {
        self.scheduler.timer().pending()
    }

    pub fn scheduler(&self) -> &AlarmScheduler<T, C> {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepeatInterval;
    use std::io::Write;

    fn event(id: EventId) -> Event {
        Event {
            id,
            title: format!("event {}", id),
            start_ts: 1_700_000_000,
            repeat_interval: RepeatInterval::Day,
            reminders: vec![10],
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = MemoryEventStore::from_events(vec![event(1), event(1)]);
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_insert_replace_remove() {
        let store = MemoryEventStore::from_events(vec![event(2), event(1)]).unwrap();
        assert_eq!(store.all().iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);

        let mut edited = event(1);
        edited.reminders = vec![30];
        let previous = store.insert(edited).unwrap();
        assert_eq!(previous.reminders, vec![10]);
        assert_eq!(store.get(1).unwrap().reminders, vec![30]);

        assert!(store.remove(2).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 3, "start_ts": 100, "repeat_interval": "week", "reminders": [5]}}]"#
        )
        .unwrap();

        let store = MemoryEventStore::from_json_file(file.path()).unwrap();
        let loaded = store.get(3).unwrap();
        assert_eq!(loaded.repeat_interval, RepeatInterval::Week);
        assert_eq!(loaded.reminders, vec![5]);
    }

    #[test]
    fn test_from_json_file_errors() {
        assert!(matches!(
            MemoryEventStore::from_json_file("/nonexistent/events.json"),
            Err(CoreError::Io(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            MemoryEventStore::from_json_file(file.path()),
            Err(CoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_event_ids_sorted() {
        let store = MemoryEventStore::from_events(vec![event(9), event(4), event(6)]).unwrap();
        assert_eq!(store.event_ids().await.unwrap(), vec![4, 6, 9]);
        assert!(store.find_event(5).await.unwrap().is_none());
    }
}
