use anyhow::{Context, Result};
use chime_core::error::CoreError;
use chime_core::models::{Event, EventId};
use chime_core::service::MemoryEventStore;
use std::path::Path;
use tracing::debug;

use crate::config::Config;

/// Loads events from `path`, or from the configured events file.
pub fn load_events(path: Option<&Path>, config: &Config) -> Result<MemoryEventStore> {
    let path = path.unwrap_or(&config.events_file);
    debug!(path = %path.display(), "loading events");
    MemoryEventStore::from_json_file(path)
        .with_context(|| format!("Failed to load events from '{}'", path.display()))
}

/// Either the single event `id` or every event, ordered by id.
pub fn select_events(store: &MemoryEventStore, id: Option<EventId>) -> Result<Vec<Event>> {
    match id {
        Some(id) => {
            let event = store.get(id).ok_or(CoreError::NotFound(id))?;
            Ok(vec![event])
        }
        None => Ok(store.all()),
    }
}
