use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use crate::data::types::{Dataset, Event, Interaction};
use tracing::{info, warn};

pub const EVENTS_FILE: &str = "events.json";
pub const INTERACTIONS_FILE: &str = "interactions.json";

impl Dataset {
    /// Load `events.json` and `interactions.json` from a directory
    pub fn from_json_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let events: Vec<Event> = read_json(&dir.join(EVENTS_FILE))?;
        let interactions: Vec<Interaction> = read_json(&dir.join(INTERACTIONS_FILE))?;

        validate_events(&events)?;

        let known: HashSet<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
        let orphaned = interactions
            .iter()
            .filter(|i| !known.contains(i.event_id.as_str()))
            .count();
        if orphaned > 0 {
            warn!("{} interactions reference unknown events", orphaned);
        }

        info!(
            "Loaded {} events and {} interactions from {}",
            events.len(),
            interactions.len(),
            dir.display()
        );

        Ok(Dataset::new(events, interactions))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse data file: {}", path.display()))
}

/// Event ids must be unique and prices positive
fn validate_events(events: &[Event]) -> Result<()> {
    let mut seen = HashSet::new();

    for event in events {
        if !seen.insert(event.event_id.as_str()) {
            anyhow::bail!("Duplicate event id: {}", event.event_id);
        }
        if !(event.price.is_finite() && event.price > 0.0) {
            anyhow::bail!("Event {} has non-positive price {}", event.event_id, event.price);
        }
    }

    Ok(())
}
