use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    #[serde(default)]
    pub title: String,
    pub category: String,
    pub location: String,
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    View,
    Click,
    Purchase,
}

impl std::fmt::Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionType::View => write!(f, "view"),
            InteractionType::Click => write!(f, "click"),
            InteractionType::Purchase => write!(f, "purchase"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: String,
    pub event_id: String,
    pub interaction_type: InteractionType,
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    pub fn is_purchase_of(&self, event_id: &str) -> bool {
        self.interaction_type == InteractionType::Purchase && self.event_id == event_id
    }
}

/// The two tables every component reads. Callers own it; the engine only borrows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub events: Vec<Event>,
    pub interactions: Vec<Interaction>,
}

impl Dataset {
    pub fn new(events: Vec<Event>, interactions: Vec<Interaction>) -> Self {
        Self { events, interactions }
    }

    pub fn find_event(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.event_id == event_id)
    }
}
