use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use crate::config::SampleConfig;
use crate::data::types::{Dataset, Event, Interaction, InteractionType};
use tracing::info;

pub const CATEGORIES: [&str; 8] = [
    "Music", "Sports", "Arts", "Food", "Tech", "Nightlife", "Workshop", "Conference",
];

pub const CITIES: [&str; 5] = ["New York", "Los Angeles", "Chicago", "Miami", "Seattle"];

const INTERACTION_MIX: [(InteractionType, f64); 3] = [
    (InteractionType::View, 0.6),
    (InteractionType::Click, 0.3),
    (InteractionType::Purchase, 0.1),
];

/// Synthetic demo data. Stands in for a real event store.
pub struct SampleGenerator {
    config: SampleConfig,
    rng: StdRng,
}

impl SampleGenerator {
    pub fn new(config: SampleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self { config, rng }
    }

    pub fn generate(&mut self, now: DateTime<Utc>) -> Dataset {
        let today = now.date_naive();

        let events: Vec<Event> = (1..=self.config.num_events)
            .map(|i| Event {
                event_id: format!("event_{}", i),
                title: format!("Event Title {}", i),
                category: pick(&mut self.rng, &CATEGORIES),
                location: pick(&mut self.rng, &CITIES),
                date: today + Duration::days(self.rng.gen_range(1..90)),
                price: f64::from(self.rng.gen_range(20u32..200)),
            })
            .collect();

        let interactions = if events.is_empty() || self.config.num_users == 0 {
            Vec::new()
        } else {
            self.generate_interactions(&events, now)
        };

        info!(
            "Generated sample dataset: {} users, {} events, {} interactions",
            self.config.num_users,
            events.len(),
            interactions.len()
        );

        Dataset::new(events, interactions)
    }

    fn generate_interactions(&mut self, events: &[Event], now: DateTime<Utc>) -> Vec<Interaction> {
        (0..self.config.num_interactions)
            .map(|_| {
                let user = self.rng.gen_range(1..=self.config.num_users);
                let event = &events[self.rng.gen_range(0..events.len())];
                let days_ago: i64 = self.rng.gen_range(1..30);

                Interaction {
                    user_id: format!("user_{}", user),
                    event_id: event.event_id.clone(),
                    interaction_type: draw_interaction_type(self.rng.gen::<f64>()),
                    timestamp: now - Duration::days(days_ago),
                }
            })
            .collect()
    }
}

/// Map a uniform draw in [0, 1) onto the cumulative interaction mix
fn draw_interaction_type(draw: f64) -> InteractionType {
    let mut cumulative = 0.0;
    for (kind, share) in INTERACTION_MIX {
        cumulative += share;
        if draw < cumulative {
            return kind;
        }
    }
    InteractionType::Purchase
}

fn pick(rng: &mut StdRng, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}
