use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use crate::analytics::types::{TrendFilters, TrendScore, TrendingEvent};
use crate::config::TrendingConfig;
use crate::data::types::{Event, Interaction, InteractionType};
use tracing::debug;

const SECONDS_PER_DAY: i64 = 86_400;

pub struct TrendScorer {
    config: TrendingConfig,
}

impl TrendScorer {
    pub fn new(config: TrendingConfig) -> Self {
        Self { config }
    }

    /// Rank events by recency- and intent-weighted interaction volume
    ///
    /// 1. Keep events matching every filter (and only their interactions)
    /// 2. Weight each interaction by exp(-decay * whole days ago)
    /// 3. Multiply by the intent weight of its type
    /// 4. Sum per event, inner-join onto events, sort descending, truncate
    pub fn score_and_rank(
        &self,
        events: &[Event],
        interactions: &[Interaction],
        filters: &TrendFilters,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<TrendingEvent> {
        let candidates: Vec<&Event> = events.iter().filter(|e| filters.matches(e)).collect();

        let allowed: Option<HashSet<&str>> = if filters.is_empty() {
            None
        } else {
            Some(candidates.iter().map(|e| e.event_id.as_str()).collect())
        };

        let scores = self.accumulate_scores(interactions, allowed.as_ref(), now);

        let mut ranked: Vec<TrendingEvent> = candidates
            .into_iter()
            .filter_map(|event| {
                scores.get(event.event_id.as_str()).map(|&trend_score| TrendingEvent {
                    event: event.clone(),
                    trend_score,
                })
            })
            .collect();

        // Stable: equal scores keep input event order
        ranked.sort_by(|a, b| b.trend_score.total_cmp(&a.trend_score));
        ranked.truncate(limit);

        debug!(
            "Ranked {} trending events (filters: {:?}, limit {})",
            ranked.len(),
            filters,
            limit
        );

        ranked
    }

    /// Per-event trend scores, unordered
    pub fn trend_scores(&self, interactions: &[Interaction], now: DateTime<Utc>) -> Vec<TrendScore> {
        self.accumulate_scores(interactions, None, now)
            .into_iter()
            .map(|(event_id, score)| TrendScore {
                event_id: event_id.to_string(),
                score,
            })
            .collect()
    }

    fn accumulate_scores<'a>(
        &self,
        interactions: &'a [Interaction],
        allowed: Option<&HashSet<&str>>,
        now: DateTime<Utc>,
    ) -> HashMap<&'a str, f64> {
        let mut scores: HashMap<&str, f64> = HashMap::new();

        for interaction in interactions {
            let event_id = interaction.event_id.as_str();
            if allowed.is_some_and(|ids| !ids.contains(event_id)) {
                continue;
            }

            *scores.entry(event_id).or_insert(0.0) += self.interaction_weight(interaction, now);
        }

        scores
    }

    /// Recency weight times intent weight for a single interaction
    pub fn interaction_weight(&self, interaction: &Interaction, now: DateTime<Utc>) -> f64 {
        let days_ago = days_between(interaction.timestamp, now);
        let recency = (-self.config.decay_rate * days_ago as f64).exp();

        recency * self.intent_weight(interaction.interaction_type)
    }

    pub fn intent_weight(&self, kind: InteractionType) -> f64 {
        match kind {
            InteractionType::View => self.config.view_weight,
            InteractionType::Click => self.config.click_weight,
            InteractionType::Purchase => self.config.purchase_weight,
        }
    }
}

/// Whole days from `then` to `now`, floored
fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_seconds().div_euclid(SECONDS_PER_DAY)
}
