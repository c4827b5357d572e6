use std::collections::HashMap;
use crate::analytics::regression::LinearFit;
use crate::analytics::types::{PriceBasis, PriceRecommendation};
use crate::config::PricingConfig;
use crate::data::types::{Event, Interaction, InteractionType};
use crate::error::{EngineError, EngineResult};
use tracing::{info, warn};

/// Slopes this close to zero cannot be inverted into a price
const ELASTICITY_EPSILON: f64 = 1e-9;

/// Price and purchase volume of one category peer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerDemand {
    pub price: f64,
    pub purchases: usize,
}

pub struct PriceOptimizer {
    config: PricingConfig,
}

/// Pick the pricing rule, in order of preference
///
/// `elasticity` is only present when the log-log regression could run.
pub fn select_price_basis(
    peers_with_data: usize,
    min_regression_peers: usize,
    elasticity: Option<f64>,
    has_target: bool,
) -> PriceBasis {
    if peers_with_data == 0 {
        return PriceBasis::Unchanged;
    }

    match elasticity {
        Some(e) if peers_with_data >= min_regression_peers => {
            if !has_target {
                PriceBasis::ProfitMaximizing
            } else if e.abs() < ELASTICITY_EPSILON {
                PriceBasis::DegenerateElasticity
            } else {
                PriceBasis::TargetAttendance
            }
        }
        _ => PriceBasis::DemandHeuristic,
    }
}

impl PriceOptimizer {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Recommend a price for `event_id` from its category peers' demand
    pub fn optimize_price(
        &self,
        event_id: &str,
        interactions: &[Interaction],
        events: &[Event],
        current_price: Option<f64>,
        target_attendance: Option<f64>,
    ) -> EngineResult<PriceRecommendation> {
        let event = events
            .iter()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| EngineError::EventNotFound(event_id.to_string()))?;

        let current_price = current_price.unwrap_or(event.price);
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(EngineError::invalid(
                "current_price",
                format!("must be a positive number (got {})", current_price),
            ));
        }
        if let Some(target) = target_attendance {
            if !(target.is_finite() && target >= 0.0) {
                return Err(EngineError::invalid(
                    "target_attendance",
                    format!("must be a non-negative number (got {})", target),
                ));
            }
        }

        let peers = peer_demand(&event.category, events, interactions);

        let fit = if peers.len() >= self.config.min_regression_peers {
            fit_demand_curve(&peers)
        } else {
            None
        };
        let elasticity = fit.map(|f| f.slope);

        let basis = select_price_basis(
            peers.len(),
            self.config.min_regression_peers,
            elasticity,
            target_attendance.is_some(),
        );

        info!(
            "Pricing {} ({}): {} peers with purchases, elasticity={:?} -> {:?}",
            event_id, event.category, peers.len(), elasticity, basis
        );

        let recommended_price = match (basis, fit, target_attendance) {
            (PriceBasis::TargetAttendance, Some(fit), Some(target)) => {
                self.target_attendance_price(&fit, target, current_price)
            }
            (PriceBasis::ProfitMaximizing, Some(fit), _) => self.profit_maximizing_price(fit.slope, current_price),
            (PriceBasis::DegenerateElasticity, Some(fit), _) => {
                warn!(
                    "Elasticity for {} is ~0 ({:e}); cannot solve for target attendance, using profit rule",
                    event.category, fit.slope
                );
                self.profit_maximizing_price(fit.slope, current_price)
            }
            (PriceBasis::DemandHeuristic, _, _) => self.demand_heuristic_price(&peers, current_price),
            _ => current_price,
        };

        Ok(PriceRecommendation {
            event_id: event_id.to_string(),
            current_price,
            recommended_price,
            elasticity,
            peers_with_data: peers.len(),
            basis,
        })
    }

    /// Invert log(target + 1) = intercept + e * log(price), clamped near current
    fn target_attendance_price(&self, fit: &LinearFit, target: f64, current_price: f64) -> f64 {
        let log_price = ((target + 1.0).ln() - fit.intercept) / fit.slope;
        let solved = log_price.exp();

        let lower = current_price * (1.0 - self.config.target_clamp);
        let upper = current_price * (1.0 + self.config.target_clamp);
        let clamped = solved.max(lower).min(upper);

        // Rounding must not step outside the band
        let rounded = round_cents(clamped);
        if rounded < lower {
            (lower * 100.0).ceil() / 100.0
        } else if rounded > upper {
            (upper * 100.0).floor() / 100.0
        } else {
            rounded
        }
    }

    /// Constant-elasticity profit rule
    ///
    /// Inelastic or unit-elastic demand (e >= -1) gets a flat raise. Elastic
    /// demand uses the Lerner optimum p = c * e / (1 + e) with the current
    /// price as c, which is always above c for e < -1. The multiplier grows
    /// without bound as e approaches -1, so it is capped at `max_markup`.
    pub fn profit_maximizing_price(&self, elasticity: f64, current_price: f64) -> f64 {
        if elasticity >= -1.0 {
            return round_cents(current_price * (1.0 + self.config.inelastic_raise));
        }

        let markup = elasticity / (1.0 + elasticity);
        if markup > self.config.max_markup {
            warn!(
                "Lerner markup {:.2} at elasticity {:.4} exceeds cap {:.2}; capping",
                markup, elasticity, self.config.max_markup
            );
            return round_cents(current_price * self.config.max_markup);
        }

        round_cents(current_price * markup)
    }

    /// Nudge on mean peer purchase volume when regression is not possible
    fn demand_heuristic_price(&self, peers: &[PeerDemand], current_price: f64) -> f64 {
        let mean = peers.iter().map(|p| p.purchases as f64).sum::<f64>() / peers.len().max(1) as f64;

        if mean < self.config.low_demand_threshold {
            round_cents(current_price * (1.0 - self.config.demand_adjustment))
        } else if mean > self.config.high_demand_threshold {
            round_cents(current_price * (1.0 + self.config.demand_adjustment))
        } else {
            current_price
        }
    }
}

/// Events in `category` that have at least one purchase, with their volume
///
/// Peers without a finite positive price cannot sit on a log-price curve
/// and are skipped.
pub fn peer_demand(category: &str, events: &[Event], interactions: &[Interaction]) -> Vec<PeerDemand> {
    let mut purchases: HashMap<&str, usize> = HashMap::new();
    for interaction in interactions {
        if interaction.interaction_type == InteractionType::Purchase {
            *purchases.entry(interaction.event_id.as_str()).or_insert(0) += 1;
        }
    }

    events
        .iter()
        .filter(|e| e.category == category)
        .filter_map(|e| {
            let count = *purchases.get(e.event_id.as_str())?;
            if !(e.price.is_finite() && e.price > 0.0) {
                warn!("Skipping peer {} with unusable price {}", e.event_id, e.price);
                return None;
            }
            Some(PeerDemand {
                price: e.price,
                purchases: count,
            })
        })
        .collect()
}

/// log(purchases + 1) = intercept + elasticity * log(price)
fn fit_demand_curve(peers: &[PeerDemand]) -> Option<LinearFit> {
    let points: Vec<(f64, f64)> = peers
        .iter()
        .map(|p| (p.price.ln(), (p.purchases as f64 + 1.0).ln()))
        .collect();

    LinearFit::fit(&points)
}

fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn event(id: &str, category: &str, price: f64) -> Event {
        Event {
            event_id: id.to_string(),
            title: String::new(),
            category: category.to_string(),
            location: "Chicago".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            price,
        }
    }

    fn purchases(event_id: &str, n: usize) -> Vec<Interaction> {
        (0..n)
            .map(|i| Interaction {
                user_id: format!("user_{}", i),
                event_id: event_id.to_string(),
                interaction_type: InteractionType::Purchase,
                timestamp: Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap(),
            })
            .collect()
    }

    fn optimizer() -> PriceOptimizer {
        PriceOptimizer::new(PricingConfig::default())
    }

    /// Three Music peers where higher prices sell fewer tickets
    fn elastic_market() -> (Vec<Event>, Vec<Interaction>) {
        let events = vec![
            event("m1", "Music", 20.0),
            event("m2", "Music", 40.0),
            event("m3", "Music", 80.0),
            event("t1", "Tech", 100.0),
        ];
        let mut interactions = purchases("m1", 80);
        interactions.extend(purchases("m2", 20));
        interactions.extend(purchases("m3", 5));
        interactions.extend(purchases("t1", 500));
        (events, interactions)
    }

    #[test]
    fn test_select_price_basis() {
        assert_eq!(select_price_basis(0, 3, None, true), PriceBasis::Unchanged);
        assert_eq!(select_price_basis(2, 3, None, true), PriceBasis::DemandHeuristic);
        assert_eq!(select_price_basis(3, 3, None, false), PriceBasis::DemandHeuristic);
        assert_eq!(select_price_basis(3, 3, Some(-1.5), false), PriceBasis::ProfitMaximizing);
        assert_eq!(select_price_basis(3, 3, Some(-1.5), true), PriceBasis::TargetAttendance);
        assert_eq!(select_price_basis(3, 3, Some(0.0), true), PriceBasis::DegenerateElasticity);
        assert_eq!(select_price_basis(3, 3, Some(0.0), false), PriceBasis::ProfitMaximizing);
    }

    #[test]
    fn test_unknown_event() {
        let (events, interactions) = elastic_market();
        let err = optimizer()
            .optimize_price("nope", &interactions, &events, None, None)
            .unwrap_err();
        assert_eq!(err, EngineError::EventNotFound("nope".to_string()));
    }

    #[test]
    fn test_no_peer_data_keeps_price() {
        let events = vec![event("a1", "Arts", 33.33), event("a2", "Arts", 50.0)];
        let interactions = purchases("other", 10);

        let rec = optimizer().optimize_price("a1", &interactions, &events, None, Some(100.0)).unwrap();

        assert_eq!(rec.basis, PriceBasis::Unchanged);
        assert_eq!(rec.recommended_price, 33.33);
        assert_eq!(rec.elasticity, None);
    }

    #[test]
    fn test_heuristic_tiers_with_two_peers() {
        let events = vec![event("f1", "Food", 40.0), event("f2", "Food", 60.0)];

        // mean 5 -> low demand, -5%
        let mut low = purchases("f1", 4);
        low.extend(purchases("f2", 6));
        let rec = optimizer().optimize_price("f1", &low, &events, None, None).unwrap();
        assert_eq!(rec.basis, PriceBasis::DemandHeuristic);
        assert_eq!(rec.recommended_price, 38.0);

        // mean 30 -> unchanged
        let mut mid = purchases("f1", 20);
        mid.extend(purchases("f2", 40));
        let rec = optimizer().optimize_price("f1", &mid, &events, None, None).unwrap();
        assert_eq!(rec.recommended_price, 40.0);

        // mean 60 -> +5%, regardless of a target
        let mut high = purchases("f1", 60);
        high.extend(purchases("f2", 60));
        let rec = optimizer().optimize_price("f1", &high, &events, None, Some(10.0)).unwrap();
        assert_eq!(rec.recommended_price, 42.0);
    }

    #[test]
    fn test_elasticity_estimate() {
        let (events, interactions) = elastic_market();
        let rec = optimizer().optimize_price("m2", &interactions, &events, None, None).unwrap();

        assert_eq!(rec.peers_with_data, 3);
        let e = rec.elasticity.unwrap();
        assert!(e < -1.0, "expected elastic demand, got {}", e);
        assert_eq!(rec.basis, PriceBasis::ProfitMaximizing);
    }

    #[test]
    fn test_profit_maximizing_rule() {
        let o = optimizer();
        assert_eq!(o.profit_maximizing_price(-0.5, 50.0), 55.0);
        assert_eq!(o.profit_maximizing_price(-1.0, 50.0), 55.0);
        // e = -2: p = c * 2
        assert_eq!(o.profit_maximizing_price(-2.0, 50.0), 100.0);
        // e = -5: p = c * 1.25
        assert_eq!(o.profit_maximizing_price(-5.0, 40.0), 50.0);
    }

    #[test]
    fn test_target_attendance_is_clamped() {
        let (events, interactions) = elastic_market();
        let o = optimizer();

        for target in [0.0, 1.0, 10.0, 50.0, 1000.0, 1e9] {
            let rec = o.optimize_price("m2", &interactions, &events, Some(37.77), Some(target)).unwrap();
            assert_eq!(rec.basis, PriceBasis::TargetAttendance);
            assert!(rec.recommended_price >= 37.77 * 0.7, "{} for target {}", rec.recommended_price, target);
            assert!(rec.recommended_price <= 37.77 * 1.3, "{} for target {}", rec.recommended_price, target);
        }
    }

    #[test]
    fn test_target_attendance_moves_price_the_right_way() {
        let (events, interactions) = elastic_market();
        let o = optimizer();

        let few = o.optimize_price("m2", &interactions, &events, None, Some(15.0)).unwrap();
        let many = o.optimize_price("m2", &interactions, &events, None, Some(25.0)).unwrap();

        // Selling more tickets needs a lower price
        assert!(many.recommended_price < few.recommended_price);
    }

    #[test]
    fn test_zero_elasticity_with_target_falls_back() {
        let events = vec![
            event("s1", "Sports", 30.0),
            event("s2", "Sports", 60.0),
            event("s3", "Sports", 90.0),
        ];
        let mut interactions = purchases("s1", 12);
        interactions.extend(purchases("s2", 12));
        interactions.extend(purchases("s3", 12));

        let rec = optimizer().optimize_price("s2", &interactions, &events, None, Some(100.0)).unwrap();

        assert_eq!(rec.basis, PriceBasis::DegenerateElasticity);
        assert_eq!(rec.recommended_price, 66.0);
    }

    #[test]
    fn test_identical_peer_prices_use_heuristic() {
        let events = vec![
            event("w1", "Workshop", 25.0),
            event("w2", "Workshop", 25.0),
            event("w3", "Workshop", 25.0),
        ];
        let mut interactions = purchases("w1", 2);
        interactions.extend(purchases("w2", 3));
        interactions.extend(purchases("w3", 4));

        let rec = optimizer().optimize_price("w1", &interactions, &events, None, None).unwrap();

        assert_eq!(rec.basis, PriceBasis::DemandHeuristic);
        assert_eq!(rec.recommended_price, 23.75);
    }

    #[test]
    fn test_lerner_markup_is_capped_near_unit_elasticity() {
        let o = optimizer();
        // e = -1.01 would multiply the price by 101
        assert_eq!(o.profit_maximizing_price(-1.01, 50.0), 150.0);
        // e = -1.5 sits exactly on the default cap
        assert_eq!(o.profit_maximizing_price(-1.5, 50.0), 150.0);
    }

    #[test]
    fn test_peers_without_usable_price_are_skipped() {
        let events = vec![
            event("c1", "Conference", 40.0),
            event("c2", "Conference", 60.0),
            event("c3", "Conference", 0.0),
            event("c4", "Conference", f64::NAN),
        ];
        let mut interactions = purchases("c1", 5);
        interactions.extend(purchases("c2", 5));
        interactions.extend(purchases("c3", 5));
        interactions.extend(purchases("c4", 5));

        let peers = peer_demand("Conference", &events, &interactions);
        assert_eq!(peers.len(), 2);

        // Two usable peers with mean 5 -> low-demand heuristic
        let rec = optimizer().optimize_price("c1", &interactions, &events, None, None).unwrap();
        assert_eq!(rec.basis, PriceBasis::DemandHeuristic);
        assert_eq!(rec.peers_with_data, 2);
        assert_eq!(rec.recommended_price, 38.0);
        assert!(rec.elasticity.is_none());
    }

    #[test]
    fn test_invalid_prices() {
        let (events, interactions) = elastic_market();
        let o = optimizer();

        assert!(o.optimize_price("m1", &interactions, &events, Some(0.0), None).is_err());
        assert!(o.optimize_price("m1", &interactions, &events, Some(f64::NAN), None).is_err());
        assert!(o.optimize_price("m1", &interactions, &events, None, Some(-5.0)).is_err());
    }
}
