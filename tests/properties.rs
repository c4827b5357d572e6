use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use ticket_insights::analytics::types::{ForecastModel, TrendFilters};
use ticket_insights::config::{ForecastConfig, PricingConfig, TrendingConfig};
use ticket_insights::{Event, Interaction, InteractionType, PriceOptimizer, SalesForecaster, TrendScorer};

const CATEGORIES: [&str; 3] = ["Music", "Sports", "Tech"];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 15, 30, 0).unwrap()
}

fn events(prices: &[f64]) -> Vec<Event> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| Event {
            event_id: format!("event_{}", i),
            title: format!("Event {}", i),
            category: CATEGORIES[i % CATEGORIES.len()].to_string(),
            location: "Seattle".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            price,
        })
        .collect()
}

fn interaction_type() -> impl Strategy<Value = InteractionType> {
    prop_oneof![
        Just(InteractionType::View),
        Just(InteractionType::Click),
        Just(InteractionType::Purchase),
    ]
}

/// (event index, type, minutes ago) over a 60-day window
fn interactions(max_event: usize) -> impl Strategy<Value = Vec<Interaction>> {
    prop::collection::vec((0..max_event, interaction_type(), 0i64..60 * 24 * 60), 0..200).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (event, kind, minutes))| Interaction {
                    user_id: format!("user_{}", i % 17),
                    event_id: format!("event_{}", event),
                    interaction_type: kind,
                    timestamp: now() - Duration::minutes(minutes),
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn prop_trend_scores_non_negative(rows in interactions(12)) {
        let scorer = TrendScorer::new(TrendingConfig::default());
        for score in scorer.trend_scores(&rows, now()) {
            prop_assert!(score.score >= 0.0);
        }

        let ranked = scorer.score_and_rank(&events(&[50.0; 12]), &rows, &TrendFilters::default(), 5, now());
        prop_assert!(ranked.len() <= 5);
        prop_assert!(ranked.windows(2).all(|w| w[0].trend_score >= w[1].trend_score));
    }

    #[test]
    fn prop_purchases_outscore_equal_views(ages in prop::collection::vec(0i64..90, 1..30)) {
        let scorer = TrendScorer::new(TrendingConfig::default());
        let build = |event_id: &str, kind: InteractionType| -> Vec<Interaction> {
            ages.iter()
                .map(|&days| Interaction {
                    user_id: "user_1".to_string(),
                    event_id: event_id.to_string(),
                    interaction_type: kind,
                    timestamp: now() - Duration::days(days),
                })
                .collect()
        };

        let mut rows = build("event_0", InteractionType::Purchase);
        rows.extend(build("event_1", InteractionType::View));

        let ranked = scorer.score_and_rank(&events(&[40.0, 40.0]), &rows, &TrendFilters::default(), 10, now());
        prop_assert_eq!(ranked.len(), 2);
        prop_assert_eq!(ranked[0].event.event_id.as_str(), "event_0");
        prop_assert!(ranked[0].trend_score >= ranked[1].trend_score);
    }

    #[test]
    fn prop_forecast_shape(rows in interactions(3), days_ahead in 0i64..90) {
        let forecaster = SalesForecaster::new(ForecastConfig::default());
        let today = now().date_naive();
        let forecast = forecaster.forecast("event_0", &rows, days_ahead, today).unwrap();

        prop_assert_eq!(forecast.points.len() as i64, days_ahead);
        for (i, p) in forecast.points.iter().enumerate() {
            prop_assert_eq!(p.date, today + Duration::days(i as i64 + 1));
            prop_assert!(p.lower_bound >= 0.0);
            prop_assert!(p.lower_bound <= p.predicted_sales);
            prop_assert!(p.predicted_sales <= p.upper_bound);
        }

        let purchases = rows.iter().filter(|r| r.is_purchase_of("event_0")).count();
        prop_assert_eq!(forecast.model == ForecastModel::Seasonal, purchases >= 5);
    }

    #[test]
    fn prop_target_price_within_band(
        rows in interactions(9),
        prices in prop::collection::vec(10.0f64..300.0, 9),
        current in 5.0f64..500.0,
        target in 0.0f64..10_000.0,
    ) {
        let optimizer = PriceOptimizer::new(PricingConfig::default());
        let catalog = events(&prices);
        let rec = optimizer
            .optimize_price("event_0", &rows, &catalog, Some(current), Some(target))
            .unwrap();

        prop_assert!(rec.recommended_price > 0.0);
        if rec.basis == ticket_insights::analytics::types::PriceBasis::TargetAttendance {
            prop_assert!(rec.recommended_price >= current * 0.7);
            prop_assert!(rec.recommended_price <= current * 1.3);
        }
    }

    #[test]
    fn prop_components_are_deterministic(rows in interactions(6)) {
        let catalog = events(&[30.0, 45.0, 60.0, 75.0, 90.0, 105.0]);

        let scorer = TrendScorer::new(TrendingConfig::default());
        let a = scorer.score_and_rank(&catalog, &rows, &TrendFilters::default(), 10, now());
        let b = scorer.score_and_rank(&catalog, &rows, &TrendFilters::default(), 10, now());
        prop_assert_eq!(a, b);

        let forecaster = SalesForecaster::new(ForecastConfig::default());
        let f1 = forecaster.forecast("event_1", &rows, 14, now().date_naive()).unwrap();
        let f2 = forecaster.forecast("event_1", &rows, 14, now().date_naive()).unwrap();
        prop_assert_eq!(f1, f2);

        let optimizer = PriceOptimizer::new(PricingConfig::default());
        let p1 = optimizer.optimize_price("event_2", &rows, &catalog, None, Some(20.0)).unwrap();
        let p2 = optimizer.optimize_price("event_2", &rows, &catalog, None, Some(20.0)).unwrap();
        prop_assert_eq!(p1, p2);
    }
}
