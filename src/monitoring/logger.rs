use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::analytics::types::{PriceRecommendation, SalesForecast, TrendingEvent};

const HEADER: &str = "timestamp,kind,event_id,date,value,lower,upper,detail";

/// Appends engine results to a CSV file for offline review
pub struct CsvLogger {
    log_path: PathBuf,
}

impl CsvLogger {
    pub fn new<P: AsRef<Path>>(log_path: P) -> Result<Self> {
        let log_path = log_path.as_ref().to_path_buf();

        // Create CSV file with headers if it doesn't exist
        if !log_path.exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)
                .with_context(|| format!("Failed to create CSV log: {}", log_path.display()))?;

            writeln!(file, "{}", HEADER)?;
        }

        Ok(Self { log_path })
    }

    /// One row per forecast day
    pub fn log_forecast(&self, forecast: &SalesForecast, at: DateTime<Utc>) -> Result<()> {
        let mut file = self.open()?;
        let model = format!("{:?}", forecast.model).to_lowercase();

        for point in &forecast.points {
            writeln!(
                file,
                "{},forecast,{},{},{:.4},{:.4},{:.4},{}",
                at.to_rfc3339(),
                escape(&forecast.event_id),
                point.date,
                point.predicted_sales,
                point.lower_bound,
                point.upper_bound,
                model
            )?;
        }

        Ok(())
    }

    /// One row per ranked event, detail is the rank
    pub fn log_trending(&self, ranked: &[TrendingEvent], at: DateTime<Utc>) -> Result<()> {
        let mut file = self.open()?;

        for (rank, entry) in ranked.iter().enumerate() {
            writeln!(
                file,
                "{},trending,{},{},{:.4},,,{}",
                at.to_rfc3339(),
                escape(&entry.event.event_id),
                entry.event.date,
                entry.trend_score,
                rank + 1
            )?;
        }

        Ok(())
    }

    /// `value` is the recommendation, `lower` the current price, `upper` the elasticity
    pub fn log_price(&self, recommendation: &PriceRecommendation, at: DateTime<Utc>) -> Result<()> {
        let mut file = self.open()?;

        let elasticity = match recommendation.elasticity {
            Some(e) => format!("{:.4}", e),
            None => "".to_string(),
        };

        writeln!(
            file,
            "{},price,{},,{:.2},{:.2},{},{:?}",
            at.to_rfc3339(),
            escape(&recommendation.event_id),
            recommendation.recommended_price,
            recommendation.current_price,
            elasticity,
            recommendation.basis
        )?;

        Ok(())
    }

    fn open(&self) -> Result<std::fs::File> {
        OpenOptions::new()
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open CSV log: {}", self.log_path.display()))
    }
}

/// Quote a field containing a separator or quote
fn escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
