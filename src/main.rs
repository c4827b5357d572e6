use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use ticket_insights::analytics::types::TrendFilters;
use ticket_insights::api::types::{
    ForecastQuery, ForecastResponse, PriceOptimizationRequest, PriceOptimizationResponse,
    TrendingQuery, TrendingResponse,
};
use ticket_insights::api::{ApiError, Insights};
use ticket_insights::config::{Config, EnvConfig};
use ticket_insights::data::sample::SampleGenerator;
use ticket_insights::monitoring::logger::CsvLogger;
use ticket_insights::Dataset;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ticket-insights", version, about = "Event trend, sales forecast and pricing analytics")]
struct Cli {
    /// Config file (overrides INSIGHTS_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory with events.json and interactions.json (overrides INSIGHTS_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank events by time-decayed interaction volume
    Trending {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Extra exact-match filter, repeatable
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },
    /// Forecast daily ticket sales for one event
    Forecast {
        #[arg(long)]
        event_id: String,
        #[arg(long, allow_negative_numbers = true)]
        days_ahead: Option<i64>,
    },
    /// Recommend a ticket price for one event
    Price {
        #[arg(long)]
        event_id: String,
        #[arg(long)]
        current_price: Option<f64>,
        #[arg(long)]
        target_attendance: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    // Load configuration
    let env_config = EnvConfig::load()?;
    let config_path = cli.config.clone().unwrap_or(env_config.config_path.clone());
    let mut config = Config::load_or_default(&config_path)?;
    if env_config.sample_seed.is_some() {
        config.sample.seed = env_config.sample_seed;
    }

    let now = Utc::now();
    let dataset = match cli.data_dir.clone().or(env_config.data_dir.clone()) {
        Some(dir) => Dataset::from_json_dir(&dir)?,
        None => SampleGenerator::new(config.sample.clone()).generate(now),
    };

    let logger = if config.monitoring.csv_logging {
        tracing::info!("CSV logging to {}", config.monitoring.csv_log_path);
        Some(CsvLogger::new(&config.monitoring.csv_log_path)?)
    } else {
        None
    };

    let insights = Insights::new(&config);
    let command = cli.command;

    // Model fits are CPU-bound; keep them off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        run(&insights, &dataset, command, now, logger.as_ref())
    })
    .await
    .context("Analytics task panicked")?;

    match outcome {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(err) => {
            tracing::error!("Request failed with status {}", err.status);
            println!("{}", serde_json::to_string_pretty(&err.body)?);
            std::process::exit(if err.is_client_error() { 2 } else { 1 });
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(
    insights: &Insights,
    dataset: &Dataset,
    command: Command,
    now: DateTime<Utc>,
    logger: Option<&CsvLogger>,
) -> Result<String, ApiError> {
    match command {
        Command::Trending { limit, category, location, filters } => {
            let extra = parse_filters(&filters)?;
            let query = TrendingQuery {
                limit,
                location: location.or(extra.location),
                category: category.or(extra.category),
            };
            let ranked = insights.trending(dataset, &query, now)?;
            if let Some(logger) = logger {
                report(logger.log_trending(&ranked, now));
            }
            to_json(&TrendingResponse::from(ranked))
        }
        Command::Forecast { event_id, days_ahead } => {
            let query = ForecastQuery {
                event_id: Some(event_id),
                days_ahead,
            };
            let forecast = insights.sales_forecast(dataset, &query, now)?;
            if let Some(logger) = logger {
                report(logger.log_forecast(&forecast, now));
            }
            to_json(&ForecastResponse::from(forecast))
        }
        Command::Price { event_id, current_price, target_attendance } => {
            let request = PriceOptimizationRequest {
                event_id: Some(event_id),
                current_price,
                target_attendance,
            };
            let recommendation = insights.optimize_price(dataset, &request)?;
            if let Some(logger) = logger {
                report(logger.log_price(&recommendation, now));
            }
            to_json(&PriceOptimizationResponse::from(recommendation))
        }
    }
}

fn parse_filters(raw: &[String]) -> Result<TrendFilters, ApiError> {
    let pairs = raw
        .iter()
        .map(|f| f.split_once('=').unwrap_or((f.as_str(), "")));

    Ok(TrendFilters::from_pairs(pairs)?)
}

/// CSV logging never fails a request
fn report(result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!("Failed to write CSV log: {:#}", e);
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::internal(e.to_string()))
}
