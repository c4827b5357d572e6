use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trending: TrendingConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub sample: SampleConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingConfig {
    /// Per-day exponential decay applied to interaction age
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
    #[serde(default = "default_view_weight")]
    pub view_weight: f64,
    #[serde(default = "default_click_weight")]
    pub click_weight: f64,
    #[serde(default = "default_purchase_weight")]
    pub purchase_weight: f64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Purchases needed before the seasonal model is used
    #[serde(default = "default_min_seasonal_purchases")]
    pub min_seasonal_purchases: usize,
    #[serde(default = "default_days_ahead")]
    pub default_days_ahead: i64,
    #[serde(default = "default_max_days_ahead")]
    pub max_days_ahead: i64,
    /// Relative half-width of the fallback band (0.2 => x0.8 .. x1.2)
    #[serde(default = "default_fallback_band")]
    pub fallback_band: f64,
    /// Coverage of the seasonal model's uncertainty interval
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
    #[serde(default = "default_true")]
    pub weekly_seasonality: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_min_regression_peers")]
    pub min_regression_peers: usize,
    /// Target-attendance prices stay within current * (1 +/- clamp)
    #[serde(default = "default_target_clamp")]
    pub target_clamp: f64,
    #[serde(default = "default_inelastic_raise")]
    pub inelastic_raise: f64,
    /// Upper bound on the elastic-demand price multiplier
    #[serde(default = "default_max_markup")]
    pub max_markup: f64,
    #[serde(default = "default_low_demand")]
    pub low_demand_threshold: f64,
    #[serde(default = "default_high_demand")]
    pub high_demand_threshold: f64,
    #[serde(default = "default_demand_adjustment")]
    pub demand_adjustment: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleConfig {
    #[serde(default = "default_num_users")]
    pub num_users: usize,
    #[serde(default = "default_num_events")]
    pub num_events: usize,
    #[serde(default = "default_num_interactions")]
    pub num_interactions: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub csv_logging: bool,
    #[serde(default = "default_csv_log_path")]
    pub csv_log_path: String,
}

fn default_decay_rate() -> f64 { 0.1 }
fn default_view_weight() -> f64 { 1.0 }
fn default_click_weight() -> f64 { 3.0 }
fn default_purchase_weight() -> f64 { 10.0 }
fn default_limit() -> usize { 10 }
fn default_min_seasonal_purchases() -> usize { 5 }
fn default_days_ahead() -> i64 { 30 }
fn default_max_days_ahead() -> i64 { 365 }
fn default_fallback_band() -> f64 { 0.2 }
fn default_interval_width() -> f64 { 0.8 }
fn default_true() -> bool { true }
fn default_min_regression_peers() -> usize { 3 }
fn default_target_clamp() -> f64 { 0.3 }
fn default_inelastic_raise() -> f64 { 0.10 }
fn default_max_markup() -> f64 { 3.0 }
fn default_low_demand() -> f64 { 10.0 }
fn default_high_demand() -> f64 { 50.0 }
fn default_demand_adjustment() -> f64 { 0.05 }
fn default_num_users() -> usize { 1000 }
fn default_num_events() -> usize { 500 }
fn default_num_interactions() -> usize { 10000 }
fn default_csv_log_path() -> String { "insights.csv".to_string() }

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            decay_rate: default_decay_rate(),
            view_weight: default_view_weight(),
            click_weight: default_click_weight(),
            purchase_weight: default_purchase_weight(),
            default_limit: default_limit(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_seasonal_purchases: default_min_seasonal_purchases(),
            default_days_ahead: default_days_ahead(),
            max_days_ahead: default_max_days_ahead(),
            fallback_band: default_fallback_band(),
            interval_width: default_interval_width(),
            weekly_seasonality: true,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            min_regression_peers: default_min_regression_peers(),
            target_clamp: default_target_clamp(),
            inelastic_raise: default_inelastic_raise(),
            max_markup: default_max_markup(),
            low_demand_threshold: default_low_demand(),
            high_demand_threshold: default_high_demand(),
            demand_adjustment: default_demand_adjustment(),
        }
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            num_users: default_num_users(),
            num_events: default_num_events(),
            num_interactions: default_num_interactions(),
            seed: None,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            csv_logging: false,
            csv_log_path: default_csv_log_path(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub sample_seed: Option<u64>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.trending;
        if !(t.decay_rate >= 0.0) {
            anyhow::bail!("trending.decay_rate must be >= 0 (got {})", t.decay_rate);
        }
        if [t.view_weight, t.click_weight, t.purchase_weight].iter().any(|w| !(*w > 0.0)) {
            anyhow::bail!("trending weights must be positive");
        }

        let f = &self.forecast;
        if f.min_seasonal_purchases == 0 {
            anyhow::bail!("forecast.min_seasonal_purchases must be at least 1");
        }
        if f.default_days_ahead < 0 || f.default_days_ahead > f.max_days_ahead {
            anyhow::bail!(
                "forecast.default_days_ahead must be within 0..={} (got {})",
                f.max_days_ahead,
                f.default_days_ahead
            );
        }
        if !(0.0..1.0).contains(&f.fallback_band) {
            anyhow::bail!("forecast.fallback_band must be in [0, 1) (got {})", f.fallback_band);
        }
        if !(f.interval_width > 0.0 && f.interval_width < 1.0) {
            anyhow::bail!("forecast.interval_width must be in (0, 1) (got {})", f.interval_width);
        }

        let p = &self.pricing;
        if p.min_regression_peers < 2 {
            anyhow::bail!("pricing.min_regression_peers must be at least 2");
        }
        if !(0.0..1.0).contains(&p.target_clamp) {
            anyhow::bail!("pricing.target_clamp must be in [0, 1) (got {})", p.target_clamp);
        }
        if p.low_demand_threshold > p.high_demand_threshold {
            anyhow::bail!(
                "pricing.low_demand_threshold ({}) exceeds high_demand_threshold ({})",
                p.low_demand_threshold,
                p.high_demand_threshold
            );
        }
        if !(0.0..1.0).contains(&p.demand_adjustment) || !(p.inelastic_raise >= 0.0) {
            anyhow::bail!("pricing adjustments must be non-negative fractions");
        }
        if !(p.max_markup > 1.0) {
            anyhow::bail!("pricing.max_markup must be above 1 (got {})", p.max_markup);
        }

        Ok(())
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let sample_seed = match std::env::var("INSIGHTS_SEED") {
            Ok(raw) => Some(
                raw.parse()
                    .with_context(|| format!("INSIGHTS_SEED is not a valid u64: {}", raw))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            config_path: std::env::var("INSIGHTS_CONFIG")
                .unwrap_or_else(|_| "insights.toml".to_string())
                .into(),
            data_dir: std::env::var("INSIGHTS_DATA_DIR").ok().map(PathBuf::from),
            sample_seed,
        })
    }
}
