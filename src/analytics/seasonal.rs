//! Additive seasonal model for daily count series.
//!
//! `y(t) = trend(t) + weekly(weekday(t)) + noise`
//!
//! Only observed days are fitted. The trend is an OLS line over days since
//! the first observation and the weekly component is the centered mean
//! residual per weekday, refined by a short backfitting loop. A daily (period = 1 day) component evaluated on a
//! whole-day grid is a constant, so it folds into the trend intercept.
//! Uncertainty uses the OLS prediction interval, which widens as the target
//! date moves away from the observed window.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use crate::analytics::regression::LinearFit;

const BACKFIT_ROUNDS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct SeasonalSettings {
    pub weekly: bool,
    /// Coverage of the uncertainty interval, e.g. 0.8
    pub interval_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalPrediction {
    pub yhat: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone)]
pub struct SeasonalModel {
    origin: NaiveDate,
    intercept: f64,
    slope: f64,
    weekly: [f64; 7],
    sigma: f64,
    n: f64,
    t_mean: f64,
    ss_tt: f64,
    z: f64,
}

impl SeasonalModel {
    /// Fit on the observed per-date counts. Days with no row are not part
    /// of the series. Returns `None` for an empty series.
    pub fn fit(observations: &BTreeMap<NaiveDate, f64>, settings: &SeasonalSettings) -> Option<Self> {
        let (&origin, _) = observations.iter().next()?;

        let series: Vec<(f64, usize, f64)> = observations
            .iter()
            .map(|(&date, &y)| ((date - origin).num_days() as f64, weekday_index(date), y))
            .collect();

        let n = series.len() as f64;
        let t_mean = series.iter().map(|(t, _, _)| t).sum::<f64>() / n;
        let ss_tt = series.iter().map(|(t, _, _)| (t - t_mean).powi(2)).sum::<f64>();

        // Weekday effects are centered over all seven days, so every weekday needs a row
        let use_weekly = settings.weekly && covers_every_weekday(&series);

        let mut weekly = [0.0; 7];
        let mut trend = fit_trend(&series, &weekly);

        if use_weekly {
            for _ in 0..BACKFIT_ROUNDS {
                weekly = fit_weekly(&series, trend);
                trend = fit_trend(&series, &weekly);
            }
        }

        let (intercept, slope) = trend;
        let residual_ss: f64 = series
            .iter()
            .map(|&(t, dow, y)| (y - (intercept + slope * t + weekly[dow])).powi(2))
            .sum();

        let params = if use_weekly { 8.0 } else { 2.0 };
        let dof = if n > params { n - params } else { n };
        let sigma = (residual_ss / dof).sqrt();

        Some(Self {
            origin,
            intercept,
            slope,
            weekly,
            sigma,
            n,
            t_mean,
            ss_tt,
            z: two_sided_z(settings.interval_width),
        })
    }

    pub fn predict(&self, date: NaiveDate) -> SeasonalPrediction {
        let t = (date - self.origin).num_days() as f64;
        let yhat = self.intercept + self.slope * t + self.weekly[weekday_index(date)];

        let leverage = if self.ss_tt > 0.0 {
            (t - self.t_mean).powi(2) / self.ss_tt
        } else {
            0.0
        };
        let half_width = self.z * self.sigma * (1.0 + 1.0 / self.n + leverage).sqrt();

        SeasonalPrediction {
            yhat,
            lower: yhat - half_width,
            upper: yhat + half_width,
        }
    }

    pub fn weekly_effects(&self) -> [f64; 7] {
        self.weekly
    }

    pub fn trend_slope(&self) -> f64 {
        self.slope
    }
}

fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

fn covers_every_weekday(series: &[(f64, usize, f64)]) -> bool {
    let mut seen = [false; 7];
    for &(_, dow, _) in series {
        seen[dow] = true;
    }
    seen.iter().all(|&s| s)
}

/// OLS trend on the series with the weekly component removed
fn fit_trend(series: &[(f64, usize, f64)], weekly: &[f64; 7]) -> (f64, f64) {
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|&(t, dow, y)| (t, y - weekly[dow]))
        .collect();

    match LinearFit::fit(&points) {
        Some(fit) => (fit.intercept, fit.slope),
        None => {
            // Single day of history: flat at its value
            let mean = points.iter().map(|(_, y)| y).sum::<f64>() / points.len().max(1) as f64;
            (mean, 0.0)
        }
    }
}

/// Mean detrended residual per weekday, centered to sum to zero
fn fit_weekly(series: &[(f64, usize, f64)], (intercept, slope): (f64, f64)) -> [f64; 7] {
    let mut sums = [0.0; 7];
    let mut counts = [0usize; 7];

    for &(t, dow, y) in series {
        sums[dow] += y - (intercept + slope * t);
        counts[dow] += 1;
    }

    let mut effects = [0.0; 7];
    for dow in 0..7 {
        if counts[dow] > 0 {
            effects[dow] = sums[dow] / counts[dow] as f64;
        }
    }

    let center = effects.iter().sum::<f64>() / 7.0;
    effects.iter_mut().for_each(|e| *e -= center);
    effects
}

/// z such that P(-z < Z < z) = width for a standard normal Z
pub fn two_sided_z(width: f64) -> f64 {
    let target = 0.5 + width / 2.0;
    let (mut lo, mut hi) = (0.0_f64, 10.0_f64);

    // normal_cdf is monotone, so bisection converges
    for _ in 0..80 {
        let mid = (lo + hi) / 2.0;
        if normal_cdf(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    (lo + hi) / 2.0
}

/// Standard normal cumulative distribution function
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / f64::sqrt(2.0)))
}

/// Error function approximation (Abramowitz & Stegun 7.1.26)
fn erf(x: f64) -> f64 {
    let a1 =  0.254829592;
    let a2 = -0.284496736;
    let a3 =  1.421413741;
    let a4 = -1.453152027;
    let a5 =  1.061405429;
    let p  =  0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}
