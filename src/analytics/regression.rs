/// Ordinary least squares fit of `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Fit over paired samples. `None` with fewer than two points, when
    /// every x is identical (slope undefined) or when a sample is not finite.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let n = points.len() as f64;
        let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let mut ss_xy = 0.0;
        let mut ss_xx = 0.0;
        let mut ss_yy = 0.0;

        for &(x, y) in points {
            ss_xy += (x - x_mean) * (y - y_mean);
            ss_xx += (x - x_mean).powi(2);
            ss_yy += (y - y_mean).powi(2);
        }

        if !ss_xx.is_finite() || ss_xx <= f64::EPSILON * n {
            return None;
        }

        let slope = ss_xy / ss_xx;
        let intercept = y_mean - slope * x_mean;
        if !(slope.is_finite() && intercept.is_finite()) {
            return None;
        }

        // A flat series is fitted perfectly by a flat line
        let r_squared = if ss_yy == 0.0 {
            1.0
        } else {
            (ss_xy.powi(2) / (ss_xx * ss_yy)).min(1.0)
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Fit against the ordinal index 0, 1, 2, ... of the series
    pub fn fit_series(values: &[f64]) -> Option<Self> {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();
        Self::fit(&points)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}
