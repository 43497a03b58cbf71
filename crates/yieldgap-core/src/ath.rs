//! Multi-peak all-time-high detection on the full-resolution series.
//!
//! A candidate index is accepted when it
//!
//! 1. rises well above the average of the preceding window,
//! 2. is followed by a window averaging well below it,
//! 3. holds for a few points instead of spiking for one tick, and
//! 4. is far enough from the previously accepted peak.
//!
//! When more than [`AthDetector::max_peaks`] qualify, the highest survive and
//! are reported in chronological order.

use crate::{PriceSeries, SECONDS_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AthDetector {
    /// Points averaged on each side of a candidate.
    pub window: usize,
    /// Candidate must exceed `avg_before * rise_factor`.
    pub rise_factor: f64,
    /// `avg_after` must be below `price * fall_factor`.
    pub fall_factor: f64,
    /// Points, starting at the candidate, that must stay near its price.
    pub sustain_points: usize,
    pub sustain_tolerance: f64,
    pub min_spacing_days: i64,
    pub max_peaks: usize,
}

impl Default for AthDetector {
    fn default() -> Self {
        Self {
            window: 30,
            rise_factor: 1.15,
            fall_factor: 0.8,
            sustain_points: 3,
            sustain_tolerance: 0.98,
            min_spacing_days: 180,
            max_peaks: 5,
        }
    }
}

impl AthDetector {
    /// Smallest series the detector will scan.
    pub const fn min_points(&self) -> usize {
        2 * self.window + 1
    }

    /// Indices of accepted peaks in chronological order.
    pub fn detect(&self, series: &PriceSeries) -> Vec<usize> {
        let points = series.points();
        if self.window == 0 || points.len() < self.min_points() {
            return Vec::new();
        }

        let prices: Vec<f64> = points.iter().map(|point| point.price).collect();
        let window = self.window as f64;
        let min_spacing = self.min_spacing_days * SECONDS_PER_DAY;

        let mut accepted: Vec<usize> = Vec::new();
        for i in self.window..prices.len() - self.window {
            let price = prices[i];

            let avg_before = prices[i - self.window..i].iter().sum::<f64>() / window;
            let avg_after = prices[i + 1..=i + self.window].iter().sum::<f64>() / window;
            if !(price > avg_before * self.rise_factor && avg_after < price * self.fall_factor) {
                continue;
            }

            let sustain_end = (i + self.sustain_points).min(prices.len());
            let floor = price * self.sustain_tolerance;
            if !prices[i..sustain_end].iter().all(|value| *value >= floor) {
                continue;
            }

            if let Some(&previous) = accepted.last() {
                let gap = points[i].ts.unix_timestamp() - points[previous].ts.unix_timestamp();
                if gap < min_spacing {
                    continue;
                }
            }

            accepted.push(i);
        }

        if accepted.len() > self.max_peaks {
            // Stable sort: equal prices keep the earlier peak.
            accepted.sort_by(|a, b| prices[*b].total_cmp(&prices[*a]));
            accepted.truncate(self.max_peaks);
            accepted.sort_unstable();
        }

        accepted
    }
}
