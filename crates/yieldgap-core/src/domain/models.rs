use serde::{Deserialize, Serialize};
use time::Date;

use super::calendar::iso_date;
use crate::projection::ProjectionModel;
use crate::{UtcDateTime, ValidationError, SECONDS_PER_DAY};

/// One observed daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ts: UtcDateTime,
    pub price: f64,
}

impl PricePoint {
    pub fn new(ts: UtcDateTime, price: f64) -> Result<Self, ValidationError> {
        validate_positive("price", price)?;
        Ok(Self { ts, price })
    }

    pub fn date(&self) -> Date {
        self.ts.date()
    }
}

/// Chronologically ordered price points with unique timestamps.
///
/// Gaps are allowed; there is no guarantee of one point per day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Sort ascending by timestamp and drop repeated timestamps.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|point| point.ts);
        points.dedup_by_key(|point| point.ts);
        Self { points }
    }

    /// One point per day at UTC midnight, starting at `start`.
    pub fn daily(start: Date, prices: &[f64]) -> Result<Self, ValidationError> {
        let origin = UtcDateTime::at_midnight(start).unix_timestamp();
        let points = prices
            .iter()
            .enumerate()
            .map(|(offset, price)| {
                let ts = UtcDateTime::from_unix_timestamp(origin + offset as i64 * SECONDS_PER_DAY)?;
                PricePoint::new(ts, *price)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Position of one trajectory (holding or yield) at a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub quantity: f64,
    pub value_usd: f64,
    pub price: f64,
}

/// Holding versus yield comparison at a price peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AthEvent {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub price: f64,
    pub holding_quantity: f64,
    pub holding_value_usd: f64,
    pub yield_quantity: f64,
    pub yield_value_usd: f64,
    pub missed_value_usd: f64,
}

impl AthEvent {
    pub fn from_points(holding: &TrajectoryPoint, yielding: &TrajectoryPoint) -> Self {
        Self {
            date: holding.date,
            price: holding.price,
            holding_quantity: holding.quantity,
            holding_value_usd: holding.value_usd,
            yield_quantity: yielding.quantity,
            yield_value_usd: yielding.value_usd,
            missed_value_usd: yielding.value_usd - holding.value_usd,
        }
    }
}

/// Which selection rule produced the reported peaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakSelectionKind {
    /// Two or more sustained, well-separated peaks.
    MultiPeak,
    /// Exactly one sustained peak.
    SinglePeak,
    /// Detector found nothing; bare maximum of the sampled series.
    GlobalFallback,
    /// Nothing to report (empty trajectory).
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakSelection {
    pub kind: PeakSelectionKind,
    pub events: Vec<AthEvent>,
}

impl PeakSelection {
    pub fn none() -> Self {
        Self {
            kind: PeakSelectionKind::None,
            events: Vec::new(),
        }
    }
}

/// Trajectories extended past the last observed point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSegment {
    pub model: ProjectionModel,
    /// Last historical date; marks the observed/projected boundary.
    #[serde(with = "iso_date")]
    pub today: Date,
    #[serde(with = "iso_date")]
    pub until: Date,
    pub holding: Vec<TrajectoryPoint>,
    pub yield_path: Vec<TrajectoryPoint>,
}

/// Start and end figures of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub start: TrajectoryPoint,
    pub final_holding: TrajectoryPoint,
    pub final_yield: TrajectoryPoint,
    pub total_missed_usd: f64,
}

/// Everything a renderer needs for one calculation. Built fresh per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
    pub initial_quantity: f64,
    pub annual_rate: f64,
    pub holding: Vec<TrajectoryPoint>,
    pub yield_path: Vec<TrajectoryPoint>,
    pub peaks: PeakSelection,
    pub projection: Option<ProjectionSegment>,
    pub latest_price: f64,
    pub summary: Summary,
}

impl SimulationResult {
    pub fn is_projection(&self) -> bool {
        self.projection.is_some()
    }
}

pub(crate) fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field, value });
    }
    Ok(())
}

pub(crate) fn validate_non_negative(
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn rejects_non_positive_prices() {
        let ts = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp");
        assert!(matches!(
            PricePoint::new(ts, 0.0),
            Err(ValidationError::NonPositiveValue { field: "price", .. })
        ));
        assert!(matches!(
            PricePoint::new(ts, f64::NAN),
            Err(ValidationError::NonFiniteValue { field: "price" })
        ));
    }

    #[test]
    fn series_is_sorted_and_deduplicated() {
        let a = UtcDateTime::from_unix_timestamp(200).expect("ts");
        let b = UtcDateTime::from_unix_timestamp(100).expect("ts");
        let series = PriceSeries::new(vec![
            PricePoint::new(a, 2.0).expect("point"),
            PricePoint::new(b, 1.0).expect("point"),
            PricePoint::new(a, 2.0).expect("point"),
        ]);
        let stamps: Vec<i64> = series.iter().map(|p| p.ts.unix_timestamp()).collect();
        assert_eq!(stamps, vec![100, 200]);
    }

    #[test]
    fn daily_series_steps_one_day() {
        let series = PriceSeries::daily(date!(2020 - 12 - 31), &[1.0, 2.0]).expect("series");
        assert_eq!(series.points()[1].date(), date!(2021 - 01 - 01));
    }

    #[test]
    fn ath_event_reports_missed_value() {
        let holding = TrajectoryPoint {
            date: date!(2021 - 04 - 14),
            quantity: 1.0,
            value_usd: 64_000.0,
            price: 64_000.0,
        };
        let yielding = TrajectoryPoint {
            quantity: 1.1,
            value_usd: 70_400.0,
            ..holding
        };
        let event = AthEvent::from_points(&holding, &yielding);
        assert!((event.missed_value_usd - 6_400.0).abs() < 1e-9);
    }
}
