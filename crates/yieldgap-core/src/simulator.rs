//! Holding versus compounding trajectories over a price series.

use crate::{AthEvent, PricePoint, PriceSeries, TrajectoryPoint, UtcDateTime};

/// Quantity after compounding `rate` per year for the fractional years between
/// `anchor` and `at`. An `at` before `anchor` gives a quantity at or below `initial`.
pub fn compounded_quantity(initial: f64, rate: f64, anchor: UtcDateTime, at: UtcDateTime) -> f64 {
    initial * (1.0 + rate).powf(at.years_since(anchor))
}

/// Parameters shared by every point of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSimulator {
    pub initial_quantity: f64,
    pub annual_rate: f64,
    pub anchor: UtcDateTime,
}

/// Both trajectories on a shared date axis, plus the running-maximum candidate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectories {
    pub holding: Vec<TrajectoryPoint>,
    pub yield_path: Vec<TrajectoryPoint>,
    /// Last point that set a new price maximum; fallback peak only.
    pub global_peak: Option<AthEvent>,
}

impl PathSimulator {
    pub fn new(initial_quantity: f64, annual_rate: f64, anchor: UtcDateTime) -> Self {
        Self {
            initial_quantity,
            annual_rate,
            anchor,
        }
    }

    pub fn holding_point(&self, point: &PricePoint) -> TrajectoryPoint {
        TrajectoryPoint {
            date: point.date(),
            quantity: self.initial_quantity,
            value_usd: self.initial_quantity * point.price,
            price: point.price,
        }
    }

    pub fn yield_point(&self, point: &PricePoint) -> TrajectoryPoint {
        let quantity =
            compounded_quantity(self.initial_quantity, self.annual_rate, self.anchor, point.ts);
        TrajectoryPoint {
            date: point.date(),
            quantity,
            value_usd: quantity * point.price,
            price: point.price,
        }
    }

    pub fn event_at(&self, point: &PricePoint) -> AthEvent {
        AthEvent::from_points(&self.holding_point(point), &self.yield_point(point))
    }

    pub fn run(&self, series: &PriceSeries) -> Trajectories {
        let mut trajectories = Trajectories {
            holding: Vec::with_capacity(series.len()),
            yield_path: Vec::with_capacity(series.len()),
            global_peak: None,
        };
        let mut max_price = 0.0;

        for point in series {
            let holding = self.holding_point(point);
            let yielding = self.yield_point(point);

            if point.price > max_price {
                max_price = point.price;
                trajectories.global_peak = Some(AthEvent::from_points(&holding, &yielding));
            }

            trajectories.holding.push(holding);
            trajectories.yield_path.push(yielding);
        }

        trajectories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn anchor() -> UtcDateTime {
        UtcDateTime::at_midnight(date!(2020 - 01 - 01))
    }

    #[test]
    fn zero_rate_yield_equals_holding() {
        let series =
            PriceSeries::daily(date!(2020 - 01 - 01), &[100.0, 250.0, 90.0]).expect("series");
        let run = PathSimulator::new(2.5, 0.0, anchor()).run(&series);
        assert_eq!(run.holding, run.yield_path);
    }

    #[test]
    fn yield_quantity_strictly_increases_with_positive_rate() {
        let series = PriceSeries::daily(date!(2020 - 01 - 01), &[10.0; 40]).expect("series");
        let run = PathSimulator::new(1.0, 0.07, anchor()).run(&series);

        assert_eq!(run.yield_path[0].quantity, 1.0);
        for pair in run.yield_path.windows(2) {
            assert!(pair[1].quantity > pair[0].quantity);
        }
        assert!(run.holding.iter().all(|p| p.quantity == 1.0));
    }

    #[test]
    fn point_before_anchor_does_not_error() {
        let series = PriceSeries::daily(date!(2019 - 01 - 01), &[10.0]).expect("series");
        let run = PathSimulator::new(1.0, 0.05, anchor()).run(&series);
        assert!(run.yield_path[0].quantity < 1.0);
        assert!(run.yield_path[0].quantity > 0.0);
    }

    #[test]
    fn global_peak_tracks_first_time_maximum_is_set() {
        let series = PriceSeries::daily(date!(2020 - 01 - 01), &[5.0, 9.0, 3.0, 9.0, 7.0])
            .expect("series");
        let run = PathSimulator::new(1.0, 0.1, anchor()).run(&series);
        let peak = run.global_peak.expect("peak");
        assert_eq!(peak.date, date!(2020 - 01 - 02));
        assert_eq!(peak.price, 9.0);
        assert!(peak.missed_value_usd > 0.0);
    }

    #[test]
    fn one_year_of_five_percent_compounds_exactly() {
        let later = UtcDateTime::from_unix_timestamp(
            anchor().unix_timestamp() + (365.25 * 86_400.0) as i64,
        )
        .expect("ts");
        let quantity = compounded_quantity(1.0, 0.05, anchor(), later);
        assert!((quantity - 1.05).abs() < 1e-12);
    }
}
