//! Forward price models extending the trajectories past the last observation.
//!
//! These are illustrative heuristics, not forecasts.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::warn;

use crate::domain::calendar::add_months;
use crate::simulator::PathSimulator;
use crate::{PricePoint, ProjectionSegment, UtcDateTime};

const CONSERVATIVE_ANNUAL_GROWTH: f64 = 1.10;
const HALVING_CYCLE_YEARS: f64 = 4.0;
const INTRA_CYCLE_GROWTH: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionModel {
    /// 10% annual drift.
    #[default]
    Conservative,
    /// Doubling per 4-year halving cycle plus 15%/year drift inside the cycle.
    Planb,
    /// Price frozen at the last observation.
    Flat,
}

impl ProjectionModel {
    pub const ALL: [Self; 3] = [Self::Conservative, Self::Planb, Self::Flat];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Planb => "planb",
            Self::Flat => "flat",
        }
    }

    /// Exact (case-insensitive) identifier match.
    pub fn parse(id: &str) -> Option<Self> {
        let normalized = id.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|model| model.as_str() == normalized)
    }

    /// Unknown identifiers fall back to [`ProjectionModel::Conservative`].
    pub fn from_id(id: &str) -> Self {
        Self::parse(id).unwrap_or_else(|| {
            warn!(model = %id, "unknown projection model, using conservative");
            Self::Conservative
        })
    }

    /// Projected price `years_from_now` after an observed `price`.
    pub fn price(self, price: f64, years_from_now: f64) -> f64 {
        match self {
            Self::Conservative => price * CONSERVATIVE_ANNUAL_GROWTH.powf(years_from_now),
            Self::Planb => {
                let halvings = (years_from_now / HALVING_CYCLE_YEARS).floor();
                let within_cycle = years_from_now.rem_euclid(HALVING_CYCLE_YEARS);
                price * 2f64.powf(halvings) * (1.0 + INTRA_CYCLE_GROWTH * within_cycle)
            }
            Self::Flat => price,
        }
    }
}

impl Display for ProjectionModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monthly extension from one month after the last observation through `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projector {
    pub model: ProjectionModel,
    pub until: Date,
}

impl Projector {
    pub fn new(model: ProjectionModel, until: Date) -> Self {
        Self { model, until }
    }

    /// Holding keeps the initial quantity; yield keeps compounding from the
    /// simulator's original anchor across the observed/projected boundary.
    pub fn project(&self, last: &PricePoint, simulator: &PathSimulator) -> ProjectionSegment {
        let today = last.date();
        let mut holding = Vec::new();
        let mut yield_path = Vec::new();

        for months in 1u32.. {
            let Some(date) = add_months(today, months) else {
                break;
            };
            if date > self.until {
                break;
            }

            let ts = UtcDateTime::at_midnight(date);
            let point = PricePoint {
                ts,
                price: self.model.price(last.price, ts.years_since(last.ts)),
            };
            holding.push(simulator.holding_point(&point));
            yield_path.push(simulator.yield_point(&point));
        }

        ProjectionSegment {
            model: self.model,
            today,
            until: self.until,
            holding,
            yield_path,
        }
    }
}
