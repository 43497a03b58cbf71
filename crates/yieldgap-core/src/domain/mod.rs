//! # Domain Models
//!
//! Canonical types flowing through a calculation run.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PricePoint`] | One daily close |
//! | [`PriceSeries`] | Sorted, deduplicated closes |
//! | [`TrajectoryPoint`] | Holding or yield position at a date |
//! | [`AthEvent`] | Holding versus yield at a price peak |
//! | [`ProjectionSegment`] | Trajectories past the last observed date |
//! | [`SimulationResult`] | Aggregate handed to renderers |
//! | [`UtcDateTime`] | UTC timestamp |

pub mod calendar;
mod models;
mod timestamp;

pub use models::{
    AthEvent, PeakSelection, PeakSelectionKind, PricePoint, PriceSeries, ProjectionSegment,
    SimulationResult, Summary, TrajectoryPoint,
};
pub(crate) use models::{validate_non_negative, validate_positive};
pub use timestamp::{UtcDateTime, SECONDS_PER_DAY, SECONDS_PER_YEAR};
