//! Combines trajectories, peaks and projection into one [`SimulationResult`].

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::warn;

use crate::ath::AthDetector;
use crate::domain::calendar::format_iso;
use crate::domain::{validate_non_negative, validate_positive};
use crate::projection::{ProjectionModel, Projector};
use crate::sampler::sample_monthly;
use crate::simulator::{PathSimulator, Trajectories};
use crate::{
    CoreError, PeakSelection, PeakSelectionKind, PriceSeries, ProviderError, SimulationResult,
    Summary, UtcDateTime, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub until: Date,
    pub model: ProjectionModel,
}

/// Inputs of one calculation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationRequest {
    pub start: Date,
    pub end: Date,
    pub initial_quantity: f64,
    /// Annual rate as a fraction; `0.05` is 5%.
    pub annual_rate: f64,
    pub projection: Option<ProjectionRequest>,
}

impl CalculationRequest {
    pub fn new(start: Date, end: Date, initial_quantity: f64, annual_rate: f64) -> Self {
        Self {
            start,
            end,
            initial_quantity,
            annual_rate,
            projection: None,
        }
    }

    pub fn with_projection(mut self, until: Date, model: ProjectionModel) -> Self {
        self.projection = Some(ProjectionRequest { until, model });
        self
    }

    /// Checked before any fetch starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_positive("initial_quantity", self.initial_quantity)?;
        validate_non_negative("annual_rate", self.annual_rate)?;

        if self.end <= self.start {
            return Err(ValidationError::EndNotAfterStart {
                start: format_iso(self.start),
                end: format_iso(self.end),
            });
        }

        if let Some(projection) = self.projection {
            if projection.until <= self.end {
                return Err(ValidationError::ProjectionNotAfterEnd {
                    end: format_iso(self.end),
                    until: format_iso(projection.until),
                });
            }
        }

        Ok(())
    }
}

/// One rule for choosing the peaks to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakStrategy {
    /// Sustained, well-separated peaks on the raw series.
    Detector,
    /// Bare maximum of the sampled series.
    GlobalMaximum,
}

/// Tried in order; the first strategy producing events wins.
pub const DEFAULT_PEAK_CHAIN: [PeakStrategy; 2] = [PeakStrategy::Detector, PeakStrategy::GlobalMaximum];

pub struct PeakContext<'a> {
    pub raw: &'a PriceSeries,
    pub simulator: &'a PathSimulator,
    pub trajectories: &'a Trajectories,
    pub detector: &'a AthDetector,
}

impl PeakStrategy {
    pub fn select(self, ctx: &PeakContext<'_>) -> Option<PeakSelection> {
        match self {
            Self::Detector => {
                let points = ctx.raw.points();
                let events: Vec<_> = ctx
                    .detector
                    .detect(ctx.raw)
                    .into_iter()
                    .map(|index| ctx.simulator.event_at(&points[index]))
                    .collect();
                let kind = match events.len() {
                    0 => return None,
                    1 => PeakSelectionKind::SinglePeak,
                    _ => PeakSelectionKind::MultiPeak,
                };
                Some(PeakSelection { kind, events })
            }
            Self::GlobalMaximum => ctx.trajectories.global_peak.map(|event| PeakSelection {
                kind: PeakSelectionKind::GlobalFallback,
                events: vec![event],
            }),
        }
    }
}

pub fn select_peaks(chain: &[PeakStrategy], ctx: &PeakContext<'_>) -> PeakSelection {
    chain
        .iter()
        .find_map(|strategy| strategy.select(ctx))
        .unwrap_or_else(PeakSelection::none)
}

/// Pure computation half of a run: no I/O.
#[derive(Debug, Clone)]
pub struct Assembler {
    pub detector: AthDetector,
    pub peak_chain: Vec<PeakStrategy>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self {
            detector: AthDetector::default(),
            peak_chain: DEFAULT_PEAK_CHAIN.to_vec(),
        }
    }
}

impl Assembler {
    pub fn assemble(
        &self,
        raw: &PriceSeries,
        request: &CalculationRequest,
    ) -> Result<SimulationResult, CoreError> {
        request.validate()?;

        let last = raw
            .last()
            .ok_or_else(|| ProviderError::no_data("price series is empty"))?;

        let simulator = PathSimulator::new(
            request.initial_quantity,
            request.annual_rate,
            UtcDateTime::at_midnight(request.start),
        );
        let sampled = sample_monthly(raw);
        let trajectories = simulator.run(&sampled);

        let peaks = select_peaks(
            &self.peak_chain,
            &PeakContext {
                raw,
                simulator: &simulator,
                trajectories: &trajectories,
                detector: &self.detector,
            },
        );

        // A horizon closer than one month past the last observation yields no
        // projected points; the run is then reported as historical.
        let projection = request
            .projection
            .map(|projection| Projector::new(projection.model, projection.until).project(last, &simulator))
            .filter(|segment| {
                let projected = !segment.holding.is_empty();
                if !projected {
                    warn!(
                        until = %format_iso(segment.until),
                        today = %format_iso(segment.today),
                        "projection horizon is within a month of the last price, ignoring it"
                    );
                }
                projected
            });

        let start = trajectories
            .holding
            .first()
            .copied()
            .unwrap_or_else(|| simulator.holding_point(last));
        let (final_holding, final_yield) = match projection
            .as_ref()
            .and_then(|segment| Some((*segment.holding.last()?, *segment.yield_path.last()?)))
        {
            Some(finals) => finals,
            None => (simulator.holding_point(last), simulator.yield_point(last)),
        };

        let Trajectories {
            holding,
            yield_path,
            ..
        } = trajectories;

        Ok(SimulationResult {
            start_date: request.start,
            end_date: request.end,
            initial_quantity: request.initial_quantity,
            annual_rate: request.annual_rate,
            holding,
            yield_path,
            peaks,
            projection,
            latest_price: last.price,
            summary: Summary {
                start,
                final_holding,
                final_yield,
                total_missed_usd: final_yield.value_usd - final_holding.value_usd,
            },
        })
    }
}
