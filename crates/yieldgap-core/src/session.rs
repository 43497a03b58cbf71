//! Stateful calculator holding the result of the last successful run.

use tracing::{info, instrument, warn};

use crate::assembler::{Assembler, CalculationRequest};
use crate::fetcher::PriceFetcher;
use crate::provider::PriceProvider;
use crate::{CoreError, SimulationResult};

/// Runs are independent; each one replaces the previous result wholesale.
/// A failed run leaves the previous result untouched.
pub struct Calculator<P> {
    provider: P,
    fetcher: PriceFetcher,
    assembler: Assembler,
    current: Option<SimulationResult>,
}

impl<P: PriceProvider> Calculator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            fetcher: PriceFetcher::default(),
            assembler: Assembler::default(),
            current: None,
        }
    }

    pub fn with_fetcher(mut self, fetcher: PriceFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_assembler(mut self, assembler: Assembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn current(&self) -> Option<&SimulationResult> {
        self.current.as_ref()
    }

    /// Drops the retained result.
    pub fn reset(&mut self) {
        self.current = None;
    }

    #[instrument(skip_all, fields(provider = self.provider.name(), start = %request.start, end = %request.end))]
    pub async fn run(&mut self, request: &CalculationRequest) -> Result<&SimulationResult, CoreError> {
        request.validate()?;
        info!(
            quantity = request.initial_quantity,
            rate = request.annual_rate,
            projection = request.projection.is_some(),
            "starting calculation"
        );

        let raw = match self
            .fetcher
            .fetch(&self.provider, request.start, request.end)
            .await
        {
            Ok(series) => series,
            Err(error) => {
                warn!(%error, "price fetch failed, keeping previous result");
                return Err(error.into());
            }
        };

        let result = self.assembler.assemble(&raw, request)?;
        info!(
            points = result.holding.len(),
            peaks = result.peaks.events.len(),
            missed_usd = result.summary.total_missed_usd,
            "calculation finished"
        );
        Ok(self.current.insert(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SyntheticProvider;
    use crate::PriceSeries;
    use time::macros::date;

    fn provider() -> SyntheticProvider {
        SyntheticProvider::new(
            PriceSeries::daily(date!(2020 - 01 - 01), &vec![100.0; 800]).expect("series"),
        )
    }

    #[tokio::test]
    async fn successful_run_is_retained_until_reset() {
        let mut calculator = Calculator::new(provider());
        let request =
            CalculationRequest::new(date!(2020 - 01 - 01), date!(2021 - 01 - 01), 1.0, 0.05);

        calculator.run(&request).await.expect("run");
        assert!(calculator.current().is_some());

        calculator.reset();
        assert!(calculator.current().is_none());
    }

    #[tokio::test]
    async fn invalid_request_leaves_previous_result() {
        let mut calculator = Calculator::new(provider());
        let good = CalculationRequest::new(date!(2020 - 01 - 01), date!(2021 - 01 - 01), 1.0, 0.05);
        let before = calculator.run(&good).await.expect("run").clone();

        let bad = CalculationRequest {
            initial_quantity: -3.0,
            ..good
        };
        let error = calculator.run(&bad).await.expect_err("must fail");

        assert!(matches!(error, CoreError::Validation(_)));
        assert_eq!(calculator.current(), Some(&before));
    }
}
