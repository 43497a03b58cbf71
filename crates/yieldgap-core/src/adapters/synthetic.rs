use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use time::Date;

use crate::provider::{PageRequest, PricePage, PriceProvider};
use crate::{PriceSeries, ProviderError, ValidationError};

/// Deterministic in-memory provider honouring the backward-anchored paging
/// contract. Like the remote endpoint, a page of `limit` returns up to
/// `limit + 1` points ending at the anchor.
#[derive(Debug)]
pub struct SyntheticProvider {
    series: PriceSeries,
    fail_on_page: Option<usize>,
    pages_served: AtomicUsize,
}

impl SyntheticProvider {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series,
            fail_on_page: None,
            pages_served: AtomicUsize::new(0),
        }
    }

    /// Smooth, deterministic daily curve covering `[start, end]`; used for offline runs.
    pub fn demo(start: Date, end: Date) -> Result<Self, ValidationError> {
        let days = (end - start).whole_days().max(0) as usize + 1;
        let prices: Vec<f64> = (0..days)
            .map(|day| {
                let t = day as f64;
                let trend = 8_000.0 * (1.0 + t / 365.25).powf(1.6);
                let cycle = 1.0 + 0.35 * (t / 1_461.0 * std::f64::consts::TAU).sin();
                let wave = 1.0 + 0.08 * (t / 97.0).sin();
                trend * cycle * wave
            })
            .collect();
        Ok(Self::new(PriceSeries::daily(start, &prices)?))
    }

    /// Fail the `page_index`-th request (0-based) with an upstream error.
    pub fn failing_on_page(mut self, page_index: usize) -> Self {
        self.fail_on_page = Some(page_index);
        self
    }

    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }

    fn serve(&self, req: PageRequest) -> Result<PricePage, ProviderError> {
        let index = self.pages_served.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_page == Some(index) {
            return Err(ProviderError::upstream(Some(format!(
                "synthetic failure on page {index}"
            ))));
        }

        let eligible: Vec<_> = self
            .series
            .iter()
            .filter(|point| point.ts.unix_timestamp() <= req.to_ts)
            .copied()
            .collect();
        let keep = (req.limit + 1).min(eligible.len());
        Ok(PricePage::new(eligible[eligible.len() - keep..].to_vec()))
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn page<'a>(
        &'a self,
        req: PageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PricePage, ProviderError>> + Send + 'a>> {
        let result = self.serve(req);
        Box::pin(async move { result })
    }
}
