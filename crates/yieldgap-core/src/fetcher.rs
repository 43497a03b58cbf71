//! Paginated retrieval of a daily price series.
//!
//! The provider pages backwards from an anchor timestamp, so each request
//! depends on the previous one and pages are fetched strictly in sequence.
//! The loop state lives in [`FetchState`]; turning the collected pages into a
//! series is the pure [`normalize`] step.

use time::Date;
use tracing::{debug, info};

use crate::provider::{PageRequest, PricePage, PriceProvider, MAX_PAGE_SIZE};
use crate::{PricePoint, PriceSeries, ProviderError, UtcDateTime, SECONDS_PER_DAY};

/// Accumulator advanced once per page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState {
    /// Days still to cover.
    pub remaining: i64,
    /// Anchor for the next page request.
    pub anchor: i64,
    pub start_ts: i64,
    pub collected: Vec<PricePoint>,
    pub pages: usize,
    exhausted: bool,
}

impl FetchState {
    pub fn new(start_ts: i64, end_ts: i64) -> Self {
        let span = (end_ts - start_ts).max(0);
        let days = (span + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
        Self {
            remaining: days + 1,
            anchor: end_ts,
            start_ts,
            collected: Vec::new(),
            pages: 0,
            exhausted: false,
        }
    }

    /// Next request, or `None` once the span is covered or the provider ran dry.
    pub fn next_request(&self, page_size: usize) -> Option<PageRequest> {
        if self.exhausted || self.remaining <= 0 {
            return None;
        }
        let limit = self.remaining.min(page_size as i64) as usize;
        Some(PageRequest::new(self.anchor, limit))
    }

    /// Fold one page in and step the anchor back by the page size.
    pub fn advance(&mut self, request: PageRequest, page: PricePage) {
        self.pages += 1;

        let reached_start = page
            .oldest_ts()
            .map(|oldest| oldest <= self.start_ts)
            .unwrap_or(false);
        if page.is_empty() || reached_start {
            self.exhausted = true;
        }

        self.collected.extend(page.points);
        self.remaining -= request.limit as i64;
        self.anchor -= request.limit as i64 * SECONDS_PER_DAY;
    }
}

/// Keep points inside `[start_ts, end_ts]`, drop duplicate timestamps, sort ascending.
pub fn normalize(points: Vec<PricePoint>, start_ts: i64, end_ts: i64) -> PriceSeries {
    let in_range = points
        .into_iter()
        .filter(|point| {
            let ts = point.ts.unix_timestamp();
            ts >= start_ts && ts <= end_ts
        })
        .collect();
    PriceSeries::new(in_range)
}

/// Fetches `[start, end]` (UTC midnights) page by page.
#[derive(Debug, Clone, Copy)]
pub struct PriceFetcher {
    page_size: usize,
}

impl Default for PriceFetcher {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PriceFetcher {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Any failing page aborts the fetch; pages already collected are dropped.
    pub async fn fetch(
        &self,
        provider: &dyn PriceProvider,
        start: Date,
        end: Date,
    ) -> Result<PriceSeries, ProviderError> {
        let start_ts = UtcDateTime::at_midnight(start).unix_timestamp();
        let end_ts = UtcDateTime::at_midnight(end).unix_timestamp();

        let mut state = FetchState::new(start_ts, end_ts);
        while let Some(request) = state.next_request(self.page_size) {
            let page = provider.page(request).await?;
            debug!(
                provider = provider.name(),
                page = state.pages,
                to_ts = request.to_ts,
                points = page.points.len(),
                "received price page"
            );
            state.advance(request, page);
        }

        let pages = state.pages;
        let series = normalize(state.collected, start_ts, end_ts);
        if series.is_empty() {
            return Err(ProviderError::no_data(format!(
                "no prices between {start} and {end}"
            )));
        }

        info!(
            provider = provider.name(),
            pages,
            points = series.len(),
            "fetched price series"
        );
        Ok(series)
    }
}
