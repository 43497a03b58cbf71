//! Price provider contract.
//!
//! A provider answers one page at a time: at most `limit` daily closes ending
//! at the `to_ts` anchor and running backwards in time. Everything that turns
//! pages into a series lives in [`crate::fetcher`].

use std::future::Future;
use std::pin::Pin;

use crate::{PricePoint, ProviderError};

/// Largest page the provider accepts.
pub const MAX_PAGE_SIZE: usize = 2000;

/// One backward-anchored page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Anchor timestamp in seconds; the newest point returned is at or before it.
    pub to_ts: i64,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(to_ts: i64, limit: usize) -> Self {
        Self {
            to_ts,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// Points returned for one page, in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricePage {
    pub points: Vec<PricePoint>,
}

impl PricePage {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn oldest_ts(&self) -> Option<i64> {
        self.points.iter().map(|point| point.ts.unix_timestamp()).min()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Daily BTC/USD price source.
///
/// Implementations must be `Send + Sync`; a fetch issues pages strictly one
/// after another, so no implementation needs to handle concurrent pages from
/// the same run.
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn page<'a>(
        &'a self,
        req: PageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PricePage, ProviderError>> + Send + 'a>>;
}
