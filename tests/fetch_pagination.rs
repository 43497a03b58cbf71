//! Behavior-driven tests for paginated price retrieval
//!
//! These tests verify HOW the fetcher walks the provider backwards in pages,
//! merges overlapping pages and reacts to failing or short histories.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use time::macros::date;
use time::Date;
use yieldgap_core::{
    CryptoCompareAdapter, HttpClient, HttpError, HttpRequest, HttpResponse, PriceFetcher,
    PriceSeries, ProviderConfig, ProviderErrorKind, RetryConfig, SyntheticProvider, UtcDateTime,
    SECONDS_PER_DAY,
};

const ORIGIN: Date = date!(2010 - 07 - 17);

fn history(days: usize) -> PriceSeries {
    let prices: Vec<f64> = (0..days).map(|day| 100.0 + day as f64).collect();
    PriceSeries::daily(ORIGIN, &prices).expect("series")
}

fn day(offset: i64) -> Date {
    ORIGIN + time::Duration::days(offset)
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn when_range_exceeds_one_page_fetcher_walks_back_until_start() {
    // Given: 5000 days of history and the default page size of 2000
    let provider = SyntheticProvider::new(history(5_000));

    // When: The whole range is fetched
    let series = PriceFetcher::default()
        .fetch(&provider, day(0), day(4_999))
        .await
        .expect("fetch succeeds");

    // Then: Three pages cover it and overlap is merged away
    assert_eq!(provider.pages_served(), 3);
    assert_eq!(series.len(), 5_000);
    for pair in series.points().windows(2) {
        assert_eq!(
            pair[1].ts.unix_timestamp() - pair[0].ts.unix_timestamp(),
            SECONDS_PER_DAY,
            "series must be strictly increasing without duplicates"
        );
    }
    assert_eq!(series.first().map(|p| p.date()), Some(day(0)));
    assert_eq!(series.last().map(|p| p.date()), Some(day(4_999)));
}

#[tokio::test]
async fn when_page_size_is_small_the_result_is_unchanged() {
    // Given: The same history served through two page sizes
    let coarse = SyntheticProvider::new(history(1_200));
    let fine = SyntheticProvider::new(history(1_200));

    // When: Both are fetched
    let a = PriceFetcher::default()
        .fetch(&coarse, day(0), day(1_199))
        .await
        .expect("coarse fetch");
    let b = PriceFetcher::new(100)
        .fetch(&fine, day(0), day(1_199))
        .await
        .expect("fine fetch");

    // Then: Only the number of pages differs
    assert_eq!(a, b);
    assert_eq!(coarse.pages_served(), 1);
    assert_eq!(fine.pages_served(), 12);
}

#[tokio::test]
async fn when_range_is_inside_history_points_outside_are_dropped() {
    let provider = SyntheticProvider::new(history(1_000));

    let series = PriceFetcher::default()
        .fetch(&provider, day(100), day(200))
        .await
        .expect("fetch succeeds");

    assert_eq!(series.len(), 101);
    assert_eq!(series.first().map(|p| p.date()), Some(day(100)));
    assert_eq!(series.last().map(|p| p.price), Some(300.0));
}

#[tokio::test]
async fn when_history_starts_late_fetch_stops_on_empty_page() {
    // Given: Prices exist only from day 3000 onwards
    let late: Vec<_> = history(5_000).into_points().into_iter().skip(3_000).collect();
    let provider = SyntheticProvider::new(PriceSeries::new(late));

    // When: The range asks for day 0 onwards
    let series = PriceFetcher::default()
        .fetch(&provider, day(0), day(4_999))
        .await
        .expect("partial history is still a result");

    // Then: The empty second page ends the walk
    assert_eq!(provider.pages_served(), 2);
    assert_eq!(series.len(), 2_000);
    assert_eq!(series.first().map(|p| p.date()), Some(day(3_000)));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn when_any_page_fails_the_whole_fetch_fails() {
    // Given: A provider that fails on its second page
    let provider = SyntheticProvider::new(history(5_000)).failing_on_page(1);

    // When: A multi-page range is fetched
    let error = PriceFetcher::default()
        .fetch(&provider, day(0), day(4_999))
        .await
        .expect_err("must fail");

    // Then: No partial series comes back
    assert_eq!(error.kind(), ProviderErrorKind::Upstream);
    assert_eq!(provider.pages_served(), 2);
}

#[tokio::test]
async fn when_provider_has_no_prices_fetch_reports_no_data() {
    let provider = SyntheticProvider::new(PriceSeries::default());

    let error = PriceFetcher::default()
        .fetch(&provider, day(0), day(30))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), ProviderErrorKind::NoData);
}

// =============================================================================
// Remote adapter end to end
// =============================================================================

/// Serves `histoday` bodies computed from the `toTs` and `limit` query
/// parameters, optionally failing the first request with a status.
#[derive(Debug)]
struct HistodayServer {
    first_day_ts: i64,
    fail_first_with: Option<u16>,
    requests: Mutex<Vec<String>>,
}

impl HistodayServer {
    fn new(first_day: Date) -> Self {
        Self {
            first_day_ts: UtcDateTime::at_midnight(first_day).unix_timestamp(),
            fail_first_with: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn query_param(url: &str, key: &str) -> i64 {
        url.split(['?', '&'])
            .find_map(|pair| pair.strip_prefix(&format!("{key}=")))
            .and_then(|value| value.parse().ok())
            .expect("query parameter present")
    }

    fn body(&self, to_ts: i64, limit: i64) -> String {
        let rows: Vec<String> = (0..=limit)
            .map(|back| to_ts - (limit - back) * SECONDS_PER_DAY)
            .filter(|ts| *ts >= self.first_day_ts)
            .map(|ts| format!(r#"{{"time":{ts},"close":{}}}"#, 1_000.0 + (ts / SECONDS_PER_DAY) as f64))
            .collect();
        format!(
            r#"{{"Response":"Success","Message":"","Data":{{"Data":[{}]}}}}"#,
            rows.join(",")
        )
    }
}

impl HttpClient for HistodayServer {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let mut requests = self.requests.lock().expect("request log");
        requests.push(request.url.clone());
        let response = match (requests.len(), self.fail_first_with) {
            (1, Some(status)) => HttpResponse::with_status(status, "busy"),
            _ => HttpResponse::ok_json(self.body(
                Self::query_param(&request.url, "toTs"),
                Self::query_param(&request.url, "limit"),
            )),
        };
        Box::pin(async move { Ok(response) })
    }
}

fn adapter(server: Arc<HistodayServer>) -> CryptoCompareAdapter {
    let config = ProviderConfig {
        base_url: String::from("https://histoday.test"),
        retry: RetryConfig::fixed(Duration::from_millis(1), 2),
        ..ProviderConfig::default()
    };
    CryptoCompareAdapter::with_http_client(server, config)
}

#[tokio::test]
async fn when_remote_pages_overlap_adapter_and_fetcher_merge_them() {
    // Given: A remote history starting at the origin
    let server = Arc::new(HistodayServer::new(day(0)));
    let adapter = adapter(server.clone());

    // When: 2500 days are fetched through the remote adapter
    let series = PriceFetcher::default()
        .fetch(&adapter, day(0), day(2_499))
        .await
        .expect("fetch succeeds");

    // Then: Two requests anchored 2000 days apart produce one clean series
    let requests = server.requests.lock().expect("request log").clone();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].contains("limit=2000"));
    assert!(requests[1].contains("limit=500"));
    assert_eq!(series.len(), 2_500);
}

#[tokio::test]
async fn when_first_response_is_transient_the_page_is_retried() {
    let server = Arc::new(HistodayServer {
        fail_first_with: Some(503),
        ..HistodayServer::new(day(0))
    });
    let adapter = adapter(server.clone());

    let series = PriceFetcher::default()
        .fetch(&adapter, day(0), day(99))
        .await
        .expect("retry recovers");

    assert_eq!(server.requests.lock().expect("request log").len(), 2);
    assert_eq!(series.len(), 100);
}
