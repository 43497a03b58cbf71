use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider::{PageRequest, PricePage, PriceProvider};
use crate::retry::execute_with_retry;
use crate::{PricePoint, ProviderError, UtcDateTime};

const FROM_SYMBOL: &str = "BTC";
const TO_SYMBOL: &str = "USD";

/// Daily history adapter for the CryptoCompare `histoday` endpoint.
#[derive(Clone)]
pub struct CryptoCompareAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    config: ProviderConfig,
}

impl CryptoCompareAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: ProviderConfig) -> Self {
        Self {
            http_client,
            auth: HttpAuth::from_key(config.api_key.clone()),
            config,
        }
    }

    fn endpoint(&self, req: PageRequest) -> String {
        format!(
            "{}/data/v2/histoday?fsym={}&tsym={}&limit={}&toTs={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(FROM_SYMBOL),
            urlencoding::encode(TO_SYMBOL),
            req.limit,
            req.to_ts
        )
    }

    async fn fetch_page(&self, req: PageRequest) -> Result<PricePage, ProviderError> {
        let request = HttpRequest::get(self.endpoint(req))
            .with_header("accept", "application/json")
            .with_auth(&self.auth)
            .with_timeout_ms(self.config.timeout_ms);

        debug!(to_ts = req.to_ts, limit = req.limit, "requesting histoday page");

        let response = execute_with_retry(self.http_client.as_ref(), request, &self.config.retry)
            .await
            .map_err(|error| {
                let retryable = self.config.retry.should_retry_error(&error);
                ProviderError::transport(
                    format!("cryptocompare transport error: {}", error.message()),
                    retryable,
                )
            })?;

        if !response.is_success() {
            // The error envelope is sometimes sent with a non-2xx status.
            if let Ok(envelope) = serde_json::from_str::<HistodayResponse>(&response.body) {
                if envelope.is_error() {
                    return Err(ProviderError::upstream(envelope.message));
                }
            }
            return Err(ProviderError::status(response.status));
        }

        parse_histoday(&response.body)
    }
}

impl PriceProvider for CryptoCompareAdapter {
    fn name(&self) -> &'static str {
        "cryptocompare"
    }

    fn page<'a>(
        &'a self,
        req: PageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PricePage, ProviderError>> + Send + 'a>> {
        Box::pin(self.fetch_page(req))
    }
}

#[derive(Debug, Deserialize)]
struct HistodayResponse {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "Data", default)]
    data: Option<serde_json::Value>,
}

impl HistodayResponse {
    fn is_error(&self) -> bool {
        self.response.as_deref() == Some("Error")
    }
}

#[derive(Debug, Deserialize)]
struct HistodayBar {
    time: i64,
    close: Option<f64>,
}

/// Decode one `histoday` body. Zero-price padding rows are skipped.
pub fn parse_histoday(body: &str) -> Result<PricePage, ProviderError> {
    let envelope: HistodayResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::malformed(format!("failed to parse histoday body: {e}")))?;

    if envelope.is_error() {
        return Err(ProviderError::upstream(envelope.message));
    }

    let rows = match envelope.data.as_ref().and_then(|data| data.get("Data")) {
        Some(rows) => Vec::<HistodayBar>::deserialize(rows)
            .map_err(|e| ProviderError::malformed(format!("invalid histoday rows: {e}")))?,
        None => Vec::new(),
    };

    let mut points = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        let Some(close) = row.close.filter(|close| close.is_finite() && *close > 0.0) else {
            skipped += 1;
            continue;
        };
        let ts = UtcDateTime::from_unix_timestamp(row.time)
            .map_err(|e| ProviderError::malformed(e.to_string()))?;
        let point = PricePoint::new(ts, close)
            .map_err(|e| ProviderError::malformed(e.to_string()))?;
        points.push(point);
    }

    if skipped > 0 {
        warn!(skipped, "dropped histoday rows without a positive close");
    }

    Ok(PricePage::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::retry::RetryConfig;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn replying(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn config() -> ProviderConfig {
        ProviderConfig {
            base_url: String::from("https://example.test/"),
            api_key: Some(String::from("key")),
            retry: RetryConfig::no_retry(),
            ..ProviderConfig::default()
        }
    }

    const BODY: &str = r#"{
        "Response": "Success",
        "Message": "",
        "Data": {
            "TimeFrom": 1577836800,
            "TimeTo": 1578009600,
            "Data": [
                {"time": 1577836800, "close": 7200.17, "open": 7194.89},
                {"time": 1577923200, "close": 6985.47, "open": 7200.17},
                {"time": 1578009600, "close": 7344.88, "open": 6985.47}
            ]
        }
    }"#;

    #[test]
    fn parses_rows_into_points() {
        let page = parse_histoday(BODY).expect("valid body");
        assert_eq!(page.points.len(), 3);
        assert_eq!(page.oldest_ts(), Some(1_577_836_800));
        assert!((page.points[2].price - 7344.88).abs() < 1e-9);
    }

    #[test]
    fn error_envelope_carries_provider_message() {
        let body = r#"{"Response":"Error","Message":"toTs param is invalid","Data":{}}"#;
        let error = parse_histoday(body).expect_err("must fail");
        assert_eq!(error.kind(), ProviderErrorKind::Upstream);
        assert_eq!(error.message(), "toTs param is invalid");
    }

    #[test]
    fn zero_close_rows_are_skipped() {
        let body = r#"{"Response":"Success","Data":{"Data":[
            {"time": 1230768000, "close": 0},
            {"time": 1230854400, "close": 0.05}
        ]}}"#;
        let page = parse_histoday(body).expect("valid body");
        assert_eq!(page.points.len(), 1);
    }

    #[test]
    fn garbage_body_is_malformed() {
        let error = parse_histoday("<html>").expect_err("must fail");
        assert_eq!(error.kind(), ProviderErrorKind::Malformed);
    }

    #[tokio::test]
    async fn page_request_carries_anchor_limit_and_key() {
        let client = Arc::new(RecordingHttpClient::replying(Ok(HttpResponse::ok_json(BODY))));
        let adapter = CryptoCompareAdapter::with_http_client(client.clone(), config());

        adapter
            .page(PageRequest::new(1_578_009_600, 3))
            .await
            .expect("page succeeds");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://example.test/data/v2/histoday?fsym=BTC&tsym=USD&limit=3&toTs=1578009600"
        );
        assert_eq!(
            requests[0].headers.get("authorization").map(String::as_str),
            Some("Apikey key")
        );
    }

    #[tokio::test]
    async fn non_success_status_is_provider_error() {
        let client = Arc::new(RecordingHttpClient::replying(Ok(HttpResponse::with_status(
            500, "oops",
        ))));
        let adapter = CryptoCompareAdapter::with_http_client(client, config());

        let error = adapter
            .page(PageRequest::new(1_578_009_600, 3))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), ProviderErrorKind::Status);
    }

    #[tokio::test]
    async fn transport_failure_is_provider_error() {
        let client = Arc::new(RecordingHttpClient::replying(Err(HttpError::timeout(
            "deadline elapsed",
        ))));
        let adapter = CryptoCompareAdapter::with_http_client(client, config());

        let error = adapter
            .page(PageRequest::new(1_578_009_600, 3))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), ProviderErrorKind::Transport);
        assert!(error.message().contains("deadline elapsed"));
    }
}
