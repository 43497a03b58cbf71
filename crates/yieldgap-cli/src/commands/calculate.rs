use std::time::Instant;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;
use yieldgap_core::share::{ShareConfig, ShareParams};
use yieldgap_core::{
    CalculationRequest, Calculator, CryptoCompareAdapter, PriceFetcher, PriceProvider,
    ProjectionModel, ProviderConfig, RetryConfig, SimulationResult, SyntheticProvider,
};

use crate::cli::{CalculateArgs, Cli};
use crate::error::CliError;
use crate::output::calculation_text;

use super::CommandResult;

/// Share fields attached to a calculation when `--share` is set.
#[derive(Debug, Clone, Serialize)]
pub struct ShareLink {
    pub title: String,
    pub query: String,
    pub url: String,
    pub image_url: String,
}

impl ShareLink {
    fn for_result(result: &SimulationResult, config: &ShareConfig) -> Self {
        let params = ShareParams::from_result(result);
        Self {
            title: params.title(),
            query: params.to_query(),
            url: config.share_url(&params),
            image_url: config.image_url(&params),
        }
    }
}

#[derive(Debug, Serialize)]
struct CalculationData<'a> {
    #[serde(flatten)]
    result: &'a SimulationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    share: Option<&'a ShareLink>,
}

pub fn build_request(args: &CalculateArgs, today: time::Date) -> CalculationRequest {
    let end = args.end.unwrap_or(today);
    let request = CalculationRequest::new(args.start, end, args.btc, args.rate / 100.0);
    match args.project_until {
        Some(until) => request.with_projection(until, ProjectionModel::from_id(&args.model)),
        None => request,
    }
}

pub fn provider_config(cli: &Cli) -> ProviderConfig {
    let mut config = ProviderConfig::from_env();
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    match cli.max_retries {
        Some(0) => config = config.with_retry(RetryConfig::no_retry()),
        Some(max_retries) => config = config.with_retry(RetryConfig::exponential(max_retries)),
        None => {}
    }
    config
}

async fn calculate<P: PriceProvider>(
    provider: P,
    fetcher: PriceFetcher,
    request: &CalculationRequest,
) -> Result<SimulationResult, CliError> {
    let mut calculator = Calculator::new(provider).with_fetcher(fetcher);
    let result = calculator.run(request).await?;
    Ok(result.clone())
}

pub async fn run(args: &CalculateArgs, cli: &Cli) -> Result<CommandResult, CliError> {
    let request = build_request(args, OffsetDateTime::now_utc().date());
    request.validate()?;

    let started = Instant::now();
    let (result, source) = if cli.offline {
        let provider = SyntheticProvider::demo(request.start, request.end)?;
        let source = provider.name();
        (calculate(provider, PriceFetcher::default(), &request).await?, source)
    } else {
        let config = provider_config(cli);
        let fetcher = PriceFetcher::new(config.page_size);
        let provider = CryptoCompareAdapter::new(config);
        let source = provider.name();
        (calculate(provider, fetcher, &request).await?, source)
    };
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(source, latency_ms, "calculate command finished");

    let share = args
        .share
        .then(|| ShareLink::for_result(&result, &ShareConfig::default()));
    let data = serde_json::to_value(CalculationData {
        result: &result,
        share: share.as_ref(),
    })?;
    let text = calculation_text(&result, share.as_ref());

    let mut command_result = CommandResult::ok("calculate", data, text)
        .with_source(source)
        .with_latency(latency_ms);
    if cli.offline {
        command_result =
            command_result.with_warning("offline mode: prices come from a synthetic curve");
    }
    if args.project_until.is_none() && args.model != ProjectionModel::default().as_str() {
        command_result = command_result.with_warning("--model has no effect without --project-until");
    }
    if args.project_until.is_some() && ProjectionModel::parse(&args.model).is_none() {
        command_result = command_result.with_warning(format!(
            "unknown projection model '{}', using {}",
            args.model,
            ProjectionModel::Conservative
        ));
    }
    Ok(command_result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use time::macros::date;

    use crate::cli::Command;

    fn parse(args: &[&str]) -> (Cli, CalculateArgs) {
        let cli = Cli::try_parse_from(args).expect("parses");
        let args = match &cli.command {
            Command::Calculate(args) => args.clone(),
            _ => panic!("expected calculate"),
        };
        (cli, args)
    }

    #[test]
    fn end_defaults_to_today_and_rate_is_percent() {
        let (_, args) = parse(&["yieldgap", "calculate", "--start", "2020-01-01", "--rate", "4"]);
        let request = build_request(&args, date!(2024 - 06 - 01));
        assert_eq!(request.end, date!(2024 - 06 - 01));
        assert!((request.annual_rate - 0.04).abs() < 1e-12);
        assert!(request.projection.is_none());
    }

    #[test]
    fn projection_uses_requested_model() {
        let (_, args) = parse(&[
            "yieldgap",
            "calculate",
            "--start",
            "2020-01-01",
            "--end",
            "2024-01-01",
            "--project-until",
            "2030-01-01",
            "--model",
            "planb",
        ]);
        let request = build_request(&args, date!(2024 - 06 - 01));
        let projection = request.projection.expect("projection");
        assert_eq!(projection.model, ProjectionModel::Planb);
        assert_eq!(projection.until, date!(2030 - 01 - 01));
    }

    #[test]
    fn cli_flags_override_provider_config() {
        let (cli, _) = parse(&[
            "yieldgap",
            "calculate",
            "--start",
            "2020-01-01",
            "--timeout-ms",
            "2500",
            "--max-retries",
            "0",
        ]);
        let config = provider_config(&cli);
        assert_eq!(config.timeout_ms, 2_500);
        assert!(!config.retry.enabled);
    }

    #[tokio::test]
    async fn offline_run_produces_share_link() {
        let (cli, args) = parse(&[
            "yieldgap",
            "calculate",
            "--offline",
            "--start",
            "2019-01-01",
            "--end",
            "2023-01-01",
            "--share",
        ]);

        let result = run(&args, &cli).await.expect("offline run");

        assert_eq!(result.source, Some("synthetic"));
        let share = result.data.get("share").expect("share block");
        assert!(share["url"]
            .as_str()
            .expect("url")
            .starts_with("https://www.btcyieldcalculator.com/api/share?missed="));
        assert!(result.data.get("summary").is_some());
        assert!(result.text.contains("Today"));
    }

    #[tokio::test]
    async fn unknown_model_is_reported_as_warning() {
        let (cli, args) = parse(&[
            "yieldgap",
            "calculate",
            "--offline",
            "--start",
            "2019-01-01",
            "--end",
            "2023-01-01",
            "--project-until",
            "2025-01-01",
            "--model",
            "moon",
        ]);

        let result = run(&args, &cli).await.expect("offline run");

        assert!(result
            .warnings
            .iter()
            .any(|warning| warning == "unknown projection model 'moon', using conservative"));
        assert_eq!(result.data["projection"]["model"], "conservative");
    }
}
