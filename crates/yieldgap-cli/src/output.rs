//! Rendering of command results to stdout.
//!
//! JSON output wraps the command data in an envelope with run metadata; text
//! output is the command's own human-readable rendering.

use std::fmt::Write as _;
use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use yieldgap_core::domain::calendar::format_short;
use yieldgap_core::share::format_usd;
use yieldgap_core::{PeakSelectionKind, SimulationResult, TrajectoryPoint, UtcDateTime};

use crate::cli::OutputFormat;
use crate::commands::{CommandResult, ShareLink};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct Meta<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    latency_ms: u64,
    generated_at: String,
    #[serde(skip_serializing_if = "no_warnings")]
    warnings: &'a [String],
}

fn no_warnings(warnings: &&[String]) -> bool {
    warnings.is_empty()
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    meta: Meta<'a>,
    data: &'a Value,
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let envelope = Envelope {
                meta: Meta {
                    command: result.command,
                    source: result.source,
                    latency_ms: result.latency_ms,
                    generated_at: UtcDateTime::now().format_rfc3339(),
                    warnings: &result.warnings,
                },
                data: &result.data,
            };
            let rendered = if pretty {
                serde_json::to_string_pretty(&envelope)?
            } else {
                serde_json::to_string(&envelope)?
            };
            writeln!(out, "{rendered}")?;
        }
        OutputFormat::Text => {
            out.write_all(result.text.as_bytes())?;
            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn usd(amount: f64) -> String {
    format!("${}", format_usd(amount.round() as i64))
}

fn position_line(label: &str, point: &TrajectoryPoint) -> String {
    format!(
        "  {label:<8}{:>12.6} BTC  {:>16}",
        point.quantity,
        usd(point.value_usd)
    )
}

pub fn calculation_text(result: &SimulationResult, share: Option<&ShareLink>) -> String {
    let mut text = String::new();
    let summary = &result.summary;

    let _ = writeln!(
        text,
        "{} BTC from {} to {} at {:.2}% a year",
        result.initial_quantity,
        format_short(result.start_date),
        format_short(result.end_date),
        result.annual_rate * 100.0
    );
    let _ = writeln!(text, "Latest price: {}", usd(result.latest_price));
    let _ = writeln!(text);

    let _ = writeln!(text, "Start ({})", format_short(summary.start.date));
    let _ = writeln!(text, "{}", position_line("value", &summary.start));
    let _ = writeln!(text);

    match result.peaks.kind {
        PeakSelectionKind::MultiPeak => {
            let _ = writeln!(text, "{} all-time highs:", result.peaks.events.len());
        }
        PeakSelectionKind::SinglePeak => {
            let _ = writeln!(text, "All-time high:");
        }
        PeakSelectionKind::GlobalFallback => {
            let _ = writeln!(text, "Highest price in range:");
        }
        PeakSelectionKind::None => {
            let _ = writeln!(text, "No price peaks in range.");
        }
    }
    for event in &result.peaks.events {
        let _ = writeln!(
            text,
            "  {:<14}{:>14}  holding {:>14}  yield {:>14}  missed {:>12}",
            format_short(event.date),
            usd(event.price),
            usd(event.holding_value_usd),
            usd(event.yield_value_usd),
            usd(event.missed_value_usd)
        );
    }
    let _ = writeln!(text);

    let heading = match &result.projection {
        Some(segment) => format!(
            "Projected to {} ({} model, observed until {})",
            format_short(segment.until),
            segment.model,
            format_short(segment.today)
        ),
        None => format!("Today ({})", format_short(summary.final_holding.date)),
    };
    let _ = writeln!(text, "{heading}");
    let _ = writeln!(text, "{}", position_line("holding", &summary.final_holding));
    let _ = writeln!(text, "{}", position_line("yield", &summary.final_yield));
    let label = if result.is_projection() {
        "Opportunity"
    } else {
        "Missed"
    };
    let _ = writeln!(text, "  {label}: {}", usd(summary.total_missed_usd));

    if let Some(share) = share {
        let _ = writeln!(text);
        let _ = writeln!(text, "Share: {}", share.title);
        let _ = writeln!(text, "  {}", share.url);
    }

    text
}
