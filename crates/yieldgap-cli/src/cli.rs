//! CLI argument definitions for yieldgap.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `calculate` | Compare holding versus earning yield over a date range |
//! | `share page` | Render the redirecting share page for a share query |
//! | `share card` | Render the 1200x630 SVG summary card |
//! | `models` | List projection models |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `text` | Output format (text, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--offline` | `false` | Use the deterministic synthetic price curve |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//! | `--max-retries` | `3` | Retries per page for transient failures |
//! | `--log-level` | `warn` | Log filter when `YIELDGAP_LOG` is unset |
//!
//! # Examples
//!
//! ```bash
//! yieldgap calculate --start 2020-01-01 --btc 1 --rate 5
//! yieldgap calculate --start 2020-01-01 --project-until 2030-01-01 --model planb --share
//! yieldgap share card --query "missed=12000&btc=1.00" --output card.svg
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use time::Date;
use yieldgap_core::domain::calendar::parse_date;

/// Yieldgap - what holding BTC without yield cost you.
#[derive(Debug, Parser)]
#[command(
    name = "yieldgap",
    author,
    version,
    about = "Compare holding BTC against earning yield on it",
    long_about = "Yieldgap replays daily BTC/USD history and compares simply holding a \
quantity of BTC with compounding it at an annual yield. It reports the gap at \
major price peaks and today, and can extend both paths with a projection model.\n\
\n\
Use 'yieldgap <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, env = "YIELDGAP_FORMAT", default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Use a deterministic synthetic price curve instead of the network.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Per-request timeout in milliseconds. Overrides YIELDGAP_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Retries per page on transient failures. Overrides YIELDGAP_MAX_RETRIES.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Log filter used when YIELDGAP_LOG is not set (e.g. "info", "yieldgap_core=debug").
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Text,
    /// Single JSON object with metadata.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare holding versus earning yield over a date range.
    ///
    /// # Examples
    ///
    ///   yieldgap calculate --start 2020-01-01
    ///   yieldgap calculate --start 2017-06-01 --end 2024-06-01 --btc 0.5 --rate 4
    Calculate(CalculateArgs),

    /// Social sharing artifacts.
    Share(ShareArgs),

    /// List projection models.
    Models,
}

#[derive(Debug, Clone, Args)]
pub struct CalculateArgs {
    /// First day of the comparison (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Date,

    /// Last day of the comparison (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<Date>,

    /// BTC quantity held at the start.
    #[arg(long, default_value_t = 1.0)]
    pub btc: f64,

    /// Annual yield in percent; 5 means 5%.
    #[arg(long, default_value_t = 5.0)]
    pub rate: f64,

    /// Extend both paths with a projection up to this date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    pub project_until: Option<Date>,

    /// Projection model: conservative, planb or flat. Unknown names use conservative.
    #[arg(long, default_value = "conservative")]
    pub model: String,

    /// Include a share link and title in the output.
    #[arg(long, default_value_t = false)]
    pub share: bool,
}

#[derive(Debug, Args)]
pub struct ShareArgs {
    #[command(subcommand)]
    pub command: ShareCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Render the HTML share page for a share query.
    Page(SharePageArgs),

    /// Render the SVG summary card for a share query.
    Card(ShareCardArgs),
}

#[derive(Debug, Args)]
pub struct SharePageArgs {
    /// Share query string, e.g. "missed=1200&btc=1.00&projection=1".
    #[arg(long, default_value = "")]
    pub query: String,

    /// Calculator URL the page redirects to.
    #[arg(long)]
    pub site_url: Option<String>,

    /// Endpoint serving the card image.
    #[arg(long)]
    pub image_endpoint: Option<String>,

    /// Write the page to a file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ShareCardArgs {
    /// Share query string; `generic=1` renders the teaser card.
    #[arg(long, default_value = "")]
    pub query: String,

    /// Render the teaser card without personal figures.
    #[arg(long, default_value_t = false)]
    pub generic: bool,

    /// Logo image (png, jpg or svg) tried before the text wordmark.
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Text wordmark used when no logo image loads.
    #[arg(long)]
    pub wordmark: Option<String>,

    /// Write the SVG to a file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn parse_date_arg(value: &str) -> Result<Date, String> {
    parse_date(value).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn calculate_defaults() {
        let cli = Cli::try_parse_from(["yieldgap", "calculate", "--start", "2020-01-01"])
            .expect("parses");
        let Command::Calculate(args) = cli.command else {
            panic!("expected calculate");
        };
        assert_eq!(args.btc, 1.0);
        assert_eq!(args.rate, 5.0);
        assert!(args.end.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn malformed_date_is_rejected_by_parser() {
        let parsed = Cli::try_parse_from(["yieldgap", "calculate", "--start", "2020-13-01"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "yieldgap",
            "share",
            "card",
            "--generic",
            "--format",
            "json",
            "--offline",
        ])
        .expect("parses");
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.offline);
    }
}
