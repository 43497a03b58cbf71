mod calculate;
mod models;
mod share;

pub use calculate::ShareLink;

use serde_json::Value;

use crate::cli::{Cli, Command, ShareCommand};
use crate::error::CliError;

/// Output of one command, rendered by [`crate::output`].
#[derive(Debug)]
pub struct CommandResult {
    pub command: &'static str,
    pub data: Value,
    /// Rendering for `--format text`.
    pub text: String,
    /// Price source used, if the command fetched prices.
    pub source: Option<&'static str>,
    pub latency_ms: u64,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(command: &'static str, data: Value, text: String) -> Self {
        Self {
            command,
            data,
            text,
            source: None,
            latency_ms: 0,
            warnings: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Calculate(args) => calculate::run(args, cli).await,
        Command::Share(args) => match &args.command {
            ShareCommand::Page(page_args) => share::page(page_args),
            ShareCommand::Card(card_args) => share::card(card_args),
        },
        Command::Models => models::run(),
    }
}
