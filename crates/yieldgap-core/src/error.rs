use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Input and contract errors raised before any network activity.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be greater than zero, got {value}")]
    NonPositiveValue { field: &'static str, value: f64 },
    #[error("field '{field}' must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("end date {end} must be after start date {start}")]
    EndNotAfterStart { start: String, end: String },
    #[error("projection end date {until} must be after historical end date {end}")]
    ProjectionNotAfterEnd { end: String, until: String },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix timestamp {value} is out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("page size must be between 1 and {max}, got {value}")]
    InvalidPageSize { value: usize, max: usize },
    #[error("share parameter '{field}' is not a number: '{value}'")]
    InvalidShareParam { field: &'static str, value: String },
}

/// Classification of price provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Transport,
    Status,
    Upstream,
    Malformed,
    NoData,
}

/// Failure while fetching a price series. Any page failure aborts the whole fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind: ProviderErrorKind::Transport,
            message: message.into(),
            retryable,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            kind: ProviderErrorKind::Status,
            message: format!("price provider returned status {status}"),
            retryable: matches!(status, 408 | 429 | 500..=599),
        }
    }

    /// Error envelope reported by the provider itself (`Response: "Error"`).
    pub fn upstream(message: Option<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Upstream,
            message: message
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| String::from("price provider reported an error")),
            retryable: false,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::NoData,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Transport => "provider.transport",
            ProviderErrorKind::Status => "provider.status",
            ProviderErrorKind::Upstream => "provider.upstream",
            ProviderErrorKind::Malformed => "provider.malformed",
            ProviderErrorKind::NoData => "provider.no_data",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Share card rendering failures. Recovered locally by the logo fallback chain.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load logo asset '{path}': {source}")]
    AssetLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("logo asset '{path}' has an unsupported extension")]
    UnsupportedAsset { path: String },
    #[error("no logo source in the fallback chain could be loaded")]
    LogoChainExhausted,
}

/// Top-level error type for a calculation run.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
