//! # Yieldgap Core
//!
//! Compares holding a fixed BTC quantity against compounding it at an annual
//! yield, over real daily price history and optionally a modelled future.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Price providers (CryptoCompare, synthetic) |
//! | [`assembler`] | Request validation, peak selection, result assembly |
//! | [`ath`] | Sustained multi-peak detection |
//! | [`config`] | Provider configuration and environment lookup |
//! | [`domain`] | Domain models and date helpers |
//! | [`error`] | Core error types |
//! | [`fetcher`] | Backward-anchored paginated retrieval |
//! | [`http_client`] | HTTP client abstraction |
//! | [`projection`] | Forward price models |
//! | [`provider`] | Provider trait and page types |
//! | [`retry`] | Retry with backoff for transient failures |
//! | [`sampler`] | Monthly down-sampling |
//! | [`session`] | Stateful calculator |
//! | [`share`] | Share links, share page and summary card |
//! | [`simulator`] | Holding and yield trajectories |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use yieldgap_core::{CalculationRequest, Calculator, CryptoCompareAdapter, ProviderConfig};
//! use time::macros::date;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = CryptoCompareAdapter::new(ProviderConfig::from_env());
//!     let mut calculator = Calculator::new(adapter);
//!
//!     let request = CalculationRequest::new(date!(2020 - 01 - 01), date!(2024 - 01 - 01), 1.0, 0.05);
//!     let result = calculator.run(&request).await?;
//!     println!("missed: ${:.0}", result.summary.total_missed_usd);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! PriceProvider ──▶ PriceFetcher ──▶ raw daily series ──┬──▶ AthDetector ──┐
//!                                                       │                 │
//!                                    sample_monthly ◀───┘                 ▼
//!                                         │                         PeakSelection
//!                                         ▼                               │
//!                                   PathSimulator ──▶ Projector ──▶ SimulationResult
//! ```
//!
//! ## Security
//!
//! - The API key is read from the environment only and never logged
//! - All HTTP requests use TLS via rustls

pub mod adapters;
pub mod assembler;
pub mod ath;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod projection;
pub mod provider;
pub mod retry;
pub mod sampler;
pub mod session;
pub mod share;
pub mod simulator;

// Adapter implementations
pub use adapters::{CryptoCompareAdapter, SyntheticProvider};

// Assembly
pub use assembler::{Assembler, CalculationRequest, PeakStrategy, ProjectionRequest};
pub use ath::AthDetector;
pub use session::Calculator;

// Configuration
pub use config::ProviderConfig;

// Domain models
pub use domain::{
    AthEvent, PeakSelection, PeakSelectionKind, PricePoint, PriceSeries, ProjectionSegment,
    SimulationResult, Summary, TrajectoryPoint, UtcDateTime, SECONDS_PER_DAY, SECONDS_PER_YEAR,
};

// Error types
pub use error::{CoreError, ProviderError, ProviderErrorKind, RenderError, ValidationError};

// Retrieval
pub use fetcher::PriceFetcher;
pub use provider::{PageRequest, PricePage, PriceProvider, MAX_PAGE_SIZE};

// HTTP client types
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Retry logic
pub use retry::{Backoff, RetryConfig};

pub use projection::{ProjectionModel, Projector};
pub use sampler::sample_monthly;
pub use simulator::PathSimulator;
