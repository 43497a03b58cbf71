//! Price provider adapters.

pub mod cryptocompare;
pub mod synthetic;

pub use cryptocompare::CryptoCompareAdapter;
pub use synthetic::SyntheticProvider;
