//! Market data acquisition and validation

pub mod fixed;
pub mod provider;
pub mod validate;
pub mod yahoo;

pub use fixed::StaticProvider;
pub use provider::{MarketDataProvider, ProviderError};
pub use validate::{validate_bars, ValidationError};
pub use yahoo::YahooProvider;
