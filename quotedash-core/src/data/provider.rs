//! Data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources (Yahoo Finance,
//! a fixed in-memory list) so the pipeline can be driven by either.

use crate::domain::PriceBar;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by a provider.
///
/// The pipeline does not branch on these; they are kept apart for
/// diagnostics and logging.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    HttpStatus { status: u16, symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// A source of daily OHLC bars.
///
/// Implementations return bars ascending by date. An unknown symbol or a range
/// with no trading activity is an empty `Vec`, not an error.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over a date range.
    fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        (**self).daily_bars(symbol, start, end)
    }
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        (**self).daily_bars(symbol, start, end)
    }
}
