//! quotedash core: daily price series for one instrument, with moving averages
//! and a headline summary.
//!
//! - Domain types (bars, series, summary, instrument requests)
//! - Market data providers (Yahoo Finance, fixed in-memory)
//! - Simple moving average indicator
//! - The fetch → annotate → summarize pipeline
//! - TOML configuration
//!
//! Rendering is left to the caller: the pipeline hands back a `PriceSeries`
//! and a `SeriesSummary` and does nothing else.

pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod pipeline;

pub use config::{ConfigError, DashboardConfig};
pub use data::{MarketDataProvider, ProviderError, StaticProvider, YahooProvider};
pub use domain::{InstrumentKind, InstrumentRequest, PriceBar, PriceSeries, SeriesSummary};
pub use pipeline::{
    annotate, summarize, FetchError, MarketSeriesPipeline, PipelineError, SummaryError,
};
