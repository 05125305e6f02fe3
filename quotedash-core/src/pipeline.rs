//! Market series pipeline: fetch → validate → annotate → summarize.
//!
//! Each run is independent. Nothing is cached between runs and the provider
//! is called exactly once per `fetch`.

use crate::data::{validate_bars, MarketDataProvider};
use crate::domain::{InstrumentRequest, MovingAverages, PriceSeries, SeriesSummary};
use crate::indicators::{Indicator, Sma};
use thiserror::Error;

/// Window of the short moving average.
pub const MA_SHORT: usize = 20;
/// Window of the long moving average.
pub const MA_LONG: usize = 50;

/// Message shown whenever a request produced no bars.
pub const NO_DATA_MESSAGE: &str = "No data found for given ticker. Please try again.";

#[derive(Debug, Error)]
pub enum FetchError {
    /// The source failed or returned something unusable. Not retried.
    #[error("could not fetch data for {symbol}: {message}")]
    Unreachable { symbol: String, message: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("series for {symbol} has no bars")]
    EmptySeries { symbol: String },
}

impl SummaryError {
    pub fn user_message(&self) -> &'static str {
        NO_DATA_MESSAGE
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The fetch succeeded but returned zero bars.
    #[error("no data for {symbol}")]
    NoData { symbol: String },
}

impl From<SummaryError> for PipelineError {
    fn from(err: SummaryError) -> Self {
        match err {
            SummaryError::EmptySeries { symbol } => PipelineError::NoData { symbol },
        }
    }
}

impl PipelineError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, PipelineError::NoData { .. })
    }

    /// Text for the person who submitted the request.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::NoData { .. } => NO_DATA_MESSAGE.to_string(),
            PipelineError::Fetch(FetchError::Unreachable { message, .. }) => {
                format!("Error fetching data: {message}")
            }
        }
    }
}

/// Attach `ma20` and `ma50` columns to a series.
///
/// The result shares the input's bars; the input itself is left as it was.
/// Existing columns are recomputed from the closes, so this is idempotent.
pub fn annotate(series: &PriceSeries) -> PriceSeries {
    let bars = series.bars();
    series.with_averages(MovingAverages {
        ma20: Sma::new(MA_SHORT).compute(bars),
        ma50: Sma::new(MA_LONG).compute(bars),
    })
}

/// Headline numbers from the last bar.
///
/// Works on raw or annotated series. A raw series gets the same values
/// `annotate` would put on its last bar.
pub fn summarize(series: &PriceSeries) -> Result<SeriesSummary, SummaryError> {
    let last = series.last().ok_or_else(|| SummaryError::EmptySeries {
        symbol: series.symbol().to_string(),
    })?;

    let (latest_ma20, latest_ma50) = if series.is_annotated() {
        (last.ma20, last.ma50)
    } else {
        (
            Sma::new(MA_SHORT).latest(series.bars()),
            Sma::new(MA_LONG).latest(series.bars()),
        )
    };

    Ok(SeriesSummary {
        symbol: series.symbol().to_string(),
        latest_date: last.bar.date,
        latest_close: last.bar.close,
        latest_ma20,
        latest_ma50,
    })
}

/// Drives a provider through the fetch/annotate/summarize steps.
pub struct MarketSeriesPipeline<P> {
    provider: P,
}

impl<P: MarketDataProvider> MarketSeriesPipeline<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch the raw daily series for a request.
    ///
    /// Zero bars is a valid, empty series. Provider failures and malformed
    /// bars both surface as `FetchError::Unreachable`.
    pub fn fetch(&self, request: &InstrumentRequest) -> Result<PriceSeries, FetchError> {
        let symbol = request.symbol();
        log::debug!(
            "fetching {symbol} ({}) {}..{} from {}",
            request.kind(),
            request.start(),
            request.end(),
            self.provider.name()
        );

        let bars = self
            .provider
            .daily_bars(symbol, request.start(), request.end())
            .map_err(|e| FetchError::Unreachable {
                symbol: symbol.to_string(),
                message: e.to_string(),
            })?;

        validate_bars(&bars).map_err(|e| FetchError::Unreachable {
            symbol: symbol.to_string(),
            message: format!("malformed response: {e}"),
        })?;

        log::info!("fetched {} bar(s) for {symbol}", bars.len());
        Ok(PriceSeries::new(symbol, bars))
    }

    /// Fetch, annotate and summarize in one call.
    ///
    /// Either both the annotated series and its summary come back, or a
    /// single error does.
    pub fn run(
        &self,
        request: &InstrumentRequest,
    ) -> Result<(PriceSeries, SeriesSummary), PipelineError> {
        let raw = self.fetch(request)?;
        if raw.is_empty() {
            log::warn!("no bars for {} in the requested range", request.symbol());
            return Err(PipelineError::NoData {
                symbol: request.symbol().to_string(),
            });
        }

        let series = annotate(&raw);
        let summary = summarize(&series)?;
        Ok((series, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StaticProvider;
    use crate::domain::{InstrumentKind, PriceBar};
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new("TEST", make_bars(closes))
    }

    fn request() -> InstrumentRequest {
        InstrumentRequest::new(
            InstrumentKind::Stock,
            "TEST",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn annotate_leaves_input_untouched() {
        let raw = series(&[1.0; 30]);
        let annotated = annotate(&raw);
        assert!(!raw.is_annotated());
        assert!(annotated.shares_bars_with(&raw));
        assert_eq!(annotated.ma20().unwrap().len(), 30);
    }

    #[test]
    fn summarize_empty_is_error() {
        let err = summarize(&PriceSeries::new("X", Vec::new())).unwrap_err();
        assert_eq!(err, SummaryError::EmptySeries { symbol: "X".into() });
        assert_eq!(err.user_message(), NO_DATA_MESSAGE);
    }

    #[test]
    fn summarize_raw_equals_annotated_on_long_volatile_series() {
        let closes: Vec<f64> = (0..2_000)
            .map(|i| {
                let x = i as f64;
                1e4 * (1.0 + (x * 0.37).sin()) + 1e-3 * (x * 1.3).cos() + 0.01
            })
            .collect();
        let raw = series(&closes);
        assert_eq!(summarize(&raw).unwrap(), summarize(&annotate(&raw)).unwrap());
    }

    #[test]
    fn summarize_raw_matches_annotated() {
        let closes: Vec<f64> = (0..55).map(|i| 100.0 + i as f64).collect();
        let raw = series(&closes);
        let from_raw = summarize(&raw).unwrap();
        let from_annotated = summarize(&annotate(&raw)).unwrap();
        assert_approx(
            from_raw.latest_ma20.unwrap(),
            from_annotated.latest_ma20.unwrap(),
            1e-9,
        );
        assert_approx(
            from_raw.latest_ma50.unwrap(),
            from_annotated.latest_ma50.unwrap(),
            1e-9,
        );
        // mean(135..=154) = 144.5
        assert_approx(from_annotated.latest_ma20.unwrap(), 144.5, DEFAULT_EPSILON);
    }

    #[test]
    fn summary_error_converts_to_no_data() {
        let err: PipelineError = SummaryError::EmptySeries { symbol: "X".into() }.into();
        assert!(err.is_no_data());
        assert_eq!(err.user_message(), NO_DATA_MESSAGE);
    }

    #[test]
    fn fetch_rejects_unordered_bars() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0]);
        bars.swap(0, 2);
        let pipeline = MarketSeriesPipeline::new(StaticProvider::new(bars));
        let err = pipeline.fetch(&request()).unwrap_err();
        let FetchError::Unreachable { message, .. } = err;
        assert!(message.starts_with("malformed response"));
    }

    #[test]
    fn fetch_empty_is_ok() {
        let pipeline = MarketSeriesPipeline::new(StaticProvider::empty());
        let series = pipeline.fetch(&request()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.symbol(), "TEST");
    }

    #[test]
    fn run_fails_with_message_for_unreachable() {
        let pipeline = MarketSeriesPipeline::new(StaticProvider::failing("timed out"));
        let err = pipeline.run(&request()).unwrap_err();
        assert!(!err.is_no_data());
        assert_eq!(err.user_message(), "Error fetching data: network unreachable: timed out");
    }

    #[test]
    fn run_accepts_borrowed_provider() {
        let provider = StaticProvider::new(vec![PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            1.0,
            1.0,
            1.0,
            1.0,
        )]);
        let pipeline = MarketSeriesPipeline::new(&provider);
        let (_, summary) = pipeline.run(&request()).unwrap();
        assert_eq!(summary.latest_close, 1.0);
        assert_eq!(provider.calls(), 1);
    }
}
