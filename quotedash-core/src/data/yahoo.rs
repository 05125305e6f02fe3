//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API with a blocking client.
//! One request per call: no retries, no backoff.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{MarketDataProvider, ProviderError};
use crate::config::ProviderConfig;
use crate::domain::PriceBar;
use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds, as of the time of the request.
    gmtoffset: Option<i64>,
    /// IANA zone of the exchange, e.g. "America/New_York".
    #[serde(rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
}

/// Maps bar timestamps to the exchange's calendar date.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ExchangeClock {
    Zone(Tz),
    /// Current offset in seconds; wrong across a daylight-saving change.
    Fixed(i64),
}

impl ExchangeClock {
    fn from_meta(symbol: &str, meta: Option<&ChartMeta>) -> Self {
        let zone = meta.and_then(|m| m.exchange_timezone_name.as_deref());
        if let Some(name) = zone {
            match name.parse::<Tz>() {
                Ok(tz) => return Self::Zone(tz),
                Err(_) => log::debug!("{symbol}: unknown exchange timezone {name:?}"),
            }
        }
        Self::Fixed(meta.and_then(|m| m.gmtoffset).unwrap_or(0))
    }

    fn trading_date(&self, ts: i64) -> Option<NaiveDate> {
        match self {
            Self::Zone(tz) => Some(DateTime::from_timestamp(ts, 0)?.with_timezone(tz).date_naive()),
            Self::Fixed(secs) => {
                Some(DateTime::from_timestamp(ts.checked_add(*secs)?, 0)?.date_naive())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ProviderError::ClientBuild(format!("invalid base_url '{}': {e}", config.base_url))
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Build the chart API URL for a symbol and date range.
    ///
    /// Both bounds are midnight UTC, so `end` itself is excluded.
    fn chart_url(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Url, ProviderError> {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::ClientBuild("base_url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");
        Ok(url)
    }

    /// Parse a chart API body into bars.
    pub(crate) fn parse_body(symbol: &str, body: &str) -> Result<Vec<PriceBar>, ProviderError> {
        let chart: ChartResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::ResponseFormatChanged(format!(
                "failed to parse response for {symbol}: {e}"
            ))
        })?;
        Self::parse_response(symbol, chart)
    }

    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, ProviderError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (Some(result), _) => result,
            (None, Some(err)) if err.code == "Not Found" => {
                log::warn!("{symbol}: provider does not know this symbol ({})", err.description);
                return Ok(Vec::new());
            }
            (None, Some(err)) => {
                return Err(ProviderError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => {
                return Err(ProviderError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("result array is empty".into()))?;

        // Yahoo omits timestamps entirely when the range holds no sessions.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("no quote data".into()))?;

        let clock = ExchangeClock::from_meta(symbol, data.meta.as_ref());
        let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
        let mut skipped = 0usize;

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = clock.trading_date(ts).ok_or_else(|| {
                ProviderError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
            })?;

            let (Some(open), Some(high), Some(low), Some(close)) = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
            ) else {
                // Holidays and the in-progress session come back as nulls
                skipped += 1;
                continue;
            };

            let bar = PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume: quote.volume.get(i).copied().flatten(),
            };

            // A live session can repeat the last date; the later row wins.
            match bars.last_mut() {
                Some(prev) if prev.date == date => *prev = bar,
                _ => bars.push(bar),
            }
        }

        if skipped > 0 {
            log::warn!("{symbol}: skipped {skipped} row(s) with missing prices");
        }

        Ok(bars)
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let url = self.chart_url(symbol, start, end)?;
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        // Unknown symbols come back as 404 with a JSON "Not Found" body
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        match Self::parse_body(symbol, &body) {
            Err(ProviderError::ResponseFormatChanged(_)) if status == StatusCode::NOT_FOUND => {
                Err(ProviderError::HttpStatus {
                    status: status.as_u16(),
                    symbol: symbol.to_string(),
                })
            }
            other => other,
        }
    }
}
