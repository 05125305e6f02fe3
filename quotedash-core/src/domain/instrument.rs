use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of instrument the user is looking at.
///
/// The kind only drives defaults and input hints; every kind is fetched the
/// same way, by symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Stock,
    Crypto,
    ForexPair,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 3] = [Self::Stock, Self::Crypto, Self::ForexPair];

    /// Built-in default symbol for this kind.
    pub fn default_symbol(self) -> &'static str {
        match self {
            Self::Stock => "AAPL",
            Self::Crypto => "BTC-USD",
            Self::ForexPair => "EURUSD=X",
        }
    }

    /// Example tickers shown next to the symbol prompt.
    pub fn symbol_hint(self) -> &'static str {
        match self {
            Self::Stock => "e.g., AAPL, TSLA",
            Self::Crypto => "e.g., BTC-USD, ETH-USD",
            Self::ForexPair => "e.g., EURUSD=X, JPY=X",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stock => "stock",
            Self::Crypto => "crypto",
            Self::ForexPair => "forex",
        };
        f.write_str(label)
    }
}

impl FromStr for InstrumentKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" | "equity" => Ok(Self::Stock),
            "crypto" => Ok(Self::Crypto),
            "forex" | "fx" | "forex_pair" => Ok(Self::ForexPair),
            other => Err(RequestError::UnknownKind(other.to_string())),
        }
    }
}

/// A validated request for one instrument's daily history.
///
/// Fields are private so a request with an empty symbol or an inverted date
/// range cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentRequest {
    kind: InstrumentKind,
    symbol: String,
    start: NaiveDate,
    end: NaiveDate,
}

impl InstrumentRequest {
    pub fn new(
        kind: InstrumentKind,
        symbol: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, RequestError> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(RequestError::EmptySymbol);
        }
        if start > end {
            return Err(RequestError::InvertedRange { start, end });
        }
        Ok(Self {
            kind,
            symbol,
            start,
            end,
        })
    }

    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown instrument kind '{0}' (expected stock, crypto or forex)")]
    UnknownKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn symbol_is_trimmed() {
        let req =
            InstrumentRequest::new(InstrumentKind::Stock, "  AAPL ", d(2024, 1, 1), d(2024, 6, 1))
                .unwrap();
        assert_eq!(req.symbol(), "AAPL");
    }

    #[test]
    fn blank_symbol_rejected() {
        let err = InstrumentRequest::new(InstrumentKind::Crypto, "   ", d(2024, 1, 1), d(2024, 6, 1))
            .unwrap_err();
        assert_eq!(err, RequestError::EmptySymbol);
    }

    #[test]
    fn inverted_range_rejected() {
        let err =
            InstrumentRequest::new(InstrumentKind::Stock, "SPY", d(2024, 6, 2), d(2024, 6, 1))
                .unwrap_err();
        assert!(matches!(err, RequestError::InvertedRange { .. }));
    }

    #[test]
    fn same_day_range_allowed() {
        assert!(
            InstrumentRequest::new(InstrumentKind::Stock, "SPY", d(2024, 6, 1), d(2024, 6, 1))
                .is_ok()
        );
    }

    #[test]
    fn kind_parses_aliases() {
        assert_eq!("Stock".parse::<InstrumentKind>(), Ok(InstrumentKind::Stock));
        assert_eq!("fx".parse::<InstrumentKind>(), Ok(InstrumentKind::ForexPair));
        assert_eq!("CRYPTO".parse::<InstrumentKind>(), Ok(InstrumentKind::Crypto));
        assert!("bond".parse::<InstrumentKind>().is_err());
    }

    #[test]
    fn default_symbols_per_kind() {
        assert_eq!(InstrumentKind::Stock.default_symbol(), "AAPL");
        assert_eq!(InstrumentKind::Crypto.default_symbol(), "BTC-USD");
        assert_eq!(InstrumentKind::ForexPair.default_symbol(), "EURUSD=X");
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in InstrumentKind::ALL {
            assert_eq!(kind.to_string().parse::<InstrumentKind>(), Ok(kind));
        }
    }
}
