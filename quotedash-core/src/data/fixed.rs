//! In-memory provider serving a fixed bar list (or a fixed failure).
//!
//! Used by tests and offline runs. Applies the same half-open date window as
//! the Yahoo provider: `start <= date < end`.

use super::provider::{MarketDataProvider, ProviderError};
use crate::domain::PriceBar;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
enum Outcome {
    Bars(Vec<PriceBar>),
    Fail(String),
}

#[derive(Debug)]
pub struct StaticProvider {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self {
            outcome: Outcome::Bars(bars),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A provider whose every call fails with `NetworkUnreachable(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `daily_bars` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn daily_bars(
        &self,
        _symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Bars(bars) => Ok(bars
                .iter()
                .filter(|b| b.date >= start && b.date < end)
                .cloned()
                .collect()),
            Outcome::Fail(message) => Err(ProviderError::NetworkUnreachable(message.clone())),
        }
    }
}
