//! Checks on provider output before it becomes a `PriceSeries`.
//!
//! Providers promise strictly ascending dates and positive prices. A response
//! that breaks either promise is treated as malformed.

use crate::domain::PriceBar;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("bar {index} ({date}) is not after the previous bar ({previous})")]
    OutOfOrder {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },

    #[error("bar {index} ({date}) has a non-positive or non-finite price")]
    BadPrice { index: usize, date: NaiveDate },
}

/// Validate bar ordering and prices, stopping at the first offending bar.
pub fn validate_bars(bars: &[PriceBar]) -> Result<(), ValidationError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.has_positive_prices() {
            return Err(ValidationError::BadPrice {
                index,
                date: bar.date,
            });
        }
        if let Some(prev) = index.checked_sub(1).map(|i| &bars[i]) {
            if bar.date <= prev.date {
                return Err(ValidationError::OutOfOrder {
                    index,
                    date: bar.date,
                    previous: prev.date,
                });
            }
        }
    }
    Ok(())
}
