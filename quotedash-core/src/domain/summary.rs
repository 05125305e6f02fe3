use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Headline numbers for a series, taken from its last bar.
///
/// A moving average is `None` when the series is shorter than its window.
/// That is an expected outcome for short histories, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub symbol: String,
    pub latest_date: NaiveDate,
    pub latest_close: f64,
    pub latest_ma20: Option<f64>,
    pub latest_ma50: Option<f64>,
}
