//! PriceSeries: an ordered run of daily bars plus optional derived columns.

use super::bar::PriceBar;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::sync::Arc;

/// Trailing moving-average columns, one value per bar.
///
/// `None` marks warmup positions where the window does not fit yet.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverages {
    pub ma20: Vec<Option<f64>>,
    pub ma50: Vec<Option<f64>>,
}

/// Daily bars for one symbol, ascending by date.
///
/// Bars sit behind an `Arc` so an annotated copy shares them with the raw
/// series it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Arc<[PriceBar]>,
    averages: Option<MovingAverages>,
}

/// One bar together with its derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesRow<'a> {
    #[serde(flatten)]
    pub bar: &'a PriceBar,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: bars.into(),
            averages: None,
        }
    }

    /// New series sharing this one's bars, carrying the given columns.
    ///
    /// Both columns must have one entry per bar.
    pub(crate) fn with_averages(&self, averages: MovingAverages) -> Self {
        debug_assert_eq!(averages.ma20.len(), self.bars.len());
        debug_assert_eq!(averages.ma50.len(), self.bars.len());
        Self {
            symbol: self.symbol.clone(),
            bars: Arc::clone(&self.bars),
            averages: Some(averages),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn is_annotated(&self) -> bool {
        self.averages.is_some()
    }

    /// True when both series point at the same underlying bar storage.
    pub fn shares_bars_with(&self, other: &PriceSeries) -> bool {
        Arc::ptr_eq(&self.bars, &other.bars)
    }

    pub fn ma20(&self) -> Option<&[Option<f64>]> {
        self.averages.as_ref().map(|a| a.ma20.as_slice())
    }

    pub fn ma50(&self) -> Option<&[Option<f64>]> {
        self.averages.as_ref().map(|a| a.ma50.as_slice())
    }

    pub fn row(&self, index: usize) -> Option<SeriesRow<'_>> {
        let bar = self.bars.get(index)?;
        let (ma20, ma50) = match &self.averages {
            Some(a) => (
                a.ma20.get(index).copied().flatten(),
                a.ma50.get(index).copied().flatten(),
            ),
            None => (None, None),
        };
        Some(SeriesRow { bar, ma20, ma50 })
    }

    /// Last row, or `None` for an empty series.
    pub fn last(&self) -> Option<SeriesRow<'_>> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }

    pub fn rows(&self) -> impl DoubleEndedIterator<Item = SeriesRow<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// The last `n` rows in chronological order.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = SeriesRow<'_>> + '_ {
        let start = self.len().saturating_sub(n);
        (start..self.len()).filter_map(move |i| self.row(i))
    }
}

impl Serialize for PriceSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<SeriesRow<'_>> = self.rows().collect();
        let mut state = serializer.serialize_struct("PriceSeries", 2)?;
        state.serialize_field("symbol", &self.symbol)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}
