//! Domain types for quotedash

pub mod bar;
pub mod instrument;
pub mod series;
pub mod summary;

pub use bar::PriceBar;
pub use instrument::{InstrumentKind, InstrumentRequest, RequestError};
pub use series::{MovingAverages, PriceSeries, SeriesRow};
pub use summary::SeriesSummary;
