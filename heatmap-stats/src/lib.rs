//! # Heatmap Stats
//!
//! Statistical aggregation engine behind the instrument correlation heatmap.
//!
//! Turns per-instrument price [`Series`](series::Series) into a square
//! [`CorrelationMatrix`](correlation::CorrelationMatrix) plus per-instrument
//! [`SeriesSummary`](summary::SeriesSummary) values for tooltips.
//!
//! Everything in this crate is a pure function of its inputs. Callers re-run the
//! computation with a fresh snapshot whenever the instrument selection or timeframe
//! changes; nothing is cached between calls.
//!
//! ## Degenerate Data
//! Short, empty, mismatched or constant series are never errors:
//! - zero-variance pairs correlate as `0`
//! - pairs with fewer than two aligned observations correlate as `NaN`
//! - instruments with fewer than two observations are left out of the matrix
//!
//! Only structurally malformed observations (missing or non-numeric price) produce a
//! [`DataError`](error::DataError).
//!
//! ## Example
//! ```rust
//! use heatmap_stats::{correlation::CorrelationEngine, series::{InstrumentId, Series}};
//! use indexmap::IndexMap;
//!
//! let mut series: IndexMap<InstrumentId, Series> = IndexMap::new();
//! series.insert("AAPL".into(), Series::from_prices("AAPL", [100.0, 101.0, 102.0]).unwrap());
//! series.insert("MSFT".into(), Series::from_prices("MSFT", [50.0, 49.0, 48.0]).unwrap());
//!
//! let matrix = CorrelationEngine::default().compute(&series);
//! assert_eq!(matrix.get("AAPL", "MSFT").unwrap().correlation, -1.0);
//! ```

/// All errors generated in `heatmap-stats`.
pub mod error;

/// Price observations and per-instrument [`Series`](series::Series).
pub mod series;

/// Mean, sample standard deviation, covariance and Pearson normalisation.
pub mod statistic;

/// Pairwise correlation engine and the [`CorrelationMatrix`](correlation::CorrelationMatrix)
/// it produces.
pub mod correlation;

/// Per-instrument mean / standard deviation summaries.
pub mod summary;

pub use correlation::{Alignment, CorrelationCell, CorrelationEngine, CorrelationMatrix};
pub use error::DataError;
pub use series::{InstrumentId, PricePoint, RawPricePoint, Series};
pub use summary::SeriesSummary;
