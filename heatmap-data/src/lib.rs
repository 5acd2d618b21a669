//! Heatmap Data - acquisition and snapshot assembly
//!
//! Fetches instrument catalogs and price series from the stock evaluation API, gathers a
//! selection of instruments while tolerating per-instrument failures, and feeds the
//! successful series into the `heatmap-stats` correlation engine.
//!
//! The library includes:
//! - HTTP client and [`PriceSource`] abstraction
//! - Settle-all gather over a selection
//! - [`HeatmapSnapshot`] assembly for the presentation layer
//! - [`PriceHistory`] for a single instrument

pub mod client;
pub mod config;
pub mod error;
pub mod gather;
pub mod history;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use client::{Catalog, PriceSource, StockClient, Timeframe};
pub use config::{ClientConfig, ConfigError};
pub use error::FetchError;
pub use gather::{FetchFailure, GatherReport, gather_series};
pub use history::PriceHistory;
pub use snapshot::{HeatmapSnapshot, Selection};
