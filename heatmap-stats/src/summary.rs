use crate::{
    series::{InstrumentId, Series},
    statistic::{mean, sample_std_dev},
};
use indexmap::IndexMap;
use serde::Serialize;

/// Mean and sample standard deviation over an instrument's full (unaligned) series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub instrument: InstrumentId,
    pub observations: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl SeriesSummary {
    /// Returns `None` for an empty [`Series`].
    pub fn from_series(series: &Series) -> Option<Self> {
        if series.is_empty() {
            return None;
        }

        let prices = series.prices();
        Some(Self {
            instrument: series.instrument().clone(),
            observations: prices.len(),
            mean: mean(&prices),
            std_dev: sample_std_dev(&prices),
        })
    }
}

/// Summaries for every non-empty series, in map order.
pub fn summarise(series: &IndexMap<InstrumentId, Series>) -> Vec<SeriesSummary> {
    series.values().filter_map(SeriesSummary::from_series).collect()
}
