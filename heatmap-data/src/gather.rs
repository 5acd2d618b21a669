//! Settle-all fan-out over a selection of instruments.
//!
//! Every ticker is fetched in its own task; one ticker failing (transport, HTTP status,
//! malformed observation or task panic) never aborts the others.

use crate::{
    client::{PriceSource, Timeframe},
    error::FetchError,
};
use heatmap_stats::{InstrumentId, Series};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Fetch failure for a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub instrument: InstrumentId,
    pub error: FetchError,
}

/// Outcome of [`gather_series`]: validated series and per-instrument failures.
#[derive(Debug, Clone, Default)]
pub struct GatherReport {
    /// Successfully fetched series, in selection order
    pub successes: IndexMap<InstrumentId, Series>,
    /// Failed instruments, in selection order
    pub failures: Vec<FetchFailure>,
}

impl GatherReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human readable summary of every failure, if any.
    pub fn failure_summary(&self) -> Option<String> {
        summarise_failures(&self.failures)
    }
}

/// Join per-instrument failures into one message, eg/
/// `"Some stock data failed to load: Failed to fetch data for AMD: HTTP error: 503 for ..."`.
pub fn summarise_failures(failures: &[FetchFailure]) -> Option<String> {
    if failures.is_empty() {
        return None;
    }

    Some(format!(
        "Some stock data failed to load: {}",
        failures
            .iter()
            .map(|failure| format!(
                "Failed to fetch data for {}: {}",
                failure.instrument, failure.error
            ))
            .join("; ")
    ))
}

/// Fetch and validate the series of every ticker concurrently.
///
/// Duplicate tickers are fetched once. Results keep the first-seen selection order.
/// Dropping the returned future aborts every in-flight fetch.
pub async fn gather_series<Source>(
    source: Arc<Source>,
    tickers: &[InstrumentId],
    timeframe: Timeframe,
) -> GatherReport
where
    Source: PriceSource + ?Sized + 'static,
{
    let instruments = tickers.iter().cloned().collect::<IndexSet<_>>();

    let mut tasks = JoinSet::new();
    let mut positions = HashMap::with_capacity(instruments.len());
    for (position, instrument) in instruments.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        let handle = tasks.spawn(async move {
            let raw = source.fetch_series(&instrument, timeframe).await?;
            Series::from_raw(instrument, &raw).map_err(FetchError::from)
        });
        positions.insert(handle.id(), position);
    }

    let mut outcomes = vec![None; instruments.len()];
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result),
            Err(error) => (error.id(), Err(FetchError::Task(error.to_string()))),
        };
        if let Some(&position) = positions.get(&id) {
            outcomes[position] = Some(result);
        }
    }

    let mut report = GatherReport::default();
    for (instrument, outcome) in instruments.into_iter().zip(outcomes) {
        let result = outcome
            .unwrap_or_else(|| Err(FetchError::Task("task produced no result".to_string())));

        match result {
            Ok(series) => {
                debug!(%instrument, observations = series.len(), "gathered series");
                report.successes.insert(instrument, series);
            }
            Err(error) => {
                warn!(%instrument, %error, "failed to fetch series");
                report.failures.push(FetchFailure { instrument, error });
            }
        }
    }

    debug!(
        %timeframe,
        successes = report.successes.len(),
        failures = report.failures.len(),
        "gathered selection"
    );

    report
}
