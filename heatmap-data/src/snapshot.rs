use crate::{
    client::{Catalog, PriceSource, Timeframe},
    gather::{FetchFailure, GatherReport, gather_series, summarise_failures},
};
use heatmap_stats::{CorrelationEngine, CorrelationMatrix, InstrumentId, SeriesSummary, summary};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};
use tracing::info;

/// Instruments and timeframe the heatmap is computed for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Selection {
    pub tickers: Vec<InstrumentId>,
    pub timeframe: Timeframe,
}

impl Selection {
    /// Number of catalog tickers pre-selected by [`Selection::initial`].
    pub const INITIAL_TICKERS: usize = 5;

    pub fn new(tickers: Vec<InstrumentId>, timeframe: Timeframe) -> Self {
        Self { tickers, timeframe }
    }

    /// First [`Self::INITIAL_TICKERS`] tickers of the catalog.
    pub fn initial(catalog: &Catalog, timeframe: Timeframe) -> Self {
        Self::new(
            catalog.tickers().take(Self::INITIAL_TICKERS).cloned().collect(),
            timeframe,
        )
    }
}

/// Everything the presentation layer needs to draw one heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSnapshot {
    pub timeframe: Timeframe,
    pub matrix: CorrelationMatrix,
    pub summaries: Vec<SeriesSummary>,
    pub failures: Vec<FetchFailure>,
}

impl HeatmapSnapshot {
    pub fn empty(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            matrix: CorrelationMatrix::default(),
            summaries: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Build a snapshot from already gathered series.
    pub fn build(report: &GatherReport, timeframe: Timeframe, engine: &CorrelationEngine) -> Self {
        Self {
            timeframe,
            matrix: engine.compute(&report.successes),
            summaries: summary::summarise(&report.successes),
            failures: report.failures.clone(),
        }
    }

    /// Gather every selected series then build a snapshot.
    ///
    /// An empty selection short-circuits to [`HeatmapSnapshot::empty`] without fetching.
    pub async fn compute<Source>(
        source: Arc<Source>,
        selection: &Selection,
        engine: &CorrelationEngine,
    ) -> Self
    where
        Source: PriceSource + ?Sized + 'static,
    {
        if selection.tickers.is_empty() {
            return Self::empty(selection.timeframe);
        }

        let report = gather_series(source, &selection.tickers, selection.timeframe).await;
        let snapshot = Self::build(&report, selection.timeframe, engine);

        info!(
            timeframe = %selection.timeframe,
            selected = selection.tickers.len(),
            instruments = snapshot.matrix.len(),
            failures = snapshot.failures.len(),
            "computed heatmap snapshot"
        );

        snapshot
    }

    pub fn failure_summary(&self) -> Option<String> {
        summarise_failures(&self.failures)
    }

    pub fn summary(&self, instrument: &str) -> Option<&SeriesSummary> {
        self.summaries
            .iter()
            .find(|summary| summary.instrument.as_str() == instrument)
    }
}

/// Plain text heatmap: `N/A` for undefined cells, otherwise two decimals.
impl Display for HeatmapSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 8;

        writeln!(f, "Correlation Heatmap (Last {} mins)", self.timeframe.minutes())?;

        if self.matrix.is_empty() {
            writeln!(
                f,
                "Not enough data to compute a correlation heatmap. Select at least two tickers with available data."
            )?;
        } else {
            write!(f, "{:>WIDTH$}", "")?;
            for instrument in self.matrix.instruments() {
                write!(f, " {instrument:>WIDTH$}")?;
            }
            writeln!(f)?;

            for row in self.matrix.rows() {
                if let Some(first) = row.first() {
                    write!(f, "{:>WIDTH$}", first.instrument_a)?;
                }
                for cell in row {
                    if cell.is_defined() {
                        write!(f, " {:>WIDTH$.2}", cell.correlation)?;
                    } else {
                        write!(f, " {:>WIDTH$}", "N/A")?;
                    }
                }
                writeln!(f)?;
            }
        }

        for summary in &self.summaries {
            writeln!(
                f,
                "{:<WIDTH$} avg ${:.2}  std dev ${:.2}  ({} observations)",
                summary.instrument, summary.mean, summary.std_dev, summary.observations
            )?;
        }

        if let Some(failures) = self.failure_summary() {
            writeln!(f, "{failures}")?;
        }

        Ok(())
    }
}
