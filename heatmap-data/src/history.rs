//! Single-instrument price history: one ticker's observations over a timeframe, with the
//! average price drawn as a reference line.

use crate::{
    client::{PriceSource, Timeframe},
    error::FetchError,
};
use heatmap_stats::{InstrumentId, PricePoint, Series, SeriesSummary};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistory {
    pub instrument: InstrumentId,
    pub timeframe: Timeframe,
    /// Observations in delivery order
    pub points: Vec<PricePoint>,
    /// `None` if the timeframe holds no observations
    pub summary: Option<SeriesSummary>,
}

impl PriceHistory {
    pub fn build(series: &Series, timeframe: Timeframe) -> Self {
        Self {
            instrument: series.instrument().clone(),
            timeframe,
            points: series.points().to_vec(),
            summary: SeriesSummary::from_series(series),
        }
    }

    /// Fetch and validate the series of `instrument` for `timeframe`.
    pub async fn fetch<Source>(
        source: &Source,
        instrument: &InstrumentId,
        timeframe: Timeframe,
    ) -> Result<Self, FetchError>
    where
        Source: PriceSource + ?Sized,
    {
        let raw = source.fetch_series(instrument, timeframe).await?;
        let series = Series::from_raw(instrument.clone(), &raw)?;
        let history = Self::build(&series, timeframe);

        info!(
            %instrument,
            %timeframe,
            observations = history.points.len(),
            "fetched price history"
        );

        Ok(history)
    }

    /// Average price over the timeframe.
    pub fn average(&self) -> Option<f64> {
        self.summary.as_ref().map(|summary| summary.mean)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Display for PriceHistory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} Stock Price (Last {} mins)",
            self.instrument,
            self.timeframe.minutes()
        )?;

        let Some(average) = self.average() else {
            return writeln!(f, "No data available for the selected stock and timeframe.");
        };

        for point in &self.points {
            writeln!(
                f,
                "{}  ${:.2}",
                point.observed_at.format("%H:%M:%S"),
                point.price
            )?;
        }

        writeln!(f, "Avg: ${average:.2}")
    }
}
