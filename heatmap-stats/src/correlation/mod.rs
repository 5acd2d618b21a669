//! Pairwise correlation engine
//!
//! Builds the square [`CorrelationMatrix`] rendered by the heatmap:
//! - instruments with fewer than [`MIN_OBSERVATIONS`] are excluded
//! - each off-diagonal pair is aligned (see [`Alignment`]) and correlated
//! - zero-variance pairs emit `0`, pairs with too little aligned data emit `NaN`

mod align;

pub use align::Alignment;

use crate::{
    error::DataError,
    series::{InstrumentId, RawPricePoint, Series},
    statistic::{covariance, pearson, sample_std_dev},
};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// Minimum number of observations an instrument (and an aligned pair) needs to be correlated.
pub const MIN_OBSERVATIONS: usize = 2;

/// One heatmap cell: the correlation of `instrument_a` (row) against `instrument_b` (column).
///
/// `correlation` is within `[-1, 1]`, or `NaN` when the pair has too little aligned data.
/// `NaN` serialises as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub instrument_a: InstrumentId,
    pub instrument_b: InstrumentId,
    pub correlation: f64,
}

impl CorrelationCell {
    /// `false` if the pair had insufficient aligned data.
    pub fn is_defined(&self) -> bool {
        !self.correlation.is_nan()
    }
}

/// Square, row-major matrix of [`CorrelationCell`]s.
///
/// Row `i`, column `j` holds the correlation of instrument `i` against instrument `j`, with
/// rows and columns in the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CorrelationMatrix {
    rows: Vec<Vec<CorrelationCell>>,
}

impl CorrelationMatrix {
    pub fn rows(&self) -> &[Vec<CorrelationCell>] {
        &self.rows
    }

    /// Number of instruments (rows and columns).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Instruments in row (and column) order.
    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentId> {
        self.rows
            .iter()
            .filter_map(|row| row.first().map(|cell| &cell.instrument_a))
    }

    /// Look up the cell for row `a`, column `b`.
    pub fn get(&self, a: &str, b: &str) -> Option<&CorrelationCell> {
        self.rows
            .iter()
            .find(|row| row.first().is_some_and(|cell| cell.instrument_a.as_str() == a))?
            .iter()
            .find(|cell| cell.instrument_b.as_str() == b)
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &CorrelationCell> {
        self.rows.iter().flatten()
    }

    pub fn into_rows(self) -> Vec<Vec<CorrelationCell>> {
        self.rows
    }
}

/// Stateless pairwise correlation engine.
///
/// Holds only configuration; every [`compute`](CorrelationEngine::compute) call is a fresh
/// batch over the series it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrelationEngine {
    alignment: Alignment,
}

impl CorrelationEngine {
    pub fn new(alignment: Alignment) -> Self {
        Self { alignment }
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Compute the correlation matrix over `series`, in the map's iteration order.
    ///
    /// Returns an empty matrix if fewer than two instruments hold at least
    /// [`MIN_OBSERVATIONS`] observations.
    pub fn compute(&self, series: &IndexMap<InstrumentId, Series>) -> CorrelationMatrix {
        let valid = series
            .iter()
            .filter(|(_, series)| series.len() >= MIN_OBSERVATIONS)
            .collect::<Vec<_>>();

        if valid.len() < 2 {
            debug!(
                instruments = series.len(),
                valid = valid.len(),
                "insufficient valid instruments for correlation matrix"
            );
            return CorrelationMatrix::default();
        }

        let rows = valid
            .iter()
            .enumerate()
            .map(|(row, (instrument_a, series_a))| {
                valid
                    .iter()
                    .enumerate()
                    .map(|(column, (instrument_b, series_b))| CorrelationCell {
                        instrument_a: (*instrument_a).clone(),
                        instrument_b: (*instrument_b).clone(),
                        correlation: if row == column {
                            1.0
                        } else {
                            self.correlate(series_a, series_b)
                        },
                    })
                    .collect()
            })
            .collect::<Vec<_>>();

        debug!(
            instruments = series.len(),
            valid = valid.len(),
            alignment = ?self.alignment,
            "computed correlation matrix"
        );

        CorrelationMatrix { rows }
    }

    /// Validate raw observations then [`compute`](CorrelationEngine::compute).
    ///
    /// Fails with the first structural [`DataError`], naming its instrument.
    pub fn compute_raw(
        &self,
        raw: &IndexMap<InstrumentId, Vec<RawPricePoint>>,
    ) -> Result<CorrelationMatrix, DataError> {
        let series = raw
            .iter()
            .map(|(instrument, points)| {
                Series::from_raw(instrument.clone(), points)
                    .map(|series| (instrument.clone(), series))
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;

        Ok(self.compute(&series))
    }

    /// Correlation of one off-diagonal pair after alignment.
    pub fn correlate(&self, a: &Series, b: &Series) -> f64 {
        let (x, y) = self.alignment.align(a, b);
        aligned_correlation(&x, &y)
    }
}

fn aligned_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < MIN_OBSERVATIONS {
        return f64::NAN;
    }

    if is_constant(x) || is_constant(y) {
        return 0.0;
    }

    let (x, y) = (rescale(x), rescale(y));

    let std_dev_x = sample_std_dev(&x);
    let std_dev_y = sample_std_dev(&y);
    if std_dev_x == 0.0 || std_dev_y == 0.0 {
        return 0.0;
    }

    // Clamp absorbs floating point drift just outside [-1, 1]
    pearson(covariance(&x, &y), std_dev_x, std_dev_y).clamp(-1.0, 1.0)
}

/// Constant series have zero variance even when their rounded mean differs from every value.
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

/// Scale `values` by a power of two so the largest magnitude lands in `[1, 2)`.
///
/// Power of two scaling is exact, so ordinary prices correlate bit-for-bit as unscaled, while
/// extreme magnitudes no longer overflow (`NaN`) or underflow (`0`) in the squared deviations.
fn rescale(values: &[f64]) -> Vec<f64> {
    let max = values.iter().fold(0.0_f64, |max, value| max.max(value.abs()));
    if max == 0.0 {
        return values.to_vec();
    }

    let exponent = (max.log2().floor() as i32).clamp(-MAX_RESCALE_EXPONENT, MAX_RESCALE_EXPONENT);
    let factor = 2.0_f64.powi(-exponent);

    values.iter().map(|value| value * factor).collect()
}

const MAX_RESCALE_EXPONENT: i32 = 1000;
