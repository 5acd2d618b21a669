use crate::series::{PricePoint, Series};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Strategy for pairing the observations of two series before correlating them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Keep the first `min(len_a, len_b)` observations of each series, ignoring timestamps.
    #[default]
    Truncate,

    /// Keep only observations whose timestamps appear in both series.
    ///
    /// Expects both series in chronological order. Never interpolates or resamples.
    MatchTimestamps,
}

impl Alignment {
    /// Produce two equal-length price vectors for the pair `(a, b)`.
    pub fn align(&self, a: &Series, b: &Series) -> (Vec<f64>, Vec<f64>) {
        match self {
            Alignment::Truncate => truncate(a.points(), b.points()),
            Alignment::MatchTimestamps => match_timestamps(a.points(), b.points()),
        }
    }
}

fn truncate(a: &[PricePoint], b: &[PricePoint]) -> (Vec<f64>, Vec<f64>) {
    let len = a.len().min(b.len());
    let prices = |points: &[PricePoint]| -> Vec<f64> {
        points[..len].iter().map(|point| point.price).collect()
    };
    (prices(a), prices(b))
}

fn match_timestamps(a: &[PricePoint], b: &[PricePoint]) -> (Vec<f64>, Vec<f64>) {
    let mut aligned_a = Vec::with_capacity(a.len().min(b.len()));
    let mut aligned_b = Vec::with_capacity(a.len().min(b.len()));

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].observed_at.cmp(&b[j].observed_at) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                aligned_a.push(a[i].price);
                aligned_b.push(b[j].price);
                i += 1;
                j += 1;
            }
        }
    }

    (aligned_a, aligned_b)
}
