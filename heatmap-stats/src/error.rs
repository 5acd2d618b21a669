use crate::series::InstrumentId;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Structural problems found while turning raw observations into a
/// [`Series`](crate::series::Series).
///
/// Degenerate statistics (empty, short or constant series) are not represented here;
/// the engine absorbs those with sentinel values.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
pub enum DataError {
    #[error("{instrument}: observation {index} is missing field `{field}`")]
    MissingField {
        instrument: InstrumentId,
        index: usize,
        field: SmolStr,
    },

    #[error("{instrument}: observation {index} has non-numeric price: {value}")]
    NonNumericPrice {
        instrument: InstrumentId,
        index: usize,
        value: String,
    },

    /// `price` holds the textual form (eg/ "inf", "NaN"), which JSON can carry.
    #[error("{instrument}: observation {index} has non-finite price: {price}")]
    NonFinitePrice {
        instrument: InstrumentId,
        index: usize,
        price: String,
    },
}

impl DataError {
    /// Instrument whose series contained the malformed observation.
    pub fn instrument(&self) -> &InstrumentId {
        match self {
            DataError::MissingField { instrument, .. }
            | DataError::NonNumericPrice { instrument, .. }
            | DataError::NonFinitePrice { instrument, .. } => instrument,
        }
    }

    /// Position of the malformed observation within its series.
    pub fn index(&self) -> usize {
        match self {
            DataError::MissingField { index, .. }
            | DataError::NonNumericPrice { index, .. }
            | DataError::NonFinitePrice { index, .. } => *index,
        }
    }
}
