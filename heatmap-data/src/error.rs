use heatmap_stats::DataError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `heatmap-data`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP error: {status} for {url}")]
    Status { status: u16, url: String },

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("unsupported timeframe: {0} minutes (expected one of 10, 30, 60, 120, 240, 480)")]
    InvalidTimeframe(u32),

    #[error("fetch task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl FetchError {
    /// Determine if repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(_) => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Http(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_stats::InstrumentId;
    use smol_str::SmolStr;

    #[test]
    fn test_fetch_error_is_retryable() {
        struct TestCase {
            input: FetchError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: is retryable w/ transport failure
                input: FetchError::Http("connection refused".to_string()),
                expected: true,
            },
            TestCase {
                // TC1: is retryable w/ 503
                input: FetchError::Status {
                    status: 503,
                    url: "http://localhost/stocks/NVDA".to_string(),
                },
                expected: true,
            },
            TestCase {
                // TC2: is retryable w/ 429
                input: FetchError::Status {
                    status: 429,
                    url: "http://localhost/stocks/NVDA".to_string(),
                },
                expected: true,
            },
            TestCase {
                // TC3: is not retryable w/ 404
                input: FetchError::Status {
                    status: 404,
                    url: "http://localhost/stocks/XXXX".to_string(),
                },
                expected: false,
            },
            TestCase {
                // TC4: is not retryable w/ malformed body
                input: FetchError::Decode("expected value at line 1".to_string()),
                expected: false,
            },
            TestCase {
                // TC5: is not retryable w/ structural DataError
                input: FetchError::from(DataError::MissingField {
                    instrument: InstrumentId::new("NVDA"),
                    index: 0,
                    field: SmolStr::new("price"),
                }),
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_retryable();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_data_error_display_is_transparent() {
        let error = FetchError::from(DataError::MissingField {
            instrument: InstrumentId::new("NVDA"),
            index: 4,
            field: SmolStr::new("price"),
        });

        assert_eq!(error.to_string(), "NVDA: observation 4 is missing field `price`");
    }
}
