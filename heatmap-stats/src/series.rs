use crate::error::DataError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Ticker identifying a tradable instrument (eg/ "NVDA").
pub type InstrumentId = SmolStr;

/// Validated price observation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    pub price: f64,
    #[serde(rename = "lastUpdatedAt")]
    pub observed_at: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(price: f64, observed_at: DateTime<Utc>) -> Self {
        Self { price, observed_at }
    }
}

/// Price observation as delivered on the wire, before validation.
///
/// Both fields are optional so that a malformed observation surfaces as a [`DataError`]
/// naming the instrument, rather than failing the decode of the whole response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RawPricePoint {
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default, rename = "lastUpdatedAt")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl RawPricePoint {
    /// Validate this observation, using `instrument` and `index` as error context.
    pub fn validate(&self, instrument: &InstrumentId, index: usize) -> Result<PricePoint, DataError> {
        let missing = |field: &str| DataError::MissingField {
            instrument: instrument.clone(),
            index,
            field: SmolStr::new(field),
        };

        let price = match &self.price {
            None | Some(serde_json::Value::Null) => return Err(missing("price")),
            Some(serde_json::Value::Number(number)) => {
                number.as_f64().ok_or_else(|| DataError::NonNumericPrice {
                    instrument: instrument.clone(),
                    index,
                    value: number.to_string(),
                })?
            }
            Some(other) => {
                return Err(DataError::NonNumericPrice {
                    instrument: instrument.clone(),
                    index,
                    value: other.to_string(),
                });
            }
        };

        let observed_at = self.observed_at.ok_or_else(|| missing("lastUpdatedAt"))?;

        Ok(PricePoint::new(price, observed_at))
    }
}

impl From<PricePoint> for RawPricePoint {
    fn from(point: PricePoint) -> Self {
        Self {
            price: Some(serde_json::Value::from(point.price)),
            observed_at: Some(point.observed_at),
        }
    }
}

/// Chronological price observations for one instrument.
///
/// Order is preserved exactly as delivered; consumers may truncate but never reorder.
/// Every price is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    instrument: InstrumentId,
    points: Vec<PricePoint>,
}

impl Series {
    /// Construct a [`Series`], rejecting non-finite prices.
    pub fn new(
        instrument: impl Into<InstrumentId>,
        points: Vec<PricePoint>,
    ) -> Result<Self, DataError> {
        let instrument = instrument.into();

        if let Some((index, point)) = points
            .iter()
            .enumerate()
            .find(|(_, point)| !point.price.is_finite())
        {
            return Err(DataError::NonFinitePrice {
                instrument,
                index,
                price: point.price.to_string(),
            });
        }

        Ok(Self { instrument, points })
    }

    /// Validate every raw observation, failing on the first malformed one.
    pub fn from_raw(
        instrument: impl Into<InstrumentId>,
        raw: &[RawPricePoint],
    ) -> Result<Self, DataError> {
        let instrument = instrument.into();

        let points = raw
            .iter()
            .enumerate()
            .map(|(index, point)| point.validate(&instrument, index))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(instrument, points)
    }

    /// Construct a [`Series`] from bare prices, stamped one minute apart from the Unix epoch.
    pub fn from_prices(
        instrument: impl Into<InstrumentId>,
        prices: impl IntoIterator<Item = f64>,
    ) -> Result<Self, DataError> {
        let points = prices
            .into_iter()
            .enumerate()
            .map(|(minute, price)| {
                PricePoint::new(
                    price,
                    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::minutes(minute as i64),
                )
            })
            .collect();

        Self::new(instrument, points)
    }

    pub fn instrument(&self) -> &InstrumentId {
        &self.instrument
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Prices in delivery order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.price).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawPricePoint {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_raw_price_point_validate() {
        struct TestCase {
            input: RawPricePoint,
            expected: Result<f64, &'static str>,
        }

        let tests = vec![
            TestCase {
                // TC0: well formed observation
                input: raw(json!({"price": 231.95, "lastUpdatedAt": "2025-05-08T04:11:42.465706306Z"})),
                expected: Ok(231.95),
            },
            TestCase {
                // TC1: integer price is accepted
                input: raw(json!({"price": 100, "lastUpdatedAt": "2025-05-08T04:11:42Z"})),
                expected: Ok(100.0),
            },
            TestCase {
                // TC2: missing price
                input: raw(json!({"lastUpdatedAt": "2025-05-08T04:11:42Z"})),
                expected: Err("missing price"),
            },
            TestCase {
                // TC3: null price
                input: raw(json!({"price": null, "lastUpdatedAt": "2025-05-08T04:11:42Z"})),
                expected: Err("missing price"),
            },
            TestCase {
                // TC4: string price
                input: raw(json!({"price": "231.95", "lastUpdatedAt": "2025-05-08T04:11:42Z"})),
                expected: Err("non-numeric"),
            },
            TestCase {
                // TC5: missing timestamp
                input: raw(json!({"price": 231.95})),
                expected: Err("missing lastUpdatedAt"),
            },
        ];

        let instrument = InstrumentId::new("NVDA");
        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.validate(&instrument, index);
            match (actual, test.expected) {
                (Ok(point), Ok(expected)) => {
                    assert_eq!(point.price, expected, "TC{} failed", index)
                }
                (Err(DataError::MissingField { field, .. }), Err(expected)) => {
                    assert_eq!(format!("missing {field}"), expected, "TC{} failed", index)
                }
                (Err(DataError::NonNumericPrice { .. }), Err("non-numeric")) => {}
                (actual, expected) => {
                    panic!("TC{index} failed: actual {actual:?}, expected {expected:?}")
                }
            }
        }
    }

    #[test]
    fn test_series_from_raw_reports_instrument_and_index() {
        let points = vec![
            raw(json!({"price": 10.0, "lastUpdatedAt": "2025-05-08T04:00:00Z"})),
            raw(json!({"price": 11.0, "lastUpdatedAt": "2025-05-08T04:01:00Z"})),
            raw(json!({"lastUpdatedAt": "2025-05-08T04:02:00Z"})),
        ];

        let error = Series::from_raw("AMZN", &points).unwrap_err();
        assert_eq!(error.instrument().as_str(), "AMZN");
        assert_eq!(error.index(), 2);
    }

    #[test]
    fn test_series_new_rejects_non_finite_price() {
        let points = vec![
            PricePoint::new(1.0, DateTime::<Utc>::UNIX_EPOCH),
            PricePoint::new(f64::NAN, DateTime::<Utc>::UNIX_EPOCH),
        ];

        let error = Series::new("TSLA", points).unwrap_err();
        assert_eq!(
            error,
            DataError::NonFinitePrice {
                instrument: InstrumentId::new("TSLA"),
                index: 1,
                price: "NaN".to_string(),
            }
        );
    }

    #[test]
    fn test_series_preserves_delivery_order() {
        let series = Series::from_prices("META", [3.0, 1.0, 2.0]).unwrap();
        assert_eq!(series.prices(), vec![3.0, 1.0, 2.0]);
        assert_eq!(series.len(), 3);
        assert!(series.points()[0].observed_at < series.points()[2].observed_at);
    }

    #[test]
    fn test_price_point_wire_format() {
        let point: PricePoint = serde_json::from_value(json!({
            "price": 8.64,
            "lastUpdatedAt": "2025-05-08T04:26:27.4658491Z"
        }))
        .unwrap();
        assert_eq!(point.price, 8.64);

        let back = RawPricePoint::from(point);
        assert_eq!(back.validate(&InstrumentId::new("X"), 0).unwrap(), point);
    }
}
