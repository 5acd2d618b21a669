//! HTTP acquisition of instrument catalogs and price series.
//!
//! Endpoints (relative to [`ClientConfig::base_url`]):
//! - `GET /stocks`: `{"stocks": {"Nvidia Corporation": "NVDA", ...}}`
//! - `GET /stocks/{ticker}?minutes={m}`: `[{"price": .., "lastUpdatedAt": ..}, ...]`
//! - `GET /stocks/{ticker}`: `{"stock": {"price": .., "lastUpdatedAt": ..}}`

use crate::{config::ClientConfig, error::FetchError};
use async_trait::async_trait;
use heatmap_stats::{InstrumentId, RawPricePoint};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Lookback window for a price series request, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Timeframe(u32);

impl Timeframe {
    /// Windows offered by the heatmap timeframe selector.
    pub const ALLOWED: [u32; 6] = [10, 30, 60, 120, 240, 480];

    pub fn new(minutes: u32) -> Result<Self, FetchError> {
        if Self::ALLOWED.contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(FetchError::InvalidTimeframe(minutes))
        }
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Every allowed [`Timeframe`], shortest first.
    pub fn all() -> impl Iterator<Item = Timeframe> {
        Self::ALLOWED.into_iter().map(Self)
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self(60)
    }
}

impl TryFrom<u32> for Timeframe {
    type Error = FetchError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<Timeframe> for u32 {
    fn from(timeframe: Timeframe) -> Self {
        timeframe.0
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// Instrument catalog: display name -> ticker, in API order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Catalog {
    pub stocks: IndexMap<String, InstrumentId>,
}

impl Catalog {
    /// Tickers in catalog order.
    pub fn tickers(&self) -> impl Iterator<Item = &InstrumentId> {
        self.stocks.values()
    }

    /// Ticker for a display name (eg/ "Nvidia Corporation").
    pub fn ticker(&self, name: &str) -> Option<&InstrumentId> {
        self.stocks.get(name)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}

/// Source of instrument catalogs and raw price series.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Catalog, FetchError>;

    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        timeframe: Timeframe,
    ) -> Result<Vec<RawPricePoint>, FetchError>;
}

/// Series endpoint body: an array when `minutes` is given, otherwise the latest observation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeriesResponse {
    Many(Vec<RawPricePoint>),
    Latest { stock: RawPricePoint },
}

impl From<SeriesResponse> for Vec<RawPricePoint> {
    fn from(response: SeriesResponse) -> Self {
        match response {
            SeriesResponse::Many(points) => points,
            SeriesResponse::Latest { stock } => vec![stock],
        }
    }
}

/// [`PriceSource`] backed by the stock evaluation HTTP API.
#[derive(Debug, Clone)]
pub struct StockClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl StockClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch only the most recent observation for `instrument`.
    pub async fn fetch_latest(&self, instrument: &InstrumentId) -> Result<RawPricePoint, FetchError> {
        let url = format!("{}/stocks/{}", self.config.base_url, instrument);
        let points: Vec<RawPricePoint> = self.get_json::<SeriesResponse>(&url).await?.into();

        points
            .into_iter()
            .last()
            .ok_or_else(|| FetchError::Decode(format!("no observations in response from {url}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(%url, "GET");

        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|error| FetchError::Decode(error.to_string()))
    }
}

#[async_trait]
impl PriceSource for StockClient {
    async fn fetch_catalog(&self) -> Result<Catalog, FetchError> {
        let url = format!("{}/stocks", self.config.base_url);
        let catalog = self.get_json::<Catalog>(&url).await?;

        debug!(instruments = catalog.len(), "fetched instrument catalog");
        Ok(catalog)
    }

    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        timeframe: Timeframe,
    ) -> Result<Vec<RawPricePoint>, FetchError> {
        let url = format!(
            "{}/stocks/{}?minutes={}",
            self.config.base_url,
            instrument,
            timeframe.minutes()
        );
        let points: Vec<RawPricePoint> = self.get_json::<SeriesResponse>(&url).await?.into();

        debug!(%instrument, %timeframe, observations = points.len(), "fetched price series");
        Ok(points)
    }
}
