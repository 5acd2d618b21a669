/// Correlation Snapshot
///
/// Fetches the selected instruments for one timeframe, computes the correlation heatmap and
/// prints it as JSON (default) or as a plain text table. With `VIEW=stock` it prints the price
/// history of a single instrument instead.
use std::{error::Error, sync::Arc};

use heatmap_data::{
    ClientConfig, ConfigError, HeatmapSnapshot, PriceHistory, PriceSource, Selection, StockClient,
    Timeframe,
};
use heatmap_stats::{Alignment, CorrelationEngine, InstrumentId};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum View {
    #[default]
    Heatmap,
    Stock,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Parse an optional variable through `T`'s serde representation (default if unset)
fn parse_var<T: DeserializeOwned + Default>(
    name: &str,
    value: Option<&str>,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(serde_json::Value::String(value.trim().to_string()))
            .map_err(|error| ConfigError::invalid_var(name, value, error)),
    }
}

fn parse_tickers(value: &str) -> Vec<InstrumentId> {
    value
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .map(InstrumentId::from)
        .collect()
}

fn parse_timeframe(value: Option<&str>) -> Result<Timeframe, ConfigError> {
    let Some(value) = value else {
        return Ok(Timeframe::default());
    };

    let minutes = value
        .trim()
        .parse::<u32>()
        .map_err(|error| ConfigError::invalid_var("TIMEFRAME_MINUTES", value, error))?;

    Timeframe::new(minutes)
        .map_err(|error| ConfigError::invalid_var("TIMEFRAME_MINUTES", value, error))
}

/// Get tickers from TICKERS env var (default: first catalog entries)
fn get_tickers() -> Option<Vec<InstrumentId>> {
    env_var("TICKERS").map(|tickers| parse_tickers(&tickers))
}

/// Get the single ticker from TICKER env var (default: first catalog entry)
fn get_ticker() -> Option<InstrumentId> {
    env_var("TICKER")
        .map(|ticker| ticker.trim().to_uppercase())
        .filter(|ticker| !ticker.is_empty())
        .map(InstrumentId::from)
}

/// Get timeframe from TIMEFRAME_MINUTES env var (default: 60)
fn get_timeframe() -> Result<Timeframe, ConfigError> {
    parse_timeframe(env_var("TIMEFRAME_MINUTES").as_deref())
}

/// Get alignment from ALIGNMENT env var (default: truncate)
fn get_alignment() -> Result<Alignment, ConfigError> {
    parse_var("ALIGNMENT", env_var("ALIGNMENT").as_deref())
}

/// Get output format from OUTPUT env var (default: json)
fn get_output_format() -> Result<OutputFormat, ConfigError> {
    parse_var("OUTPUT", env_var("OUTPUT").as_deref())
}

/// Get view from VIEW env var (default: heatmap)
fn get_view() -> Result<View, ConfigError> {
    parse_var("VIEW", env_var("VIEW").as_deref())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let config = ClientConfig::from_env()?;
    info!(base_url = %config.base_url, "starting correlation snapshot");

    let timeframe = get_timeframe()?;
    let output = get_output_format()?;
    let view = get_view()?;
    let alignment = get_alignment()?;
    let client = Arc::new(StockClient::new(config)?);

    match view {
        View::Heatmap => run_heatmap(client, timeframe, alignment, output).await,
        View::Stock => run_stock(&client, timeframe, output).await,
    }
}

async fn run_heatmap(
    client: Arc<StockClient>,
    timeframe: Timeframe,
    alignment: Alignment,
    output: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let selection = match get_tickers() {
        Some(tickers) => Selection::new(tickers, timeframe),
        None => {
            let catalog = client.fetch_catalog().await?;
            info!(instruments = catalog.len(), "no TICKERS set, using catalog selection");
            Selection::initial(&catalog, timeframe)
        }
    };

    let engine = CorrelationEngine::new(alignment);
    let snapshot = HeatmapSnapshot::compute(client, &selection, &engine).await;

    if let Some(failures) = snapshot.failure_summary() {
        warn!("{}", failures);
    }

    print_output(&snapshot, output)
}

async fn run_stock(
    client: &StockClient,
    timeframe: Timeframe,
    output: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    let ticker = match get_ticker() {
        Some(ticker) => ticker,
        None => {
            let catalog = client.fetch_catalog().await?;
            let ticker = catalog
                .tickers()
                .next()
                .cloned()
                .ok_or("instrument catalog is empty")?;
            info!(%ticker, "no TICKER set, using first catalog instrument");
            ticker
        }
    };

    let history = PriceHistory::fetch(client, &ticker, timeframe).await?;
    print_output(&history, output)
}

fn print_output<T>(value: &T, output: OutputFormat) -> Result<(), Box<dyn Error>>
where
    T: Serialize + std::fmt::Display,
{
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => print!("{value}"),
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alignment() {
        struct TestCase {
            input: Option<&'static str>,
            expected: Result<Alignment, ()>,
        }

        let tests = vec![
            TestCase {
                // TC0: unset
                input: None,
                expected: Ok(Alignment::Truncate),
            },
            TestCase {
                // TC1: explicit truncate
                input: Some("truncate"),
                expected: Ok(Alignment::Truncate),
            },
            TestCase {
                // TC2: timestamp matching, surrounding whitespace
                input: Some(" match_timestamps "),
                expected: Ok(Alignment::MatchTimestamps),
            },
            TestCase {
                // TC3: typo is an error, not a silent fallback
                input: Some("match-timestamps"),
                expected: Err(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = parse_var::<Alignment>("ALIGNMENT", test.input).map_err(|_| ());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }

        let error = parse_var::<Alignment>("ALIGNMENT", Some("match-timestamps")).unwrap_err();
        assert!(error.to_string().starts_with("invalid ALIGNMENT=\"match-timestamps\": "));
    }

    #[test]
    fn test_parse_output_and_view() {
        assert_eq!(parse_var::<OutputFormat>("OUTPUT", None), Ok(OutputFormat::Json));
        assert_eq!(parse_var::<OutputFormat>("OUTPUT", Some("table")), Ok(OutputFormat::Table));
        assert!(parse_var::<OutputFormat>("OUTPUT", Some("csv")).is_err());

        assert_eq!(parse_var::<View>("VIEW", None), Ok(View::Heatmap));
        assert_eq!(parse_var::<View>("VIEW", Some("stock")), Ok(View::Stock));
        assert!(parse_var::<View>("VIEW", Some("chart")).is_err());
    }

    #[test]
    fn test_parse_timeframe() {
        assert_eq!(parse_timeframe(None), Ok(Timeframe::default()));
        assert_eq!(parse_timeframe(Some("120")), Ok(Timeframe::new(120).unwrap()));
        assert!(parse_timeframe(Some("45")).is_err());
        assert!(parse_timeframe(Some("sixty")).is_err());
    }

    #[test]
    fn test_parse_tickers() {
        let tickers = parse_tickers(" nvda, AMD,,tsla ");
        let tickers = tickers.iter().map(|t| t.as_str()).collect::<Vec<_>>();
        assert_eq!(tickers, vec!["NVDA", "AMD", "TSLA"]);
    }
}
