use heatmap_stats::{
    Alignment, CorrelationEngine, InstrumentId, RawPricePoint, Series,
    statistic::{covariance, mean, pearson, sample_std_dev},
    summary::summarise,
};
use indexmap::IndexMap;
use serde_json::json;

fn raw_series(prices: &[serde_json::Value]) -> Vec<RawPricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(minute, price)| {
            serde_json::from_value(json!({
                "price": price,
                "lastUpdatedAt": format!("2025-05-08T04:{minute:02}:00Z"),
            }))
            .unwrap()
        })
        .collect()
}

#[test]
fn summary_statistics_degenerate_inputs() {
    assert_eq!(mean(&[]), 0.0);
    assert_eq!(sample_std_dev(&[]), 0.0);
    assert_eq!(sample_std_dev(&[5.0]), 0.0);
    assert_eq!(covariance(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    assert_eq!(pearson(-3.0, 0.0, 1.5), 0.0);
}

#[test]
fn heatmap_from_wire_observations() {
    let mut raw = IndexMap::new();
    raw.insert(
        InstrumentId::new("AAPL"),
        raw_series(&[json!(100.0), json!(101.0), json!(102.0)]),
    );
    raw.insert(
        InstrumentId::new("MSFT"),
        raw_series(&[json!(50.0), json!(49.0), json!(48.0)]),
    );
    raw.insert(InstrumentId::new("CSCO"), raw_series(&[json!(10.0)]));

    let matrix = CorrelationEngine::default().compute_raw(&raw).unwrap();

    let instruments = matrix.instruments().map(|i| i.as_str()).collect::<Vec<_>>();
    assert_eq!(instruments, vec!["AAPL", "MSFT"]);
    assert_eq!(matrix.get("AAPL", "MSFT").unwrap().correlation, -1.0);
    assert_eq!(matrix.get("MSFT", "AAPL").unwrap().correlation, -1.0);
    assert!(
        matrix
            .rows()
            .iter()
            .enumerate()
            .all(|(i, row)| row[i].correlation == 1.0)
    );

    let json = serde_json::to_value(&matrix).unwrap();
    assert_eq!(json[0][1]["instrument_b"], "MSFT");
    assert_eq!(json[0][1]["correlation"], -1.0);
}

#[test]
fn heatmap_malformed_series_names_instrument() {
    let mut raw = IndexMap::new();
    raw.insert(
        InstrumentId::new("AAPL"),
        raw_series(&[json!(100.0), json!(101.0)]),
    );
    raw.insert(
        InstrumentId::new("MSFT"),
        raw_series(&[json!(50.0), json!("n/a")]),
    );

    let error = CorrelationEngine::default().compute_raw(&raw).unwrap_err();
    assert_eq!(error.instrument().as_str(), "MSFT");
    assert_eq!(error.index(), 1);
}

#[test]
fn heatmap_correlations_are_bounded_or_nan() {
    let mut series = IndexMap::new();
    let inputs: [(&str, &[f64]); 5] = [
        ("NVDA", &[101.3, 99.8, 102.4, 98.1, 100.0, 103.7, 104.1]),
        ("AMD", &[45.2, 46.9, 44.0, 47.7, 45.5]),
        ("FLAT", &[10.0, 10.0, 10.0]),
        ("TSLA", &[210.0, 215.5]),
        ("PYPL", &[0.1, 0.2, 0.30000000000000004, 0.4]),
    ];
    for (instrument, prices) in inputs {
        series.insert(
            InstrumentId::new(instrument),
            Series::from_prices(instrument, prices.iter().copied()).unwrap(),
        );
    }

    for alignment in [Alignment::Truncate, Alignment::MatchTimestamps] {
        let matrix = CorrelationEngine::new(alignment).compute(&series);
        assert_eq!(matrix.len(), 5);

        for cell in matrix.cells() {
            assert!(
                cell.correlation.is_nan() || (-1.0..=1.0).contains(&cell.correlation),
                "{alignment:?} {} vs {}: {}",
                cell.instrument_a,
                cell.instrument_b,
                cell.correlation
            );
        }

        for instrument in ["NVDA", "AMD", "TSLA"] {
            assert_eq!(matrix.get("FLAT", instrument).unwrap().correlation, 0.0);
        }
    }

    let summaries = summarise(&series);
    assert_eq!(summaries.len(), 5);
    assert_eq!(summaries[2].std_dev, 0.0);
}
