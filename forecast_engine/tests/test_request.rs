use forecast_engine::data::{Candle, ConfidenceBand, ForecastPoint, ForecastResult, RawPoint};
use forecast_engine::error::ForecastError;
use forecast_engine::request::{
    ErrorResponse, ForecastRequest, ForecastResponse, Method, MIN_CANDLES,
};
use forecast_engine::timeframe::Timeframe;
use forecast_engine::Orchestrator;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn candles_json(n: usize) -> serde_json::Value {
    serde_json::Value::Array(
        (0..n)
            .map(|i| json!({ "time": i as i64 * 3_600_000, "close": 100.0 + i as f64 }))
            .collect(),
    )
}

#[test]
fn test_minimal_request_defaults() {
    let req = ForecastRequest::from_json_str(r#"{"candles": []}"#).unwrap();

    assert_eq!(req.symbol, "BTCUSDT");
    assert_eq!(req.timeframe, Timeframe::Hourly);
    assert_eq!(req.method, Method::SeasonalTrend);
    assert_eq!(req.horizon, None);
    assert_eq!(req.resolved_horizon(), 24);
    assert!(req.exog.is_empty());
}

#[test]
fn test_full_request() {
    let body = json!({
        "symbol": "ETHUSDT",
        "tf": "4h",
        "method": "blend",
        "horizon": 12,
        "candles": [
            {"time": 0, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10.0},
            {"time": 14400000, "close": 1.6}
        ],
        "exog": {
            "btc": [{"time": 0, "value": 30000.0}, {"time": 14400000}],
            "funding": []
        }
    });
    let req = ForecastRequest::from_json_str(&body.to_string()).unwrap();

    assert_eq!(req.symbol, "ETHUSDT");
    assert_eq!(req.timeframe, Timeframe::FourHourly);
    assert_eq!(req.method, Method::Blend);
    assert_eq!(req.resolved_horizon(), 12);
    assert_eq!(req.candles[0].high, Some(2.0));
    assert_eq!(req.candles[1], Candle::new(14_400_000, 1.6));

    let keys: Vec<&str> = req.exog.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["btc", "funding"]);
    assert_eq!(req.exog["btc"][1].value, None);

    let series = req.series();
    assert_eq!(series.values(), &[1.5, 1.6]);
}

#[rstest]
#[case("prophet", Method::SeasonalTrend)]
#[case("seasonal_trend", Method::SeasonalTrend)]
#[case("var", Method::VectorAutoregression)]
#[case("vector_autoregression", Method::VectorAutoregression)]
#[case("blend", Method::Blend)]
fn test_method_names(#[case] name: &str, #[case] expected: Method) {
    let body = json!({ "method": name, "candles": [] });
    let req = ForecastRequest::from_json_str(&body.to_string()).unwrap();
    assert_eq!(req.method, expected);
    assert_eq!(name.to_uppercase().parse::<Method>().unwrap(), expected);
}

#[rstest]
#[case(r#""VAR""#, Method::VectorAutoregression)]
#[case(r#""Blend""#, Method::Blend)]
#[case(r#""Prophet""#, Method::SeasonalTrend)]
#[case(r#"" Seasonal_Trend ""#, Method::SeasonalTrend)]
#[case("null", Method::SeasonalTrend)]
#[case(r#""""#, Method::SeasonalTrend)]
fn test_method_json_matches_string_parsing(#[case] method: &str, #[case] expected: Method) {
    let body = format!(r#"{{"method": {}, "candles": []}}"#, method);
    let req = ForecastRequest::from_json_str(&body).unwrap();
    assert_eq!(req.method, expected);
}

#[test]
fn test_method_serializes_canonical_name() {
    let value = serde_json::to_value(Method::VectorAutoregression).unwrap();
    assert_eq!(value, json!("vector_autoregression"));
}

#[test]
fn test_null_exog_map_is_empty() {
    let req = ForecastRequest::from_json_str(r#"{"candles": [], "exog": null}"#).unwrap();
    assert!(req.exog.is_empty());
}

#[test]
fn test_malformed_exog_series_do_not_fail_parsing() {
    let body = json!({
        "candles": [],
        "exog": {
            "eth": null,
            "sol": "not a series",
            "btc": [
                {"time": 0, "value": "5.0"},
                {"time": 3600000, "value": "n/a"},
                {"time": "7200000", "value": 6.5},
                42,
                {"time": 10800000, "value": null}
            ]
        }
    });
    let req = ForecastRequest::from_json_str(&body.to_string()).unwrap();

    assert_eq!(req.exog.len(), 3);
    assert!(req.exog["eth"].is_empty());
    assert!(req.exog["sol"].is_empty());
    assert_eq!(
        req.exog["btc"],
        vec![
            RawPoint::new(0, 5.0),
            RawPoint {
                time: Some(3_600_000),
                value: None,
            },
            RawPoint::new(7_200_000, 6.5),
            RawPoint {
                time: Some(10_800_000),
                value: None,
            },
        ]
    );
}

#[test]
fn test_malformed_exog_still_forecasts() {
    let body = json!({
        "method": "prophet",
        "horizon": 4,
        "candles": candles_json(200),
        "exog": {
            "eth": null,
            "sol": [{"time": "later", "value": "soon"}]
        }
    });
    let req = ForecastRequest::from_json_str(&body.to_string()).unwrap();
    req.validate().unwrap();

    let result = Orchestrator::default().forecast(&req).unwrap();
    assert_eq!(result.method_used, "SeasonalTrend");
    assert_eq!(result.horizons(), 4);
}

#[test]
fn test_timeframe_alias_and_errors() {
    let req = ForecastRequest::from_json_str(r#"{"timeframe": "1d", "candles": []}"#).unwrap();
    assert_eq!(req.timeframe, Timeframe::Daily);
    assert_eq!(req.resolved_horizon(), 7);

    assert!(ForecastRequest::from_json_str(r#"{"tf": "15m", "candles": []}"#).is_err());
    assert!(ForecastRequest::from_json_str(r#"{"method": "lstm", "candles": []}"#).is_err());
    assert!("lstm".parse::<Method>().is_err());
}

#[rstest]
#[case(Some(0), 24)]
#[case(None, 24)]
#[case(Some(5), 5)]
fn test_horizon_resolution(#[case] horizon: Option<usize>, #[case] expected: usize) {
    let mut req = ForecastRequest::new("X", Timeframe::Hourly, Method::Blend, Vec::new());
    req.horizon = horizon;
    assert_eq!(req.resolved_horizon(), expected);
}

#[test]
fn test_validate_candle_count() {
    let short = json!({ "candles": candles_json(MIN_CANDLES - 1) });
    let req = ForecastRequest::from_json_str(&short.to_string()).unwrap();
    assert!(matches!(req.validate(), Err(ForecastError::InvalidRequest(_))));

    let enough = json!({ "candles": candles_json(MIN_CANDLES) });
    let req = ForecastRequest::from_json_str(&enough.to_string()).unwrap();
    assert!(req.validate().is_ok());
}

#[test]
fn test_validate_rejects_non_finite_close() {
    let mut candles: Vec<Candle> = (0..MIN_CANDLES as i64).map(|i| Candle::new(i, 1.0)).collect();
    candles[10].close = f64::NAN;
    let req = ForecastRequest::new("X", Timeframe::Hourly, Method::SeasonalTrend, candles);

    let err = req.validate().unwrap_err();
    assert!(err.to_string().contains("non-finite"));
}

#[test]
fn test_response_shape() {
    let req = ForecastRequest::new("SOLUSDT", Timeframe::Daily, Method::SeasonalTrend, Vec::new());
    let result = ForecastResult::new(
        "Stub",
        vec![ForecastPoint {
            time: 86_400_000,
            value: 20.0,
        }],
        vec![ConfidenceBand {
            time: 86_400_000,
            low: 19.8,
            high: 20.2,
        }],
    );

    let response = ForecastResponse::new(&req, result);
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(
        value,
        json!({
            "symbol": "SOLUSDT",
            "tf": "1d",
            "method": "Stub",
            "forecast_line": [{"time": 86400000, "value": 20.0}],
            "confidence": [{"time": 86400000, "low": 19.8, "high": 20.2}]
        })
    );
}

#[test]
fn test_error_response() {
    let err = ForecastError::InsufficientData("need more rows".to_string());
    let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();

    assert_eq!(body, json!({ "error": "Insufficient data: need more rows" }));
}
