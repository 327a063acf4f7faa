use forecast_engine::{
    Capabilities, EngineConfig, ErrorResponse, ForecastError, ForecastRequest, ForecastResponse,
    Orchestrator,
};
use std::env;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Truthy values of the boolean environment switches
fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Configuration file (if any) with capability switches from the environment applied on top
fn load_config() -> Result<EngineConfig, ForecastError> {
    let config = match env::var("FORECAST_CONFIG") {
        Ok(path) if !path.trim().is_empty() => EngineConfig::from_file(path.trim())?,
        _ => EngineConfig::default(),
    };

    let mode = env::var("FORECAST_ML_MODE").unwrap_or_default();
    let capabilities = if mode.trim().eq_ignore_ascii_case("stub") {
        Capabilities::stub_only()
    } else {
        Capabilities {
            seasonal_trend: config.capabilities.seasonal_trend
                && !env_flag("FORECAST_DISABLE_SEASONAL"),
            vector_autoregression: config.capabilities.vector_autoregression
                && !env_flag("FORECAST_DISABLE_VAR"),
        }
    };

    Ok(config.with_capabilities(capabilities))
}

/// Request JSON from the first argument's path, or stdin when absent or `-`
fn read_request() -> Result<String, ForecastError> {
    match env::args().nth(1) {
        Some(path) if path != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn run() -> Result<ForecastResponse, ForecastError> {
    let config = load_config()?;
    info!(
        seasonal_trend = config.capabilities.seasonal_trend,
        vector_autoregression = config.capabilities.vector_autoregression,
        "engine capabilities"
    );

    let request = ForecastRequest::from_json_str(&read_request()?)?;
    request.validate()?;

    let result = Orchestrator::new(&config).forecast(&request)?;
    Ok(ForecastResponse::new(&request, result))
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the response body.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let (body, code) = match run() {
        Ok(response) => (serde_json::to_string(&response), ExitCode::SUCCESS),
        Err(e) => {
            error!(error = %e, "forecast failed");
            (serde_json::to_string(&ErrorResponse::from(&e)), ExitCode::FAILURE)
        }
    };

    match body {
        Ok(json) => {
            let mut stdout = io::stdout().lock();
            if writeln!(stdout, "{}", json).is_err() {
                return ExitCode::FAILURE;
            }
            code
        }
        Err(e) => {
            error!(error = %e, "could not serialize response");
            ExitCode::FAILURE
        }
    }
}
