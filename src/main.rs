//! Heart Disease Risk Prediction Service - Main Entry Point
//!
//! Loads the trained artifacts once and serves predictions over HTTP.

use anyhow::Result;
use heart_risk_service::{
    config::AppConfig,
    metrics::MetricsReporter,
    models::{inference::InferenceEngine, loader::ArtifactLoader},
    server::{self, AppState},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    init_tracing(&config)?;

    info!("Starting Heart Risk Prediction Service");
    info!(
        fill_policy = ?config.inference.fill_policy,
        threshold = config.inference.threshold,
        "Configuration loaded"
    );

    // Load artifacts; missing pieces are reported per request
    let bundle = ArtifactLoader::from_config(&config.artifacts).load(&config.artifacts.model_dir);
    if !bundle.is_ready() {
        warn!(
            dir = %config.artifacts.model_dir,
            "Model or scaler missing; predictions will return 503 until artifacts are fixed and the service restarted"
        );
    }

    let engine = InferenceEngine::new(&config);
    let state = AppState::new(bundle, engine);

    // Start metrics reporter
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(state.metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let metrics = state.metrics.clone();
    server::serve(state, &config).await?;

    // Print final summary
    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "heart_risk_service={},tower_http=info",
            config.logging.level
        ))
    })?;

    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
