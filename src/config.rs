//! Configuration management for the risk prediction service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "HEART_RISK_CONFIG";

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// How a feature with no usable value is filled before scaling
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Missing slots become a literal `0.0`
    #[default]
    Zero,
    /// Missing slots stay NaN; the classifier routes them as missing
    Nan,
}

impl FillPolicy {
    /// Value placed in a slot whose raw value was missing or unparseable
    pub fn fill_value(self) -> f64 {
        match self {
            FillPolicy::Zero => 0.0,
            FillPolicy::Nan => f64::NAN,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin allowed by CORS (the browser frontend)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

/// Location of the trained artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory containing the model, scaler and feature-order files
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    #[serde(default = "default_features_file")]
    pub features_file: String,
}

/// Prediction behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Fill policy for missing or non-numeric values
    #[serde(default)]
    pub fill_policy: FillPolicy,
    /// Positive-class probability at or above which the label is 1
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Periodic metrics summary
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between summaries; 0 disables the reporter
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_model_dir() -> String {
    "model".to_string()
}

fn default_model_file() -> String {
    "model.json".to_string()
}

fn default_scaler_file() -> String {
    "scaler.json".to_string()
}

fn default_features_file() -> String {
    "feature_order.json".to_string()
}

fn default_threshold() -> f64 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_report_interval() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            model_file: default_model_file(),
            scaler_file: default_scaler_file(),
            features_file: default_features_file(),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            fill_policy: FillPolicy::default(),
            threshold: default_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: default_report_interval(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `$HEART_RISK_CONFIG` or `config/config.toml`
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path, with `HEART_RISK__*` overrides.
    ///
    /// A missing file is not an error; every field has a default. Environment
    /// values stay strings so `fill_policy=nan` is not read as a float;
    /// numeric fields are converted during deserialization.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("HEART_RISK").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let threshold = self.inference.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("inference.threshold must be within [0, 1], got {threshold}");
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
