//! Request metrics and statistics tracking for the prediction service.

use crate::error::PredictError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for prediction requests
pub struct ServiceMetrics {
    /// Total prediction requests received
    pub requests: AtomicU64,
    /// Requests that produced a prediction
    pub predictions: AtomicU64,
    /// Failed requests by error kind
    failures: RwLock<HashMap<&'static str, u64>>,
    /// Predictions per label (index 0 and 1)
    labels: [AtomicU64; 2],
    /// Latency of successful predictions (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            predictions: AtomicU64::new(0),
            failures: RwLock::new(HashMap::new()),
            labels: [AtomicU64::new(0), AtomicU64::new(0)],
            latencies: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Record an incoming request before it is handled
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, latency: Duration, prediction: u8, probability: f64) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        self.labels[usize::from(prediction.min(1))].fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            // Keep only last 10000
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a failed request
    pub fn record_failure(&self, error: &PredictError) {
        let kind = match error {
            PredictError::ModelUnavailable => "model_unavailable",
            PredictError::InvalidInput(_) => "invalid_input",
        };
        if let Ok(mut failures) = self.failures.write() {
            *failures.entry(kind).or_insert(0) += 1;
        }
    }

    /// Get latency statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let mut sorted: Vec<u64> = match self.latencies.read() {
            Ok(times) => times.clone(),
            Err(_) => return LatencyStats::default(),
        };
        if sorted.is_empty() {
            return LatencyStats::default();
        }
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get probability distribution
    pub fn get_probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or_default()
    }

    /// Get failures by kind
    pub fn get_failures(&self) -> HashMap<String, u64> {
        self.failures
            .read()
            .map(|f| f.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .unwrap_or_default()
    }

    /// Point-in-time view for the stats endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.started_at,
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests: self.requests.load(Ordering::Relaxed),
            predictions: self.predictions.load(Ordering::Relaxed),
            positive: self.labels[1].load(Ordering::Relaxed),
            negative: self.labels[0].load(Ordering::Relaxed),
            failures: self.get_failures(),
            throughput: self.get_throughput(),
            latency: self.get_latency_stats(),
            probability_distribution: self.get_probability_distribution(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let positive_rate = if snapshot.predictions > 0 {
            (snapshot.positive as f64 / snapshot.predictions as f64) * 100.0
        } else {
            0.0
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            RISK PREDICTION SERVICE - METRICS SUMMARY         ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Requests: {:>8}  │  Predictions: {:>8}  │  {:>6.1} req/s ║",
            snapshot.requests, snapshot.predictions, snapshot.throughput
        );
        info!(
            "║ Positive: {:>8}  │  Positive Rate: {:>6.1}%                 ║",
            snapshot.positive, positive_rate
        );
        info!(
            "║ Latency (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5}      ║",
            snapshot.latency.mean_us,
            snapshot.latency.p50_us,
            snapshot.latency.p95_us,
            snapshot.latency.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        for (kind, count) in &snapshot.failures {
            info!("║   {:18}: {:>6}                                   ║", kind, count);
        }
        info!("║ Probability Distribution:                                    ║");
        let total: u64 = snapshot.probability_distribution.iter().sum();
        for (i, &count) in snapshot.probability_distribution.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Serializable metrics view
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub requests: u64,
    pub predictions: u64,
    pub positive: u64,
    pub negative: u64,
    pub failures: HashMap<String, u64>,
    pub throughput: f64,
    pub latency: LatencyStats,
    pub probability_distribution: [u64; 10],
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
