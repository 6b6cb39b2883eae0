//! Latency bookkeeping for retrieval and generation calls.

use std::time::Duration;

/// Accumulates millisecond latency samples for the lifetime of the engine.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    retrieval_ms: Vec<f64>,
    generation_ms: Vec<f64>,
}

/// Mean latencies, rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSummary {
    pub avg_retrieval_latency_ms: f64,
    pub avg_generation_latency_ms: f64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_retrieval(&mut self, elapsed: Duration) {
        self.retrieval_ms.push(as_millis(elapsed));
    }

    pub fn add_generation(&mut self, elapsed: Duration) {
        self.generation_ms.push(as_millis(elapsed));
    }

    pub fn retrieval_samples(&self) -> &[f64] {
        &self.retrieval_ms
    }

    pub fn generation_samples(&self) -> &[f64] {
        &self.generation_ms
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            avg_retrieval_latency_ms: rounded_mean(&self.retrieval_ms),
            avg_generation_latency_ms: rounded_mean(&self.generation_ms),
        }
    }
}

fn as_millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

fn rounded_mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    (mean * 100.0).round() / 100.0
}
