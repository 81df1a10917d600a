//! Performance aggregation stage

use super::context::RequestContext;
use super::error::PipelineError;
use super::stage::{Next, Stage};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Samples retained per operation; oldest are dropped first
const MAX_SAMPLES: usize = 100;

#[derive(Default)]
struct OperationRecord {
    /// Bounded FIFO of recent durations
    durations: Vec<Duration>,
    /// Total invocations, successes and failures alike
    count: u64,
    /// Failed invocations
    errors: u64,
}

/// Bounded per-operation latency and outcome statistics.
///
/// Owned by the server instance and injected into the stage, so independent
/// servers in tests do not share state.
#[derive(Default)]
pub struct PerformanceMetrics {
    operations: RwLock<HashMap<String, OperationRecord>>,
}

/// Aggregated metrics for one operation
#[derive(Debug, Clone, Serialize)]
pub struct OperationMetrics {
    pub count: u64,
    pub error_count: u64,
    pub avg_time_ms: f64,
    pub min_time_ms: f64,
    pub max_time_ms: f64,
    pub success_rate: f64,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation of `operation`
    pub fn record(&self, operation: &str, duration: Duration, success: bool) {
        let mut operations = self.operations.write().unwrap();
        let record = operations.entry(operation.to_string()).or_default();

        record.count += 1;
        if !success {
            record.errors += 1;
        }

        if record.durations.len() >= MAX_SAMPLES {
            record.durations.remove(0);
        }
        record.durations.push(duration);
    }

    /// Number of retained samples for an operation
    pub fn sample_count(&self, operation: &str) -> usize {
        self.operations
            .read()
            .unwrap()
            .get(operation)
            .map(|r| r.durations.len())
            .unwrap_or(0)
    }

    /// Aggregated metrics for every observed operation
    pub fn snapshot(&self) -> HashMap<String, OperationMetrics> {
        let operations = self.operations.read().unwrap();
        let mut metrics = HashMap::new();

        for (operation, record) in operations.iter() {
            if record.durations.is_empty() {
                continue;
            }

            let times_ms: Vec<f64> = record
                .durations
                .iter()
                .map(|d| d.as_secs_f64() * 1000.0)
                .collect();
            let sum: f64 = times_ms.iter().sum();

            metrics.insert(
                operation.clone(),
                OperationMetrics {
                    count: record.count,
                    error_count: record.errors,
                    avg_time_ms: sum / times_ms.len() as f64,
                    min_time_ms: times_ms.iter().cloned().fold(f64::INFINITY, f64::min),
                    max_time_ms: times_ms.iter().cloned().fold(0.0, f64::max),
                    success_rate: 1.0 - (record.errors as f64 / record.count as f64),
                },
            );
        }

        metrics
    }
}

/// Stage that times the continuation and feeds the metrics table.
///
/// Duration is recorded regardless of outcome; failures count toward both the
/// sample sequence and the error tally.
pub struct PerformanceStage {
    metrics: Arc<PerformanceMetrics>,
}

impl PerformanceStage {
    pub fn new(metrics: Arc<PerformanceMetrics>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Stage for PerformanceStage {
    fn name(&self) -> &str {
        "performance"
    }

    async fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Result<Value, PipelineError> {
        let start = Instant::now();
        let result = next.run(ctx).await;
        self.metrics
            .record(&ctx.method, start.elapsed(), result.is_ok());
        result
    }
}
