//! Thunder configuration and lightweight request metrics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Runtime configuration for the in-memory post store and its serving edge.
/// Mirrors `thunder/internal/config/config.go`'s constants, but as
/// overridable fields rather than compiled-in constants, with retention,
/// timeout, and concurrency defaults matching what the original service
/// actually ships.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThunderConfig {
    /// How long a post stays in the store before `trim_old_posts` evicts it.
    pub post_retention_seconds: u64,
    /// Per-request deadline; `0` means no deadline is enforced.
    pub request_timeout_ms: u64,
    /// Admission control limit on concurrent in-flight queries.
    pub max_concurrent_requests: usize,
    pub kafka: KafkaConfig,
}

impl Default for ThunderConfig {
    fn default() -> Self {
        Self {
            post_retention_seconds: 172_800,
            request_timeout_ms: 0,
            max_concurrent_requests: 100,
            kafka: KafkaConfig::default(),
        }
    }
}

impl ThunderConfig {
    pub fn from_env() -> Self {
        Self {
            post_retention_seconds: env_u64("POST_RETENTION_SECONDS", 172_800),
            request_timeout_ms: env_u64("REQUEST_TIMEOUT_MS", 0),
            max_concurrent_requests: env_usize("MAX_CONCURRENT_REQUESTS", 100),
            kafka: KafkaConfig::from_env(),
        }
    }
}

/// Connection and consumption parameters for the ingest stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub topic: String,
    pub group_id: String,
    /// Partitions to assign, or empty to mean "all partitions".
    pub partitions: Vec<i32>,
    pub fetch_timeout_ms: u64,
    pub batch_size: usize,
    /// Seek to the log end on startup instead of replaying retained history.
    pub skip_to_latest: bool,
    pub security: Option<KafkaSecurityConfig>,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            topic: "posts".to_string(),
            group_id: "thunder".to_string(),
            partitions: Vec::new(),
            fetch_timeout_ms: 200,
            batch_size: 500,
            skip_to_latest: false,
            security: None,
        }
    }
}

impl KafkaConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            brokers: std::env::var("KAFKA_BROKERS")
                .map(|v| v.split(',').map(str::trim).map(str::to_string).collect())
                .unwrap_or_else(|_| vec!["localhost:9092".to_string()]),
            topic: std::env::var("KAFKA_TOPIC").unwrap_or_else(|_| "posts".to_string()),
            group_id: std::env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| "thunder".to_string()),
            partitions: std::env::var("KAFKA_PARTITIONS")
                .ok()
                .map(|v| v.split(',').filter_map(|p| p.trim().parse().ok()).collect())
                .unwrap_or_default(),
            fetch_timeout_ms: env_u64("KAFKA_FETCH_TIMEOUT_MS", 200),
            batch_size: env_usize("KAFKA_BATCH_SIZE", 500),
            skip_to_latest: env_bool("KAFKA_SKIP_TO_LATEST", false),
            security: None,
        };

        if env_bool("KAFKA_TLS_ENABLED", false) {
            config.security = Some(KafkaSecurityConfig {
                protocol: std::env::var("KAFKA_SECURITY_PROTOCOL")
                    .unwrap_or_else(|_| "SASL_SSL".to_string()),
                sasl_mechanism: std::env::var("KAFKA_SASL_MECHANISM").ok(),
                sasl_username: std::env::var("KAFKA_SASL_USERNAME").ok(),
                sasl_password: std::env::var("KAFKA_SASL_PASSWORD").ok(),
            });
        }

        config
    }
}

/// TLS + SASL (PLAIN, SCRAM-SHA-256, SCRAM-SHA-512) credentials for brokers
/// that require authenticated connections.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KafkaSecurityConfig {
    pub protocol: String,
    pub sasl_mechanism: Option<String>,
    pub sasl_username: Option<String>,
    pub sasl_password: Option<String>,
}

/// Request and admission counters, incremented at the same call sites
/// `thunder/internal/service/service.go`'s `recordMetrics` marks. No
/// exporter is wired; these are read directly (e.g. by an admin endpoint
/// or a test) rather than scraped.
#[derive(Default)]
pub struct Metrics {
    pub requests_total: AtomicU64,
    pub requests_rejected: AtomicU64,
    pub requests_timed_out: AtomicU64,
    pub ingest_events_applied: AtomicU64,
    pub ingest_events_dropped: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timed_out(&self) {
        self.requests_timed_out.fetch_add(1, Ordering::Relaxed);
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_service_behavior() {
        let config = ThunderConfig::default();
        assert_eq!(config.post_retention_seconds, 172_800);
        assert_eq!(config.request_timeout_ms, 0);
        assert_eq!(config.max_concurrent_requests, 100);
    }
}
