//! Request and response shapes of the check service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{CheckResult, CheckStatus, Metadata, ProbeMethod};

/// Keys computed by the service; a passthrough field with one of these names
/// is shadowed by the computed value
pub const RESERVED_KEYS: [&str; 5] = ["address", "status", "latencyMs", "method", "port"];

/// Single-target check request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOneRequest {
    #[serde(default, alias = "ip")]
    pub address: Option<String>,
}

impl CheckOneRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: Some(address.into()) }
    }
}

/// Batch check request: a list of entries each carrying an address plus any
/// passthrough fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckBatchRequest {
    #[serde(default, alias = "ips")]
    pub entries: Option<Vec<Value>>,
}

impl CheckBatchRequest {
    pub fn new(entries: Vec<Value>) -> Self {
        Self { entries: Some(entries) }
    }
}

/// Single-target check response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOneResponse {
    pub address: String,
    pub status: CheckStatus,
    pub latency_ms: u64,
    pub method: ProbeMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl From<CheckResult> for CheckOneResponse {
    fn from(result: CheckResult) -> Self {
        Self {
            address: result.target.address,
            status: result.status,
            latency_ms: result.outcome.latency_ms,
            method: result.outcome.method,
            port: result.outcome.port,
        }
    }
}

/// One row of a batch response: the caller's fields plus the verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub address: String,
    pub status: CheckStatus,
    pub latency_ms: u64,
    pub method: ProbeMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl From<CheckResult> for ResultRow {
    fn from(result: CheckResult) -> Self {
        let mut metadata = result.target.metadata;
        for key in RESERVED_KEYS {
            metadata.remove(key);
        }

        Self {
            metadata,
            address: result.target.address,
            status: result.status,
            latency_ms: result.outcome.latency_ms,
            method: result.outcome.method,
            port: result.outcome.port,
        }
    }
}

impl ResultRow {
    /// String value of a passthrough field
    pub fn field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Liveness report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    /// Seconds since the service started
    pub uptime: u64,
    pub echo_probe_available: bool,
}

/// Static capability description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub status: String,
    pub available_methods: Vec<ProbeMethod>,
    pub endpoints: Vec<String>,
}
