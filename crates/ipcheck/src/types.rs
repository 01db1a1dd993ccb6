use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque caller-supplied fields, echoed back untouched
pub type Metadata = Map<String, Value>;

/// One address to check plus whatever the caller attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub address: String,

    #[serde(flatten)]
    pub metadata: Metadata,
}

impl Target {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), metadata: Metadata::new() }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// String value of a metadata field, if present and a string
    pub fn field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Probing method that produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    Ping,
    Tcp,
    Udp,
    None,
}

impl ProbeMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeMethod::Ping => "ping",
            ProbeMethod::Tcp => "tcp",
            ProbeMethod::Udp => "udp",
            ProbeMethod::None => "none",
        }
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single probe attempt did not reach the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Active refusal or reset from the remote end
    Refused,
    /// Host or network reported as unreachable
    Unreachable,
    /// No signal at all before the deadline
    TimedOut,
    /// Address did not resolve
    Unresolved,
    PermissionDenied,
    /// Any other local I/O failure
    Io,
}

impl FailureKind {
    /// A definitive negative answer, as opposed to silence
    pub fn is_definitive(self) -> bool {
        !matches!(self, FailureKind::TimedOut)
    }
}

/// Verdict of exactly one probe attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub reachable: bool,
    pub latency_ms: u64,
    pub method: ProbeMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl ProbeOutcome {
    /// A successful attempt. Latency is clamped to at least 1 ms so that a
    /// zero latency always means "not online".
    pub fn success(method: ProbeMethod, latency_ms: u64, port: Option<u16>) -> Self {
        Self { reachable: true, latency_ms: latency_ms.max(1), method, port, failure: None }
    }

    pub fn failure(method: ProbeMethod, port: Option<u16>, kind: FailureKind) -> Self {
        Self { reachable: false, latency_ms: 0, method, port, failure: Some(kind) }
    }

    /// Terminal outcome once every configured method and port was tried
    pub fn exhausted(kind: FailureKind) -> Self {
        Self::failure(ProbeMethod::None, None, kind)
    }
}

/// Normalized status reported for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Online,
    Offline,
    Timeout,
    Error,
}

impl CheckStatus {
    pub const ALL: [CheckStatus; 4] =
        [CheckStatus::Online, CheckStatus::Offline, CheckStatus::Timeout, CheckStatus::Error];

    /// Derive the status from an outcome: online iff reachable, timeout when
    /// nothing answered at all, offline on any definitive negative signal.
    pub fn from_outcome(outcome: &ProbeOutcome) -> Self {
        if outcome.reachable {
            return CheckStatus::Online;
        }
        match outcome.failure {
            Some(FailureKind::TimedOut) => CheckStatus::Timeout,
            _ => CheckStatus::Offline,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Online => "online",
            CheckStatus::Offline => "offline",
            CheckStatus::Timeout => "timeout",
            CheckStatus::Error => "error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(CheckStatus::Online),
            "offline" => Ok(CheckStatus::Offline),
            "timeout" => Ok(CheckStatus::Timeout),
            "error" => Ok(CheckStatus::Error),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Result row for one target of one check invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub target: Target,
    pub outcome: ProbeOutcome,
    pub status: CheckStatus,
}

impl CheckResult {
    pub fn new(target: Target, outcome: ProbeOutcome) -> Self {
        let status = CheckStatus::from_outcome(&outcome);
        Self { target, outcome, status }
    }

    /// Row for a target whose probing faulted outside the probe methods
    pub fn errored(target: Target) -> Self {
        Self { target, outcome: ProbeOutcome::exhausted(FailureKind::Io), status: CheckStatus::Error }
    }
}
