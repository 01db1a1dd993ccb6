//! Probe policy data structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ProbeMethod;

/// Ports tried by the TCP stage, in priority order
pub const DEFAULT_TCP_PORTS: [u16; 7] = [80, 443, 22, 8080, 3389, 21, 23];

/// Port targeted by the UDP stage
pub const DEFAULT_UDP_PORT: u16 = 53;

/// Process-wide probing policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbePolicy {
    /// Methods in the order the cascade tries them
    pub methods: Vec<ProbeMethod>,

    /// Ceiling for one target's whole cascade, in milliseconds
    pub target_deadline_ms: u64,

    /// Number of targets probed simultaneously by the batch scheduler
    pub concurrency: usize,

    /// Largest batch the request service accepts
    pub max_batch_size: usize,

    pub echo: EchoSettings,
    pub tcp: TcpSettings,
    pub udp: UdpSettings,
}

/// Echo (ping) stage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoSettings {
    /// Allow the echo stage at all; it is still skipped when the host cannot ping
    pub enabled: bool,
    /// Echo requests sent per probe (2-4)
    pub count: u8,
    pub timeout_ms: u64,
}

/// TCP connect stage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpSettings {
    pub ports: Vec<u16>,
    /// Deadline for each port's connect attempt
    pub timeout_ms: u64,
}

/// UDP stage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdpSettings {
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            methods: vec![ProbeMethod::Ping, ProbeMethod::Tcp, ProbeMethod::Udp],
            target_deadline_ms: 20_000,
            concurrency: 5,
            max_batch_size: 5_000,
            echo: EchoSettings::default(),
            tcp: TcpSettings::default(),
            udp: UdpSettings::default(),
        }
    }
}

impl Default for EchoSettings {
    fn default() -> Self {
        Self { enabled: true, count: 2, timeout_ms: 3_000 }
    }
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self { ports: DEFAULT_TCP_PORTS.to_vec(), timeout_ms: 1_500 }
    }
}

impl Default for UdpSettings {
    fn default() -> Self {
        Self { port: DEFAULT_UDP_PORT, timeout_ms: 2_000 }
    }
}

impl ProbePolicy {
    /// Create a new policy builder
    pub fn builder() -> ProbePolicyBuilder {
        ProbePolicyBuilder::default()
    }

    pub fn target_deadline(&self) -> Duration {
        Duration::from_millis(self.target_deadline_ms)
    }
}

impl EchoSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl TcpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl UdpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Builder for ProbePolicy
#[derive(Default)]
pub struct ProbePolicyBuilder {
    pub(crate) policy: ProbePolicy,
}
