use std::time::Duration;

use tracing::{info, warn};

use super::echo::EchoProbe;
use super::parse::parse_echo_output;
use crate::config::ProbePolicy;
use crate::types::ProbeMethod;

const DETECTION_TARGET: &str = "127.0.0.1";
const DETECTION_CEILING: Duration = Duration::from_secs(3);

/// Whether echo probing works on this host
///
/// Determined once at startup and passed by value into the prober; never
/// re-detected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoCapability {
    available: bool,
}

impl EchoCapability {
    pub const fn available() -> Self {
        Self { available: true }
    }

    pub const fn unavailable() -> Self {
        Self { available: false }
    }

    pub fn is_available(self) -> bool {
        self.available
    }

    /// Detect echo support by pinging the loopback address once.
    ///
    /// Skips detection entirely when the policy does not use the echo stage.
    pub async fn detect(policy: &ProbePolicy) -> Self {
        if !policy.echo.enabled || !policy.uses(ProbeMethod::Ping) {
            info!("Echo probing disabled by policy");
            return Self::unavailable();
        }

        match EchoProbe::new(1).run(DETECTION_TARGET, DETECTION_CEILING).await {
            Ok(stdout) if parse_echo_output(&stdout).is_alive() => {
                info!("Echo probing available");
                Self::available()
            }
            Ok(_) => {
                warn!("Echo tool produced no reply from loopback, disabling echo probing");
                Self::unavailable()
            }
            Err(kind) => {
                warn!(?kind, "Echo tool unusable, disabling echo probing");
                Self::unavailable()
            }
        }
    }
}
