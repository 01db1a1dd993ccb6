//! Hybrid prober: runs the probe cascade for one target.

mod cascade;

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, warn};

pub use cascade::{CascadeState, ProbeStep, plan};

use crate::config::ProbePolicy;
use crate::probe::{EchoCapability, EchoProbe, Probe, TcpProbe, UdpProbe};
use crate::types::{CheckResult, FailureKind, ProbeOutcome, Target};

/// The probe implementations a prober dispatches to
#[derive(Clone)]
pub struct ProbeSet {
    pub echo: Arc<dyn Probe>,
    pub tcp: Arc<dyn Probe>,
    pub udp: Arc<dyn Probe>,
}

impl ProbeSet {
    /// Probes that talk to the real network
    pub fn system(policy: &ProbePolicy) -> Self {
        Self {
            echo: Arc::new(EchoProbe::new(policy.echo.count)),
            tcp: Arc::new(TcpProbe::new()),
            udp: Arc::new(UdpProbe::new()),
        }
    }
}

/// Tries echo, then TCP ports, then UDP for a target, stopping at the first
/// success. The whole cascade is capped by the policy's per-target deadline.
#[derive(Clone)]
pub struct HybridProber {
    policy: Arc<ProbePolicy>,
    capability: EchoCapability,
    probes: ProbeSet,
}

impl HybridProber {
    /// Create a prober using the system probes
    pub fn new(policy: Arc<ProbePolicy>, capability: EchoCapability) -> Self {
        let probes = ProbeSet::system(&policy);
        Self::with_probes(policy, capability, probes)
    }

    pub fn with_probes(policy: Arc<ProbePolicy>, capability: EchoCapability, probes: ProbeSet) -> Self {
        Self { policy, capability, probes }
    }

    pub fn policy(&self) -> &ProbePolicy {
        &self.policy
    }

    pub fn capability(&self) -> EchoCapability {
        self.capability
    }

    /// The attempts this prober makes for every target
    pub fn plan(&self) -> Vec<ProbeStep> {
        plan(&self.policy, self.capability)
    }

    /// Check one target and derive its status
    pub async fn check(&self, target: Target) -> CheckResult {
        let outcome = self.probe(&target.address).await;
        CheckResult::new(target, outcome)
    }

    /// Run the cascade for one address
    pub async fn probe(&self, address: &str) -> ProbeOutcome {
        let steps = self.plan();
        let deadline = self.policy.target_deadline();

        match timeout(deadline, self.run_cascade(address, &steps)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(address, deadline_ms = self.policy.target_deadline_ms, "Target deadline exceeded");
                ProbeOutcome::exhausted(FailureKind::TimedOut)
            }
        }
    }

    async fn run_cascade(&self, address: &str, steps: &[ProbeStep]) -> ProbeOutcome {
        let mut state = CascadeState::start(steps);
        loop {
            match state {
                CascadeState::Trying { index, .. } => {
                    let attempt = self.attempt(address, steps[index]).await;
                    state = state.transition(steps, attempt);
                }
                CascadeState::Succeeded(outcome) => {
                    debug!(address, method = %outcome.method, port = ?outcome.port, "Target reachable");
                    return outcome;
                }
                CascadeState::Exhausted(outcome) => {
                    debug!(address, failure = ?outcome.failure, "Cascade exhausted");
                    return outcome;
                }
            }
        }
    }

    async fn attempt(&self, address: &str, step: ProbeStep) -> ProbeOutcome {
        match step {
            ProbeStep::Echo => self.probes.echo.probe(address, None, self.policy.echo.timeout()).await,
            ProbeStep::Tcp(port) => {
                self.probes.tcp.probe(address, Some(port), self.policy.tcp.timeout()).await
            }
            ProbeStep::Udp(port) => {
                self.probes.udp.probe(address, Some(port), self.policy.udp.timeout()).await
            }
        }
    }
}
