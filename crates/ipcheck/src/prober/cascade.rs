//! The per-target fallback policy as an explicit state machine.
//!
//! A cascade is a plan of steps (`Echo → Tcp(port_i) → Udp`) and a state that
//! only advances on failure. Nothing here touches the network, so the policy
//! order can be checked in isolation.

use crate::config::ProbePolicy;
use crate::probe::EchoCapability;
use crate::types::{FailureKind, ProbeMethod, ProbeOutcome};

/// One probe attempt in a cascade plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStep {
    Echo,
    Tcp(u16),
    Udp(u16),
}

impl ProbeStep {
    pub fn method(self) -> ProbeMethod {
        match self {
            ProbeStep::Echo => ProbeMethod::Ping,
            ProbeStep::Tcp(_) => ProbeMethod::Tcp,
            ProbeStep::Udp(_) => ProbeMethod::Udp,
        }
    }

    pub fn port(self) -> Option<u16> {
        match self {
            ProbeStep::Echo => None,
            ProbeStep::Tcp(port) | ProbeStep::Udp(port) => Some(port),
        }
    }
}

/// Expand the policy into the ordered list of attempts for one target.
///
/// The echo step is left out when echo is disabled by policy or unavailable
/// on this host, so the cascade starts straight at TCP.
pub fn plan(policy: &ProbePolicy, echo: EchoCapability) -> Vec<ProbeStep> {
    let mut steps = Vec::new();
    for method in &policy.methods {
        match method {
            ProbeMethod::Ping => {
                if policy.echo.enabled && echo.is_available() {
                    steps.push(ProbeStep::Echo);
                }
            }
            ProbeMethod::Tcp => steps.extend(policy.tcp.ports.iter().copied().map(ProbeStep::Tcp)),
            ProbeMethod::Udp => steps.push(ProbeStep::Udp(policy.udp.port)),
            ProbeMethod::None => {}
        }
    }
    steps
}

/// Progress of one target through its plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    /// Next attempt is `plan[index]`
    Trying {
        index: usize,
        /// Most recent definitive failure seen so far
        definitive: Option<FailureKind>,
    },
    Succeeded(ProbeOutcome),
    Exhausted(ProbeOutcome),
}

impl CascadeState {
    pub fn start(plan: &[ProbeStep]) -> Self {
        if plan.is_empty() {
            // Nothing could be attempted at all
            CascadeState::Exhausted(ProbeOutcome::exhausted(FailureKind::Io))
        } else {
            CascadeState::Trying { index: 0, definitive: None }
        }
    }

    /// The step to run next, if the cascade is still going
    pub fn current_step(&self, plan: &[ProbeStep]) -> Option<ProbeStep> {
        match self {
            CascadeState::Trying { index, .. } => plan.get(*index).copied(),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CascadeState::Trying { .. })
    }

    /// Feed the outcome of the current step.
    ///
    /// Success is terminal. Failure advances to the next step, or to
    /// `Exhausted` after the last one. The exhausted outcome is tagged
    /// `TimedOut` only if no attempt produced a definitive answer.
    pub fn transition(self, plan: &[ProbeStep], attempt: ProbeOutcome) -> Self {
        let CascadeState::Trying { index, definitive } = self else {
            return self;
        };

        if attempt.reachable {
            return CascadeState::Succeeded(attempt);
        }

        let failure = attempt.failure.unwrap_or(FailureKind::Io);
        let definitive = if failure.is_definitive() { Some(failure) } else { definitive };

        let next = index + 1;
        if next < plan.len() {
            CascadeState::Trying { index: next, definitive }
        } else {
            let kind = definitive.unwrap_or(FailureKind::TimedOut);
            CascadeState::Exhausted(ProbeOutcome::exhausted(kind))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(step: ProbeStep, kind: FailureKind) -> ProbeOutcome {
        ProbeOutcome::failure(step.method(), step.port(), kind)
    }

    #[test]
    fn default_plan_order() {
        let policy = ProbePolicy::default();
        let steps = plan(&policy, EchoCapability::available());

        assert_eq!(steps.first(), Some(&ProbeStep::Echo));
        assert_eq!(steps[1..5], [ProbeStep::Tcp(80), ProbeStep::Tcp(443), ProbeStep::Tcp(22), ProbeStep::Tcp(8080)]);
        assert_eq!(steps.last(), Some(&ProbeStep::Udp(53)));
        assert_eq!(steps.len(), 1 + policy.tcp.ports.len() + 1);
    }

    #[test]
    fn unavailable_echo_starts_at_tcp() {
        let steps = plan(&ProbePolicy::default(), EchoCapability::unavailable());
        assert_eq!(steps.first(), Some(&ProbeStep::Tcp(80)));
        assert!(!steps.contains(&ProbeStep::Echo));
    }

    #[test]
    fn plan_follows_policy_order() {
        let policy = ProbePolicy::builder()
            .methods(vec![ProbeMethod::Udp, ProbeMethod::Tcp])
            .tcp_ports(vec![8443])
            .udp_port(5353)
            .build();

        assert_eq!(
            plan(&policy, EchoCapability::available()),
            vec![ProbeStep::Udp(5353), ProbeStep::Tcp(8443)]
        );
    }

    #[test]
    fn success_short_circuits() {
        let steps = vec![ProbeStep::Echo, ProbeStep::Tcp(80), ProbeStep::Udp(53)];
        let state = CascadeState::start(&steps)
            .transition(&steps, failed(ProbeStep::Echo, FailureKind::TimedOut));
        assert_eq!(state.current_step(&steps), Some(ProbeStep::Tcp(80)));

        let win = ProbeOutcome::success(ProbeMethod::Tcp, 12, Some(80));
        let state = state.transition(&steps, win);
        assert_eq!(state, CascadeState::Succeeded(win));
        assert!(state.is_terminal());
        assert_eq!(state.current_step(&steps), None);

        // Terminal states ignore further input
        let later = ProbeOutcome::success(ProbeMethod::Udp, 5, Some(53));
        assert_eq!(state.transition(&steps, later), CascadeState::Succeeded(win));
    }

    #[test]
    fn all_silent_is_a_timeout() {
        let steps = vec![ProbeStep::Echo, ProbeStep::Tcp(80)];
        let mut state = CascadeState::start(&steps);
        while let Some(step) = state.current_step(&steps) {
            state = state.transition(&steps, failed(step, FailureKind::TimedOut));
        }

        let CascadeState::Exhausted(outcome) = state else { panic!("expected exhaustion") };
        assert_eq!(outcome.method, ProbeMethod::None);
        assert_eq!(outcome.latency_ms, 0);
        assert_eq!(outcome.failure, Some(FailureKind::TimedOut));
    }

    #[test]
    fn any_refusal_makes_it_definitive() {
        let steps = vec![ProbeStep::Tcp(80), ProbeStep::Udp(53)];
        let state = CascadeState::start(&steps)
            .transition(&steps, failed(ProbeStep::Tcp(80), FailureKind::Refused))
            .transition(&steps, failed(ProbeStep::Udp(53), FailureKind::TimedOut));

        assert_eq!(state, CascadeState::Exhausted(ProbeOutcome::exhausted(FailureKind::Refused)));
    }

    #[test]
    fn empty_plan_is_exhausted_immediately() {
        assert!(CascadeState::start(&[]).is_terminal());
    }
}
