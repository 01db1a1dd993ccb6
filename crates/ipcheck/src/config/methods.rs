//! Probe policy builder and validation.

use std::collections::HashSet;

use tracing::warn;

use super::types::{ProbePolicy, ProbePolicyBuilder};
use crate::error::ConfigError;
use crate::probe::{ECHO_GRACE_MS, ECHO_INTERVAL_MS};
use crate::types::ProbeMethod;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000; // 5 minutes
const ECHO_COUNT_RANGE: std::ops::RangeInclusive<u8> = 2..=4;

impl ProbePolicy {
    /// Override the batch concurrency width
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Whether the policy lists the given method at all
    pub fn uses(&self, method: ProbeMethod) -> bool {
        self.methods.contains(&method)
    }

    /// Worst-case time one target's cascade takes when nothing answers
    pub fn cascade_budget_ms(&self) -> u64 {
        let echo = if self.echo.enabled && self.uses(ProbeMethod::Ping) { self.echo.timeout_ms } else { 0 };
        let tcp = if self.uses(ProbeMethod::Tcp) { self.tcp.timeout_ms * self.tcp.ports.len() as u64 } else { 0 };
        let udp = if self.uses(ProbeMethod::Udp) { self.udp.timeout_ms } else { 0 };
        echo + tcp + udp
    }

    /// Check the policy for values the prober cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.methods.is_empty() {
            return Err(invalid("at least one probe method is required"));
        }

        let mut seen = HashSet::new();
        for method in &self.methods {
            if *method == ProbeMethod::None {
                return Err(invalid("\"none\" is not a probe method"));
            }
            if !seen.insert(*method) {
                return Err(invalid(format!("method {method} listed more than once")));
            }
        }

        if self.concurrency == 0 {
            return Err(invalid("concurrency must be at least 1"));
        }
        if self.max_batch_size == 0 {
            return Err(invalid("max_batch_size must be at least 1"));
        }

        if !ECHO_COUNT_RANGE.contains(&self.echo.count) {
            return Err(invalid(format!(
                "echo count {} out of range ({}-{})",
                self.echo.count,
                ECHO_COUNT_RANGE.start(),
                ECHO_COUNT_RANGE.end()
            )));
        }

        validate_timeout("echo", self.echo.timeout_ms)?;
        validate_timeout("tcp", self.tcp.timeout_ms)?;
        validate_timeout("udp", self.udp.timeout_ms)?;
        validate_timeout("target deadline", self.target_deadline_ms)?;

        // The tool sends one echo per interval and needs room to exit on its own
        let echo_floor_ms = min_echo_timeout_ms(self.echo.count);
        if self.echo.enabled && self.uses(ProbeMethod::Ping) && self.echo.timeout_ms < echo_floor_ms {
            return Err(invalid(format!(
                "echo timeout {} ms is too short for {} echoes (min: {echo_floor_ms} ms)",
                self.echo.timeout_ms, self.echo.count
            )));
        }

        if self.uses(ProbeMethod::Tcp) && self.tcp.ports.is_empty() {
            return Err(invalid("tcp is enabled but no ports are configured"));
        }
        if self.tcp.ports.contains(&0) || self.udp.port == 0 {
            return Err(invalid("port 0 is not valid"));
        }

        let budget_ms = self.cascade_budget_ms();
        if budget_ms > self.target_deadline_ms {
            warn!(
                budget_ms,
                target_deadline_ms = self.target_deadline_ms,
                "Target deadline is shorter than the full cascade, later probes may never run"
            );
        }

        Ok(())
    }
}

fn min_echo_timeout_ms(count: u8) -> u64 {
    u64::from(count) * ECHO_INTERVAL_MS + ECHO_GRACE_MS
}

fn validate_timeout(label: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&timeout_ms) {
        return Err(invalid(format!(
            "{label} timeout {timeout_ms} ms out of range ({MIN_TIMEOUT_MS}-{MAX_TIMEOUT_MS} ms)"
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

impl ProbePolicyBuilder {
    /// Build the policy
    pub fn build(self) -> ProbePolicy {
        self.policy
    }

    /// Set the cascade order
    pub fn methods(mut self, methods: Vec<ProbeMethod>) -> Self {
        self.policy.methods = methods;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.policy.concurrency = concurrency;
        self
    }

    pub fn target_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.policy.target_deadline_ms = deadline_ms;
        self
    }

    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.policy.max_batch_size = size;
        self
    }

    /// Enable or disable the echo stage
    pub fn echo_enabled(mut self, enabled: bool) -> Self {
        self.policy.echo.enabled = enabled;
        self
    }

    pub fn echo_count(mut self, count: u8) -> Self {
        self.policy.echo.count = count;
        self
    }

    pub fn echo_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.policy.echo.timeout_ms = timeout_ms;
        self
    }

    /// Set the TCP port priority list
    pub fn tcp_ports(mut self, ports: Vec<u16>) -> Self {
        self.policy.tcp.ports = ports;
        self
    }

    pub fn tcp_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.policy.tcp.timeout_ms = timeout_ms;
        self
    }

    pub fn udp_port(mut self, port: u16) -> Self {
        self.policy.udp.port = port;
        self
    }

    pub fn udp_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.policy.udp.timeout_ms = timeout_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(ProbePolicy::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_and_duplicate_methods() {
        let empty = ProbePolicy::builder().methods(vec![]).build();
        assert!(empty.validate().is_err());

        let duplicated =
            ProbePolicy::builder().methods(vec![ProbeMethod::Tcp, ProbeMethod::Tcp]).build();
        assert!(duplicated.validate().is_err());

        let none = ProbePolicy::builder().methods(vec![ProbeMethod::None]).build();
        assert!(none.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(ProbePolicy::builder().concurrency(0).build().validate().is_err());
        assert!(ProbePolicy::builder().echo_count(1).build().validate().is_err());
        assert!(ProbePolicy::builder().echo_count(5).build().validate().is_err());
        assert!(ProbePolicy::builder().tcp_timeout_ms(50).build().validate().is_err());
        assert!(ProbePolicy::builder().udp_timeout_ms(400_000).build().validate().is_err());
        assert!(ProbePolicy::builder().tcp_ports(vec![80, 0]).build().validate().is_err());
    }

    #[test]
    fn echo_timeout_must_fit_every_echo() {
        let too_short = ProbePolicy::builder().echo_count(2).echo_timeout_ms(900).build();
        assert!(too_short.validate().is_err());

        let four = ProbePolicy::builder().echo_count(4);
        assert!(four.echo_timeout_ms(3_000).build().validate().is_err());
        let four = ProbePolicy::builder().echo_count(4);
        assert!(four.echo_timeout_ms(4_500).build().validate().is_ok());

        let echo_off = ProbePolicy::builder().echo_enabled(false).echo_timeout_ms(900).build();
        assert!(echo_off.validate().is_ok());
    }

    #[test]
    fn cascade_budget_counts_only_used_stages() {
        assert_eq!(ProbePolicy::default().cascade_budget_ms(), 3_000 + 7 * 1_500 + 2_000);
        assert!(ProbePolicy::default().cascade_budget_ms() <= ProbePolicy::default().target_deadline_ms);

        let tcp_only = ProbePolicy::builder().methods(vec![ProbeMethod::Tcp]).tcp_ports(vec![80, 443]).build();
        assert_eq!(tcp_only.cascade_budget_ms(), 3_000);
    }

    #[test]
    fn short_deadline_is_allowed() {
        let tight = ProbePolicy::builder().target_deadline_ms(1_000).build();
        assert!(tight.cascade_budget_ms() > tight.target_deadline_ms);
        assert!(tight.validate().is_ok());
    }

    #[test]
    fn tcp_ports_only_required_when_tcp_is_used() {
        let no_ports = ProbePolicy::builder().tcp_ports(vec![]);
        assert!(no_ports.build().validate().is_err());

        let udp_only = ProbePolicy::builder().methods(vec![ProbeMethod::Udp]).tcp_ports(vec![]);
        assert!(udp_only.build().validate().is_ok());
    }
}
