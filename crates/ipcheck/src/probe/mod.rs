//! Single-target probe methods.
//!
//! Every method maps `(address, port, timeout)` to a [`ProbeOutcome`] and
//! never fails past its own boundary: resolution errors, refusals, permission
//! problems and deadlines all come back as `reachable = false` outcomes.

mod capability;
mod echo;
pub mod parse;
mod tcp;
mod udp;

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::lookup_host;

pub use capability::EchoCapability;
pub use echo::EchoProbe;
pub(crate) use echo::{ECHO_GRACE_MS, ECHO_INTERVAL_MS};
pub use tcp::TcpProbe;
pub use udp::UdpProbe;

use crate::types::{FailureKind, ProbeMethod, ProbeOutcome};

/// A reachability check against one address
#[async_trait]
pub trait Probe: Send + Sync {
    /// Method tag reported in outcomes
    fn method(&self) -> ProbeMethod;

    /// Probe the address, finishing within `timeout`
    async fn probe(&self, address: &str, port: Option<u16>, timeout: Duration) -> ProbeOutcome;
}

/// Resolve an address to a socket address, skipping DNS for IP literals
pub(crate) async fn resolve(address: &str, port: u16) -> Result<SocketAddr, FailureKind> {
    let host = address.trim().trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    lookup_host((host, port))
        .await
        .map_err(|_| FailureKind::Unresolved)?
        .next()
        .ok_or(FailureKind::Unresolved)
}

/// Map a socket error onto the failure taxonomy
pub(crate) fn classify_io_error(error: &io::Error) -> FailureKind {
    match error.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => FailureKind::Refused,
        io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::AddrNotAvailable => FailureKind::Unreachable,
        io::ErrorKind::TimedOut => FailureKind::TimedOut,
        io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
        _ => FailureKind::Io,
    }
}
