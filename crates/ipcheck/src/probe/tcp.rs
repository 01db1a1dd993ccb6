use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{Probe, classify_io_error, resolve};
use crate::types::{FailureKind, ProbeMethod, ProbeOutcome};

/// TCP connect probe
///
/// Success means the three-way handshake completed; the stream is dropped
/// immediately. A timed-out connect is dropped with its future, so no socket
/// outlives the deadline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProbe;

impl TcpProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for TcpProbe {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Tcp
    }

    async fn probe(&self, address: &str, port: Option<u16>, deadline: Duration) -> ProbeOutcome {
        let Some(port) = port else {
            return ProbeOutcome::failure(ProbeMethod::Tcp, None, FailureKind::Io);
        };

        let start = Instant::now();
        let connect = async {
            let addr = resolve(address, port).await?;
            TcpStream::connect(addr).await.map_err(|e| classify_io_error(&e))
        };

        let outcome = match timeout(deadline, connect).await {
            Ok(Ok(stream)) => {
                let latency = start.elapsed().as_millis() as u64;
                drop(stream);
                ProbeOutcome::success(ProbeMethod::Tcp, latency, Some(port))
            }
            Ok(Err(kind)) => ProbeOutcome::failure(ProbeMethod::Tcp, Some(port), kind),
            Err(_) => ProbeOutcome::failure(ProbeMethod::Tcp, Some(port), FailureKind::TimedOut),
        };

        debug!(address, port, reachable = outcome.reachable, failure = ?outcome.failure, "tcp probe");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn open_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let outcome = TcpProbe::new().probe("127.0.0.1", Some(port), Duration::from_secs(2)).await;

        assert!(outcome.reachable);
        assert_eq!(outcome.method, ProbeMethod::Tcp);
        assert_eq!(outcome.port, Some(port));
        assert!(outcome.latency_ms >= 1);
    }

    #[tokio::test]
    async fn closed_port_is_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = TcpProbe::new().probe("127.0.0.1", Some(port), Duration::from_secs(2)).await;

        assert!(!outcome.reachable);
        assert_eq!(outcome.failure, Some(FailureKind::Refused));
        assert_eq!(outcome.latency_ms, 0);
    }

    #[tokio::test]
    async fn missing_port_fails_without_connecting() {
        let outcome = TcpProbe::new().probe("127.0.0.1", None, Duration::from_secs(1)).await;
        assert!(!outcome.reachable);
    }

    #[tokio::test]
    async fn unresolvable_host_is_tagged() {
        let outcome =
            TcpProbe::new().probe("no-such-host.invalid", Some(80), Duration::from_secs(5)).await;
        assert!(matches!(outcome.failure, Some(FailureKind::Unresolved | FailureKind::TimedOut)));
    }
}
