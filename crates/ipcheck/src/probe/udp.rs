use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

use super::{Probe, classify_io_error, resolve};
use crate::types::{FailureKind, ProbeMethod, ProbeOutcome};

/// DNS query for the root zone's NS records: header (id, RD flag, one
/// question) followed by the empty root name, QTYPE=NS, QCLASS=IN.
const DNS_ROOT_QUERY: [u8; 17] = [
    0x69, 0x70, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00,
    0x01,
];

/// UDP datagram probe
///
/// The weakest signal of the three: only an inbound datagram counts as
/// reachable. Silence is a timeout, an ICMP port-unreachable surfacing as a
/// receive error is a refusal.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpProbe;

impl UdpProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for UdpProbe {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Udp
    }

    async fn probe(&self, address: &str, port: Option<u16>, deadline: Duration) -> ProbeOutcome {
        let Some(port) = port else {
            return ProbeOutcome::failure(ProbeMethod::Udp, None, FailureKind::Io);
        };

        let start = Instant::now();
        let exchange = async {
            let addr = resolve(address, port).await?;
            let local: SocketAddr = if addr.is_ipv4() {
                (Ipv4Addr::UNSPECIFIED, 0).into()
            } else {
                (Ipv6Addr::UNSPECIFIED, 0).into()
            };

            let socket = UdpSocket::bind(local).await.map_err(|e| classify_io_error(&e))?;
            socket.connect(addr).await.map_err(|e| classify_io_error(&e))?;
            socket.send(&DNS_ROOT_QUERY).await.map_err(|e| classify_io_error(&e))?;

            let mut buf = [0u8; 512];
            socket.recv(&mut buf).await.map_err(|e| classify_io_error(&e))
        };

        let outcome = match timeout(deadline, exchange).await {
            Ok(Ok(_)) => {
                let latency = start.elapsed().as_millis() as u64;
                ProbeOutcome::success(ProbeMethod::Udp, latency, Some(port))
            }
            Ok(Err(kind)) => ProbeOutcome::failure(ProbeMethod::Udp, Some(port), kind),
            Err(_) => ProbeOutcome::failure(ProbeMethod::Udp, Some(port), FailureKind::TimedOut),
        };

        debug!(address, port, reachable = outcome.reachable, failure = ?outcome.failure, "udp probe");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn any_reply_counts_as_reachable() {
        let responder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = responder.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            if let Ok((len, peer)) = responder.recv_from(&mut buf).await {
                assert_eq!(len, DNS_ROOT_QUERY.len());
                let _ = responder.send_to(b"ok", peer).await;
            }
        });

        let outcome = UdpProbe::new().probe("127.0.0.1", Some(port), Duration::from_secs(2)).await;

        assert!(outcome.reachable);
        assert_eq!(outcome.method, ProbeMethod::Udp);
        assert_eq!(outcome.port, Some(port));
    }

    #[tokio::test]
    async fn silence_is_a_timeout() {
        // Bound but never answers
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();

        let outcome = UdpProbe::new().probe("127.0.0.1", Some(port), Duration::from_millis(200)).await;

        assert!(!outcome.reachable);
        assert_eq!(outcome.failure, Some(FailureKind::TimedOut));
        drop(silent);
    }

    #[tokio::test]
    async fn closed_port_never_counts_as_reachable() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        drop(socket);

        let outcome = UdpProbe::new().probe("127.0.0.1", Some(port), Duration::from_millis(300)).await;

        assert!(!outcome.reachable);
        assert!(matches!(outcome.failure, Some(FailureKind::Refused | FailureKind::TimedOut)));
    }
}
