//! End-to-end reachability checks against loopback sockets.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ipcheck::probe::{Probe, TcpProbe, UdpProbe};
use ipcheck::prober::ProbeSet;
use ipcheck::{
    CheckStatus, EchoCapability, FailureKind, HybridProber, ProbeMethod, ProbeOutcome, ProbePolicy,
    Target,
};
use tokio::net::TcpListener;

/// Echo that never gets a reply
struct SilentEcho;

#[async_trait]
impl Probe for SilentEcho {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Ping
    }

    async fn probe(&self, _address: &str, _port: Option<u16>, _timeout: Duration) -> ProbeOutcome {
        ProbeOutcome::failure(ProbeMethod::Ping, None, FailureKind::TimedOut)
    }
}

async fn closed_tcp_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

fn loopback_prober(tcp_ports: Vec<u16>, udp_port: u16) -> HybridProber {
    let policy = ProbePolicy::builder()
        .tcp_ports(tcp_ports)
        .tcp_timeout_ms(1_000)
        .udp_port(udp_port)
        .udp_timeout_ms(300)
        .build();
    let probes = ProbeSet {
        echo: Arc::new(SilentEcho),
        tcp: Arc::new(TcpProbe::new()),
        udp: Arc::new(UdpProbe::new()),
    };
    HybridProber::with_probes(Arc::new(policy), EchoCapability::available(), probes)
}

#[tokio::test]
async fn open_non_default_port_is_online_via_tcp() {
    let _ = tracing_subscriber::fmt::try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();
    let closed = closed_tcp_port().await;

    let prober = loopback_prober(vec![closed, open], closed);
    let result = prober.check(Target::new("127.0.0.1")).await;

    assert_eq!(result.status, CheckStatus::Online);
    assert_eq!(result.outcome.method, ProbeMethod::Tcp);
    assert_eq!(result.outcome.port, Some(open));
    assert!(result.outcome.latency_ms > 0);
}

#[tokio::test]
async fn nothing_listening_is_never_online() {
    let first = closed_tcp_port().await;
    let second = closed_tcp_port().await;

    let prober = loopback_prober(vec![first, second], first);
    let result = prober.check(Target::new("127.0.0.1").with_field("groupA", "TowerA")).await;

    assert!(matches!(result.status, CheckStatus::Offline | CheckStatus::Timeout));
    assert_eq!(result.outcome.method, ProbeMethod::None);
    assert_eq!(result.outcome.latency_ms, 0);
    assert_eq!(result.target.field("groupA"), Some("TowerA"));
}

#[tokio::test]
async fn stable_targets_give_stable_statuses() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();
    let closed = closed_tcp_port().await;

    let online = loopback_prober(vec![open], closed);
    let offline = loopback_prober(vec![closed], closed);

    for _ in 0..2 {
        assert_eq!(online.check(Target::new("127.0.0.1")).await.status, CheckStatus::Online);
        assert_ne!(offline.check(Target::new("127.0.0.1")).await.status, CheckStatus::Online);
    }
}
