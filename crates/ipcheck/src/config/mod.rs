//! Probe policy configuration.
//!
//! The policy is read once at process start and shared read-only by every
//! prober afterwards.

mod file;
mod methods;
mod types;

pub use file::default_config_path;
pub use types::{EchoSettings, ProbePolicy, ProbePolicyBuilder, TcpSettings, UdpSettings};
