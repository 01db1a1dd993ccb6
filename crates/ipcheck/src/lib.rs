//! ipcheck - multi-strategy host reachability prober
//!
//! This library decides whether a batch of hosts is reachable by cascading
//! through echo (ping), TCP connect and UDP probes, and turns the verdicts
//! into filterable, exportable reports.

pub mod config;
pub mod error;
pub mod ingest;
pub mod probe;
pub mod prober;
pub mod report;
pub mod scheduler;
pub mod service;
pub mod types;

// Re-export main types
pub use config::ProbePolicy;
pub use error::{ConfigError, ServiceError};
pub use probe::EchoCapability;
pub use prober::HybridProber;
pub use scheduler::{BatchProgress, BatchScheduler};
pub use service::CheckService;
pub use types::{CheckResult, CheckStatus, FailureKind, ProbeMethod, ProbeOutcome, Target};

/// Default port the HTTP front end listens on
pub const DEFAULT_HTTP_PORT: u16 = 3001;
