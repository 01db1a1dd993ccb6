//! Request service: validated entry points over the prober and scheduler.
//!
//! Input problems are rejected before probing starts. Probing problems never
//! surface as errors; they end up in each target's status.

pub mod validation;
pub mod wire;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use validation::{target_from_entry, validate_address, validate_batch_size};
pub use wire::{
    CheckBatchRequest, CheckOneRequest, CheckOneResponse, HealthResponse, InfoResponse, ResultRow,
};

use crate::config::ProbePolicy;
use crate::error::ServiceError;
use crate::probe::EchoCapability;
use crate::prober::HybridProber;
use crate::scheduler::{BatchProgress, BatchScheduler};
use crate::types::{CheckResult, ProbeMethod, Target};

/// Endpoints advertised by [`CheckService::info`]
pub const ENDPOINTS: [&str; 4] = [
    "POST /api/check-ip - Check a single address",
    "POST /api/check-multiple - Check a batch of addresses",
    "GET /health - Liveness and echo capability",
    "GET / - Service information",
];

/// Validated front door to the prober
#[derive(Clone)]
pub struct CheckService {
    prober: Arc<HybridProber>,
    scheduler: BatchScheduler,
    started: Instant,
}

impl CheckService {
    pub fn new(prober: Arc<HybridProber>) -> Self {
        let scheduler = BatchScheduler::new(Arc::clone(&prober));
        Self { prober, scheduler, started: Instant::now() }
    }

    /// Build a service with system probes for an already validated policy
    pub fn from_policy(policy: ProbePolicy, capability: EchoCapability) -> Self {
        Self::new(Arc::new(HybridProber::new(Arc::new(policy), capability)))
    }

    /// Check a single address
    pub async fn check_one(&self, request: CheckOneRequest) -> Result<CheckOneResponse, ServiceError> {
        let address = request.address.as_deref().map(str::trim).unwrap_or_default();
        validate_address(address)?;

        info!(address, "Handling single check");
        let target = Target::new(address);

        // Own task, so a fault inside probing only degrades this result
        let prober = Arc::clone(&self.prober);
        let result = match tokio::spawn({
            let target = target.clone();
            async move { prober.check(target).await }
        })
        .await
        {
            Ok(result) => result,
            Err(error) => {
                warn!(address, %error, "Probe task failed");
                CheckResult::errored(target)
            }
        };

        Ok(result.into())
    }

    /// Check a batch of entries, answering in input order
    pub async fn check_batch(&self, request: CheckBatchRequest) -> Result<Vec<ResultRow>, ServiceError> {
        let entries = request.entries.unwrap_or_default();
        validate_batch_size(entries.len(), self.prober.policy().max_batch_size)?;

        let targets = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| target_from_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = targets.len(), "Handling batch check");
        let results = self.scheduler.run(targets).await;
        Ok(results.into_iter().map(ResultRow::from).collect())
    }

    /// Check already parsed targets, validating every address first.
    ///
    /// Progress is reported after each window when a sender is given; once
    /// `cancel` fires the targets not yet probed come back as `error`.
    pub async fn check_targets(
        &self,
        targets: Vec<Target>,
        progress: Option<mpsc::Sender<BatchProgress>>,
        cancel: CancellationToken,
    ) -> Result<Vec<CheckResult>, ServiceError> {
        validate_batch_size(targets.len(), self.prober.policy().max_batch_size)?;
        for (index, target) in targets.iter().enumerate() {
            validate_address(&target.address)
                .map_err(|e| ServiceError::invalid(format!("entry {index}: {e}")))?;
        }

        info!(count = targets.len(), "Checking parsed targets");
        Ok(self.scheduler.run_with(targets, progress, cancel).await)
    }

    /// Process liveness and echo capability
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            healthy: true,
            uptime: self.started.elapsed().as_secs(),
            echo_probe_available: self.prober.capability().is_available(),
        }
    }

    /// Methods this process will actually try, plus the endpoint list
    pub fn info(&self) -> InfoResponse {
        let steps = self.prober.plan();
        let available_methods = self
            .prober
            .policy()
            .methods
            .iter()
            .copied()
            .filter(|method| steps.iter().any(|step| step.method() == *method))
            .collect::<Vec<ProbeMethod>>();

        InfoResponse {
            status: "ok".to_string(),
            available_methods,
            endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}
