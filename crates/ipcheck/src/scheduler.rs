//! Batch scheduler: fans the hybrid prober out over many targets.
//!
//! Targets are split into fixed-size windows. Windows run one after another;
//! inside a window every target is probed by its own task and the window ends
//! when all of them have finished. Results come back in input order.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::prober::HybridProber;
use crate::types::{CheckResult, Target};

/// Progress report sent after each completed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

/// Runs batches of checks with bounded concurrency
#[derive(Clone)]
pub struct BatchScheduler {
    prober: Arc<HybridProber>,
    width: usize,
}

impl BatchScheduler {
    /// Create a scheduler using the prober policy's concurrency width
    pub fn new(prober: Arc<HybridProber>) -> Self {
        let width = prober.policy().concurrency.max(1);
        Self { prober, width }
    }

    /// Check every target, returning one result per target in input order
    pub async fn run(&self, targets: Vec<Target>) -> Vec<CheckResult> {
        self.run_with(targets, None, CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), with optional progress reporting and
    /// cancellation. Once `cancel` fires, windows that have not started yet
    /// are not probed and their targets come back as `error` rows.
    pub async fn run_with(
        &self,
        targets: Vec<Target>,
        progress: Option<mpsc::Sender<BatchProgress>>,
        cancel: CancellationToken,
    ) -> Vec<CheckResult> {
        let total = targets.len();
        let mut results = Vec::with_capacity(total);
        let mut pending = targets.into_iter().peekable();

        info!(total, width = self.width, "Starting batch");

        while pending.peek().is_some() {
            let window: Vec<Target> = pending.by_ref().take(self.width).collect();

            if cancel.is_cancelled() {
                results.extend(window.into_iter().map(CheckResult::errored));
                continue;
            }

            let handles = window.iter().cloned().map(|target| {
                let prober = Arc::clone(&self.prober);
                tokio::spawn(async move { prober.check(target).await })
            });
            let joined = join_all(handles.collect::<Vec<_>>()).await;

            for (target, result) in window.into_iter().zip(joined) {
                match result {
                    Ok(result) => results.push(result),
                    Err(error) => {
                        warn!(address = %target.address, %error, "Probe task failed");
                        results.push(CheckResult::errored(target));
                    }
                }
            }

            debug!(completed = results.len(), total, "Window finished");
            if let Some(progress) = &progress {
                let update = BatchProgress { completed: results.len(), total };
                if progress.send(update).await.is_err() {
                    debug!("Progress receiver dropped");
                }
            }
        }

        info!(total, "Batch finished");
        results
    }
}
