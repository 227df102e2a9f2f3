use crate::core::pipeline::{RunSummary, SnapshotPipeline};
use crate::utils::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Another invocation is already in flight; this one was skipped.
    AlreadyRunning,
}

/// Serializes pipeline invocations: scheduled ticks and manual triggers share
/// one in-flight flag, and whoever loses the race is skipped rather than
/// queued. A queued run would only re-fetch the same upstream state moments
/// later.
pub struct PipelineRunner {
    pipeline: SnapshotPipeline,
    running: AtomicBool,
}

impl PipelineRunner {
    pub fn new(pipeline: SnapshotPipeline) -> Self {
        Self {
            pipeline,
            running: AtomicBool::new(false),
        }
    }

    pub async fn try_run(&self) -> Result<RunOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::info!("Snapshot run already in flight, skipping trigger");
            return Ok(RunOutcome::AlreadyRunning);
        }

        let result = self.pipeline.run().await;
        self.running.store(false, Ordering::SeqCst);

        result.map(RunOutcome::Completed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Drive the runner on a fixed interval, optionally firing immediately at
/// startup. Failures are logged and swallowed; the previous snapshots stay in
/// place until a later run succeeds.
pub async fn run_scheduler(runner: Arc<PipelineRunner>, interval: Duration, run_at_start: bool) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    if !run_at_start {
        ticker.tick().await;
    }

    loop {
        ticker.tick().await;
        match runner.try_run().await {
            Ok(RunOutcome::Completed(summary)) => {
                tracing::info!(
                    "Scheduled run done: {} records / {} customers from {} pages",
                    summary.records,
                    summary.customers,
                    summary.pages_fetched
                );
            }
            Ok(RunOutcome::AlreadyRunning) => {}
            Err(e) => {
                tracing::error!("Scheduled run failed, keeping previous snapshots: {}", e);
            }
        }
    }
}
