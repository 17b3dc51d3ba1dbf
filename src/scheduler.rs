use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::SchedulerConfig;
use crate::poller::{PassSummary, StockPoller};
use crate::utils::error::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub completed_runs: u64,
    pub failed_runs: u64,
    pub skipped_runs: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub uptime_seconds: u64,
}

/// Triggers a pass over the item list every `interval_secs`. The poller sits
/// behind an async mutex; a trigger that finds it locked is skipped.
pub struct PollScheduler {
    scheduler: JobScheduler,
    poller: Arc<Mutex<StockPoller>>,
    stats: Arc<RwLock<SchedulerStats>>,
    interval: Duration,
    start_time: DateTime<Utc>,
}

impl PollScheduler {
    pub async fn new(poller: Arc<Mutex<StockPoller>>, config: &SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            poller,
            stats: Arc::new(RwLock::new(SchedulerStats::default())),
            interval: Duration::from_secs(config.interval_secs),
            start_time: Utc::now(),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn start(&mut self) -> Result<()> {
        let poller = Arc::clone(&self.poller);
        let stats = Arc::clone(&self.stats);

        let job = Job::new_repeated_async(self.interval, move |_uuid, _l| {
            let poller = Arc::clone(&poller);
            let stats = Arc::clone(&stats);

            Box::pin(async move {
                if let Err(e) = Self::execute_pass(poller, stats).await {
                    tracing::error!("Check failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;
        tracing::info!("Poll scheduler started, checking every {}s", self.interval.as_secs());
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        tracing::info!("Poll scheduler shutdown");
        Ok(())
    }

    /// Runs a pass outside of the schedule. `Ok(None)` means another pass
    /// held the poller and this one was skipped.
    pub async fn run_now(&self) -> Result<Option<PassSummary>> {
        Self::execute_pass(Arc::clone(&self.poller), Arc::clone(&self.stats)).await
    }

    pub async fn get_stats(&self) -> SchedulerStats {
        let mut stats = self.stats.read().await.clone();
        stats.uptime_seconds = Utc::now()
            .signed_duration_since(self.start_time)
            .num_seconds()
            .max(0) as u64;
        stats
    }

    async fn execute_pass(
        poller: Arc<Mutex<StockPoller>>,
        stats: Arc<RwLock<SchedulerStats>>,
    ) -> Result<Option<PassSummary>> {
        let Ok(mut poller) = poller.try_lock() else {
            tracing::warn!("Previous check still running, skipping this trigger");
            stats.write().await.skipped_runs += 1;
            return Ok(None);
        };

        let result = poller.check_once().await;

        let mut stats = stats.write().await;
        stats.last_run = Some(Utc::now());
        match result {
            Ok(summary) => {
                stats.completed_runs += 1;
                stats.last_error = None;
                Ok(Some(summary))
            }
            Err(e) => {
                stats.failed_runs += 1;
                stats.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
