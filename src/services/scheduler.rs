use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::services::update_checker::UpdateChecker;

const JOB_NAME: &str = "check_updates";

pub struct Scheduler {
    checker: Arc<UpdateChecker>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
    /// Held for the duration of a check; ticks that find it taken are skipped.
    in_flight: Arc<Mutex<()>>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(checker: Arc<UpdateChecker>, config: SchedulerConfig) -> Self {
        Self {
            checker,
            config,
            running: Arc::new(RwLock::new(false)),
            in_flight: Arc::new(Mutex::new(())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that cancels the scheduler loop and any in-flight check.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Update scheduler disabled (scheduler.enabled = false)");
            return Ok(());
        }

        *self.running.write().await = true;
        info!(job_name = JOB_NAME, "Starting update scheduler");

        let result = if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        };

        *self.running.write().await = false;
        result
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let checker = Arc::clone(&self.checker);
        let running = Arc::clone(&self.running);
        let in_flight = Arc::clone(&self.in_flight);
        let shutdown = self.shutdown.clone();

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let checker = Arc::clone(&checker);
            let running = Arc::clone(&running);
            let in_flight = Arc::clone(&in_flight);
            let shutdown = shutdown.clone();
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_check(&checker, &in_flight, &shutdown).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!(job_name = JOB_NAME, cron = cron_expr, "Update checks scheduled by cron");

        self.shutdown.cancelled().await;

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let minutes = self.config.check_interval_minutes.max(1);
        info!(job_name = JOB_NAME, every_minutes = minutes, "Update checks scheduled by interval");

        let mut ticks = interval(Duration::from_secs(u64::from(minutes) * 60));

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                _ = ticks.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    run_check(&self.checker, &self.in_flight, &self.shutdown).await;
                }
            }
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!(job_name = JOB_NAME, "Stopping update scheduler");
        *self.running.write().await = false;
        self.shutdown.cancel();
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Runs a check right away, waiting for a scheduled one to finish first.
    pub async fn run_once(&self) -> Result<()> {
        let _guard = self.in_flight.lock().await;
        info!(job_name = JOB_NAME, "Running update check now");
        self.checker.check_all(&self.shutdown).await?;
        Ok(())
    }
}

/// Returns `false` when another check still holds `in_flight`.
async fn run_check(
    checker: &UpdateChecker,
    in_flight: &Mutex<()>,
    cancel: &CancellationToken,
) -> bool {
    let Ok(_guard) = in_flight.try_lock() else {
        warn!(
            event = "job_skipped",
            job_name = JOB_NAME,
            "Previous update check still running, skipping this tick"
        );
        return false;
    };

    let start = std::time::Instant::now();
    info!(event = "job_started", job_name = JOB_NAME, "Starting scheduled update check");

    match checker.check_all(cancel).await {
        Ok(summary) => info!(
            event = "job_finished",
            job_name = JOB_NAME,
            episode_updates = summary.episode_updates,
            new_seasons = summary.new_seasons,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Scheduled update check finished"
        ),
        Err(e) => error!(
            event = "job_failed",
            job_name = JOB_NAME,
            error = %e,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Scheduled update check failed"
        ),
    }
    true
}
