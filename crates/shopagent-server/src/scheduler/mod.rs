//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! fixed-interval catalog refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::refresh::Refresher;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    refresher: Arc<Refresher>,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_refresh_job(&scheduler, refresher, interval).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the catalog refresh job, run every `interval`.
async fn register_refresh_job(
    scheduler: &JobScheduler,
    refresher: Arc<Refresher>,
    interval: Duration,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let refresher = Arc::clone(&refresher);

        Box::pin(async move {
            tracing::info!("scheduler: starting catalog refresh");
            refresher.refresh_all().await;
            tracing::info!("scheduler: catalog refresh complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        interval_secs = interval.as_secs(),
        "scheduler: registered catalog refresh job"
    );
    Ok(())
}
