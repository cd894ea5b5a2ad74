use crate::config::ScheduleConfig;
use crate::models::validate_requests;
use crate::pipeline::Pipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Runs the configured batch on a fixed interval until the task is dropped or aborted.
pub fn start_scheduled_job(schedule: ScheduleConfig, pipeline: Arc<Pipeline>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let requests = match validate_requests(schedule.images) {
            Ok(requests) => requests,
            Err(e) => {
                log::error!("Scheduled job not started: {}", e);
                return;
            }
        };
        let period = Duration::from_secs(schedule.interval_secs);
        let start = if schedule.run_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "Scheduled {} subject(s) every {}s",
            requests.len(),
            schedule.interval_secs
        );

        loop {
            ticker.tick().await;
            log::info!("Scheduled run starting");
            match pipeline.run(&requests).await {
                Ok(manifest) => log::info!("Scheduled run stored {} subject(s)", manifest.len()),
                Err(e) => log::error!("Scheduled run failed: {}", e),
            }
        }
    })
}
