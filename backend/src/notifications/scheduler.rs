//! Daily reminder background task.
//!
//! Runs inside the backend process and fires once per org-local day at the
//! configured reminder time. The `reminder_runs` marker keeps replicas from
//! sending the same day's reminders twice. A process that starts after the
//! reminder time but before the cutoff runs the day's pass right away.

use std::sync::Arc;

use canteen_shared::CutoffPolicy;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::service::NotificationService;

/// Next instant strictly after `now` at which the local clock in `tz` reads `at`.
pub fn next_fire_time(now: DateTime<Utc>, tz: Tz, at: NaiveTime) -> DateTime<Utc> {
    let mut date = now.with_timezone(&tz).date_naive();
    loop {
        let naive = date.and_time(at);
        // A time skipped by a DST jump fires an hour later that day
        let local = tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest());

        if let Some(local) = local {
            let fire = local.with_timezone(&Utc);
            if fire > now {
                return fire;
            }
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => return now + Duration::days(1),
        };
    }
}

/// Whether today's fire time has passed while selections are still open.
pub fn missed_today(now: DateTime<Utc>, cutoff: &CutoffPolicy, at: NaiveTime) -> bool {
    let local = now.with_timezone(&cutoff.timezone);
    local.time() >= at && !cutoff.is_locked(local.date_naive(), now)
}

async fn run_pass(service: &NotificationService) {
    match service.run_scheduled_reminders(Utc::now()).await {
        Ok(Some(response)) => tracing::info!("Reminder pass: {}", response.message),
        Ok(None) => {}
        Err(e) => tracing::error!("Reminder pass failed: {:#}", e),
    }
}

/// Start the reminder background task
pub async fn start_reminder_task(service: Arc<NotificationService>, at: NaiveTime) {
    let tz = service.cutoff().timezone;
    tracing::info!("Starting reminder task (daily at {} {})", at.format("%H:%M"), tz);

    if missed_today(Utc::now(), service.cutoff(), at) {
        tracing::info!("Started after today's reminder time, running now");
        run_pass(&service).await;
    }

    loop {
        let now = Utc::now();
        let fire = next_fire_time(now, tz, at);
        tracing::debug!("Next reminder pass at {}", fire.with_timezone(&tz));

        let wait = (fire - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        run_pass(&service).await;
    }
}
