//! Reminder and broadcast orchestration.

use std::sync::Arc;

use canteen_shared::{CutoffPolicy, DispatchReport, NotificationResponse, WorkLocation};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use super::dispatch::{self, Recipient};
use super::push::{PushMessage, PushSender};
use super::store::NotificationStore;

pub const BROADCAST_MAX_LEN: usize = 1000;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Message content is required.")]
    EmptyMessage,

    #[error("Message must be at most 1000 characters")]
    MessageTooLong,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    sender: Arc<dyn PushSender>,
    cutoff: CutoffPolicy,
    max_concurrency: usize,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        sender: Arc<dyn PushSender>,
        cutoff: CutoffPolicy,
        max_concurrency: usize,
    ) -> Self {
        Self {
            store,
            sender,
            cutoff,
            max_concurrency,
        }
    }

    pub fn cutoff(&self) -> &CutoffPolicy {
        &self.cutoff
    }

    /// Main-office users with a subscription who have not responded for `date`.
    pub async fn pending_reminders(&self, date: NaiveDate) -> anyhow::Result<Vec<Recipient>> {
        let subscribed = self.store.subscribed_at(WorkLocation::MainOffice).await?;
        let responded = self.store.responded(date).await?;
        Ok(dispatch::notify_set(subscribed, &responded))
    }

    /// Remind everyone who still has to respond for the org-local day of `now`.
    pub async fn send_daily_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<NotificationResponse, NotificationError> {
        let today = self.cutoff.today(now);
        let recipients = self.pending_reminders(today).await?;

        if recipients.is_empty() {
            tracing::info!("No pending reminders for {}", today);
            return Ok(NotificationResponse {
                message: "All users have confirmed. No notifications sent.".to_string(),
                report: DispatchReport::default(),
            });
        }

        tracing::info!("Sending {} reminders for {}", recipients.len(), today);
        let report = self
            .deliver(&recipients, &PushMessage::reminder(&self.cutoff))
            .await;

        Ok(NotificationResponse {
            message: format!("Sent {} push reminders.", report.sent),
            report,
        })
    }

    /// Scheduled entry point: at most one pass per org-local day.
    ///
    /// Returns `None` when the day's run was already claimed. A pass that
    /// fails before sending anything gives the claim back so a later run can
    /// retry the day.
    pub async fn run_scheduled_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<NotificationResponse>, NotificationError> {
        let today = self.cutoff.today(now);
        if !self.store.claim_reminder_run(today).await? {
            tracing::info!("Reminder run for {} already claimed, skipping", today);
            return Ok(None);
        }

        match self.send_daily_reminders(now).await {
            Ok(response) => Ok(Some(response)),
            Err(e) => {
                if let Err(release) = self.store.release_reminder_run(today).await {
                    tracing::error!("Failed to release reminder run for {}: {:#}", today, release);
                }
                Err(e)
            }
        }
    }

    /// Send `message` to every subscribed user.
    pub async fn broadcast(&self, message: &str) -> Result<NotificationResponse, NotificationError> {
        if message.trim().is_empty() {
            return Err(NotificationError::EmptyMessage);
        }
        if message.chars().count() > BROADCAST_MAX_LEN {
            return Err(NotificationError::MessageTooLong);
        }

        let recipients = dispatch::notify_set(
            self.store.all_subscribed().await?,
            &Default::default(),
        );
        tracing::info!("Broadcasting to {} subscribers", recipients.len());

        let report = self
            .deliver(&recipients, &PushMessage::broadcast(message))
            .await;

        Ok(NotificationResponse {
            message: format!("Sent broadcast to {} users.", report.sent),
            report,
        })
    }

    async fn deliver(&self, recipients: &[Recipient], message: &PushMessage) -> DispatchReport {
        let outcomes =
            dispatch::send_all(self.sender.as_ref(), recipients, message, self.max_concurrency)
                .await;
        let (mut report, dead) = dispatch::summarize(outcomes);

        if !dead.is_empty() {
            match self.store.prune(&dead).await {
                Ok(removed) => {
                    report.pruned = removed.len();
                    for failure in report.failures.iter_mut() {
                        failure.pruned = removed.contains(&failure.user_id);
                    }
                    tracing::info!("Pruned {} expired subscriptions", removed.len());
                }
                Err(e) => tracing::error!("Failed to prune expired subscriptions: {:#}", e),
            }
        }

        tracing::info!(
            "Dispatch finished: {} attempted, {} sent, {} failed",
            report.attempted,
            report.sent,
            report.failed
        );
        report
    }
}
