//! Recipient selection and bounded fan-out.

use std::collections::HashSet;

use canteen_shared::{DeliveryFailure, DispatchReport, PushSubscriptionInfo};
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use super::push::{DeliveryError, PushMessage, PushSender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub user_id: Uuid,
    pub subscription: PushSubscriptionInfo,
}

impl From<(Uuid, PushSubscriptionInfo)> for Recipient {
    fn from((user_id, subscription): (Uuid, PushSubscriptionInfo)) -> Self {
        Self {
            user_id,
            subscription,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Gone(String),
    Failed(String),
}

/// Subscribed users that have not responded for the day, one entry per user.
pub fn notify_set(subscribed: Vec<Recipient>, responded: &HashSet<Uuid>) -> Vec<Recipient> {
    let mut seen = HashSet::new();
    subscribed
        .into_iter()
        .filter(|r| !responded.contains(&r.user_id) && seen.insert(r.user_id))
        .collect()
}

/// Send `message` to every recipient with at most `max_concurrency` requests
/// in flight. Every recipient gets an outcome; no failure stops the others.
pub async fn send_all<'a>(
    sender: &dyn PushSender,
    recipients: &'a [Recipient],
    message: &PushMessage,
    max_concurrency: usize,
) -> Vec<(&'a Recipient, DeliveryOutcome)> {
    let sends: Vec<_> = recipients
        .iter()
        .map(|recipient| send_one(sender, recipient, message))
        .collect();

    stream::iter(sends)
        .buffer_unordered(max_concurrency.max(1))
        .collect()
        .await
}

async fn send_one<'a>(
    sender: &dyn PushSender,
    recipient: &'a Recipient,
    message: &PushMessage,
) -> (&'a Recipient, DeliveryOutcome) {
    let outcome = match sender.send(&recipient.subscription, message).await {
        Ok(()) => DeliveryOutcome::Delivered,
        Err(DeliveryError::Gone(reason)) => DeliveryOutcome::Gone(reason),
        Err(DeliveryError::Failed(reason)) => DeliveryOutcome::Failed(reason),
    };
    (recipient, outcome)
}

/// Fold outcomes into a report. Returns the report and the exact
/// subscriptions that should be pruned.
pub fn summarize(outcomes: Vec<(&Recipient, DeliveryOutcome)>) -> (DispatchReport, Vec<Recipient>) {
    let mut report = DispatchReport {
        attempted: outcomes.len(),
        ..Default::default()
    };
    let mut dead = Vec::new();

    for (recipient, outcome) in outcomes {
        let user_id = recipient.user_id;
        match outcome {
            DeliveryOutcome::Delivered => report.sent += 1,
            DeliveryOutcome::Gone(reason) => {
                tracing::info!("Subscription for {} is gone: {}", user_id, reason);
                report.failed += 1;
                dead.push(recipient.clone());
                report.failures.push(DeliveryFailure {
                    user_id,
                    reason,
                    pruned: false,
                });
            }
            DeliveryOutcome::Failed(reason) => {
                tracing::warn!("Push to {} failed: {}", user_id, reason);
                report.failed += 1;
                report.failures.push(DeliveryFailure {
                    user_id,
                    reason,
                    pruned: false,
                });
            }
        }
    }

    (report, dead)
}
