use std::collections::HashSet;

use anyhow::Context;
use async_trait::async_trait;
use canteen_shared::WorkLocation;
use chrono::NaiveDate;
use diesel_async::{pooled_connection::deadpool::Object, AsyncPgConnection};
use uuid::Uuid;

use crate::db::{self, DbPool};

use super::dispatch::Recipient;

/// Data the notification service reads and writes.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Users at `location` with a stored push subscription
    async fn subscribed_at(&self, location: WorkLocation) -> anyhow::Result<Vec<Recipient>>;

    /// Every stored push subscription
    async fn all_subscribed(&self) -> anyhow::Result<Vec<Recipient>>;

    /// Users with a confirmation row for `date`
    async fn responded(&self, date: NaiveDate) -> anyhow::Result<HashSet<Uuid>>;

    /// Delete these exact subscriptions, returning the users whose
    /// subscription was removed. A user whose stored subscription has since
    /// changed keeps it.
    async fn prune(&self, dead: &[Recipient]) -> anyhow::Result<Vec<Uuid>>;

    /// Record that the scheduled reminder for `date` has started. False if it
    /// was already recorded.
    async fn claim_reminder_run(&self, date: NaiveDate) -> anyhow::Result<bool>;

    /// Drop the marker for `date` after a pass that sent nothing
    async fn release_reminder_run(&self, date: NaiveDate) -> anyhow::Result<()>;
}

pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> anyhow::Result<Object<AsyncPgConnection>> {
        self.pool
            .get()
            .await
            .context("Failed to get database connection")
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn subscribed_at(&self, location: WorkLocation) -> anyhow::Result<Vec<Recipient>> {
        let mut conn = self.conn().await?;
        let rows = db::profiles::list_subscribed_at(&mut conn, location).await?;
        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn all_subscribed(&self) -> anyhow::Result<Vec<Recipient>> {
        let mut conn = self.conn().await?;
        let rows = db::push_subscriptions::list_all(&mut conn).await?;
        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn responded(&self, date: NaiveDate) -> anyhow::Result<HashSet<Uuid>> {
        let mut conn = self.conn().await?;
        let ids = db::confirmations::user_ids_for_date(&mut conn, date).await?;
        Ok(ids.into_iter().collect())
    }

    async fn prune(&self, dead: &[Recipient]) -> anyhow::Result<Vec<Uuid>> {
        let stale: Vec<_> = dead
            .iter()
            .map(|r| (r.user_id, r.subscription.clone()))
            .collect();
        let mut conn = self.conn().await?;
        db::push_subscriptions::delete_stale(&mut conn, &stale).await
    }

    async fn claim_reminder_run(&self, date: NaiveDate) -> anyhow::Result<bool> {
        let mut conn = self.conn().await?;
        db::reminder_runs::claim(&mut conn, date).await
    }

    async fn release_reminder_run(&self, date: NaiveDate) -> anyhow::Result<()> {
        let mut conn = self.conn().await?;
        db::reminder_runs::release(&mut conn, date).await
    }
}
