//! Admin headcount for a date.

use std::collections::HashSet;

use canteen_shared::{Confirmation, DashboardResponse, MealSlot, WorkLocation};
use chrono::NaiveDate;
use diesel_async::AsyncPgConnection;

use crate::db::{confirmations, profiles};
use crate::notifications::dispatch::{self, Recipient};

pub async fn build(conn: &mut AsyncPgConnection, date: NaiveDate) -> anyhow::Result<DashboardResponse> {
    let rows = confirmations::list_for_date(conn, date).await?;
    let subscribed: Vec<Recipient> = profiles::list_subscribed_at(conn, WorkLocation::MainOffice)
        .await?
        .into_iter()
        .map(Recipient::from)
        .collect();

    Ok(summarize(date, &rows, subscribed))
}

/// Count responses and opt-ins per slot, plus how many office subscribers
/// would still be reminded.
pub fn summarize(date: NaiveDate, rows: &[Confirmation], subscribed_office: Vec<Recipient>) -> DashboardResponse {
    let count = |slot: MealSlot| rows.iter().filter(|c| c.is_opted_in(slot)).count() as i64;

    let responded: HashSet<_> = rows.iter().map(|c| c.user_id).collect();
    let subscribed_office_users = subscribed_office
        .iter()
        .map(|r| r.user_id)
        .collect::<HashSet<_>>()
        .len() as i64;
    let pending = dispatch::notify_set(subscribed_office, &responded);

    let [breakfast, lunch, snack, dinner] = MealSlot::ALL.map(count);

    DashboardResponse {
        date,
        responded: responded.len() as i64,
        breakfast,
        lunch,
        snack,
        dinner,
        subscribed_office_users,
        pending_reminders: pending.len() as i64,
    }
}
