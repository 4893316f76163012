use chrono::{NaiveDate, Utc};
use diesel::dsl;
use diesel::prelude::*;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection, RunQueryDsl,
};
use canteen_shared::{
    Confirmation, DailyMenu, MealSlot, MenuItems, MenuTemplate, Profile, PushSubscriptionInfo,
    Role, WorkLocation,
};
use uuid::Uuid;

use crate::auth::types::NewProfile;
use crate::config::AppConfig;

pub type DbPool = Pool<AsyncPgConnection>;

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    // Hosted Postgres only accepts TLS connections
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    AsyncPgConnection::try_from(client).await
}

/// Build the connection pool. Connections are opened lazily on first use.
pub fn establish_connection_pool(config: &AppConfig) -> anyhow::Result<DbPool> {
    let manager = if config.database_tls {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup =
            Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));
        AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
            &config.database_url,
            manager_config,
        )
    } else {
        AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url)
    };

    let pool = Pool::builder(manager)
        .max_size(config.database_pool_size)
        .build()?;

    Ok(pool)
}

// Profile database operations
pub mod profiles {
    use super::*;

    pub async fn get_by_id(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        use crate::schema::profiles::dsl::*;

        let profile = profiles
            .filter(id.eq(profile_id))
            .first::<Profile>(conn)
            .await
            .optional()?;

        Ok(profile)
    }

    /// Create the profile as an employee unless a row already exists, then
    /// return the stored row.
    pub async fn insert_if_absent(
        conn: &mut AsyncPgConnection,
        new: &NewProfile,
    ) -> anyhow::Result<Profile> {
        use crate::schema::profiles::dsl::*;

        diesel::insert_into(profiles)
            .values((
                id.eq(new.id),
                full_name.eq(&new.full_name),
                email.eq(&new.email),
                employee_id.eq(&new.employee_id),
                mobile_number.eq(&new.mobile_number),
                work_location.eq(new.work_location.as_str()),
                role.eq(Role::Employee.as_str()),
                created_at.eq(Utc::now()),
            ))
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;

        let profile = profiles.filter(id.eq(new.id)).first::<Profile>(conn).await?;

        Ok(profile)
    }

    pub async fn update_work_location(
        conn: &mut AsyncPgConnection,
        profile_id: Uuid,
        location: WorkLocation,
    ) -> anyhow::Result<Profile> {
        use crate::schema::profiles::dsl::*;

        let updated = diesel::update(profiles.filter(id.eq(profile_id)))
            .set(work_location.eq(location.as_str()))
            .get_result::<Profile>(conn)
            .await?;

        Ok(updated)
    }

    /// Profiles at `location` joined to their subscription. Profiles without
    /// one never appear.
    #[dsl::auto_type]
    pub(crate) fn subscribed_at_query(location: String) -> _ {
        crate::schema::profiles::table
            .inner_join(crate::schema::push_subscriptions::table)
            .filter(crate::schema::profiles::work_location.eq(location))
            .select((
                crate::schema::profiles::id,
                crate::schema::push_subscriptions::subscription,
            ))
    }

    /// Users at `location` that have a push subscription, with that subscription.
    pub async fn list_subscribed_at(
        conn: &mut AsyncPgConnection,
        location: WorkLocation,
    ) -> anyhow::Result<Vec<(Uuid, PushSubscriptionInfo)>> {
        let rows = subscribed_at_query(location.as_str().to_string())
            .load::<(Uuid, PushSubscriptionInfo)>(conn)
            .await?;

        Ok(rows)
    }
}

// Push subscription database operations
pub mod push_subscriptions {
    use super::*;

    /// Store the caller's subscription; a newer subscription replaces the old one.
    pub async fn upsert(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        info: &PushSubscriptionInfo,
    ) -> anyhow::Result<()> {
        use crate::schema::push_subscriptions::dsl::*;

        let now = Utc::now();
        diesel::insert_into(push_subscriptions)
            .values((
                user_id.eq(user_id_val),
                subscription.eq(info),
                updated_at.eq(now),
            ))
            .on_conflict(user_id)
            .do_update()
            .set((subscription.eq(info), updated_at.eq(now)))
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn list_all(
        conn: &mut AsyncPgConnection,
    ) -> anyhow::Result<Vec<(Uuid, PushSubscriptionInfo)>> {
        use crate::schema::push_subscriptions::dsl::*;

        let rows = push_subscriptions
            .select((user_id, subscription))
            .load::<(Uuid, PushSubscriptionInfo)>(conn)
            .await?;

        Ok(rows)
    }

    pub async fn delete(conn: &mut AsyncPgConnection, user_id_val: Uuid) -> anyhow::Result<bool> {
        use crate::schema::push_subscriptions::dsl::*;

        let deleted = diesel::delete(push_subscriptions.filter(user_id.eq(user_id_val)))
            .execute(conn)
            .await?;

        Ok(deleted > 0)
    }

    /// Matches `user`'s row only while it still holds `info`.
    #[dsl::auto_type]
    pub(crate) fn is_current(user: Uuid, info: PushSubscriptionInfo) -> _ {
        crate::schema::push_subscriptions::user_id
            .eq(user)
            .and(crate::schema::push_subscriptions::subscription.eq(info))
    }

    /// Delete each `(user, subscription)` pair that is still stored and
    /// return the users whose row went. A user who re-subscribed since keeps
    /// the newer subscription.
    pub async fn delete_stale(
        conn: &mut AsyncPgConnection,
        stale: &[(Uuid, PushSubscriptionInfo)],
    ) -> anyhow::Result<Vec<Uuid>> {
        use crate::schema::push_subscriptions::dsl::*;

        let mut deleted = Vec::new();
        for (user, info) in stale {
            let count = diesel::delete(push_subscriptions.filter(is_current(*user, info.clone())))
                .execute(conn)
                .await?;
            if count > 0 {
                deleted.push(*user);
            }
        }

        Ok(deleted)
    }
}

// Daily menu database operations
pub mod daily_menus {
    use super::*;

    pub async fn get(
        conn: &mut AsyncPgConnection,
        date: NaiveDate,
    ) -> anyhow::Result<Option<DailyMenu>> {
        use crate::schema::daily_menu::dsl::*;

        let menu = daily_menu
            .filter(menu_date.eq(date))
            .first::<DailyMenu>(conn)
            .await
            .optional()?;

        Ok(menu)
    }

    pub async fn upsert(
        conn: &mut AsyncPgConnection,
        date: NaiveDate,
        items: &MenuItems,
    ) -> anyhow::Result<DailyMenu> {
        use crate::schema::daily_menu::dsl::*;

        let now = Utc::now();
        let saved = diesel::insert_into(daily_menu)
            .values((
                menu_date.eq(date),
                item_breakfast.eq(&items.breakfast),
                item_lunch.eq(&items.lunch),
                item_snack.eq(&items.snack),
                item_dinner.eq(&items.dinner),
                updated_at.eq(now),
            ))
            .on_conflict(menu_date)
            .do_update()
            .set((
                item_breakfast.eq(&items.breakfast),
                item_lunch.eq(&items.lunch),
                item_snack.eq(&items.snack),
                item_dinner.eq(&items.dinner),
                updated_at.eq(now),
            ))
            .get_result::<DailyMenu>(conn)
            .await?;

        Ok(saved)
    }

    /// Insert `items` for `date` unless a menu already exists, then return
    /// whatever is stored.
    pub async fn insert_if_absent(
        conn: &mut AsyncPgConnection,
        date: NaiveDate,
        items: &MenuItems,
    ) -> anyhow::Result<DailyMenu> {
        use crate::schema::daily_menu::dsl::*;

        diesel::insert_into(daily_menu)
            .values((
                menu_date.eq(date),
                item_breakfast.eq(&items.breakfast),
                item_lunch.eq(&items.lunch),
                item_snack.eq(&items.snack),
                item_dinner.eq(&items.dinner),
                updated_at.eq(Utc::now()),
            ))
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;

        let menu = daily_menu
            .filter(menu_date.eq(date))
            .first::<DailyMenu>(conn)
            .await?;

        Ok(menu)
    }
}

// Weekly template database operations
pub mod menu_templates {
    use super::*;

    pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<MenuTemplate>> {
        use crate::schema::menu_templates::dsl::*;

        let templates = menu_templates
            .order_by(day_of_week.asc())
            .load::<MenuTemplate>(conn)
            .await?;

        Ok(templates)
    }

    pub async fn get(
        conn: &mut AsyncPgConnection,
        day: i32,
    ) -> anyhow::Result<Option<MenuTemplate>> {
        use crate::schema::menu_templates::dsl::*;

        let template = menu_templates
            .filter(day_of_week.eq(day))
            .first::<MenuTemplate>(conn)
            .await
            .optional()?;

        Ok(template)
    }

    pub async fn upsert(
        conn: &mut AsyncPgConnection,
        day: i32,
        items: &MenuItems,
    ) -> anyhow::Result<MenuTemplate> {
        use crate::schema::menu_templates::dsl::*;

        let now = Utc::now();
        let saved = diesel::insert_into(menu_templates)
            .values((
                day_of_week.eq(day),
                item_breakfast.eq(&items.breakfast),
                item_lunch.eq(&items.lunch),
                item_snack.eq(&items.snack),
                item_dinner.eq(&items.dinner),
                updated_at.eq(now),
            ))
            .on_conflict(day_of_week)
            .do_update()
            .set((
                item_breakfast.eq(&items.breakfast),
                item_lunch.eq(&items.lunch),
                item_snack.eq(&items.snack),
                item_dinner.eq(&items.dinner),
                updated_at.eq(now),
            ))
            .get_result::<MenuTemplate>(conn)
            .await?;

        Ok(saved)
    }
}

// Confirmation database operations
pub mod confirmations {
    use super::*;

    pub async fn get(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        date: NaiveDate,
    ) -> anyhow::Result<Option<Confirmation>> {
        use crate::schema::confirmations::dsl::*;

        let row = confirmations
            .filter(user_id.eq(user_id_val))
            .filter(menu_date.eq(date))
            .first::<Confirmation>(conn)
            .await
            .optional()?;

        Ok(row)
    }

    /// Set a single meal flag, creating the row if needed.
    ///
    /// Only the named column is written on conflict, so concurrent toggles of
    /// different slots never overwrite each other.
    pub async fn set_slot(
        conn: &mut AsyncPgConnection,
        user_id_val: Uuid,
        date: NaiveDate,
        slot: MealSlot,
        opted_in: bool,
    ) -> anyhow::Result<Confirmation> {
        use crate::schema::confirmations::dsl::*;

        let now = Utc::now();

        macro_rules! upsert_slot {
            ($column:ident) => {
                diesel::insert_into(confirmations)
                    .values((
                        user_id.eq(user_id_val),
                        menu_date.eq(date),
                        $column.eq(opted_in),
                        updated_at.eq(now),
                    ))
                    .on_conflict((user_id, menu_date))
                    .do_update()
                    .set(($column.eq(opted_in), updated_at.eq(now)))
                    .get_result::<Confirmation>(conn)
                    .await?
            };
        }

        let row = match slot {
            MealSlot::Breakfast => upsert_slot!(opt_in_breakfast),
            MealSlot::Lunch => upsert_slot!(opt_in_lunch),
            MealSlot::Snack => upsert_slot!(opt_in_snack),
            MealSlot::Dinner => upsert_slot!(opt_in_dinner),
        };

        Ok(row)
    }

    pub async fn list_for_date(
        conn: &mut AsyncPgConnection,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Confirmation>> {
        use crate::schema::confirmations::dsl::*;

        let rows = confirmations
            .filter(menu_date.eq(date))
            .load::<Confirmation>(conn)
            .await?;

        Ok(rows)
    }

    /// Users who have responded for `date`, whatever their flags.
    pub async fn user_ids_for_date(
        conn: &mut AsyncPgConnection,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Uuid>> {
        use crate::schema::confirmations::dsl::*;

        let ids = confirmations
            .filter(menu_date.eq(date))
            .select(user_id)
            .load::<Uuid>(conn)
            .await?;

        Ok(ids)
    }
}

// Reminder run markers
pub mod reminder_runs {
    use super::*;

    /// Claim the reminder run for `date`. Returns false when another pass
    /// already claimed it.
    pub async fn claim(conn: &mut AsyncPgConnection, date: NaiveDate) -> anyhow::Result<bool> {
        use crate::schema::reminder_runs::dsl::*;

        let inserted = diesel::insert_into(reminder_runs)
            .values((run_date.eq(date), started_at.eq(Utc::now())))
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;

        Ok(inserted == 1)
    }

    pub async fn release(conn: &mut AsyncPgConnection, date: NaiveDate) -> anyhow::Result<()> {
        use crate::schema::reminder_runs::dsl::*;

        diesel::delete(reminder_runs.filter(run_date.eq(date)))
            .execute(conn)
            .await?;

        Ok(())
    }
}
