//! Menu resolution and auto-fill.

use canteen_shared::{day_of_week, DailyMenu, MenuItems, MenuResponse, MenuSource, MenuTemplate};
use chrono::NaiveDate;
use diesel_async::AsyncPgConnection;

use crate::db::{daily_menus, menu_templates};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Name of a template day, `None` outside 0..=6
pub fn day_name(day: i32) -> Option<&'static str> {
    usize::try_from(day).ok().and_then(|d| DAY_NAMES.get(d).copied())
}

/// Pick the menu for `date`: a posted daily menu wins over the weekday
/// template, and with neither the items are empty.
pub fn resolve(date: NaiveDate, daily: Option<&DailyMenu>, template: Option<&MenuTemplate>) -> MenuResponse {
    let (source, items) = match (daily, template) {
        (Some(menu), _) => (MenuSource::Daily, menu.items()),
        (None, Some(template)) => (MenuSource::Template, template.items()),
        (None, None) => (MenuSource::None, MenuItems::default()),
    };

    MenuResponse {
        date,
        source,
        items,
    }
}

pub async fn resolve_menu(conn: &mut AsyncPgConnection, date: NaiveDate) -> anyhow::Result<MenuResponse> {
    let daily = daily_menus::get(conn, date).await?;
    if daily.is_some() {
        return Ok(resolve(date, daily.as_ref(), None));
    }

    let template = menu_templates::get(conn, day_of_week(date)).await?;
    Ok(resolve(date, None, template.as_ref()))
}

/// Create the daily menu for `date` from its weekday template.
///
/// An existing daily menu is returned untouched. `None` when there is neither
/// a daily menu nor a template.
pub async fn autofill(conn: &mut AsyncPgConnection, date: NaiveDate) -> anyhow::Result<Option<DailyMenu>> {
    if let Some(existing) = daily_menus::get(conn, date).await? {
        return Ok(Some(existing));
    }

    let Some(template) = menu_templates::get(conn, day_of_week(date)).await? else {
        return Ok(None);
    };

    let menu = daily_menus::insert_if_absent(conn, date, &template.items()).await?;
    tracing::info!("Filled menu for {} from the {} template", date, menu_label(date));
    Ok(Some(menu))
}

fn menu_label(date: NaiveDate) -> &'static str {
    day_name(day_of_week(date)).unwrap_or("weekday")
}
