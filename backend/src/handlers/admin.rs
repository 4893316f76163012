//! Menu planning and dashboard handlers. All routes here require an admin.

use axum::extract::{Json, Path, Query, State};
use canteen_shared::{
    DashboardQuery, DashboardResponse, MenuItems, MenuResponse, MenuSource, SaveMenuRequest,
    TemplateResponse,
};
use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::db::{daily_menus, menu_templates};
use crate::error::{ApiError, ApiResult};
use crate::services::{dashboard, menu};
use crate::state::AppState;

/// Menu for `date` as the planner should pre-fill it
pub async fn get_menu(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Json<MenuResponse>> {
    let mut conn = state.pool.get().await?;
    Ok(Json(menu::resolve_menu(&mut conn, date).await?))
}

pub async fn save_menu(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<SaveMenuRequest>,
) -> ApiResult<Json<MenuResponse>> {
    payload.validate()?;

    let mut conn = state.pool.get().await?;
    let saved = daily_menus::upsert(&mut conn, date, &payload.into_items()).await?;

    tracing::info!("Saved menu for {}", date);
    Ok(Json(MenuResponse {
        date,
        source: MenuSource::Daily,
        items: saved.items(),
    }))
}

pub async fn autofill_menu(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Json<MenuResponse>> {
    let mut conn = state.pool.get().await?;
    let filled = menu::autofill(&mut conn, date).await?.ok_or_else(|| {
        let day = menu::day_name(canteen_shared::day_of_week(date)).unwrap_or("weekday");
        ApiError::not_found(format!("{} template", day))
    })?;

    Ok(Json(MenuResponse {
        date,
        source: MenuSource::Daily,
        items: filled.items(),
    }))
}

/// One entry per weekday, empty where no template was saved
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<TemplateResponse>>> {
    let mut conn = state.pool.get().await?;
    let saved = menu_templates::list_all(&mut conn).await?;

    let templates = (0..7)
        .filter_map(|day| {
            let day_name = menu::day_name(day)?;
            let items = saved
                .iter()
                .find(|t| t.day_of_week == day)
                .map(|t| t.items())
                .unwrap_or_else(MenuItems::default);
            Some(TemplateResponse {
                day_of_week: day,
                day_name: day_name.to_string(),
                items,
            })
        })
        .collect();

    Ok(Json(templates))
}

pub async fn save_template(
    State(state): State<AppState>,
    Path(day): Path<i32>,
    Json(payload): Json<SaveMenuRequest>,
) -> ApiResult<Json<TemplateResponse>> {
    let day_name = menu::day_name(day).ok_or_else(|| {
        ApiError::bad_request("day must be between 0 (Sunday) and 6 (Saturday)")
    })?;
    payload.validate()?;

    let mut conn = state.pool.get().await?;
    let saved = menu_templates::upsert(&mut conn, day, &payload.into_items()).await?;

    tracing::info!("Saved {} template", day_name);
    Ok(Json(TemplateResponse {
        day_of_week: day,
        day_name: day_name.to_string(),
        items: saved.items(),
    }))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardResponse>> {
    let date = query
        .date
        .unwrap_or_else(|| state.config.cutoff.today(Utc::now()));

    let mut conn = state.pool.get().await?;
    Ok(Json(dashboard::build(&mut conn, date).await?))
}
