//! Employee-facing menu and confirmation handlers.

use axum::extract::{Extension, Json, Path, Query, State};
use canteen_shared::{
    Confirmation, ConfirmationResponse, CutoffQuery, CutoffResponse, MenuResponse, MenuSource,
    ToggleMealRequest,
};
use chrono::{NaiveDate, Utc};

use crate::auth::AuthUser;
use crate::db::{confirmations, daily_menus};
use crate::error::{ApiError, ApiResult};
use crate::services::confirmation::ensure_editable;
use crate::state::AppState;

pub async fn get_cutoff(
    State(state): State<AppState>,
    Query(query): Query<CutoffQuery>,
) -> Json<CutoffResponse> {
    let policy = &state.config.cutoff;
    let now = Utc::now();
    let date = query.date.unwrap_or_else(|| policy.today(now));

    Json(CutoffResponse {
        date,
        locked: policy.is_locked(date, now),
        cutoff: policy.display_cutoff(),
    })
}

/// Posted menu for `date`. Templates are never shown to employees.
pub async fn get_menu(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Json<MenuResponse>> {
    let mut conn = state.pool.get().await?;
    let menu = daily_menus::get(&mut conn, date)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Menu for {}", date)))?;

    Ok(Json(MenuResponse {
        date,
        source: MenuSource::Daily,
        items: menu.items(),
    }))
}

pub async fn get_confirmation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Json<ConfirmationResponse>> {
    let mut conn = state.pool.get().await?;
    let row = confirmations::get(&mut conn, user.id, date).await?;

    let exists = row.is_some();
    Ok(Json(ConfirmationResponse {
        confirmation: row.unwrap_or_else(|| Confirmation::empty(user.id, date)),
        exists,
        locked: state.config.cutoff.is_locked(date, Utc::now()),
    }))
}

pub async fn toggle_meal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<ToggleMealRequest>,
) -> ApiResult<Json<ConfirmationResponse>> {
    ensure_editable(&state.config.cutoff, date, Utc::now())?;

    let mut conn = state.pool.get().await?;
    let saved =
        confirmations::set_slot(&mut conn, user.id, date, payload.meal, payload.opted_in).await?;

    tracing::debug!(
        "{} set {} on {} to {}",
        user.id,
        payload.meal.as_str(),
        date,
        payload.opted_in
    );

    Ok(Json(ConfirmationResponse {
        confirmation: saved,
        exists: true,
        locked: false,
    }))
}
