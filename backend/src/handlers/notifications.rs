use axum::extract::{Extension, Json, State};
use canteen_shared::{BroadcastRequest, NotificationResponse};
use chrono::Utc;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn broadcast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<BroadcastRequest>,
) -> ApiResult<Json<NotificationResponse>> {
    payload.validate()?;

    tracing::info!("Broadcast requested by {}", user.id);
    let response = state.notifications.broadcast(&payload.message).await?;
    Ok(Json(response))
}

/// Manual or externally timed reminder pass. Does not claim the day's run
/// marker, so repeated calls send again.
pub async fn send_reminders(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
) -> ApiResult<Json<NotificationResponse>> {
    match user {
        Some(Extension(user)) => tracing::info!("Reminder pass requested by {}", user.id),
        None => tracing::info!("Reminder pass requested by trigger token"),
    }

    let response = state.notifications.send_daily_reminders(Utc::now()).await?;
    Ok(Json(response))
}
