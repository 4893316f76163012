use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
};
use canteen_shared::{Profile, PublicKeyResponse, PushSubscriptionInfo, UpdateWorkLocationRequest};

use crate::auth::AuthUser;
use crate::db::{profiles, push_subscriptions};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn get_me(Extension(user): Extension<AuthUser>) -> Json<Profile> {
    Json(user.profile)
}

pub async fn update_work_location(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateWorkLocationRequest>,
) -> ApiResult<Json<Profile>> {
    let mut conn = state.pool.get().await?;
    let profile = profiles::update_work_location(&mut conn, user.id, payload.work_location).await?;

    tracing::debug!("{} now works from {}", user.id, profile.work_location);
    Ok(Json(profile))
}

/// VAPID public key the browser needs to subscribe
pub async fn get_public_key(State(state): State<AppState>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_key: state.config.push.vapid_public_key.clone(),
    })
}

pub async fn save_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(subscription): Json<PushSubscriptionInfo>,
) -> ApiResult<StatusCode> {
    subscription.validate().map_err(ApiError::bad_request)?;

    let mut conn = state.pool.get().await?;
    push_subscriptions::upsert(&mut conn, user.id, &subscription).await?;

    tracing::info!("Saved push subscription for {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<StatusCode> {
    let mut conn = state.pool.get().await?;
    if !push_subscriptions::delete(&mut conn, user.id).await? {
        return Err(ApiError::not_found("Push subscription"));
    }

    Ok(StatusCode::NO_CONTENT)
}
