pub mod admin;
pub mod meals;
pub mod notifications;
pub mod profile;

use axum::http::StatusCode;

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
