use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{require_admin, require_admin_or_trigger, require_user};
use crate::handlers::{self, admin, meals, notifications, profile};
use crate::state::AppState;

pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/push/public-key", get(profile::get_public_key));

    let user = Router::new()
        .route("/api/cutoff", get(meals::get_cutoff))
        .route("/api/me", get(profile::get_me))
        .route("/api/me/work-location", put(profile::update_work_location))
        .route(
            "/api/push-subscriptions",
            put(profile::save_subscription).delete(profile::delete_subscription),
        )
        .route("/api/menus/:date", get(meals::get_menu))
        .route(
            "/api/confirmations/:date",
            get(meals::get_confirmation).put(meals::toggle_meal),
        )
        .route_layer(from_fn_with_state(state.clone(), require_user));

    let admin = Router::new()
        .route(
            "/api/admin/menus/:date",
            get(admin::get_menu).put(admin::save_menu),
        )
        .route("/api/admin/menus/:date/autofill", post(admin::autofill_menu))
        .route("/api/admin/templates", get(admin::list_templates))
        .route("/api/admin/templates/:day", put(admin::save_template))
        .route("/api/admin/dashboard", get(admin::get_dashboard))
        .route("/api/notifications/broadcast", post(notifications::broadcast))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let trigger = Router::new()
        .route("/api/notifications/reminders", post(notifications::send_reminders))
        .route_layer(from_fn_with_state(state.clone(), require_admin_or_trigger));

    public
        .merge(user)
        .merge(admin)
        .merge(trigger)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Build CORS layer from a comma separated origin list.
///
/// With no list, CORS is permissive (for development only).
pub fn build_cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS not set or empty, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use canteen_shared::{CutoffPolicy, NotificationResponse, PublicKeyResponse};
    use chrono::NaiveTime;
    use tower::ServiceExt;

    use crate::auth::jwt::tests::{create_token, test_config};
    use crate::config::tests::{test_push_config, TEST_PUBLIC_KEY};
    use crate::config::AppConfig;
    use crate::db;
    use crate::notifications::service::tests::{FakeSender, MemoryStore};
    use crate::notifications::NotificationService;

    fn test_app_config() -> AppConfig {
        AppConfig {
            // Nothing listens here; the pool only connects when a handler asks
            database_url: "postgres://canteen@127.0.0.1:1/canteen".to_string(),
            database_pool_size: 1,
            database_tls: false,
            port: 0,
            auth_jwt_secret: test_config().jwt_secret,
            reminder_trigger_token: test_config().trigger_token,
            cutoff: CutoffPolicy::default(),
            reminder_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            reminder_scheduler_enabled: false,
            cors_allowed_origins: None,
            push: test_push_config(),
        }
    }

    fn test_app(sender: Arc<FakeSender>) -> Router {
        let config = Arc::new(test_app_config());
        let notifications = Arc::new(NotificationService::new(
            Arc::new(MemoryStore::default()),
            sender,
            config.cutoff,
            config.push.max_concurrency,
        ));
        let state = AppState {
            pool: db::establish_connection_pool(&config).unwrap(),
            auth: test_config(),
            config,
            notifications,
        };
        build_router(state, build_cors_layer(None))
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app(Arc::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_public_key_needs_no_auth() {
        let response = test_app(Arc::default())
            .oneshot(Request::get("/api/push/public-key").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: PublicKeyResponse = body_json(response).await;
        assert_eq!(body.public_key, TEST_PUBLIC_KEY);
    }

    #[tokio::test]
    async fn test_preflight_allowed() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/confirmations/2024-06-03")
            .header(header::ORIGIN, "https://canteen.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
            .body(Body::empty())
            .unwrap();

        let response = test_app(Arc::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_user_routes_require_token() {
        let response = test_app(Arc::default())
            .oneshot(Request::get("/api/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::get("/api/confirmations/2024-06-03")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let response = test_app(Arc::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let token = create_token(&test_config(), uuid::Uuid::new_v4(), chrono::Duration::hours(-2));
        let request = Request::get("/api/admin/dashboard")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = test_app(Arc::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_trigger_token_runs_reminders() {
        let sender = Arc::new(FakeSender::default());
        let request = Request::post("/api/notifications/reminders")
            .header(header::AUTHORIZATION, "Bearer test-trigger-token")
            .body(Body::empty())
            .unwrap();

        let response = test_app(sender.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: NotificationResponse = body_json(response).await;
        assert_eq!(body.message, "All users have confirmed. No notifications sent.");
        assert_eq!(sender.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_trigger_token_cannot_broadcast() {
        let request = Request::post("/api/notifications/broadcast")
            .header(header::AUTHORIZATION, "Bearer test-trigger-token")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message":"hello"}"#))
            .unwrap();

        let response = test_app(Arc::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
