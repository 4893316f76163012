use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::notifications::NotificationService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<AppConfig>,
    pub auth: AuthConfig,
    pub notifications: Arc<NotificationService>,
}
