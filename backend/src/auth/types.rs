//! Auth-related types and configuration.

use canteen_shared::{Profile, WorkLocation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

/// JWT claims issued by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: Uuid,
    /// Email at the time of sign-in
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Details the user entered at signup
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Signup form fields carried in the token. Anything else the client put
/// there, a role included, is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub work_location: Option<String>,
}

/// Profile row created on a user's first authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub mobile_number: Option<String>,
    pub work_location: WorkLocation,
}

impl NewProfile {
    /// New accounts start as employees in the main office unless signup
    /// said otherwise. Blank fields are stored as NULL.
    pub fn from_claims(claims: &Claims) -> Self {
        let meta = &claims.user_metadata;
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            id: claims.sub,
            full_name: non_blank(&meta.full_name),
            email: non_blank(&claims.email),
            employee_id: non_blank(&meta.employee_id),
            mobile_number: non_blank(&meta.mobile_number),
            work_location: meta
                .work_location
                .as_deref()
                .and_then(WorkLocation::from_str)
                .unwrap_or(WorkLocation::MainOffice),
        }
    }
}

/// Authenticated caller, attached to the request by `require_user`
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub profile: Profile,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin()
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Static bearer token accepted by the reminder trigger
    pub trigger_token: Option<String>,
}

impl AuthConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.auth_jwt_secret.clone(),
            trigger_token: config.reminder_trigger_token.clone(),
        }
    }

    /// Compare `candidate` against the trigger token without short-circuiting.
    pub fn is_trigger_token(&self, candidate: &str) -> bool {
        let Some(expected) = self.trigger_token.as_deref() else {
            return false;
        };
        if expected.len() != candidate.len() {
            return false;
        }
        expected
            .bytes()
            .zip(candidate.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_token_comparison() {
        let config = AuthConfig {
            jwt_secret: "secret".to_string(),
            trigger_token: Some("cron-token".to_string()),
        };
        assert!(config.is_trigger_token("cron-token"));
        assert!(!config.is_trigger_token("cron-tokem"));
        assert!(!config.is_trigger_token("cron"));
    }

    #[test]
    fn test_new_profile_from_signup_metadata() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "6f1c2a4e-9b7d-4f3a-8e21-5c0d9a7b3e14",
            "email": "asha@karmic.co.in",
            "exp": 1_900_000_000,
            "user_metadata": {
                "full_name": "Asha Rao",
                "employee_id": "KT-0042",
                "mobile_number": "  ",
                "work_location": "WFH",
                "role": "admin"
            }
        }))
        .unwrap();

        let profile = NewProfile::from_claims(&claims);
        assert_eq!(profile.full_name.as_deref(), Some("Asha Rao"));
        assert_eq!(profile.email.as_deref(), Some("asha@karmic.co.in"));
        assert_eq!(profile.employee_id.as_deref(), Some("KT-0042"));
        assert_eq!(profile.mobile_number, None);
        assert_eq!(profile.work_location, WorkLocation::Wfh);
    }

    #[test]
    fn test_new_profile_defaults_without_metadata() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "6f1c2a4e-9b7d-4f3a-8e21-5c0d9a7b3e14",
            "exp": 1_900_000_000,
            "user_metadata": { "work_location": "Mars" }
        }))
        .unwrap();

        let profile = NewProfile::from_claims(&claims);
        assert_eq!(profile.full_name, None);
        assert_eq!(profile.email, None);
        assert_eq!(profile.work_location, WorkLocation::MainOffice);
    }

    #[test]
    fn test_no_trigger_token_configured() {
        let config = AuthConfig {
            jwt_secret: "secret".to_string(),
            trigger_token: None,
        };
        assert!(!config.is_trigger_token(""));
    }
}
