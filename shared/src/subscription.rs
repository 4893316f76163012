//! Browser push subscription stored as JSON in a TEXT column.
//!
//! The shape matches what `PushManager.subscribe()` returns in the browser
//! (`JSON.stringify(subscription)`); unknown fields such as
//! `expirationTime` are ignored.

use serde::{Deserialize, Serialize};

#[cfg(feature = "diesel")]
use diesel::{
    deserialize::{FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    serialize::{IsNull, Output, ToSql},
    sql_types::Text,
};

/// Client keys used to encrypt the push payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A push endpoint plus the keys needed to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(AsExpression, FromSqlRow))]
#[cfg_attr(feature = "diesel", diesel(sql_type = Text))]
pub struct PushSubscriptionInfo {
    pub endpoint: String,
    pub keys: PushKeys,
}

impl PushSubscriptionInfo {
    /// Reject subscriptions that could never be delivered to.
    pub fn validate(&self) -> Result<(), String> {
        if !self.endpoint.starts_with("https://") {
            return Err("subscription endpoint must be an https URL".to_string());
        }
        if self.keys.p256dh.trim().is_empty() || self.keys.auth.trim().is_empty() {
            return Err("subscription keys must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(feature = "diesel")]
impl FromSql<Text, Pg> for PushSubscriptionInfo {
    fn from_sql(bytes: PgValue<'_>) -> diesel::deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        serde_json::from_str(&raw)
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}

#[cfg(feature = "diesel")]
impl ToSql<Text, Pg> for PushSubscriptionInfo {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> diesel::serialize::Result {
        use std::io::Write;

        let raw = serde_json::to_string(self)?;
        out.write_all(raw.as_bytes())?;
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_browser_subscription_json() {
        let json = r#"{
            "endpoint": "https://fcm.googleapis.com/fcm/send/abc123",
            "expirationTime": null,
            "keys": { "p256dh": "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM", "auth": "tBHItJI5svbpez7KI4CCXg" }
        }"#;

        let info: PushSubscriptionInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.endpoint, "https://fcm.googleapis.com/fcm/send/abc123");
        assert_eq!(info.keys.auth, "tBHItJI5svbpez7KI4CCXg");
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_plain_http_and_empty_keys() {
        let mut info = PushSubscriptionInfo {
            endpoint: "http://push.example.com/x".to_string(),
            keys: PushKeys {
                p256dh: "key".to_string(),
                auth: "auth".to_string(),
            },
        };
        assert!(info.validate().is_err());

        info.endpoint = "https://push.example.com/x".to_string();
        info.keys.auth = "  ".to_string();
        assert!(info.validate().is_err());
    }
}
