//! Web Push delivery.
//!
//! `PushSender` is the seam between the dispatcher and the push service;
//! `WebPushSender` signs each message with the VAPID key pair and delivers it
//! through the browser vendor's endpoint.

use async_trait::async_trait;
use canteen_shared::{CutoffPolicy, PushSubscriptionInfo};
use serde::Serialize;
use thiserror::Error;
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignature, VapidSignatureBuilder,
    WebPushClient, WebPushError, WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

use crate::config::PushConfig;

const REMINDER_TITLE: &str = "Karmic Kitchen Reminder";
const BROADCAST_TITLE: &str = "Karmic Kitchen Alert";

/// Notification payload, read by the service worker as `{ title, body }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
}

impl PushMessage {
    pub fn reminder(cutoff: &CutoffPolicy) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            body: format!(
                "Are you working from home today? If not, please register for food before {}.",
                cutoff.display_cutoff()
            ),
        }
    }

    pub fn broadcast(body: impl Into<String>) -> Self {
        Self {
            title: BROADCAST_TITLE.to_string(),
            body: body.into(),
        }
    }

    pub fn to_payload(&self) -> Result<Vec<u8>, DeliveryError> {
        serde_json::to_vec(self).map_err(|e| DeliveryError::Failed(e.to_string()))
    }
}

/// Why a single delivery did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The subscription will never accept messages again
    #[error("subscription gone: {0}")]
    Gone(String),

    /// Anything else; the subscription is kept
    #[error("delivery failed: {0}")]
    Failed(String),
}

impl From<WebPushError> for DeliveryError {
    fn from(err: WebPushError) -> Self {
        match &err {
            WebPushError::EndpointNotValid { .. }
            | WebPushError::EndpointNotFound { .. }
            | WebPushError::InvalidCryptoKeys { .. } => DeliveryError::Gone(err.to_string()),
            _ => DeliveryError::Failed(err.to_string()),
        }
    }
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscriptionInfo,
        message: &PushMessage,
    ) -> Result<(), DeliveryError>;
}

pub struct WebPushSender {
    client: HyperWebPushClient,
    private_key: String,
    subject: String,
    ttl_seconds: u32,
}

impl WebPushSender {
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: HyperWebPushClient::new(),
            private_key: config.vapid_private_key.trim_end_matches('=').to_string(),
            subject: config.vapid_subject.clone(),
            ttl_seconds: config.ttl_seconds,
        }
    }

    /// VAPID JWT for the push service behind `info.endpoint`
    fn sign(&self, info: &SubscriptionInfo) -> Result<VapidSignature, WebPushError> {
        let mut builder =
            VapidSignatureBuilder::from_base64(&self.private_key, URL_SAFE_NO_PAD, info)?;
        builder.add_claim("sub", self.subject.as_str());
        builder.build()
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(
        &self,
        subscription: &PushSubscriptionInfo,
        message: &PushMessage,
    ) -> Result<(), DeliveryError> {
        let info = SubscriptionInfo::new(
            subscription.endpoint.as_str(),
            subscription.keys.p256dh.as_str(),
            subscription.keys.auth.as_str(),
        );

        let signature = self.sign(&info)?;

        let payload = message.to_payload()?;
        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, &payload);
        builder.set_ttl(self.ttl_seconds);
        builder.set_vapid_signature(signature);
        let push = builder.build()?;

        self.client.send(push).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    use crate::config::tests::{test_push_config, TEST_PUBLIC_KEY};

    #[test]
    fn test_reminder_mentions_cutoff() {
        let message = PushMessage::reminder(&CutoffPolicy::default());
        assert_eq!(message.title, "Karmic Kitchen Reminder");
        assert_eq!(
            message.body,
            "Are you working from home today? If not, please register for food before 12:30 PM."
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = PushMessage::broadcast("Diwali lunch at 1 PM").to_payload().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json["title"], "Karmic Kitchen Alert");
        assert_eq!(json["body"], "Diwali lunch at 1 PM");
    }

    #[test]
    fn test_signs_with_configured_key_pair() {
        let sender = WebPushSender::new(&test_push_config());
        let info = SubscriptionInfo::new(
            "https://fcm.googleapis.com/fcm/send/abc123",
            "p256dh",
            "auth",
        );

        let signature = sender.sign(&info).unwrap();
        let public_key = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(TEST_PUBLIC_KEY)
            .unwrap();
        assert_eq!(signature.auth_k, public_key);
        assert!(!signature.auth_t.is_empty());
    }

    #[test]
    fn test_dead_endpoint_errors_are_gone() {
        assert!(matches!(
            DeliveryError::from(WebPushError::InvalidCryptoKeys),
            DeliveryError::Gone(_)
        ));
        assert!(matches!(
            DeliveryError::from(WebPushError::PayloadTooLarge),
            DeliveryError::Failed(_)
        ));
    }
}
