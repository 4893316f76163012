use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use canteen_shared::{CutoffPolicy, DEFAULT_CUTOFF};
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_pool_size: usize,
    pub database_tls: bool,
    pub port: u16,
    pub auth_jwt_secret: String,
    pub reminder_trigger_token: Option<String>,
    pub cutoff: CutoffPolicy,
    pub reminder_time: NaiveTime,
    pub reminder_scheduler_enabled: bool,
    /// Comma separated; unset means permissive CORS
    pub cors_allowed_origins: Option<String>,
    pub push: PushConfig,
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    pub vapid_public_key: String,
    pub vapid_private_key: String,
    pub vapid_subject: String,
    pub max_concurrency: usize,
    pub ttl_seconds: u32,
}

impl AppConfig {
    /// Load configuration from the environment, failing on anything missing
    /// or malformed so the server never starts able to send unsigned pushes.
    pub fn from_env() -> Result<Self> {
        let timezone: Tz = env::var("ORG_TIMEZONE")
            .unwrap_or_else(|_| "Asia/Kolkata".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("ORG_TIMEZONE must be an IANA timezone: {}", e))?;

        let default_cutoff = format!("{:02}:{:02}", DEFAULT_CUTOFF.0, DEFAULT_CUTOFF.1);
        let cutoff = parse_time(&env::var("MEAL_CUTOFF").unwrap_or(default_cutoff))
            .context("MEAL_CUTOFF must be HH:MM")?;

        let push = PushConfig {
            vapid_public_key: env::var("VAPID_PUBLIC_KEY")
                .context("VAPID_PUBLIC_KEY must be set")?,
            vapid_private_key: env::var("VAPID_PRIVATE_KEY")
                .context("VAPID_PRIVATE_KEY must be set")?,
            vapid_subject: env::var("VAPID_SUBJECT")
                .unwrap_or_else(|_| "mailto:admin@karmic.co.in".to_string()),
            max_concurrency: env::var("PUSH_MAX_CONCURRENCY")
                .unwrap_or_else(|_| "64".to_string())
                .parse()
                .context("PUSH_MAX_CONCURRENCY must be a valid number")?,
            ttl_seconds: env::var("PUSH_TTL_SECONDS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .context("PUSH_TTL_SECONDS must be a valid number")?,
        };
        push.validate()?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_pool_size: env::var("DATABASE_POOL_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_POOL_SIZE must be a valid number")?,
            database_tls: parse_bool(&env::var("DATABASE_TLS").unwrap_or_else(|_| "true".into()))
                .context("DATABASE_TLS must be true or false")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            auth_jwt_secret: env::var("AUTH_JWT_SECRET").context("AUTH_JWT_SECRET must be set")?,
            reminder_trigger_token: env::var("REMINDER_TRIGGER_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            cutoff: CutoffPolicy::new(timezone, cutoff),
            reminder_time: parse_time(
                &env::var("REMINDER_TIME").unwrap_or_else(|_| "10:00".to_string()),
            )
            .context("REMINDER_TIME must be HH:MM")?,
            reminder_scheduler_enabled: parse_bool(
                &env::var("REMINDER_SCHEDULER_ENABLED").unwrap_or_else(|_| "true".into()),
            )
            .context("REMINDER_SCHEDULER_ENABLED must be true or false")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").ok(),
            push,
        })
    }
}

impl PushConfig {
    /// Check the VAPID key pair decodes to P-256 key material.
    pub fn validate(&self) -> Result<()> {
        let public = URL_SAFE_NO_PAD
            .decode(self.vapid_public_key.trim_end_matches('='))
            .context("VAPID_PUBLIC_KEY must be base64url")?;
        if public.len() != 65 || public[0] != 0x04 {
            bail!("VAPID_PUBLIC_KEY must be an uncompressed P-256 point (65 bytes)");
        }

        let private = URL_SAFE_NO_PAD
            .decode(self.vapid_private_key.trim_end_matches('='))
            .context("VAPID_PRIVATE_KEY must be base64url")?;
        if private.len() != 32 {
            bail!("VAPID_PRIVATE_KEY must be a 32 byte P-256 scalar");
        }

        if !(self.vapid_subject.starts_with("mailto:") || self.vapid_subject.starts_with("https://"))
        {
            bail!("VAPID_SUBJECT must be a mailto: or https:// URL");
        }
        if self.max_concurrency == 0 {
            bail!("PUSH_MAX_CONCURRENCY must be at least 1");
        }

        Ok(())
    }
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").with_context(|| format!("invalid time {:?}", s))
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("invalid boolean {:?}", other),
    }
}
