//! Bearer-token authentication and role gating.
//!
//! Tokens are issued by the hosted auth provider and verified here with the
//! shared HS256 secret. The application role comes from the `profiles` row,
//! never from the token.
//!
//! This module provides:
//! - JWT validation
//! - `require_user` middleware that attaches the caller's profile
//! - `require_admin` middleware for admin-only routes
//! - `require_admin_or_trigger` for the reminder trigger, which an external
//!   timer may call with a static token

pub(crate) mod jwt;
mod middleware;
pub mod types;

pub use middleware::{require_admin, require_admin_or_trigger, require_user};
pub use types::{AuthConfig, AuthUser};
