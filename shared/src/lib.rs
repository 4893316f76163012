//! Types shared between the canteen backend and its clients.

pub mod api;
pub mod cutoff;
pub mod models;
pub mod subscription;

pub use api::*;
pub use cutoff::{CutoffPolicy, DEFAULT_CUTOFF};
pub use models::*;
pub use subscription::{PushKeys, PushSubscriptionInfo};
