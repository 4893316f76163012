//! Push reminders and broadcasts.
//!
//! - `push`: the `PushSender` seam and the VAPID-signed Web Push sender
//! - `dispatch`: notify-set selection and bounded concurrent fan-out
//! - `store`: data access used by the service
//! - `service`: daily reminder and broadcast operations
//! - `scheduler`: in-process daily trigger

pub mod dispatch;
pub mod push;
pub mod scheduler;
pub mod service;
pub mod store;

pub use push::WebPushSender;
pub use scheduler::start_reminder_task;
pub use service::{NotificationError, NotificationService};
pub use store::PgNotificationStore;
