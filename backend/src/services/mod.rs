//! Business logic shared by the HTTP handlers.

pub mod confirmation;
pub mod dashboard;
pub mod menu;
