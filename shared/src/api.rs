use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Confirmation, MealSlot, MenuItems, WorkLocation};

// ============================================================================
// Profile API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWorkLocationRequest {
    pub work_location: WorkLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    pub public_key: String,
}

// ============================================================================
// Confirmation API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleMealRequest {
    pub meal: MealSlot,
    pub opted_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub confirmation: Confirmation,
    /// False until the employee has saved anything for this date
    pub exists: bool,
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutoffQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutoffResponse {
    pub date: NaiveDate,
    pub locked: bool,
    pub cutoff: String,
}

// ============================================================================
// Menu API Types
// ============================================================================

/// Where a resolved menu came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuSource {
    Daily,
    Template,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuResponse {
    pub date: NaiveDate,
    pub source: MenuSource,
    pub items: MenuItems,
}

/// Body for saving a daily menu or a weekday template.
/// Missing items are stored as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SaveMenuRequest {
    #[validate(length(max = 500))]
    pub item_breakfast: Option<String>,

    #[validate(length(max = 500))]
    pub item_lunch: Option<String>,

    #[validate(length(max = 500))]
    pub item_snack: Option<String>,

    #[validate(length(max = 500))]
    pub item_dinner: Option<String>,
}

impl SaveMenuRequest {
    pub fn into_items(self) -> MenuItems {
        MenuItems {
            breakfast: self.item_breakfast.unwrap_or_default(),
            lunch: self.item_lunch.unwrap_or_default(),
            snack: self.item_snack.unwrap_or_default(),
            dinner: self.item_dinner.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub day_of_week: i32,
    pub day_name: String,
    pub items: MenuItems,
}

// ============================================================================
// Dashboard API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub date: NaiveDate,
    /// Employees with a confirmation row for the date
    pub responded: i64,
    pub breakfast: i64,
    pub lunch: i64,
    pub snack: i64,
    pub dinner: i64,
    pub subscribed_office_users: i64,
    /// Size of the reminder notify-set for the date
    pub pending_reminders: i64,
}

// ============================================================================
// Notification API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BroadcastRequest {
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub user_id: Uuid,
    pub reason: String,
    /// Subscription was dead and has been removed
    pub pruned: bool,
}

/// Aggregate outcome of one reminder or broadcast pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
    pub pruned: usize,
    pub failures: Vec<DeliveryFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub message: String,
    pub report: DispatchReport,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_menu_request_defaults_missing_items() {
        let req: SaveMenuRequest =
            serde_json::from_str(r#"{"item_lunch":"Rajma chawal"}"#).unwrap();
        let items = req.into_items();
        assert_eq!(items.lunch, "Rajma chawal");
        assert_eq!(items.breakfast, "");
        assert_eq!(items.get(MealSlot::Dinner), "");
    }

    #[test]
    fn test_broadcast_request_missing_message_is_empty() {
        let req: BroadcastRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_empty());
    }

    #[test]
    fn test_broadcast_request_length_limit() {
        let req = BroadcastRequest {
            message: "x".repeat(1001),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("boom")).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }
}
