use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an employee works on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkLocation {
    #[serde(rename = "Main Office")]
    MainOffice,
    #[serde(rename = "WFH")]
    Wfh,
    #[serde(rename = "Other")]
    Other,
}

impl WorkLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkLocation::MainOffice => "Main Office",
            WorkLocation::Wfh => "WFH",
            WorkLocation::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Main Office" => Some(WorkLocation::MainOffice),
            "WFH" => Some(WorkLocation::Wfh),
            "Other" => Some(WorkLocation::Other),
            _ => None,
        }
    }
}

/// Application role stored on the profile row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}

/// A meal slot on the daily menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Snack,
        MealSlot::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Snack => "snack",
            MealSlot::Dinner => "dinner",
        }
    }
}

/// Profile row, column order matches the `profiles` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub mobile_number: Option<String>,
    pub work_location: String, // "Main Office", "WFH", "Other"
    pub role: String,          // "admin", "employee"
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn role(&self) -> Option<Role> {
        Role::from_str(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

/// Item text for each meal slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItems {
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub snack: String,
    #[serde(default)]
    pub dinner: String,
}

impl MenuItems {
    pub fn get(&self, slot: MealSlot) -> &str {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Snack => &self.snack,
            MealSlot::Dinner => &self.dinner,
        }
    }
}

/// Menu posted for a specific date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct DailyMenu {
    pub menu_date: NaiveDate,
    pub item_breakfast: String,
    pub item_lunch: String,
    pub item_snack: String,
    pub item_dinner: String,
    pub updated_at: DateTime<Utc>,
}

impl DailyMenu {
    pub fn items(&self) -> MenuItems {
        MenuItems {
            breakfast: self.item_breakfast.clone(),
            lunch: self.item_lunch.clone(),
            snack: self.item_snack.clone(),
            dinner: self.item_dinner.clone(),
        }
    }
}

/// Default menu for a weekday, 0 = Sunday through 6 = Saturday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct MenuTemplate {
    pub day_of_week: i32,
    pub item_breakfast: String,
    pub item_lunch: String,
    pub item_snack: String,
    pub item_dinner: String,
    pub updated_at: DateTime<Utc>,
}

impl MenuTemplate {
    pub fn items(&self) -> MenuItems {
        MenuItems {
            breakfast: self.item_breakfast.clone(),
            lunch: self.item_lunch.clone(),
            snack: self.item_snack.clone(),
            dinner: self.item_dinner.clone(),
        }
    }
}

/// Template key for a calendar date, Sunday = 0
pub fn day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

/// An employee's opt-ins for one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Confirmation {
    pub user_id: Uuid,
    pub menu_date: NaiveDate,
    pub opt_in_breakfast: bool,
    pub opt_in_lunch: bool,
    pub opt_in_snack: bool,
    pub opt_in_dinner: bool,
    pub updated_at: DateTime<Utc>,
}

impl Confirmation {
    /// All-false confirmation used before the employee has responded
    pub fn empty(user_id: Uuid, menu_date: NaiveDate) -> Self {
        Self {
            user_id,
            menu_date,
            opt_in_breakfast: false,
            opt_in_lunch: false,
            opt_in_snack: false,
            opt_in_dinner: false,
            updated_at: Utc::now(),
        }
    }

    pub fn is_opted_in(&self, slot: MealSlot) -> bool {
        match slot {
            MealSlot::Breakfast => self.opt_in_breakfast,
            MealSlot::Lunch => self.opt_in_lunch,
            MealSlot::Snack => self.opt_in_snack,
            MealSlot::Dinner => self.opt_in_dinner,
        }
    }
}
