use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// One logged food item. Immutable once created; the only lifecycle
/// operations are create, delete-one, and delete-all.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngredientEntry {
    pub id: i64,
    pub name: String,
    pub calories: i64,
    pub date: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub name: String,
    pub calories: i64,
    pub date: NaiveDate,
}

/// Entries and total for a single date, in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: String,
    pub entries: Vec<IngredientEntry>,
    pub total_calories: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DaySummary {
    pub date: String,
    pub total_calories: i64,
}

/// Rolling window summary: one row per date (most recent first, zero-filled
/// for days without entries), the window total, and the unrounded average.
#[derive(Debug, Clone, Serialize)]
pub struct WeekSummary {
    pub days: Vec<DaySummary>,
    pub week_total: i64,
    pub daily_average: f64,
}

/// Either a single-day view or the rolling summary.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum View {
    Day(DayView),
    Week(WeekSummary),
}

/// The value choosing which view to render: a concrete date, the "summary"
/// sentinel, or anything else (treated as a date with no entries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySelector {
    Date(NaiveDate),
    Summary,
    Other(String),
}

impl DaySelector {
    /// Parse a selector string. Never fails: a string that is neither
    /// `summary` nor a valid ISO date selects an empty day view.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "summary" {
            return Self::Summary;
        }
        match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Self::Date(date),
            Err(_) => Self::Other(s.to_string()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Ingredient name must not be empty")]
    EmptyName,
    #[error("Calories must be a positive number")]
    NonPositiveCalories,
    #[error("Calories must be a valid number")]
    NonNumericCalories,
}

/// Validate a new entry before it reaches the store.
pub fn validate_entry(name: &str, calories: i64) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if calories <= 0 {
        return Err(ValidationError::NonPositiveCalories);
    }
    Ok(())
}

/// Parse a raw calories field (e.g. from a form) into a positive integer.
pub fn parse_calories(raw: &str) -> Result<i64, ValidationError> {
    let calories: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::NonNumericCalories)?;
    if calories <= 0 {
        return Err(ValidationError::NonPositiveCalories);
    }
    Ok(calories)
}
