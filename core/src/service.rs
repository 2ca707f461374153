use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::Database;
use crate::models::{
    DaySelector, DaySummary, DayView, IngredientEntry, NewEntry, View, WeekSummary, validate_entry,
};

/// Number of dates in the rolling summary window.
pub const WINDOW_DAYS: i64 = 7;

/// Facade over the store: validated mutations plus the two read views.
/// Stateless between calls; the current date is always injected by the
/// caller so views are deterministic under test.
pub struct NoshService {
    db: Database,
}

impl NoshService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Mutations ---

    pub fn add_entry(&self, name: &str, calories: i64, date: NaiveDate) -> Result<IngredientEntry> {
        validate_entry(name, calories)?;
        self.db.insert_entry(&NewEntry {
            name: name.trim().to_string(),
            calories,
            date,
        })
    }

    /// Returns false when the id did not exist (idempotent no-op).
    pub fn remove_entry(&self, id: i64) -> Result<bool> {
        self.db.delete_entry(id)
    }

    pub fn clear_all(&self) -> Result<usize> {
        self.db.clear_entries()
    }

    // --- Views ---

    pub fn day_view(&self, date: NaiveDate) -> Result<DayView> {
        let entries = self.db.entries_for_date(date)?;
        Ok(Self::build_day_view(
            date.format("%Y-%m-%d").to_string(),
            entries,
        ))
    }

    /// Day view for a raw selector string that parsed as neither a date nor
    /// the summary sentinel. Matches no stored rows, so the view is empty.
    pub fn day_view_raw(&self, date: &str) -> Result<DayView> {
        let entries = self.db.entries_for_date_str(date)?;
        Ok(Self::build_day_view(date.to_string(), entries))
    }

    fn build_day_view(date: String, entries: Vec<IngredientEntry>) -> DayView {
        let total_calories = entries.iter().map(|e| e.calories).sum();
        DayView {
            date,
            entries,
            total_calories,
        }
    }

    /// Rolling summary over the `WINDOW_DAYS` dates ending at `anchor`,
    /// enumerated most recent first. Every date in the window gets a row,
    /// zero-filled when it has no entries. The average divides the exact
    /// integer total; rounding before the division would skew it.
    #[allow(clippy::cast_precision_loss)]
    pub fn week_summary(&self, anchor: NaiveDate) -> Result<WeekSummary> {
        let mut days = Vec::with_capacity(WINDOW_DAYS as usize);
        let mut week_total: i64 = 0;

        for i in 0..WINDOW_DAYS {
            let date = anchor - chrono::Duration::days(i);
            let entries = self.db.entries_for_date(date)?;
            let total_calories: i64 = entries.iter().map(|e| e.calories).sum();
            week_total += total_calories;
            days.push(DaySummary {
                date: date.format("%Y-%m-%d").to_string(),
                total_calories,
            });
        }

        Ok(WeekSummary {
            days,
            week_total,
            daily_average: week_total as f64 / WINDOW_DAYS as f64,
        })
    }

    /// Dispatch a day selector: concrete date → that day, "summary" → the
    /// window anchored at `today`, anything else → an empty day view.
    pub fn resolve(&self, selector: &DaySelector, today: NaiveDate) -> Result<View> {
        match selector {
            DaySelector::Summary => Ok(View::Week(self.week_summary(today)?)),
            DaySelector::Date(date) => Ok(View::Day(self.day_view(*date)?)),
            DaySelector::Other(s) => Ok(View::Day(self.day_view_raw(s)?)),
        }
    }
}
