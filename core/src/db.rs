use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, params};

use crate::models::{IngredientEntry, NewEntry};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            // AUTOINCREMENT keeps deleted ids from being reassigned.
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS ingredients (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    calories INTEGER NOT NULL,
                    date TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_ingredients_date ON ingredients(date);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<IngredientEntry> {
        Ok(IngredientEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            calories: row.get(2)?,
            date: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Append one entry and return it with its assigned id. Validation of
    /// name/calories is the caller's responsibility.
    pub fn insert_entry(&self, entry: &NewEntry) -> Result<IngredientEntry> {
        let now = Local::now().to_rfc3339();
        let date_str = entry.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO ingredients (name, calories, date, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![entry.name, entry.calories, date_str, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_entry(id)
    }

    pub fn get_entry(&self, id: i64) -> Result<IngredientEntry> {
        self.conn
            .query_row(
                "SELECT id, name, calories, date, created_at FROM ingredients WHERE id = ?1",
                params![id],
                Self::entry_from_row,
            )
            .context("Entry not found")
    }

    pub fn entries_for_date(&self, date: NaiveDate) -> Result<Vec<IngredientEntry>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        self.entries_for_date_str(&date_str)
    }

    /// All entries whose date column equals the argument, in insertion
    /// order. A string matching no rows yields an empty list, not an error.
    pub fn entries_for_date_str(&self, date: &str) -> Result<Vec<IngredientEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, calories, date, created_at FROM ingredients
             WHERE date = ?1
             ORDER BY id",
        )?;
        let entries = stmt
            .query_map(params![date], Self::entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Delete by id; deleting a missing id is a no-op and returns false.
    pub fn delete_entry(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM ingredients WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Remove every entry regardless of date. Returns the number removed.
    pub fn clear_entries(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM ingredients", [])?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(name: &str, calories: i64, d: NaiveDate) -> NewEntry {
        NewEntry {
            name: name.to_string(),
            calories,
            date: d,
        }
    }

    #[test]
    fn test_insert_and_list() {
        let db = Database::open_in_memory().unwrap();
        let d = date(2024, 6, 15);

        let inserted = db.insert_entry(&entry("apple", 95, d)).unwrap();
        assert_eq!(inserted.id, 1);
        assert_eq!(inserted.name, "apple");
        assert_eq!(inserted.calories, 95);
        assert_eq!(inserted.date, "2024-06-15");

        let entries = db.entries_for_date(d).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], inserted);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let d = date(2024, 6, 15);

        db.insert_entry(&entry("toast", 120, d)).unwrap();
        db.insert_entry(&entry("egg", 70, d)).unwrap();
        db.insert_entry(&entry("coffee", 5, d)).unwrap();

        let entries = db.entries_for_date(d).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["toast", "egg", "coffee"]);
    }

    #[test]
    fn test_list_filters_by_date() {
        let db = Database::open_in_memory().unwrap();
        db.insert_entry(&entry("apple", 95, date(2024, 6, 15))).unwrap();
        db.insert_entry(&entry("banana", 105, date(2024, 6, 16))).unwrap();

        let first = db.entries_for_date(date(2024, 6, 15)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "apple");

        let none = db.entries_for_date(date(2024, 6, 17)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_list_by_raw_string_matches_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.insert_entry(&entry("apple", 95, date(2024, 6, 15))).unwrap();

        let entries = db.entries_for_date_str("not-a-date").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_delete_entry() {
        let db = Database::open_in_memory().unwrap();
        let d = date(2024, 6, 15);
        let inserted = db.insert_entry(&entry("apple", 95, d)).unwrap();

        assert!(db.delete_entry(inserted.id).unwrap());
        assert!(db.entries_for_date(d).unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let db = Database::open_in_memory().unwrap();
        let d = date(2024, 6, 15);
        db.insert_entry(&entry("apple", 95, d)).unwrap();

        assert!(!db.delete_entry(999).unwrap());
        assert_eq!(db.entries_for_date(d).unwrap().len(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let db = Database::open_in_memory().unwrap();
        let d = date(2024, 6, 15);

        let first = db.insert_entry(&entry("apple", 95, d)).unwrap();
        db.delete_entry(first.id).unwrap();
        let second = db.insert_entry(&entry("banana", 105, d)).unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn test_clear_entries() {
        let db = Database::open_in_memory().unwrap();
        db.insert_entry(&entry("apple", 95, date(2024, 6, 15))).unwrap();
        db.insert_entry(&entry("banana", 105, date(2024, 6, 16))).unwrap();

        assert_eq!(db.clear_entries().unwrap(), 2);
        assert!(db.entries_for_date(date(2024, 6, 15)).unwrap().is_empty());
        assert!(db.entries_for_date(date(2024, 6, 16)).unwrap().is_empty());
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.insert_entry(&entry("apple", 95, date(2024, 6, 15))).unwrap();

        // A second migration pass must not touch existing data.
        db.migrate().unwrap();
        assert_eq!(db.entries_for_date(date(2024, 6, 15)).unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nosh.db");
        let d = date(2024, 6, 15);

        {
            let db = Database::open(&path).unwrap();
            db.insert_entry(&entry("apple", 95, d)).unwrap();
        }

        let db = Database::open(&path).unwrap();
        let entries = db.entries_for_date(d).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "apple");
    }
}
