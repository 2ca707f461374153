use anyhow::Result;
use serde::Serialize;

use nosh_core::service::NoshService;

use super::helpers::parse_date;

pub(crate) fn cmd_add(
    svc: &NoshService,
    name: &str,
    calories: i64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.add_entry(name, calories, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = &entry.name;
        let cal = entry.calories;
        let date = &entry.date;
        let id = entry.id;
        println!("Logged: {name} — {cal} kcal on {date} [{id}]");
    }

    Ok(())
}

pub(crate) fn cmd_delete(svc: &NoshService, entry_id: i64, json: bool) -> Result<()> {
    let deleted = svc.remove_entry(entry_id)?;

    if json {
        #[derive(Serialize)]
        struct DeleteResult {
            id: i64,
            deleted: bool,
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&DeleteResult {
                id: entry_id,
                deleted,
            })?
        );
    } else if deleted {
        println!("Deleted entry {entry_id}");
    } else {
        // Not an error: deleting a missing id is an idempotent no-op.
        println!("No entry with id {entry_id}");
    }

    Ok(())
}

pub(crate) fn cmd_clear(svc: &NoshService, json: bool) -> Result<()> {
    let removed = svc.clear_all()?;

    if json {
        #[derive(Serialize)]
        struct ClearResult {
            removed: usize,
        }
        println!("{}", serde_json::to_string_pretty(&ClearResult { removed })?);
    } else {
        println!("Removed {removed} entries");
    }

    Ok(())
}
