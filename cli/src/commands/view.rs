use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use nosh_core::service::NoshService;

use super::helpers::parse_date;

pub(crate) fn cmd_view(svc: &NoshService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let view = svc.day_view(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.entries.is_empty() {
        let date = &view.date;
        eprintln!("No entries for {date}");
        process::exit(2);
    }

    let date = &view.date;
    println!("=== {date} ===\n");

    for e in &view.entries {
        let id = e.id;
        let name = &e.name;
        let cal = e.calories;
        println!("  [{id}] {name} — {cal} kcal");
    }

    let total = view.total_calories;
    println!("\n  TOTAL: {total} kcal");

    Ok(())
}

pub(crate) fn cmd_summary(svc: &NoshService, date: Option<String>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Calories")]
        calories: String,
    }

    let anchor = parse_date(date)?;
    let summary = svc.week_summary(anchor)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let rows: Vec<SummaryRow> = summary
        .days
        .iter()
        .map(|d| SummaryRow {
            date: d.date.clone(),
            calories: d.total_calories.to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let week_total = summary.week_total;
    let daily_average = summary.daily_average;
    println!("\n  Week Total: {week_total} kcal");
    println!("  Daily Average: {daily_average:.1} kcal");

    Ok(())
}
