use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Router,
    extract::{Form, Query, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tower_http::limit::RequestBodyLimitLayer;

use nosh_core::models::{DaySelector, DayView, ValidationError, View, WeekSummary, parse_calories};
use nosh_core::service::{NoshService, WINDOW_DAYS};

const BODY_LIMIT: usize = 16 * 1024; // 16 KB, plenty for one form post

#[derive(Clone)]
struct AppState {
    svc: Arc<Mutex<NoshService>>,
}

// --- Request types ---

#[derive(Deserialize)]
struct HomeQuery {
    day: Option<String>,
}

/// The single form endpoint dispatches on which fields are present:
/// `action` → clear-all, `delete_id` → delete-one, otherwise add-entry.
#[derive(Deserialize)]
struct HomeForm {
    action: Option<String>,
    delete_id: Option<String>,
    ingredient_name: Option<String>,
    calories: Option<String>,
}

// --- Error handling ---

/// Storage failures are fatal to the request: a generic 500 with no
/// partial data. The process keeps serving.
struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = self.0;
        eprintln!("Internal server error: {err:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Something went wrong</h1>".to_string()),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

// --- Middleware ---

async fn security_headers(request: axum::extract::Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; style-src 'unsafe-inline'"),
    );
    response
}

// --- Handlers ---

async fn home(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> Result<Html<String>, AppError> {
    let today = Local::now().date_naive();
    let selected = query
        .day
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    let view = {
        let svc = state
            .svc
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        svc.resolve(&DaySelector::parse(&selected), today)
            .context("database error")?
    };

    Ok(Html(render_page(&selected, &view, today, None)))
}

async fn submit(
    State(state): State<AppState>,
    Form(form): Form<HomeForm>,
) -> Result<Response, AppError> {
    let today = Local::now().date_naive();
    let svc = state
        .svc
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);

    if form.action.is_some() {
        svc.clear_all().context("database error")?;
        return Ok(Redirect::to("/").into_response());
    }

    if let Some(raw_id) = form.delete_id {
        // A non-numeric id is a no-op, not an error.
        if let Ok(id) = raw_id.trim().parse::<i64>() {
            svc.remove_entry(id).context("database error")?;
        }
        return Ok(Redirect::to("/").into_response());
    }

    let name = form.ingredient_name.unwrap_or_default();
    let raw_calories = form.calories.unwrap_or_default();

    if name.trim().is_empty() && raw_calories.trim().is_empty() {
        return render_with_error(&svc, today, "Please fill in both fields!");
    }
    if name.trim().is_empty() {
        return render_with_error(&svc, today, &ValidationError::EmptyName.to_string());
    }

    match parse_calories(&raw_calories) {
        Ok(calories) => {
            svc.add_entry(&name, calories, today)
                .context("database error")?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => render_with_error(&svc, today, &e.to_string()),
    }
}

/// Re-render today's view with a validation message instead of redirecting,
/// so the form input can be corrected.
fn render_with_error(
    svc: &NoshService,
    today: NaiveDate,
    error: &str,
) -> Result<Response, AppError> {
    let selected = today.format("%Y-%m-%d").to_string();
    let view = svc
        .resolve(&DaySelector::Date(today), today)
        .context("database error")?;
    Ok(Html(render_page(&selected, &view, today, Some(error))).into_response())
}

// --- Rendering (consumes only structured views, never touches the store) ---

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn dropdown_options(selected: &str, today: NaiveDate) -> String {
    let mut options = String::new();
    for i in 0..WINDOW_DAYS {
        let day = (today - chrono::Duration::days(i))
            .format("%Y-%m-%d")
            .to_string();
        let label = match i {
            0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            n => format!("{n} days ago"),
        };
        let marker = if selected == day { " selected" } else { "" };
        let _ = write!(options, "<option value=\"{day}\"{marker}>{label}</option>");
    }
    let marker = if selected == "summary" {
        " selected"
    } else {
        ""
    };
    let _ = write!(
        options,
        "<option value=\"summary\"{marker}>Last 7 Days Summary</option>"
    );
    options
}

fn render_day(view: &DayView) -> String {
    let mut html = String::new();
    for e in &view.entries {
        let id = e.id;
        let name = escape_html(&e.name);
        let cal = e.calories;
        let date = &e.date;
        let _ = write!(
            html,
            "<div class=\"ingredient-item\">\
                <span class=\"ingredient-name\">{name}</span>\
                <div>\
                    <span class=\"ingredient-calories\">{cal} cal</span>\
                    <span class=\"ingredient-date\">{date}</span>\
                    <form method=\"POST\" action=\"/\" style=\"display: inline;\">\
                        <input type=\"hidden\" name=\"delete_id\" value=\"{id}\">\
                        <button type=\"submit\" class=\"delete-btn\">Delete</button>\
                    </form>\
                </div>\
            </div>"
        );
    }
    html
}

fn render_week(summary: &WeekSummary) -> String {
    let mut html = String::new();
    for day in &summary.days {
        let date = &day.date;
        let total = day.total_calories;
        let _ = write!(html, "<p>{date}: {total} calories</p>");
    }
    let week_total = summary.week_total;
    let daily_average = summary.daily_average;
    let _ = write!(html, "<p>Week Total: {week_total} calories</p>");
    let _ = write!(html, "<p>Daily Average: {daily_average:.1} calories</p>");
    html
}

fn render_page(selected: &str, view: &View, today: NaiveDate, error: Option<&str>) -> String {
    let options = dropdown_options(selected, today);
    let (body, total_line) = match view {
        View::Day(day) => {
            let total = day.total_calories;
            (render_day(day), format!("{total} calories"))
        }
        View::Week(week) => {
            let total = week.week_total;
            (render_week(week), format!("{total} calories"))
        }
    };

    let alert = match error {
        Some(msg) => format!(
            "<div class=\"alert alert-error\">{}</div>",
            escape_html(msg)
        ),
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>
<html>
<head>
    <title>Calorie Tracker</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; background-color: #f5f5f5; }}
        h1 {{ color: #2c3e50; text-align: center; }}
        h2 {{ color: #34495e; border-bottom: 2px solid #3498db; padding-bottom: 5px; }}
        form {{ background-color: white; padding: 20px; border-radius: 8px; margin-bottom: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        input[type=\"text\"], input[type=\"number\"] {{ width: 100%; padding: 8px; margin: 5px 0 15px 0; border: 1px solid #ddd; border-radius: 4px; box-sizing: border-box; }}
        button, input[type=\"submit\"] {{ background-color: #3498db; color: white; padding: 10px 20px; border: none; border-radius: 4px; cursor: pointer; }}
        button:hover, input[type=\"submit\"]:hover {{ background-color: #2980b9; }}
        .delete-btn {{ background-color: #e74c3c; padding: 5px 10px; }}
        .delete-btn:hover {{ background-color: #c0392b; }}
        .alert {{ padding: 15px; margin: 20px 0; border-radius: 4px; }}
        .alert-error {{ background-color: #f8d7da; color: #721c24; }}
        .ingredient-item {{ background-color: white; padding: 15px; margin: 10px 0; border-radius: 4px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); display: flex; justify-content: space-between; align-items: center; }}
        .ingredient-name {{ font-weight: bold; color: #2c3e50; }}
        .ingredient-calories {{ color: #7f8c8d; margin-right: 15px; }}
        .ingredient-date {{ color: #95a5a6; font-size: 0.9em; margin-right: 15px; }}
    </style>
</head>
<body>
    <h1>Calorie Tracker</h1>
    <p>Track your meals and stay healthy</p>
    <form method=\"GET\" action=\"/\">
        <select name=\"day\" onchange=\"this.form.submit()\">
            {options}
        </select>
    </form>
    <form method=\"POST\" action=\"/\">
        <label>Ingredient Name:</label>
        <input type=\"text\" name=\"ingredient_name\">
        <label>Calories:</label>
        <input type=\"number\" name=\"calories\">
        <input type=\"submit\" value=\"Add Ingredient\">
    </form>
    <form method=\"POST\" action=\"/\">
        <input type=\"submit\" name=\"action\" value=\"Clear All\">
    </form>
    {alert}
    <h2>Ingredients Added:</h2>
    {body}
    <h2>Total:</h2>
    {total_line}
</body>
</html>"
    )
}

// --- Router builder / startup ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home).post(submit))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

pub async fn start_server(svc: NoshService, port: u16, bind: &str) -> anyhow::Result<()> {
    let state = AppState {
        svc: Arc::new(Mutex::new(svc)),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
