//! Report endpoints.

use crate::reports::WeeklyReport;
use crate::server::state::AppState;
use axum::{Json, extract::State};

/// Units approved per component over the configured window.
///
/// ```bash
/// curl http://localhost:8080/api/reports/weekly
/// ```
pub async fn weekly_report(State(state): State<AppState>) -> Json<WeeklyReport> {
    Json(state.desk.weekly_report().await)
}
