use chrono::NaiveDate;
use tracing::info;

use crate::errors::AppError;
use crate::models::config::DashboardConfig;
use crate::models::range::DateBounds;
use crate::models::view::DashboardView;
use crate::AppState;

// ── Dashboard Commands ──
//
// Synchronous on purpose: Tauri runs them on the main thread, one
// interaction at a time.

/// Dataset date bounds for the range control. Fails with `DataUnavailable`
/// when the dataset cannot be loaded; the frontend then stops rendering.
#[tauri::command]
pub fn get_date_bounds(state: tauri::State<'_, AppState>) -> Result<DateBounds, AppError> {
    state.session.bounds()
}

/// Run one render pass for the selected range (full span when omitted).
#[tauri::command]
pub fn render_dashboard(
    state: tauri::State<'_, AppState>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<DashboardView, AppError> {
    info!("Render requested: {:?} → {:?}", start_date, end_date);
    state.session.render(start_date, end_date)
}

/// Active configuration, for display in the sidebar.
#[tauri::command]
pub fn get_config(state: tauri::State<'_, AppState>) -> Result<DashboardConfig, AppError> {
    Ok(state.session.config().clone())
}
