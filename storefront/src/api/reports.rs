//! Report API handlers

use axum::extract::State;
use shared::error::{ApiResponse, AppError, ErrorCode};

use super::ApiResult;
use super::session::SessionUser;
use crate::reports::WinSummary;
use crate::state::AppState;

/// GET /api/reports/wins
///
/// Staff only: the caller needs one of the data-entry roles.
pub async fn wins(State(state): State<AppState>, user: SessionUser) -> ApiResult<WinSummary> {
    let is_staff = user
        .role
        .as_deref()
        .is_some_and(|role| state.config.catalog.roles.is_data_entry(role));
    if !is_staff {
        return Err(AppError::new(ErrorCode::PermissionDenied));
    }
    let summary = state.reports.win_summary().await?;
    Ok(ApiResponse::success(summary))
}
