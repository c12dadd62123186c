//! Settlement handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::dto::settlement::*;
use crate::{error::ApiError, AppState};

/// Computes one member's view of a group's balances
pub async fn calculate_balances(
    State(state): State<AppState>,
    payload: Result<Json<BalancesRequest>, JsonRejection>,
) -> Result<Json<BalancesResponse>, ApiError> {
    let Json(request) = payload?;

    if request.viewer_id.as_str().trim().is_empty() {
        return Err(ApiError::Validation("viewer_id must not be blank".to_string()));
    }
    state.check_expense_limit(request.expenses.len())?;

    let calculator = state.calculator_for(request.options)?;
    let result = calculator.calculate_balances(&request.expenses, &request.viewer_id);

    tracing::info!(
        group_id = ?request.group_id,
        expenses = request.expenses.len(),
        user_owes = result.user_owes.len(),
        owed_to_user = result.owed_to_user.len(),
        "Balances calculated"
    );

    Ok(Json(BalancesResponse {
        group_id: request.group_id,
        viewer_id: request.viewer_id,
        result,
    }))
}

/// Settles a whole group and returns every bucket, debt, and anomaly
pub async fn settle_group(
    State(state): State<AppState>,
    payload: Result<Json<SettlementRequest>, JsonRejection>,
) -> Result<Json<SettlementResponse>, ApiError> {
    let Json(request) = payload?;

    state.check_expense_limit(request.expenses.len())?;

    let calculator = state.calculator_for(request.options)?;
    let report = calculator.settle(&request.expenses);

    tracing::info!(
        group_id = ?request.group_id,
        expenses = request.expenses.len(),
        buckets = report.buckets.len(),
        skipped = report.skipped().count(),
        "Group settled"
    );

    Ok(Json(SettlementResponse {
        group_id: request.group_id,
        report,
    }))
}
