//! Balance routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::routes::auth::AuthUser;
use crate::services::balance as balance_svc;
use crate::state::AppState;

/// `GET /api/balance` — current balance.
pub async fn get_balance(State(state): State<AppState>, auth: AuthUser) -> Response {
    match balance_svc::get_balance(&state.pool, auth.user.id).await {
        Ok(balance) => Json(serde_json::json!({ "balance": balance })).into_response(),
        Err(e) => balance_error_response(e),
    }
}

#[derive(Deserialize)]
pub struct UpdateBody {
    pub amount: i64,
}

/// `POST /api/balance/update` — apply a signed delta. A delta that would
/// take the balance negative is rejected and the balance is unchanged.
pub async fn update_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateBody>,
) -> Response {
    match balance_svc::update_balance(&state.pool, auth.user.id, body.amount).await {
        Ok(balance) => Json(serde_json::json!({ "balance": balance })).into_response(),
        Err(e) => balance_error_response(e),
    }
}

fn balance_error_response(err: balance_svc::BalanceError) -> Response {
    let status = match err {
        balance_svc::BalanceError::NotFound => StatusCode::NOT_FOUND,
        balance_svc::BalanceError::InsufficientFunds => StatusCode::BAD_REQUEST,
        balance_svc::BalanceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "message": err.to_string() }))).into_response()
}
