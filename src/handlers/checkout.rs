use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::checkout::CreateCheckoutSessionRequest;
use crate::services::checkout::create_session;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::ok;

pub async fn create_checkout_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateCheckoutSessionRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;

    let session = create_session(
        state.payments.as_deref(),
        &state.config.client_url,
        request,
    )
    .await?;

    Ok(ok(session))
}
