use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

use crate::services::checkout::{reconcile_webhook, WebhookError};
use crate::services::payments::webhook::SIGNATURE_HEADER;
use crate::state::AppState;
use crate::utils::response::{ok, plain_error};

/// Receives processor deliveries. The body is taken as raw bytes because the
/// signature covers the exact bytes sent.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = reconcile_webhook(
        state.webhook_verifier.as_deref(),
        state.tickets.as_ref(),
        &body,
        signature,
    )
    .await;

    match outcome {
        Ok(_) => ok(json!({ "received": true })),
        Err(WebhookError::Ledger(e)) => e.into_response(),
        Err(e) => {
            warn!(error = %e, "Rejected webhook delivery");
            plain_error(format!("Webhook Error: {e}"), StatusCode::BAD_REQUEST)
        }
    }
}
