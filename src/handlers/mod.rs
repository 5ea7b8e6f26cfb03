use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::state::AppState;
use crate::utils::response::ok;

pub mod checkout;
pub mod events;
pub mod extract;
pub mod images;
pub mod webhook;

pub use checkout::create_checkout_session;
pub use events::{
    create_event, delete_event, get_event, list_events, signup_for_event, update_event,
};
pub use images::search_images;
pub use webhook::stripe_webhook;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthPayload {
    status: &'static str,
    stripe_configured: bool,
}

/// Liveness probe. Reports whether checkout can actually reach the processor
/// so a misconfigured deployment is visible without placing an order.
pub async fn health_check(State(state): State<AppState>) -> Response {
    ok(HealthPayload {
        status: "ok",
        stripe_configured: state.payments.is_some(),
    })
}
