use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    create_checkout_session, create_event, delete_event, get_event, health_check, list_events,
    search_images, signup_for_event, stripe_webhook, update_event,
};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let security_headers = create_security_headers_layer(&state.config);
    let cors = create_cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(health_check))
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/webhook", post(stripe_webhook))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/:id/signup", post(signup_for_event))
        .route("/images/search", get(search_images))
        .layer(security_headers)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
