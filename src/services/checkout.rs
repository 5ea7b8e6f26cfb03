//! The checkout-session lifecycle as seen from this service.
//!
//! A session is `created` here, the buyer is redirected to the processor, and
//! the processor later reports `completed` through the webhook. Sessions that
//! are never completed are abandoned; that state is never signalled, only
//! inferred from the missing completion.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::checkout::{
    CheckoutSessionParams, CheckoutSessionResponse, CreateCheckoutSessionRequest,
};
use crate::models::ticket::{NewTicket, Recorded};
use crate::repositories::TicketLedger;
use crate::services::payments::webhook::{WebhookEvent, WebhookEventKind};
use crate::services::payments::{PaymentGateway, SignatureError, WebhookVerifier};
use crate::utils::error::{AppError, AppResult};

const PAYMENT_STATUS_PAID: &str = "paid";

/// Validates a ticket purchase and mints a hosted checkout page for it.
/// Validation happens before the processor is contacted.
pub async fn create_session(
    gateway: Option<&dyn PaymentGateway>,
    client_url: &str,
    request: CreateCheckoutSessionRequest,
) -> AppResult<CheckoutSessionResponse> {
    let request = request.validate()?;

    let gateway = gateway.ok_or_else(|| {
        AppError::ServiceUnavailable("Payment processing is not configured".to_string())
    })?;

    let params = CheckoutSessionParams::for_ticket(&request, client_url);
    let session = gateway.create_checkout_session(&params).await?;

    let url = session.url.ok_or_else(|| {
        AppError::ExternalServiceError(format!("checkout session {} has no url", session.id))
    })?;

    info!(
        session_id = %session.id,
        event_id = %request.event_id,
        user_id = %request.user_id,
        unit_amount = request.unit_amount,
        "Checkout session created"
    );

    Ok(CheckoutSessionResponse {
        session_id: session.id,
        url,
    })
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error(transparent)]
    Ledger(AppError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// No secret is configured: the delivery was acknowledged without being
    /// verified or acted upon.
    AcknowledgedUnverified,
    TicketRecorded(Recorded),
    /// A completed session without the metadata needed to attribute it.
    Unattributed,
    /// Completed, but the funds have not settled (delayed payment methods).
    PaymentPending,
    SessionExpired,
    Ignored(String),
}

/// Authenticates a processor delivery and reconciles it with local state.
///
/// Without a configured secret this degrades to acknowledging every delivery
/// unverified. That mode is insecure and exists for local development only;
/// no payload content is trusted or recorded in it.
pub async fn reconcile_webhook(
    verifier: Option<&WebhookVerifier>,
    ledger: &dyn TicketLedger,
    payload: &[u8],
    signature: Option<&str>,
) -> Result<WebhookOutcome, WebhookError> {
    let Some(verifier) = verifier else {
        warn!("Webhook secret not configured; acknowledging delivery without verification");
        return Ok(WebhookOutcome::AcknowledgedUnverified);
    };

    let signature = signature.ok_or(SignatureError::MissingHeader)?;
    verifier.verify(payload, signature)?;

    let event: WebhookEvent = serde_json::from_slice(payload)?;

    match event.kind()? {
        WebhookEventKind::CheckoutSessionCompleted(session) => {
            info!(
                event = %event.id,
                session_id = %session.id,
                event_id = ?session.metadata.event_id,
                user_id = ?session.metadata.user_id,
                amount_total = ?session.amount_total,
                payment_status = ?session.payment_status,
                "Checkout session completed"
            );

            if session.payment_status.as_deref() != Some(PAYMENT_STATUS_PAID) {
                warn!(
                    session_id = %session.id,
                    "Completed session is not paid; no ticket recorded"
                );
                return Ok(WebhookOutcome::PaymentPending);
            }

            let (Some(event_id), Some(user_id)) = (
                session.metadata.event_id.clone(),
                session.metadata.user_id.clone(),
            ) else {
                warn!(session_id = %session.id, "Completed session carries no event/user metadata");
                return Ok(WebhookOutcome::Unattributed);
            };

            let ticket = NewTicket {
                stripe_session_id: session.id.clone(),
                event_id,
                user_id,
                amount_total: session.amount_total,
                currency: session.currency.clone(),
                customer_email: session.buyer_email().map(str::to_string),
                payment_status: session.payment_status.clone(),
            };

            let recorded = ledger.record(&ticket).await.map_err(WebhookError::Ledger)?;
            Ok(WebhookOutcome::TicketRecorded(recorded))
        }
        WebhookEventKind::CheckoutSessionExpired(session) => {
            info!(session_id = %session.id, "Checkout session expired");
            Ok(WebhookOutcome::SessionExpired)
        }
        WebhookEventKind::Other(event_type) => {
            debug!(event = %event.id, event_type = %event_type, "Unhandled webhook event type");
            Ok(WebhookOutcome::Ignored(event_type))
        }
    }
}
