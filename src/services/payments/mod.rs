//! Payment processor collaborator.
//!
//! The gateway never talks to the processor through a global client: a
//! [`PaymentGateway`] is built once at startup and injected through the
//! application state, so handlers can be exercised against test doubles.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::checkout::{CheckoutSession, CheckoutSessionParams};
use crate::utils::error::AppError;

pub mod stripe;
pub mod webhook;

pub use stripe::StripeClient;
pub use webhook::{SignatureError, WebhookVerifier};

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The processor answered and refused the request.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("payment processor unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected payment processor response: {0}")]
    InvalidResponse(String),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Api { message, .. } => AppError::PaymentError(message),
            PaymentError::Transport(e) => AppError::ExternalServiceError(e.to_string()),
            PaymentError::InvalidResponse(msg) => AppError::ExternalServiceError(msg),
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Mints a hosted checkout page. Performs exactly one outbound call and
    /// never retries.
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, PaymentError>;
}
