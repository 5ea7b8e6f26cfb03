use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

/// Tickets are sold in pounds sterling.
pub const CHECKOUT_CURRENCY: &str = "gbp";

/// Placeholder the processor substitutes with the real session id when it
/// redirects back to the client.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Event ids are opaque to checkout; the client may send them as strings or
/// as numbers depending on the table's key type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OpaqueId {
    Text(String),
    Number(serde_json::Number),
}

impl OpaqueId {
    fn into_non_blank(self) -> Option<String> {
        match self {
            OpaqueId::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            OpaqueId::Number(n) => Some(n.to_string()),
        }
    }
}

/// Body of `POST /create-checkout-session`, as sent by the client. Every
/// field is optional here so that absence is reported as a validation error
/// instead of a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    pub event_id: Option<OpaqueId>,
    pub event_name: Option<String>,
    pub price: Option<Decimal>,
    pub user_id: Option<OpaqueId>,
    pub user_email: Option<String>,
}

/// A request that passed validation and is ready to be sent to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub event_id: String,
    pub event_name: String,
    pub unit_amount: i64,
    pub user_id: String,
    pub user_email: String,
}

impl CreateCheckoutSessionRequest {
    pub fn validate(self) -> Result<CheckoutRequest, AppError> {
        let event_id = self.event_id.and_then(OpaqueId::into_non_blank);
        let user_id = self.user_id.and_then(OpaqueId::into_non_blank);
        let event_name = non_blank(self.event_name);
        let user_email = non_blank(self.user_email);

        let (Some(event_id), Some(event_name), Some(price), Some(user_id), Some(user_email)) =
            (event_id, event_name, self.price, user_id, user_email)
        else {
            return Err(AppError::ValidationError(
                "Missing required fields: eventId, eventName, price, userId, userEmail"
                    .to_string(),
            ));
        };

        if price <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Price must be greater than zero".to_string(),
            ));
        }

        let unit_amount = to_minor_units(price).ok_or_else(|| {
            AppError::ValidationError("Price is too large to be charged".to_string())
        })?;
        if unit_amount < 1 {
            return Err(AppError::ValidationError(
                "Price must be at least 0.01".to_string(),
            ));
        }

        Ok(CheckoutRequest {
            event_id,
            event_name,
            unit_amount,
            user_id,
            user_email,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Converts a major-unit price into minor units (pence), rounding half away
/// from zero. Returns `None` when the amount does not fit the processor's
/// integer range.
pub fn to_minor_units(price: Decimal) -> Option<i64> {
    price
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Identifiers carried through the processor untouched so the completion
/// webhook can be tied back to an event and a buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub event_id: Option<String>,
    pub user_id: Option<String>,
}

/// Everything the processor needs to mint a hosted checkout page for one
/// ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionParams {
    pub product_name: String,
    pub unit_amount: i64,
    pub currency: &'static str,
    pub quantity: u32,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: SessionMetadata,
}

impl CheckoutSessionParams {
    pub fn for_ticket(request: &CheckoutRequest, client_url: &str) -> Self {
        Self {
            product_name: request.event_name.clone(),
            unit_amount: request.unit_amount,
            currency: CHECKOUT_CURRENCY,
            quantity: 1,
            customer_email: request.user_email.clone(),
            success_url: success_url(client_url, &request.event_id),
            cancel_url: cancel_url(client_url, &request.event_id),
            metadata: SessionMetadata {
                event_id: Some(request.event_id.clone()),
                user_id: Some(request.user_id.clone()),
            },
        }
    }
}

pub fn success_url(client_url: &str, event_id: &str) -> String {
    format!(
        "{}/payment-success?session_id={}&event_id={}",
        client_url,
        SESSION_ID_PLACEHOLDER,
        urlencoding::encode(event_id)
    )
}

pub fn cancel_url(client_url: &str, event_id: &str) -> String {
    format!("{}/events/{}", client_url, urlencoding::encode(event_id))
}

/// A session as returned by the processor on creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
}
