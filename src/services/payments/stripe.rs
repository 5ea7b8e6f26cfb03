use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{PaymentError, PaymentGateway};
use crate::config::Secret;
use crate::models::checkout::{CheckoutSession, CheckoutSessionParams};

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Stripe REST client covering the one call this service makes.
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    secret_key: Secret,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: Secret) -> Result<Self, reqwest::Error> {
        Self::with_base_url(secret_key, STRIPE_API_BASE)
    }

    pub fn with_base_url(
        secret_key: Secret,
        base_url: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            secret_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Encodes session parameters with Stripe's bracketed form-field syntax.
fn session_form(params: &CheckoutSessionParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            params.currency.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            params.product_name.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            params.unit_amount.to_string(),
        ),
        (
            "line_items[0][quantity]".to_string(),
            params.quantity.to_string(),
        ),
        ("customer_email".to_string(), params.customer_email.clone()),
        ("success_url".to_string(), params.success_url.clone()),
        ("cancel_url".to_string(), params.cancel_url.clone()),
    ];

    if let Some(event_id) = &params.metadata.event_id {
        form.push(("metadata[eventId]".to_string(), event_id.clone()));
    }
    if let Some(user_id) = &params.metadata.user_id {
        form.push(("metadata[userId]".to_string(), user_id.clone()));
    }

    form
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(self.secret_key.expose())
            .form(&session_form(params))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| {
                    tracing::debug!(kind = ?b.error.kind, "Stripe rejected request");
                    b.error.message
                })
                .unwrap_or_else(|| format!("Stripe request failed with status {}", status));
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice::<CheckoutSession>(&body)
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::checkout::{CheckoutRequest, CheckoutSessionParams};
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params() -> CheckoutSessionParams {
        let request = CheckoutRequest {
            event_id: "42".into(),
            event_name: "Community Picnic".into(),
            unit_amount: 1999,
            user_id: "user-7".into(),
            user_email: "guest@example.com".into(),
        };
        CheckoutSessionParams::for_ticket(&request, "https://events.example")
    }

    fn client(server: &MockServer) -> StripeClient {
        StripeClient::with_base_url(Secret::new("sk_test_123"), server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_create_session_sends_form_and_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_abc",
                "object": "checkout.session",
                "url": "https://checkout.stripe.com/c/pay/cs_test_abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server)
            .create_checkout_session(&params())
            .await
            .unwrap();

        assert_eq!(session.id, "cs_test_abc");
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_test_abc")
        );

        let requests = server.received_requests().await.unwrap();
        let form: HashMap<String, String> =
            serde_urlencoded::from_bytes(&requests[0].body).unwrap();

        assert_eq!(form["mode"], "payment");
        assert_eq!(form["line_items[0][price_data][unit_amount]"], "1999");
        assert_eq!(form["line_items[0][price_data][currency]"], "gbp");
        assert_eq!(
            form["line_items[0][price_data][product_data][name]"],
            "Community Picnic"
        );
        assert_eq!(form["line_items[0][quantity]"], "1");
        assert_eq!(form["customer_email"], "guest@example.com");
        assert_eq!(
            form["success_url"],
            "https://events.example/payment-success?session_id={CHECKOUT_SESSION_ID}&event_id=42"
        );
        assert_eq!(form["cancel_url"], "https://events.example/events/42");
        assert_eq!(form["metadata[eventId]"], "42");
        assert_eq!(form["metadata[userId]"], "user-7");
    }

    #[tokio::test]
    async fn test_processor_message_is_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Invalid API Key provided: sk_test_***123",
                    "type": "invalid_request_error"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_checkout_session(&params())
            .await
            .unwrap_err();

        match err {
            PaymentError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key provided: sk_test_***123");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unstructured_failure_gets_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream busy"))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_checkout_session(&params())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_checkout_session(&params())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::InvalidResponse(_)));
    }
}
