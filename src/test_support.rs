//! Test doubles for the injected collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::models::checkout::{CheckoutSession, CheckoutSessionParams};
use crate::models::event::{Event, EventInput, EventSignup};
use crate::models::image::StockImage;
use crate::models::ticket::{NewTicket, Recorded};
use crate::models::user::AuthenticatedUser;
use crate::repositories::{EventRepository, TicketLedger};
use crate::services::auth::{AuthVerifier, AuthVerifyError};
use crate::services::images::{ImageSearch, ImageSearchError};
use crate::services::payments::{PaymentError, PaymentGateway};
use crate::utils::error::{AppError, AppResult};

/// Builds a `Stripe-Signature` header value for `payload`.
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

pub fn completed_session_payload(
    session_id: &str,
    event_id: Option<&str>,
    user_id: Option<&str>,
) -> Vec<u8> {
    let mut metadata = serde_json::Map::new();
    if let Some(id) = event_id {
        metadata.insert("eventId".into(), json!(id));
    }
    if let Some(id) = user_id {
        metadata.insert("userId".into(), json!(id));
    }

    serde_json::to_vec(&json!({
        "id": "evt_test_1",
        "object": "event",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": session_id,
            "object": "checkout.session",
            "amount_total": 1999,
            "currency": "gbp",
            "customer_email": "guest@example.com",
            "payment_status": "paid",
            "metadata": metadata
        }}
    }))
    .unwrap()
}

enum GatewayBehaviour {
    Succeed,
    Reject(String),
}

pub struct RecordingGateway {
    behaviour: GatewayBehaviour,
    calls: Mutex<Vec<CheckoutSessionParams>>,
}

impl RecordingGateway {
    pub fn succeeding() -> Self {
        Self {
            behaviour: GatewayBehaviour::Succeed,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            behaviour: GatewayBehaviour::Reject(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<CheckoutSessionParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, PaymentError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(params.clone());
            calls.len()
        };

        match &self.behaviour {
            GatewayBehaviour::Succeed => Ok(CheckoutSession {
                id: format!("cs_test_{n}"),
                url: Some(format!("https://checkout.stripe.com/c/pay/cs_test_{n}")),
            }),
            GatewayBehaviour::Reject(message) => Err(PaymentError::Api {
                status: 402,
                message: message.clone(),
            }),
        }
    }
}

/// In-memory ledger with the same idempotency as the Postgres one.
#[derive(Default)]
pub struct RecordingLedger {
    fail: bool,
    tickets: Mutex<Vec<NewTicket>>,
}

impl RecordingLedger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<NewTicket> {
        self.tickets.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketLedger for RecordingLedger {
    async fn record(&self, ticket: &NewTicket) -> AppResult<Recorded> {
        if self.fail {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        let mut tickets = self.tickets.lock().unwrap();
        if tickets
            .iter()
            .any(|t| t.stripe_session_id == ticket.stripe_session_id)
        {
            return Ok(Recorded::AlreadyPresent);
        }
        tickets.push(ticket.clone());
        Ok(Recorded::Inserted)
    }
}

#[derive(Default)]
pub struct InMemoryEvents {
    events: Mutex<Vec<Event>>,
    signups: Mutex<Vec<EventSignup>>,
}

impl InMemoryEvents {
    pub fn insert(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl EventRepository for InMemoryEvents {
    async fn list(&self, created_by: Option<Uuid>) -> AppResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| created_by.map_or(true, |owner| e.created_by == owner))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_time);
        Ok(events)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Event>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn create(&self, input: &EventInput, created_by: Uuid) -> AppResult<Event> {
        let event = event_from(Uuid::new_v4(), input, created_by);
        self.insert(event.clone());
        Ok(event)
    }

    async fn update(&self, id: Uuid, input: &EventInput) -> AppResult<Option<Event>> {
        let mut events = self.events.lock().unwrap();
        Ok(events.iter_mut().find(|e| e.id == id).map(|e| {
            let created_at = e.created_at;
            *e = event_from(id, input, e.created_by);
            e.created_at = created_at;
            e.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Event>> {
        let mut events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .position(|e| e.id == id)
            .map(|index| events.remove(index)))
    }

    async fn signup(&self, event_id: Uuid, user_id: Uuid) -> AppResult<Option<EventSignup>> {
        let mut signups = self.signups.lock().unwrap();
        if signups
            .iter()
            .any(|s| s.event_id == event_id && s.user_id == user_id)
        {
            return Ok(None);
        }
        let signup = EventSignup {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            created_at: Utc::now(),
        };
        signups.push(signup.clone());
        Ok(Some(signup))
    }
}

fn event_from(id: Uuid, input: &EventInput, created_by: Uuid) -> Event {
    let now = Utc::now();
    Event {
        id,
        title: input.title.clone(),
        description: input.description.clone(),
        start_time: input.start_time,
        end_time: input.end_time,
        location: input.location.clone(),
        price: input.price,
        image_url: input.image_url.clone(),
        created_by,
        created_at: now,
        updated_at: now,
    }
}

/// Accepts a fixed set of bearer tokens.
#[derive(Default)]
pub struct StaticAuth {
    tokens: HashMap<String, AuthenticatedUser>,
}

impl StaticAuth {
    pub fn with_user(mut self, token: &str, user: AuthenticatedUser) -> Self {
        self.tokens.insert(token.to_string(), user);
        self
    }
}

#[async_trait]
impl AuthVerifier for StaticAuth {
    async fn verify(&self, access_token: &str) -> Result<AuthenticatedUser, AuthVerifyError> {
        self.tokens
            .get(access_token)
            .cloned()
            .ok_or(AuthVerifyError::InvalidToken)
    }
}

pub struct StubImageSearch {
    result: Option<Vec<StockImage>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl StubImageSearch {
    pub fn returning(images: Vec<StockImage>) -> Self {
        Self {
            result: Some(images),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSearch for StubImageSearch {
    async fn search(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<StockImage>, ImageSearchError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), per_page));
        self.result.clone().ok_or(ImageSearchError::Status(500))
    }
}
