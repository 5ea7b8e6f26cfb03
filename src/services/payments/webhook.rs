//! Verification and decoding of processor webhook deliveries.
//!
//! A delivery carries a `Stripe-Signature` header of the form
//! `t=<unix seconds>,v1=<hex hmac>[,v1=...]`. The HMAC-SHA256 is computed with
//! the endpoint's shared secret over `"<t>.<raw body>"`, so the body must be
//! verified exactly as received, before any parsing.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::config::Secret;
use crate::models::checkout::SessionMetadata;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
const SIGNATURE_SCHEME: &str = "v1";
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing Stripe-Signature header")]
    MissingHeader,

    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,

    #[error("No signatures found with expected scheme")]
    NoSignatures,

    #[error("No signatures found matching the expected signature for payload")]
    Mismatch,

    #[error("Timestamp outside the tolerance zone")]
    TimestampOutOfTolerance,
}

#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

impl SignatureHeader {
    fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => {
                    timestamp = Some(
                        value
                            .parse::<i64>()
                            .map_err(|_| SignatureError::MalformedHeader)?,
                    )
                }
                SIGNATURE_SCHEME => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
        if signatures.is_empty() {
            return Err(SignatureError::NoSignatures);
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Authenticates deliveries against the endpoint's shared secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Secret,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: Secret) -> Self {
        Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// Like [`verify`](Self::verify) with an explicit clock.
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), SignatureError> {
        let header = SignatureHeader::parse(header)?;

        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.expose().as_bytes()) else {
            return Err(SignatureError::Mismatch);
        };
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        // verify_slice compares in constant time.
        let matched = header.signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|expected| mac.clone().verify_slice(&expected).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            return Err(SignatureError::Mismatch);
        }

        if now.abs_diff(header.timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(SignatureError::TimestampOutOfTolerance);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

/// The subset of a checkout session object this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionObject {
    pub id: String,
    #[serde(default)]
    pub metadata: SessionMetadata,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

impl SessionObject {
    pub fn buyer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(self.customer_email.as_deref())
    }
}

#[derive(Debug, Clone)]
pub enum WebhookEventKind {
    CheckoutSessionCompleted(SessionObject),
    CheckoutSessionExpired(SessionObject),
    Other(String),
}

impl WebhookEvent {
    pub fn kind(&self) -> Result<WebhookEventKind, serde_json::Error> {
        Ok(match self.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => WebhookEventKind::CheckoutSessionCompleted(
                serde_json::from_value(self.data.object.clone())?,
            ),
            CHECKOUT_SESSION_EXPIRED => WebhookEventKind::CheckoutSessionExpired(
                serde_json::from_value(self.data.object.clone())?,
            ),
            other => WebhookEventKind::Other(other.to_string()),
        })
    }
}
