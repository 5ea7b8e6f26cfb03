use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A paid ticket, derived from a completed checkout session. Keyed by the
/// processor's session id so redelivered webhooks collapse onto one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub stripe_session_id: String,
    pub event_id: String,
    pub user_id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub stripe_session_id: String,
    pub event_id: String,
    pub user_id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub payment_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of recording a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Inserted,
    /// The session had already been recorded by an earlier delivery.
    AlreadyPresent,
    /// No durable store is configured; the purchase was only logged.
    LoggedOnly,
}
