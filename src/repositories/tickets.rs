use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::models::ticket::{NewTicket, Recorded, Ticket};
use crate::utils::error::AppResult;

/// Durable record of paid tickets, written when the processor reports a
/// completed checkout.
#[async_trait]
pub trait TicketLedger: Send + Sync {
    /// Records the purchase. Idempotent on the processor's session id.
    async fn record(&self, ticket: &NewTicket) -> AppResult<Recorded>;
}

pub struct PgTicketLedger {
    pool: PgPool,
}

impl PgTicketLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketLedger for PgTicketLedger {
    async fn record(&self, ticket: &NewTicket) -> AppResult<Recorded> {
        let inserted = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets
                (stripe_session_id, event_id, user_id, amount_total,
                 currency, customer_email, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (stripe_session_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&ticket.stripe_session_id)
        .bind(&ticket.event_id)
        .bind(&ticket.user_id)
        .bind(ticket.amount_total)
        .bind(&ticket.currency)
        .bind(&ticket.customer_email)
        .bind(&ticket.payment_status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match inserted {
            Some(row) => {
                info!(
                    session_id = %row.stripe_session_id,
                    event_id = %row.event_id,
                    user_id = %row.user_id,
                    "Ticket recorded"
                );
                Recorded::Inserted
            }
            None => Recorded::AlreadyPresent,
        })
    }
}

/// Used when no database is configured: the purchase only reaches the logs.
pub struct LoggingTicketLedger;

#[async_trait]
impl TicketLedger for LoggingTicketLedger {
    async fn record(&self, ticket: &NewTicket) -> AppResult<Recorded> {
        info!(
            session_id = %ticket.stripe_session_id,
            event_id = %ticket.event_id,
            user_id = %ticket.user_id,
            amount_total = ?ticket.amount_total,
            "Ticket purchase completed (not persisted: no database configured)"
        );
        Ok(Recorded::LoggedOnly)
    }
}
