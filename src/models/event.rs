use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: String,
    /// Zero means the event is free and signups bypass checkout.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }
}

/// Editable fields of an event, used for both creation and full update.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: String,
    #[serde(default)]
    pub price: Decimal,
    pub image_url: Option<String>,
}

const PRICE_SCALE: u32 = 2;

fn max_price() -> Decimal {
    Decimal::new(100_000_000, 0)
}

impl EventInput {
    pub fn validate(mut self) -> Result<Self, AppError> {
        self.title = self.title.trim().to_string();
        self.location = self.location.trim().to_string();
        self.image_url = self
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if self.title.is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        if self.location.is_empty() {
            return Err(AppError::ValidationError("Location is required".to_string()));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }
        // Stored as NUMERIC(10, 2).
        if self.price.normalize().scale() > PRICE_SCALE {
            return Err(AppError::ValidationError(
                "Price must have at most two decimal places".to_string(),
            ));
        }
        if self.price >= max_price() {
            return Err(AppError::ValidationError(
                "Price must be less than 100000000".to_string(),
            ));
        }
        if let Some(end) = self.end_time {
            if end < self.start_time {
                return Err(AppError::ValidationError(
                    "End time must not be before start time".to_string(),
                ));
            }
        }

        Ok(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListQuery {
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSignup {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DeletedEvent {
    pub message: &'static str,
    pub event: Event,
}
