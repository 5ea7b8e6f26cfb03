use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::repositories::{
    EventRepository, LoggingTicketLedger, PgEventRepository, PgTicketLedger, TicketLedger,
};
use crate::services::auth::{AuthVerifier, SupabaseAuth};
use crate::services::images::{ImageSearch, UnsplashClient};
use crate::services::payments::{PaymentGateway, StripeClient, WebhookVerifier};
use crate::utils::error::{AppError, AppResult};

/// Collaborators shared by all handlers. Every client is built once at
/// startup and injected here; handlers hold no other state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub webhook_verifier: Option<Arc<WebhookVerifier>>,
    pub tickets: Arc<dyn TicketLedger>,
    pub events: Option<Arc<dyn EventRepository>>,
    pub auth: Option<Arc<dyn AuthVerifier>>,
    pub images: Option<Arc<dyn ImageSearch>>,
}

impl AppState {
    /// State with no outbound collaborators except webhook verification,
    /// which only needs the shared secret.
    pub fn new(config: Config) -> Self {
        let webhook_verifier = config
            .stripe_webhook_secret
            .clone()
            .map(|secret| Arc::new(WebhookVerifier::new(secret)));

        Self {
            config: Arc::new(config),
            payments: None,
            webhook_verifier,
            tickets: Arc::new(LoggingTicketLedger),
            events: None,
            auth: None,
            images: None,
        }
    }

    /// Wires the production clients described by `config`. `pool` must be
    /// given exactly when persistence is configured.
    pub fn from_config(config: Config, pool: Option<PgPool>) -> Result<Self, reqwest::Error> {
        let payments = config
            .stripe_secret_key
            .clone()
            .map(StripeClient::new)
            .transpose()?;
        let images = config
            .unsplash_access_key
            .clone()
            .map(UnsplashClient::new)
            .transpose()?;
        let auth = config
            .persistence
            .as_ref()
            .map(SupabaseAuth::from_config)
            .transpose()?;

        let mut state = Self::new(config);
        if let Some(payments) = payments {
            state = state.with_payments(Arc::new(payments));
        }
        if let Some(images) = images {
            state = state.with_images(Arc::new(images));
        }
        if let (Some(pool), Some(auth)) = (pool, auth) {
            state = state.with_persistence(
                Arc::new(PgEventRepository::new(pool.clone())),
                Arc::new(PgTicketLedger::new(pool)),
                Arc::new(auth),
            );
        }
        Ok(state)
    }

    pub fn with_payments(mut self, payments: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(payments);
        self
    }

    pub fn with_persistence(
        mut self,
        events: Arc<dyn EventRepository>,
        tickets: Arc<dyn TicketLedger>,
        auth: Arc<dyn AuthVerifier>,
    ) -> Self {
        self.events = Some(events);
        self.tickets = tickets;
        self.auth = Some(auth);
        self
    }

    pub fn with_images(mut self, images: Arc<dyn ImageSearch>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn events(&self) -> AppResult<&dyn EventRepository> {
        self.events.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable("Event storage is not configured".to_string())
        })
    }

    pub fn auth(&self) -> AppResult<&dyn AuthVerifier> {
        self.auth.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable("Authentication is not configured".to_string())
        })
    }

    pub fn images(&self) -> AppResult<&dyn ImageSearch> {
        self.images.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable("Image search is not configured".to_string())
        })
    }
}
