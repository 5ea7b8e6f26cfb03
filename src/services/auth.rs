//! Session verification against the hosted auth service.
//!
//! Users sign in with Google through the hosted service, which hands the
//! browser an access token. Mutating routes send that token as a bearer
//! credential and the gateway asks the auth service who it belongs to.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{PersistenceConfig, Secret};
use crate::models::user::AuthenticatedUser;
use crate::utils::error::AppError;

#[derive(Debug, Error)]
pub enum AuthVerifyError {
    #[error("invalid or expired access token")]
    InvalidToken,

    #[error("auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected auth service response: {0}")]
    InvalidResponse(String),
}

impl From<AuthVerifyError> for AppError {
    fn from(err: AuthVerifyError) -> Self {
        match err {
            AuthVerifyError::InvalidToken => {
                AppError::AuthError("Invalid or expired session".to_string())
            }
            other => AppError::ExternalServiceError(other.to_string()),
        }
    }
}

#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, access_token: &str) -> Result<AuthenticatedUser, AuthVerifyError>;
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: Uuid,
    email: Option<String>,
}

pub struct SupabaseAuth {
    http: Client,
    base_url: String,
    anon_key: Secret,
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, anon_key: Secret) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    pub fn from_config(config: &PersistenceConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.supabase_url, config.supabase_anon_key.clone())
    }
}

#[async_trait]
impl AuthVerifier for SupabaseAuth {
    async fn verify(&self, access_token: &str) -> Result<AuthenticatedUser, AuthVerifyError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", self.anon_key.expose())
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user: SupabaseUser = response
                    .json()
                    .await
                    .map_err(|e| AuthVerifyError::InvalidResponse(e.to_string()))?;
                Ok(AuthenticatedUser {
                    id: user.id,
                    email: user.email,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthVerifyError::InvalidToken),
            status => Err(AuthVerifyError::InvalidResponse(format!(
                "status {}",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn auth_with(response: ResponseTemplate) -> (MockServer, SupabaseAuth) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(response)
            .mount(&server)
            .await;
        let auth = SupabaseAuth::new(server.uri(), Secret::new("anon-key")).unwrap();
        (server, auth)
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let id = Uuid::new_v4();
        let (_server, auth) = auth_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "email": "organizer@example.com",
            "app_metadata": { "provider": "google" }
        })))
        .await;

        let user = auth.verify("token-123").await.unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("organizer@example.com"));
    }

    #[tokio::test]
    async fn test_rejected_token_is_invalid() {
        let (_server, auth) = auth_with(ResponseTemplate::new(401)).await;

        let err = auth.verify("token-123").await.unwrap_err();

        assert!(matches!(err, AuthVerifyError::InvalidToken));
        assert!(matches!(AppError::from(err), AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_server_failure_is_external_error() {
        let (_server, auth) = auth_with(ResponseTemplate::new(500)).await;

        let err = auth.verify("token-123").await.unwrap_err();

        assert!(matches!(
            AppError::from(err),
            AppError::ExternalServiceError(_)
        ));
    }
}
