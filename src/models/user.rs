use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The caller behind a verified access token, as reported by the hosted auth
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: Option<String>,
}
