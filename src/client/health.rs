use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{Auth, Client, accept, decode};

/// Liveness endpoint. Served without authentication.
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

impl Client {
    /// `GET /health`. Never sends the bearer token.
    pub async fn health(&self) -> crate::Result<Health> {
        let response = self
            .send(Method::GET, HEALTH_PATH, &[], None::<&()>, Auth::Anonymous)
            .await?;
        let response = accept(response, Method::GET, HEALTH_PATH, &[200])?;
        decode(&response, "health")
    }
}
