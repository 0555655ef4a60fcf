use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Managed, cleared, declared, or_empty};
use crate::client::{Gateway, GatewayCreate, GatewayUpdate, HealthCheck};
use crate::json;
use crate::schema::{self, Schema};

/// Declared gateway.
///
/// The health check is declared as four flat fields and sent as one nested
/// object, only when `health_check_url` is set. `auth_value` is write-only:
/// the service never returns it, so the last-known value is carried forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayModel {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
    /// JSON object text.
    #[serde(default)]
    pub capabilities: Option<String>,
    #[serde(default)]
    pub health_check_url: Option<String>,
    #[serde(default)]
    pub health_check_interval: Option<i64>,
    #[serde(default)]
    pub health_check_timeout: Option<i64>,
    #[serde(default)]
    pub health_check_retries: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub passthrough_headers: Vec<String>,
    #[serde(default)]
    pub auth_type: Option<String>,
    #[serde(default)]
    pub auth_value: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl GatewayModel {
    fn health_check(&self) -> Option<HealthCheck> {
        let url = declared(&self.health_check_url)?;
        Some(HealthCheck {
            url: Some(url),
            interval: self.health_check_interval,
            timeout: self.health_check_timeout,
            retries: self.health_check_retries,
        })
    }

    fn capabilities(&self) -> crate::Result<Option<Map<String, Value>>> {
        json::decode_blob("capabilities", self.capabilities.as_deref())
    }
}

impl Managed for GatewayModel {
    type Entity = Gateway;

    const SCHEMA: &'static Schema = &schema::GATEWAY;

    fn identity(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn create_body(&self) -> crate::Result<GatewayCreate> {
        Ok(GatewayCreate {
            name: self.name.clone(),
            url: self.url.clone(),
            description: declared(&self.description),
            transport: declared(&self.transport),
            capabilities: self.capabilities()?,
            health_check: self.health_check(),
            is_active: self
                .is_active
                .or(Self::SCHEMA.default_bool("is_active"))
                .unwrap_or_default(),
            tags: self.tags.clone(),
            passthrough_headers: self.passthrough_headers.clone(),
            auth_type: declared(&self.auth_type),
            auth_value: declared(&self.auth_value),
        })
    }

    fn update_body(&self, prior: &Self) -> crate::Result<GatewayUpdate> {
        Ok(GatewayUpdate {
            name: Some(self.name.clone()),
            url: Some(self.url.clone()),
            description: cleared(&self.description, &prior.description),
            transport: declared(&self.transport),
            capabilities: self.capabilities()?,
            health_check: self.health_check(),
            is_active: self.is_active,
            tags: Some(self.tags.clone()),
            passthrough_headers: Some(self.passthrough_headers.clone()),
            auth_type: cleared(&self.auth_type, &prior.auth_type),
            auth_value: declared(&self.auth_value),
        })
    }

    fn from_entity(gateway: &Gateway, prior: &Self) -> crate::Result<Self> {
        let capabilities = match (&gateway.capabilities, prior.capabilities.as_deref()) {
            (Some(map), prior_text) if !map.is_empty() => {
                json::reconcile_blob("capabilities", prior_text, Some(map))?
            }
            (_, Some(prior_text)) => {
                json::reconcile_blob("capabilities", Some(prior_text), Some(&Map::new()))?
            }
            _ => None,
        };
        let health = gateway.health_check.clone().unwrap_or_default();

        Ok(Self {
            id: Some(gateway.id.clone()),
            name: gateway.name.clone(),
            url: gateway.url.clone(),
            description: declared(&gateway.description),
            transport: gateway.transport.clone(),
            capabilities,
            health_check_url: health.url,
            health_check_interval: health.interval,
            health_check_timeout: health.timeout,
            health_check_retries: health.retries,
            is_active: Some(gateway.is_active),
            tags: or_empty(&gateway.tags),
            passthrough_headers: or_empty(&gateway.passthrough_headers),
            auth_type: declared(&gateway.auth_type),
            auth_value: gateway.auth_value.clone(),
            created_at: gateway.created_at.clone(),
            updated_at: gateway.updated_at.clone(),
        })
    }

    fn retain_withheld(&mut self, known: &Self) {
        if declared(&self.auth_value).is_none() {
            self.auth_value = known.auth_value.clone();
        }
    }

    fn scrub_secrets(&mut self) {
        self.auth_value = None;
    }
}
