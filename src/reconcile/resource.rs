use serde::{Deserialize, Serialize};

use super::{Managed, cleared, declared, or_empty};
use crate::client::{McpResource, ResourceCreate, ResourceFields, ResourceUpdate};
use crate::schema::{self, Schema};

/// Declared MCP resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceModel {
    #[serde(default)]
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Managed for ResourceModel {
    type Entity = McpResource;

    const SCHEMA: &'static Schema = &schema::RESOURCE;

    fn identity(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn create_body(&self) -> crate::Result<ResourceCreate> {
        Ok(ResourceCreate {
            resource: ResourceFields {
                uri: self.uri.clone(),
                name: self.name.clone(),
                description: declared(&self.description),
                mime_type: declared(&self.mime_type),
                tags: self.tags.clone(),
            },
            visibility: declared(&self.visibility),
            team_id: declared(&self.team_id),
        })
    }

    fn update_body(&self, prior: &Self) -> crate::Result<ResourceUpdate> {
        Ok(ResourceUpdate {
            uri: Some(self.uri.clone()),
            name: Some(self.name.clone()),
            description: cleared(&self.description, &prior.description),
            mime_type: declared(&self.mime_type),
            tags: Some(self.tags.clone()),
            visibility: declared(&self.visibility),
        })
    }

    fn from_entity(resource: &McpResource, prior: &Self) -> crate::Result<Self> {
        Ok(Self {
            id: Some(resource.id.clone()),
            uri: resource.uri.clone(),
            name: resource.name.clone(),
            description: declared(&resource.description),
            mime_type: resource.mime_type.clone(),
            tags: or_empty(&resource.tags),
            visibility: resource.visibility.clone(),
            team_id: resource.team_id.clone().or_else(|| declared(&prior.team_id)),
            is_active: Some(resource.is_active),
            created_at: resource.created_at.clone(),
            updated_at: resource.updated_at.clone(),
        })
    }
}
