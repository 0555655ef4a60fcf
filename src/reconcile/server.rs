use serde::{Deserialize, Serialize};

use super::{Managed, cleared, declared, or_empty};
use crate::client::{Server, ServerCreate, ServerFields, ServerUpdate};
use crate::schema::{self, Schema};

/// Declared virtual server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerModel {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Tools exposed through this server.
    #[serde(default)]
    pub tool_ids: Vec<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Managed for ServerModel {
    type Entity = Server;

    const SCHEMA: &'static Schema = &schema::SERVER;

    fn identity(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn create_body(&self) -> crate::Result<ServerCreate> {
        Ok(ServerCreate {
            server: ServerFields {
                name: self.name.clone(),
                description: declared(&self.description),
                tags: self.tags.clone(),
                tool_ids: self.tool_ids.clone(),
            },
            visibility: declared(&self.visibility),
            team_id: declared(&self.team_id),
        })
    }

    fn update_body(&self, prior: &Self) -> crate::Result<ServerUpdate> {
        Ok(ServerUpdate {
            name: Some(self.name.clone()),
            description: cleared(&self.description, &prior.description),
            tags: Some(self.tags.clone()),
            tool_ids: Some(self.tool_ids.clone()),
            visibility: declared(&self.visibility),
        })
    }

    fn from_entity(server: &Server, prior: &Self) -> crate::Result<Self> {
        Ok(Self {
            id: Some(server.id.clone()),
            name: server.name.clone(),
            description: declared(&server.description),
            tags: or_empty(&server.tags),
            tool_ids: or_empty(&server.tool_ids),
            visibility: server.visibility.clone(),
            team_id: server.team_id.clone().or_else(|| declared(&prior.team_id)),
            is_active: Some(server.is_active),
            status: server.status.clone(),
            created_at: server.created_at.clone(),
            updated_at: server.updated_at.clone(),
        })
    }
}
