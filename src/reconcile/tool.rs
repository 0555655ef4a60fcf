use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Managed, cleared, declared, or_empty};
use crate::client::{Tool, ToolCreate, ToolFields, ToolUpdate};
use crate::json;
use crate::schema::{self, Schema};

/// Declared tool. `input_schema` is JSON object text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolModel {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub gateway_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ToolModel {
    fn input_schema(&self) -> crate::Result<Option<Map<String, Value>>> {
        json::decode_blob("input_schema", self.input_schema.as_deref())
    }
}

impl Managed for ToolModel {
    type Entity = Tool;

    const SCHEMA: &'static Schema = &schema::TOOL;

    fn identity(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn create_body(&self) -> crate::Result<ToolCreate> {
        Ok(ToolCreate {
            tool: ToolFields {
                name: self.name.clone(),
                description: declared(&self.description),
                input_schema: self.input_schema()?,
                tags: self.tags.clone(),
            },
            visibility: declared(&self.visibility),
            team_id: declared(&self.team_id),
        })
    }

    fn update_body(&self, prior: &Self) -> crate::Result<ToolUpdate> {
        Ok(ToolUpdate {
            name: Some(self.name.clone()),
            description: cleared(&self.description, &prior.description),
            input_schema: self.input_schema()?,
            tags: Some(self.tags.clone()),
            visibility: declared(&self.visibility),
        })
    }

    fn from_entity(tool: &Tool, prior: &Self) -> crate::Result<Self> {
        Ok(Self {
            id: Some(tool.id.clone()),
            name: tool.name.clone(),
            description: declared(&tool.description),
            input_schema: json::reconcile_blob(
                "input_schema",
                prior.input_schema.as_deref(),
                tool.input_schema.as_ref(),
            )?,
            tags: or_empty(&tool.tags),
            visibility: tool.visibility.clone(),
            team_id: tool.team_id.clone().or_else(|| declared(&prior.team_id)),
            is_active: Some(tool.is_active),
            gateway_id: tool.gateway_id.clone(),
            created_at: tool.created_at.clone(),
            updated_at: tool.updated_at.clone(),
        })
    }
}
