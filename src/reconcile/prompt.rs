use serde::{Deserialize, Serialize};

use super::{Managed, cleared, declared, or_empty};
use crate::client::{Prompt, PromptArgument, PromptCreate, PromptFields, PromptUpdate};
use crate::json;
use crate::schema::{self, Schema};

/// Declared prompt template. `arguments` is JSON array text; order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptModel {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
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

impl PromptModel {
    fn arguments(&self) -> crate::Result<Option<Vec<PromptArgument>>> {
        json::decode_blob("arguments", self.arguments.as_deref())
    }
}

impl Managed for PromptModel {
    type Entity = Prompt;

    const SCHEMA: &'static Schema = &schema::PROMPT;

    fn identity(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn create_body(&self) -> crate::Result<PromptCreate> {
        Ok(PromptCreate {
            prompt: PromptFields {
                name: self.name.clone(),
                description: declared(&self.description),
                arguments: self.arguments()?.unwrap_or_default(),
                tags: self.tags.clone(),
            },
            visibility: declared(&self.visibility),
            team_id: declared(&self.team_id),
        })
    }

    fn update_body(&self, prior: &Self) -> crate::Result<PromptUpdate> {
        Ok(PromptUpdate {
            name: Some(self.name.clone()),
            description: cleared(&self.description, &prior.description),
            arguments: self.arguments()?,
            tags: Some(self.tags.clone()),
            visibility: declared(&self.visibility),
        })
    }

    fn from_entity(prompt: &Prompt, prior: &Self) -> crate::Result<Self> {
        let arguments = match (&prompt.arguments, prior.arguments.as_deref()) {
            (Some(list), prior_text) if !list.is_empty() => {
                json::reconcile_blob("arguments", prior_text, Some(list))?
            }
            (_, Some(prior_text)) => json::reconcile_blob(
                "arguments",
                Some(prior_text),
                Some(&Vec::<PromptArgument>::new()),
            )?,
            _ => None,
        };

        Ok(Self {
            id: Some(prompt.id.clone()),
            name: prompt.name.clone(),
            description: declared(&prompt.description),
            arguments,
            tags: or_empty(&prompt.tags),
            visibility: prompt.visibility.clone(),
            team_id: prompt.team_id.clone().or_else(|| declared(&prior.team_id)),
            is_active: Some(prompt.is_active),
            created_at: prompt.created_at.clone(),
            updated_at: prompt.updated_at.clone(),
        })
    }
}
