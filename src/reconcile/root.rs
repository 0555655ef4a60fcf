use serde::{Deserialize, Serialize};

use super::{Managed, declared};
use crate::client::{NoUpdate, Root};
use crate::error::ProviderError;
use crate::schema::{self, Schema};

/// Declared root. The URI is the identity; any change means replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootModel {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Managed for RootModel {
    type Entity = Root;

    const SCHEMA: &'static Schema = &schema::ROOT;

    fn identity(&self) -> Option<&str> {
        Some(self.uri.as_str())
    }

    fn create_body(&self) -> crate::Result<Root> {
        Ok(Root {
            uri: self.uri.clone(),
            name: declared(&self.name),
        })
    }

    fn update_body(&self, _prior: &Self) -> crate::Result<NoUpdate> {
        Err(ProviderError::Unsupported {
            kind: "root",
            operation: "in-place update",
            hint: "every attribute change requires replacement",
        })
    }

    fn from_entity(root: &Root, prior: &Self) -> crate::Result<Self> {
        Ok(Self {
            uri: root.uri.clone(),
            // Some deployments echo roots back without their name.
            name: declared(&root.name).or_else(|| declared(&prior.name)),
        })
    }
}
