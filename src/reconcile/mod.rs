//! Reconciler — converges remote entities toward declared models.
//!
//! One generic algorithm serves every kind. Each declared model implements
//! [`Managed`], which supplies the per-kind quirks: how declared fields map
//! onto the create and update bodies, how an API entity maps back onto the
//! declared shape, and which locally-held values the service never returns.

mod gateway;
mod prompt;
mod resource;
mod root;
mod server;
mod tool;

use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;

use crate::client::{Client, Entity};
use crate::error::ProviderError;
use crate::schema::{self, Schema};

pub use gateway::GatewayModel;
pub use prompt::PromptModel;
pub use resource::ResourceModel;
pub use root::RootModel;
pub use server::ServerModel;
pub use tool::ToolModel;

/// A declared model that can be reconciled against one entity kind.
pub trait Managed: Clone + Default + Serialize + Send + Sync {
    /// Wire type this model is stored as.
    type Entity: Entity;

    /// Declared schema, used for validation and change planning.
    const SCHEMA: &'static Schema;

    /// Identity of the remote entity, once known.
    fn identity(&self) -> Option<&str>;

    /// Translate declared fields into the create body, applying create-time
    /// defaults.
    fn create_body(&self) -> crate::Result<<Self::Entity as Entity>::Create>;

    /// Translate declared fields into the update body. `prior` is the current
    /// state; optional text it holds that is now undeclared is sent cleared.
    fn update_body(&self, prior: &Self) -> crate::Result<<Self::Entity as Entity>::Update>;

    /// Map an API entity onto the declared shape. `prior` is the last-known
    /// model; text blobs that still describe the API's structure are kept
    /// verbatim from it.
    fn from_entity(entity: &Self::Entity, prior: &Self) -> crate::Result<Self>;

    /// Carry forward values the service accepts but never returns.
    fn retain_withheld(&mut self, _known: &Self) {}

    /// Drop values that must not leave a read-only lookup.
    fn scrub_secrets(&mut self) {}
}

/// Outcome of comparing a prior model with a planned one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing exists yet.
    Create,
    /// The listed fields change in place.
    Update(Vec<&'static str>),
    /// At least one listed field cannot change in place; destroy and recreate.
    Replace(Vec<&'static str>),
    NoOp,
}

/// Create/read/update/delete for one managed kind.
///
/// Holds nothing but the client, so concurrent reconcilers over distinct
/// entities are independent.
#[derive(Debug, Clone)]
pub struct Reconciler<M> {
    client: Client,
    _model: PhantomData<fn() -> M>,
}

impl<M: Managed> Reconciler<M> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _model: PhantomData,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create the remote entity from the planned model and return the
    /// resulting state, including the identity the service assigned.
    pub async fn create(&self, planned: &M) -> crate::Result<M> {
        validate(planned)?;
        let body = planned.create_body()?;
        let entity = self.client.create::<M::Entity>(&body).await?;

        let mut state = M::from_entity(&entity, planned)?;
        state.retain_withheld(planned);
        tracing::info!(
            kind = M::SCHEMA.kind,
            id = %entity.identity(),
            "created entity"
        );
        Ok(state)
    }

    /// Refresh `state` from the service.
    ///
    /// `Ok(None)` means the entity no longer exists remotely and should be
    /// dropped from state. That is drift, not an error.
    pub async fn read(&self, state: &M) -> crate::Result<Option<M>> {
        let id = require_identity(state)?;
        match self.client.get::<M::Entity>(id).await? {
            Some(entity) => {
                let mut fresh = M::from_entity(&entity, state)?;
                fresh.retain_withheld(state);
                Ok(Some(fresh))
            }
            None => {
                tracing::warn!(
                    kind = M::SCHEMA.kind,
                    id = %id,
                    "entity no longer exists remotely, removing from state"
                );
                Ok(None)
            }
        }
    }

    /// Apply the planned model to the entity identified by `prior`.
    pub async fn update(&self, prior: &M, planned: &M) -> crate::Result<M> {
        validate(planned)?;
        let body = planned.update_body(prior)?;
        let id = require_identity(prior)?;
        let entity = self.client.update::<M::Entity>(id, &body).await?;

        let mut known = planned.clone();
        known.retain_withheld(prior);
        let mut state = M::from_entity(&entity, &known)?;
        state.retain_withheld(&known);
        tracing::info!(kind = M::SCHEMA.kind, id = %id, "updated entity");
        Ok(state)
    }

    /// Delete the entity. Succeeds if it is already gone.
    pub async fn delete(&self, state: &M) -> crate::Result<()> {
        let id = require_identity(state)?;
        self.client.delete::<M::Entity>(id).await?;
        tracing::info!(kind = M::SCHEMA.kind, id = %id, "deleted entity");
        Ok(())
    }

    /// Adopt an existing remote entity by identity.
    pub async fn import(&self, id: &str) -> crate::Result<M> {
        let entity = self
            .client
            .get::<M::Entity>(id)
            .await?
            .ok_or_else(|| ProviderError::NotFound(M::SCHEMA.kind, id.to_string()))?;
        tracing::debug!(kind = M::SCHEMA.kind, id = %id, "imported entity");
        M::from_entity(&entity, &M::default())
    }

    /// Decide how to move from `prior` (if any) to `planned`.
    pub fn plan(&self, prior: Option<&M>, planned: &M) -> crate::Result<Plan> {
        plan(prior, planned)
    }
}

/// Compare two declared models field by field against their schema.
pub fn plan<M: Managed>(prior: Option<&M>, planned: &M) -> crate::Result<Plan> {
    let Some(prior) = prior else {
        return Ok(Plan::Create);
    };
    let changed = schema::changed_fields(M::SCHEMA, &to_value(prior)?, &to_value(planned)?);
    if changed.is_empty() {
        return Ok(Plan::NoOp);
    }
    let replace = changed.iter().any(|name| {
        M::SCHEMA
            .field(name)
            .is_some_and(|field| field.replace_on_change)
    });
    Ok(if replace {
        Plan::Replace(changed)
    } else {
        Plan::Update(changed)
    })
}

fn to_value<M: Managed>(model: &M) -> crate::Result<Value> {
    serde_json::to_value(model).map_err(|source| ProviderError::Serialize {
        field: M::SCHEMA.kind.to_string(),
        source,
    })
}

fn validate<M: Managed>(planned: &M) -> crate::Result<()> {
    schema::validate(M::SCHEMA, &to_value(planned)?)
}

fn require_identity<M: Managed>(model: &M) -> crate::Result<&str> {
    model.identity().filter(|id| !id.is_empty()).ok_or_else(|| {
        ProviderError::InvalidField(
            "id".to_string(),
            format!("{} state has no identity", M::SCHEMA.kind),
        )
    })
}

/// Optional declared scalar: empty text counts as unset.
pub(crate) fn declared(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

/// Optional text on update: the declared value, or an explicit empty string
/// when `prior` held one and the field is now unset. Untouched fields are
/// omitted.
pub(crate) fn cleared(planned: &Option<String>, prior: &Option<String>) -> Option<String> {
    declared(planned).or_else(|| declared(prior).map(|_| String::new()))
}

/// Absent API collections read back as empty.
pub(crate) fn or_empty(values: &Option<Vec<String>>) -> Vec<String> {
    values.clone().unwrap_or_default()
}
