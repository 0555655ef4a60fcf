//! Read-only lookups. Unlike reconciler reads, an unknown identity here is
//! an error: the caller asked for something specific.

use crate::client::Client;
use crate::error::ProviderError;
use crate::reconcile::Managed;

#[derive(Debug, Clone)]
pub struct DataSource {
    client: Client,
}

impl DataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Look up one entity by identity (for roots, the URI).
    pub async fn get<M: Managed>(&self, id: &str) -> crate::Result<M> {
        let entity = self
            .client
            .get::<M::Entity>(id)
            .await?
            .ok_or_else(|| ProviderError::NotFound(M::SCHEMA.kind, id.to_string()))?;
        let mut model = M::from_entity(&entity, &M::default())?;
        model.scrub_secrets();
        Ok(model)
    }

    /// Every entity of one kind. `include_inactive` is ignored for roots.
    pub async fn list<M: Managed>(&self, include_inactive: bool) -> crate::Result<Vec<M>> {
        let entities = self.client.list::<M::Entity>(include_inactive).await?;
        tracing::debug!(
            kind = M::SCHEMA.kind,
            count = entities.len(),
            "listed entities"
        );
        entities
            .iter()
            .map(|entity| -> crate::Result<M> {
                let mut model = M::from_entity(entity, &M::default())?;
                model.scrub_secrets();
                Ok(model)
            })
            .collect()
    }

    /// Service status string, e.g. `healthy`.
    pub async fn health(&self) -> crate::Result<String> {
        Ok(self.client.health().await?.status)
    }
}
