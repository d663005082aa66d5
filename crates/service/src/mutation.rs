//! Mutation-then-refresh: a successful write re-fetches the list with the
//! current query; a failed write leaves the displayed state alone and hands the
//! error back.

use std::future::Future;
use std::sync::Arc;

use models::order::{Order, OrderStatusUpdate};
use models::Entity;

use crate::entity_service::{EntityService, OrderGateway};
use crate::errors::ServiceError;
use crate::sync::{EntityList, ListSync, LoadOutcome};

/// A list screen bound to one entity service.
pub type EntityListSync<S> = ListSync<EntityList<S>>;

impl<S: EntityService> ListSync<EntityList<S>> {
    pub fn for_service(service: Arc<S>, query: crate::listing::ListQuery) -> Self {
        ListSync::new(EntityList(service), query)
    }

    pub fn service(&self) -> &Arc<S> {
        &self.source().0
    }

    /// Run `op` against the service; on success re-fetch the current page.
    pub async fn mutate<T, Fut>(&self, op: impl FnOnce(Arc<S>) -> Fut) -> Result<T, ServiceError>
    where
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let value = op(self.service().clone()).await?;
        if let LoadOutcome::Failed(e) = self.reload().await {
            tracing::debug!(error = %e, "refresh after mutation failed");
        }
        Ok(value)
    }

    pub async fn create(&self, input: S::Input) -> Result<S::Record, ServiceError> {
        self.mutate(|svc| async move { svc.create(input).await }).await
    }

    pub async fn update(&self, id: <S::Record as Entity>::Id, input: S::Input) -> Result<S::Record, ServiceError> {
        self.mutate(|svc| async move { svc.update(&id, input).await }).await
    }

    pub async fn delete(&self, id: <S::Record as Entity>::Id) -> Result<(), ServiceError> {
        self.mutate(|svc| async move { svc.delete(&id).await }).await
    }
}

impl<S: OrderGateway> ListSync<EntityList<S>> {
    pub async fn update_status(&self, id: u64, update: OrderStatusUpdate) -> Result<Order, ServiceError> {
        self.mutate(|svc| async move { svc.update_status(id, update).await }).await
    }
}
