//! The per-entity service contract shared by store-backed and REST-backed
//! implementations, plus the entity-specific extensions for orders and
//! notifications.

use async_trait::async_trait;

use models::notification::{Notification, NotificationInput};
use models::order::{Order, OrderStatusUpdate};
use models::Entity;

use crate::errors::ServiceError;
use crate::listing::{ListQuery, ListResult};

/// Identifier type of a service's records.
pub type IdOf<S> = <<S as EntityService>::Record as Entity>::Id;

/// CRUD over one entity type.
///
/// `delete` is idempotent: removing an id that does not exist succeeds.
#[async_trait]
pub trait EntityService: Send + Sync {
    type Record: Entity + Clone + Send + Sync + 'static;
    type Input: Send + Sync + 'static;

    async fn list(&self, query: &ListQuery) -> Result<ListResult<Self::Record>, ServiceError>;

    async fn get(&self, id: &<Self::Record as Entity>::Id) -> Result<Self::Record, ServiceError>;

    async fn create(&self, input: Self::Input) -> Result<Self::Record, ServiceError>;

    async fn update(&self, id: &<Self::Record as Entity>::Id, input: Self::Input) -> Result<Self::Record, ServiceError>;

    async fn delete(&self, id: &<Self::Record as Entity>::Id) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait OrderGateway: EntityService<Record = Order> {
    /// Move an order to a new status. `NotFound` if absent.
    async fn update_status(&self, id: u64, update: OrderStatusUpdate) -> Result<Order, ServiceError>;
}

#[async_trait]
pub trait NotificationGateway: EntityService<Record = Notification, Input = NotificationInput> {
    /// Mark one notification read. `NotFound` if absent; a no-op if already read.
    async fn mark_as_read(&self, id: &str) -> Result<Notification, ServiceError>;

    /// Mark every notification read; returns how many changed.
    async fn mark_all_as_read(&self) -> Result<u64, ServiceError>;

    /// Unread notifications across the whole (unfiltered) set.
    async fn unread_count(&self) -> Result<u64, ServiceError>;

    /// Emit a new notification, as a backend event would.
    async fn push(&self, input: NotificationInput) -> Result<Notification, ServiceError> {
        self.create(input).await
    }
}
