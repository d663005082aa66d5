//! Store-backed entity services.
//!
//! Records live in a [`JsonMapStore`] keyed by id. Listing runs the shared
//! search/filter/paginate pipeline over a snapshot of the map.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, instrument};

use models::notification::{Notification, NotificationInput};
use models::order::{Order, OrderInput, OrderStatusUpdate};
use models::product::{Product, ProductInput};
use models::user::{UserData, UserInput};
use models::Entity;

use crate::entity_service::{EntityService, NotificationGateway, OrderGateway};
use crate::errors::ServiceError;
use crate::listing::{run_query, ListQuery, ListResult, Listable};
use crate::storage::JsonMapStore;

/// A record type that a [`StoreService`] knows how to create and update.
pub trait StoredRecord: Listable + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Input: Send + Sync + 'static;

    fn validate(input: &Self::Input) -> Result<(), ServiceError>;

    fn build(id: Self::Id, input: Self::Input, now: DateTime<Utc>) -> Self;

    fn patch(&mut self, input: Self::Input, now: DateTime<Utc>);

    /// Allocate an id not present in `existing`.
    fn next_id(existing: &HashMap<Self::Id, Self>) -> Self::Id;
}

fn next_numeric_id<V>(existing: &HashMap<u64, V>) -> u64 {
    existing.keys().max().copied().unwrap_or(0) + 1
}

impl StoredRecord for UserData {
    type Input = UserInput;

    fn validate(input: &UserInput) -> Result<(), ServiceError> {
        Ok(input.validate()?)
    }

    fn build(id: u64, input: UserInput, _now: DateTime<Utc>) -> Self {
        UserData::from_input(id, input)
    }

    fn patch(&mut self, input: UserInput, _now: DateTime<Utc>) {
        self.apply(input)
    }

    fn next_id(existing: &HashMap<u64, Self>) -> u64 {
        next_numeric_id(existing)
    }
}

impl StoredRecord for Product {
    type Input = ProductInput;

    fn validate(input: &ProductInput) -> Result<(), ServiceError> {
        Ok(input.validate()?)
    }

    fn build(id: u64, input: ProductInput, _now: DateTime<Utc>) -> Self {
        Product::from_input(id, input)
    }

    fn patch(&mut self, input: ProductInput, _now: DateTime<Utc>) {
        self.apply(input)
    }

    fn next_id(existing: &HashMap<u64, Self>) -> u64 {
        next_numeric_id(existing)
    }
}

impl StoredRecord for Order {
    type Input = OrderInput;

    fn validate(input: &OrderInput) -> Result<(), ServiceError> {
        Ok(input.validate()?)
    }

    fn build(id: u64, input: OrderInput, now: DateTime<Utc>) -> Self {
        Order::from_input(id, input, now)
    }

    fn patch(&mut self, input: OrderInput, now: DateTime<Utc>) {
        self.apply(input, now)
    }

    fn next_id(existing: &HashMap<u64, Self>) -> u64 {
        next_numeric_id(existing)
    }
}

impl StoredRecord for Notification {
    type Input = NotificationInput;

    fn validate(input: &NotificationInput) -> Result<(), ServiceError> {
        Ok(input.validate()?)
    }

    fn build(id: String, input: NotificationInput, now: DateTime<Utc>) -> Self {
        Notification::from_input(id, input, now)
    }

    fn patch(&mut self, input: NotificationInput, _now: DateTime<Utc>) {
        self.apply(input)
    }

    fn next_id(existing: &HashMap<String, Self>) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !existing.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Entity service over a JSON map store.
pub struct StoreService<R: StoredRecord> {
    store: Arc<JsonMapStore<R::Id, R>>,
}

impl<R: StoredRecord> Clone for StoreService<R> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

pub type UserService = StoreService<UserData>;
pub type ProductService = StoreService<Product>;
pub type OrderService = StoreService<Order>;
pub type NotificationService = StoreService<Notification>;

impl<R: StoredRecord> StoreService<R> {
    /// Open (or create) the JSON file at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        Ok(Self { store: JsonMapStore::new(path).await? })
    }

    pub fn in_memory() -> Self {
        Self { store: JsonMapStore::in_memory() }
    }

    /// Every record, in listing order.
    pub async fn all(&self) -> Vec<R> {
        let mut records = self.store.values().await;
        records.sort_by(R::listing_order);
        records
    }

    /// Insert `records` only when the store holds nothing yet. Returns how many were inserted.
    pub async fn seed_if_empty(&self, records: Vec<R>) -> Result<usize, ServiceError> {
        self.store
            .update_map(|map| {
                if !map.is_empty() {
                    return Ok(0);
                }
                let n = records.len();
                map.extend(records.into_iter().map(|r| (r.id().clone(), r)));
                Ok(n)
            })
            .await
    }
}

#[async_trait]
impl<R: StoredRecord> EntityService for StoreService<R> {
    type Record = R;
    type Input = R::Input;

    #[instrument(skip(self), fields(entity = R::KIND))]
    async fn list(&self, query: &ListQuery) -> Result<ListResult<R>, ServiceError> {
        let page = run_query(self.store.values().await, query)?;
        debug!(total = page.total, returned = page.items.len(), "listed");
        Ok(page)
    }

    async fn get(&self, id: &R::Id) -> Result<R, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found(R::KIND, id))
    }

    #[instrument(skip(self, input), fields(entity = R::KIND))]
    async fn create(&self, input: R::Input) -> Result<R, ServiceError> {
        R::validate(&input)?;
        let now = Utc::now();
        let record = self
            .store
            .update_map(|map| {
                let id = R::next_id(map);
                let record = R::build(id.clone(), input, now);
                map.insert(id, record.clone());
                Ok(record)
            })
            .await?;
        info!(id = %record.id(), "created");
        Ok(record)
    }

    #[instrument(skip(self, id, input), fields(entity = R::KIND, id = %id))]
    async fn update(&self, id: &R::Id, input: R::Input) -> Result<R, ServiceError> {
        R::validate(&input)?;
        let now = Utc::now();
        let record = self
            .store
            .update_map(|map| {
                let record = map.get_mut(id).ok_or_else(|| ServiceError::not_found(R::KIND, id))?;
                record.patch(input, now);
                Ok(record.clone())
            })
            .await?;
        info!("updated");
        Ok(record)
    }

    #[instrument(skip(self, id), fields(entity = R::KIND, id = %id))]
    async fn delete(&self, id: &R::Id) -> Result<(), ServiceError> {
        let existed = self.store.remove(id).await?;
        info!(existed, "deleted");
        Ok(())
    }
}

#[async_trait]
impl OrderGateway for StoreService<Order> {
    #[instrument(skip(self, update), fields(status = %update.status))]
    async fn update_status(&self, id: u64, update: OrderStatusUpdate) -> Result<Order, ServiceError> {
        let now = Utc::now();
        let order = self
            .store
            .update_map(|map| {
                let order = map.get_mut(&id).ok_or_else(|| ServiceError::not_found(Order::KIND, id))?;
                order.set_status(&update, now);
                Ok(order.clone())
            })
            .await?;
        info!(order_number = %order.order_number, "order status changed");
        Ok(order)
    }
}

#[async_trait]
impl NotificationGateway for StoreService<Notification> {
    #[instrument(skip(self))]
    async fn mark_as_read(&self, id: &str) -> Result<Notification, ServiceError> {
        self.store
            .update_map(|map| {
                let n = map.get_mut(id).ok_or_else(|| ServiceError::not_found(Notification::KIND, id))?;
                n.read = true;
                Ok(n.clone())
            })
            .await
    }

    #[instrument(skip(self))]
    async fn mark_all_as_read(&self) -> Result<u64, ServiceError> {
        let changed = self
            .store
            .update_map(|map| {
                let mut changed = 0u64;
                for n in map.values_mut().filter(|n| !n.read) {
                    n.read = true;
                    changed += 1;
                }
                Ok(changed)
            })
            .await?;
        info!(changed, "all notifications marked read");
        Ok(changed)
    }

    async fn unread_count(&self) -> Result<u64, ServiceError> {
        Ok(self.store.values().await.iter().filter(|n| !n.read).count() as u64)
    }
}
