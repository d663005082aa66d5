//! Notification read/unread ledger.
//!
//! A list loop over notifications that also tracks how many notifications are
//! unread across the whole (unfiltered) set. The counter is fetched with every
//! page and then maintained locally as the user marks or deletes items, without
//! re-fetching.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use models::notification::Notification;

use crate::entity_service::NotificationGateway;
use crate::errors::ServiceError;
use crate::listing::ListQuery;
use crate::sync::{Fetched, ListSource, ListState, ListSync, LoadOutcome};

/// Fetches a page together with the unfiltered unread count.
pub struct UnreadFeed<S>(pub Arc<S>);

#[async_trait]
impl<S: NotificationGateway> ListSource for UnreadFeed<S> {
    type Item = Notification;
    type Extra = u64;

    async fn fetch(&self, query: &ListQuery) -> Result<Fetched<Notification, u64>, ServiceError> {
        let (page, unread) = tokio::try_join!(self.0.list(query), self.0.unread_count())?;
        Ok(Fetched { page, extra: unread })
    }
}

pub struct NotificationLedger<S: NotificationGateway> {
    sync: ListSync<UnreadFeed<S>>,
}

impl<S: NotificationGateway> NotificationLedger<S> {
    pub fn new(service: Arc<S>, page_size: u32) -> Self {
        Self { sync: ListSync::new(UnreadFeed(service), ListQuery::new(page_size)) }
    }

    fn service(&self) -> &Arc<S> {
        &self.sync.source().0
    }

    pub async fn load(&self) -> LoadOutcome {
        self.sync.reload().await
    }

    pub async fn set_filter(&self, name: impl Into<String>, value: impl Into<String>) -> LoadOutcome {
        self.sync.set_filter(name, value).await
    }

    pub async fn clear_filter(&self, name: &str) -> LoadOutcome {
        self.sync.clear_filter(name).await
    }

    pub async fn set_search(&self, text: impl Into<String>) -> LoadOutcome {
        self.sync.set_search(text).await
    }

    pub async fn set_page(&self, page: u32) -> LoadOutcome {
        self.sync.set_page(page).await
    }

    pub fn state(&self) -> ListState<Notification> {
        self.sync.state()
    }

    pub fn unread_count(&self) -> u64 {
        self.sync.extra()
    }

    pub fn detach(&self) {
        self.sync.detach()
    }

    /// Mark one notification read. The displayed item flips and the counter
    /// drops only if the item is shown and was unread.
    #[instrument(skip(self))]
    pub async fn mark_as_read(&self, id: &str) -> Result<(), ServiceError> {
        self.service().mark_as_read(id).await?;
        self.sync.patch(|state, unread| {
            if let Some(n) = state.items.iter_mut().find(|n| n.id == id && !n.read) {
                n.read = true;
                *unread = unread.saturating_sub(1);
            }
        });
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_all_as_read(&self) -> Result<(), ServiceError> {
        let changed = self.service().mark_all_as_read().await?;
        debug!(changed, "marked all read");
        self.sync.patch(|state, unread| {
            state.items.iter_mut().for_each(|n| n.read = true);
            *unread = 0;
        });
        Ok(())
    }

    /// Delete a notification and drop it from the displayed page.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.service().delete(&id.to_string()).await?;
        self.sync.patch(|state, unread| {
            if let Some(pos) = state.items.iter().position(|n| n.id == id) {
                let removed = state.items.remove(pos);
                state.total = state.total.saturating_sub(1);
                if !removed.read {
                    *unread = unread.saturating_sub(1);
                }
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_service::EntityService;
    use crate::seed;
    use crate::store_service::NotificationService;
    use chrono::Utc;
    use models::notification::{NotificationCategory, NotificationInput, NotificationType};

    async fn ledger() -> (Arc<NotificationService>, NotificationLedger<NotificationService>) {
        let svc = Arc::new(NotificationService::in_memory());
        svc.seed_if_empty(seed::demo_notifications(Utc::now())).await.unwrap();
        let ledger = NotificationLedger::new(svc.clone(), 10);
        assert!(ledger.load().await.is_applied());
        (svc, ledger)
    }

    fn ids(ledger: &NotificationLedger<NotificationService>) -> Vec<String> {
        ledger.state().items.into_iter().map(|n| n.id).collect()
    }

    #[tokio::test]
    async fn read_unread_walkthrough() {
        let (_svc, ledger) = ledger().await;
        assert_eq!(ids(&ledger), ["1", "2", "3", "4"]);
        assert_eq!(ledger.unread_count(), 2);

        ledger.mark_as_read("1").await.unwrap();
        assert_eq!(ledger.unread_count(), 1);

        ledger.delete("3").await.unwrap();
        assert_eq!(ledger.unread_count(), 1);
        assert_eq!(ledger.state().items.len(), 3);
        assert_eq!(ledger.state().total, 3);

        ledger.mark_all_as_read().await.unwrap();
        assert_eq!(ledger.unread_count(), 0);
        assert!(ledger.state().items.iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn marking_a_read_item_changes_nothing() {
        let (_svc, ledger) = ledger().await;
        let before = ledger.state();
        ledger.mark_as_read("4").await.unwrap();
        assert_eq!(ledger.unread_count(), 2);
        assert_eq!(ledger.state(), before);
    }

    #[tokio::test]
    async fn deleting_unread_item_decrements_counter() {
        let (svc, ledger) = ledger().await;
        ledger.delete("2").await.unwrap();
        assert_eq!(ledger.unread_count(), 1);
        assert_eq!(svc.unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_mark_leaves_state_alone() {
        let (_svc, ledger) = ledger().await;
        let before = ledger.state();
        let err = ledger.mark_as_read("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(ledger.state(), before);
        assert_eq!(ledger.unread_count(), 2);
    }

    #[tokio::test]
    async fn counter_tracks_unfiltered_set() {
        let (svc, ledger) = ledger().await;
        ledger.set_filter("read", "true").await;
        assert_eq!(ids(&ledger), ["3", "4"]);
        assert_eq!(ledger.state().total, 2);
        assert_eq!(ledger.unread_count(), 2);

        // not displayed under this filter: the server changes, the local counter does not
        ledger.mark_as_read("1").await.unwrap();
        assert_eq!(ledger.unread_count(), 2);
        ledger.clear_filter("read").await;
        assert_eq!(ledger.unread_count(), 1);

        svc.push(NotificationInput {
            kind: NotificationType::Warning,
            title: "Low stock".into(),
            message: "Webcam HD below threshold".into(),
            link_to: None,
            category: NotificationCategory::Product,
            data: None,
        })
        .await
        .unwrap();
        ledger.load().await;
        assert_eq!(ledger.unread_count(), 2);
        assert_eq!(ledger.state().items[0].title, "Low stock");
        assert_eq!(svc.list(&ListQuery::new(10)).await.unwrap().total, 5);
    }
}
