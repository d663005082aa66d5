//! List synchronization loop.
//!
//! A [`ListSync`] owns the displayed state of one list screen: the current
//! query, the visible page, the total match count, and loading/error flags.
//! Every fetch is tagged with a sequence number and only the response to the
//! most recently issued fetch may touch the state, so a slow response to an old
//! query can never overwrite a newer one.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::entity_service::EntityService;
use crate::errors::ServiceError;
use crate::listing::{ListQuery, ListResult};

/// One page of items plus whatever the source fetches alongside it.
#[derive(Clone, Debug, PartialEq)]
pub struct Fetched<T, X> {
    pub page: ListResult<T>,
    pub extra: X,
}

/// Where a [`ListSync`] gets its pages from.
#[async_trait]
pub trait ListSource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;
    /// Side data fetched together with every page and applied under the same guard.
    type Extra: Clone + Default + Send + Sync + 'static;

    async fn fetch(&self, query: &ListQuery) -> Result<Fetched<Self::Item, Self::Extra>, ServiceError>;
}

/// Plain list source over an entity service.
pub struct EntityList<S>(pub Arc<S>);

#[async_trait]
impl<S: EntityService> ListSource for EntityList<S> {
    type Item = S::Record;
    type Extra = ();

    async fn fetch(&self, query: &ListQuery) -> Result<Fetched<S::Record, ()>, ServiceError> {
        let page = self.0.list(query).await?;
        Ok(Fetched { page, extra: () })
    }
}

/// Displayed state of a list screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ListState<T> {
    pub query: ListQuery,
    pub items: Vec<T>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
}

/// What a consumer should render for a [`ListState`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    Loading,
    /// A fetch is in flight while the previous items stay on screen.
    Refreshing,
    Error(String),
    Empty,
    Ready,
}

impl<T> ListState<T> {
    fn new(query: ListQuery) -> Self {
        Self { query, items: Vec::new(), total: 0, loading: false, error: None }
    }

    /// An error with a stale list still renders as an error. A fetch in flight is
    /// `Loading` over an empty list and `Refreshing` over displayed items.
    pub fn view(&self) -> ListView {
        if let Some(e) = &self.error {
            return ListView::Error(e.clone());
        }
        if self.loading {
            return if self.items.is_empty() { ListView::Loading } else { ListView::Refreshing };
        }
        if self.items.is_empty() {
            ListView::Empty
        } else {
            ListView::Ready
        }
    }
}

/// Result of feeding a response back into the loop.
#[derive(Debug, PartialEq)]
pub enum LoadOutcome {
    Applied,
    /// The fetch failed; the error was recorded and items/total kept.
    Failed(ServiceError),
    /// A newer fetch was issued meanwhile; the response was dropped.
    Stale,
    /// The loop was detached; nothing was applied.
    Detached,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied)
    }
}

/// Handle for one in-flight fetch.
#[derive(Clone, Debug)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: ListQuery,
}

struct Inner<T, X> {
    state: ListState<T>,
    extra: X,
    latest_seq: u64,
    detached: bool,
}

pub struct ListSync<F: ListSource> {
    source: F,
    inner: Mutex<Inner<F::Item, F::Extra>>,
}

impl<F: ListSource> ListSync<F> {
    pub fn new(source: F, query: ListQuery) -> Self {
        let inner = Inner { state: ListState::new(query.normalized()), extra: F::Extra::default(), latest_seq: 0, detached: false };
        Self { source, inner: Mutex::new(inner) }
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, Inner<F::Item, F::Extra>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ListState<F::Item> {
        self.lock().state.clone()
    }

    pub fn query(&self) -> ListQuery {
        self.lock().state.query.clone()
    }

    pub fn extra(&self) -> F::Extra {
        self.lock().extra.clone()
    }

    pub fn is_detached(&self) -> bool {
        self.lock().detached
    }

    /// Stop applying responses. Fetches already in flight complete as `Detached`.
    pub fn detach(&self) {
        self.lock().detached = true;
        debug!("list detached");
    }

    /// Issue a new sequence number for the current query and mark the list loading.
    pub fn begin_fetch(&self) -> Option<FetchTicket> {
        let mut inner = self.lock();
        if inner.detached {
            return None;
        }
        inner.latest_seq += 1;
        inner.state.loading = true;
        Some(FetchTicket { seq: inner.latest_seq, query: inner.state.query.clone() })
    }

    /// Apply a response if it belongs to the latest fetch.
    pub fn complete(&self, ticket: &FetchTicket, result: Result<Fetched<F::Item, F::Extra>, ServiceError>) -> LoadOutcome {
        let mut inner = self.lock();
        if inner.detached {
            return LoadOutcome::Detached;
        }
        if ticket.seq != inner.latest_seq {
            debug!(seq = ticket.seq, latest = inner.latest_seq, "dropping stale list response");
            return LoadOutcome::Stale;
        }
        inner.state.loading = false;
        match result {
            Ok(fetched) => {
                inner.state.items = fetched.page.items;
                inner.state.total = fetched.page.total;
                inner.state.error = None;
                inner.extra = fetched.extra;
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(seq = ticket.seq, error = %e, "list fetch failed");
                inner.state.error = Some(e.message().to_string());
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Fetch with the current query.
    pub async fn reload(&self) -> LoadOutcome {
        let Some(ticket) = self.begin_fetch() else {
            return LoadOutcome::Detached;
        };
        let result = self.source.fetch(&ticket.query).await;
        self.complete(&ticket, result)
    }

    /// Replace the query and fetch. A query that selects a different result set
    /// (search, filters or page size changed) always starts at page 1.
    pub async fn set_query(&self, query: ListQuery) -> LoadOutcome {
        {
            let mut inner = self.lock();
            let mut next = query.normalized();
            if !next.same_selection(&inner.state.query) {
                next.page = 1;
            }
            inner.state.query = next;
        }
        self.reload().await
    }

    fn edit_query(&self, f: impl FnOnce(&mut ListQuery)) -> ListQuery {
        let mut q = self.query();
        f(&mut q);
        q
    }

    pub async fn set_search(&self, text: impl Into<String>) -> LoadOutcome {
        let text = text.into();
        let q = self.edit_query(|q| q.search = Some(text));
        self.set_query(q).await
    }

    pub async fn set_filter(&self, name: impl Into<String>, value: impl Into<String>) -> LoadOutcome {
        let (name, value) = (name.into(), value.into());
        let q = self.edit_query(|q| {
            q.filters.insert(name, value);
        });
        self.set_query(q).await
    }

    pub async fn clear_filter(&self, name: &str) -> LoadOutcome {
        let q = self.edit_query(|q| {
            q.filters.remove(name);
        });
        self.set_query(q).await
    }

    pub async fn set_page(&self, page: u32) -> LoadOutcome {
        let q = self.edit_query(|q| q.page = page);
        self.set_query(q).await
    }

    pub async fn set_page_size(&self, page_size: u32) -> LoadOutcome {
        let q = self.edit_query(|q| q.page_size = page_size);
        self.set_query(q).await
    }

    /// Edit the displayed state in place without fetching. Ignored once detached.
    pub fn patch<R>(&self, f: impl FnOnce(&mut ListState<F::Item>, &mut F::Extra) -> R) -> Option<R> {
        let mut inner = self.lock();
        if inner.detached {
            return None;
        }
        let Inner { state, extra, .. } = &mut *inner;
        Some(f(state, extra))
    }
}
