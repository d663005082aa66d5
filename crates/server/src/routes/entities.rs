//! Generic collection endpoints shared by users, products, orders and
//! notifications.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};

use configs::ListingConfig;
use models::Entity;
use service::{EntityService, ListQuery, ListResult};

use crate::errors::ApiError;

type IdOf<S> = <<S as EntityService>::Record as Entity>::Id;

pub struct Collection<S> {
    svc: Arc<S>,
    listing: ListingConfig,
}

impl<S> Clone for Collection<S> {
    fn clone(&self) -> Self {
        Self { svc: self.svc.clone(), listing: self.listing.clone() }
    }
}

/// `GET|POST /` and `GET|PUT|DELETE /:id` over one entity service.
pub fn collection_routes<S, T>(svc: Arc<S>, listing: ListingConfig) -> Router<T>
where
    S: EntityService + 'static,
    S::Record: Serialize,
    S::Input: DeserializeOwned,
    T: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list::<S>).post(create::<S>))
        .route("/:id", get(fetch::<S>).put(update::<S>).delete(remove::<S>))
        .with_state(Collection { svc, listing })
}

async fn list<S>(
    State(c): State<Collection<S>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ListResult<S::Record>>, ApiError>
where
    S: EntityService,
    S::Record: Serialize,
{
    let mut query = ListQuery::from_params(params, c.listing.default_page_size)?;
    query.page_size = query.page_size.min(c.listing.max_page_size);
    Ok(Json(c.svc.list(&query).await?))
}

async fn fetch<S>(State(c): State<Collection<S>>, Path(id): Path<IdOf<S>>) -> Result<Json<S::Record>, ApiError>
where
    S: EntityService,
    S::Record: Serialize,
{
    Ok(Json(c.svc.get(&id).await?))
}

async fn create<S>(
    State(c): State<Collection<S>>,
    Json(input): Json<S::Input>,
) -> Result<(StatusCode, Json<S::Record>), ApiError>
where
    S: EntityService,
    S::Record: Serialize,
    S::Input: DeserializeOwned,
{
    let created = c.svc.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update<S>(
    State(c): State<Collection<S>>,
    Path(id): Path<IdOf<S>>,
    Json(input): Json<S::Input>,
) -> Result<Json<S::Record>, ApiError>
where
    S: EntityService,
    S::Record: Serialize,
    S::Input: DeserializeOwned,
{
    Ok(Json(c.svc.update(&id, input).await?))
}

async fn remove<S>(State(c): State<Collection<S>>, Path(id): Path<IdOf<S>>) -> Result<StatusCode, ApiError>
where
    S: EntityService,
{
    c.svc.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
