//! REST-backed entity services.
//!
//! The same [`EntityService`] contract spoken over HTTP/JSON against the admin
//! API. Queries travel as `q`, `page`, `page_size` plus one parameter per
//! filter; non-success responses are mapped back onto [`ServiceError`].

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use common::types::{CountBody, ErrorBody};
use models::notification::{Notification, NotificationInput};
use models::order::{Order, OrderStatusUpdate};
use models::Entity;

use crate::auth::domain::{AuthSession, LoginInput};
use crate::entity_service::{EntityService, NotificationGateway, OrderGateway};
use crate::errors::ServiceError;
use crate::listing::{ListQuery, ListResult};

/// Map an HTTP failure status (and the error body, if any) onto a service error.
pub fn status_error(status: StatusCode, body: Option<ErrorBody>) -> ServiceError {
    let message = body
        .map(|b| b.message().to_string())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ServiceError::Validation(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized(message),
        _ => ServiceError::Unavailable(format!("{status}: {message}")),
    }
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    ServiceError::Unavailable(e.to_string())
}

async fn error_from(resp: Response) -> ServiceError {
    let status = resp.status();
    let body = resp.json::<ErrorBody>().await.ok();
    status_error(status, body)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ServiceError> {
    if !resp.status().is_success() {
        return Err(error_from(resp).await);
    }
    resp.json::<T>()
        .await
        .map_err(|e| ServiceError::Unavailable(format!("invalid response body: {e}")))
}

/// Connection settings shared by every REST-backed service.
#[derive(Clone, Debug)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), token: None })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.client.request(method, url);
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// A typed service for the collection at `/api/{resource}`.
    pub fn resource<R, I>(&self, resource: &str) -> RestEntityService<R, I> {
        RestEntityService {
            http: self.clone(),
            endpoint: format!("{}/api/{}", self.base_url, resource.trim_matches('/')),
            _types: PhantomData,
        }
    }

    /// Exchange credentials for a session token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, ServiceError> {
        let body = LoginInput { username: username.to_string(), password: password.to_string() };
        let resp = self
            .request(Method::POST, &format!("{}/auth/login", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(resp).await
    }
}

/// Entity service speaking to one REST collection.
pub struct RestEntityService<R, I> {
    http: RestClient,
    endpoint: String,
    _types: PhantomData<fn() -> (R, I)>,
}

impl<R, I> Clone for RestEntityService<R, I> {
    fn clone(&self) -> Self {
        Self { http: self.http.clone(), endpoint: self.endpoint.clone(), _types: PhantomData }
    }
}

impl<R, I> RestEntityService<R, I> {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn item_url(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{}", self.endpoint, id)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ServiceError> {
        req.send().await.map_err(transport_error)
    }
}

#[async_trait]
impl<R, I> EntityService for RestEntityService<R, I>
where
    R: Entity + DeserializeOwned + Clone + Send + Sync + 'static,
    I: Serialize + Send + Sync + 'static,
{
    type Record = R;
    type Input = I;

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn list(&self, query: &ListQuery) -> Result<ListResult<R>, ServiceError> {
        let req = self.http.request(Method::GET, &self.endpoint).query(&query.to_params());
        let page: ListResult<R> = decode(self.send(req).await?).await?;
        debug!(total = page.total, "remote list");
        Ok(page)
    }

    async fn get(&self, id: &R::Id) -> Result<R, ServiceError> {
        let req = self.http.request(Method::GET, &self.item_url(id));
        decode(self.send(req).await?).await
    }

    async fn create(&self, input: I) -> Result<R, ServiceError> {
        let req = self.http.request(Method::POST, &self.endpoint).json(&input);
        decode(self.send(req).await?).await
    }

    async fn update(&self, id: &R::Id, input: I) -> Result<R, ServiceError> {
        let req = self.http.request(Method::PUT, &self.item_url(id)).json(&input);
        decode(self.send(req).await?).await
    }

    async fn delete(&self, id: &R::Id) -> Result<(), ServiceError> {
        let resp = self.send(self.http.request(Method::DELETE, &self.item_url(id))).await?;
        if resp.status().is_success() || resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(error_from(resp).await)
    }
}

#[async_trait]
impl<I> OrderGateway for RestEntityService<Order, I>
where
    I: Serialize + Send + Sync + 'static,
{
    async fn update_status(&self, id: u64, update: OrderStatusUpdate) -> Result<Order, ServiceError> {
        let req = self.http.request(Method::PATCH, &format!("{}/status", self.item_url(id))).json(&update);
        decode(self.send(req).await?).await
    }
}

#[async_trait]
impl NotificationGateway for RestEntityService<Notification, NotificationInput> {
    async fn mark_as_read(&self, id: &str) -> Result<Notification, ServiceError> {
        let req = self.http.request(Method::POST, &format!("{}/read", self.item_url(id)));
        decode(self.send(req).await?).await
    }

    async fn mark_all_as_read(&self) -> Result<u64, ServiceError> {
        let req = self.http.request(Method::POST, &format!("{}/read-all", self.endpoint));
        let body: CountBody = decode(self.send(req).await?).await?;
        Ok(body.count)
    }

    async fn unread_count(&self) -> Result<u64, ServiceError> {
        let req = self.http.request(Method::GET, &format!("{}/unread-count", self.endpoint));
        let body: CountBody = decode(self.send(req).await?).await?;
        Ok(body.count)
    }
}
