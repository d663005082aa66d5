//! Service layer for the admin console.
//! - Entity services over JSON stores or over the REST API, behind one contract.
//! - List queries, the list synchronization loop, mutation-then-refresh and the
//!   notification read/unread ledger built on top of that contract.
//! - Auth, profile, settings, preferences and dashboard services.

pub mod errors;
pub mod pagination;
pub mod listing;
pub mod entity_service;
pub mod storage;
pub mod store_service;
pub mod remote;
pub mod sync;
pub mod mutation;
pub mod ledger;
pub mod auth;
pub mod profile_service;
pub mod settings_service;
pub mod preferences;
pub mod dashboard_service;
pub mod seed;
pub mod runtime;

pub use entity_service::{EntityService, NotificationGateway, OrderGateway};
pub use errors::ServiceError;
pub use listing::{ListQuery, ListResult};
