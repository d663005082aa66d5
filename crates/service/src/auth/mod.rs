//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Administrator accounts, password hashing and JWT sessions used by the
//! admin API and the profile service.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthConfig, AuthService};
