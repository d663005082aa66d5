//! Domain records for the admin console: users, products, orders,
//! notifications, the administrator profile, system settings and dashboard
//! aggregates. Validation lives next to each input type.

pub mod errors;
pub mod entity;
pub mod user;
pub mod product;
pub mod order;
pub mod notification;
pub mod profile;
pub mod settings;
pub mod dashboard;
pub mod preferences;

pub use entity::Entity;
