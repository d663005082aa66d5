//! Storage abstractions for service layer
//!
//! File-backed stores shared by the entity services: a keyed map for record
//! collections and a single-document store for settings-like state.

pub mod json_doc_store;
pub mod json_map_store;

pub use json_doc_store::JsonDocStore;
pub use json_map_store::JsonMapStore;
