//! HTTP API for the admin console: JWT-guarded JSON endpoints over the
//! entity, settings, profile and dashboard services.

pub mod errors;
pub mod routes;
pub mod startup;
pub mod state;

pub use routes::build_router;
pub use startup::run;
pub use state::{AppContext, AppState};
