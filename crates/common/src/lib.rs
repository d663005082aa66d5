//! Shared building blocks for the admin console crates:
//! logging setup, runtime environment checks and wire types that both the
//! HTTP server and the REST client agree on.

pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn error_body_roundtrips_through_json() {
        let body = types::ErrorBody::new("Not Found", 1003, "user 7 not found");
        let text = serde_json::to_string(&body).unwrap();
        let back: types::ErrorBody = serde_json::from_str(&text).unwrap();
        assert_eq!(back, body);
    }
}
