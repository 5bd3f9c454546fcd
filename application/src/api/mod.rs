//! HTTP API definitions.

pub mod rental;
pub mod rentals;

use axum::{routing::get, Router};

pub use self::rental::Rental;

/// Creates a new [`Router`] serving the HTTP API.
///
/// Handlers expect the [`Service`] to be provided as an [`Extension`] layer.
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/rentals", get(rentals::list))
        .route("/rentals/:id", get(rental::get))
}

/// Describes the request parameter with the provided `name` as malformed.
fn invalid_parameter(name: &str) -> String {
    format!("invalid parameter: {name}")
}

#[cfg(test)]
mod spec {
    use axum::{body::Body, Extension, Router};
    use http::{Request, StatusCode};
    use service::infra::{postgres, Postgres};
    use tower::ServiceExt as _;

    use crate::Service;

    /// Builds the [`Router`] backed by a [`Postgres`] nobody listens for.
    fn app() -> Router {
        let conf = postgres::Config {
            host: Some("127.0.0.1".to_owned()),
            port: Some(1),
            user: Some("postgres".to_owned()),
            dbname: Some("postgres".to_owned()),
            ..postgres::Config::default()
        };
        let service = Service::new(
            service::Config {
                near_threshold_radius: 1.0,
            },
            Postgres::new(&conf).unwrap(),
        );
        super::router().layer(Extension(service))
    }

    async fn call(uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn rejects_bad_params_before_touching_database() {
        let (status, body) =
            call("/rentals?sort=name;DROP%20TABLE%20rentals&limit=-1").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
        assert_eq!(
            body["errors"],
            serde_json::json!([
                "invalid parameter: sort",
                "invalid parameter: limit",
            ]),
        );
    }

    #[tokio::test]
    async fn rejects_non_numeric_id() {
        let (status, body) = call("/rentals/abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["errors"],
            serde_json::json!(["invalid parameter: id"]),
        );
    }

    #[tokio::test]
    async fn hides_storage_failures() {
        let (status, body) = call("/rentals?price_min=100").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({
                "code": "INTERNAL_SERVER_ERROR",
                "error": "Internal server error",
            }),
        );
    }
}
