pub mod facturas;
pub mod inventory;
pub mod metrics;

use axum::{http::StatusCode, Json};
use serde_json::json;

/// Collection labels used in logs and metrics.
pub const INVENTORY: &str = "inventory";
pub const FACTURAS: &str = "facturas";

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": "inventario-facturas" })))
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::{build_router, AppState};

    /// A router over `inventory.json` and `facturas.json` inside `dir`.
    pub fn app(dir: &TempDir) -> Router {
        let state = AppState::new(
            dir.path().join("inventory.json"),
            dir.path().join("facturas.json"),
        );
        build_router(state, None)
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
