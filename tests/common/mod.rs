#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;

pub const SOUP: &str = "5000112637922";
pub const CRISPS: &str = "4006381333931";

async fn product(Path(barcode): Path<String>) -> Response {
    match barcode.as_str() {
        SOUP => Json(json!({
            "name": "Tomato Soup",
            "brand": "Acme",
            "category": "Soups",
            "health_score": "A",
            "nutrition_per_100g": {
                "calories": 45, "sugar": 3.2, "saturated_fat": 0.1, "salt": 0.2,
                "protein": 1.1, "fiber": 0.8, "fat": 0.4
            },
            "additives": []
        }))
        .into_response(),
        CRISPS => Json(json!({
            "name": "Salted Crisps",
            "brand": "Crunch Co",
            "health_score": "E",
            "nutrition_per_100g": {
                "calories": 250, "sugar": 25, "saturated_fat": 8, "salt": 1.5,
                "protein": 3, "fiber": 1, "fat": 10
            },
            "additives": ["E621", "E330"]
        }))
        .into_response(),
        "sparse" => {
            Json(json!({"name": null, "nutrition_per_100g": {"calories": null}})).into_response()
        }
        "garbled" => (StatusCode::OK, "<html>definitely not json</html>").into_response(),
        "500" => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "db down"}))).into_response()
        }
        "502" => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
        "503" => {
            let body = Json(json!({"detail": "maintenance"}));
            (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": "Product not found"}))).into_response(),
    }
}

/// Serves a fixture health API on an ephemeral port and returns its product endpoint.
pub async fn spawn_stub_api() -> String {
    let app = Router::new().route("/api/product/{barcode}", get(product));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub api");
    let addr = listener.local_addr().expect("stub api address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub api serve");
    });
    format!("http://{addr}/api/product/")
}

/// An endpoint on a port nothing listens on.
pub async fn unreachable_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind free port");
    let addr = listener.local_addr().expect("free port address");
    drop(listener);
    format!("http://{addr}/api/product/")
}
