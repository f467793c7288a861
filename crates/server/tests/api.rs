use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use db::{DBService, models::homepage_component::HomepageComponent};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{AppState, config::ServerConfig, routes};
use services::services::image_store::ImageStore;
use tower::ServiceExt;

async fn test_app() -> (Router, tempfile::TempDir) {
    let db = DBService::new_in_memory().await.unwrap();
    HomepageComponent::ensure_defaults(&db.pool).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let images = ImageStore::new(dir.path().to_path_buf()).await.unwrap();

    let state = AppState {
        db,
        images,
        config: ServerConfig::from_env(),
    };
    (routes::router(state), dir)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = test_app().await;

    let response = app.oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "ok");
}

#[tokio::test]
async fn test_category_crud_and_validation() {
    let (app, _dir) = test_app().await;

    // Empty name is rejected before touching the database.
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/categories", json!({"name": "  "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/categories",
            json!({"name": "Fresh Produce"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["data"]["slug"], "fresh-produce");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // Save-then-reload reflects the saved values.
    let response = app
        .clone()
        .oneshot(get_request("/api/categories"))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["name"], "Fresh Produce");

    // Duplicate slug surfaces as a conflict.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/categories",
            json!({"name": "Fresh Produce"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Delete removes the row from the next fetch.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/categories/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request(&format!("/api/categories/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_homepage_components_seeded_and_toggled() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(get_request("/api/homepage-components"))
        .await
        .unwrap();
    let listed = body_json(response).await;
    let components = listed["data"].as_array().unwrap().clone();
    assert_eq!(components.len(), 6);

    let first_id = components[0]["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/homepage-components/{first_id}/visibility"),
            json!({"is_visible": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let toggled = body_json(response).await;
    assert_eq!(toggled["data"]["is_visible"], false);

    // The hidden section no longer appears in the storefront payload.
    let response = app
        .clone()
        .oneshot(get_request("/api/storefront/home"))
        .await
        .unwrap();
    let home = body_json(response).await;
    assert_eq!(home["data"]["sections"].as_array().unwrap().len(), 5);

    // Attaching an unknown collection is rejected.
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/homepage-components/{first_id}/collection"),
            json!({"collection_id": uuid::Uuid::new_v4()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_status_flow_over_http() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders",
            json!({
                "items": [
                    {"name": "Gift wrap", "quantity": 2, "unit_price_cents": 150}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["data"]["status"], "pending");
    assert_eq!(created["data"]["total_cents"], 300);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // Pending cannot jump straight to shipped.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/orders/{id}/status"),
            json!({"status": "shipped"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/orders/{id}/status"),
            json!({"status": "confirmed"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let confirmed = body_json(response).await;
    assert_eq!(confirmed["data"]["status"], "confirmed");
    assert_eq!(confirmed["data"]["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reorder_persists_submitted_positions() {
    let (app, _dir) = test_app().await;

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/categories", json!({"name": name})))
            .await
            .unwrap();
        let created = body_json(response).await;
        ids.push(created["data"]["id"].as_str().unwrap().to_string());
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/categories/reorder",
            json!({"ordered_ids": [ids[2], ids[0], ids[1]]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/api/categories")).await.unwrap();
    let listed = body_json(response).await;
    let names: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["C", "A", "B"]);
}
