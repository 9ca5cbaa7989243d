//! The axum router end to end, driven with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use optica_store::api::BackendClient;
use optica_store::config::Config;
use optica_store::domain::aggregates::{Session, User};
use optica_store::domain::events::EventPublisher;
use optica_store::domain::value_objects::ClientId;
use optica_store::routes::router;
use optica_store::state::AppState;
use optica_store::store::StateStore;

fn state(server: &MockServer) -> AppState {
    let api = BackendClient::new(&server.uri(), 5).expect("failed to build test client");
    AppState::new(Config::default(), api, StateStore::memory(), EventPublisher::disabled())
}

async fn sign_in(state: &AppState, client: &str, role: &str) {
    let user = User { id: "u1".into(), name: "Asha".into(), email: "asha@example.com".into(), role: role.into() };
    state.store.client(ClientId::new(client).unwrap()).save_session(&Session { user, token: "tok".into() }).await.unwrap();
}

async fn call(app: &Router, method: &str, uri: &str, client: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(client) = client { request = request.header("x-client-id", client); }
    let request = match body {
        Some(body) => request.header("content-type", "application/json").body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

#[tokio::test]
async fn health_reports_backends() {
    let server = MockServer::start().await;
    let app = router(state(&server));
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "memory");
    assert_eq!(body["events"], false);
}

#[tokio::test]
async fn cart_requires_a_client_id() {
    let server = MockServer::start().await;
    let app = router(state(&server));
    let (status, body) = call(&app, "GET", "/api/v1/cart", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["toast"]["kind"], "error");
}

#[tokio::test]
async fn cart_is_scoped_per_client() {
    let server = MockServer::start().await;
    let app = router(state(&server));
    let item = json!({"_id": "p1", "name": "Aviator", "price": 10, "quantity": 2});

    let (status, body) = call(&app, "POST", "/api/v1/cart/items", Some("tab-a"), Some(item.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["itemCount"], 2);
    assert_eq!(body["toast"]["message"], "Aviator added to cart");
    call(&app, "POST", "/api/v1/cart/items", Some("tab-a"), Some(json!({"_id": "p2", "name": "Round", "price": 5}))).await;

    let (_, body) = call(&app, "GET", "/api/v1/cart", Some("tab-a"), None).await;
    assert_eq!(body["data"]["totals"], json!({"subtotal": 25.0, "shipping": 10.0, "tax": 2.5, "total": 37.5}));
    let (_, other) = call(&app, "GET", "/api/v1/cart", Some("tab-b"), None).await;
    assert_eq!(other["data"]["itemCount"], 0);

    let (_, body) = call(&app, "PUT", "/api/v1/cart/items", Some("tab-a"), Some(json!({"_id": "p1", "quantity": 0}))).await;
    assert_eq!(body["data"]["itemCount"], 1);
}

#[tokio::test]
async fn invalid_address_lists_fields() {
    let server = MockServer::start().await;
    let state = state(&server);
    sign_in(&state, "tab-a", "customer").await;
    let app = router(state);

    let address = json!({"fullName": "Asha", "phone": "12345", "address": "1 Main St", "city": "Pune", "state": "MH", "zipCode": "0123", "country": "India"});
    let (status, body) = call(&app, "POST", "/api/v1/addresses", Some("tab-a"), Some(address)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["phone"], "Enter a valid 10-digit mobile number");
    assert_eq!(body["fields"]["zipCode"], "Enter a valid 6-digit PIN code");
    assert_eq!(body["error"], "Enter a valid 10-digit mobile number");
    assert_eq!(body["focus"], "phone");
}

#[tokio::test]
async fn admin_routes_check_the_role() {
    let server = MockServer::start().await;
    let state = state(&server);
    sign_in(&state, "shopper", "customer").await;
    let app = router(state);

    let (status, _) = call(&app, "GET", "/api/v1/admin/inventory", Some("nobody"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, "GET", "/api/v1/admin/inventory", Some("shopper"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn inventory_filters_low_stock() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"_id": "p1", "name": "Aviator", "category": "sunglasses", "price": 100, "stock": 2},
            {"_id": "p2", "name": "Round", "category": "eyeglasses", "price": 50, "stock": 40},
            {"_id": "p3", "name": "Cat Eye", "category": "eyeglasses", "price": 80, "stock": 12, "minimumStock": 20}
        ]})))
        .mount(&server)
        .await;
    let state = state(&server);
    sign_in(&state, "desk", "admin").await;
    let app = router(state);

    let (status, body) = call(&app, "GET", "/api/v1/admin/inventory?showLowStockOnly=true&sort=stock-desc", Some("desk"), None).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body["data"]["page"]["items"].as_array().unwrap().iter().map(|p| p["_id"].as_str().unwrap().to_string()).collect();
    assert_eq!(ids, ["p3", "p1"]);
    assert_eq!(body["data"]["summary"]["lowStock"], 2);
    assert_eq!(body["data"]["categories"], json!(["sunglasses", "eyeglasses"]));
}

#[tokio::test]
async fn upstream_outage_is_a_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/api/products")).respond_with(ResponseTemplate::new(500)).mount(&server).await;
    let app = router(state(&server));

    let (status, body) = call(&app, "GET", "/api/v1/products", Some("tab-a"), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "The store service is unavailable, please try again");
}

#[tokio::test]
async fn unknown_order_status_is_rejected() {
    let server = MockServer::start().await;
    let state = state(&server);
    sign_in(&state, "desk", "admin").await;
    let app = router(state);

    let (status, _) = call(&app, "PUT", "/api/v1/admin/orders/ORD1/status", Some("desk"), Some(json!({"status": "lost"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cart_merge_sums_matching_lines() {
    let server = MockServer::start().await;
    let app = router(state(&server));
    call(&app, "POST", "/api/v1/cart/items", Some("tab-a"), Some(json!({"_id": "p1", "name": "Aviator", "price": 10, "color": "gold"}))).await;

    let other = json!([
        {"_id": "p1", "name": "Aviator", "price": 10, "color": "gold", "quantity": 2},
        {"_id": "p1", "name": "Aviator", "price": 10, "color": "black"}
    ]);
    let (status, body) = call(&app, "POST", "/api/v1/cart/merge", Some("tab-a"), Some(other)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["items"][0]["quantity"], 3);
    assert_eq!(body["data"]["itemCount"], 4);
}

#[tokio::test]
async fn deleting_the_default_address_promotes_the_next() {
    let server = MockServer::start().await;
    let state = state(&server);
    sign_in(&state, "tab-a", "customer").await;
    let app = router(state);
    let address = |name: &str| json!({"fullName": name, "phone": "9876543210", "address": "1 Main St", "city": "Pune", "state": "MH", "zipCode": "411001", "country": "India"});

    let (status, first) = call(&app, "POST", "/api/v1/addresses", Some("tab-a"), Some(address("Home"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["address"]["isDefault"], true);
    let (_, second) = call(&app, "POST", "/api/v1/addresses", Some("tab-a"), Some(address("Work"))).await;
    assert_eq!(second["data"]["address"]["isDefault"], false);

    let id = first["data"]["address"]["id"].as_str().unwrap();
    let (status, body) = call(&app, "DELETE", &format!("/api/v1/addresses/{id}"), Some("tab-a"), None).await;

    assert_eq!(status, StatusCode::OK);
    let remaining = body["data"]["addresses"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["fullName"], "Work");
    assert_eq!(remaining[0]["isDefault"], true);

    let (status, _) = call(&app, "DELETE", &format!("/api/v1/addresses/{id}"), Some("tab-a"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_password_is_a_credential_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/auth/login")).respond_with(ResponseTemplate::new(401)).mount(&server).await;
    let app = router(state(&server));

    let (status, body) = call(&app, "POST", "/api/v1/auth/login", Some("tab-a"), Some(json!({"email": "a@example.com", "password": "x"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}
