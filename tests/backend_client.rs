//! `BackendClient` against a local `wiremock` server: envelope handling,
//! bearer tokens and error classification.

use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use optica_store::api::{ApiError, BackendClient, LoginRequest, PRODUCT_DETAIL_TIMEOUT};
use optica_store::domain::aggregates::OrderStatus;
use optica_store::notify::{Audience, EmailMessage};
use optica_store::views::catalog::CatalogQuery;

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri(), 5).expect("failed to build test client")
}

#[tokio::test]
async fn list_products_sends_only_selected_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("brand", "Ray-Ban"))
        .and(query_param("limit", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"_id": "p1", "name": "Wayfarer", "price": 1499, "stock": "4"}],
            "pagination": {"page": 1, "limit": 12, "total": 1, "pages": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = CatalogQuery { limit: Some(12), brand: Some("Ray-Ban".into()), gender: Some("all".into()), ..CatalogQuery::default() }.normalized();
    let page = client(&server).list_products(&query).await.unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].stock, 4);
    assert_eq!(page.pagination.unwrap().total, 1);
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or_default().contains("gender"));
}

#[tokio::test]
async fn get_product_accepts_bare_and_wrapped_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "p1", "name": "Aviator"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"_id": "p2", "name": "Round"}})))
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(api.get_product("p1").await.unwrap().name, "Aviator");
    assert_eq!(api.get_product("p2").await.unwrap().name, "Round");
}

#[tokio::test]
async fn not_found_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Product not found"})))
        .mount(&server)
        .await;

    let err = client(&server).get_product("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ApiError::Status { status: 404, ref message } if message == "Product not found"));
}

#[tokio::test]
async fn unauthorized_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .mount(&server)
        .await;

    let err = client(&server).with_token("stale").validate().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn success_false_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "Invalid credentials"})))
        .mount(&server)
        .await;

    let request = LoginRequest { email: "a@example.com".into(), password: "nope".into() };
    let err = client(&server).login(&request).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "Invalid credentials"));
}

#[tokio::test]
async fn update_stock_patches_absolute_value() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/products/p1"))
        .and(header("authorization", "Bearer admin-token"))
        .and(body_json(json!({"stock": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).with_token("admin-token").update_stock("p1", 7).await.unwrap();
}

#[tokio::test]
async fn update_order_status_puts_order_id_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/orders"))
        .and(body_json(json!({"orderId": "ORD1", "status": "shipped"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).with_token("t").update_order_status("ORD1", OrderStatus::Shipped).await.unwrap();
}

#[tokio::test]
async fn create_order_without_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {}})))
        .mount(&server)
        .await;

    let draft = serde_json::from_value(json!({
        "items": [], "shippingAddress": {}, "paymentMethod": "cod",
        "subtotal": 0, "shipping": 0, "tax": 0, "total": 0
    }))
    .unwrap();
    assert!(matches!(client(&server).create_order(&draft).await, Err(ApiError::Rejected(_))));
}

#[tokio::test]
async fn emails_go_to_the_audience_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/admin/send-email")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&server).await;
    Mock::given(method("POST")).and(path("/api/send-email")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&server).await;

    let message = EmailMessage { to: "a@example.com".into(), subject: "s".into(), html: "<p>h</p>".into(), text: "h".into() };
    let api = client(&server);
    api.send_email(Audience::Admin, &message).await.unwrap();
    api.send_email(Audience::Customer, &message).await.unwrap();
}

#[tokio::test]
async fn list_orders_filters_by_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(query_param("userId", "u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "orders": [{"_id": "o1", "orderId": "ORD1", "status": "processing"}]})))
        .mount(&server)
        .await;

    let orders = client(&server).list_orders(Some("u1")).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Processing);
}

#[tokio::test]
async fn product_detail_gives_up_before_the_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "slow"})).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let api = BackendClient::new(&server.uri(), 30).unwrap();
    assert_eq!(api.detail_timeout(), PRODUCT_DETAIL_TIMEOUT);
    assert_eq!(PRODUCT_DETAIL_TIMEOUT, Duration::from_secs(8));

    let started = Instant::now();
    let err = api.with_detail_timeout(Duration::from_millis(200)).get_product("slow").await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(_)), "unexpected error: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn malformed_orders_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": [
            {"_id": "o1", "orderId": "ORD1", "status": "pending"},
            {"_id": "o2", "orderId": "ORD2", "status": "Shipped"},
            {"_id": "o3", "orderId": "ORD3", "status": "lost"}
        ]})))
        .mount(&server)
        .await;

    let orders = client(&server).list_orders(None).await.unwrap();
    let statuses: Vec<_> = orders.iter().map(|o| (o.number(), o.status)).collect();
    assert_eq!(statuses, [("ORD1", OrderStatus::Pending), ("ORD2", OrderStatus::Shipped)]);
}
