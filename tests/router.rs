//! In-process tests driving the router directly.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use car_pooling::config::ServiceConfig;
use car_pooling::HttpServer;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(config: ServiceConfig) -> Router {
    HttpServer::new(config).router()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_locate_pending_is_no_content() {
    let app = app(ServiceConfig::default());

    let res = app
        .clone()
        .oneshot(json_request(Method::PUT, "/cars", json!([{ "id": 1, "seats": 4 }])))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(Method::POST, "/journey", json!({ "id": 1, "people": 5 })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let res = app.clone().oneshot(form_request("/locate", "ID=1")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.oneshot(form_request("/locate", "ID=2")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_car_ids_rejected() {
    let app = app(ServiceConfig::default());

    let res = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/cars",
            json!([{ "id": 1, "seats": 4 }, { "id": 1, "seats": 5 }]),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .oneshot(Request::get("/admin/fleet").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(res).await, json!([]));
}

#[tokio::test]
async fn test_admin_snapshots() {
    let app = app(ServiceConfig::default());

    app.clone()
        .oneshot(json_request(Method::PUT, "/cars", json!([{ "id": 3, "maxSeats": 5 }])))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request(Method::POST, "/journey", json!({ "id": 7, "passengers": 2 })))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request(Method::POST, "/journey", json!({ "id": 8, "passengers": 2 })))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(Request::get("/admin/journeys").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        body_json(res).await,
        json!([
            { "id": 7, "passengers": 2, "state": "active", "car": 3 },
            { "id": 8, "passengers": 2, "state": "pending", "car": null },
        ])
    );

    let res = app
        .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = body_json(res).await;
    assert_eq!(status["status"], "operational");
    assert_eq!(
        status["engine"],
        json!({ "cars": 1, "active_journeys": 1, "pending_journeys": 1, "free_seats": 3 })
    );
}

#[tokio::test]
async fn test_admin_disabled() {
    let mut config = ServiceConfig::default();
    config.admin.enabled = false;
    let app = app(config);

    let res = app
        .oneshot(Request::get("/admin/fleet").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_body_limit() {
    let mut config = ServiceConfig::default();
    config.limits.max_body_size = 64;
    let app = app(config);

    let cars: Vec<Value> = (1..=20).map(|id| json!({ "id": id, "seats": 4 })).collect();
    let res = app
        .oneshot(json_request(Method::PUT, "/cars", Value::Array(cars)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_locate_rejects_non_positive_id() {
    let server = HttpServer::new(ServiceConfig::default());
    let app = server.router();

    app.clone()
        .oneshot(json_request(Method::PUT, "/cars", json!([{ "id": 1, "seats": 4 }])))
        .await
        .unwrap();

    for body in ["ID=0", "ID=-3"] {
        let res = app.clone().oneshot(form_request("/locate", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", body);
    }
    assert_eq!(server.engine().stats().cars, 1);
}

#[tokio::test]
async fn test_router_shares_engine_with_server() {
    let mut config = ServiceConfig::default();
    config.admin.enabled = false;
    let server = HttpServer::new(config);
    assert!(!server.config().admin.enabled);
    let app = server.router();

    app.clone()
        .oneshot(json_request(Method::PUT, "/cars", json!([{ "id": 2, "seats": 6 }])))
        .await
        .unwrap();
    let res = app
        .oneshot(json_request(Method::POST, "/journey", json!({ "id": 4, "people": 5 })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let engine = server.engine();
    assert_eq!(engine.fleet()[0].available_seats, 1);
    assert_eq!(engine.stats().active_journeys, 1);
    assert_eq!(engine.check_invariants(), Ok(()));
}
