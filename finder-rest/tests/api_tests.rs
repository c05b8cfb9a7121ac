//! HTTP tests for the restaurant API

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{test as actix_test, App};
use serde_json::{json, Value};

use finder_rest::{configure, RateLimitConfig, RateLimiter, RestaurantService};
use finder_store::InMemoryStore;

fn unlimited() -> Arc<RateLimiter> {
    Arc::new(RateLimiter::new(RateLimitConfig {
        enabled: false,
        ..Default::default()
    }))
}

fn service() -> Arc<RestaurantService> {
    Arc::new(RestaurantService::new(Arc::new(InMemoryStore::new())))
}

fn cafe_delight() -> Value {
    json!({
        "name": "Cafe Delight",
        "address": "123 Main St, New York, NY",
        "latitude": 40.7112,
        "longitude": -74.0055
    })
}

const SEARCH_NEW_YORK: &str =
    "/v1/restaurants?city=New%20York&latitude=40.7128&longitude=-74.0060&distance=1000";

#[actix_rt::test]
async fn test_restaurant_lifecycle() {
    let app = actix_test::init_service(App::new().configure(configure(service(), unlimited(), None))).await;

    // Create
    let req = actix_test::TestRequest::post()
        .uri("/v1/restaurants")
        .set_json(cafe_delight())
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = actix_test::read_body_json(resp).await;
    assert_eq!(created["statusCode"], 201);
    assert_eq!(created["restaurant"]["name"], "Cafe Delight");
    let id = created["restaurant"]["id"].as_str().unwrap().to_string();

    // Search
    let req = actix_test::TestRequest::get().uri(SEARCH_NEW_YORK).to_request();
    let found: Value = actix_test::call_and_read_body_json(&app, req).await;
    let restaurants = found["restaurants"].as_array().unwrap();
    assert_eq!(restaurants.len(), 1);
    assert_eq!(restaurants[0]["id"], id.as_str());

    // Fetch
    let req = actix_test::TestRequest::get()
        .uri(&format!("/v1/restaurants/{id}"))
        .to_request();
    let fetched: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["address"], "123 Main St, New York, NY");
    assert!(fetched.get("location").is_none());

    // Delete
    let req = actix_test::TestRequest::delete()
        .uri(&format!("/v1/restaurants/{id}"))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "response": "Restaurant deleted" }));

    // Gone
    let req = actix_test::TestRequest::get()
        .uri(&format!("/v1/restaurants/{id}"))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_update_restaurant() {
    let app = actix_test::init_service(App::new().configure(configure(service(), unlimited(), None))).await;

    let req = actix_test::TestRequest::post()
        .uri("/v1/restaurants")
        .set_json(cafe_delight())
        .to_request();
    let created: Value = actix_test::call_and_read_body_json(&app, req).await;
    let id = created["restaurant"]["id"].as_str().unwrap().to_string();

    let req = actix_test::TestRequest::put()
        .uri(&format!("/v1/restaurants/{id}"))
        .set_json(json!({
            "name": "Updated Restaurant",
            "address": "789 Oak St, New York, NY",
            "latitude": 40.7165,
            "longitude": -74.0092
        }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = actix_test::read_body_json(resp).await;
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["name"], "Updated Restaurant");
    assert_eq!(updated["latitude"], 40.7165);
}

#[actix_rt::test]
async fn test_update_unknown_restaurant() {
    let app = actix_test::init_service(App::new().configure(configure(service(), unlimited(), None))).await;

    let req = actix_test::TestRequest::put()
        .uri("/v1/restaurants/65a1f0c2e4b0a1b2c3d4e5f6")
        .set_json(cafe_delight())
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_get_malformed_id() {
    let app = actix_test::init_service(App::new().configure(configure(service(), unlimited(), None))).await;

    let req = actix_test::TestRequest::get().uri("/v1/restaurants/not-an-id").to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_invalid_payload_rejected() {
    let app = actix_test::init_service(App::new().configure(configure(service(), unlimited(), None))).await;

    let req = actix_test::TestRequest::post()
        .uri("/v1/restaurants")
        .set_json(json!({ "name": "No Address" }))
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["code"], "invalid_input");
}

#[actix_rt::test]
async fn test_malformed_json_rejected() {
    let app = actix_test::init_service(App::new().configure(configure(service(), unlimited(), None))).await;

    let req = actix_test::TestRequest::post()
        .uri("/v1/restaurants")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\": ")
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_search_parameter_errors() {
    let app = actix_test::init_service(App::new().configure(configure(service(), unlimited(), None))).await;

    let cases = [
        (
            "/v1/restaurants?latitude=40.7128&longitude=-74.0060&distance=1000",
            StatusCode::NOT_FOUND,
        ),
        (
            "/v1/restaurants?city=New%20York&longitude=-74.0060&distance=1000",
            StatusCode::BAD_REQUEST,
        ),
        (
            "/v1/restaurants?city=New%20York&latitude=40.7128&longitude=-74.0060",
            StatusCode::BAD_REQUEST,
        ),
        (
            "/v1/restaurants?city=New%20York&latitude=40.7128&longitude=-74.0060&distance=-1",
            StatusCode::BAD_REQUEST,
        ),
    ];

    for (uri, expected) in cases {
        let req = actix_test::TestRequest::get().uri(uri).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "{uri}");
    }
}

#[actix_rt::test]
async fn test_search_zero_coordinates_without_match() {
    let app = actix_test::init_service(App::new().configure(configure(service(), unlimited(), None))).await;

    let req = actix_test::TestRequest::get()
        .uri("/v1/restaurants?city=Nonexistent%20City&latitude=0&longitude=0&distance=1000")
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body, json!({ "restaurants": [] }));
}

#[actix_rt::test]
async fn test_rate_limit_returns_429() {
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: 2,
        window: Duration::from_secs(60),
        enabled: true,
    }));
    let app = actix_test::init_service(App::new().configure(configure(service(), limiter, None))).await;
    let peer: SocketAddr = "10.0.0.1:40000".parse().unwrap();

    for _ in 0..2 {
        let req = actix_test::TestRequest::get()
            .uri(SEARCH_NEW_YORK)
            .peer_addr(peer)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = actix_test::TestRequest::get()
        .uri(SEARCH_NEW_YORK)
        .peer_addr(peer)
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp
        .headers()
        .get("Retry-After")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 60);

    // Other clients are unaffected
    let req = actix_test::TestRequest::get()
        .uri(SEARCH_NEW_YORK)
        .peer_addr("10.0.0.2:40000".parse().unwrap())
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_health_is_not_rate_limited() {
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: 1,
        window: Duration::from_secs(60),
        enabled: true,
    }));
    let app = actix_test::init_service(App::new().configure(configure(service(), limiter, None))).await;
    let peer: SocketAddr = "10.0.0.3:40000".parse().unwrap();

    for _ in 0..5 {
        let req = actix_test::TestRequest::get().uri("/health").peer_addr(peer).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[actix_rt::test]
async fn test_rate_limit_applies_before_request_parsing() {
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: 1,
        window: Duration::from_secs(60),
        enabled: true,
    }));
    let app = actix_test::init_service(App::new().configure(configure(service(), limiter, None))).await;
    let peer: SocketAddr = "10.0.0.4:40000".parse().unwrap();

    let req = actix_test::TestRequest::post()
        .uri("/v1/restaurants")
        .peer_addr(peer)
        .set_json(cafe_delight())
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    for _ in 0..3 {
        let req = actix_test::TestRequest::post()
            .uri("/v1/restaurants")
            .peer_addr(peer)
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\": ")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("Retry-After"));
    }

    let req = actix_test::TestRequest::get()
        .uri("/v1/restaurants?city=a&city=b&latitude=0&longitude=0&distance=1")
        .peer_addr(peer)
        .to_request();
    let resp = actix_test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = actix_test::read_body_json(resp).await;
    assert_eq!(body["code"], "rate_limit_exceeded");
}
