use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use cinema_reservations::{
    cache::CacheService, config::Config, router, store::MemoryCinemaStore, AppState,
};

fn app() -> Router {
    let config = Config::from_lookup(|key| match key {
        "STORAGE_BACKEND" => Some("memory".to_string()),
        "MAX_SEATS" => Some("500".to_string()),
        _ => None,
    })
    .unwrap();
    let state = AppState::with_parts(&config.reservation, Arc::new(MemoryCinemaStore::new()), CacheService::disabled());
    router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_cinema(app: &Router, seats: i64) -> i64 {
    let (status, body) = send(app, Method::POST, "/cinemas", Some(json!({ "seats": seats }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["cinemaId"].as_i64().unwrap()
}

#[tokio::test]
async fn create_then_purchase_flow() {
    let app = app();
    let id = create_cinema(&app, 3).await;

    let (status, body) = send(&app, Method::POST, &format!("/cinemas/{id}/purchase/2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "seat": 2 }));

    let (status, body) = send(&app, Method::POST, &format!("/cinemas/{id}/purchase/2"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Seat already purchased" }));

    let (status, body) = send(&app, Method::POST, &format!("/cinemas/{id}/purchase/4"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid seat number" }));

    let (status, body) = send(&app, Method::GET, &format!("/cinemas/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purchasedSeats"], json!([2]));
    assert_eq!(body["freeSeats"], 2);
    assert_eq!(body["fullyBooked"], false);
}

#[tokio::test]
async fn non_numeric_seat_is_invalid() {
    let app = app();
    let id = create_cinema(&app, 3).await;

    for seat in ["abc", "0", "-1", "1.5"] {
        let (status, body) = send(&app, Method::POST, &format!("/cinemas/{id}/purchase/{seat}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "seat {seat}");
        assert_eq!(body["error"], "Invalid seat number");
    }
}

#[tokio::test]
async fn unknown_cinema_is_404() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/cinemas/999/purchase/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Cinema not found" }));

    let (status, _) = send(&app, Method::POST, "/cinemas/999/purchaseConsecutive", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/cinemas/not-an-id/purchase/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/cinemas/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn consecutive_purchase_returns_lowest_pair_until_exhausted() {
    let app = app();
    let id = create_cinema(&app, 5).await;
    for seat in [1, 2] {
        let (status, _) = send(&app, Method::POST, &format!("/cinemas/{id}/purchase/{seat}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let uri = format!("/cinemas/{id}/purchaseConsecutive");
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "seats": [3, 4] }));

    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No two consecutive seats available" }));

    let (_, body) = send(&app, Method::GET, &format!("/cinemas/{id}"), None).await;
    assert_eq!(body["purchasedSeats"], json!([1, 2, 3, 4]));
}

#[tokio::test]
async fn isolated_free_seats_yield_no_pair() {
    let app = app();
    let id = create_cinema(&app, 5).await;
    for seat in [2, 4] {
        send(&app, Method::POST, &format!("/cinemas/{id}/purchase/{seat}"), None).await;
    }

    let (status, _) = send(&app, Method::POST, &format!("/cinemas/{id}/purchaseConsecutive"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, &format!("/cinemas/{id}"), None).await;
    assert_eq!(body["purchasedSeats"], json!([2, 4]));
    assert_eq!(body["version"], 2);
}

#[tokio::test]
async fn invalid_create_bodies_are_rejected() {
    let app = app();

    for body in [json!({ "seats": 0 }), json!({ "seats": -4 }), json!({ "seats": "ten" }), json!({})] {
        let (status, response) = send(&app, Method::POST, "/cinemas", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response["error"].is_string(), "{body}");
    }

    let (status, response) = send(&app, Method::POST, "/cinemas", Some(json!({ "seats": 501 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Seat count must be between 1 and 500");
}

#[tokio::test]
async fn health_and_banner() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
