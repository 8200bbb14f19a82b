//! HttpReservationApi against an in-process axum server.

use std::time::Duration;

use axum::Router;
use axum::extract::{Json, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use chrono::{TimeZone, Utc};
use reqwest::Url;
use serde_json::{Value, json};

use parkwise_core::domain::{
    AuthToken, ClientError, Credentials, ErrorKind, Registration, ReservationDraft, ReservationId,
    Slot, VehicleType,
};
use parkwise_core::impls::HttpReservationApi;
use parkwise_core::ports::ReservationApi;

const TOKEN: &str = "tok-123";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> axum::response::Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid token" }))).into_response()
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "pw" {
        (StatusCode::OK, Json(json!({ "token": TOKEN })))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid credentials" })))
    }
}

async fn register(Json(body): Json<Value>) -> impl IntoResponse {
    assert!(body.get("confirmPassword").is_none());
    (StatusCode::CREATED, Json(json!({ "token": TOKEN })))
}

async fn reservation(headers: HeaderMap, Path(id): Path<String>) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match id.as_str() {
        "r1" => Json(json!({
            "_id": "r1",
            "startTime": "2024-05-01T10:00:00.000Z",
            "endTime": "2024-05-01T11:00:00.000Z",
            "parkingLocation": "Nepa",
            "selectedSlots": [{ "id": 4 }],
            "totalCharges": 8400
        }))
        .into_response(),
        "garbled" => (StatusCode::OK, "<html>oops</html>").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Reservation not found" })),
        )
            .into_response(),
    }
}

async fn delete_reservation(headers: HeaderMap, Path(id): Path<String>) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match id.as_str() {
        "r1" => Json(json!({ "message": "Reservation deleted successfully" })).into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "db down" })),
        )
            .into_response(),
    }
}

async fn slots(headers: HeaderMap, Path(location): Path<String>) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match location.as_str() {
        "Gulshan Block 2" => Json(json!({
            "slots": [{ "id": 1 }, { "id": "2", "unavailable": true }]
        }))
        .into_response(),
        _ => Json(json!({})).into_response(),
    }
}

async fn reserve(headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    assert_eq!(body["vehicleType"], "car");
    assert_eq!(body["date"], "2024-05-01");
    (
        StatusCode::CREATED,
        Json(json!({ "reservation": { "_id": "created-1" } })),
    )
        .into_response()
}

async fn payment_intent(Json(body): Json<Value>) -> impl IntoResponse {
    if body["amount"].as_u64().unwrap_or(0) >= 50 {
        (StatusCode::OK, Json(json!({ "clientSecret": "cs_test" })))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "Amount too small" })))
    }
}

fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/reservations/{id}", get(reservation))
        .route("/reserve", post(reserve))
        .route("/reserve/{id}", delete(delete_reservation))
        .route("/slots/{location}", get(slots))
        .route("/create-payment-intent", post(payment_intent))
}

async fn spawn_server() -> HttpReservationApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    let base = Url::parse(&format!("http://{addr}")).unwrap();
    HttpReservationApi::new(base, Duration::from_secs(5)).unwrap()
}

fn token() -> AuthToken {
    AuthToken::new(TOKEN)
}

#[tokio::test]
async fn fetches_a_reservation_with_bearer_token() {
    let api = spawn_server().await;

    let reservation = api.reservation(&token(), &"r1".into()).await.unwrap();
    assert_eq!(reservation.id, ReservationId::from("r1"));
    assert_eq!(
        reservation.end_time,
        Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap()
    );
    assert_eq!(reservation.total_charges, Some(8400.0));
}

#[tokio::test]
async fn unknown_reservation_is_a_404_service_error() {
    let api = spawn_server().await;

    let err = api.reservation(&token(), &"nope".into()).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Reservation not found");
}

#[tokio::test]
async fn rejected_token_is_an_auth_error() {
    let api = spawn_server().await;

    let err = api
        .reservation(&AuthToken::new("stale"), &"r1".into())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn non_json_body_is_a_parse_error() {
    let api = spawn_server().await;

    let err = api.reservation(&token(), &"garbled".into()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn delete_maps_error_field_to_message() {
    let api = spawn_server().await;

    api.delete_reservation(&token(), &"r1".into()).await.unwrap();

    let err = api.delete_reservation(&token(), &"r2".into()).await.unwrap_err();
    match err {
        ClientError::Service { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "db down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn login_and_register_return_tokens() {
    let api = spawn_server().await;

    let issued = api
        .login(&Credentials::new("ali@example.com", "pw"))
        .await
        .unwrap();
    assert_eq!(issued, token());

    let err = api
        .login(&Credentials::new("ali@example.com", "nope"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid credentials");

    let registration = Registration::new("Ali", "ali@example.com", "pw", "pw").unwrap();
    assert_eq!(api.register(&registration).await.unwrap(), token());
}

#[tokio::test]
async fn slots_require_the_slots_field() {
    let api = spawn_server().await;

    let slots = api.slots(&token(), "Gulshan Block 2").await.unwrap();
    assert_eq!(slots.len(), 2);
    assert!(slots[0].is_bookable());
    assert!(!slots[1].is_bookable());

    let err = api.slots(&token(), "Nowhere").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn create_reservation_returns_the_new_id() {
    let api = spawn_server().await;
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let request = ReservationDraft {
        vehicle_name: "KHI-123".into(),
        vehicle_type: VehicleType::Car,
        parking_location: "Nepa".into(),
        selected_slots: vec![Slot {
            id: "1".into(),
            unavailable: false,
        }],
        start_time: start,
        end_time: start + chrono::Duration::hours(1),
    }
    .into_request()
    .unwrap();

    let id = api.create_reservation(&token(), &request).await.unwrap();
    assert_eq!(id.as_str(), "created-1");
}

#[tokio::test]
async fn payment_intent_errors_come_from_the_error_field() {
    let api = spawn_server().await;

    assert_eq!(api.create_payment_intent(14_000).await.unwrap(), "cs_test");

    let err = api.create_payment_intent(10).await.unwrap_err();
    assert_eq!(err.user_message(), "Amount too small");
}

#[tokio::test]
async fn closed_port_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpReservationApi::new(
        Url::parse(&format!("http://{addr}")).unwrap(),
        Duration::from_secs(2),
    )
    .unwrap();
    let err = api.reservation(&token(), &"r1".into()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}
